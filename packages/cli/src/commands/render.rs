use crate::commands::find_json_files;
use crate::commands::validate::validation_options;
use crate::config::{Config, EmitTarget};
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use lessondoc_compiler_html::{compile_to_html, RenderOptions};
use lessondoc_compiler_markdown::{compile_to_markdown, MarkdownOptions};
use lessondoc_document::Document;
use lessondoc_validator::{parse_document, ValidationOptions};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct RenderArgs {
    /// Content file or directory (defaults to the configured source directory)
    pub path: Option<PathBuf>,

    /// Output formats (overrides config)
    #[arg(long, value_enum, value_delimiter = ',')]
    pub to: Vec<EmitTarget>,

    /// Output to stdout instead of files
    #[arg(long)]
    pub stdout: bool,

    /// Output directory (overrides config)
    #[arg(short, long)]
    pub out_dir: Option<String>,

    /// Reject instead of repairing schema violations
    #[arg(long)]
    pub strict: bool,

    /// Indent HTML output
    #[arg(long)]
    pub pretty: bool,
}

/// Config merged with command-line overrides
struct RenderSettings {
    targets: Vec<EmitTarget>,
    validation: ValidationOptions,
    pretty: bool,
    stdout: bool,
    out_dir: PathBuf,
}

impl RenderSettings {
    fn resolve(config: &Config, args: &RenderArgs, cwd: &str) -> Self {
        let targets = if args.to.is_empty() {
            config.emit.clone()
        } else {
            args.to.clone()
        };
        let out_dir = match &args.out_dir {
            Some(out) => PathBuf::from(cwd).join(out),
            None => config.get_out_dir(cwd),
        };

        Self {
            targets,
            validation: validation_options(config, args.strict),
            pretty: args.pretty || config.pretty,
            stdout: args.stdout,
            out_dir,
        }
    }
}

pub fn render(args: RenderArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let settings = RenderSettings::resolve(&config, &args, cwd);
    let input = args.path.clone().unwrap_or_else(|| config.get_src_dir(cwd));

    let (src_root, files) = if input.is_file() {
        let root = input.parent().map(Path::to_path_buf).unwrap_or_default();
        (root, vec![input.clone()])
    } else if input.is_dir() {
        let files = find_json_files(&input)?;
        (input.clone(), files)
    } else {
        return Err(anyhow!("Source path does not exist: {}", input.display()));
    };

    if !settings.stdout {
        println!("{}", "🔨 Rendering content files...".bright_blue().bold());
    }

    if files.is_empty() {
        // Keep stdout clean for piped output
        let message = "⚠️  No .json files found".yellow();
        if settings.stdout {
            eprintln!("{}", message);
        } else {
            println!("{}", message);
        }
        return Ok(());
    }

    let mut success_count = 0;
    let mut error_count = 0;

    for file in &files {
        let relative_path = file.strip_prefix(&src_root).unwrap_or(file);
        match render_file(file, relative_path, &settings) {
            Ok(outputs) => {
                success_count += 1;
                if !settings.stdout {
                    println!(
                        "  {} {} → {}",
                        "✓".green(),
                        relative_path.display(),
                        outputs.join(", ")
                    );
                }
            }
            Err(e) => {
                error_count += 1;
                eprintln!(
                    "  {} {} - {}",
                    "✗".red(),
                    relative_path.display(),
                    e.to_string().red()
                );
            }
        }
    }

    if settings.stdout {
        return if error_count == 0 {
            Ok(())
        } else {
            Err(anyhow!("{} files failed to render", error_count))
        };
    }

    println!();
    if error_count == 0 {
        println!(
            "{} Rendered {} files successfully",
            "✅".green(),
            success_count
        );
        Ok(())
    } else {
        println!(
            "{} Rendered {} files, {} errors",
            "⚠️".yellow(),
            success_count,
            error_count
        );
        Err(anyhow!("{} files failed to render", error_count))
    }
}

fn render_file(file: &Path, relative_path: &Path, settings: &RenderSettings) -> Result<Vec<String>> {
    let source = fs::read_to_string(file)?;
    let document = parse_document(&source, &settings.validation)?;

    let mut outputs = Vec::with_capacity(settings.targets.len());
    for target in &settings.targets {
        let output = render_document(&document, *target, settings.pretty)?;

        if settings.stdout {
            println!("{}", output);
            outputs.push("stdout".to_string());
            continue;
        }

        let output_file = settings
            .out_dir
            .join(relative_path)
            .with_extension(target.extension());
        if let Some(parent) = output_file.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&output_file, output)?;
        outputs.push(output_file.display().to_string());
    }

    Ok(outputs)
}

/// Render with production invariants: drift is logged, not fatal
pub(crate) fn render_document(document: &Document, target: EmitTarget, pretty: bool) -> Result<String> {
    let output = match target {
        EmitTarget::Html => {
            let options = RenderOptions {
                pretty,
                ..RenderOptions::production()
            };
            compile_to_html(document, options)?
        }
        EmitTarget::Markdown => compile_to_markdown(document, MarkdownOptions::production())?,
    };
    Ok(output)
}
