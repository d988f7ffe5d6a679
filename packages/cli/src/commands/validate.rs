use crate::commands::find_json_files;
use crate::config::Config;
use anyhow::{anyhow, Result};
use clap::{Args, ValueEnum};
use colored::Colorize;
use lessondoc_validator::{
    parse_document_with_report, Diagnostic, DiagnosticLevel, ValidationMode, ValidationOptions,
};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Content file or directory (defaults to the configured source directory)
    pub input: Option<PathBuf>,

    /// Reject instead of repairing schema violations
    #[arg(long)]
    pub strict: bool,

    /// Show all diagnostics including info level
    #[arg(short, long)]
    pub verbose: bool,

    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

/// Outcome of checking one file
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileReport {
    pub file: String,
    pub valid: bool,
    pub diagnostics: Vec<Diagnostic>,
}

impl FileReport {
    fn count(&self, level: DiagnosticLevel) -> usize {
        self.diagnostics.iter().filter(|d| d.level == level).count()
    }
}

pub fn validate(args: ValidateArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let options = validation_options(&config, args.strict);
    let input = args
        .input
        .clone()
        .unwrap_or_else(|| config.get_src_dir(cwd));

    let files = if input.is_file() {
        vec![input.clone()]
    } else if input.is_dir() {
        find_json_files(&input)?
    } else {
        return Err(anyhow!("Input path does not exist: {}", input.display()));
    };

    if args.format == OutputFormat::Text {
        println!("🔍 {} content files", "Validating".green().bold());
        println!("   Input: {}", input.display());
        println!("   Mode:  {:?}", options.mode);
        println!();
    }

    let mut reports = Vec::with_capacity(files.len());
    for file in &files {
        reports.push(validate_file(file, &options)?);
    }

    let rejected = reports.iter().filter(|report| !report.valid).count();

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&reports)?),
        OutputFormat::Text => print_text(&reports, args.verbose),
    }

    if rejected > 0 {
        return Err(anyhow!(
            "{} of {} files failed validation",
            rejected,
            reports.len()
        ));
    }
    Ok(())
}

pub(crate) fn validation_options(config: &Config, strict: bool) -> ValidationOptions {
    let mut options = config.validation.clone();
    if strict {
        options.mode = ValidationMode::Strict;
    }
    options
}

pub(crate) fn validate_file(file: &Path, options: &ValidationOptions) -> Result<FileReport> {
    let source = fs::read_to_string(file)?;
    let file = file.display().to_string();

    Ok(match parse_document_with_report(&source, options) {
        Ok(report) => FileReport {
            file,
            valid: true,
            diagnostics: report.diagnostics,
        },
        Err(err) => FileReport {
            file,
            valid: false,
            diagnostics: vec![Diagnostic::rejected(&err)],
        },
    })
}

fn print_text(reports: &[FileReport], verbose: bool) {
    let mut total_warnings = 0;
    let mut total_errors = 0;

    for report in reports {
        total_errors += report.count(DiagnosticLevel::Error);
        total_warnings += report.count(DiagnosticLevel::Warning);

        let visible: Vec<&Diagnostic> = report
            .diagnostics
            .iter()
            .filter(|d| verbose || d.level != DiagnosticLevel::Info)
            .collect();

        if visible.is_empty() {
            if verbose {
                println!("{} {}", "✓".green(), report.file);
            }
            continue;
        }

        let marker = if report.valid { "⚠".yellow() } else { "✗".red() };
        println!("{} {}", marker, report.file);

        for diagnostic in visible {
            let level_str = match diagnostic.level {
                DiagnosticLevel::Error => "error".red().bold(),
                DiagnosticLevel::Warning => "warning".yellow().bold(),
                DiagnosticLevel::Info => "info".blue().bold(),
            };
            println!(
                "  {} [{}] {} {}",
                level_str,
                diagnostic.rule,
                diagnostic.message,
                format!("at {}", diagnostic.path).dimmed()
            );
        }
        println!();
    }

    println!(
        "✨ {} Validation complete!",
        if total_errors > 0 {
            "Done".red().bold()
        } else {
            "Done".green().bold()
        }
    );
    println!("   Files checked: {}", reports.len());

    if total_errors > 0 {
        println!("   {} {}", "Rejected:".red(), total_errors);
    }
    if total_warnings > 0 {
        println!("   {} {}", "Repairs:".yellow(), total_warnings);
    }
    if total_errors == 0 && total_warnings == 0 {
        println!("   {} No issues found!", "✓".green());
    }
}
