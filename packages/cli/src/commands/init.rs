use crate::config::{Config, EmitTarget, DEFAULT_CONFIG_NAME};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Source directory
    #[arg(short, long, default_value = "content")]
    pub src_dir: String,

    /// Output formats
    #[arg(long, value_enum, value_delimiter = ',', default_value = "html")]
    pub emit: Vec<EmitTarget>,

    /// Force overwrite existing config
    #[arg(short, long)]
    pub force: bool,
}

const EXAMPLE_LESSON: &str = r#"{
  "kind": "doc",
  "children": [
    {
      "kind": "heading",
      "attributes": { "level": 2 },
      "children": [{ "kind": "text", "text": "Welcome" }]
    },
    {
      "kind": "paragraph",
      "children": [
        { "kind": "text", "text": "Lessons are " },
        { "kind": "text", "text": "structured", "marks": ["bold"] },
        { "kind": "text", "text": " documents." }
      ]
    },
    {
      "kind": "bullet_list",
      "children": [
        {
          "kind": "list_item",
          "children": [
            { "kind": "paragraph", "children": [{ "kind": "text", "text": "Validate with lessondoc validate" }] }
          ]
        },
        {
          "kind": "list_item",
          "children": [
            { "kind": "paragraph", "children": [{ "kind": "text", "text": "Publish with lessondoc render" }] }
          ]
        }
      ]
    }
  ]
}
"#;

pub fn init(args: InitArgs, cwd: &str) -> Result<()> {
    let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

    if config_path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            DEFAULT_CONFIG_NAME.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    println!(
        "{}",
        "📝 Initializing lesson content project...".bright_blue().bold()
    );

    let src_dir = PathBuf::from(cwd).join(&args.src_dir);
    if !src_dir.exists() {
        fs::create_dir_all(&src_dir)?;
        println!("  {} Created {}/", "✓".green(), args.src_dir);
    }

    let example_file = src_dir.join("welcome.json");
    if !example_file.exists() {
        fs::write(&example_file, EXAMPLE_LESSON)?;
        println!("  {} Created welcome.json", "✓".green());
    }

    let config = Config {
        src_dir: args.src_dir.clone(),
        emit: if args.emit.is_empty() {
            Config::default().emit
        } else {
            args.emit.clone()
        },
        ..Config::default()
    };

    let config_json = serde_json::to_string_pretty(&config)?;
    fs::write(&config_path, config_json)?;

    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);
    println!();
    println!("{}", "✅ Project initialized!".green().bold());
    println!();
    println!("Next steps:");
    println!("  1. Edit {}/welcome.json", args.src_dir);
    println!("  2. Run: lessondoc validate");
    println!("  3. Run: lessondoc render");
    println!("  4. Check output in {}/", config.out_dir);

    Ok(())
}
