// ABOUTME: Main entry point for the reveal-slides program.
// ABOUTME: Provides CLI interface and executes commands from the library.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use reveal_slides::{assets, Config, DirectiveRegistry};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a Markdown file to a reveal.js slideshow
    Convert(ConvertArgs),

    /// Download reveal.js (and optionally MathJax) assets
    Download(DownloadArgs),
}

#[derive(Args)]
struct ConvertArgs {
    /// Path to the markdown source file
    input: PathBuf,

    /// Path to the output HTML file (defaults to the input with .html)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// reveal.js theme name
    #[arg(long)]
    theme: Option<String>,

    /// highlight.js style name
    #[arg(long)]
    highlight_style: Option<String>,

    /// Directory holding the reveal.js assets
    #[arg(long)]
    reveal_dir: Option<PathBuf>,

    /// Extra stylesheets to include (local paths or URLs)
    #[arg(long, value_delimiter = ',')]
    css: Vec<String>,

    /// Embed local stylesheets instead of linking them
    #[arg(long)]
    embed_css: bool,

    /// Download MathJax into the assets directory (optionally at a tag)
    #[arg(long, num_args = 0..=1, default_missing_value = "master")]
    mathjax: Option<String>,

    /// Skip the asset provisioning step
    #[arg(long)]
    skip_assets: bool,
}

#[derive(Args)]
struct DownloadArgs {
    /// Directory to install the assets into
    #[arg(default_value = "ui")]
    path: PathBuf,

    /// Also download MathJax (optionally at a tag)
    #[arg(short, long, num_args = 0..=1, default_missing_value = "master")]
    mathjax: Option<String>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let config = Config::from_env();

    match cli.command {
        Commands::Convert(args) => {
            let registry = DirectiveRegistry::standard();
            let render_config = config.get_render_config(
                args.theme,
                args.highlight_style,
                args.reveal_dir,
                args.css,
                args.embed_css,
                !args.skip_assets,
                args.mathjax,
            );
            let html = reveal_slides::convert_file(&args.input, &registry, &render_config)?;
            let output = args
                .output
                .unwrap_or_else(|| args.input.with_extension("html"));
            reveal_slides::write_html_to_file(&html, &output)?;
            println!("Slideshow written to {:?}", output);
        }
        Commands::Download(args) => {
            assets::setup(&args.path, &config.reveal_tag, args.mathjax.as_deref())?;
            println!("Assets installed under {:?}", args.path);
        }
    }
    Ok(())
}
