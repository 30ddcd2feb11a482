//! Main application entry point.

use anyhow::{Context, Result};
use clap::Parser;
use pixelpad_app::{App, FontSpec, Script, build_font_book, check_unique};
use pixelpad_core::EditorConfig;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "pixelpad")]
#[command(version, about = "Replay a PixelPad editing script and export the canvas")]
struct Cli {
    /// Script of editor steps (JSON array). Without one, exports a blank canvas.
    script: Option<PathBuf>,

    /// Directory exports are written to
    #[arg(long, short = 'o', value_name = "DIR", default_value = ".")]
    out: PathBuf,

    /// Editor configuration file (JSON)
    #[arg(long, short = 'c', value_name = "FILE")]
    config: Option<PathBuf>,

    /// Font face, as FAMILY[:STYLE]=PATH (repeatable)
    #[arg(long = "font", value_name = "SPEC")]
    fonts: Vec<FontSpec>,

    /// Font used for families without a registered face (default: bundled DejaVu Sans)
    #[arg(long, value_name = "PATH")]
    fallback_font: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    log::info!("Starting PixelPad");

    let config = match &cli.config {
        Some(path) => EditorConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => EditorConfig::default(),
    };

    check_unique(&cli.fonts)?;
    let fonts = build_font_book(&cli.fonts, cli.fallback_font.as_deref())?;

    let script = match &cli.script {
        Some(path) => Script::load(path)?,
        None => Script::default(),
    };

    let mut app = App::new(config, fonts, &cli.out)?;
    let summary = app.run(&script)?;
    app.shutdown()?;

    for path in &summary.written {
        println!("{}", path.display());
    }
    if summary.rejected > 0 {
        log::warn!("{} step(s) were rejected", summary.rejected);
    }
    Ok(())
}
