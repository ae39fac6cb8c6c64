//! `tilescope`: opens one image and renders it as a grid of textured tiles.

mod app;
mod config;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tilescope_engine::device::GpuInit;
use tilescope_engine::loader::ImageLoader;
use tilescope_engine::logging::init_logging;
use tilescope_engine::window::Runtime;

use crate::app::ViewerApp;
use crate::config::{Cli, ViewerConfig};

fn main() -> ExitCode {
    let config = ViewerConfig::from_cli(Cli::parse());
    init_logging(config.logging.clone());

    // Every failure is reported here, once.
    match run(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: ViewerConfig) -> Result<()> {
    let image = ImageLoader::new()
        .load(&config.path)
        .with_context(|| format!("cannot open {}", config.path.display()))?;

    let app = ViewerApp::new(image, &config)?;
    let mut app = Runtime::run(config.runtime.clone(), GpuInit::default(), app)?;

    match app.take_failure() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_fails_before_any_window_opens() {
        let cli = Cli::try_parse_from(["tilescope", "/nonexistent/tilescope-missing.png"]).unwrap();
        let err = run(ViewerConfig::from_cli(cli)).unwrap_err();

        let report = format!("{err:#}");
        assert!(report.starts_with("cannot open /nonexistent/tilescope-missing.png"));
        assert_eq!(report.matches("file not found").count(), 1);
    }
}
