use std::path::PathBuf;

use clap::Parser;
use tilescope_engine::logging::LoggingConfig;
use tilescope_engine::render::{RenderConfig, TextureFilter};
use tilescope_engine::window::RuntimeConfig;
use tilescope_layout::{TileSize, VAxis};
use winit::dpi::LogicalSize;

/// Smallest and largest tile side reachable with `[` and `]`.
pub const TILE_SIDE_RANGE: (u32, u32) = (16, 8192);

/// tilescope: view one image as a grid of textured tiles.
///
/// Keys: WASD/arrows pan, Q/E or the wheel zoom, drag pans, R resets,
/// `[`/`]` halve/double the tile size, T toggles tiling, Escape quits.
#[derive(Parser, Debug)]
#[command(name = "tilescope", version, about = "Tiled image viewer")]
pub struct Cli {
    /// Image to open (PNG, JPEG or TIFF).
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Square tile side in pixels.
    #[arg(
        long,
        value_name = "N",
        value_parser = clap::value_parser!(u32).range(1..),
        conflicts_with_all = ["tile_width", "tile_height"]
    )]
    pub tile_size: Option<u32>,

    /// Tile width in pixels (default 256).
    #[arg(long, value_name = "W", value_parser = clap::value_parser!(u32).range(1..))]
    pub tile_width: Option<u32>,

    /// Tile height in pixels (default 256).
    #[arg(long, value_name = "H", value_parser = clap::value_parser!(u32).range(1..))]
    pub tile_height: Option<u32>,

    /// Draw the image as one quad instead of tiles.
    #[arg(long)]
    pub single_quad: bool,

    /// Compute texture coordinates bottom-up (v = 1 at image row 0).
    #[arg(long)]
    pub flip_v: bool,

    /// Bias added to the sampled mip level.
    #[arg(long, value_name = "F", default_value_t = 0.0, allow_negative_numbers = true)]
    pub lod_bias: f32,

    /// First mip level sampled.
    #[arg(long, value_name = "N", default_value_t = 0)]
    pub base_mip: u32,

    /// Last mip level generated.
    #[arg(long, value_name = "N", default_value_t = 4)]
    pub max_mip: u32,

    /// Upload level 0 only.
    #[arg(long)]
    pub no_mipmaps: bool,

    /// Nearest-neighbour sampling.
    #[arg(long)]
    pub nearest: bool,

    /// Stretch the image over the whole window.
    #[arg(long)]
    pub stretch: bool,

    /// Initial window width in logical pixels.
    #[arg(long, value_name = "W", default_value_t = 1280.0)]
    pub width: f64,

    /// Initial window height in logical pixels.
    #[arg(long, value_name = "H", default_value_t = 720.0)]
    pub height: f64,

    /// Window title (defaults to the file name).
    #[arg(long, value_name = "T")]
    pub title: Option<String>,

    /// Log filter, `env_logger` syntax (overrides RUST_LOG).
    #[arg(long, value_name = "FILTER")]
    pub log: Option<String>,
}

/// Everything the viewer needs, resolved from the command line.
#[derive(Debug, Clone)]
pub struct ViewerConfig {
    pub path: PathBuf,
    pub tile_size: TileSize,
    pub single_quad: bool,
    pub render: RenderConfig,
    pub runtime: RuntimeConfig,
    pub logging: LoggingConfig,
}

impl ViewerConfig {
    pub fn from_cli(cli: Cli) -> Self {
        let tile_size = match cli.tile_size {
            Some(side) => TileSize::square(side),
            None => TileSize::new(
                cli.tile_width.unwrap_or(TileSize::DEFAULT.width),
                cli.tile_height.unwrap_or(TileSize::DEFAULT.height),
            ),
        };

        let render = RenderConfig {
            lod_bias: cli.lod_bias,
            base_mip_level: cli.base_mip,
            max_mip_level: cli.max_mip,
            generate_mipmaps: !cli.no_mipmaps,
            filter: if cli.nearest { TextureFilter::Nearest } else { TextureFilter::Linear },
            v_axis: if cli.flip_v { VAxis::BottomUp } else { VAxis::TopDown },
            preserve_aspect: !cli.stretch,
            ..Default::default()
        };

        let title = cli.title.unwrap_or_else(|| default_title(&cli.path));
        let runtime = RuntimeConfig {
            title,
            initial_size: LogicalSize::new(cli.width.max(1.0), cli.height.max(1.0)),
        };

        let logging = LoggingConfig {
            env_filter: cli.log,
            ..Default::default()
        };

        Self {
            path: cli.path,
            tile_size,
            single_quad: cli.single_quad,
            render,
            runtime,
            logging,
        }
    }
}

fn default_title(path: &std::path::Path) -> String {
    match path.file_name() {
        Some(name) => format!("tilescope: {}", name.to_string_lossy()),
        None => "tilescope".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> ViewerConfig {
        let cli = Cli::try_parse_from(std::iter::once("tilescope").chain(args.iter().copied()))
            .expect("arguments should parse");
        ViewerConfig::from_cli(cli)
    }

    // ── defaults ──────────────────────────────────────────────────────────

    #[test]
    fn defaults_match_the_library_defaults() {
        let config = parse(&["photo.png"]);
        assert_eq!(config.path, PathBuf::from("photo.png"));
        assert_eq!(config.tile_size, TileSize::DEFAULT);
        assert!(!config.single_quad);
        assert_eq!(config.render.v_axis, VAxis::TopDown);
        assert!(config.render.preserve_aspect);
        assert!(config.render.generate_mipmaps);
        assert_eq!(config.render.max_mip_level, 4);
        assert_eq!(config.runtime.title, "tilescope: photo.png");
        assert_eq!(config.logging.env_filter, None);
    }

    // ── tiles ─────────────────────────────────────────────────────────────

    #[test]
    fn square_tile_size() {
        assert_eq!(parse(&["a.png", "--tile-size", "128"]).tile_size, TileSize::square(128));
    }

    #[test]
    fn separate_tile_sides_fall_back_to_default() {
        let config = parse(&["a.png", "--tile-width", "100"]);
        assert_eq!(config.tile_size, TileSize::new(100, 256));
    }

    #[test]
    fn zero_and_conflicting_tile_sizes_are_rejected() {
        assert!(Cli::try_parse_from(["tilescope", "a.png", "--tile-size", "0"]).is_err());
        assert!(
            Cli::try_parse_from(["tilescope", "a.png", "--tile-size", "64", "--tile-width", "32"])
                .is_err()
        );
    }

    // ── rendering ─────────────────────────────────────────────────────────

    #[test]
    fn render_flags() {
        let config = parse(&[
            "a.tif",
            "--flip-v",
            "--lod-bias",
            "-0.5",
            "--base-mip",
            "1",
            "--max-mip",
            "6",
            "--no-mipmaps",
            "--nearest",
            "--stretch",
        ]);
        assert_eq!(config.render.v_axis, VAxis::BottomUp);
        assert_eq!(config.render.lod_bias, -0.5);
        assert_eq!(config.render.base_mip_level, 1);
        assert_eq!(config.render.max_mip_level, 6);
        assert!(!config.render.generate_mipmaps);
        assert_eq!(config.render.filter, TextureFilter::Nearest);
        assert!(!config.render.preserve_aspect);
    }

    #[test]
    fn window_and_logging_flags() {
        let config = parse(&[
            "a.jpg", "--width", "640", "--height", "480", "--title", "demo", "--log", "debug",
        ]);
        assert_eq!(config.runtime.initial_size, LogicalSize::new(640.0, 480.0));
        assert_eq!(config.runtime.title, "demo");
        assert_eq!(config.logging.env_filter.as_deref(), Some("debug"));
    }

    #[test]
    fn path_is_required() {
        assert!(Cli::try_parse_from(["tilescope"]).is_err());
    }
}
