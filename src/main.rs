use clap::{Parser, Subcommand};
use geoview::controller::ViewerEvent;
use geoview::models::file::SelectedFile;
use geoview::models::geometry::TileCoord;
use geoview::notifications::Level;
use geoview::shell::run_shell;
use geoview::traits::GeoBackend;
use geoview::utils::status::{Spinner, file_info_table, print_notifications, print_status};
use geoview::utils::tile::{fallback_tile, tile_dimensions};
use geoview::{Config, HeadlessMap, HttpBackend, ViewerController};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{Level as LogLevel, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Upload GeoTIFF and GeoJSON files and browse them on a map")]
struct Cli {
    /// Backend base URL
    #[arg(long, global = true)]
    server: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Map viewport in pixels, e.g. 1024x768
    #[arg(long, global = true, value_parser = parse_viewport)]
    viewport: Option<(u32, u32)>,

    #[arg(long, global = true, default_value = "warn")]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Upload a file and show the result
    Upload { path: PathBuf },

    /// Interactive viewer session
    Shell { path: Option<PathBuf> },

    /// Show metadata for an uploaded raster
    Info { filename: String },

    /// Fetch one tile of an uploaded raster
    Tile {
        filename: String,
        z: u8,
        x: u32,
        y: u32,

        /// Output file (default: {z}_{x}_{y}.png)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

fn parse_viewport(s: &str) -> Result<(u32, u32), String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{}'", s))?;
    let w: u32 = w.trim().parse().map_err(|_| format!("invalid width '{}'", w))?;
    let h: u32 = h.trim().parse().map_err(|_| format!("invalid height '{}'", h))?;
    if w == 0 || h == 0 {
        return Err("viewport must be non-empty".to_string());
    }
    Ok((w, h))
}

fn config_from(cli: &Cli) -> Config {
    let mut config = Config::default();
    if let Some(server) = &cli.server {
        config.server = server.clone();
    }
    if let Some(secs) = cli.timeout {
        config.request_timeout = Duration::from_secs(secs);
    }
    if let Some(viewport) = cli.viewport {
        config.viewport = viewport;
    }
    config
}

fn build_controller(config: Config) -> anyhow::Result<ViewerController<HeadlessMap, HttpBackend>> {
    let backend = HttpBackend::new(&config.server, config.request_timeout)?;
    let map = HeadlessMap::new(config.viewport.0, config.viewport.1).with_zoom_range(0, config.max_zoom);
    Ok(ViewerController::new(config, map, backend).with_busy_indicator(Box::new(Spinner::new())))
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(cli.log_level.to_string()))
        .with_writer(std::io::stderr)
        .init();

    let config = config_from(&cli);

    match cli.command {
        Command::Upload { path } => {
            let mut ctl = build_controller(config)?;
            let file = SelectedFile::from_path(&path).await?;
            ctl.handle(ViewerEvent::FileSelected(Some(file))).await;
            ctl.handle(ViewerEvent::UploadClicked).await;

            print_notifications(ctl.notifications().iter());
            let session = ctl.session();
            print_status(ctl.ui(), session.file_type(), session.filename());

            let failed = ctl
                .notifications()
                .last()
                .is_some_and(|n| n.level == Level::Error);
            if failed {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Shell { path } => {
            let mut ctl = build_controller(config)?;
            run_shell(&mut ctl, path).await?;
        }
        Command::Info { filename } => {
            let backend = HttpBackend::new(&config.server, config.request_timeout)?;
            let info = backend.file_info(&filename).await?;
            println!("{}", file_info_table(&info));
        }
        Command::Tile { filename, z, x, y, out } => {
            let backend = HttpBackend::new(&config.server, config.request_timeout)?;
            let out = out.unwrap_or_else(|| PathBuf::from(format!("{}_{}_{}.png", z, x, y)));
            let bytes = match backend.fetch_tile(&filename, TileCoord { z, x, y }).await {
                Ok(tile) if tile_dimensions(&tile).is_some() => tile.bytes,
                Ok(tile) => {
                    warn!(content_type = %tile.content_type, "tile did not decode, writing fallback");
                    fallback_tile()?
                }
                Err(e) => {
                    warn!("tile request failed, writing fallback: {}", e.user_message());
                    fallback_tile()?
                }
            };
            tokio::fs::write(&out, &bytes).await?;
            println!("🧩 Wrote {} ({} bytes)", out.display(), bytes.len());
        }
    }

    Ok(ExitCode::SUCCESS)
}
