//! Line-oriented front end for the controller.

use crate::controller::{ViewerController, ViewerEvent};
use crate::models::file::SelectedFile;
use crate::models::geometry::LatLng;
use crate::notifications::Notification;
use crate::surface::HeadlessMap;
use crate::traits::{GeoBackend, MapSurface};
use crate::utils::status::{print_notifications, print_status};
use std::path::PathBuf;
use std::time::Instant;
use tokio::io::{AsyncBufReadExt, BufReader};

pub const HELP: &str = "\
commands:
  select <path>       choose a file
  drop <path>         drag-and-drop a file onto the map
  upload              upload the selected file
  opacity <0..1>      overlay opacity
  fit                 fit view to the loaded data
  reset               back to the initial view
  move <lat> <lng>    pointer position
  pan <lat> <lng>     recenter the map
  zoom <n>            change zoom level
  basemap <name>      switch basemap
  hover <i> / leave <i> / click <i>   feature interaction
  tiles               tiles the raster overlay needs for this view
  status              show view and file info
  dismiss <id>        dismiss a notification
  help, quit";

#[derive(Debug, Clone)]
pub enum Command {
    Event(ViewerEvent),
    Select(PathBuf),
    Drop(PathBuf),
    Pan(LatLng),
    Zoom(u8),
    Tiles,
    Status,
    Help,
    Quit,
}

fn arg<T: std::str::FromStr>(args: &[&str], i: usize, what: &str) -> Result<T, String> {
    args.get(i)
        .ok_or_else(|| format!("missing {}", what))?
        .parse()
        .map_err(|_| format!("invalid {}", what))
}

pub fn parse_command(line: &str) -> Result<Command, String> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    let Some((&cmd, args)) = parts.split_first() else {
        return Err("empty command".to_string());
    };
    let rest = || args.join(" ");

    Ok(match cmd.to_lowercase().as_str() {
        "select" if !args.is_empty() => Command::Select(PathBuf::from(rest())),
        "drop" if !args.is_empty() => Command::Drop(PathBuf::from(rest())),
        "select" | "drop" => return Err("missing path".to_string()),
        "upload" => Command::Event(ViewerEvent::UploadClicked),
        "opacity" => Command::Event(ViewerEvent::OpacityChanged(arg(args, 0, "opacity")?)),
        "fit" => Command::Event(ViewerEvent::FitBounds),
        "reset" => Command::Event(ViewerEvent::ResetView),
        "move" => Command::Event(ViewerEvent::PointerMoved(LatLng::new(
            arg(args, 0, "latitude")?,
            arg(args, 1, "longitude")?,
        ))),
        "pan" => Command::Pan(LatLng::new(
            arg(args, 0, "latitude")?,
            arg(args, 1, "longitude")?,
        )),
        "zoom" => Command::Zoom(arg(args, 0, "zoom")?),
        "basemap" if !args.is_empty() => Command::Event(ViewerEvent::SelectBasemap(rest())),
        "basemap" => return Err("missing basemap name".to_string()),
        "hover" => Command::Event(ViewerEvent::FeatureHover(arg(args, 0, "feature")?)),
        "leave" => Command::Event(ViewerEvent::FeatureLeave(arg(args, 0, "feature")?)),
        "click" => Command::Event(ViewerEvent::FeatureClicked(arg(args, 0, "feature")?)),
        "dismiss" => Command::Event(ViewerEvent::DismissNotification(arg(args, 0, "id")?)),
        "tiles" => Command::Tiles,
        "status" => Command::Status,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => return Err(format!("unknown command '{}'", other)),
    })
}

/// Print notifications that arrived since `seen`, returning the new high
/// water mark.
fn print_new<'a>(notifications: impl Iterator<Item = &'a Notification>, seen: u64) -> u64 {
    let fresh: Vec<&Notification> = notifications.filter(|n| n.id > seen).collect();
    let last = fresh.last().map(|n| n.id).unwrap_or(seen);
    print_notifications(fresh.into_iter());
    last
}

async fn read_selection(path: &PathBuf) -> Option<SelectedFile> {
    match SelectedFile::from_path(path).await {
        Ok(f) => Some(f),
        Err(e) => {
            eprintln!("❌ Failed to read {}: {}", path.display(), e);
            None
        }
    }
}

/// Apply one parsed command. Returns `false` when the shell should exit.
pub async fn run_command<B: GeoBackend>(
    ctl: &mut ViewerController<HeadlessMap, B>,
    command: Command,
) -> bool {
    match command {
        Command::Event(event) => ctl.handle(event).await,
        Command::Select(path) => {
            if let Some(file) = read_selection(&path).await {
                ctl.handle(ViewerEvent::FileSelected(Some(file))).await;
            }
        }
        Command::Drop(path) => {
            ctl.handle(ViewerEvent::DragOver).await;
            match read_selection(&path).await {
                Some(file) => ctl.handle(ViewerEvent::FilesDropped(vec![file])).await,
                None => ctl.handle(ViewerEvent::DragLeave).await,
            }
        }
        Command::Pan(center) => {
            let zoom = ctl.map().zoom();
            ctl.map_mut().set_view(center, zoom);
            ctl.handle(ViewerEvent::ZoomEnded).await;
        }
        Command::Zoom(zoom) => {
            let center = ctl.map().center();
            ctl.map_mut().set_view(center, zoom);
            ctl.handle(ViewerEvent::ZoomEnded).await;
        }
        Command::Tiles => {
            let tiles = ctl.map().visible_tiles();
            let template = ctl.map().tile_layers().last().map(|t| t.url.clone());
            match template {
                Some(url) if !tiles.is_empty() => {
                    println!("🧩 {} tiles", tiles.len());
                    for t in tiles {
                        println!("   {}", url.resolve(t));
                    }
                }
                Some(_) => println!("🧩 raster overlay not in view"),
                None => println!("🧩 no raster overlay loaded"),
            }
        }
        Command::Status => {
            let session = ctl.session();
            print_status(ctl.ui(), session.file_type(), session.filename());
            let view = ctl.map().view_bounds();
            println!(
                "   View: {:.4}, {:.4}, {:.4}, {:.4}",
                view.west, view.south, view.east, view.north
            );
        }
        Command::Help => println!("{}", HELP),
        Command::Quit => return false,
    }
    true
}

pub async fn run_shell<B: GeoBackend>(
    ctl: &mut ViewerController<HeadlessMap, B>,
    initial: Option<PathBuf>,
) -> anyhow::Result<()> {
    let mut seen = 0;
    println!("🌍 geoview shell, type 'help' for commands");
    if let Some(path) = initial {
        run_command(ctl, Command::Select(path)).await;
        seen = print_new(ctl.notifications().iter(), seen);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let keep_going = match parse_command(&line) {
            Ok(command) => run_command(ctl, command).await,
            Err(e) => {
                eprintln!("⚠️ {}", e);
                true
            }
        };
        ctl.handle(ViewerEvent::Tick(Instant::now())).await;
        seen = print_new(ctl.notifications().iter(), seen);
        if !keep_going {
            break;
        }
    }
    Ok(())
}
