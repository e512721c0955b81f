use crate::controller::{FileType, UiState};
use crate::models::responses::FileInfo;
use crate::notifications::{Notification, Phase};
use crate::panel::InfoPanel;
use crate::traits::BusyIndicator;
use comfy_table::{Attribute, Cell, CellAlignment, Table};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

fn header(labels: &[&str]) -> Vec<Cell> {
    labels
        .iter()
        .map(|l| {
            Cell::new(l)
                .add_attribute(Attribute::Bold)
                .set_alignment(CellAlignment::Center)
        })
        .collect()
}

pub fn panel_table(panel: &InfoPanel) -> Option<Table> {
    let rows = panel.rows();
    if rows.is_empty() {
        return None;
    }
    let mut table = Table::new();
    table
        .set_header(header(&["", "File info"]))
        .load_preset(comfy_table::presets::ASCII_BORDERS_ONLY_CONDENSED);
    for (label, value) in rows {
        table.add_row(vec![Cell::new(label).add_attribute(Attribute::Bold), Cell::new(value)]);
    }
    Some(table)
}

pub fn file_info_table(info: &FileInfo) -> Table {
    let mut table = Table::new();
    table
        .set_header(header(&["Field", "Value"]))
        .load_preset(comfy_table::presets::ASCII_BORDERS_ONLY_CONDENSED);

    let nodata = info
        .nodata
        .map(|v| v.to_string())
        .unwrap_or_else(|| "none".to_string());
    let transform = info
        .transform
        .iter()
        .map(|v| format!("{}", v))
        .collect::<Vec<_>>()
        .join(", ");
    let rows = [
        ("Filename", info.filename.clone()),
        ("Driver", info.driver.clone()),
        ("Dimensions", format!("{} × {}", info.width, info.height)),
        ("Bands", info.count.to_string()),
        ("CRS", info.crs.clone()),
        ("Transform", transform),
        (
            "Bounds",
            format!(
                "{:.6}, {:.6}, {:.6}, {:.6}",
                info.bounds.west, info.bounds.south, info.bounds.east, info.bounds.north
            ),
        ),
        ("NoData", nodata),
        ("Types", info.dtypes.join(", ")),
    ];
    for (label, value) in rows {
        table.add_row(vec![Cell::new(label).add_attribute(Attribute::Bold), Cell::new(value)]);
    }
    table
}

/// One notification as a coloured terminal line.
pub fn notification_line(n: &Notification) -> String {
    let (r, g, b) = n.level.rgb();
    let marker = match n.phase {
        Phase::Visible => "█",
        Phase::Leaving => "░",
    };
    format!("\x1b[38;2;{};{};{}m{}\x1b[0m [{}] {}", r, g, b, marker, n.id, n.message)
}

pub fn print_notifications<'a>(notifications: impl Iterator<Item = &'a Notification>) {
    for n in notifications {
        println!("{}", notification_line(n));
    }
}

pub fn print_status(ui: &UiState, file_type: FileType, filename: Option<&str>) {
    let loaded = match (file_type, filename) {
        (FileType::Raster, Some(f)) => format!("🗺️ GeoTIFF {}", f),
        (FileType::Vector, Some(f)) => format!("📐 GeoJSON {}", f),
        _ => "nothing loaded".to_string(),
    };
    println!("\n📦 {}", loaded);
    println!(
        "   {} | Opacity: {} | {}",
        ui.zoom_label,
        ui.opacity_label,
        if ui.coordinates_label.is_empty() {
            "Lat: -, Lng: -"
        } else {
            &ui.coordinates_label
        }
    );
    if let Some(table) = panel_table(&ui.panel) {
        println!("{}", table);
    }
    if let Some(popup) = &ui.popup {
        println!("💬 {}", popup.replace("<br>", "\n   "));
    }
}

/// Spinner shown while an upload is in flight.
pub struct Spinner {
    bar: ProgressBar,
}

impl Spinner {
    pub fn new() -> Self {
        let bar = ProgressBar::hidden();
        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg} {elapsed}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        Spinner { bar }
    }
}

impl Default for Spinner {
    fn default() -> Self {
        Spinner::new()
    }
}

impl BusyIndicator for Spinner {
    fn show(&self, message: &str) {
        self.bar.set_draw_target(indicatif::ProgressDrawTarget::stderr());
        self.bar.set_message(message.to_string());
        self.bar.enable_steady_tick(Duration::from_millis(100));
    }

    fn hide(&self) {
        self.bar.disable_steady_tick();
        self.bar.finish_and_clear();
        self.bar.reset();
    }
}
