//! Output Formatting
//!
//! `tanod active` feeds the snapshot through a `MarkerLayer` with a
//! table-building renderer, so what is printed is exactly the marker set a
//! map viewer would draw.

use crate::commands::OutputFormat;
use serde::Serialize;
use std::collections::BTreeMap;
use tanod_api::HealthResponse;
use tanod_core::{GeoPoint, OfficerId, TrackedOfficer};
use tanod_map::{MarkerPopup, MarkerRenderer, MarkerStyle};

/// One table row per marker
#[derive(Debug, Clone)]
pub struct MarkerRow {
    pub position: GeoPoint,
    pub style: MarkerStyle,
    pub popup: MarkerPopup,
}

/// Renderer that keeps the current markers as table rows
#[derive(Debug, Default)]
pub struct TableRenderer {
    rows: BTreeMap<OfficerId, MarkerRow>,
}

impl TableRenderer {
    pub fn rows(&self) -> impl Iterator<Item = (&OfficerId, &MarkerRow)> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl MarkerRenderer for TableRenderer {
    fn create(&mut self, officer_id: &OfficerId, position: GeoPoint, style: &MarkerStyle, popup: &MarkerPopup) {
        self.rows.insert(
            officer_id.clone(),
            MarkerRow {
                position,
                style: style.clone(),
                popup: popup.clone(),
            },
        );
    }

    fn move_to(&mut self, officer_id: &OfficerId, position: GeoPoint) {
        if let Some(row) = self.rows.get_mut(officer_id) {
            row.position = position;
        }
    }

    fn restyle(&mut self, officer_id: &OfficerId, style: &MarkerStyle, popup: &MarkerPopup) {
        if let Some(row) = self.rows.get_mut(officer_id) {
            row.style = style.clone();
            row.popup = popup.clone();
        }
    }

    fn remove(&mut self, officer_id: &OfficerId) {
        self.rows.remove(officer_id);
    }
}

/// Print as JSON
pub fn print_json<T: Serialize>(data: &T) {
    match serde_json::to_string_pretty(data) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error formatting JSON: {}", e),
    }
}

pub fn print_health(health: &HealthResponse, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(health),
        OutputFormat::Table => {
            println!("Tanod Tracking Health");
            println!("=====================");
            print_row("Status:", &health.status);
            print_row("Version:", &health.version);
            print_row("Active officers:", &health.active_officers.to_string());
            print_row("Viewers:", &health.viewers.to_string());
        }
    }
}

/// Print one officer record
pub fn print_location(record: &TrackedOfficer, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(record),
        OutputFormat::Table => {
            let location = &record.location;
            print_row("Officer:", location.officer_id.as_str());
            if let Some(name) = &record.officer_name {
                print_row("Name:", name);
            }
            if let Some(position) = &location.position {
                print_row(
                    "Position:",
                    &format!("{:.6}, {:.6}", position.latitude, position.longitude),
                );
            }
            print_row("Active:", &location.is_active.to_string());
            print_row("On patrol:", &location.is_on_patrol.to_string());
            print_row("Marker color:", &location.marker_color);
            if let Some(schedule_id) = &location.current_schedule_id {
                print_row("Schedule:", schedule_id.as_str());
            }
            print_row("Last update:", &location.last_update.to_rfc3339());
        }
    }
}

/// Print the markers held by a table renderer
pub fn print_markers(table: &TableRenderer) {
    if table.is_empty() {
        println!("No active officers.");
        return;
    }
    println!(
        "{:<12} {:<20} {:>11} {:>12} {:<10} {:<11} {}",
        "OFFICER", "NAME", "LAT", "LON", "COLOR", "STATUS", "AREA"
    );
    print_separator();
    for (officer_id, row) in table.rows() {
        println!(
            "{:<12} {:<20} {:>11.6} {:>12.6} {:<10} {:<11} {}",
            officer_id.as_str(),
            row.popup.title,
            row.position.latitude,
            row.position.longitude,
            row.style.color,
            row.popup.status,
            row.popup.area.as_deref().unwrap_or("-"),
        );
    }
    println!();
    println!("{} officer(s) on the map", table.len());
}

/// Print a table row
pub fn print_row(key: &str, value: &str) {
    println!("{:<18} {}", key, value);
}

/// Print a separator line
pub fn print_separator() {
    println!("{}", "-".repeat(90));
}
