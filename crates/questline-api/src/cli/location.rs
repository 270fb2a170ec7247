//! Location CLI commands: list, show.

use anyhow::Result;
use chrono::Local;
use comfy_table::{presets, ContentArrangement, Table};
use console::style;

use crate::state::AppState;

pub async fn list(state: &AppState, json: bool) -> Result<()> {
    let locations = state.query.locations().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&locations)?);
        return Ok(());
    }

    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_BORDERS_ONLY)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Name", "Place", "Skills", "Max points", "Booked"]);
    for location in &locations {
        let skills = location
            .skills()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        table.add_row(vec![
            location.name().to_string(),
            location.place().unwrap_or("—").to_string(),
            skills,
            location.max_points().to_string(),
            location.calendar().len().to_string(),
        ]);
    }
    println!("{table}");
    Ok(())
}

pub async fn show(state: &AppState, name: &str, json: bool) -> Result<()> {
    let location = state.query.location_by_name(name).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&location)?);
        return Ok(());
    }

    println!();
    println!("  {}  {}", style("Name:").bold(), style(location.name()).cyan());
    if let Some(description) = location.description() {
        println!("  {}  {}", style("About:").bold(), description);
    }
    if let Some(place) = location.place() {
        println!("  {}  {}", style("Place:").bold(), place);
    }
    let skills = location
        .skills()
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    println!("  {}  {}", style("Skills:").bold(), skills);
    println!("  {}  {}", style("Max points:").bold(), location.max_points());
    for admin in location.admins() {
        println!("  {}  @{}", style("Admin:").bold(), admin.username());
    }

    if location.calendar().is_empty() {
        println!("\n  No bookings yet.");
        return Ok(());
    }

    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_BORDERS_ONLY)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["From", "To", "Group"]);
    for interval in location.calendar() {
        table.add_row(vec![
            interval.start().with_timezone(&Local).format("%H:%M").to_string(),
            interval.end().with_timezone(&Local).format("%H:%M").to_string(),
            interval.booked_by().to_string(),
        ]);
    }
    println!("{table}");
    Ok(())
}
