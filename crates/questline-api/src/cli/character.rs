//! Character CLI commands: register, show, start, finish.

use anyhow::Result;
use chrono::Local;
use comfy_table::{presets, ContentArrangement, Table};
use console::style;

use questline_types::character::GroupName;

use crate::state::AppState;

pub async fn register(
    state: &AppState,
    group: &str,
    username: &str,
    chat_id: i64,
    json: bool,
) -> Result<()> {
    let group: GroupName = group.parse()?;
    let character = state
        .registry
        .register_character(group, username, chat_id)
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&character)?);
        return Ok(());
    }

    println!(
        "{} Registered {} (leader @{})",
        style("✓").green().bold(),
        style(character.group()).cyan(),
        character.username()
    );
    Ok(())
}

pub async fn show(state: &AppState, group: &str, json: bool) -> Result<()> {
    let group: GroupName = group.parse()?;
    let profile = state.query.profile(&group).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&profile)?);
        return Ok(());
    }

    println!();
    println!("  {}  {}", style("Group:").bold(), style(&profile.group).cyan());
    println!("  {}  @{}", style("Leader:").bold(), profile.username);
    match (profile.started_at, profile.finish_at) {
        (Some(started), Some(finish)) => {
            println!(
                "  {}  {} – {}",
                style("Window:").bold(),
                started.with_timezone(&Local).format("%H:%M"),
                finish.with_timezone(&Local).format("%H:%M"),
            );
        }
        _ => println!("  {}  not started", style("Window:").bold()),
    }
    if let Some(booking) = &profile.booking {
        println!(
            "  {}  {} at {}",
            style("Booking:").bold(),
            booking.from.with_timezone(&Local).format("%H:%M"),
            booking.location,
        );
    }
    println!("  {}  {:.2}", style("Rating:").bold(), profile.rating);

    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_BORDERS_ONLY)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Skill", "Points"]);
    for (skill, points) in &profile.skills {
        table.add_row(vec![skill.to_string(), points.to_string()]);
    }
    println!("{table}");
    Ok(())
}

pub async fn start(state: &AppState, group: &str) -> Result<()> {
    let group: GroupName = group.parse()?;
    let finish = state.booking.start_instruction(&group).await?;

    println!(
        "{} Instruction started for {}; finishes at {}",
        style("✓").green().bold(),
        style(&group).cyan(),
        finish.with_timezone(&Local).format("%H:%M")
    );
    Ok(())
}

pub async fn finish(state: &AppState, group: &str) -> Result<()> {
    let group: GroupName = group.parse()?;
    state.booking.finish_instruction(&group).await?;

    println!(
        "{} Instruction finished for {}",
        style("✓").green().bold(),
        style(&group).cyan()
    );
    Ok(())
}
