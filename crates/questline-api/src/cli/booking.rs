//! Booking CLI commands: book, cancel, free, complete.

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Local, NaiveTime, Utc};
use comfy_table::{presets, ContentArrangement, Table};
use console::style;

use questline_types::character::GroupName;
use questline_types::skill::SkillType;

use crate::state::AppState;

/// Parse `HH:MM` as an instant on the current local day.
fn parse_local_time(s: &str) -> Result<DateTime<Utc>> {
    let time = NaiveTime::parse_from_str(s, "%H:%M")
        .with_context(|| format!("invalid time '{s}'; expected HH:MM"))?;
    let local = Local::now()
        .date_naive()
        .and_time(time)
        .and_local_timezone(Local)
        .single()
        .ok_or_else(|| anyhow!("ambiguous local time '{s}'"))?;
    Ok(local.with_timezone(&Utc))
}

pub async fn book(state: &AppState, group: &str, location: &str, time: &str) -> Result<()> {
    let group: GroupName = group.parse()?;
    let start = parse_local_time(time)?;

    let location = state.query.location_by_name(location).await?;
    let interval = state.booking.book(&group, location.id(), start).await?;

    println!(
        "{} {} booked {} from {} to {}",
        style("✓").green().bold(),
        style(&group).cyan(),
        style(location.name()).cyan(),
        interval.start().with_timezone(&Local).format("%H:%M"),
        interval.end().with_timezone(&Local).format("%H:%M"),
    );
    Ok(())
}

pub async fn cancel(state: &AppState, group: &str) -> Result<()> {
    let group: GroupName = group.parse()?;

    let profile = state.query.profile(&group).await?;
    let booking = profile
        .booking
        .ok_or_else(|| anyhow!("{group} has no active booking"))?;

    let location = state.query.location_by_name(&booking.location).await?;
    state.booking.cancel_booking(&group, location.id()).await?;

    println!(
        "{} Cancelled {}'s booking at {}",
        style("✓").green().bold(),
        style(&group).cyan(),
        location.name()
    );
    Ok(())
}

pub async fn free(state: &AppState, group: &str, location: &str, json: bool) -> Result<()> {
    let group: GroupName = group.parse()?;
    let intervals = state.query.available_intervals(&group, location).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&intervals)?);
        return Ok(());
    }

    if intervals.is_empty() {
        println!("No free intervals left at {location}.");
        return Ok(());
    }

    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_BORDERS_ONLY)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["From", "To"]);
    for interval in &intervals {
        table.add_row(vec![
            interval.start().with_timezone(&Local).format("%H:%M").to_string(),
            interval.end().with_timezone(&Local).format("%H:%M").to_string(),
        ]);
    }
    println!("{table}");
    Ok(())
}

pub async fn complete(
    state: &AppState,
    admin: &str,
    group: &str,
    skill: &str,
    points: i32,
) -> Result<()> {
    let group: GroupName = group.parse()?;
    let skill: SkillType = skill.parse().map_err(|e: String| anyhow!(e))?;

    let location = state
        .query
        .location_by_admin(admin)
        .await
        .with_context(|| format!("@{admin} does not administer any location"))?;

    state
        .booking
        .complete(&group, location.id(), skill, points)
        .await?;

    println!(
        "{} {} completed {}: +{points} {skill}",
        style("✓").green().bold(),
        style(&group).cyan(),
        location.name(),
    );
    Ok(())
}
