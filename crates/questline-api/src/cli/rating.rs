//! Leaderboard rendering.

use anyhow::Result;
use comfy_table::{presets, ContentArrangement, Table};

use crate::state::AppState;

pub async fn leaderboard(state: &AppState, json: bool) -> Result<()> {
    let rows = state.query.leaderboard().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_BORDERS_ONLY)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["#", "Group", "Leader", "Rating"]);
    for (rank, row) in rows.iter().enumerate() {
        table.add_row(vec![
            (rank + 1).to_string(),
            row.group.clone(),
            format!("@{}", row.username),
            format!("{:.2}", row.rating),
        ]);
    }
    println!("{table}");
    Ok(())
}
