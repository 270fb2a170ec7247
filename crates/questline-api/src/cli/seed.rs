//! Seed-file import: locations and their administrators.
//!
//! The seed file is TOML:
//!
//! ```toml
//! [[locations]]
//! name = "Rocket Lab"
//! place = "Hall 2"
//! skills = ["engineering", "social"]
//! max_points = 4
//! admins = [{ chat_id = 7, username = "rocket_admin" }]
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use console::style;
use serde::Deserialize;

use questline_core::service::registry::LocationSeed;

use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct SeedFile {
    #[serde(default)]
    locations: Vec<LocationSeed>,
}

pub async fn run(state: &AppState, file: &Path, json: bool) -> Result<()> {
    let content = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("cannot read seed file {}", file.display()))?;
    let seed: SeedFile = toml::from_str(&content)
        .with_context(|| format!("cannot parse seed file {}", file.display()))?;

    let mut created = Vec::with_capacity(seed.locations.len());
    for location in seed.locations {
        let location = state
            .registry
            .seed_location(location)
            .await
            .with_context(|| "seeding failed; already-created locations are kept")?;
        created.push(location);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&created)?);
        return Ok(());
    }

    for location in &created {
        println!(
            "{} Seeded {} ({} admins)",
            style("✓").green().bold(),
            style(location.name()).cyan(),
            location.admins().len()
        );
    }
    Ok(())
}
