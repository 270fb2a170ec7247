//! CLI argument definitions and command modules.

pub mod booking;
pub mod character;
pub mod location;
pub mod rating;
pub mod seed;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

#[derive(Parser)]
#[command(name = "qline", version, about = "Quest-event booking and rating coordinator")]
pub struct Cli {
    /// Emit machine-readable JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the data directory and database
    Init,

    /// Import locations and administrators from a TOML seed file
    Seed {
        /// Path to the seed file
        file: PathBuf,
    },

    /// Manage characters
    Character {
        #[command(subcommand)]
        command: CharacterCommands,
    },

    /// Inspect locations
    Location {
        #[command(subcommand)]
        command: LocationCommands,
    },

    /// Book an interval at a location
    Book {
        /// Group name, e.g. RK9-51
        group: String,
        /// Location name
        location: String,
        /// Start time as HH:MM on the current day
        time: String,
    },

    /// Cancel the group's active booking
    Cancel {
        /// Group name
        group: String,
    },

    /// List the intervals a group can still book at a location
    Free {
        /// Group name
        group: String,
        /// Location name
        location: String,
    },

    /// Complete a booking and award points, as a location administrator
    Complete {
        /// Administrator username; determines the location
        admin: String,
        /// Group name
        group: String,
        /// Rewarded skill, e.g. engineering
        skill: String,
        /// Points to credit
        points: i32,
    },

    /// Show the rating leaderboard
    Rating,

    /// Generate shell completions
    Completions {
        /// Target shell
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum CharacterCommands {
    /// Register a new character
    Register {
        /// Group name, e.g. RK9-51
        group: String,
        /// Leader's username
        username: String,
        /// Leader's chat id
        #[arg(long)]
        chat_id: i64,
    },

    /// Show a character's profile
    Show {
        /// Group name
        group: String,
    },

    /// Open the instruction window
    Start {
        /// Group name
        group: String,
    },

    /// Force the instruction window shut
    Finish {
        /// Group name
        group: String,
    },
}

#[derive(Subcommand)]
pub enum LocationCommands {
    /// List all locations
    List,

    /// Show one location with its timetable
    Show {
        /// Location name
        name: String,
    },
}
