//! Questline CLI entry point.
//!
//! Binary name: `qline`
//!
//! Parses CLI arguments, initializes the database and services, then
//! dispatches to the appropriate command handler.

mod cli;
mod state;

use clap::Parser;
use clap_complete::generate;

use cli::{CharacterCommands, Cli, Commands, LocationCommands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn",
        1 => "info,questline=debug",
        _ => "trace",
    };
    questline_observe::tracing_setup::init_tracing(filter, false)
        .map_err(|e| anyhow::anyhow!("tracing setup failed: {e}"))?;

    // Shell completions don't need app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "qline", &mut std::io::stdout());
        return Ok(());
    }

    let state = AppState::init().await?;

    match cli.command {
        Commands::Init => {
            println!("Initialized data directory at {}", state.data_dir.display());
        }

        Commands::Seed { file } => {
            cli::seed::run(&state, &file, cli.json).await?;
        }

        Commands::Character { command } => match command {
            CharacterCommands::Register {
                group,
                username,
                chat_id,
            } => {
                cli::character::register(&state, &group, &username, chat_id, cli.json).await?;
            }
            CharacterCommands::Show { group } => {
                cli::character::show(&state, &group, cli.json).await?;
            }
            CharacterCommands::Start { group } => {
                cli::character::start(&state, &group).await?;
            }
            CharacterCommands::Finish { group } => {
                cli::character::finish(&state, &group).await?;
            }
        },

        Commands::Location { command } => match command {
            LocationCommands::List => {
                cli::location::list(&state, cli.json).await?;
            }
            LocationCommands::Show { name } => {
                cli::location::show(&state, &name, cli.json).await?;
            }
        },

        Commands::Book {
            group,
            location,
            time,
        } => {
            cli::booking::book(&state, &group, &location, &time).await?;
        }

        Commands::Cancel { group } => {
            cli::booking::cancel(&state, &group).await?;
        }

        Commands::Free { group, location } => {
            cli::booking::free(&state, &group, &location, cli.json).await?;
        }

        Commands::Complete {
            admin,
            group,
            skill,
            points,
        } => {
            cli::booking::complete(&state, &admin, &group, &skill, points).await?;
        }

        Commands::Rating => {
            cli::rating::leaderboard(&state, cli.json).await?;
        }

        Commands::Completions { .. } => unreachable!("handled before state init"),
    }

    Ok(())
}
