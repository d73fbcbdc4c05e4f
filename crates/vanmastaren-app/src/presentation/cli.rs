use clap::{Parser, Subcommand};
use futures::StreamExt;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tracing::info;

use crate::application::commands::habit_commands::*;
use crate::application::commands::CommandHandler;
use crate::application::dtos::{HabitDto, HabitStreakDto};
use crate::application::services::LogLevel;
use crate::presentation::error::CommandError;
use crate::presentation::state::AppState;

/// How often `watch` re-reads the store so day rollovers show up.
const WATCH_REFRESH_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Parser)]
#[command(name = "vanmastaren", version, about = "Daily habit tracker")]
pub struct Cli {
    /// Path to the config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a habit
    Add {
        name: String,
        /// Record today's completion right away
        #[arg(long)]
        done: bool,
    },
    /// List habits with today's status
    List,
    /// Mark today done, or undo it
    Toggle { id: String },
    /// Rename a habit
    Rename { id: String, name: String },
    /// Delete a habit
    Delete { id: String },
    /// Streak statistics for one habit, or all of them
    Stats { id: Option<String> },
    /// Print the habit list every time it changes
    Watch,
    /// Show the configured log level, or set it for the next start
    LogLevel { level: Option<LogLevel> },
}

pub async fn run(cli: Cli, state: &AppState) -> Result<(), CommandError> {
    let json = cli.json;

    match cli.command {
        Commands::Add { name, done } => {
            let result = state
                .command_handlers
                .create_habit
                .handle(CreateHabitCommand {
                    name,
                    completed_today: done,
                })
                .await?;
            print_habit(&result.habit, json)?;
        }
        Commands::List => {
            let habits = state.queries.habit.list_habits().await?;
            print_habits(&habits, json)?;
        }
        Commands::Toggle { id } => {
            let result = state
                .command_handlers
                .toggle_completion
                .handle(ToggleCompletionCommand { habit_id: id })
                .await?;
            print_habit(&result.habit, json)?;
        }
        Commands::Rename { id, name } => {
            let result = state
                .command_handlers
                .rename_habit
                .handle(RenameHabitCommand { habit_id: id, name })
                .await?;
            print_habit(&result.habit, json)?;
        }
        Commands::Delete { id } => {
            state
                .command_handlers
                .delete_habit
                .handle(DeleteHabitCommand {
                    habit_id: id.clone(),
                })
                .await?;
            if json {
                println!("{}", serde_json::json!({ "deleted": id }));
            } else {
                println!("Deleted {}", id);
            }
        }
        Commands::Stats { id: Some(id) } => {
            let stats = state.queries.habit.streak_stats(&id).await?;
            print_stats(std::slice::from_ref(&stats), json)?;
        }
        Commands::Stats { id: None } => {
            let stats = state.queries.habit.all_streak_stats().await?;
            print_stats(&stats, json)?;
        }
        Commands::Watch => watch(state, json).await?,
        Commands::LogLevel { level: Some(level) } => {
            state.services.config.set_log_level(level)?;
            println!("Log level set to {} (applies on next start)", level.as_str());
        }
        Commands::LogLevel { level: None } => {
            println!("{}", state.services.config.get_log_level().as_str());
        }
    }

    Ok(())
}

async fn watch(state: &AppState, json: bool) -> Result<(), CommandError> {
    let feed = state.services.snapshot_feed.clone();
    let mut snapshots = Box::pin(feed.subscribe());
    let mut failures = state.services.write_failures.subscribe();
    let mut ticker = tokio::time::interval(WATCH_REFRESH_INTERVAL);
    ticker.tick().await;

    info!("Watching habits");

    loop {
        tokio::select! {
            snapshot = snapshots.next() => match snapshot {
                Some(habits) => {
                    print_habits(&habits, json)?;
                    if !json {
                        println!();
                    }
                }
                None => break,
            },
            failure = failures.recv() => match failure {
                Ok(failure) => eprintln!(
                    "warning: could not save {} ({}): {}",
                    failure.habit_id, failure.operation, failure.message
                ),
                Err(RecvError::Lagged(skipped)) => {
                    eprintln!("warning: {} write failures not shown", skipped)
                }
                Err(RecvError::Closed) => break,
            },
            _ = ticker.tick() => {
                feed.publish_latest().await;
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    Ok(())
}

fn print_habit(habit: &HabitDto, json: bool) -> Result<(), CommandError> {
    if json {
        println!("{}", serde_json::to_string_pretty(habit)?);
    } else {
        println!("{}", habit_line(habit));
    }
    Ok(())
}

fn print_habits(habits: &[HabitDto], json: bool) -> Result<(), CommandError> {
    if json {
        println!("{}", serde_json::to_string_pretty(habits)?);
        return Ok(());
    }

    if habits.is_empty() {
        println!("No habits yet");
    }
    for habit in habits {
        println!("{}", habit_line(habit));
    }
    Ok(())
}

fn print_stats(stats: &[HabitStreakDto], json: bool) -> Result<(), CommandError> {
    if json {
        println!("{}", serde_json::to_string_pretty(stats)?);
        return Ok(());
    }

    for s in stats {
        println!(
            "{:<24} current {:>3}  longest {:>3}  days {:>4}  last {}",
            s.habit_name,
            s.current_streak,
            s.longest_streak,
            s.completed_days,
            s.last_completion_date.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}

fn habit_line(habit: &HabitDto) -> String {
    format!(
        "[{}] {:<24} streak {:>3}  total {:>4}  {}",
        if habit.is_completed_today { "x" } else { " " },
        habit.name,
        habit.streak,
        habit.total_days,
        habit.id
    )
}
