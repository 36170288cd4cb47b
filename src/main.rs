mod cli;
mod config;
mod db;
mod error;
mod models;
mod projector;
mod tui;
mod utils;

use anyhow::{Context, Result};
use clap::Parser;
use rusqlite::Connection;

use cli::args::{Cli, Commands};
use cli::handlers;
use config::AppConfig;
use db::migrations::run_migrations;

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let mut config = AppConfig::load().context("Loading config")?;

    // Ensure data directory exists and open DB
    AppConfig::ensure_data_dir()?;
    let db_path = AppConfig::db_path()?;
    let conn = Connection::open(&db_path)
        .with_context(|| format!("Opening database at {:?}", db_path))?;
    log::debug!("Using database {:?}", db_path);

    conn.execute_batch("PRAGMA journal_mode=WAL;")?;

    // Run migrations on every startup
    run_migrations(&conn)?;

    match cli.command {
        Some(Commands::Subject { action }) => {
            handlers::handle_subject(&conn, &config, &action)?;
        }
        Some(Commands::Mark {
            subject,
            status,
            date,
        }) => {
            handlers::handle_mark(&conn, &subject, &status, date.as_deref())?;
        }
        Some(Commands::Unmark { subject, date }) => {
            handlers::handle_unmark(&conn, &subject, date.as_deref())?;
        }
        Some(Commands::Status { subject }) => {
            handlers::handle_status(&conn, &config, subject.as_deref())?;
        }
        Some(Commands::History { subject, from, to }) => {
            handlers::handle_history(&conn, &config, &subject, from.as_deref(), to.as_deref())?;
        }
        Some(Commands::Stats { week }) => {
            handlers::handle_stats(&conn, &config, week)?;
        }
        Some(Commands::Export) => {
            handlers::handle_export(&conn, &config)?;
        }
        Some(Commands::Import { file }) => {
            handlers::handle_import(&conn, &config, &file)?;
        }
        Some(Commands::Config {
            default_goal,
            semester_start,
        }) => {
            handlers::handle_config(&conn, &mut config, default_goal, semester_start.as_deref())?;
        }

        // No subcommand → launch TUI
        None => {
            tui::app::run(conn, config)?;
        }
    }

    Ok(())
}
