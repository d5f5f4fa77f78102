//! CURA Companion Reference Runtime — Demo CLI
//!
//! Runs one or all of the three app-lifecycle demo scenarios.  Each scenario
//! uses real CURA components (session gate, loader, user store) wired
//! together with mock auth, remote, and analysis backends.
//!
//! Usage:
//!   cargo run -p demo -- run-all
//!   cargo run -p demo -- first-login
//!   cargo run -p demo -- offline-sync
//!   cargo run -p demo -- daily-use

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cura_contracts::error::CuraResult;
use cura_ref_companion::scenarios::{daily_use, first_login, offline_sync};

// ── CLI definition ────────────────────────────────────────────────────────────

/// CURA — health companion sync core demo.
///
/// Each subcommand runs one or all of the three lifecycle scenarios,
/// demonstrating the onboarding gate, offline-tolerant loading, and the
/// persist-then-commit write path.
#[derive(Parser)]
#[command(
    name = "demo",
    about = "CURA companion reference runtime demo",
    long_about = "Runs CURA companion demo scenarios showing the session/onboarding gate,\n\
                  retrying remote sync with local fallback, and the per-collection\n\
                  write-through mutators."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run all three lifecycle scenarios in sequence.
    RunAll,
    /// Scenario 1: First Login (sign-up, onboarding gate, first profile save).
    FirstLogin,
    /// Scenario 2: Offline Sync (retries, local fallback, reconciliation).
    OfflineSync,
    /// Scenario 3: Daily Use (history, medications, reminders, appointments).
    DailyUse,
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Initialize structured logging.  Set RUST_LOG=debug for verbose output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    print_banner();

    let result = match cli.command {
        Command::RunAll => run_all().await,
        Command::FirstLogin => first_login::run_scenario().await,
        Command::OfflineSync => offline_sync::run_scenario().await,
        Command::DailyUse => daily_use::run_scenario().await,
    };

    match result {
        Ok(()) => {
            println!("All selected scenarios completed successfully.");
        }
        Err(e) => {
            eprintln!("Demo error: {}", e);
            std::process::exit(1);
        }
    }
}

// ── Scenario dispatch ─────────────────────────────────────────────────────────

async fn run_all() -> CuraResult<()> {
    first_login::run_scenario().await?;
    offline_sync::run_scenario().await?;
    daily_use::run_scenario().await?;
    Ok(())
}

// ── Banner ────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("CURA — Health Companion Sync Core");
    println!("Reference Runtime Demo");
    println!("=================================");
    println!();
    println!("Load pipeline per sign-in:");
    println!("  [1] Auth event → session gate issues one load request");
    println!("  [2] Loader reads the local cache, then fetches the remote profile with retries");
    println!("  [3] Remote row wins and refreshes the cache; offline falls back to the cache");
    println!("  [4] Corrupted keys are reset to defaults; problems aggregate as one warning");
    println!("  [5] Snapshot committed only if its user still matches the active session");
    println!();
}
