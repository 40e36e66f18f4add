//! Sahaay reference clinic demo CLI
//!
//! Runs one or all of the reference clinic scenarios, or scores a single
//! questionnaire from the command line. Every scenario goes through the real
//! gateway, view policy and hash-chained audit trail over fictional data.
//!
//! Usage:
//!   cargo run -p demo -- run-all
//!   cargo run -p demo -- therapist-view
//!   cargo run -p demo -- --policy ./my_policy.toml consent-toggle
//!   cargo run -p demo -- score --instrument phq9 --answers 1,2,1,1,0,1,1,0,0

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use sahaay_assessment::{classify, definition, has_crisis_indicator, score};
use sahaay_contracts::{
    assessment::{AssessmentResponse, Instrument},
    error::{SahaayError, SahaayResult},
};
use sahaay_ref_clinic::{
    scenarios::{consent_toggle, messaging, risk_review, screening, therapist_view},
    CARE_TEAM_POLICY,
};

// ── CLI definition ────────────────────────────────────────────────────────────

/// Sahaay reference clinic demo.
///
/// Scenarios show consent-filtered therapist views, screening and banding,
/// risk-flag review, and consent-gated messaging.
#[derive(Parser)]
#[command(
    name = "demo",
    about = "Sahaay reference clinic demo",
    long_about = "Runs Sahaay reference clinic scenarios showing consent enforcement,\n\
                  PHQ-9 / GAD-7 banding, risk review, and audit chain integrity."
)]
struct Cli {
    /// View policy TOML to use instead of the bundled care-team policy.
    #[arg(long, global = true, value_name = "PATH")]
    policy: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run all five scenarios in sequence.
    RunAll,
    /// Scenario 1: PHQ-9 / GAD-7 submission and banding.
    Screening,
    /// Scenario 2: what each party sees of each patient.
    TherapistView,
    /// Scenario 3: revoking and restoring journal sharing.
    ConsentToggle,
    /// Scenario 4: triage queue and acknowledgment.
    RiskReview,
    /// Scenario 5: direct messages and nudges.
    Messaging,
    /// Score one questionnaire and print its band.
    Score {
        /// phq9 or gad7.
        #[arg(long)]
        instrument: Instrument,
        /// Comma-separated answers in question order, each 0-3.
        #[arg(long, value_delimiter = ',', num_args = 1..)]
        answers: Vec<u8>,
    },
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Set RUST_LOG=debug for verbose output.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    let result = run(cli);
    if let Err(e) = result {
        eprintln!("Demo error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> SahaayResult<()> {
    if let Command::Score { instrument, answers } = &cli.command {
        return run_score(*instrument, answers);
    }

    let policy = load_policy(cli.policy.as_ref())?;
    print_banner();

    match cli.command {
        Command::RunAll => run_all(&policy)?,
        Command::Screening => screening::run_scenario(&policy)?,
        Command::TherapistView => therapist_view::run_scenario(&policy)?,
        Command::ConsentToggle => consent_toggle::run_scenario(&policy)?,
        Command::RiskReview => risk_review::run_scenario(&policy)?,
        Command::Messaging => messaging::run_scenario(&policy)?,
        Command::Score { .. } => {}
    }
    println!("All selected scenarios completed successfully.");
    Ok(())
}

fn load_policy(path: Option<&PathBuf>) -> SahaayResult<String> {
    match path {
        Some(path) => {
            debug!(path = %path.display(), "loading view policy");
            std::fs::read_to_string(path).map_err(|e| SahaayError::ConfigError {
                reason: format!("failed to read policy file '{}': {}", path.display(), e),
            })
        }
        None => Ok(CARE_TEAM_POLICY.to_string()),
    }
}

// ── Scenario dispatch ─────────────────────────────────────────────────────────

fn run_all(policy: &str) -> SahaayResult<()> {
    screening::run_scenario(policy)?;
    therapist_view::run_scenario(policy)?;
    consent_toggle::run_scenario(policy)?;
    risk_review::run_scenario(policy)?;
    messaging::run_scenario(policy)?;
    Ok(())
}

// ── Scoring ───────────────────────────────────────────────────────────────────

fn run_score(instrument: Instrument, answers: &[u8]) -> SahaayResult<()> {
    let questionnaire = definition(instrument);
    let response = AssessmentResponse::from_values(instrument, answers)?;
    let total = score(&response, &questionnaire)?;
    let band = classify(instrument, total);

    println!("{}", instrument.name());
    println!("{}", questionnaire.stem);
    for (i, question) in questionnaire.questions.iter().enumerate() {
        let label = response.get(i).map(|a| a.label()).unwrap_or("-");
        println!("  {:>2}. {:<24} {}", i + 1, label, question);
    }
    println!();
    println!("Score: {} / {}", total, questionnaire.max_score());
    println!("Band:  {} ({:?})", band.label, band.tier);
    if has_crisis_indicator(&response) {
        println!("Self-harm item endorsed: follow crisis protocol regardless of total.");
    }
    Ok(())
}

// ── Banner ────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("Sahaay: Consent-aware Care Runtime");
    println!("Reference Clinic Demo");
    println!("===================================");
    println!();
    println!("Per request the gateway:");
    println!("  [1] Resolves the viewer's relationship to the patient (owner / care team / none)");
    println!("  [2] Asks the view policy whether the role may act on each data category");
    println!("  [3] Applies the patient's current consent settings to what remains");
    println!("  [4] Appends an audit record to the SHA-256 hash chain");
    println!();
}
