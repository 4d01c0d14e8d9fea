//! PostGate CLI - Bridge interface for the dashboard backend
//!
//! Commands: rules, caption, media, gate
//! Outputs JSON to stdout
//! Exit codes: 0 valid, 2 blocked, 1 bad input

use clap::{Parser, Subcommand};
use log::debug;
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;

use postgate_core::{
    CaptionValidator, ComplianceGate, MediaAsset, MediaValidator, PostDraft, RuleRegistry,
};

#[derive(Parser)]
#[command(name = "postgate-cli")]
#[command(about = "PostGate CLI - platform compliance checks for scheduled posts")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Rules document laid over the bundled platform rules
    #[arg(short, long)]
    rules: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the active rule table
    Rules,

    /// Validate a caption
    Caption {
        /// Platform id (instagram, facebook, twitter, linkedin, youtube)
        #[arg(short, long)]
        platform: String,

        /// Caption text
        #[arg(short, long)]
        text: String,
    },

    /// Validate one media asset
    Media {
        /// Platform id
        #[arg(short, long)]
        platform: String,

        /// JSON payload (MediaAsset)
        #[arg(short = 'j', long)]
        payload: String,
    },

    /// Evaluate a full post draft
    Gate {
        /// JSON payload (PostDraft)
        #[arg(short = 'j', long)]
        payload: String,
    },
}

fn emit<T: Serialize>(value: &T) -> bool {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{}", json);
            true
        }
        Err(e) => {
            println!("{}", serde_json::json!({ "error": e.to_string() }));
            false
        }
    }
}

fn verdict(valid: bool) -> ExitCode {
    if valid {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(2)
    }
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let registry = match &cli.rules {
        Some(path) => match RuleRegistry::from_json_file(path) {
            Ok(r) => r,
            Err(e) => {
                println!("{}", serde_json::json!({ "error": e.to_string() }));
                return ExitCode::FAILURE;
            }
        },
        None => RuleRegistry::bundled(),
    };
    debug!("Using rules version {}", registry.rules_version());

    match cli.command {
        Commands::Rules => {
            let fingerprint = match registry.fingerprint() {
                Ok(f) => f,
                Err(e) => {
                    println!("{}", serde_json::json!({ "error": e.to_string() }));
                    return ExitCode::FAILURE;
                }
            };
            let output = serde_json::json!({
                "fingerprint": fingerprint,
                "registry": registry,
            });
            if emit(&output) { ExitCode::SUCCESS } else { ExitCode::FAILURE }
        }

        Commands::Caption { platform, text } => {
            let result = CaptionValidator::new(&registry).validate(&text, &platform);
            if !emit(&result) {
                return ExitCode::FAILURE;
            }
            verdict(result.is_valid())
        }

        Commands::Media { platform, payload } => {
            let asset: MediaAsset = match serde_json::from_str(&payload) {
                Ok(a) => a,
                Err(e) => {
                    println!(
                        "{}",
                        serde_json::json!({ "isValid": false, "error": format!("Invalid payload: {}", e) })
                    );
                    return ExitCode::FAILURE;
                }
            };
            let result = MediaValidator::new(&registry).validate(Some(&asset), Some(&platform));
            if !emit(&result) {
                return ExitCode::FAILURE;
            }
            verdict(result.is_valid())
        }

        Commands::Gate { payload } => {
            let draft: PostDraft = match serde_json::from_str(&payload) {
                Ok(d) => d,
                Err(e) => {
                    println!(
                        "{}",
                        serde_json::json!({ "schedulable": false, "error": format!("Invalid payload: {}", e) })
                    );
                    return ExitCode::FAILURE;
                }
            };
            match ComplianceGate::new(&registry).evaluate(&draft) {
                Ok(report) => {
                    if !emit(&report) {
                        return ExitCode::FAILURE;
                    }
                    verdict(report.schedulable)
                }
                Err(e) => {
                    println!("{}", serde_json::json!({ "schedulable": false, "error": e.to_string() }));
                    ExitCode::FAILURE
                }
            }
        }
    }
}
