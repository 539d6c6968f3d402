pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "fitnexus",
    about = "FitNexus fit-assistant CLI",
    long_about = "Ask the FitNexus assistant fit questions against the product catalog, and \
                  inspect runtime readiness and configuration.",
    after_help = "Examples:\n  fitnexus ask \"will this hoodie fit me\" --challenge \"Long Torso\"\n  fitnexus doctor --json\n  fitnexus config"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Ask the fit assistant one question and print the advice")]
    Ask {
        #[arg(help = "Natural-language fit question")]
        query: String,
        #[arg(long, default_value = "", help = "Height band, e.g. 5'4\"-5'7\"")]
        height: String,
        #[arg(long = "body-type", default_value = "", help = "Body type, e.g. Pear")]
        body_type: String,
        #[arg(long = "usual-size", default_value = "", help = "Usual garment size")]
        usual_size: String,
        #[arg(long, default_value = "", help = "Fit preference, e.g. Relaxed")]
        preference: String,
        #[arg(long = "challenge", help = "Fit challenge tag (repeatable)")]
        challenges: Vec<String>,
    },
    #[command(about = "Validate config, catalog readability, and generation readiness")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Ask { query, height, body_type, usual_size, preference, challenges } => {
            commands::ask::run(commands::ask::AskRequest {
                query,
                height,
                body_type,
                usual_size,
                preference,
                challenges,
            })
        }
        Command::Doctor { json } => {
            commands::CommandResult { exit_code: 0, output: commands::doctor::run(json) }
        }
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
