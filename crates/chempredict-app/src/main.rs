//! ChemPredict client binary - composition root.
//!
//! 1. Parse CLI args and load configuration from TOML
//! 2. Initialize tracing
//! 3. Build the HTTP backend client
//! 4. Run a one-shot command or the interactive session

mod cli;
mod controller;
mod repl;

use std::io::Write;
use std::sync::Arc;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};

use chempredict_client::HttpChemService;
use chempredict_core::ChemPredictConfig;
use chempredict_session::{SendOutcome, SubmitOutcome};

use cli::{CliArgs, Command};
use controller::{AppController, Feedback, Intent};
use repl::Command as ReplCommand;

fn prompt(view: controller::ActiveView) {
    print!("chempredict:{}> ", view);
    let _ = std::io::stdout().flush();
}

fn show(text: &str) {
    if !text.is_empty() {
        println!("{}", text);
    }
}

async fn run_repl(mut app: AppController) -> Result<(), Box<dyn std::error::Error>> {
    println!("ChemPredict v{}  (type 'help' for commands)", env!("CARGO_PKG_VERSION"));
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        prompt(app.active_view());
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else {
            println!();
            break;
        };

        let intent = match repl::parse_line(&line, app.active_view()) {
            ReplCommand::Intent(intent) => intent,
            ReplCommand::ShowHistory => {
                show(&repl::render_history(&app.snapshot()));
                continue;
            }
            ReplCommand::ShowStatus => {
                show(&repl::render_status(&app.snapshot()));
                continue;
            }
            ReplCommand::Help => {
                show(repl::HELP);
                continue;
            }
            ReplCommand::Quit => break,
            ReplCommand::Empty => continue,
            ReplCommand::Unknown(msg) => {
                show(&msg);
                continue;
            }
        };

        if matches!(intent, Intent::Submit | Intent::Replay(_)) {
            println!("predicting...");
        }

        let interrupted = tokio::select! {
            result = app.dispatch(intent) => {
                match result {
                    Ok(feedback) => show(&repl::render_feedback(&feedback)),
                    Err(e) => {
                        tracing::warn!(error = %e, "Intent failed");
                        show(&format!("Error: {}", e));
                    }
                }
                false
            }
            _ = tokio::signal::ctrl_c() => true,
        };
        if interrupted {
            println!();
            break;
        }
    }

    app.teardown();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config.
    let config_file = args.resolve_config_path();
    let mut config = ChemPredictConfig::load_or_default(&config_file);
    config.service.base_url = args.resolve_base_url(&config.service.base_url);

    // Tracing.
    let level = args
        .log_level
        .clone()
        .unwrap_or_else(|| config.general.log_level.clone());
    chempredict_core::logging::init(&level);

    tracing::info!("Starting ChemPredict client v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        path = %config_file.display(),
        base_url = %config.service.base_url,
        "Configuration resolved"
    );

    // Backend client.
    let service = Arc::new(HttpChemService::new(config.service.clone())?);
    let mut app = AppController::new(service, &config);

    match args.command() {
        Command::Predict {
            reactant1,
            reactant2,
            use_alternate_model,
            export,
            json,
        } => {
            app.dispatch(Intent::EditReactants {
                reactant1,
                reactant2,
            })
            .await?;
            app.dispatch(Intent::ToggleModel(use_alternate_model)).await?;
            let feedback = app.dispatch(Intent::Submit).await?;
            match &feedback {
                Feedback::Prediction(SubmitOutcome::Succeeded(result)) if json => {
                    println!("{}", serde_json::to_string_pretty(result)?);
                }
                Feedback::Prediction(SubmitOutcome::Succeeded(_)) => {
                    show(&repl::render_feedback(&feedback));
                }
                other => {
                    eprintln!("{}", repl::render_feedback(other));
                    std::process::exit(1);
                }
            }
            if export {
                show(&repl::render_feedback(
                    &app.dispatch(Intent::ExportReport).await?,
                ));
            }
        }
        Command::Chat { message } => {
            let feedback = app.dispatch(Intent::SendChat(message)).await?;
            show(&repl::render_feedback(&feedback));
            if !matches!(feedback, Feedback::Chat(SendOutcome::Replied(_))) {
                std::process::exit(1);
            }
        }
        Command::Health => {
            let feedback = app.dispatch(Intent::CheckHealth).await?;
            show(&repl::render_feedback(&feedback));
            if !matches!(feedback, Feedback::Health(Ok(_))) {
                std::process::exit(1);
            }
        }
        Command::Repl => run_repl(app).await?,
    }

    tracing::info!("ChemPredict client exiting");
    Ok(())
}
