//! Line-oriented frontend: parses typed commands into intents and renders
//! feedback and snapshots as text.

use std::fmt::Write;

use chempredict_core::types::{ChatRole, PredictionResult, COMPOUND_SEPARATOR};
use chempredict_session::{ClearOutcome, LifecycleState, SendOutcome, SubmitOutcome};

use crate::controller::{ActiveView, Feedback, Intent, ViewSnapshot};

pub const HELP: &str = "\
Commands:
  home | predict | research     switch view
  set <reactant1> + <reactant2> fill in the prediction form
  model rule|ml                 choose the predictor
  submit                        run the prediction
  history                       list recent predictions
  replay <n>                    re-run history entry n (1 = newest)
  ack                           dismiss the current result
  export                        save a report for the current result
  say <message>                 ask the research assistant
  clear                         clear the chat session
  health                        check the backend
  status                        show the current view
  help | quit";

/// A parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Intent(Intent),
    ShowHistory,
    ShowStatus,
    Help,
    Quit,
    Empty,
    Unknown(String),
}

/// Parse one line. In the research view, text that is not a command is sent
/// to the assistant.
pub fn parse_line(line: &str, view: ActiveView) -> Command {
    let line = line.trim();
    if line.is_empty() {
        return Command::Empty;
    }
    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (line, ""),
    };

    match head.to_ascii_lowercase().as_str() {
        "home" | "predict" | "research" if rest.is_empty() => match head.parse::<ActiveView>() {
            Ok(v) => Command::Intent(Intent::SelectView(v)),
            Err(e) => Command::Unknown(e),
        },
        "set" => match split_reactants(rest) {
            Some((r1, r2)) => Command::Intent(Intent::EditReactants {
                reactant1: r1.to_string(),
                reactant2: r2.to_string(),
            }),
            None => Command::Unknown("usage: set <reactant1> + <reactant2>".to_string()),
        },
        "model" => match rest.to_ascii_lowercase().as_str() {
            "rule" | "rules" | "rule-based" => Command::Intent(Intent::ToggleModel(false)),
            "ml" | "model" | "model-backed" => Command::Intent(Intent::ToggleModel(true)),
            _ => Command::Unknown("usage: model rule|ml".to_string()),
        },
        "submit" | "go" => Command::Intent(Intent::Submit),
        "history" => Command::ShowHistory,
        "replay" => match rest.parse::<usize>() {
            Ok(n) if n >= 1 => Command::Intent(Intent::Replay(n - 1)),
            _ => Command::Unknown("usage: replay <n>".to_string()),
        },
        "ack" => Command::Intent(Intent::Acknowledge),
        "export" => Command::Intent(Intent::ExportReport),
        "say" => Command::Intent(Intent::SendChat(rest.to_string())),
        "clear" => Command::Intent(Intent::ClearChat),
        "health" => Command::Intent(Intent::CheckHealth),
        "status" => Command::ShowStatus,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        _ if view == ActiveView::Research => Command::Intent(Intent::SendChat(line.to_string())),
        _ => Command::Unknown(format!("unknown command: {} (try 'help')", head)),
    }
}

/// Split `"<a> + <b>"` into two reactants. The spaced separator wins so ion
/// names such as `Na+` survive; a bare `+` is accepted only when no spaced
/// separator is present.
fn split_reactants(text: &str) -> Option<(&str, &str)> {
    let (r1, r2) = text
        .split_once(COMPOUND_SEPARATOR)
        .or_else(|| text.split_once('+'))?;
    Some((r1.trim(), r2.trim()))
}

pub fn render_result(result: &PredictionResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Reaction type:   {}", result.reaction_type);
    if let Some(ref product) = result.product {
        let _ = writeln!(out, "Product:         {}", product);
    }
    let _ = writeln!(out, "Predicted yield: {}", result.predicted_yield);
    let _ = writeln!(out, "Hazard level:    {}", result.safety_hazard_level);
    if let Some(ref method) = result.prediction_method {
        let _ = writeln!(out, "Method:          {}", method);
    }
    if let Some(ref description) = result.reaction_description {
        let _ = writeln!(out, "{}", description);
    }
    out.trim_end().to_string()
}

pub fn render_feedback(feedback: &Feedback) -> String {
    match feedback {
        Feedback::ViewChanged(view) => format!("[{}]", view),
        Feedback::DraftUpdated => String::new(),
        Feedback::Prediction(outcome) => match outcome {
            SubmitOutcome::Succeeded(result) => render_result(result),
            SubmitOutcome::Failed(err) => err.user_message(),
            SubmitOutcome::Ignored => "Nothing to do.".to_string(),
            SubmitOutcome::Discarded => String::new(),
        },
        Feedback::Acknowledged(true) => "Result dismissed.".to_string(),
        Feedback::Acknowledged(false) => String::new(),
        Feedback::Exported(path) => format!("Report saved to {}", path.display()),
        Feedback::NothingToExport => "No completed prediction to export.".to_string(),
        Feedback::Chat(outcome) => match outcome {
            SendOutcome::Replied(turn) => {
                let mut out = format!("assistant> {}", turn.content);
                if !turn.sources.is_empty() {
                    let _ = write!(out, "\n  sources: {}", turn.sources.join("; "));
                }
                out
            }
            SendOutcome::Failed { turn, .. } => format!("assistant> {}", turn.content),
            SendOutcome::Ignored | SendOutcome::Discarded => String::new(),
        },
        Feedback::ChatCleared(outcome) => match outcome {
            ClearOutcome::Cleared => "Chat cleared.".to_string(),
            ClearOutcome::Failed(err) => err.user_message(),
            ClearOutcome::Ignored | ClearOutcome::Discarded => String::new(),
        },
        Feedback::Health(Ok(status)) => format!("Backend is up: {}", status.message),
        Feedback::Health(Err(err)) => err.user_message(),
    }
}

pub fn render_history(snapshot: &ViewSnapshot) -> String {
    if snapshot.history.is_empty() {
        return "No predictions yet.".to_string();
    }
    let mut out = String::new();
    for (i, entry) in snapshot.history.iter().enumerate() {
        let _ = writeln!(
            out,
            "{}. {}  {}  {}  ({})",
            i + 1,
            entry.compound_label,
            entry.reaction_type,
            entry.predicted_yield,
            entry.created_at.format("%H:%M:%S")
        );
    }
    out.trim_end().to_string()
}

pub fn render_status(snapshot: &ViewSnapshot) -> String {
    let mut out = format!("[{}]", snapshot.active_view);
    match snapshot.active_view {
        ActiveView::Home => {
            let _ = write!(out, " predict reactions or ask the research assistant");
        }
        ActiveView::Predict => {
            let draft = &snapshot.draft;
            let _ = write!(
                out,
                "\n  reactants: '{}' + '{}'\n  model: {}",
                draft.reactant1,
                draft.reactant2,
                if draft.use_alternate_model { "ml" } else { "rule" }
            );
            match &snapshot.prediction {
                LifecycleState::Idle => {}
                LifecycleState::InFlight => {
                    let _ = write!(out, "\n  predicting...");
                }
                LifecycleState::Succeeded(result) => {
                    let _ = write!(out, "\n{}", render_result(result));
                }
                LifecycleState::Failed(err) => {
                    let _ = write!(out, "\n  {}", err.user_message());
                }
            }
        }
        ActiveView::Research => {
            let _ = write!(out, " session {}", snapshot.session_id);
            for turn in &snapshot.transcript {
                let who = match turn.role {
                    ChatRole::User => "you",
                    ChatRole::Assistant => "assistant",
                };
                let _ = write!(out, "\n{}> {}", who, turn.content);
            }
            if snapshot.awaiting_reply {
                let _ = write!(out, "\n  waiting for reply...");
            }
            if snapshot.clearing_chat {
                let _ = write!(out, "\n  clearing chat...");
            }
        }
    }
    out
}
