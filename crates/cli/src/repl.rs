//! Interactive loop: read a line, map it to an action, redraw. Search
//! results arrive asynchronously, so input stays live while one is loading.

use std::io::Write;

use smartshop_core::app::{App, Effect, SearchOutcome};
use smartshop_core::llm::error::LlmDiagnosticsError;
use smartshop_core::ui::settings::SettingsDialog;
use smartshop_core::ui::saved::SavedPanel;
use smartshop_core::ui::{self, Action, ERROR_BANNER};
use tokio::io::{AsyncBufReadExt, BufReader};

const HELP: &str = "\
Type what you are looking for to get recommendations.
  :add <n|id>     save a result to your list
  :rm <n|id>      remove an item from your list
  :list / :close  show or hide your list
  :settings       choose the currency
  :currency CODE  set the currency directly
  :export         download your list as JSON
  :help           this message
  :quit           exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Search(String),
    Add(String),
    Remove(String),
    List,
    Close,
    Settings,
    Currency(String),
    Export,
    Help,
    Quit,
    Empty,
    Unknown(String),
}

pub fn parse_command(line: &str) -> Command {
    let line = line.trim();
    if line.is_empty() {
        return Command::Empty;
    }
    if matches!(line.to_lowercase().as_str(), "quit" | "exit") {
        return Command::Quit;
    }
    let Some(rest) = line.strip_prefix(':') else {
        return Command::Search(line.to_string());
    };

    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest, ""),
    };

    match (name.to_lowercase().as_str(), arg) {
        ("add", a) if !a.is_empty() => Command::Add(a.to_string()),
        ("rm" | "remove", a) if !a.is_empty() => Command::Remove(a.to_string()),
        ("list" | "saved", _) => Command::List,
        ("close", _) => Command::Close,
        ("settings", _) => Command::Settings,
        ("currency", a) if !a.is_empty() => Command::Currency(a.to_string()),
        ("export" | "download", _) => Command::Export,
        ("help" | "h" | "?", _) => Command::Help,
        ("quit" | "q" | "exit", _) => Command::Quit,
        _ => Command::Unknown(line.to_string()),
    }
}

/// A 1-based position into `items` resolves to that item's id; anything
/// else is taken as an id.
fn resolve_id(handle: &str, mut ids: impl Iterator<Item = String>) -> String {
    match handle.parse::<usize>() {
        Ok(n) if n >= 1 => ids.nth(n - 1).unwrap_or_else(|| handle.to_string()),
        _ => handle.to_string(),
    }
}

enum Flow {
    Continue,
    Quit,
}

pub async fn run(app: &mut App) -> anyhow::Result<()> {
    let mut reader = BufReader::new(tokio::io::stdin()).lines();
    render_screen(app);

    loop {
        let prompt = if app.view().settings_open {
            "currency>"
        } else if app.is_searching() {
            "(searching)>"
        } else {
            ">"
        };
        print!("{prompt} ");
        std::io::stdout().flush()?;

        tokio::select! {
            line = reader.next_line() => {
                let Some(line) = line? else { break };
                match handle_line(app, &line) {
                    Ok(Flow::Quit) => break,
                    Ok(Flow::Continue) => {}
                    Err(err) => {
                        tracing::warn!(error = ?err, "command failed");
                        eprintln!("error: {err:#}");
                    }
                }
            }
            completion = app.next_completion() => {
                println!();
                report_outcome(app.apply_completion(completion));
                render_screen(app);
            }
        }
    }

    println!("Bye.");
    Ok(())
}

fn handle_line(app: &mut App, line: &str) -> anyhow::Result<Flow> {
    if app.view().settings_open {
        let dialog = SettingsDialog {
            current: app.view().currency,
        };
        match dialog.select(line) {
            Some(action) => {
                apply(app, action)?;
            }
            None if line.trim().is_empty() => {
                app.dispatch(Action::CloseSettings)?;
            }
            None => {
                println!("Unknown currency: {}", line.trim());
                return Ok(Flow::Continue);
            }
        }
        render_screen(app);
        return Ok(Flow::Continue);
    }

    match parse_command(line) {
        Command::Empty => return Ok(Flow::Continue),
        Command::Quit => return Ok(Flow::Quit),
        Command::Help => {
            println!("{HELP}");
            return Ok(Flow::Continue);
        }
        Command::Unknown(text) => {
            println!("Unknown command: {text} (try :help)");
            return Ok(Flow::Continue);
        }
        Command::Search(query) => {
            app.dispatch(Action::SetQuery(query))?;
            apply(app, Action::Submit)?;
        }
        Command::Add(handle) => {
            let ids = app.view().products.iter().map(|p| p.id.clone());
            let id = resolve_id(&handle, ids);
            apply(app, Action::AddToSaved(id))?;
        }
        Command::Remove(handle) => {
            let ids = app.view().saved.iter().map(|p| p.id.clone());
            let id = resolve_id(&handle, ids);
            apply(app, Action::RemoveFromSaved(id))?;
        }
        Command::List => apply(app, Action::OpenSaved)?,
        Command::Close => apply(app, Action::CloseSaved)?,
        Command::Settings => apply(app, Action::OpenSettings)?,
        Command::Currency(code) => {
            let dialog = SettingsDialog {
                current: app.view().currency,
            };
            match dialog.select(&code) {
                Some(action) => apply(app, action)?,
                None => {
                    println!("Unsupported currency: {code}");
                    return Ok(Flow::Continue);
                }
            }
        }
        Command::Export => apply(app, Action::Export)?,
    }

    render_screen(app);
    Ok(Flow::Continue)
}

fn apply(app: &mut App, action: Action) -> anyhow::Result<()> {
    match app.dispatch(action)? {
        Effect::SearchRejected => println!("Please type what you are looking for."),
        Effect::Saved { added: false } => println!("Already in your list."),
        Effect::Removed { removed: false } => println!("Not in your list."),
        Effect::CurrencyChanged { cleared: true } => {
            println!("Currency changed; search again to see prices in the new currency.")
        }
        Effect::Exported(path) => println!("Saved list written to {}", path.display()),
        _ => {}
    }
    Ok(())
}

pub fn report_outcome(outcome: SearchOutcome) {
    match outcome {
        SearchOutcome::Succeeded { count } => tracing::debug!(count, "results ready"),
        SearchOutcome::Failed(err) => {
            if let Some(diag) = err.downcast_ref::<LlmDiagnosticsError>() {
                tracing::debug!(
                    stage = %diag.stage,
                    model = %diag.model,
                    raw_output = ?diag.raw_output,
                    raw_response_json = ?diag.raw_response_json,
                    "recommendation diagnostics"
                );
            }
            sentry_anyhow::capture_anyhow(&err);
            eprintln!("{ERROR_BANNER}");
        }
        SearchOutcome::Superseded => {}
    }
}

fn render_screen(app: &App) {
    let view = app.view();
    println!("\n{}", ui::render_header(&view));
    print!("{}", ui::render_results(&view));
    if view.saved_open {
        println!();
        print!(
            "{}",
            SavedPanel {
                saved: view.saved,
                currency: view.currency,
            }
            .render()
        );
    }
    if view.settings_open {
        println!();
        print!(
            "{}",
            SettingsDialog {
                current: view.currency,
            }
            .render()
        );
    }
}
