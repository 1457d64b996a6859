pub mod state;

use crate::domain::currency::{find_currency, DEFAULT_CURRENCY};
use crate::domain::product::{LoadingStatus, Product};
use crate::llm::RecommendationClient;
use crate::storage::export;
use crate::storage::preferences::{PreferenceStore, CURRENCY_KEY};
use crate::ui::Action;
use anyhow::Context;
use state::{AppState, AppView, SearchTicket};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// A finished recommendation call, tagged with the ticket it was issued for.
#[derive(Debug)]
pub struct SearchCompletion {
    pub ticket: SearchTicket,
    pub result: anyhow::Result<Vec<Product>>,
}

#[derive(Debug)]
pub enum SearchOutcome {
    Succeeded { count: usize },
    Failed(anyhow::Error),
    /// A newer search was started after this one; its result was dropped.
    Superseded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    None,
    SearchStarted { generation: u64 },
    SearchRejected,
    Saved { added: bool },
    Removed { removed: bool },
    CurrencyChanged { cleared: bool },
    Exported(PathBuf),
}

/// Owns the UI state and wires actions to the recommendation client,
/// preference storage and export.
///
/// Overlapping searches are cancel-and-replace: submitting aborts the
/// in-flight request, and any completion from an older generation that still
/// arrives is discarded.
pub struct App {
    client: Arc<dyn RecommendationClient>,
    prefs: Box<dyn PreferenceStore>,
    state: AppState,
    export_dir: PathBuf,
    tx: mpsc::UnboundedSender<SearchCompletion>,
    rx: mpsc::UnboundedReceiver<SearchCompletion>,
    inflight: Option<JoinHandle<()>>,
}

impl App {
    pub fn new(
        client: Arc<dyn RecommendationClient>,
        prefs: Box<dyn PreferenceStore>,
        export_dir: PathBuf,
    ) -> anyhow::Result<Self> {
        let stored = prefs
            .get(CURRENCY_KEY)
            .context("failed to read currency preference")?;
        let currency = match stored.as_deref().map(|code| (code, find_currency(code))) {
            Some((_, Some(known))) => known.code.to_string(),
            Some((code, None)) => {
                tracing::warn!(stored = %code, "unsupported stored currency; using default");
                DEFAULT_CURRENCY.to_string()
            }
            None => DEFAULT_CURRENCY.to_string(),
        };

        tracing::debug!(%currency, model = client.model(), "app initialized");

        let (tx, rx) = mpsc::unbounded_channel();
        Ok(Self {
            client,
            prefs,
            state: AppState::new(&currency),
            export_dir,
            tx,
            rx,
            inflight: None,
        })
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn view(&self) -> AppView<'_> {
        self.state.view()
    }

    pub fn is_searching(&self) -> bool {
        self.state.status() == LoadingStatus::Loading
    }

    pub fn dispatch(&mut self, action: Action) -> anyhow::Result<Effect> {
        let effect = match action {
            Action::SetQuery(query) => {
                self.state.set_query(query);
                Effect::None
            }
            Action::Submit => self.submit(),
            Action::AddToSaved(id) => Effect::Saved {
                added: self.state.add_to_saved(&id),
            },
            Action::RemoveFromSaved(id) => Effect::Removed {
                removed: self.state.remove_from_saved(&id),
            },
            Action::OpenSaved => {
                self.state.set_saved_open(true);
                Effect::None
            }
            Action::CloseSaved => {
                self.state.set_saved_open(false);
                Effect::None
            }
            Action::OpenSettings => {
                self.state.set_settings_open(true);
                Effect::None
            }
            Action::CloseSettings => {
                self.state.set_settings_open(false);
                Effect::None
            }
            Action::ChangeCurrency(code) => self.change_currency(&code)?,
            Action::Export => {
                let path = export::write_saved_list(&self.export_dir, self.state.saved())?;
                Effect::Exported(path)
            }
        };
        Ok(effect)
    }

    fn submit(&mut self) -> Effect {
        let Some(ticket) = self.state.begin_search() else {
            return Effect::SearchRejected;
        };

        if let Some(previous) = self.inflight.take() {
            previous.abort();
            tracing::debug!(generation = ticket.generation, "aborted superseded search");
        }

        tracing::info!(
            generation = ticket.generation,
            query = %ticket.request.query,
            currency = %ticket.request.currency,
            "search started"
        );

        let generation = ticket.generation;
        let client = Arc::clone(&self.client);
        let tx = self.tx.clone();
        self.inflight = Some(tokio::spawn(async move {
            let result = client.generate_recommendations(ticket.request.clone()).await;
            // The receiver lives as long as the App; a send error means it is gone.
            let _ = tx.send(SearchCompletion { ticket, result });
        }));

        Effect::SearchStarted { generation }
    }

    fn change_currency(&mut self, code: &str) -> anyhow::Result<Effect> {
        let code = code.trim().to_ascii_uppercase();
        anyhow::ensure!(!code.is_empty(), "currency code must be non-empty");

        let cleared = self.state.change_currency(&code);
        if cleared {
            tracing::info!(currency = %code, "results cleared after currency change");
        }

        self.prefs
            .set(CURRENCY_KEY, &code)
            .context("failed to persist currency preference")?;
        Ok(Effect::CurrencyChanged { cleared })
    }

    /// Waits for the next finished search. Pending forever while nothing is
    /// in flight, so it can sit in a `select!` next to user input.
    pub async fn next_completion(&mut self) -> SearchCompletion {
        match self.rx.recv().await {
            Some(completion) => completion,
            // `self.tx` keeps the channel open.
            None => std::future::pending().await,
        }
    }

    pub fn apply_completion(&mut self, completion: SearchCompletion) -> SearchOutcome {
        let SearchCompletion { ticket, result } = completion;
        let current = ticket.generation == self.state.generation();
        if current {
            self.inflight = None;
        }

        match result {
            Ok(products) => {
                let count = products.len();
                if !self.state.finish_search(&ticket, Some(products)) {
                    tracing::debug!(generation = ticket.generation, "dropped superseded result");
                    return SearchOutcome::Superseded;
                }
                tracing::info!(generation = ticket.generation, count, "search succeeded");
                SearchOutcome::Succeeded { count }
            }
            Err(err) => {
                if !self.state.finish_search(&ticket, None) {
                    tracing::debug!(
                        generation = ticket.generation,
                        error = %err,
                        "dropped superseded failure"
                    );
                    return SearchOutcome::Superseded;
                }
                tracing::error!(generation = ticket.generation, error = ?err, "search failed");
                SearchOutcome::Failed(err)
            }
        }
    }

    /// Submits `query` and waits for its own result.
    pub async fn search(&mut self, query: &str) -> anyhow::Result<Option<SearchOutcome>> {
        self.dispatch(Action::SetQuery(query.to_string()))?;
        let Effect::SearchStarted { generation } = self.dispatch(Action::Submit)? else {
            return Ok(None);
        };

        loop {
            let completion = self.next_completion().await;
            let mine = completion.ticket.generation == generation;
            let outcome = self.apply_completion(completion);
            if mine {
                return Ok(Some(outcome));
            }
        }
    }
}
