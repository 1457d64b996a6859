use crate::domain::product::{LoadingStatus, Product, ShoppingSession};
use crate::llm::RecommendationRequest;

/// Handle for one dispatched search. Only the ticket with the newest
/// generation may write results back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTicket {
    pub generation: u64,
    pub request: RecommendationRequest,
}

/// Results whose currency differs from a newly selected one are cleared.
///
/// Only the first result is inspected: a batch always shares one currency.
/// This is a heuristic to avoid showing prices in a currency the user just
/// switched away from, not an invariant on results.
pub fn results_need_reset(products: &[Product], new_currency: &str) -> bool {
    products
        .first()
        .is_some_and(|p| !p.currency.eq_ignore_ascii_case(new_currency))
}

/// All mutable UI state. Mutated synchronously, one event at a time.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    query: String,
    products: Vec<Product>,
    status: LoadingStatus,
    saved: Vec<Product>,
    saved_open: bool,
    settings_open: bool,
    currency: String,
    last_session: Option<ShoppingSession>,
    generation: u64,
}

/// Read-only snapshot handed to rendering.
#[derive(Debug, Clone, Copy)]
pub struct AppView<'a> {
    pub query: &'a str,
    pub products: &'a [Product],
    pub status: LoadingStatus,
    pub saved: &'a [Product],
    pub saved_open: bool,
    pub settings_open: bool,
    pub currency: &'a str,
    pub last_session: Option<&'a ShoppingSession>,
}

impl AppView<'_> {
    pub fn is_saved(&self, id: &str) -> bool {
        self.saved.iter().any(|p| p.id == id)
    }
}

impl AppState {
    pub fn new(currency: &str) -> Self {
        Self {
            currency: currency.to_string(),
            ..Default::default()
        }
    }

    pub fn view(&self) -> AppView<'_> {
        AppView {
            query: &self.query,
            products: &self.products,
            status: self.status,
            saved: &self.saved,
            saved_open: self.saved_open,
            settings_open: self.settings_open,
            currency: &self.currency,
            last_session: self.last_session.as_ref(),
        }
    }

    pub fn status(&self) -> LoadingStatus {
        self.status
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn saved(&self) -> &[Product] {
        &self.saved
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    /// Starts a search for the current query. Returns `None` (and changes
    /// nothing) when the query is blank.
    pub fn begin_search(&mut self) -> Option<SearchTicket> {
        let request = RecommendationRequest::try_new(&self.query, &self.currency).ok()?;

        self.generation += 1;
        self.status = LoadingStatus::Loading;
        self.products.clear();

        Some(SearchTicket {
            generation: self.generation,
            request,
        })
    }

    /// Applies a search result; `None` marks a failed search. Returns false
    /// when the ticket was superseded by a newer search.
    pub fn finish_search(&mut self, ticket: &SearchTicket, products: Option<Vec<Product>>) -> bool {
        if ticket.generation != self.generation {
            return false;
        }

        match products {
            Some(products) => {
                self.last_session = Some(ShoppingSession {
                    query: ticket.request.query.clone(),
                    products: products.clone(),
                    timestamp: chrono::Utc::now(),
                });
                self.products = products;
                self.status = LoadingStatus::Success;
            }
            None => {
                self.products.clear();
                self.status = LoadingStatus::Error;
            }
        }
        true
    }

    /// Adds a product from the current results to the saved list, unless a
    /// product with that id is already saved. Opens the saved panel either way.
    pub fn add_to_saved(&mut self, id: &str) -> bool {
        let Some(product) = self.products.iter().find(|p| p.id == id).cloned() else {
            return false;
        };
        self.saved_open = true;
        if self.saved.iter().any(|p| p.id == product.id) {
            return false;
        }
        self.saved.push(product);
        true
    }

    pub fn remove_from_saved(&mut self, id: &str) -> bool {
        let before = self.saved.len();
        self.saved.retain(|p| p.id != id);
        self.saved.len() != before
    }

    /// Switches the active currency. Returns true when the displayed results
    /// were cleared because they were priced in another currency.
    pub fn change_currency(&mut self, currency: &str) -> bool {
        self.currency = currency.to_string();
        self.settings_open = false;

        if results_need_reset(&self.products, currency) {
            self.products.clear();
            self.status = LoadingStatus::Idle;
            return true;
        }
        false
    }

    pub fn set_saved_open(&mut self, open: bool) {
        self.saved_open = open;
    }

    pub fn set_settings_open(&mut self, open: bool) {
        self.settings_open = open;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: &str, currency: &str) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Item {id}"),
            description: "desc".to_string(),
            estimated_price: 10.0,
            currency: currency.to_string(),
            category: "Tech".to_string(),
            reason: "why".to_string(),
        }
    }

    fn with_results(currency: &str, ids: &[&str]) -> AppState {
        let mut state = AppState::new(currency);
        state.set_query("headphones");
        let ticket = state.begin_search().unwrap();
        let products = ids.iter().map(|id| product(id, currency)).collect();
        assert!(state.finish_search(&ticket, Some(products)));
        state
    }

    #[test]
    fn blank_query_is_rejected_without_state_change() {
        let mut state = with_results("USD", &["a"]);
        state.set_query("   ");
        assert!(state.begin_search().is_none());
        assert_eq!(state.status(), LoadingStatus::Success);
        assert_eq!(state.products().len(), 1);
    }

    #[test]
    fn submit_sets_loading_and_clears_results() {
        let mut state = with_results("USD", &["a", "b"]);
        state.set_query("keyboards");
        let ticket = state.begin_search().unwrap();
        assert_eq!(state.status(), LoadingStatus::Loading);
        assert!(state.products().is_empty());
        assert_eq!(ticket.request.query, "keyboards");
        assert_eq!(ticket.request.currency, "USD");
    }

    #[test]
    fn failure_sets_error_with_empty_results() {
        let mut state = AppState::new("USD");
        state.set_query("tent");
        let ticket = state.begin_search().unwrap();
        assert!(state.finish_search(&ticket, None));
        assert_eq!(state.status(), LoadingStatus::Error);
        assert!(state.products().is_empty());
    }

    #[test]
    fn superseded_ticket_is_ignored() {
        let mut state = AppState::new("USD");
        state.set_query("first");
        let first = state.begin_search().unwrap();
        state.set_query("second");
        let second = state.begin_search().unwrap();

        assert!(state.finish_search(&second, Some(vec![product("new", "USD")])));
        assert!(!state.finish_search(&first, Some(vec![product("old", "USD")])));
        assert_eq!(state.products()[0].id, "new");
        assert_eq!(state.view().last_session.unwrap().query, "second");
    }

    #[test]
    fn add_is_idempotent_and_opens_panel() {
        let mut state = with_results("USD", &["a", "b"]);
        assert!(state.add_to_saved("a"));
        assert!(state.view().saved_open);
        assert!(!state.add_to_saved("a"));
        assert_eq!(state.saved().len(), 1);
        assert!(!state.add_to_saved("missing"));
    }

    #[test]
    fn remove_shrinks_by_one_or_is_noop() {
        let mut state = with_results("USD", &["a", "b"]);
        state.add_to_saved("a");
        state.add_to_saved("b");

        assert!(!state.remove_from_saved("zzz"));
        assert_eq!(state.saved().len(), 2);
        assert!(state.remove_from_saved("a"));
        assert_eq!(state.saved().len(), 1);
        assert_eq!(state.saved()[0].id, "b");
    }

    #[test]
    fn currency_mismatch_clears_results_and_resets_status() {
        let mut state = with_results("USD", &["a"]);
        state.set_settings_open(true);
        assert!(state.change_currency("EUR"));
        assert!(state.products().is_empty());
        assert_eq!(state.status(), LoadingStatus::Idle);
        assert_eq!(state.currency(), "EUR");
        assert!(!state.view().settings_open);
    }

    #[test]
    fn matching_currency_or_no_results_never_clears() {
        let mut state = with_results("USD", &["a"]);
        assert!(!state.change_currency("USD"));
        assert_eq!(state.products().len(), 1);
        assert_eq!(state.status(), LoadingStatus::Success);

        let mut empty = AppState::new("USD");
        assert!(!empty.change_currency("INR"));
        assert_eq!(empty.status(), LoadingStatus::Idle);
    }

    #[test]
    fn saved_list_keeps_mixed_currencies() {
        let mut state = with_results("USD", &["a"]);
        state.add_to_saved("a");
        state.change_currency("GBP");

        state.set_query("scarf");
        let ticket = state.begin_search().unwrap();
        state.finish_search(&ticket, Some(vec![product("b", "GBP")]));
        state.add_to_saved("b");

        let currencies: Vec<_> = state.saved().iter().map(|p| p.currency.as_str()).collect();
        assert_eq!(currencies, ["USD", "GBP"]);
    }
}
