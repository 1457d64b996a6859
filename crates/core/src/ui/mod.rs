//! Terminal rendering of the shopping assistant. Components are pure: they
//! take borrowed state and return text, and any user intent they expose is
//! returned as an [`Action`] for the shell to apply.

pub mod card;
pub mod category;
pub mod empty;
pub mod saved;
pub mod settings;

use crate::app::state::AppView;
use crate::domain::product::LoadingStatus;
use std::fmt::Write;

pub const ERROR_BANNER: &str =
    "Oops! Something went wrong while fetching recommendations. Please try again.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    SetQuery(String),
    Submit,
    AddToSaved(String),
    RemoveFromSaved(String),
    OpenSaved,
    CloseSaved,
    OpenSettings,
    CloseSettings,
    ChangeCurrency(String),
    Export,
}

/// Main results area for the current status.
pub fn render_results(view: &AppView<'_>) -> String {
    let mut out = String::new();
    match view.status {
        LoadingStatus::Error => {
            let _ = writeln!(out, "!! {ERROR_BANNER}");
        }
        LoadingStatus::Loading => {
            let _ = writeln!(out, "... finding products (prices in {})", view.currency);
        }
        LoadingStatus::Success if !view.products.is_empty() => {
            let _ = writeln!(
                out,
                "Top Recommendations ({} items found)",
                view.products.len()
            );
            if let Some(session) = view.last_session {
                let _ = writeln!(out, "for \"{}\"", session.query);
            }
            for (index, product) in view.products.iter().enumerate() {
                let card = card::ProductCard {
                    index: index + 1,
                    product,
                    is_saved: view.is_saved(&product.id),
                };
                out.push('\n');
                out.push_str(&card.render());
            }
        }
        LoadingStatus::Success => {}
        LoadingStatus::Idle => {
            if view.products.is_empty() {
                out.push_str(&empty::render());
            }
        }
    }
    out
}

/// One-line header: saved count and active currency.
pub fn render_header(view: &AppView<'_>) -> String {
    format!(
        "SmartShopping | list: {} | currency: {}",
        view.saved.len(),
        view.currency
    )
}
