use anyhow::Context;
use clap::Parser;
use smartshop_core::app::App;
use smartshop_core::domain::currency::find_currency;
use smartshop_core::llm::gemini::GeminiClient;
use smartshop_core::storage::preferences::{
    FilePreferenceStore, MemoryPreferenceStore, PreferenceStore,
};
use smartshop_core::ui::Action;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod repl;

#[derive(Debug, Parser)]
#[command(name = "smartshop", about = "AI shopping assistant in the terminal")]
struct Args {
    /// Currency for prices (e.g. EUR). Saved as the new preference.
    #[arg(long)]
    currency: Option<String>,

    /// Directory the saved list is exported to. Defaults to SMARTSHOP_EXPORT_DIR or ".".
    #[arg(long)]
    export_dir: Option<PathBuf>,

    /// Keep preferences in memory only.
    #[arg(long)]
    ephemeral: bool,

    /// Run this search before entering the prompt.
    #[arg(long)]
    query: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = smartshop_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    // stdout belongs to the interactive screen.
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    let prefs: Box<dyn PreferenceStore> = if args.ephemeral {
        Box::new(MemoryPreferenceStore::new())
    } else {
        let store = FilePreferenceStore::open(settings.resolve_prefs_path()?)?;
        tracing::debug!(path = %store.path().display(), "using preferences file");
        Box::new(store)
    };

    let export_dir = args
        .export_dir
        .or_else(|| settings.export_dir.clone())
        .unwrap_or_else(|| PathBuf::from("."));

    let client = GeminiClient::from_settings(&settings)?;
    let mut app = App::new(Arc::new(client), prefs, export_dir)?;

    if let Some(code) = args.currency.as_deref() {
        let currency = find_currency(code)
            .with_context(|| format!("unsupported currency: {code}"))?;
        app.dispatch(Action::ChangeCurrency(currency.code.to_string()))?;
    }

    if let Some(query) = args.query.as_deref() {
        if let Some(outcome) = app.search(query).await? {
            repl::report_outcome(outcome);
        }
    }

    repl::run(&mut app).await
}

fn init_sentry(settings: &smartshop_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
