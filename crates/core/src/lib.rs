pub mod app;
pub mod domain;
pub mod llm;
pub mod storage;
pub mod ui;

pub mod config {
    use anyhow::Context;
    use std::path::PathBuf;

    #[derive(Debug, Clone, Default)]
    pub struct Settings {
        pub gemini_api_key: Option<String>,
        pub sentry_dsn: Option<String>,
        pub prefs_path: Option<PathBuf>,
        pub export_dir: Option<PathBuf>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Ok(Self {
                gemini_api_key: std::env::var("GEMINI_API_KEY")
                    .or_else(|_| std::env::var("API_KEY"))
                    .ok()
                    .filter(|s| !s.trim().is_empty()),
                sentry_dsn: std::env::var("SENTRY_DSN").ok(),
                prefs_path: std::env::var_os("SMARTSHOP_PREFS_PATH").map(PathBuf::from),
                export_dir: std::env::var_os("SMARTSHOP_EXPORT_DIR").map(PathBuf::from),
            })
        }

        pub fn require_gemini_api_key(&self) -> anyhow::Result<&str> {
            self.gemini_api_key
                .as_deref()
                .context("GEMINI_API_KEY (or API_KEY) is required")
        }

        /// Explicit path, or `<config_dir>/smartshop/preferences.json`.
        pub fn resolve_prefs_path(&self) -> anyhow::Result<PathBuf> {
            if let Some(p) = &self.prefs_path {
                return Ok(p.clone());
            }
            let dir = dirs::config_dir().context("no config directory for this platform")?;
            Ok(dir.join("smartshop").join("preferences.json"))
        }
    }

}
