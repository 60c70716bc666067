use std::sync::Once;
use std::{env, path::PathBuf};

use dirs::home_dir;

const DEFAULT_DIR_NAME: &str = ".expense_core";
const STORE_DIR: &str = "store";
const CONFIG_FILE: &str = "config.json";

static TRACING_INIT: Once = Once::new();

/// Initializes the global tracing subscriber with sensible defaults.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let filter =
            EnvFilter::from_default_env().add_directive("expense_core=info".parse().unwrap());

        fmt().with_env_filter(filter).init();
    });
}

/// Returns the application-specific data directory, defaulting to `~/.expense_core`.
pub fn app_data_dir() -> PathBuf {
    if let Some(custom) = env::var_os("EXPENSE_CORE_HOME") {
        return PathBuf::from(custom);
    }
    home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}

/// Root directory for the managed JSON store.
pub fn store_root() -> PathBuf {
    app_data_dir().join(STORE_DIR)
}

/// Path to the user preferences file.
pub fn config_file() -> PathBuf {
    app_data_dir().join(CONFIG_FILE)
}

/// Creates a directory and its parents if missing.
pub fn ensure_dir(path: &std::path::Path) -> std::io::Result<()> {
    std::fs::create_dir_all(path)
}
