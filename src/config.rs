use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Tena";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Overrides the directory holding `lexicons/` and `examples.json`.
pub const DATA_DIR_ENV: &str = "TENA_DATA_DIR";
/// Overrides the directory holding downloaded embedding models.
pub const MODEL_DIR_ENV: &str = "TENA_MODEL_DIR";

/// Lexicon subdirectory inside the data directory.
pub const LEXICON_SUBDIR: &str = "lexicons";
/// Example corpus file inside the data directory.
pub const EXAMPLES_FILE: &str = "examples.json";

/// Shown once when the interactive shell starts.
pub const DISCLAIMER: &str = "Disclaimer: Not medical advice. For emergencies, seek professional help.";

/// Per-user application directory (`<data_dir>/Tena`).
pub fn app_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Resolve the data directory.
///
/// Priority:
/// 1. `TENA_DATA_DIR` env var
/// 2. `./data` when it exists (running from a checkout)
/// 3. `<app_data_dir>/data`
pub fn data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        return PathBuf::from(dir);
    }

    let local = PathBuf::from("data");
    if local.is_dir() {
        return local;
    }

    app_data_dir().join("data")
}

/// Get the models directory (for ONNX embeddings).
pub fn models_dir() -> PathBuf {
    match std::env::var(MODEL_DIR_ENV) {
        Ok(dir) => PathBuf::from(dir),
        Err(_) => app_data_dir().join("models"),
    }
}

/// Log filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "warn,tena_lib=info,tena=info"
}
