mod config;
pub mod document;
pub mod store;

pub use config::{Config, LedgerConfig, SpinConfig, StoreConfig};
pub use document::{Document, NEXT_RESET_FORMAT, NEXT_RESET_KEY};
pub use store::{DocumentStore, JsonFileStore, MemoryStore, StoreLock};

use std::path::PathBuf;

/// Returns the data directory, creating it if needed.
///
/// `ASCENSION_DATA_DIR` wins when set. Otherwise `~/.config/ascension[-dev]/`
/// based on `ASCENSION_ENV` (set it to `dev` for the development directory).
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let dir = match std::env::var_os("ASCENSION_DATA_DIR") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("ASCENSION_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("ascension-dev")
            } else {
                base_dir.join("ascension")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
