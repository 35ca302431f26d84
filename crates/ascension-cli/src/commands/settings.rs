use ascension_core::Ledger;
use clap::Subcommand;

use super::{print_json, CmdResult};

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Toggle notifications on or off
    Notifications { user_id: i64 },
    /// Switch between dark and light theme
    Theme { user_id: i64 },
    /// Set the display language
    Language { user_id: i64, language: String },
}

pub fn run(action: SettingsAction) -> CmdResult {
    let ledger = Ledger::open()?;

    match action {
        SettingsAction::Notifications { user_id } => {
            let enabled = ledger.toggle_notifications(user_id)?;
            print_json(&serde_json::json!({ "notifications": enabled }))?;
        }
        SettingsAction::Theme { user_id } => {
            let theme = ledger.toggle_theme(user_id)?;
            print_json(&serde_json::json!({ "theme": theme }))?;
        }
        SettingsAction::Language { user_id, language } => {
            let language = ledger.set_language(user_id, &language)?;
            print_json(&serde_json::json!({ "language": language }))?;
        }
    }
    Ok(())
}
