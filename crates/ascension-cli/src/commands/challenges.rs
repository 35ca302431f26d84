use ascension_core::Ledger;
use clap::Subcommand;

use super::{print_json, CmdResult};

#[derive(Subcommand)]
pub enum ChallengesAction {
    /// Show daily and weekly challenges with progress
    Board { user_id: i64 },
    /// Set absolute progress for a challenge key
    Update {
        user_id: i64,
        /// Challenge key (e.g. "grind_master")
        key: String,
        value: u64,
    },
}

pub fn run(action: ChallengesAction) -> CmdResult {
    let ledger = Ledger::open()?;

    match action {
        ChallengesAction::Board { user_id } => {
            print_json(&ledger.challenge_board(user_id)?)?;
        }
        ChallengesAction::Update {
            user_id,
            key,
            value,
        } => {
            ledger.update_challenge_progress(user_id, &key, value)?;
            print_json(&ledger.challenge_board(user_id)?)?;
        }
    }
    Ok(())
}
