use ascension_core::Ledger;
use ascension_core::storage::NEXT_RESET_FORMAT;
use clap::Subcommand;

use super::{print_json, CmdResult};

#[derive(Subcommand)]
pub enum WeekAction {
    /// Flag the top 3, award weekly badges and clear weekly progress
    Reset,
    /// Show when the next weekly reset is due
    Next,
}

pub fn run(action: WeekAction) -> CmdResult {
    let ledger = Ledger::open()?;

    match action {
        WeekAction::Reset => {
            print_json(&ledger.weekly_reset()?)?;
        }
        WeekAction::Next => {
            let next = ledger
                .next_reset()
                .map(|at| at.format(NEXT_RESET_FORMAT).to_string());
            print_json(&serde_json::json!({ "next_reset": next }))?;
        }
    }
    Ok(())
}
