use ascension_core::Ledger;
use clap::Subcommand;

use super::{print_json, CmdResult};

#[derive(Subcommand)]
pub enum OnboardingAction {
    /// Record the answer to the current onboarding step
    Answer { user_id: i64, answer: String },
}

pub fn run(action: OnboardingAction) -> CmdResult {
    let ledger = Ledger::open()?;

    match action {
        OnboardingAction::Answer { user_id, answer } => {
            print_json(&ledger.record_onboarding_answer(user_id, &answer)?)?;
        }
    }
    Ok(())
}
