use ascension_core::Ledger;
use clap::Subcommand;

use super::{print_json, CmdResult};

#[derive(Subcommand)]
pub enum UserAction {
    /// Show a user's record, creating it on first contact
    Show {
        user_id: i64,
        /// Display name to sync
        #[arg(long)]
        username: Option<String>,
    },
    /// Wipe a user back to fresh defaults
    Reset {
        user_id: i64,
        /// Confirm the reset
        #[arg(long)]
        yes: bool,
    },
    /// Page through the activity feed (10 entries per page)
    Activity {
        user_id: i64,
        #[arg(long, default_value_t = 0)]
        page: usize,
    },
    /// Append an entry to the activity feed
    Log { user_id: i64, text: String },
    /// Credit XP directly
    AddXp {
        user_id: i64,
        amount: u64,
        /// Also count it toward weekly XP
        #[arg(long)]
        weekly: bool,
    },
    /// Debit XP directly (floors at zero)
    SubtractXp { user_id: i64, amount: u64 },
}

pub fn run(action: UserAction) -> CmdResult {
    let ledger = Ledger::open()?;

    match action {
        UserAction::Show { user_id, username } => {
            let user = ledger.ensure_user(user_id, username.as_deref())?;
            print_json(&user)?;
        }
        UserAction::Reset { user_id, yes } => {
            if !yes {
                return Err("refusing to reset without --yes".into());
            }
            let user = ledger.reset_account(user_id)?;
            print_json(&user)?;
        }
        UserAction::Activity { user_id, page } => {
            print_json(&ledger.activity_page(user_id, page)?)?;
        }
        UserAction::Log { user_id, text } => {
            ledger.log_activity(user_id, &text)?;
            print_json(&serde_json::json!({ "logged": text }))?;
        }
        UserAction::AddXp {
            user_id,
            amount,
            weekly,
        } => {
            print_json(&ledger.add_xp(user_id, amount, weekly)?)?;
        }
        UserAction::SubtractXp { user_id, amount } => {
            print_json(&ledger.subtract_xp(user_id, amount)?)?;
        }
    }
    Ok(())
}
