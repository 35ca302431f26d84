use ascension_core::Ledger;

use super::{print_json, CmdResult};

pub fn run(user_id: i64, username: Option<String>) -> CmdResult {
    let ledger = Ledger::open()?;
    let outcome = ledger.perform_grind(user_id, username.as_deref())?;
    print_json(&outcome)
}
