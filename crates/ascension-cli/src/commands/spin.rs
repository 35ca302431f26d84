use ascension_core::Ledger;

use super::{print_json, CmdResult};

pub fn run(user_id: i64) -> CmdResult {
    let ledger = Ledger::open()?;
    print_json(&ledger.spin(user_id)?)
}
