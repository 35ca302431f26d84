use ascension_core::Ledger;
use clap::Subcommand;

use super::{print_json, CmdResult};

#[derive(Subcommand)]
pub enum LeaderboardAction {
    /// Top users by weekly XP
    Xp {
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Top users by weekly grinds
    Grinds {
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Top users by badges owned
    Badges {
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
}

pub fn run(action: LeaderboardAction) -> CmdResult {
    let ledger = Ledger::open()?;

    let rows = match action {
        LeaderboardAction::Xp { limit } => ledger.top_xp(limit),
        LeaderboardAction::Grinds { limit } => ledger.top_grinds(limit),
        LeaderboardAction::Badges { limit } => ledger.top_badge_count(limit),
    };
    print_json(&rows)
}
