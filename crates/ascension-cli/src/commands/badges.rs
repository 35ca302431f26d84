use ascension_core::{badge_definitions, badge_progress, Ledger};
use clap::Subcommand;
use serde::Serialize;

use super::{print_json, CmdResult};

#[derive(Subcommand)]
pub enum BadgesAction {
    /// List the badge catalog
    List,
    /// Award the first newly earned badge, if any
    Check { user_id: i64 },
    /// Show progress toward every catalog badge
    Progress { user_id: i64 },
    /// Grant a badge by name
    Grant { user_id: i64, name: String },
}

#[derive(Serialize)]
struct BadgeProgressRow {
    name: &'static str,
    owned: bool,
    progress: String,
}

pub fn run(action: BadgesAction) -> CmdResult {
    match action {
        BadgesAction::List => {
            print_json(badge_definitions())?;
        }
        BadgesAction::Check { user_id } => {
            let ledger = Ledger::open()?;
            let unlocked = ledger.check_for_new_badges(user_id)?;
            print_json(&serde_json::json!({ "unlocked": unlocked }))?;
        }
        BadgesAction::Progress { user_id } => {
            let ledger = Ledger::open()?;
            let user = ledger.get_user(user_id)?;
            let rows: Vec<BadgeProgressRow> = badge_definitions()
                .iter()
                .map(|badge| BadgeProgressRow {
                    name: badge.name,
                    owned: user.has_badge(badge.name),
                    progress: badge_progress(&user, badge.name),
                })
                .collect();
            print_json(&rows)?;
        }
        BadgesAction::Grant { user_id, name } => {
            let ledger = Ledger::open()?;
            let granted = ledger.grant_badge(user_id, &name)?;
            print_json(&serde_json::json!({ "badge": name, "granted": granted }))?;
        }
    }
    Ok(())
}
