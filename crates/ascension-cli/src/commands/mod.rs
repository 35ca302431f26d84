pub mod badges;
pub mod challenges;
pub mod config;
pub mod game;
pub mod grind;
pub mod leaderboard;
pub mod onboarding;
pub mod settings;
pub mod spin;
pub mod user;
pub mod week;

use serde::Serialize;

pub type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Print `value` as pretty JSON on stdout.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
