use ascension_core::games::{
    CorridorRoom, DiceOutcome, Difficulty, FlipOutcome, OracleOutcome, RushOutcome,
};
use ascension_core::{GameResult, Ledger};
use clap::{Subcommand, ValueEnum};
use rand::Rng;

use super::{print_json, CmdResult};

#[derive(Subcommand)]
pub enum GameAction {
    /// Dice battle against the bot
    Dice {
        #[arg(value_enum)]
        outcome: DiceArg,
    },
    /// Quantum coin flip
    Flip {
        #[arg(value_enum)]
        outcome: FlipArg,
    },
    /// Quiz question
    Quiz {
        #[arg(value_enum)]
        answer: AnswerArg,
    },
    /// XP typhoon tapping round
    Typhoon { taps: u32 },
    /// Tap speed reaction test
    TapSpeed {
        /// Reaction time; omit when the tap came before the signal
        #[arg(long)]
        reaction_ms: Option<u64>,
    },
    /// Bomb defusal
    Bomb {
        #[arg(value_enum)]
        outcome: BombArg,
    },
    /// Corrupted oracle prediction
    Oracle {
        #[arg(value_enum)]
        outcome: OracleArg,
    },
    /// Mind hack puzzle
    MindHack {
        /// Difficulty solved; omit when the puzzle was failed
        #[arg(long, value_enum)]
        solved: Option<DifficultyArg>,
    },
    /// Dark corridor room
    Corridor {
        #[arg(value_enum)]
        room: RoomArg,
        /// Rooms already cleared this run
        #[arg(long, default_value_t = 0)]
        depth: u32,
        /// Base amount; rolled from the room's range when omitted
        #[arg(long)]
        base: Option<u64>,
    },
    /// Ascension rush symbol memory
    Rush {
        #[arg(value_enum)]
        outcome: RushArg,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum DiceArg {
    Win,
    Draw,
    Lose,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum FlipArg {
    Correct,
    Wrong,
    Edge,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum AnswerArg {
    Correct,
    Wrong,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum BombArg {
    Safe,
    Boom,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OracleArg {
    Same,
    HigherLower,
    Wrong,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum DifficultyArg {
    Easy,
    Medium,
    Hard,
    Elite,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum RoomArg {
    Treasure,
    Secret,
    Trap,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum RushArg {
    Final,
    Count,
    Wrong,
}

fn to_result(game: GameAction) -> GameResult {
    match game {
        GameAction::Dice { outcome } => GameResult::DiceBattle {
            outcome: match outcome {
                DiceArg::Win => DiceOutcome::Win,
                DiceArg::Draw => DiceOutcome::Draw,
                DiceArg::Lose => DiceOutcome::Lose,
            },
        },
        GameAction::Flip { outcome } => GameResult::QuantumFlip {
            outcome: match outcome {
                FlipArg::Correct => FlipOutcome::Correct,
                FlipArg::Wrong => FlipOutcome::Wrong,
                FlipArg::Edge => FlipOutcome::Edge,
            },
        },
        GameAction::Quiz { answer } => GameResult::Quiz {
            correct: matches!(answer, AnswerArg::Correct),
        },
        GameAction::Typhoon { taps } => GameResult::XpTyphoon { taps },
        GameAction::TapSpeed { reaction_ms } => GameResult::TapSpeed { reaction_ms },
        GameAction::Bomb { outcome } => GameResult::BombDefusal {
            safe: matches!(outcome, BombArg::Safe),
        },
        GameAction::Oracle { outcome } => GameResult::CorruptedOracle {
            outcome: match outcome {
                OracleArg::Same => OracleOutcome::Same,
                OracleArg::HigherLower => OracleOutcome::HigherLower,
                OracleArg::Wrong => OracleOutcome::Wrong,
            },
        },
        GameAction::MindHack { solved } => GameResult::MindHack {
            solved: solved.map(|d| match d {
                DifficultyArg::Easy => Difficulty::Easy,
                DifficultyArg::Medium => Difficulty::Medium,
                DifficultyArg::Hard => Difficulty::Hard,
                DifficultyArg::Elite => Difficulty::Elite,
            }),
        },
        GameAction::Corridor { room, depth, base } => {
            let room = match room {
                RoomArg::Treasure => CorridorRoom::Treasure,
                RoomArg::Secret => CorridorRoom::Secret,
                RoomArg::Trap => CorridorRoom::Trap,
            };
            let base = base.unwrap_or_else(|| rand::thread_rng().gen_range(room.base_range()));
            GameResult::DarkCorridor { room, base, depth }
        }
        GameAction::Rush { outcome } => GameResult::AscensionRush {
            outcome: match outcome {
                RushArg::Final => RushOutcome::Final,
                RushArg::Count => RushOutcome::Count,
                RushArg::Wrong => RushOutcome::Wrong,
            },
        },
    }
}

pub fn run(user_id: i64, game: GameAction) -> CmdResult {
    let ledger = Ledger::open()?;
    let report = ledger.apply_game_result(user_id, to_result(game))?;
    print_json(&report)
}
