use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "ascension", version, about = "Ascension progression ledger CLI")]
struct Cli {
    /// Log ledger activity to stderr (overridden by ASCENSION_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// User records and activity
    User {
        #[command(subcommand)]
        action: commands::user::UserAction,
    },
    /// Perform a grind
    Grind {
        /// Chat user id
        user_id: i64,
        /// Display name to sync
        #[arg(long)]
        username: Option<String>,
    },
    /// Settle a mini-game round
    Game {
        /// Chat user id
        user_id: i64,
        #[command(subcommand)]
        game: commands::game::GameAction,
    },
    /// Spin the daily reward wheel
    Spin {
        /// Chat user id
        user_id: i64,
    },
    /// Badge catalog and unlocks
    Badges {
        #[command(subcommand)]
        action: commands::badges::BadgesAction,
    },
    /// Daily and weekly challenges
    Challenges {
        #[command(subcommand)]
        action: commands::challenges::ChallengesAction,
    },
    /// Weekly leaderboards
    Leaderboard {
        #[command(subcommand)]
        action: commands::leaderboard::LeaderboardAction,
    },
    /// Weekly reset
    Week {
        #[command(subcommand)]
        action: commands::week::WeekAction,
    },
    /// Onboarding answers
    Onboarding {
        #[command(subcommand)]
        action: commands::onboarding::OnboardingAction,
    },
    /// User settings
    Settings {
        #[command(subcommand)]
        action: commands::settings::SettingsAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("ASCENSION_LOG")
                .unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::User { action } => commands::user::run(action),
        Commands::Grind { user_id, username } => commands::grind::run(user_id, username),
        Commands::Game { user_id, game } => commands::game::run(user_id, game),
        Commands::Spin { user_id } => commands::spin::run(user_id),
        Commands::Badges { action } => commands::badges::run(action),
        Commands::Challenges { action } => commands::challenges::run(action),
        Commands::Leaderboard { action } => commands::leaderboard::run(action),
        Commands::Week { action } => commands::week::run(action),
        Commands::Onboarding { action } => commands::onboarding::run(action),
        Commands::Settings { action } => commands::settings::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
