mod app;
mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use n5lab_lib::progression::StudyMode;
use n5lab_lib::srs::ReviewOutcome;

#[derive(Parser)]
#[command(
    name = "n5lab-cli",
    about = "N5Lab progress and flashcard review from the terminal",
    version
)]
struct Cli {
    /// Config file (default: <config dir>/n5lab/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Store learner data in this directory instead of the default
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, default_value = "plain")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Plain,
    Json,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum ModeArg {
    Guided,
    Open,
}

impl From<ModeArg> for StudyMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Guided => StudyMode::Guided,
            ModeArg::Open => StudyMode::Open,
        }
    }
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum AnswerArg {
    Know,
    DontKnow,
}

impl From<AnswerArg> for ReviewOutcome {
    fn from(answer: AnswerArg) -> Self {
        match answer {
            AnswerArg::Know => ReviewOutcome::Know,
            AnswerArg::DontKnow => ReviewOutcome::DontKnow,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Show XP, level, streak and lesson counts
    Status,

    /// Mark a lesson as completed
    Complete {
        /// Lesson id
        lesson: String,
        /// Score 0-100
        #[arg(long, default_value = "100")]
        score: u8,
        /// Override the first-completion reward
        #[arg(long)]
        xp: Option<u32>,
    },

    /// Add experience points
    Award {
        amount: u32,
    },

    /// Switch between guided and open study
    Mode {
        mode: ModeArg,
    },

    /// Record an achievement
    Achieve {
        id: String,
    },

    /// Erase all progress
    Reset {
        /// Confirm the reset
        #[arg(long)]
        yes: bool,
    },

    /// Write a progress backup
    Export {
        /// Output file (defaults to n5lab_progress_<date>.json in the current directory)
        path: Option<PathBuf>,
    },

    /// Restore progress from a backup, replacing the current profile
    Import {
        path: PathBuf,
    },

    /// List cards for the next review session
    Due {
        /// Card ids in deck order
        #[arg(required = true)]
        cards: Vec<String>,
        /// Maximum cards in the session (default from config)
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Record the answer for a single card
    Answer {
        card: String,
        answer: AnswerArg,
    },

    /// Record a whole review session as card=know|dont-know pairs and award session XP
    Review {
        #[arg(required = true, value_parser = commands::review::parse_answer)]
        answers: Vec<(String, ReviewOutcome)>,
    },

    /// Show the review record of a card
    Card {
        id: String,
    },

    /// Show deck statistics for a set of cards
    Deck {
        #[arg(required = true)]
        cards: Vec<String>,
    },

    /// List lessons with their lock state
    Lessons {
        /// Curriculum file (TOML or JSON)
        #[arg(long)]
        curriculum: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let mut app = app::App::new(cli.config.as_deref(), cli.data_dir)?;
    app.check_in();

    match cli.command {
        Command::Status => {
            commands::progress::run_status(&app, &cli.format)?;
        }
        Command::Complete { lesson, score, xp } => {
            commands::progress::run_complete(&mut app, &lesson, score, xp, &cli.format)?;
        }
        Command::Award { amount } => {
            commands::progress::run_award(&mut app, amount, &cli.format)?;
        }
        Command::Mode { mode } => {
            commands::progress::run_mode(&mut app, mode.into(), &cli.format)?;
        }
        Command::Achieve { id } => {
            commands::progress::run_achieve(&mut app, &id, &cli.format)?;
        }
        Command::Reset { yes } => {
            commands::progress::run_reset(&mut app, yes)?;
        }
        Command::Export { path } => {
            commands::transfer::run_export(&app, path, &cli.format)?;
        }
        Command::Import { path } => {
            commands::transfer::run_import(&mut app, &path, &cli.format)?;
        }
        Command::Due { cards, limit } => {
            commands::review::run_due(&app, &cards, limit, &cli.format)?;
        }
        Command::Answer { card, answer } => {
            commands::review::run_answer(&mut app, &card, answer.into(), &cli.format)?;
        }
        Command::Review { answers } => {
            commands::review::run_session(&mut app, &answers, &cli.format)?;
        }
        Command::Card { id } => {
            commands::review::run_card(&app, &id, &cli.format)?;
        }
        Command::Deck { cards } => {
            commands::review::run_deck(&app, &cards, &cli.format)?;
        }
        Command::Lessons { curriculum } => {
            commands::lessons::run(&app, &curriculum, &cli.format)?;
        }
    }

    Ok(())
}
