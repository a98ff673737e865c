mod drill;
mod report;

use std::error::Error;
use std::io::{self, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use drill_core::model::{CardDraft, PreferencesDraft};
use services::{AppServices, Clock, Library, ReviewMode, StatsReport};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "vocab-drill")]
#[command(about = "German vocabulary drills with Leitner boxes", long_about = None)]
#[command(version)]
struct Cli {
    /// Directory holding the card list, stats and preferences
    #[arg(long, global = true, env = "VOCAB_DRILL_DATA_DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Weighted review of every matching card (default)
    Review {
        /// Level filter, e.g. A1 or "All"
        #[arg(short, long)]
        level: Option<String>,
        /// Category filter, e.g. Noun or "All"
        #[arg(short, long)]
        category: Option<String>,
    },
    /// Review a fixed number of distinct cards, hardest boxes first
    Custom {
        /// How many cards to review
        count: String,
        #[arg(short, long)]
        level: Option<String>,
        #[arg(short, long)]
        category: Option<String>,
    },
    /// Review starred cards
    Favorites,
    /// Review cards that were answered incorrectly before
    Difficult,
    /// Add a card
    Add {
        german: String,
        english: String,
        #[arg(short, long)]
        level: String,
        #[arg(short, long, default_value = "")]
        category: String,
        #[arg(short, long, default_value = "")]
        gender: String,
        /// Example sentence, may be repeated
        #[arg(short, long = "example")]
        examples: Vec<String>,
    },
    /// Star or unstar a card
    Star { german: String },
    /// Import cards from a JSON list
    Import { path: PathBuf },
    /// Export every card to a JSON list
    Export { path: PathBuf },
    /// Show review statistics
    Stats,
    /// Show or change preferences
    Settings {
        #[arg(long)]
        max_cards: Option<usize>,
        /// Delay between cards in milliseconds
        #[arg(long)]
        transition_delay: Option<u32>,
        #[arg(long)]
        dark_mode: Option<bool>,
        #[arg(long)]
        sound: Option<bool>,
        #[arg(long)]
        keyboard: Option<bool>,
        #[arg(long)]
        default_level: Option<String>,
        #[arg(long)]
        default_category: Option<String>,
    },
    /// Add the built-in sample words
    Seed,
}

fn main() {
    init_tracing();

    if let Err(e) = run() {
        eprintln!("error: {e}");
        std::process::exit(2);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn resolve_data_dir(explicit: Option<PathBuf>) -> Result<PathBuf, Box<dyn Error>> {
    match explicit {
        Some(dir) => Ok(dir),
        None => Ok(dirs::data_dir()
            .ok_or("could not determine a data directory, pass --data-dir")?
            .join("vocab-drill")),
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let data_dir = resolve_data_dir(cli.data_dir)?;
    tracing::debug!(data_dir = %data_dir.display(), "using data directory");

    let services = AppServices::json(data_dir, Clock::default_clock());
    let mut library = services.load_library()?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let command = cli.command.unwrap_or(Commands::Review {
        level: None,
        category: None,
    });
    execute(command, &services, &mut library, &mut io::stdin().lock(), &mut out)
}

fn execute<R: io::BufRead, W: Write>(
    command: Commands,
    services: &AppServices,
    library: &mut Library,
    input: &mut R,
    out: &mut W,
) -> Result<(), Box<dyn Error>> {
    let mode = match command {
        Commands::Review { level, category } => ReviewMode::All { level, category },
        Commands::Custom {
            count,
            level,
            category,
        } => ReviewMode::Custom {
            count,
            level,
            category,
        },
        Commands::Favorites => ReviewMode::Favorites,
        Commands::Difficult => ReviewMode::DifficultWords,
        Commands::Add {
            german,
            english,
            level,
            category,
            gender,
            examples,
        } => {
            let draft = examples.into_iter().fold(
                CardDraft::new(german, english, level)
                    .with_category(category)
                    .with_gender(gender),
                CardDraft::with_example,
            );
            services.card_service().add_card(library, draft)?;
            writeln!(out, "added, {} cards in total", library.store().len())?;
            return Ok(());
        }
        Commands::Star { german } => {
            let starred = services.card_service().toggle_favorite(library, &german)?;
            writeln!(out, "{german}: {}", if starred { "starred" } else { "unstarred" })?;
            return Ok(());
        }
        Commands::Import { path } => {
            let report = services.card_service().import_file(library, &path)?;
            writeln!(out, "imported {}, skipped {}", report.added, report.skipped)?;
            return Ok(());
        }
        Commands::Export { path } => {
            let count = services.card_service().export_file(library, &path)?;
            writeln!(out, "exported {count} cards to {}", path.display())?;
            return Ok(());
        }
        Commands::Stats => {
            report::print_stats(&StatsReport::from_stats(library.stats()), out)?;
            return Ok(());
        }
        Commands::Settings {
            max_cards,
            transition_delay,
            dark_mode,
            sound,
            keyboard,
            default_level,
            default_category,
        } => {
            let mut draft = PreferencesDraft::new();
            draft.max_cards = max_cards;
            draft.transition_delay = transition_delay;
            draft.dark_mode = dark_mode;
            draft.sound_enabled = sound;
            draft.keyboard_enabled = keyboard;
            draft.default_level = default_level;
            draft.default_category = default_category;
            let preferences = services.preferences().update(library, draft)?;
            report::print_preferences(&preferences, out)?;
            return Ok(());
        }
        Commands::Seed => {
            let report = services.card_service().seed_samples(library)?;
            writeln!(out, "added {} sample cards", report.added)?;
            return Ok(());
        }
    };

    let session_loop = services.session_loop();
    let mut session = session_loop.start_session(library, &mode)?;
    writeln!(out, "{}: {} cards", mode.label(), session.queue().len())?;
    drill::run_session(&session_loop, library, &mut session, input, out)?;
    Ok(())
}
