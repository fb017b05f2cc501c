use std::path::{Path, PathBuf};

use anyhow::{Context as AnyhowContext, Result};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use kisan_retrieval::{RetrievalOptions, RetrievalProfile, Retriever};
use kisan_text::LanguageHints;

mod corpus;

#[derive(Parser)]
#[command(name = "kisan")]
#[command(about = "Knowledge retrieval for farm advisory answers", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors (stdout is reserved for output)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the detected language code of a text
    Detect(DetectArgs),

    /// Print ranked matches as JSON
    Retrieve(QueryArgs),

    /// Print the numbered context block
    Context(QueryArgs),

    /// Print the effective retrieval profile as JSON
    Profile(ProfileArgs),
}

#[derive(Args)]
struct DetectArgs {
    /// Text to classify
    text: String,

    /// Language hint lists (JSON or TOML)
    #[arg(long, env = "KISAN_HINTS")]
    hints: Option<PathBuf>,
}

#[derive(Args)]
struct ProfileArgs {
    /// Retrieval profile overlay (JSON or TOML)
    #[arg(long, env = "KISAN_PROFILE")]
    profile: Option<PathBuf>,
}

#[derive(Args)]
struct QueryArgs {
    /// Farmer's question
    question: String,

    /// Corpus file (JSON array or document with `entries`)
    #[arg(long, env = "KISAN_CORPUS")]
    corpus: PathBuf,

    /// Retrieval profile overlay (JSON or TOML)
    #[arg(long, env = "KISAN_PROFILE")]
    profile: Option<PathBuf>,

    /// Language hint lists (JSON or TOML)
    #[arg(long, env = "KISAN_HINTS")]
    hints: Option<PathBuf>,

    /// Maximum number of matches
    #[arg(long, short = 'n')]
    limit: Option<usize>,

    /// Region hint, e.g. Maharashtra
    #[arg(long)]
    region: Option<String>,

    /// Preferred language, most preferred first (repeatable)
    #[arg(long = "lang", value_delimiter = ',')]
    languages: Vec<String>,

    /// Hint tag (repeatable)
    #[arg(long = "tag", value_delimiter = ',')]
    tags: Vec<String>,

    /// Reference time for recency (RFC 3339 or YYYY-MM-DD)
    #[arg(long, value_parser = parse_as_of)]
    as_of: Option<DateTime<Utc>>,
}

impl QueryArgs {
    fn options(&self) -> RetrievalOptions {
        RetrievalOptions {
            limit: self.limit,
            region_hint: self.region.clone(),
            preferred_languages: self.languages.clone(),
            tags: self.tags.clone(),
            as_of: self.as_of,
        }
    }

    fn retriever(&self) -> Result<Retriever> {
        let retriever = Retriever::with_profile(load_profile(self.profile.as_deref())?);
        Ok(match load_hints(self.hints.as_deref())? {
            Some(hints) => retriever.with_hints(hints),
            None => retriever,
        })
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    match cli.command {
        Commands::Detect(args) => run_detect(&args),
        Commands::Retrieve(args) => run_retrieve(&args),
        Commands::Context(args) => run_context(&args),
        Commands::Profile(args) => run_profile(&args),
    }
}

fn run_detect(args: &DetectArgs) -> Result<()> {
    let code = match load_hints(args.hints.as_deref())? {
        Some(hints) => hints.detect(&args.text),
        None => kisan_retrieval::detect_language_from_text(&args.text),
    };
    println!("{code}");
    Ok(())
}

fn run_retrieve(args: &QueryArgs) -> Result<()> {
    let retriever = args.retriever()?;
    let store = corpus::load(&args.corpus)?;
    let matches = retriever.retrieve(&store, &args.question, &args.options());
    log::info!("Retrieved {} of {} entries", matches.len(), store.len());
    println!("{}", serde_json::to_string_pretty(&matches)?);
    Ok(())
}

fn run_context(args: &QueryArgs) -> Result<()> {
    let retriever = args.retriever()?;
    let store = corpus::load(&args.corpus)?;
    let (matches, context) =
        retriever.retrieve_with_context(&store, &args.question, &args.options());
    log::info!("Retrieved {} of {} entries", matches.len(), store.len());
    println!("{context}");
    Ok(())
}

fn run_profile(args: &ProfileArgs) -> Result<()> {
    let profile = load_profile(args.profile.as_deref())?;
    println!("{}", serde_json::to_string_pretty(&profile)?);
    Ok(())
}

fn load_profile(path: Option<&Path>) -> Result<RetrievalProfile> {
    match path {
        Some(path) => {
            let profile = RetrievalProfile::from_file(path)
                .with_context(|| format!("Failed to load profile {}", path.display()))?;
            log::debug!("Profile '{}': {}", profile.name(), profile.weights());
            Ok(profile)
        }
        None => Ok(RetrievalProfile::builtin()),
    }
}

fn load_hints(path: Option<&Path>) -> Result<Option<LanguageHints>> {
    path.map(LanguageHints::from_file).transpose()
}

fn parse_as_of(value: &str) -> std::result::Result<DateTime<Utc>, String> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| format!("expected RFC 3339 or YYYY-MM-DD, got {value:?}"))
}
