//! `emotion` command-line tool.
//!
//! - `emotion detect [TEXT]`: rank every emotion for one sentence, or start an
//!   interactive prompt when TEXT is omitted.
//! - `emotion survey`: label a batch of posts matching a keyword, show a
//!   sample and a frequency chart, and export the dataset as CSV.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use emotion_pipelines::analysis::{detect, survey, Detection, SurveyReport};
use emotion_pipelines::config::{EmotionConfig, Loader, LOCAL_CONFIG_FILE};
use emotion_pipelines::emotion::{load_scorer, EmotionScorer, ModelCache};
use emotion_pipelines::report::{
    bar_chart, headline, sample_table, scores_json, BLANK_INPUT_WARNING, EXPORT_MIME,
};
use emotion_pipelines::source::{CsvPostSource, TagTimeline};

const SAMPLE_TEXT_WIDTH: usize = 72;

/// Emotion detection for sentences and social-media posts
#[derive(Parser)]
#[command(name = "emotion", version, about)]
#[command(propagate_version = true)]
struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Extra TOML configuration layered over the defaults
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Run models on this CUDA device instead of the CPU
    #[arg(long, global = true, value_name = "INDEX")]
    cuda: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank every emotion for one piece of text
    ///
    /// Without TEXT, reads one sentence per line from stdin until EOF.
    Detect {
        /// Text to analyze
        text: Option<String>,
    },
    /// Label a batch of posts that mention a keyword
    Survey {
        /// Keyword to search for (with --from-csv, defaults to every row)
        #[arg(short, long)]
        query: Option<String>,

        /// How many posts to analyze (with --from-csv, defaults to the whole file)
        #[arg(short = 'n', long, value_name = "N")]
        max_posts: Option<usize>,

        /// Read posts from a CSV file with Date and Tweet columns instead of the network
        #[arg(long, value_name = "PATH")]
        from_csv: Option<PathBuf>,

        /// Where to write the labeled dataset
        #[arg(short, long, value_name = "PATH")]
        out: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = load_config(&cli)?;
    let cache = ModelCache::new();

    match cli.command {
        Commands::Detect { text } => run_detect(&config, &cache, text),
        Commands::Survey {
            query,
            max_posts,
            from_csv,
            out,
        } => run_survey(&config, &cache, query, max_posts, from_csv, out),
    }
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        _ if std::env::var_os(EnvFilter::DEFAULT_ENV).is_some() => EnvFilter::from_default_env(),
        1 => EnvFilter::new("info"),
        _ => EnvFilter::new("debug"),
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> Result<EmotionConfig> {
    let mut loader = Loader::new().with_optional_file(LOCAL_CONFIG_FILE);
    if let Some(path) = &cli.config {
        loader = loader.with_file(path);
    }
    if let Some(index) = cli.cuda {
        loader = loader.set_override("device.cuda", index as i64)?;
    }
    loader.build().context("Failed to load configuration")
}

fn run_detect(config: &EmotionConfig, cache: &ModelCache, text: Option<String>) -> Result<()> {
    let model = &config.detect.model;
    let scorer = load_scorer(
        model.family,
        model.checkpoint(),
        config.device.request(),
        cache,
    )
    .with_context(|| format!("Failed to load model {}", model.checkpoint()))?;

    if let Some(text) = text {
        return print_detection(scorer.as_ref(), &text);
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    loop {
        write!(stdout, "> ")?;
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            writeln!(stdout)?;
            return Ok(());
        }
        // A failed line is reported; the session keeps going.
        let text = line.trim_end_matches(['\r', '\n']);
        if let Err(e) = print_detection(scorer.as_ref(), text) {
            eprintln!("error: {e:#}");
        }
    }
}

fn print_detection(scorer: &dyn EmotionScorer, text: &str) -> Result<()> {
    match detect(scorer, text)? {
        Detection::Blank => println!("{BLANK_INPUT_WARNING}"),
        Detection::Ranked(ranking) => {
            println!("{}", headline(&ranking));
            println!("All Scores:");
            println!("{}", scores_json(&ranking.ranked)?);
        }
    }
    Ok(())
}

fn run_survey(
    config: &EmotionConfig,
    cache: &ModelCache,
    query: Option<String>,
    max_posts: Option<usize>,
    from_csv: Option<PathBuf>,
    out: Option<PathBuf>,
) -> Result<()> {
    let settings = &config.survey;
    let plan = settings.plan(query, max_posts, from_csv.as_deref(), out)?;
    let query = plan.query.as_str();

    let scorer = load_scorer(
        settings.model.family,
        settings.model.checkpoint(),
        config.device.request(),
        cache,
    )
    .with_context(|| format!("Failed to load model {}", settings.model.checkpoint()))?;

    let report = match &from_csv {
        Some(path) => {
            let source = CsvPostSource::open(path, query)?;
            survey(scorer.as_ref(), source, plan.max_posts)
        }
        None => {
            let source = TagTimeline::new(query, &config.source.timeline_options())?;
            survey(scorer.as_ref(), source, plan.max_posts)
        }
    }
    .with_context(|| format!("Failed to retrieve posts for '{query}'"))?;

    print_report(&report, query, settings.sample_size);

    report.export_csv(&plan.export_path)?;
    println!(
        "Dataset written to {} ({EXPORT_MIME})",
        plan.export_path.display()
    );
    Ok(())
}

fn print_report(report: &SurveyReport, query: &str, sample_size: usize) {
    let subject = if query.is_empty() {
        "every post".to_string()
    } else {
        format!("'{query}'")
    };
    if report.is_empty() {
        println!("No posts found for {subject}.");
        return;
    }

    let sample = report.sample(sample_size);
    println!(
        "Sample of {} from {} posts, {subject}:",
        sample.len(),
        report.len()
    );
    println!("{}", sample_table(sample, SAMPLE_TEXT_WIDTH));

    println!("Emotion Distribution:");
    print!("{}", bar_chart(&report.frequency_table()));

    let unknown = report.unknown_count();
    if unknown > 0 {
        println!("{unknown} post(s) could not be classified.");
    }
}
