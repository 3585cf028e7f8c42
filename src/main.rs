use anyhow::{Context, Result};
use clap::{ArgGroup, Parser};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, Level};

use lyricscan::aggregate::Aggregator;
use lyricscan::export::export_report;
use lyricscan::fetch::{FetchConfig, HttpFetcher, DEFAULT_BASE_URL, DEFAULT_USER_AGENT};
use lyricscan::keywords::{load_keywords, MatchPattern};
use lyricscan::models::{AggregateResult, Scope};
use lyricscan::progress::{format_elapsed, set_log_only};
use lyricscan::report::{render_grouped, Emphasis, Report};
use lyricscan::safety::validate_output_paths;
use lyricscan::scan::ScanContext;

#[derive(Parser)]
#[command(name = "lyricscan")]
#[command(about = "Scrape lyrics pages and report keyword matches by song, album and artist")]
#[command(group(ArgGroup::new("scope").required(true).args(["song", "album", "artist"])))]
struct Args {
    /// Full song URL (e.g. https://genius.com/Future-the-way-things-going-lyrics)
    #[arg(short, long)]
    song: Option<String>,

    /// Full album URL (e.g. https://genius.com/albums/Future/Hndrxx)
    #[arg(short, long)]
    album: Option<String>,

    /// Full artist albums URL (e.g. https://genius.com/artists/Future/albums)
    #[arg(long)]
    artist: Option<String>,

    /// Keyword source, one phrase per line
    #[arg(short, long, default_value = "keywords.txt")]
    keywords: PathBuf,

    /// Minimum milliseconds between page requests (0 disables pacing)
    #[arg(long, default_value = "2000")]
    delay_ms: u64,

    #[arg(long, default_value = "15")]
    timeout_secs: u64,

    /// Site root used to resolve relative links
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    base_url: String,

    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    user_agent: String,

    #[arg(long, default_value = "lyrics_matches.csv")]
    csv: PathBuf,

    #[arg(long, default_value = "output.txt")]
    txt: PathBuf,

    /// Write run statistics as JSON
    #[arg(long)]
    stats: Option<PathBuf>,

    /// Hide progress bars and log progress lines instead
    #[arg(long)]
    log_only: bool,

    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn scope(&self) -> Option<Scope> {
        if let Some(url) = &self.song {
            Some(Scope::Song(url.clone()))
        } else if let Some(url) = &self.album {
            Some(Scope::Album(url.clone()))
        } else {
            self.artist.clone().map(Scope::Artist)
        }
    }
}

/// Print the terminal rendering, or the scope's no-match notice.
fn print_results(aggregate: &AggregateResult, emphasis: Emphasis) {
    if aggregate.has_matches() {
        for line in render_grouped(aggregate, emphasis) {
            println!("{}", line);
        }
        return;
    }

    match &aggregate.scope {
        Scope::Song(_) => {
            for (_, song) in aggregate.songs() {
                println!("\n{}", emphasis.wrap(&song.title));
            }
            println!("No matches found for any keywords.");
        }
        Scope::Album(_) => {
            for album in aggregate.albums.values() {
                println!("\n{} {}", emphasis.wrap("Artist:"), album.artist);
                println!("{} {}", emphasis.wrap("Album:"), album.title);
            }
            println!("No matches found in any songs from the album.");
        }
        Scope::Artist(_) => println!("\nNo matches found in any albums."),
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::INFO })
        .with_writer(std::io::stderr)
        .init();
    set_log_only(args.log_only);

    let scope = args.scope().context("No scope given (use --song, --album or --artist)")?;

    validate_output_paths(&args.csv, &args.txt, &args.keywords)?;

    let keywords = load_keywords(&args.keywords)
        .with_context(|| format!("Failed to load keywords from {:?}", args.keywords))?;
    let pattern = MatchPattern::compile(&keywords)?;
    info!(
        "Loaded {} keywords ({} variants)",
        keywords.entries().len(),
        keywords.len()
    );
    let ctx = ScanContext::new(pattern);

    let mut fetcher = HttpFetcher::new(FetchConfig {
        base_url: args.base_url.clone(),
        delay: Duration::from_millis(args.delay_ms),
        timeout: Duration::from_secs(args.timeout_secs),
        user_agent: args.user_agent.clone(),
    })?;

    info!("Scraping {}: {}", scope.label(), scope.url());
    let mut aggregator = Aggregator::new(&ctx, &mut fetcher);
    let aggregate = aggregator
        .run(&scope)
        .with_context(|| format!("Failed to scrape {}", scope.url()))?;
    let mut stats = aggregator.into_stats();

    let emphasis = if std::io::stdout().is_terminal() {
        Emphasis::ANSI_BOLD
    } else {
        Emphasis::PLAIN
    };
    print_results(&aggregate, emphasis);

    let report = Report::build(&aggregate);
    stats.records = report.records.len();
    stats.distinct_keywords = report.distinct_keywords();

    if let Some(paths) = export_report(&report, &args.csv, &args.txt)? {
        println!(
            "\nResults exported to '{}' and '{}'",
            paths.csv.display(),
            paths.txt.display()
        );
    }

    println!("\n{:=<60}", "");
    println!("Scan complete!");
    println!("  Pages fetched: {}", stats.pages_fetched);
    println!("  Songs scanned: {} ({} failed)", stats.songs_scanned, stats.songs_failed);
    println!("  Records: {}", stats.records);
    println!("  Elapsed: {}", format_elapsed(stats.elapsed_seconds));
    println!("{:=<60}", "");

    stats.log_summary();
    if let Some(path) = &args.stats {
        stats
            .write_to_file(path)
            .with_context(|| format!("Failed to write stats to {:?}", path))?;
    }

    Ok(())
}
