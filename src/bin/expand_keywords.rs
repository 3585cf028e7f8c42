//! Show keyword expansion and the compiled pattern, optionally scanning a
//! local lyrics file. No network access.
//!
//! Usage: expand-keywords [--keywords keywords.txt] [--lyrics song.txt]

use anyhow::{Context, Result};
use clap::Parser;
use std::io::IsTerminal;
use std::path::PathBuf;

use lyricscan::keywords::{load_keywords, MatchPattern};
use lyricscan::models::{AggregateResult, AlbumResult, Scope, SongPage, UNKNOWN_ALBUM, UNKNOWN_ARTIST};
use lyricscan::report::{render_grouped, Emphasis};
use lyricscan::scan::ScanContext;

#[derive(Parser)]
#[command(name = "expand-keywords")]
#[command(about = "Print keyword variants and the match pattern; scan a local lyrics file")]
struct Args {
    #[arg(short, long, default_value = "keywords.txt")]
    keywords: PathBuf,

    /// Plain-text lyrics to scan (one lyric line per line)
    #[arg(short, long)]
    lyrics: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let keywords = load_keywords(&args.keywords)
        .with_context(|| format!("Failed to load keywords from {:?}", args.keywords))?;
    let pattern = MatchPattern::compile(&keywords)?;

    let width = keywords
        .entries()
        .iter()
        .map(|e| e.phrase.chars().count())
        .max()
        .unwrap_or(0);
    for entry in keywords.entries() {
        println!("{:<width$}  ->  {}", entry.phrase, entry.plural, width = width);
    }
    println!("\n{} variants", keywords.len());
    println!("Pattern: {}", pattern.as_str());

    let Some(path) = args.lyrics else {
        return Ok(());
    };

    let text = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read lyrics from {:?}", path))?;
    let title = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let ctx = ScanContext::new(pattern);
    let doc = ctx.scan_song(SongPage {
        title: title.clone(),
        artist: UNKNOWN_ARTIST.to_string(),
        album: UNKNOWN_ALBUM.to_string(),
        lyrics: text,
    });

    let mut aggregate = AggregateResult::new(Scope::Song(path.display().to_string()));
    let mut album = AlbumResult::new(UNKNOWN_ALBUM, UNKNOWN_ARTIST);
    album.songs.insert(title, doc);
    aggregate.albums.insert(UNKNOWN_ALBUM.to_string(), album);

    if !aggregate.has_matches() {
        println!("\nNo matches found for any keywords.");
        return Ok(());
    }

    let emphasis = if std::io::stdout().is_terminal() {
        Emphasis::ANSI_BOLD
    } else {
        Emphasis::PLAIN
    };
    println!();
    for line in render_grouped(&aggregate, emphasis) {
        println!("{}", line);
    }

    Ok(())
}
