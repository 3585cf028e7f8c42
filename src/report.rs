//! Report building: flat match records and the grouped text rendering.
//!
//! Both outputs walk the same aggregate, so every record has exactly one
//! rendered row and vice versa.

use regex::{Captures, Regex};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::models::{AggregateResult, MatchRecord};

// ============================================================================
// Emphasis
// ============================================================================

/// Markers placed around an emphasized keyword (and headers).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Emphasis {
    pub open: &'static str,
    pub close: &'static str,
}

impl Emphasis {
    /// No markers: the text document
    pub const PLAIN: Emphasis = Emphasis { open: "", close: "" };
    /// ANSI bold: the terminal
    pub const ANSI_BOLD: Emphasis = Emphasis {
        open: "\x1b[1m",
        close: "\x1b[0m",
    };

    pub fn wrap(&self, text: &str) -> String {
        format!("{}{}{}", self.open, text, self.close)
    }
}

/// Emphasizes whole-word, case-insensitive keyword occurrences in a line,
/// keeping the line's original casing. Patterns are compiled once per keyword.
#[derive(Default)]
pub struct Highlighter {
    cache: FxHashMap<String, Option<Regex>>,
}

impl Highlighter {
    pub fn emphasize(&mut self, line: &str, keyword: &str, emphasis: Emphasis) -> String {
        if emphasis == Emphasis::PLAIN {
            return line.to_string();
        }
        let regex = self
            .cache
            .entry(keyword.to_string())
            .or_insert_with(|| Regex::new(&format!(r"(?i)\b{}\b", regex::escape(keyword))).ok());
        match regex {
            Some(regex) => regex
                .replace_all(line, |caps: &Captures| emphasis.wrap(&caps[0]))
                .into_owned(),
            None => line.to_string(),
        }
    }
}

// ============================================================================
// Flat Records
// ============================================================================

/// One record per (song, line, keyword), in hierarchy order, attributed to
/// the enclosing album's title and artist.
pub fn collect_records(aggregate: &AggregateResult) -> Vec<MatchRecord> {
    let mut records = Vec::new();
    for (album, song) in aggregate.songs() {
        for (line, hits) in song.lines.iter() {
            for keyword in hits.iter() {
                records.push(MatchRecord {
                    keyword: keyword.to_string(),
                    lyrics: line.to_string(),
                    song: song.title.clone(),
                    album: album.title.clone(),
                    artist: album.artist.clone(),
                });
            }
        }
    }
    records
}

/// Sort by keyword frequency across all records (descending), then keyword
/// (ascending). Stable: records sharing a keyword keep hierarchy order.
pub fn sort_records(records: &mut [MatchRecord]) {
    let mut counts: FxHashMap<String, usize> = FxHashMap::default();
    for record in records.iter() {
        *counts.entry(record.keyword.clone()).or_insert(0) += 1;
    }
    records.sort_by(|a, b| {
        counts[&b.keyword]
            .cmp(&counts[&a.keyword])
            .then_with(|| a.keyword.cmp(&b.keyword))
    });
}

// ============================================================================
// Grouped Rendering
// ============================================================================

/// Width of the longest keyword matched anywhere in the run, in characters.
pub fn keyword_width(aggregate: &AggregateResult) -> usize {
    aggregate
        .songs()
        .flat_map(|(_, song)| song.keywords.iter())
        .map(|keyword| keyword.chars().count())
        .max()
        .unwrap_or(0)
}

/// Grouped rendering: album headers, then each song title preceded by a
/// blank line, then one row per (line, keyword) in arrival order.
pub fn render_grouped(aggregate: &AggregateResult, emphasis: Emphasis) -> Vec<String> {
    let width = keyword_width(aggregate);
    let mut highlighter = Highlighter::default();
    let mut out = Vec::new();

    for album in aggregate.albums.values() {
        out.push(format!("{} {}", emphasis.wrap("Artist:"), album.artist));
        out.push(format!("{} {}", emphasis.wrap("Album:"), album.title));

        for song in album.songs.values() {
            out.push(format!("\n{}", emphasis.wrap(&song.title)));
            for (line, hits) in song.lines.iter() {
                for keyword in hits.iter() {
                    let emphasized = highlighter.emphasize(line, keyword, emphasis);
                    out.push(format!("- {:<width$}   {}", keyword, emphasized, width = width));
                }
            }
        }
    }

    out
}

// ============================================================================
// Report
// ============================================================================

/// Both report artifacts derived from one aggregate.
#[derive(Clone, Debug)]
pub struct Report {
    /// Frequency-sorted records for tabular export
    pub records: Vec<MatchRecord>,
    /// Grouped rendering without emphasis markers, one entry per output line
    pub text: Vec<String>,
}

impl Report {
    pub fn build(aggregate: &AggregateResult) -> Self {
        let mut records = collect_records(aggregate);
        sort_records(&mut records);
        Self {
            records,
            text: render_grouped(aggregate, Emphasis::PLAIN),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of different keyword variants across all records.
    pub fn distinct_keywords(&self) -> usize {
        self.records
            .iter()
            .map(|r| r.keyword.as_str())
            .collect::<FxHashSet<_>>()
            .len()
    }

    pub fn text_document(&self) -> String {
        self.text.join("\n")
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keywords::{KeywordSet, MatchPattern};
    use crate::models::{AlbumResult, Scope, SongPage};
    use crate::scan::ScanContext;

    fn record(keyword: &str, song: &str) -> MatchRecord {
        MatchRecord {
            keyword: keyword.to_string(),
            lyrics: format!("{} line", keyword),
            song: song.to_string(),
            album: "Album".to_string(),
            artist: "Artist".to_string(),
        }
    }

    fn aggregate(phrases: &[&str], albums: &[(&str, &str, Vec<(&str, &str)>)]) -> AggregateResult {
        let ctx = ScanContext::new(MatchPattern::compile(&KeywordSet::from_phrases(phrases)).unwrap());
        let mut agg = AggregateResult::new(Scope::Artist("artist".to_string()));
        for (title, artist, songs) in albums {
            let mut album = AlbumResult::new(*title, *artist);
            for (song_title, lyrics) in songs.iter() {
                let doc = ctx.scan_song(SongPage {
                    title: song_title.to_string(),
                    artist: artist.to_string(),
                    album: title.to_string(),
                    lyrics: lyrics.to_string(),
                });
                album.songs.insert(doc.title.clone(), doc);
            }
            agg.albums.insert(title.to_string(), album);
        }
        agg
    }

    #[test]
    fn test_sort_records_by_frequency_then_keyword() {
        let mut records = vec![
            record("money", "s1"),
            record("cash", "s1"),
            record("ice", "s1"),
            record("money", "s2"),
            record("ice", "s2"),
            record("money", "s3"),
            record("ice", "s3"),
        ];
        sort_records(&mut records);

        let keywords: Vec<&str> = records.iter().map(|r| r.keyword.as_str()).collect();
        assert_eq!(
            keywords,
            vec!["ice", "ice", "ice", "money", "money", "money", "cash"]
        );
        // Stable within a keyword
        let ice_songs: Vec<&str> = records[..3].iter().map(|r| r.song.as_str()).collect();
        assert_eq!(ice_songs, vec!["s1", "s2", "s3"]);
    }

    #[test]
    fn test_emphasize_keeps_casing_and_whole_words() {
        let mut highlighter = Highlighter::default();
        let out = highlighter.emphasize("Ice cold, ice cold, justice", "ice", Emphasis::ANSI_BOLD);
        assert_eq!(
            out,
            "\x1b[1mIce\x1b[0m cold, \x1b[1mice\x1b[0m cold, justice"
        );
        assert_eq!(
            highlighter.emphasize("Ice cold", "ice", Emphasis::PLAIN),
            "Ice cold"
        );
    }

    #[test]
    fn test_collect_records_one_per_line_keyword() {
        let agg = aggregate(
            &["ice", "money"],
            &[("Hndrxx", "Future", vec![("Song", "Ice and money\nIce and money\nmoney")])],
        );
        let records = collect_records(&agg);
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].keyword, "ice");
        assert_eq!(records[0].lyrics, "Ice and money");
        assert_eq!(records[1].keyword, "money");
        assert_eq!(records[2].lyrics, "money");
        assert_eq!(records[2].album, "Hndrxx");
        assert_eq!(records[2].artist, "Future");
    }

    #[test]
    fn test_render_grouped_layout() {
        let agg = aggregate(
            &["ice", "rolls royce"],
            &[("Hndrxx", "Future", vec![("Song", "Ice cold\nRolls Royce ride")])],
        );
        let text = render_grouped(&agg, Emphasis::PLAIN);
        assert_eq!(
            text,
            vec![
                "Artist: Future",
                "Album: Hndrxx",
                "\nSong",
                "- ice           Ice cold",
                "- rolls royce   Rolls Royce ride",
            ]
        );
    }

    #[test]
    fn test_keyword_width_uses_chars() {
        let agg = aggregate(&["café"], &[("A", "B", vec![("S", "Café au lait")])]);
        assert_eq!(keyword_width(&agg), 4);
    }

    #[test]
    fn test_distinct_keywords() {
        let report = Report {
            records: vec![
                record("money", "One"),
                record("ice", "One"),
                record("money", "Two"),
                record("ices", "Two"),
            ],
            text: Vec::new(),
        };
        assert_eq!(report.distinct_keywords(), 3);
    }

    #[test]
    fn test_empty_report() {
        let agg = aggregate(&["ice"], &[]);
        let report = Report::build(&agg);
        assert!(report.is_empty());
        assert!(report.text.is_empty());
    }

    /// Parse rendered rows back into (keyword, line, song, album, artist).
    fn rows_from_text(text: &[String], width: usize) -> Vec<(String, String, String, String, String)> {
        let (mut artist, mut album, mut song) = (String::new(), String::new(), String::new());
        let mut rows = Vec::new();
        for entry in text {
            if let Some(rest) = entry.strip_prefix("Artist: ") {
                artist = rest.to_string();
            } else if let Some(rest) = entry.strip_prefix("Album: ") {
                album = rest.to_string();
            } else if let Some(rest) = entry.strip_prefix('\n') {
                song = rest.to_string();
            } else if let Some(rest) = entry.strip_prefix("- ") {
                let keyword: String = rest.chars().take(width).collect();
                let line: String = rest.chars().skip(width + 3).collect();
                rows.push((
                    keyword.trim_end().to_string(),
                    line,
                    song.clone(),
                    album.clone(),
                    artist.clone(),
                ));
            }
        }
        rows
    }

    #[test]
    fn test_records_and_text_agree() {
        let agg = aggregate(
            &["ice", "money", "cash"],
            &[
                ("First", "Future", vec![("One", "Ice, money\ncash"), ("Two", "money moves")]),
                ("Second", "Future", vec![("Three", "ices and cash\nmoney")]),
            ],
        );
        let report = Report::build(&agg);

        let mut from_records: Vec<_> = report
            .records
            .iter()
            .map(|r| {
                (
                    r.keyword.clone(),
                    r.lyrics.clone(),
                    r.song.clone(),
                    r.album.clone(),
                    r.artist.clone(),
                )
            })
            .collect();
        let mut from_text = rows_from_text(&report.text, keyword_width(&agg));

        from_records.sort();
        from_text.sort();
        assert_eq!(from_records.len(), 7);
        assert_eq!(from_records, from_text);
    }
}
