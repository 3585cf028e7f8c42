//! Core data models for the lyrics keyword scan.
//!
//! This module contains the page shapes returned by a fetcher, the per-song
//! scan results, the album/artist aggregate hierarchy, and the flat export
//! record.

use rustc_hash::FxHashMap;
use serde::Serialize;

// ============================================================================
// Sentinels
// ============================================================================

pub const UNKNOWN_TITLE: &str = "Unknown Title";
pub const UNKNOWN_ARTIST: &str = "Unknown Artist";
pub const UNKNOWN_ALBUM: &str = "Unknown Album";

// ============================================================================
// Ordered Title Map
// ============================================================================

/// Insertion-ordered map keyed by scraped title.
///
/// Entries live in a Vec; the hash map only indexes into it. Re-inserting an
/// existing title replaces the value but keeps the original position, so a
/// duplicate title is last-write-wins without reordering.
#[derive(Clone, Debug)]
pub struct TitleMap<V> {
    entries: Vec<(String, V)>,
    index: FxHashMap<String, usize>,
}

impl<V> TitleMap<V> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: FxHashMap::default(),
        }
    }

    /// Insert or replace; returns the previous value for a repeated title.
    pub fn insert(&mut self, title: String, value: V) -> Option<V> {
        if let Some(&idx) = self.index.get(&title) {
            return Some(std::mem::replace(&mut self.entries[idx].1, value));
        }
        self.index.insert(title.clone(), self.entries.len());
        self.entries.push((title, value));
        None
    }

    pub fn get(&self, title: &str) -> Option<&V> {
        self.index.get(title).map(|&idx| &self.entries[idx].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.iter().map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V> Default for TitleMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Fetched Pages
// ============================================================================

/// Normalized song page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SongPage {
    pub title: String,
    pub artist: String,
    pub album: String,
    /// Lyrics with line breaks preserved
    pub lyrics: String,
}

/// Normalized album page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlbumPage {
    pub title: String,
    pub artist: String,
    /// Absolute, deduplicated, first-seen order
    pub song_urls: Vec<String>,
}

/// Normalized artist albums page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArtistPage {
    /// Absolute, deduplicated, first-seen order
    pub album_urls: Vec<String>,
}

// ============================================================================
// Scan Results
// ============================================================================

/// Distinct keywords matched on one line, first-found order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KeywordHits(Vec<String>);

impl KeywordHits {
    /// Set union; returns true if the keyword was new for this line.
    pub fn insert(&mut self, keyword: &str) -> bool {
        if self.0.iter().any(|k| k == keyword) {
            return false;
        }
        self.0.push(keyword.to_string());
        true
    }

    pub fn contains(&self, keyword: &str) -> bool {
        self.0.iter().any(|k| k == keyword)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Literal lyrics line → keywords matched on it. A repeated line (chorus)
/// keeps a single entry at its first position.
pub type LineMatches = TitleMap<KeywordHits>;

/// Scan result for one song.
#[derive(Clone, Debug)]
pub struct DocumentResult {
    pub title: String,
    pub artist: String,
    pub album: String,
    pub lines: LineMatches,
    /// Every distinct keyword matched anywhere in the song, first-found order
    pub keywords: KeywordHits,
}

impl DocumentResult {
    pub fn has_matches(&self) -> bool {
        !self.lines.is_empty()
    }
}

/// One album's retained songs, attributed to the album page's artist.
#[derive(Clone, Debug)]
pub struct AlbumResult {
    pub title: String,
    pub artist: String,
    pub songs: TitleMap<DocumentResult>,
}

impl AlbumResult {
    pub fn new(title: impl Into<String>, artist: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
            songs: TitleMap::new(),
        }
    }

    pub fn has_matches(&self) -> bool {
        self.songs.values().any(DocumentResult::has_matches)
    }
}

/// What the run targeted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Scope {
    Song(String),
    Album(String),
    Artist(String),
}

impl Scope {
    pub fn url(&self) -> &str {
        match self {
            Scope::Song(url) | Scope::Album(url) | Scope::Artist(url) => url,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Scope::Song(_) => "song",
            Scope::Album(_) => "album",
            Scope::Artist(_) => "artist",
        }
    }
}

/// Completed hierarchy for a run: album title → album result, arrival order.
///
/// Song scope holds one album containing the one targeted song (kept even
/// without matches); album scope holds one album; artist scope holds every
/// album that produced at least one matching song.
#[derive(Clone, Debug)]
pub struct AggregateResult {
    pub scope: Scope,
    pub albums: TitleMap<AlbumResult>,
}

impl AggregateResult {
    pub fn new(scope: Scope) -> Self {
        Self {
            scope,
            albums: TitleMap::new(),
        }
    }

    pub fn songs(&self) -> impl Iterator<Item = (&AlbumResult, &DocumentResult)> {
        self.albums
            .values()
            .flat_map(|album| album.songs.values().map(move |song| (album, song)))
    }

    pub fn has_matches(&self) -> bool {
        self.albums.values().any(AlbumResult::has_matches)
    }
}

// ============================================================================
// Output Models
// ============================================================================

/// One (line, keyword) match with full attribution; one CSV row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MatchRecord {
    #[serde(rename = "Keyword")]
    pub keyword: String,
    #[serde(rename = "Lyrics")]
    pub lyrics: String,
    #[serde(rename = "Song")]
    pub song: String,
    #[serde(rename = "Album")]
    pub album: String,
    #[serde(rename = "Artist")]
    pub artist: String,
}

// ============================================================================
// Statistics (Instrumentation)
// ============================================================================

/// Counters collected over one run.
#[derive(Default, Debug, Clone, Serialize)]
pub struct RunStats {
    pub scope: String,
    pub pages_fetched: usize,
    pub songs_scanned: usize,
    pub songs_failed: usize,
    pub songs_with_matches: usize,
    pub albums_scanned: usize,
    pub albums_failed: usize,
    pub albums_with_matches: usize,
    pub records: usize,
    pub distinct_keywords: usize,
    pub elapsed_seconds: f64,
}

impl RunStats {
    /// Log stats as pretty JSON at debug level
    pub fn log_summary(&self) {
        if let Ok(json) = serde_json::to_string_pretty(self) {
            tracing::debug!("run stats:\n{}", json);
        }
    }

    /// Write stats to a JSON file
    pub fn write_to_file(&self, path: &std::path::Path) -> crate::error::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|e| crate::error::ScanError::io(path, e))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_map_keeps_first_position() {
        let mut map = TitleMap::new();
        assert!(map.insert("Intro".to_string(), 1).is_none());
        assert!(map.insert("Outro".to_string(), 2).is_none());
        assert_eq!(map.insert("Intro".to_string(), 3), Some(1));

        let entries: Vec<(&str, &i32)> = map.iter().collect();
        assert_eq!(entries, vec![("Intro", &3), ("Outro", &2)]);
        assert_eq!(map.get("Intro"), Some(&3));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_keyword_hits_union() {
        let mut hits = KeywordHits::default();
        assert!(hits.insert("ice"));
        assert!(hits.insert("money"));
        assert!(!hits.insert("ice"));
        assert_eq!(hits.iter().collect::<Vec<_>>(), vec!["ice", "money"]);
    }

    #[test]
    fn test_scope_url() {
        let scope = Scope::Album("https://genius.com/albums/Future/Hndrxx".to_string());
        assert_eq!(scope.url(), "https://genius.com/albums/Future/Hndrxx");
        assert_eq!(scope.label(), "album");
    }

    #[test]
    fn test_match_record_csv_header() {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer
            .serialize(MatchRecord {
                keyword: "ice".to_string(),
                lyrics: "Ice cold, ice cold".to_string(),
                song: "Song".to_string(),
                album: "Album".to_string(),
                artist: "Artist".to_string(),
            })
            .unwrap();
        let out = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        assert_eq!(
            out,
            "Keyword,Lyrics,Song,Album,Artist\nice,\"Ice cold, ice cold\",Song,Album,Artist\n"
        );
    }
}
