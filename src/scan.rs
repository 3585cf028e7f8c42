//! Line matching and document scanning.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::keywords::MatchPattern;
use crate::models::{DocumentResult, KeywordHits, LineMatches, SongPage};

/// Every line boundary a lyrics block may use, CRLF first so it splits once.
static LINE_BREAK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\r\n|[\n\r\x0b\x0c\x1c-\x1e\x{85}\x{2028}\x{2029}]").unwrap()
});

/// Split lyrics into lines on any line boundary. Unlike `str::lines`, a bare
/// `\r`, form feed or Unicode line/paragraph separator also ends a line.
pub fn split_lines(lyrics: &str) -> impl Iterator<Item = &str> {
    LINE_BREAK.split(lyrics)
}

/// Immutable per-run scan configuration, passed explicitly to every scan.
#[derive(Clone, Debug)]
pub struct ScanContext {
    pattern: MatchPattern,
}

impl ScanContext {
    pub fn new(pattern: MatchPattern) -> Self {
        Self { pattern }
    }

    pub fn pattern(&self) -> &MatchPattern {
        &self.pattern
    }

    /// Scan a fetched song page, keeping its attribution.
    pub fn scan_song(&self, page: SongPage) -> DocumentResult {
        let (lines, keywords) = scan_document(&page.lyrics, &self.pattern);
        DocumentResult {
            title: page.title,
            artist: page.artist,
            album: page.album,
            lines,
            keywords,
        }
    }
}

/// Keyword variants matched in one line, left to right, lower-cased.
/// Repeats within the line are returned as-is.
pub fn match_line(line: &str, pattern: &MatchPattern) -> Vec<String> {
    let lowered = line.to_lowercase();
    pattern
        .find_in_lowered(&lowered)
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Scan every line of a lyrics block.
///
/// Returns the matching lines (original text, one entry per distinct line)
/// and the set of all keywords found in the document.
pub fn scan_document(lyrics: &str, pattern: &MatchPattern) -> (LineMatches, KeywordHits) {
    let mut lines = LineMatches::new();
    let mut keywords = KeywordHits::default();

    if pattern.is_empty() {
        return (lines, keywords);
    }

    for line in split_lines(lyrics) {
        let found = match_line(line, pattern);
        if found.is_empty() {
            continue;
        }

        let mut hits = lines.get(line).cloned().unwrap_or_default();
        for keyword in &found {
            hits.insert(keyword);
            keywords.insert(keyword);
        }
        lines.insert(line.to_string(), hits);
    }

    (lines, keywords)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keywords::KeywordSet;

    fn pattern(phrases: &[&str]) -> MatchPattern {
        MatchPattern::compile(&KeywordSet::from_phrases(phrases)).unwrap()
    }

    #[test]
    fn test_match_line_whole_word() {
        let p = pattern(&["ice"]);
        assert!(match_line("Justice for all", &p).is_empty());
        assert!(match_line("Priceless", &p).is_empty());
        assert_eq!(match_line("Ice cold, ice cold", &p), vec!["ice", "ice"]);
        assert_eq!(match_line("ICE on my wrist", &p), vec!["ice"]);
    }

    #[test]
    fn test_match_line_plural_variant() {
        let p = pattern(&["city", "kiss"]);
        assert_eq!(match_line("Two cities, many kisses", &p), vec!["cities", "kisses"]);
    }

    #[test]
    fn test_match_line_phrase() {
        let p = pattern(&["rolls royce"]);
        assert_eq!(
            match_line("Pulled up in the Rolls Royce, two Rolls Royces", &p),
            vec!["rolls royce", "rolls royces"]
        );
    }

    #[test]
    fn test_match_line_empty() {
        let p = pattern(&["ice"]);
        assert!(match_line("", &p).is_empty());
    }

    #[test]
    fn test_scan_document_repeated_line_recorded_once() {
        let p = pattern(&["ice"]);
        let lyrics = "Ice cold, ice cold\nSomething else\nIce cold, ice cold\n";
        let (lines, keywords) = scan_document(lyrics, &p);

        assert_eq!(lines.len(), 1);
        let hits = lines.get("Ice cold, ice cold").unwrap();
        assert_eq!(hits.iter().collect::<Vec<_>>(), vec!["ice"]);
        assert_eq!(keywords.iter().collect::<Vec<_>>(), vec!["ice"]);
    }

    #[test]
    fn test_scan_document_keeps_original_casing_and_order() {
        let p = pattern(&["money", "ice"]);
        let lyrics = "[Chorus]\nMoney on my mind\n\nIce on my neck, money in my hand";
        let (lines, keywords) = scan_document(lyrics, &p);

        let keys: Vec<&str> = lines.iter().map(|(line, _)| line).collect();
        assert_eq!(
            keys,
            vec!["Money on my mind", "Ice on my neck, money in my hand"]
        );
        let second = lines.get("Ice on my neck, money in my hand").unwrap();
        assert_eq!(second.iter().collect::<Vec<_>>(), vec!["ice", "money"]);
        assert_eq!(keywords.iter().collect::<Vec<_>>(), vec!["money", "ice"]);
    }

    #[test]
    fn test_scan_document_line_separators() {
        let p = pattern(&["ice"]);
        let lyrics = "ice one\rice two\u{2028}ice three\r\nice four\u{85}ice one\x0cno match";
        let (lines, _) = scan_document(lyrics, &p);

        let keys: Vec<&str> = lines.iter().map(|(line, _)| line).collect();
        assert_eq!(keys, vec!["ice one", "ice two", "ice three", "ice four"]);
    }

    #[test]
    fn test_split_lines_crlf_is_one_break() {
        let lines: Vec<&str> = split_lines("a\r\nb\n\nc").collect();
        assert_eq!(lines, vec!["a", "b", "", "c"]);
    }

    #[test]
    fn test_scan_document_no_matches() {
        let p = pattern(&["ice"]);
        let (lines, keywords) = scan_document("Nothing here\n", &p);
        assert!(lines.is_empty());
        assert!(keywords.is_empty());
    }

    #[test]
    fn test_scan_document_empty_pattern() {
        let p = MatchPattern::default();
        let (lines, _) = scan_document("ice ice baby", &p);
        assert!(lines.is_empty());
    }

    #[test]
    fn test_scan_song_attribution() {
        let ctx = ScanContext::new(pattern(&["ice"]));
        let result = ctx.scan_song(SongPage {
            title: "Mask Off".to_string(),
            artist: "Future".to_string(),
            album: "FUTURE".to_string(),
            lyrics: "Ice in my veins".to_string(),
        });
        assert_eq!(result.title, "Mask Off");
        assert_eq!(result.album, "FUTURE");
        assert!(result.has_matches());
    }
}
