//! Keyword expansion: singular + plural variants and the compiled match pattern.
//!
//! The pattern is built once per run and shared read-only by every scan.

use regex::Regex;
use rustc_hash::FxHashSet;
use std::path::Path;

use crate::error::{Result, ScanError};

// ============================================================================
// Pluralization
// ============================================================================

const VOWELS: &[char] = &['a', 'e', 'i', 'o', 'u'];

/// Heuristic English plural of a keyword phrase.
///
/// Only the last word of a multi-word phrase is pluralized
/// ("rolls royce" → "rolls royces"). Irregular plurals are not handled:
/// "goose" becomes "gooses".
///
/// Suffix and vowel checks ignore case while the word keeps its own casing,
/// so "DAY" becomes "DAYs" and "CITY" becomes "CITies".
pub fn pluralize(phrase: &str) -> String {
    let mut words: Vec<&str> = phrase.split_whitespace().collect();
    let Some(last) = words.pop() else {
        return String::new();
    };
    let plural = pluralize_word(last);
    if words.is_empty() {
        plural
    } else {
        format!("{} {}", words.join(" "), plural)
    }
}

fn pluralize_word(word: &str) -> String {
    let lower = word.to_lowercase();

    if ["s", "x", "z", "ch", "sh"].iter().any(|suffix| lower.ends_with(suffix)) {
        return format!("{}es", word);
    }

    if lower.ends_with('y') {
        // "y" needs a preceding consonant: "city" → "cities", "day" → "days"
        let mut chars = lower.chars().rev();
        chars.next();
        if let Some(prev) = chars.next() {
            if !VOWELS.contains(&prev) {
                return format!("{}ies", &word[..word.len() - 1]);
            }
        }
    }

    format!("{}s", word)
}

// ============================================================================
// Keyword Source
// ============================================================================

/// Parse keyword source text: one phrase per line, trimmed, blank lines dropped.
pub fn parse_keyword_source(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Load and expand the keyword file. An empty source is a configuration error:
/// no run can produce matches without keywords.
pub fn load_keywords(path: &Path) -> Result<KeywordSet> {
    let text = std::fs::read_to_string(path).map_err(|e| ScanError::io(path, e))?;
    let phrases = parse_keyword_source(&text);
    if phrases.is_empty() {
        return Err(ScanError::configuration(format!(
            "keyword source '{}' contains no keywords",
            path.display()
        )));
    }
    Ok(KeywordSet::from_phrases(&phrases))
}

// ============================================================================
// KeywordSet
// ============================================================================

/// One configured phrase and its plural form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeywordEntry {
    pub phrase: String,
    pub plural: String,
}

/// Expanded keywords: every phrase followed by its plural, deduplicated
/// case-insensitively (first spelling wins).
#[derive(Clone, Debug, Default)]
pub struct KeywordSet {
    entries: Vec<KeywordEntry>,
    variants: Vec<String>,
}

impl KeywordSet {
    pub fn from_phrases<S: AsRef<str>>(phrases: &[S]) -> Self {
        let mut seen: FxHashSet<String> = FxHashSet::default();
        let mut entries = Vec::with_capacity(phrases.len());
        let mut variants = Vec::with_capacity(phrases.len() * 2);

        for phrase in phrases {
            let phrase = phrase.as_ref().trim();
            if phrase.is_empty() {
                continue;
            }
            let plural = pluralize(phrase);
            for variant in [phrase, plural.as_str()] {
                if seen.insert(variant.to_lowercase()) {
                    variants.push(variant.to_string());
                }
            }
            entries.push(KeywordEntry {
                phrase: phrase.to_string(),
                plural,
            });
        }

        Self { entries, variants }
    }

    pub fn entries(&self) -> &[KeywordEntry] {
        &self.entries
    }

    /// Distinct variants in configuration order, original casing.
    pub fn variants(&self) -> &[String] {
        &self.variants
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }
}

// ============================================================================
// MatchPattern
// ============================================================================

/// Single case-insensitive whole-word alternation over all keyword variants.
///
/// Matching runs against the lower-cased line, so returned keywords are the
/// lower-cased variant text. An empty keyword set compiles to a pattern that
/// never matches.
#[derive(Clone, Debug, Default)]
pub struct MatchPattern {
    regex: Option<Regex>,
}

impl MatchPattern {
    pub fn compile(keywords: &KeywordSet) -> Result<Self> {
        if keywords.is_empty() {
            return Ok(Self::default());
        }

        let alternatives: Vec<String> = keywords
            .variants()
            .iter()
            .map(|variant| regex::escape(&variant.to_lowercase()))
            .collect();
        let source = format!(r"\b({})\b", alternatives.join("|"));

        let regex = Regex::new(&source).map_err(|e| {
            ScanError::configuration(format!("failed to compile keyword pattern: {}", e))
        })?;
        Ok(Self { regex: Some(regex) })
    }

    pub fn is_empty(&self) -> bool {
        self.regex.is_none()
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_ref().map_or("", Regex::as_str)
    }

    /// Keyword variants found in an already lower-cased line, left to right.
    pub(crate) fn find_in_lowered<'a>(&self, lowered: &'a str) -> Vec<&'a str> {
        match &self.regex {
            Some(regex) => regex.find_iter(lowered).map(|m| m.as_str()).collect(),
            None => Vec::new(),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
