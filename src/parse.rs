//! HTML extraction for lyrics site pages.
//!
//! Missing nodes degrade to sentinel values instead of failing the page, so a
//! layout change costs attribution, not the whole scan.

use once_cell::sync::Lazy;
use rustc_hash::FxHashSet;
use scraper::{ElementRef, Html, Selector};

use crate::models::{AlbumPage, ArtistPage, SongPage, UNKNOWN_ALBUM, UNKNOWN_ARTIST, UNKNOWN_TITLE};

// ============================================================================
// SELECTORS
// ============================================================================

fn selector(css: &str) -> Selector {
    Selector::parse(css).unwrap()
}

static H1: Lazy<Selector> = Lazy::new(|| selector("h1"));
static H2: Lazy<Selector> = Lazy::new(|| selector("h2"));
static LINKS: Lazy<Selector> = Lazy::new(|| selector("a[href]"));
static ARTIST_LINK: Lazy<Selector> = Lazy::new(|| selector(r#"a[href*="/artists/"]"#));
static PRIMARY_ALBUM_LINK: Lazy<Selector> = Lazy::new(|| selector(r##"a[href="#primary-album"]"##));
static LYRICS_CONTAINERS: Lazy<Selector> =
    Lazy::new(|| selector(r#"div[data-lyrics-container="true"]"#));

// ============================================================================
// TEXT HELPERS
// ============================================================================

/// Element text with every text node trimmed and empty nodes dropped.
fn stripped_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

fn first_text(doc: &Html, selector: &Selector, fallback: &str) -> String {
    doc.select(selector)
        .next()
        .map(stripped_text)
        .unwrap_or_else(|| fallback.to_string())
}

/// Make an href absolute against the site root.
pub fn absolutize(href: &str, base_url: &str) -> String {
    if href.starts_with("http") {
        href.to_string()
    } else {
        format!("{}{}", base_url.trim_end_matches('/'), href)
    }
}

/// URL slug the site uses for an artist: "Yo Gotti" → "yo-gotti".
pub fn artist_slug(artist: &str) -> String {
    artist.to_lowercase().replace(' ', "-")
}

fn collect_links<F>(doc: &Html, base_url: &str, keep: F) -> Vec<String>
where
    F: Fn(&str) -> bool,
{
    let mut seen: FxHashSet<String> = FxHashSet::default();
    doc.select(&LINKS)
        .filter_map(|a| a.value().attr("href"))
        .filter(|href| keep(href))
        .map(|href| absolutize(href, base_url))
        .filter(|url| seen.insert(url.clone()))
        .collect()
}

// ============================================================================
// PAGE PARSERS
// ============================================================================

/// Song page: title from the first `h1`, artist from the first `/artists/`
/// link, album from the `#primary-album` link, lyrics from every lyrics
/// container (text nodes joined by newlines).
pub fn parse_song_page(html: &str) -> SongPage {
    let doc = Html::parse_document(html);

    let title = first_text(&doc, &H1, UNKNOWN_TITLE);
    let artist = first_text(&doc, &ARTIST_LINK, UNKNOWN_ARTIST);
    let album = first_text(&doc, &PRIMARY_ALBUM_LINK, UNKNOWN_ALBUM);

    let mut lyrics = String::new();
    for container in doc.select(&LYRICS_CONTAINERS) {
        let texts: Vec<&str> = container.text().collect();
        lyrics.push_str(&texts.join("\n"));
        lyrics.push('\n');
    }

    SongPage {
        title,
        artist,
        album,
        lyrics,
    }
}

/// Album page: title from `h1`, artist from `h2`, song links ending in
/// `-lyrics` that carry the artist's slug.
pub fn parse_album_page(html: &str, base_url: &str) -> AlbumPage {
    let doc = Html::parse_document(html);

    let title = first_text(&doc, &H1, UNKNOWN_ALBUM);
    let artist = first_text(&doc, &H2, UNKNOWN_ARTIST);
    let slug = artist_slug(&artist);

    let song_urls = collect_links(&doc, base_url, |href| {
        href.ends_with("-lyrics") && href.to_lowercase().contains(&slug)
    });

    AlbumPage {
        title,
        artist,
        song_urls,
    }
}

/// Artist albums page: every link into `/albums/`.
pub fn parse_artist_page(html: &str, base_url: &str) -> ArtistPage {
    let doc = Html::parse_document(html);
    let album_urls = collect_links(&doc, base_url, |href| href.contains("/albums/"));
    ArtistPage { album_urls }
}

// ============================================================================
// TESTS
// ============================================================================
