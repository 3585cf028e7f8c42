//! Folds per-song scan results into the requested scope's hierarchy.
//!
//! Fetches run strictly in sequence. A failed song or album inside a batch is
//! logged, counted and left out; only a failure on the page the user asked
//! for ends the run.

use std::time::Instant;

use tracing::{info, warn};

use crate::error::Result;
use crate::fetch::PageFetcher;
use crate::models::{AggregateResult, AlbumResult, RunStats, Scope};
use crate::progress::{page_spinner, SongBatch};
use crate::scan::ScanContext;

pub struct Aggregator<'a, F: PageFetcher> {
    ctx: &'a ScanContext,
    fetcher: &'a mut F,
    stats: RunStats,
}

impl<'a, F: PageFetcher> Aggregator<'a, F> {
    pub fn new(ctx: &'a ScanContext, fetcher: &'a mut F) -> Self {
        Self {
            ctx,
            fetcher,
            stats: RunStats::default(),
        }
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    pub fn into_stats(self) -> RunStats {
        self.stats
    }

    /// Scan the whole scope and return the completed aggregate.
    pub fn run(&mut self, scope: &Scope) -> Result<AggregateResult> {
        let start = Instant::now();
        self.stats.scope = scope.label().to_string();

        let mut aggregate = AggregateResult::new(scope.clone());
        match scope {
            Scope::Song(url) => {
                let album = self.scan_single_song(url)?;
                aggregate.albums.insert(album.title.clone(), album);
            }
            Scope::Album(url) => {
                let album = self.scan_album(url)?;
                if album.has_matches() {
                    self.stats.albums_with_matches += 1;
                }
                aggregate.albums.insert(album.title.clone(), album);
            }
            Scope::Artist(url) => self.scan_artist(url, &mut aggregate)?,
        }

        self.stats.elapsed_seconds = start.elapsed().as_secs_f64();
        Ok(aggregate)
    }

    /// Song scope: the targeted song is kept even without matches.
    fn scan_single_song(&mut self, url: &str) -> Result<AlbumResult> {
        let spinner = page_spinner("song", url);
        let page = self.fetcher.fetch_song(url);
        spinner.finish_and_clear();
        let page = page?;
        self.stats.pages_fetched += 1;

        let doc = self.ctx.scan_song(page);
        self.stats.songs_scanned += 1;
        if doc.has_matches() {
            self.stats.songs_with_matches += 1;
        }

        let mut album = AlbumResult::new(doc.album.clone(), doc.artist.clone());
        album.songs.insert(doc.title.clone(), doc);
        Ok(album)
    }

    /// Album scope: songs attributed to the album page's title and artist;
    /// only songs with at least one match are retained.
    pub fn scan_album(&mut self, url: &str) -> Result<AlbumResult> {
        let spinner = page_spinner("album", url);
        let page = self.fetcher.fetch_album(url);
        spinner.finish_and_clear();
        let page = page?;
        self.stats.pages_fetched += 1;
        self.stats.albums_scanned += 1;

        info!("Found {} song links on '{}'", page.song_urls.len(), page.title);
        for song_url in &page.song_urls {
            info!("  {}", song_url);
        }

        let mut batch = SongBatch::new(&page.title, page.song_urls.len());
        let mut album = AlbumResult::new(page.title, page.artist);

        for song_url in &page.song_urls {
            batch.next_song(song_url);

            match self.fetcher.fetch_song(song_url) {
                Ok(song) => {
                    self.stats.pages_fetched += 1;
                    self.stats.songs_scanned += 1;
                    let doc = self.ctx.scan_song(song);
                    if doc.has_matches() {
                        self.stats.songs_with_matches += 1;
                        album.songs.insert(doc.title.clone(), doc);
                    }
                }
                Err(e) => {
                    self.stats.songs_failed += 1;
                    warn!("Scraping song {} failed: {}", batch.position(), e);
                }
            }

            batch.song_done();
        }

        batch.finish();
        Ok(album)
    }

    /// Artist scope: every linked album, keeping albums with matching songs.
    fn scan_artist(&mut self, url: &str, aggregate: &mut AggregateResult) -> Result<()> {
        let spinner = page_spinner("artist albums", url);
        let page = self.fetcher.fetch_artist(url);
        spinner.finish_and_clear();
        let page = page?;
        self.stats.pages_fetched += 1;

        info!("Found {} album links", page.album_urls.len());
        for album_url in &page.album_urls {
            info!("  {}", album_url);
        }

        for album_url in &page.album_urls {
            match self.scan_album(album_url) {
                Ok(album) if album.has_matches() => {
                    self.stats.albums_with_matches += 1;
                    aggregate.albums.insert(album.title.clone(), album);
                }
                Ok(_) => {}
                Err(e) => {
                    self.stats.albums_failed += 1;
                    warn!("Failed to scrape {}: {}", album_url, e);
                }
            }
        }

        Ok(())
    }
}
