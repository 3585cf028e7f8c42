//! Page retrieval.
//!
//! `PageFetcher` is the seam between the scan pipeline and the network. The
//! HTTP implementation enforces a minimum spacing between requests so a long
//! artist run never hammers the site.

use std::num::NonZeroU32;
use std::thread;
use std::time::Duration;

use governor::clock::{Clock, DefaultClock};
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};

use crate::error::{Result, ScanError};
use crate::models::{AlbumPage, ArtistPage, SongPage};
use crate::parse::{parse_album_page, parse_artist_page, parse_song_page};

pub const DEFAULT_BASE_URL: &str = "https://genius.com";
pub const DEFAULT_DELAY: Duration = Duration::from_secs(2);
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);
pub const DEFAULT_USER_AGENT: &str = concat!("lyricscan/", env!("CARGO_PKG_VERSION"));

/// Source of normalized pages for the three URL shapes.
pub trait PageFetcher {
    fn fetch_song(&mut self, url: &str) -> Result<SongPage>;
    fn fetch_album(&mut self, url: &str) -> Result<AlbumPage>;
    fn fetch_artist(&mut self, url: &str) -> Result<ArtistPage>;
}

// ============================================================================
// HTTP Fetcher
// ============================================================================

#[derive(Clone, Debug)]
pub struct FetchConfig {
    /// Site root used to absolutize relative links
    pub base_url: String,
    /// Minimum interval between two requests; zero disables pacing
    pub delay: Duration,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            delay: DEFAULT_DELAY,
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

type DirectLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Blocks until the next request is allowed.
struct Pacer {
    limiter: Option<DirectLimiter>,
    clock: DefaultClock,
}

impl Pacer {
    fn new(delay: Duration) -> Self {
        let limiter = Quota::with_period(delay)
            .map(|quota| RateLimiter::direct(quota.allow_burst(NonZeroU32::MIN)));
        Self {
            limiter,
            clock: DefaultClock::default(),
        }
    }

    fn wait(&self) {
        let Some(limiter) = &self.limiter else {
            return;
        };
        while let Err(not_until) = limiter.check() {
            thread::sleep(not_until.wait_time_from(self.clock.now()));
        }
    }
}

pub struct HttpFetcher {
    client: reqwest::blocking::Client,
    config: FetchConfig,
    pacer: Pacer,
}

impl HttpFetcher {
    pub fn new(config: FetchConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout)
            .build()
            .map_err(|e| ScanError::configuration(format!("failed to build HTTP client: {}", e)))?;
        let pacer = Pacer::new(config.delay);
        Ok(Self {
            client,
            config,
            pacer,
        })
    }

    fn get(&mut self, url: &str) -> Result<String> {
        self.pacer.wait();
        tracing::debug!("GET {}", url);

        let response = self.client.get(url).send().map_err(|source| ScanError::Fetch {
            url: url.to_string(),
            source,
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScanError::Status {
                url: url.to_string(),
                status,
            });
        }

        response.text().map_err(|source| ScanError::Fetch {
            url: url.to_string(),
            source,
        })
    }
}

impl PageFetcher for HttpFetcher {
    fn fetch_song(&mut self, url: &str) -> Result<SongPage> {
        let html = self.get(url)?;
        Ok(parse_song_page(&html))
    }

    fn fetch_album(&mut self, url: &str) -> Result<AlbumPage> {
        let html = self.get(url)?;
        Ok(parse_album_page(&html, &self.config.base_url))
    }

    fn fetch_artist(&mut self, url: &str) -> Result<ArtistPage> {
        let html = self.get(url)?;
        Ok(parse_artist_page(&html, &self.config.base_url))
    }
}

// ============================================================================
// In-memory Fetcher (tests)
// ============================================================================


#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_pacer_disabled_for_zero_delay() {
        let pacer = Pacer::new(Duration::ZERO);
        assert!(pacer.limiter.is_none());
        let start = Instant::now();
        pacer.wait();
        pacer.wait();
        assert!(start.elapsed() < Duration::from_millis(50));
    }

    #[test]
    fn test_pacer_spaces_requests() {
        let pacer = Pacer::new(Duration::from_millis(100));
        let start = Instant::now();
        pacer.wait();
        pacer.wait();
        pacer.wait();
        // First request is immediate, the next two wait one period each
        assert!(start.elapsed() >= Duration::from_millis(180));
    }

    #[test]
    fn test_default_config() {
        let config = FetchConfig::default();
        assert_eq!(config.base_url, "https://genius.com");
        assert_eq!(config.delay, Duration::from_secs(2));
    }
}
