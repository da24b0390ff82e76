//! LiveSoccerTV page fetcher — the external document producer.
//!
//! Competition page URL shape:
//! https://www.livesoccertv.com/competitions/<country>/<league>/
//!
//! The core pipeline never sees this crate; it only receives the raw HTML
//! this client hands back. The site sits behind an anti-bot challenge, so
//! responses are probed for challenge markers and callers treat a challenge
//! page like an empty document instead of retrying into a block.

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tokio::time::sleep;
use tracing::debug;

/// Source label recorded in scrape history and audit events.
pub const SOURCE_NAME: &str = "livesoccertv";

/// Competition slug → canonical competition name.
pub const LEAGUES: &[(&str, &str)] = &[
    ("england/premier-league", "Premier League"),
    ("italy/serie-a", "Serie A"),
    ("france/ligue-1", "Ligue 1"),
    ("spain/primera-division", "La Liga"),
    ("germany/bundesliga", "Bundesliga"),
    ("international/uefa-champions-league", "UEFA Champions League"),
];

pub fn competition_url(slug: &str) -> String {
    format!("https://www.livesoccertv.com/competitions/{}/", slug.trim_matches('/'))
}

/// Challenge interstitials come back with 200s; spot them by content.
pub fn looks_like_challenge_page(html: &str) -> bool {
    let lower = html.to_lowercase();
    lower.contains("just a moment")
        || lower.contains("checking your browser")
        || lower.contains("cf-challenge")
        || lower.contains("captcha")
}

/// Paced fetch client with user-agent rotation.
pub struct LstvClient {
    client: reqwest::Client,
    user_agents: Vec<String>,
    current_ua_index: usize,
    last_request: Instant,
    min_request_interval: Duration,
}

impl LstvClient {
    pub fn new(min_request_interval: Duration) -> Self {
        let user_agents = vec![
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
            "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36".to_string(),
            "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/118.0.0.0 Safari/537.36".to_string(),
        ];

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert("Accept", "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8".parse().unwrap());
        headers.insert("Accept-Language", "en-US,en;q=0.5".parse().unwrap());
        headers.insert("Connection", "keep-alive".parse().unwrap());
        headers.insert("Upgrade-Insecure-Requests", "1".parse().unwrap());

        Self {
            client: reqwest::Client::builder()
                .default_headers(headers)
                .timeout(Duration::from_secs(15))
                .gzip(true)
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            user_agents,
            current_ua_index: 0,
            last_request: Instant::now() - Duration::from_secs(60),
            min_request_interval,
        }
    }

    /// Fetch one competition page, honoring the pacing interval.
    pub async fn fetch_competition(&mut self, slug: &str) -> Result<String> {
        self.wait_for_rate_limit().await;

        let url = competition_url(slug);
        debug!(%url, "fetching competition page");

        let resp = self
            .client
            .get(&url)
            .header("User-Agent", self.current_user_agent())
            .send()
            .await
            .with_context(|| format!("request failed for {url}"))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(anyhow::anyhow!("HTTP {status} for {url}"));
        }

        let html = resp.text().await.context("read response body")?;
        self.rotate_user_agent();
        Ok(html)
    }

    fn rotate_user_agent(&mut self) {
        self.current_ua_index = (self.current_ua_index + 1) % self.user_agents.len();
    }

    fn current_user_agent(&self) -> &str {
        &self.user_agents[self.current_ua_index]
    }

    async fn wait_for_rate_limit(&mut self) {
        let elapsed = self.last_request.elapsed();
        if elapsed < self.min_request_interval {
            sleep(self.min_request_interval - elapsed).await;
        }
        self.last_request = Instant::now();
    }
}
