//! Best-effort event extraction from an HTML listing page.
//!
//! There is no schema here: anchors and table cells whose text mentions one of
//! [`EVENT_MARKERS`] are taken as event names. If the page markup changes the
//! result is simply empty and callers fall back to sample data.

use crate::client::{ApiError, ApiResult, DEFAULT_TIMEOUT};
use crate::{Event, EventStatus};
use log::debug;
use reqwest::Client;
use scraper::{Html, Selector};
use std::collections::HashSet;
use std::time::Duration;

pub const SCRAPE_URL: &str = "https://ftc-events.firstinspires.org/2024/events/region/MX";
pub const EVENT_MARKERS: [&str; 4] = ["qualifier", "regional", "mexico", "méxico"];

const BROWSER_UA: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
/// Longer strings are paragraphs, not event names.
const MAX_NAME_LEN: usize = 120;

#[derive(Debug, Clone)]
pub struct EventScraper {
    client: Client,
    timeout: Duration,
}

impl Default for EventScraper {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

impl EventScraper {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .user_agent(BROWSER_UA)
                .build()
                .unwrap_or_default(),
            timeout,
        }
    }

    pub async fn scrape_events(&self, url: &str) -> ApiResult<Vec<Event>> {
        debug!("scraping {url}");
        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ApiError::Network(e, url.to_owned()))?
            .error_for_status()
            .map_err(|e| ApiError::Api(e, url.to_owned()))?;
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Parsing(e, url.to_owned()))?;
        extract_events(&body)
    }
}

/// Pull event-looking names out of a document, de-duplicated by name in
/// document order.
pub fn extract_events(html: &str) -> ApiResult<Vec<Event>> {
    let selector =
        Selector::parse("a, td").map_err(|e| ApiError::Other(format!("bad selector: {e}")))?;
    let anchor = Selector::parse("a").map_err(|e| ApiError::Other(format!("bad selector: {e}")))?;
    let document = Html::parse_document(html);

    let mut seen: HashSet<String> = HashSet::new();
    let mut events = Vec::new();
    for element in document.select(&selector) {
        // Cells wrapping a link are handled through the link itself.
        if element.value().name() == "td" && element.select(&anchor).next().is_some() {
            continue;
        }
        let name = normalize_ws(&element.text().collect::<String>());
        if name.is_empty() || name.chars().count() > MAX_NAME_LEN || !is_event_name(&name) {
            continue;
        }
        if !seen.insert(name.to_lowercase()) {
            continue;
        }
        let event_key = element
            .value()
            .attr("href")
            .and_then(|href| href.trim_end_matches('/').rsplit('/').next())
            .filter(|slug| !slug.is_empty())
            .map(str::to_owned)
            .unwrap_or_else(|| slugify(&name));
        events.push(Event {
            event_key,
            event_name: name,
            status: EventStatus::Scraped,
            ..Default::default()
        });
    }
    Ok(events)
}

fn is_event_name(text: &str) -> bool {
    let lower = text.to_lowercase();
    EVENT_MARKERS.iter().any(|m| lower.contains(m))
}

fn normalize_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn slugify(name: &str) -> String {
    name.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}
