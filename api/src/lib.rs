pub mod client;
pub mod fallback;
pub mod first;
pub mod llm;
pub mod nasa;
pub mod outcome;
pub mod scrape;
pub mod toa;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub use outcome::{BackupReason, Outcome, aggregate};

// ---------------------------------------------------------------------------
// Domain types — clean model, independent of TOA / FIRST wire formats
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub event_key: String,
    pub event_name: String,
    /// `YYYY-MM-DD`; empty for scraped rows.
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub venue: String,
    #[serde(default)]
    pub status: EventStatus,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    #[default]
    Scheduled,
    Completed,
    Scraped,
}

impl EventStatus {
    /// Derive the status from an ISO start date relative to `today`.
    /// Unparseable dates are treated as upcoming.
    pub fn from_start_date(start_date: &str, today: NaiveDate) -> Self {
        let date = start_date.get(..10).unwrap_or(start_date);
        match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
            Ok(d) if d < today => EventStatus::Completed,
            _ => EventStatus::Scheduled,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub team_key: String,
    pub team_number: u32,
    pub team_name_short: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub rookie_year: u16,
    #[serde(default)]
    pub rp_total: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamDetail {
    pub awards: Vec<String>,
    pub rankings: Ranking,
}

impl TeamDetail {
    pub fn is_empty(&self) -> bool {
        self.awards.is_empty() && self.rankings == Ranking::default()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ranking {
    pub rp: i64,
    pub rank: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NasaImage {
    pub url: String,
    pub title: String,
}
