//! Static sample records served whenever live FTC data is unavailable.

use crate::{Event, EventStatus, Team, TeamDetail};
use chrono::{Local, NaiveDate};
use log::error;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::LazyLock;

const FALLBACK_JSON: &str = include_str!("../data/fallback.json");

#[derive(Debug, Default, Deserialize)]
pub struct FallbackStore {
    events: Vec<Event>,
    teams: Vec<Team>,
    team_details: HashMap<String, TeamDetail>,
}

static STORE: LazyLock<FallbackStore> = LazyLock::new(|| {
    serde_json::from_str(FALLBACK_JSON).unwrap_or_else(|e| {
        error!("invalid embedded fallback json: {e}");
        FallbackStore::default()
    })
});

impl FallbackStore {
    pub fn get() -> &'static FallbackStore {
        &STORE
    }

    pub fn events(&self) -> Vec<Event> {
        self.events_as_of(Local::now().date_naive())
    }

    /// Sample events with their status derived from the start date.
    pub fn events_as_of(&self, today: NaiveDate) -> Vec<Event> {
        self.events
            .iter()
            .map(|e| Event { status: EventStatus::from_start_date(&e.start_date, today), ..e.clone() })
            .collect()
    }

    pub fn teams(&self) -> Vec<Team> {
        self.teams.clone()
    }

    /// Unknown keys get an empty detail rather than `None` so callers always
    /// have something to render.
    pub fn team_detail(&self, team_key: &str) -> TeamDetail {
        self.team_details.get(team_key).cloned().unwrap_or_default()
    }

    pub fn has_team(&self, team_key: &str) -> bool {
        self.team_details.contains_key(team_key)
    }
}
