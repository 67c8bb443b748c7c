use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, State},
};
use aztlan_api::client::ApiError;
use aztlan_api::outcome::combined_source;
use aztlan_api::{Event, Outcome, Ranking, Team, aggregate};
use log::{debug, warn};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub struct FtcDataResponse {
    pub status: &'static str,
    pub source: &'static str,
    pub events: Vec<Event>,
    pub teams: Vec<Team>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FtcDataResponse {
    fn merge(events: Outcome<Vec<Event>>, teams: Outcome<Vec<Team>>, live_tag: &'static str) -> Self {
        log_backup("events", &events);
        log_backup("teams", &teams);
        let error = first_error([events.upstream_error(), teams.upstream_error()]);
        Self {
            status: "success",
            source: combined_source(&[events.is_live(), teams.is_live()], live_tag),
            events: events.into_value(),
            teams: teams.into_value(),
            error,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TeamDetailResponse {
    pub status: &'static str,
    pub source: &'static str,
    pub awards: Vec<String>,
    pub rankings: Ranking,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn log_backup<T>(resource: &str, outcome: &Outcome<T>) {
    if let Some(reason) = outcome.reason() {
        warn!("{resource}: serving fallback data ({reason})");
    }
}

fn first_error<const N: usize>(errors: [Option<&str>; N]) -> Option<String> {
    errors.into_iter().flatten().next().map(str::to_owned)
}

/// GET /api/ftc-mexico-data — TOA events and teams for the configured region.
pub async fn ftc_mexico_data(State(state): State<Arc<AppState>>) -> Json<FtcDataResponse> {
    let ftc = &state.ftc;
    let (events, teams) = if ftc.has_toa() {
        let (events, teams) = tokio::join!(ftc.fetch_toa_events(), ftc.fetch_toa_teams());
        (Some(events), Some(teams))
    } else {
        (None, None)
    };

    let events = aggregate(events, || state.fallback.events());
    let teams = aggregate(teams, || state.fallback.teams());
    Json(FtcDataResponse::merge(events, teams, "live"))
}

/// GET /api/ftc-real — official FIRST events API; team RP summed over the
/// season's ranked events.
pub async fn ftc_real(State(state): State<Arc<AppState>>) -> Json<FtcDataResponse> {
    let ftc = &state.ftc;
    let (events, teams) = if ftc.has_first() {
        let events = ftc.fetch_first_events().await;
        let teams = match &events {
            Ok(list) if !list.is_empty() => ftc.fetch_first_teams(list).await,
            Ok(_) => Ok(Vec::new()),
            Err(e) => Err(ApiError::Other(format!("teams skipped, events unavailable: {e}"))),
        };
        (Some(events), Some(teams))
    } else {
        (None, None)
    };

    let events = aggregate(events, || state.fallback.events());
    let teams = aggregate(teams, || state.fallback.teams());
    Json(FtcDataResponse::merge(events, teams, "live"))
}

/// GET /api/ftc-live-scrape — events scraped from the public listing page;
/// teams always come from the sample table, so provenance follows the events.
pub async fn ftc_live_scrape(State(state): State<Arc<AppState>>) -> Json<FtcDataResponse> {
    let scraped = state.scraper.scrape_events(&state.settings.scrape_url).await;
    if let Ok(events) = &scraped {
        debug!("scraped {} events", events.len());
    }
    let events = aggregate(Some(scraped), || state.fallback.events());
    log_backup("scraped events", &events);

    Json(FtcDataResponse {
        status: "success",
        source: events.source("live-scrape"),
        error: events.upstream_error().map(str::to_owned),
        events: events.into_value(),
        teams: state.fallback.teams(),
    })
}

/// GET /api/team-detail/{team_key}
pub async fn team_detail(
    State(state): State<Arc<AppState>>,
    Path(team_key): Path<String>,
) -> Json<TeamDetailResponse> {
    let attempt = if state.ftc.has_toa() {
        Some(state.ftc.fetch_toa_team_detail(&team_key).await)
    } else {
        None
    };
    let detail = aggregate(attempt, || state.fallback.team_detail(&team_key));
    log_backup(&format!("team {team_key}"), &detail);

    let source = detail.source("live");
    let error = detail.upstream_error().map(str::to_owned);
    let detail = detail.into_value();
    Json(TeamDetailResponse {
        status: "success",
        source,
        awards: detail.awards,
        rankings: detail.rankings,
        error,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use aztlan_api::BackupReason;

    #[test]
    fn merge_reports_mixed_and_first_error() {
        let events = Outcome::Live(vec![Event::default()]);
        let teams = Outcome::Backup(vec![Team::default()], BackupReason::Upstream("503".into()));
        let resp = FtcDataResponse::merge(events, teams, "live");
        assert_eq!(resp.source, "mixed");
        assert_eq!(resp.error.as_deref(), Some("503"));
    }

    #[test]
    fn offline_merge_has_no_error() {
        let events = Outcome::Backup(vec![Event::default()], BackupReason::Offline);
        let teams = Outcome::Backup(vec![Team::default()], BackupReason::Offline);
        let resp = FtcDataResponse::merge(events, teams, "live");
        assert_eq!(resp.source, "mock");
        assert!(resp.error.is_none());
    }
}
