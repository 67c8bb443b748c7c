use crate::first::{FirstEvent, FirstEventsResponse, FirstRanking, FirstRankingsResponse};
use crate::toa::{ToaAward, ToaEvent, ToaRanking, ToaTeam};
use crate::{Event, EventStatus, Ranking, Team, TeamDetail};
use chrono::{Local, NaiveDate};
use futures_util::future::join_all;
use log::debug;
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

pub type ApiResult<T> = Result<T, ApiError>;

pub const TOA_BASE_URL: &str = "https://theorangealliance.org/api";
pub const FIRST_BASE_URL: &str = "https://ftc-api.firstinspires.org/v2.0";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(8);
/// Rankings are fetched per event; cap the fan-out of a single request.
const MAX_RANKED_EVENTS: usize = 6;

#[derive(Debug)]
pub enum ApiError {
    Network(reqwest::Error, String),
    Api(reqwest::Error, String),
    Parsing(reqwest::Error, String),
    NotFound(String),
    Unauthorized(String),
    Other(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Network(e, url) => write!(f, "Network error for {url}: {e}"),
            ApiError::Api(e, url) => write!(f, "API error for {url}: {e}"),
            ApiError::Parsing(e, url) => write!(f, "Parse error for {url}: {e}"),
            ApiError::NotFound(msg) => write!(f, "Not found: {msg}"),
            ApiError::Unauthorized(msg) => write!(f, "Missing credentials: {msg}"),
            ApiError::Other(msg) => write!(f, "Error: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

/// Build a reqwest client with a fixed user agent, falling back to the
/// default client if the builder fails.
pub(crate) fn http_client(user_agent: &str) -> Client {
    Client::builder()
        .user_agent(user_agent)
        .build()
        .unwrap_or_default()
}

pub(crate) fn url_with_params(base: &str, params: &[(&str, &str)]) -> ApiResult<Url> {
    Url::parse_with_params(base, params).map_err(|e| ApiError::Other(format!("bad url {base}: {e}")))
}

/// Send a prepared request once and decode a JSON body. Any non-2xx status is
/// an error; there is no retry.
pub(crate) async fn send_json<T: DeserializeOwned>(request: RequestBuilder, url: &str) -> ApiResult<T> {
    let response = request
        .send()
        .await
        .map_err(|e| ApiError::Network(e, url.to_owned()))?;

    match response.error_for_status() {
        Ok(res) => res
            .json::<T>()
            .await
            .map_err(|e| ApiError::Parsing(e, url.to_owned())),
        Err(e) => Err(ApiError::Api(e, url.to_owned())),
    }
}

#[derive(Debug, Clone)]
pub struct ToaConfig {
    pub base_url: String,
    pub api_key: String,
    pub region: String,
    pub season: String,
}

#[derive(Debug, Clone)]
pub struct FirstConfig {
    pub base_url: String,
    pub username: String,
    pub token: String,
    pub season: String,
    pub country: String,
}

/// FTC data client for The Orange Alliance and the official FIRST events API.
/// Either upstream may be left unconfigured.
#[derive(Debug, Clone)]
pub struct FtcApi {
    client: Client,
    timeout: Duration,
    toa: Option<ToaConfig>,
    first: Option<FirstConfig>,
}

impl Default for FtcApi {
    fn default() -> Self {
        Self {
            client: http_client("aztlan/0.2 (ftc mexico dashboard)"),
            timeout: DEFAULT_TIMEOUT,
            toa: None,
            first: None,
        }
    }
}

impl FtcApi {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout, ..Self::default() }
    }

    pub fn with_toa(mut self, toa: ToaConfig) -> Self {
        self.toa = Some(toa);
        self
    }

    pub fn with_first(mut self, first: FirstConfig) -> Self {
        self.first = Some(first);
        self
    }

    pub fn has_toa(&self) -> bool {
        self.toa.is_some()
    }

    pub fn has_first(&self) -> bool {
        self.first.is_some()
    }

    // -----------------------------------------------------------------------
    // The Orange Alliance
    // -----------------------------------------------------------------------

    pub async fn fetch_toa_events(&self) -> ApiResult<Vec<Event>> {
        let toa = self.toa()?;
        let url = url_with_params(
            &format!("{}/events", toa.base_url),
            &[("region_key", toa.region.as_str()), ("season_key", toa.season.as_str())],
        )?;
        let raw: Vec<ToaEvent> = self.toa_get(toa, url).await?;
        let today = Local::now().date_naive();
        Ok(raw.into_iter().map(|e| map_toa_event(e, today)).collect())
    }

    pub async fn fetch_toa_teams(&self) -> ApiResult<Vec<Team>> {
        let toa = self.toa()?;
        let url = url_with_params(&format!("{}/teams", toa.base_url), &[("region_key", toa.region.as_str())])?;
        let raw: Vec<ToaTeam> = self.toa_get(toa, url).await?;
        Ok(raw.into_iter().filter_map(map_toa_team).collect())
    }

    /// Awards and season rankings for one team. Both calls must succeed.
    pub async fn fetch_toa_team_detail(&self, team_key: &str) -> ApiResult<TeamDetail> {
        let toa = self.toa()?;
        let awards_url = segment_url(&toa.base_url, &["team", team_key, "awards"])?;
        let rankings_url = segment_url(&toa.base_url, &["team", team_key, "rankings", toa.season.as_str()])?;

        let awards: Vec<ToaAward> = self.toa_get(toa, awards_url).await?;
        let rankings: Vec<ToaRanking> = self.toa_get(toa, rankings_url).await?;
        Ok(map_toa_detail(awards, &rankings))
    }

    fn toa(&self) -> ApiResult<&ToaConfig> {
        self.toa
            .as_ref()
            .ok_or_else(|| ApiError::Unauthorized("TOA api key".into()))
    }

    async fn toa_get<T: DeserializeOwned>(&self, toa: &ToaConfig, url: Url) -> ApiResult<T> {
        debug!("GET {url}");
        let label = url.to_string();
        let request = self
            .client
            .get(url)
            .timeout(self.timeout)
            .header("X-TOA-Key", &toa.api_key)
            .header("Content-Type", "application/json");
        send_json(request, &label).await
    }

    // -----------------------------------------------------------------------
    // FIRST events API
    // -----------------------------------------------------------------------

    /// Season events held in the configured country.
    pub async fn fetch_first_events(&self) -> ApiResult<Vec<Event>> {
        let first = self.first()?;
        let url = segment_url(&first.base_url, &[first.season.as_str(), "events"])?;
        let raw: FirstEventsResponse = self.first_get(first, url).await?;
        let today = Local::now().date_naive();
        Ok(raw
            .events
            .into_iter()
            .filter(|e| e.country.eq_ignore_ascii_case(&first.country))
            .map(|e| map_first_event(e, today))
            .collect())
    }

    /// Teams ranked at the given events, with ranking points summed across
    /// every event of the season. Rankings are fetched concurrently; events
    /// whose rankings fail to load are skipped, and if none load the last
    /// error is returned.
    pub async fn fetch_first_teams(&self, events: &[Event]) -> ApiResult<Vec<Team>> {
        let first = self.first()?;
        let requests = events.iter().take(MAX_RANKED_EVENTS).map(|event| async move {
            let url = segment_url(&first.base_url, &[first.season.as_str(), "rankings", event.event_key.as_str()])?;
            self.first_get::<FirstRankingsResponse>(first, url)
                .await
                .inspect_err(|e| debug!("rankings for {} unavailable: {e}", event.event_key))
        });

        let mut per_event: Vec<Vec<FirstRanking>> = Vec::new();
        let mut last_error: Option<ApiError> = None;
        for result in join_all(requests).await {
            match result {
                Ok(raw) => per_event.push(raw.rankings),
                Err(e) => last_error = Some(e),
            }
        }

        if per_event.is_empty() {
            if let Some(e) = last_error {
                return Err(e);
            }
        }
        Ok(sum_ranking_points(per_event))
    }

    fn first(&self) -> ApiResult<&FirstConfig> {
        self.first
            .as_ref()
            .ok_or_else(|| ApiError::Unauthorized("FIRST events username/token".into()))
    }

    async fn first_get<T: DeserializeOwned>(&self, first: &FirstConfig, url: Url) -> ApiResult<T> {
        debug!("GET {url}");
        let label = url.to_string();
        let request = self
            .client
            .get(url)
            .timeout(self.timeout)
            .basic_auth(&first.username, Some(&first.token));
        send_json(request, &label).await
    }
}

/// Append path segments to a base URL. Each segment is percent-encoded, so
/// caller-supplied keys cannot step outside the base path.
fn segment_url(base: &str, segments: &[&str]) -> ApiResult<Url> {
    let mut url = Url::parse(base).map_err(|e| ApiError::Other(format!("bad url {base}: {e}")))?;
    url.path_segments_mut()
        .map_err(|_| ApiError::Other(format!("bad url {base}: cannot be a base")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

fn join_city_state(city: Option<String>, state: Option<String>) -> String {
    match (city, state) {
        (Some(city), Some(state)) if !state.is_empty() => format!("{city}, {state}"),
        (Some(city), _) => city,
        (None, state) => state.unwrap_or_default(),
    }
}

// ---------------------------------------------------------------------------
// Mapping: TOA wire types → clean domain types
// ---------------------------------------------------------------------------

fn map_toa_event(e: ToaEvent, today: NaiveDate) -> Event {
    let start_date = e
        .start_date
        .map(|d| d.chars().take(10).collect::<String>())
        .unwrap_or_default();
    let city = join_city_state(e.city, e.state_prov);
    Event {
        event_key: e.event_key.unwrap_or_default(),
        event_name: e.event_name.unwrap_or_default(),
        status: EventStatus::from_start_date(&start_date, today),
        start_date,
        city,
        venue: e.venue.unwrap_or_default(),
    }
}

/// Teams without a number are dropped; everything else is optional.
fn map_toa_team(t: ToaTeam) -> Option<Team> {
    let team_number = t
        .team_number
        .or_else(|| t.team_key.as_deref().and_then(|k| k.parse().ok()))?;
    Some(Team {
        team_key: t.team_key.unwrap_or_else(|| team_number.to_string()),
        team_number,
        team_name_short: t.team_name_short.unwrap_or_default(),
        city: join_city_state(t.city, t.state_prov),
        rookie_year: t.rookie_year.unwrap_or_default(),
        // TOA's team list carries no ranking points.
        rp_total: 0,
    })
}

fn map_toa_detail(awards: Vec<ToaAward>, rankings: &[ToaRanking]) -> TeamDetail {
    let awards = awards
        .into_iter()
        .filter_map(|a| a.award_name.or(a.award_key))
        .filter(|name| !name.is_empty())
        .collect();
    let rp = rankings
        .iter()
        .filter_map(|r| r.ranking_points)
        .sum::<f64>()
        .round() as i64;
    let rank = rankings
        .iter()
        .filter_map(|r| r.rank)
        .filter(|r| *r > 0)
        .min()
        .unwrap_or(0);
    TeamDetail { awards, rankings: Ranking { rp, rank } }
}

// ---------------------------------------------------------------------------
// Mapping: FIRST wire types → clean domain types
// ---------------------------------------------------------------------------

fn map_first_event(e: FirstEvent, today: NaiveDate) -> Event {
    let start_date: String = e.date_start.chars().take(10).collect();
    Event {
        event_key: e.code,
        event_name: e.name,
        status: EventStatus::from_start_date(&start_date, today),
        start_date,
        city: e.city,
        venue: e.venue,
    }
}

/// Sum per-event ranking points per team, highest total first.
fn sum_ranking_points(per_event: Vec<Vec<FirstRanking>>) -> Vec<Team> {
    let mut totals: HashMap<u32, (String, f64)> = HashMap::new();
    for ranking in per_event.into_iter().flatten() {
        let entry = totals.entry(ranking.team_number).or_default();
        if entry.0.is_empty() {
            entry.0 = ranking.team_name;
        }
        entry.1 += ranking.sort_order1;
    }

    let mut teams: Vec<Team> = totals
        .into_iter()
        .map(|(team_number, (name, rp))| Team {
            team_key: team_number.to_string(),
            team_number,
            team_name_short: name,
            city: String::new(),
            rookie_year: 0,
            rp_total: rp.round() as i64,
        })
        .collect();
    teams.sort_by(|a, b| {
        b.rp_total
            .cmp(&a.rp_total)
            .then_with(|| a.team_number.cmp(&b.team_number))
    });
    teams
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 2, 1).unwrap()
    }

    fn toa_api(base: &str) -> FtcApi {
        FtcApi::new(Duration::from_secs(2)).with_toa(ToaConfig {
            base_url: base.to_owned(),
            api_key: "test-key".into(),
            region: "MX".into(),
            season: "2425".into(),
        })
    }

    fn first_api(base: &str) -> FtcApi {
        FtcApi::new(Duration::from_secs(2)).with_first(FirstConfig {
            base_url: base.to_owned(),
            username: "user".into(),
            token: "token".into(),
            season: "2024".into(),
            country: "Mexico".into(),
        })
    }

    #[test]
    fn toa_event_mapping_joins_city_and_state() {
        let event = map_toa_event(
            ToaEvent {
                event_key: Some("2425-MX-CDMX".into()),
                event_name: Some("CDMX Qualifier".into()),
                start_date: Some("2025-01-15T00:00:00.000Z".into()),
                city: Some("Ciudad de México".into()),
                state_prov: Some("CDMX".into()),
                venue: None,
            },
            today(),
        );
        assert_eq!(event.start_date, "2025-01-15");
        assert_eq!(event.city, "Ciudad de México, CDMX");
        assert_eq!(event.status, EventStatus::Completed);
    }

    #[test]
    fn toa_team_without_number_falls_back_to_key() {
        let team = map_toa_team(ToaTeam { team_key: Some("28254".into()), ..Default::default() }).unwrap();
        assert_eq!(team.team_number, 28254);
        assert!(map_toa_team(ToaTeam::default()).is_none());
    }

    #[test]
    fn toa_detail_sums_points_and_keeps_best_rank() {
        let detail = map_toa_detail(
            vec![ToaAward { award_name: Some("Think Award".into()), award_key: None }],
            &[
                ToaRanking { event_key: None, rank: Some(7), ranking_points: Some(40.0) },
                ToaRanking { event_key: None, rank: Some(2), ranking_points: Some(55.5) },
                ToaRanking { event_key: None, rank: Some(0), ranking_points: None },
            ],
        );
        assert_eq!(detail.awards, vec!["Think Award"]);
        assert_eq!(detail.rankings, Ranking { rp: 96, rank: 2 });
    }

    #[test]
    fn ranking_points_are_summed_across_events() {
        let ranking = |n: u32, rp: f64| FirstRanking {
            team_number: n,
            team_name: format!("Team {n}"),
            rank: 1,
            sort_order1: rp,
        };
        let teams = sum_ranking_points(vec![
            vec![ranking(28254, 60.0), ranking(11111, 80.0)],
            vec![ranking(28254, 85.0)],
        ]);
        assert_eq!(teams.len(), 2);
        assert_eq!(teams[0].team_number, 28254);
        assert_eq!(teams[0].rp_total, 145);
        assert_eq!(teams[1].rp_total, 80);
    }

    #[tokio::test]
    async fn unconfigured_upstream_is_unauthorized() {
        let api = FtcApi::default();
        assert!(matches!(api.fetch_toa_events().await, Err(ApiError::Unauthorized(_))));
        assert!(matches!(api.fetch_first_events().await, Err(ApiError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn toa_events_sends_key_and_query() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/events")
            .match_header("x-toa-key", "test-key")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("region_key".into(), "MX".into()),
                Matcher::UrlEncoded("season_key".into(), "2425".into()),
            ]))
            .with_status(200)
            .with_body(r#"[{"event_key":"2425-MX-A","event_name":"Mexico Regional","start_date":"2030-01-01"}]"#)
            .create_async()
            .await;

        let events = toa_api(&server.url()).fetch_toa_events().await.unwrap();
        mock.assert_async().await;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_name, "Mexico Regional");
        assert_eq!(events[0].status, EventStatus::Scheduled);
    }

    #[tokio::test]
    async fn toa_server_error_is_api_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/teams")
            .match_query(Matcher::Any)
            .with_status(503)
            .create_async()
            .await;

        let result = toa_api(&server.url()).fetch_toa_teams().await;
        assert!(matches!(result, Err(ApiError::Api(_, _))));
    }

    #[tokio::test]
    async fn toa_client_error_is_not_swallowed() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/team/28254/awards")
            .with_status(401)
            .create_async()
            .await;

        let result = toa_api(&server.url()).fetch_toa_team_detail("28254").await;
        assert!(matches!(result, Err(ApiError::Api(_, _))));
    }

    #[tokio::test]
    async fn toa_garbage_body_is_parse_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/teams")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("<html>maintenance</html>")
            .create_async()
            .await;

        let result = toa_api(&server.url()).fetch_toa_teams().await;
        assert!(matches!(result, Err(ApiError::Parsing(_, _))));
    }

    #[tokio::test]
    async fn first_events_filter_by_country() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/2024/events")
            .match_header("authorization", Matcher::Regex("^Basic ".into()))
            .with_status(200)
            .with_body(
                r#"{"events":[
                    {"code":"MXCMQ","name":"Mexico City Qualifier","dateStart":"2025-01-18T00:00:00","city":"CDMX","venue":"Expo","country":"Mexico"},
                    {"code":"USTXQ","name":"Texas Qualifier","dateStart":"2025-01-18T00:00:00","city":"Austin","venue":"Hall","country":"USA"}
                ]}"#,
            )
            .create_async()
            .await;

        let events = first_api(&server.url()).fetch_first_events().await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_key, "MXCMQ");
        assert_eq!(events[0].start_date, "2025-01-18");
    }

    #[tokio::test]
    async fn first_teams_skip_failed_events() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/2024/rankings/MXA")
            .with_status(200)
            .with_body(r#"{"Rankings":[{"teamNumber":28254,"teamName":"Tech Saurus","rank":1,"sortOrder1":12.0}]}"#)
            .create_async()
            .await;
        server
            .mock("GET", "/2024/rankings/MXB")
            .with_status(500)
            .create_async()
            .await;

        let events = vec![
            Event { event_key: "MXA".into(), ..Default::default() },
            Event { event_key: "MXB".into(), ..Default::default() },
        ];
        let teams = first_api(&server.url()).fetch_first_teams(&events).await.unwrap();
        assert_eq!(teams.len(), 1);
        assert_eq!(teams[0].team_name_short, "Tech Saurus");
        assert_eq!(teams[0].rp_total, 12);
    }

    #[tokio::test]
    async fn first_teams_all_failed_is_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/2024/rankings/MXB")
            .with_status(500)
            .create_async()
            .await;

        let events = vec![Event { event_key: "MXB".into(), ..Default::default() }];
        assert!(first_api(&server.url()).fetch_first_teams(&events).await.is_err());
    }

    #[test]
    fn path_segments_are_escaped() {
        let url = segment_url("https://theorangealliance.org/api", &["team", "../x", "awards"]).unwrap();
        assert_eq!(url.path(), "/api/team/..%2Fx/awards");
        let url = segment_url("http://127.0.0.1:1234", &["2024", "events"]).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:1234/2024/events");
    }

    #[tokio::test]
    async fn toa_teams_join_city_and_state() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/teams")
            .match_query(Matcher::UrlEncoded("region_key".into(), "MX".into()))
            .with_status(200)
            .with_body(
                r#"[{"team_key":"28254","team_number":28254,"team_name_short":"Tech Saurus","city":"Ciudad de México","state_prov":"CDMX","rookie_year":2023},
                    {"team_key":"11111","team_number":11111,"team_name_short":"Robo Warriors","city":"Guadalajara"}]"#,
            )
            .create_async()
            .await;

        let teams = toa_api(&server.url()).fetch_toa_teams().await.unwrap();
        assert_eq!(teams.len(), 2);
        assert_eq!(teams[0].city, "Ciudad de México, CDMX");
        assert_eq!(teams[0].rookie_year, 2023);
        assert_eq!(teams[1].city, "Guadalajara");
    }

    #[tokio::test]
    async fn toa_team_detail_maps_awards_and_rankings() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/team/28254/awards")
            .match_header("x-toa-key", "test-key")
            .with_status(200)
            .with_body(r#"[{"award_name":"Inspire Award"},{"award_key":"THINK"},{"award_name":""}]"#)
            .create_async()
            .await;
        server
            .mock("GET", "/team/28254/rankings/2425")
            .with_status(200)
            .with_body(r#"[{"event_key":"A","rank":4,"ranking_points":60.0},{"event_key":"B","rank":2,"ranking_points":85.0}]"#)
            .create_async()
            .await;

        let detail = toa_api(&server.url()).fetch_toa_team_detail("28254").await.unwrap();
        assert_eq!(detail.awards, vec!["Inspire Award", "THINK"]);
        assert_eq!(detail.rankings, Ranking { rp: 145, rank: 2 });
    }

    #[tokio::test]
    async fn first_teams_sum_every_loaded_event() {
        let mut server = mockito::Server::new_async().await;
        for (code, rp) in [("MXA", 60.0), ("MXB", 85.0)] {
            server
                .mock("GET", format!("/2024/rankings/{code}").as_str())
                .with_status(200)
                .with_body(format!(
                    r#"{{"Rankings":[{{"teamNumber":28254,"teamName":"Tech Saurus","rank":1,"sortOrder1":{rp}}}]}}"#
                ))
                .create_async()
                .await;
        }

        let events = vec![
            Event { event_key: "MXA".into(), ..Default::default() },
            Event { event_key: "MXB".into(), ..Default::default() },
        ];
        let teams = first_api(&server.url()).fetch_first_teams(&events).await.unwrap();
        assert_eq!(teams.len(), 1);
        assert_eq!(teams[0].rp_total, 145);
    }
}
