/// The Orange Alliance raw wire types — serde shapes for deserializing TOA responses.
/// These map to our clean domain types via the mapping functions in client.rs.
use serde::Deserialize;

// ---------------------------------------------------------------------------
// Events  (/events?region_key=..&season_key=..)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone)]
pub struct ToaEvent {
    pub event_key: Option<String>,
    pub event_name: Option<String>,
    pub start_date: Option<String>, // ISO 8601
    pub city: Option<String>,
    pub state_prov: Option<String>,
    pub venue: Option<String>,
}

// ---------------------------------------------------------------------------
// Teams  (/teams?region_key=..)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone)]
pub struct ToaTeam {
    pub team_key: Option<String>,
    pub team_number: Option<u32>,
    pub team_name_short: Option<String>,
    pub city: Option<String>,
    pub state_prov: Option<String>,
    pub rookie_year: Option<u16>,
}

// ---------------------------------------------------------------------------
// Team detail  (/team/{key}/awards, /team/{key}/rankings/{season})
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone)]
pub struct ToaAward {
    pub award_name: Option<String>,
    pub award_key: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct ToaRanking {
    pub event_key: Option<String>,
    pub rank: Option<u32>,
    /// TOA sends fractional values for some seasons.
    pub ranking_points: Option<f64>,
}
