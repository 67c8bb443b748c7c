/// Wire types for the official FIRST Tech Challenge events API.
/// Endpoint: https://ftc-api.firstinspires.org/v2.0/{season}/...
use serde::Deserialize;

#[derive(Deserialize, Default, Debug)]
#[serde(rename_all = "camelCase")]
pub struct FirstEventsResponse {
    #[serde(default)]
    pub events: Vec<FirstEvent>,
}

#[derive(Deserialize, Default, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct FirstEvent {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub date_start: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub venue: String,
    #[serde(default)]
    pub country: String,
}

#[derive(Deserialize, Default, Debug)]
pub struct FirstRankingsResponse {
    /// The API capitalizes this key.
    #[serde(rename = "Rankings", alias = "rankings", default)]
    pub rankings: Vec<FirstRanking>,
}

#[derive(Deserialize, Default, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct FirstRanking {
    pub team_number: u32,
    #[serde(default)]
    pub team_name: String,
    #[serde(default)]
    pub rank: u32,
    /// Ranking points; first sort criterion of the season.
    #[serde(default)]
    pub sort_order1: f64,
}
