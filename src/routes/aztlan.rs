use crate::chatbot::{Lang, Mode, Persona, Responder};
use crate::error::AppError;
use crate::predictor::{self, PlanetCandidate, Prediction};
use crate::state::AppState;
use axum::{Json, extract::State, extract::rejection::JsonRejection};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Default, Deserialize)]
pub struct ChatRequest {
    #[serde(default, alias = "user_query")]
    pub question: String,
    pub mode: Option<String>,
    pub lang: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub status: &'static str,
    pub response: String,
    pub mode: &'static str,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct DeepReport {
    pub report: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct GameAnalysisRequest {
    #[serde(default, alias = "match")]
    pub match_name: Option<String>,
    pub red_score: Option<i64>,
    pub blue_score: Option<i64>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GameAnalysis {
    pub comment: String,
}

fn responder(state: &AppState) -> Responder<'_> {
    Responder {
        llm: state.llm.as_ref(),
        knowledge_base: state.knowledge_base.as_deref(),
        debug_errors: state.settings.debug_errors,
    }
}

/// POST /api/nasa-rag
pub async fn nasa_rag(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, AppError> {
    let Json(req) = payload?;
    let mode = Mode::parse(req.mode.as_deref());
    let lang = Lang::parse(req.lang.as_deref());

    let (response, answered_by) = responder(&state).answer(&req.question, mode, lang).await;
    Ok(Json(ChatResponse {
        status: "success",
        response,
        mode: answered_by.as_str(),
        timestamp: Local::now().to_rfc3339(),
    }))
}

/// POST /api/aztlan-predict
pub async fn aztlan_predict(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PlanetCandidate>, JsonRejection>,
) -> Result<Json<Prediction>, AppError> {
    let Json(candidate) = payload?;
    let mut prediction = predictor::predict(&candidate, &mut rand::thread_rng());

    let prompt = predictor::analysis_prompt(&candidate, &prediction);
    if let Some(text) = responder(&state).generate(Persona::Aztlan, Lang::Es, &prompt).await {
        prediction.analisis_tecnico = text;
    }
    Ok(Json(prediction))
}

/// POST /api/aztlan-deep
pub async fn aztlan_deep(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PlanetCandidate>, JsonRejection>,
) -> Result<Json<DeepReport>, AppError> {
    let Json(candidate) = payload?;
    let prompt = predictor::deep_report_prompt(&candidate);
    let report = match responder(&state).generate(Persona::Aztlan, Lang::Es, &prompt).await {
        Some(text) => text,
        None => predictor::deep_report(&candidate),
    };
    Ok(Json(DeepReport { report }))
}

/// POST /api/game-analysis
pub async fn game_analysis(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<GameAnalysisRequest>, JsonRejection>,
) -> Result<Json<GameAnalysis>, AppError> {
    let Json(req) = payload?;
    let prompt = analysis_prompt(&req);
    let comment = match responder(&state).generate(Persona::Analyst, Lang::Es, &prompt).await {
        Some(text) => text,
        None => canned_commentary(&req),
    };
    Ok(Json(GameAnalysis { comment }))
}

fn analysis_prompt(req: &GameAnalysisRequest) -> String {
    let score = |s: Option<i64>| s.map(|v| v.to_string()).unwrap_or_else(|| "?".into());
    format!(
        "Partido: {}. Alianza roja: {} puntos. Alianza azul: {} puntos. Notas: {}",
        req.match_name.as_deref().unwrap_or("sin nombre"),
        score(req.red_score),
        score(req.blue_score),
        req.notes.as_deref().unwrap_or("ninguna"),
    )
}

/// Offline commentary keyed on the score margin.
fn canned_commentary(req: &GameAnalysisRequest) -> String {
    let (Some(red), Some(blue)) = (req.red_score, req.blue_score) else {
        return "🎙️ Sin marcador no hay análisis: envía los puntos de ambas alianzas.".into();
    };
    let margin = red.abs_diff(blue);
    let leader = if red > blue { "roja" } else { "azul" };
    match margin {
        0 => format!("🎙️ ¡Empate {red}-{blue}! Cada punto del EndGame contó; el desempate lo deciden las penalizaciones."),
        1..=10 => format!(
            "🎙️ Victoria cerrada de la alianza {leader} ({red}-{blue}). Un parkeo extra habría cambiado la historia: aseguren el EndGame."
        ),
        11..=50 => format!(
            "🎙️ La alianza {leader} controla el partido ({red}-{blue}). El autónomo marcó la diferencia; la otra alianza debe asegurar muestras preconfiguradas."
        ),
        _ => format!(
            "🎙️ ¡Dominio total de la alianza {leader} ({red}-{blue})! Ciclos rápidos y cero faltas mayores: así se gana un regional."
        ),
    }
}
