//! Neutral-judge chatbot and LLM persona relay.
//!
//! Two strategies, picked per request: a fixed keyword table with canned
//! answers about the FTC game manual, or a single-turn relay to a hosted LLM
//! with a persona prompt. Nothing is remembered between calls.

use aztlan_api::client::{ApiError, ApiResult};
use aztlan_api::llm::LlmClient;
use log::{debug, warn};

pub const JUDGE_PREAMBLE: &str = "⚖️ **Respuesta del Juez Neutral**: ";

pub const GENERIC_PROMPT: &str = "Como Juez Neutral de FTC, te recomiendo consultar el Game Manual oficial para detalles específicos. ¿Tienes alguna pregunta sobre puntos, premios, clasificación, robot, autónomo, teleop, endgame o faltas?";

pub const LLM_FAILURE: &str =
    "⚠️ El núcleo de IA no está disponible en este momento. Intenta de nuevo en unos minutos.";

/// Ordered: the first keyword found in the question wins.
pub const RULES: [(&str, &str); 8] = [
    (
        "puntos",
        "En FTC DECODE, los puntos se otorgan por: colocar muestras en zonas (5-10 pts), ascender niveles (15-30 pts), y parkear en zonas seguras (5-15 pts). Los Ranking Points (RP) se calculan sumando puntos de clasificación + bonificaciones por premios.",
    ),
    (
        "premios",
        "Los premios principales son: Inspire Award (+15 RP bonus), Think Award (+10 RP), Connect Award (+10 RP), Innovate Award (+8 RP), Design Award (+8 RP), Control Award (+5 RP), Motivate Award (+5 RP), y Winning Alliance (+10 RP).",
    ),
    (
        "clasificar",
        "Para clasificar al siguiente nivel se necesitan típicamente más de 120 RP totales. Los equipos en la \"Lista Verde\" (clasificados retroactivos) avanzan automáticamente sin importar sus puntos actuales.",
    ),
    (
        "robot",
        "El robot debe caber en 18\"x18\"x18\" al inicio. Puede expandirse durante el match. Debe usar componentes legales de FIRST y proveedores aprobados. El peso máximo es 42 lbs (19 kg).",
    ),
    (
        "autonomo",
        "El período autónomo dura 30 segundos. Los robots deben operar sin control humano. Se otorgan bonificaciones por: parkear correctamente, colocar muestras preconfiguradas, y completar navegación.",
    ),
    (
        "teleop",
        "El período TeleOperado dura 2 minutos. Los conductores controlan el robot manualmente. Se pueden manipular elementos de juego, ascender estructuras, y posicionar el robot para EndGame.",
    ),
    (
        "endgame",
        "Los últimos 30 segundos del TeleOp son EndGame. Se otorgan puntos extra por: ascender niveles de la estructura, parkear en zonas específicas, y completar tareas de cierre.",
    ),
    (
        "falta",
        "Las faltas incluyen: contacto destructivo con otros robots (Minor/Major), salirse del campo, interferir con elementos del oponente, y violar reglas de seguridad. Las Major Fouls dan puntos al oponente.",
    ),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Rules,
    Llm,
}

impl Mode {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(|m| m.trim().to_ascii_lowercase()).as_deref() {
            Some("llm" | "ia" | "ai" | "rag" | "gemini") => Mode::Llm,
            _ => Mode::Rules,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Rules => "rules",
            Mode::Llm => "llm",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Lang {
    #[default]
    Es,
    En,
}

impl Lang {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(|l| l.trim().to_ascii_lowercase()).as_deref() {
            Some(l) if l.starts_with("en") => Lang::En,
            _ => Lang::Es,
        }
    }

    fn directive(&self) -> &'static str {
        match self {
            Lang::Es => "Responde siempre en español, de forma clara y breve.",
            Lang::En => "Always answer in English, clearly and briefly.",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Persona {
    /// Neutral FTC rules judge.
    Judge,
    /// Onboard AI of the AZTLAN exploration ship.
    Aztlan,
    /// Match commentator and strategist.
    Analyst,
}

impl Persona {
    fn instructions(&self) -> &'static str {
        match self {
            Persona::Judge => {
                "Eres un Juez Neutral experto en el reglamento de FIRST Tech Challenge (temporada DECODE). \
                 Responde solo con base en el Game Manual oficial, cita la regla cuando puedas y no tomes partido por ningún equipo. \
                 Si la pregunta no trata sobre FTC, indícalo amablemente."
            }
            Persona::Aztlan => {
                "Eres AZTLAN, la inteligencia artificial a bordo de una nave de exploración interestelar. \
                 Analizas datos de exoplanetas del telescopio Kepler (radio planetario, radio estelar, periodo orbital, temperatura estelar) \
                 con rigor científico, pero con el tono de una IA de nave espacial que informa a su tripulación."
            }
            Persona::Analyst => {
                "Eres un comentarista y estratega de partidos de FIRST Tech Challenge. \
                 Analiza el resultado que te den en dos o tres frases con energía de transmisión deportiva y una recomendación táctica concreta."
            }
        }
    }
}

/// Canned answer for a question, or the generic topic list when nothing matches.
pub fn rule_answer(question: &str) -> String {
    let normalized = fold_accents(&question.to_lowercase());
    RULES
        .iter()
        .find(|(keyword, _)| normalized.contains(keyword))
        .map(|(_, answer)| format!("{JUDGE_PREAMBLE}{answer}"))
        .unwrap_or_else(|| GENERIC_PROMPT.to_string())
}

/// Spanish speakers type "autónomo"; the table is keyed without accents.
fn fold_accents(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            'á' => 'a',
            'é' => 'e',
            'í' => 'i',
            'ó' => 'o',
            'ú' | 'ü' => 'u',
            _ => c,
        })
        .collect()
}

pub fn system_prompt(persona: Persona, lang: Lang, knowledge_base: Option<&str>) -> String {
    let mut prompt = format!("{}\n{}", persona.instructions(), lang.directive());
    if let Some(doc) = knowledge_base {
        prompt.push_str("\n\nDocumento de referencia:\n---\n");
        prompt.push_str(doc);
        prompt.push_str("\n---");
    }
    prompt
}

/// User-facing text for a failed LLM call. Raw error text is only exposed
/// when debugging is switched on.
pub fn failure_message(err: &ApiError, debug_errors: bool) -> String {
    if debug_errors {
        format!("{LLM_FAILURE} ({err})")
    } else {
        LLM_FAILURE.to_string()
    }
}

pub struct Responder<'a> {
    pub llm: Option<&'a LlmClient>,
    pub knowledge_base: Option<&'a str>,
    pub debug_errors: bool,
}

impl Responder<'_> {
    /// One completion for the persona, or `None` if no LLM is configured.
    async fn complete(&self, persona: Persona, lang: Lang, user: &str) -> Option<ApiResult<String>> {
        let llm = self.llm?;
        let knowledge = match persona {
            Persona::Judge => self.knowledge_base,
            _ => None,
        };
        let system = system_prompt(persona, lang, knowledge);
        Some(llm.complete(&system, user).await)
    }

    /// Relay a chat prompt to the LLM, or `None` if no LLM is configured.
    /// Failures come back as a canned sentence, never as an error.
    pub async fn relay(&self, persona: Persona, lang: Lang, user: &str) -> Option<String> {
        match self.complete(persona, lang, user).await? {
            Ok(text) => Some(text),
            Err(e) => {
                warn!("LLM relay failed for {persona:?}: {e}");
                Some(failure_message(&e, self.debug_errors))
            }
        }
    }

    /// Generated text only when the LLM answers; `None` tells the caller to
    /// keep its offline content.
    pub async fn generate(&self, persona: Persona, lang: Lang, user: &str) -> Option<String> {
        match self.complete(persona, lang, user).await? {
            Ok(text) => Some(text),
            Err(e) => {
                warn!("LLM generation failed for {persona:?}, keeping offline text: {e}");
                None
            }
        }
    }

    /// Answer a judge question. LLM mode without credentials degrades to the
    /// rules table; the returned mode says which path actually answered.
    pub async fn answer(&self, question: &str, mode: Mode, lang: Lang) -> (String, Mode) {
        if mode == Mode::Llm {
            if let Some(text) = self.relay(Persona::Judge, lang, question).await {
                return (text, Mode::Llm);
            }
            debug!("LLM mode requested but no LLM configured, using rules");
        }
        (rule_answer(question), Mode::Rules)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn premios_lists_award_points() {
        let answer = rule_answer("¿Qué PREMIOS hay?");
        assert!(answer.starts_with(JUDGE_PREAMBLE));
        assert!(answer.contains("Inspire Award (+15 RP bonus)"));
        assert!(answer.contains("Think Award (+10 RP)"));
        assert!(answer.contains("Connect Award (+10 RP)"));
    }

    #[test]
    fn unknown_question_gets_generic_prompt() {
        assert_eq!(rule_answer("¿de qué color es el cielo?"), GENERIC_PROMPT);
        assert_eq!(rule_answer(""), GENERIC_PROMPT);
    }

    #[test]
    fn first_match_wins() {
        // "puntos" precedes "robot" in the table.
        let answer = rule_answer("cuantos puntos da parkear el robot");
        assert!(answer.contains("los puntos se otorgan por"));
    }

    #[test]
    fn accents_are_folded() {
        let answer = rule_answer("¿Cuánto dura el periodo autónomo?");
        assert!(answer.contains("30 segundos"));
    }

    #[test]
    fn mode_and_lang_parsing() {
        assert_eq!(Mode::parse(None), Mode::Rules);
        assert_eq!(Mode::parse(Some("LLM")), Mode::Llm);
        assert_eq!(Mode::parse(Some("whatever")), Mode::Rules);
        assert_eq!(Lang::parse(Some("en-US")), Lang::En);
        assert_eq!(Lang::parse(None), Lang::Es);
    }

    #[test]
    fn system_prompt_embeds_knowledge() {
        let prompt = system_prompt(Persona::Judge, Lang::En, Some("Rule G401: no pinning."));
        assert!(prompt.contains("Juez Neutral"));
        assert!(prompt.contains("English"));
        assert!(prompt.contains("Rule G401"));
        assert!(!system_prompt(Persona::Aztlan, Lang::Es, None).contains("Documento"));
    }

    #[test]
    fn failure_message_hides_errors_unless_debugging() {
        let err = ApiError::Other("timeout".into());
        assert_eq!(failure_message(&err, false), LLM_FAILURE);
        assert!(failure_message(&err, true).contains("timeout"));
    }

    #[tokio::test]
    async fn llm_mode_without_client_uses_rules() {
        let responder = Responder { llm: None, knowledge_base: None, debug_errors: false };
        let (text, mode) = responder.answer("premios", Mode::Llm, Lang::Es).await;
        assert_eq!(mode, Mode::Rules);
        assert!(text.contains("Inspire Award"));
    }

    #[tokio::test]
    async fn llm_mode_relays_and_survives_failures() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat")
            .with_status(500)
            .create_async()
            .await;
        let llm = LlmClient::new(&format!("{}/chat", server.url()), "k", "m");
        let responder = Responder { llm: Some(&llm), knowledge_base: None, debug_errors: false };

        let (text, mode) = responder.answer("premios", Mode::Llm, Lang::Es).await;
        assert_eq!(mode, Mode::Llm);
        assert_eq!(text, LLM_FAILURE);
    }

    #[tokio::test]
    async fn failed_generation_keeps_offline_text() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat")
            .with_status(500)
            .create_async()
            .await;
        let llm = LlmClient::new(&format!("{}/chat", server.url()), "k", "m");
        let responder = Responder { llm: Some(&llm), knowledge_base: None, debug_errors: true };

        assert_eq!(responder.generate(Persona::Aztlan, Lang::Es, "Kepler-22 b").await, None);
        let offline = Responder { llm: None, knowledge_base: None, debug_errors: false };
        assert_eq!(offline.generate(Persona::Analyst, Lang::Es, "Q1").await, None);
    }
}
