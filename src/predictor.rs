//! Exoplanet candidate triage for the AZTLAN demo.
//!
//! Classification is a fixed radius threshold over the Kepler KOI fields, so
//! the same candidate always gets the same `prediccion`. Only the reported
//! confidence is randomized inside a band per class.

use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize};

/// Above this radius (Earth radii) a transit is more likely a stellar companion.
pub const MAX_PLANET_RADIUS: f64 = 15.0;
/// Upper bound for a rocky composition (Earth radii).
pub const ROCKY_RADIUS: f64 = 1.6;
const HABITABLE_STEFF: std::ops::RangeInclusive<f64> = 4000.0..=7000.0;
const HABITABLE_TEQ: std::ops::RangeInclusive<f64> = 180.0..=310.0;
const SOLAR_RADIUS_AU: f64 = 0.004_650_47;
const BOND_ALBEDO: f64 = 0.3;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlanetCandidate {
    #[serde(default)]
    pub planet_name: String,
    /// Planet radius, Earth radii.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub koi_prad: f64,
    /// Stellar radius, solar radii.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub koi_srad: f64,
    /// Orbital period, days.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub koi_period: f64,
    /// Stellar effective temperature, K.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub koi_steff: f64,
}

impl PlanetCandidate {
    pub fn display_name(&self) -> &str {
        let name = self.planet_name.trim();
        if name.is_empty() { "Objetivo sin nombre" } else { name }
    }
}

/// HTML forms post numbers as strings; accept both, and treat blanks or
/// garbage as zero.
fn lenient_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(f64),
        Text(String),
        Null(()),
    }
    Ok(match Raw::deserialize(deserializer)? {
        Raw::Num(n) if n.is_finite() => n,
        Raw::Text(s) => s.trim().replace(',', ".").parse().ok().filter(|n: &f64| n.is_finite()).unwrap_or(0.0),
        _ => 0.0,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Confirmed,
    FalsePositive,
    Insufficient,
}

impl Classification {
    pub fn classify(koi_prad: f64) -> Self {
        if koi_prad <= 0.0 {
            Classification::Insufficient
        } else if koi_prad > MAX_PLANET_RADIUS {
            Classification::FalsePositive
        } else {
            Classification::Confirmed
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Classification::Confirmed => "EXOPLANETA CONFIRMADO",
            Classification::FalsePositive => "FALSO POSITIVO",
            Classification::Insufficient => "DATOS INSUFICIENTES",
        }
    }

    /// Confidence band, percent.
    fn band(&self) -> (f64, f64) {
        match self {
            Classification::Confirmed => (82.0, 97.5),
            Classification::FalsePositive => (70.0, 92.0),
            Classification::Insufficient => (0.0, 0.0),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Prediction {
    pub prediccion: String,
    pub probabilidad: f64,
    pub analisis_tecnico: String,
    pub habitabilidad: String,
}

/// Equilibrium temperature (K) from stellar temperature and radius and the
/// orbital period, assuming a solar-mass host and circular orbit.
pub fn equilibrium_temperature(c: &PlanetCandidate) -> Option<f64> {
    if c.koi_steff <= 0.0 || c.koi_srad <= 0.0 || c.koi_period <= 0.0 {
        return None;
    }
    let years = c.koi_period / 365.25;
    let semi_major_au = years.powi(2).cbrt();
    let star_radius_au = c.koi_srad * SOLAR_RADIUS_AU;
    Some(c.koi_steff * (star_radius_au / (2.0 * semi_major_au)).sqrt() * (1.0 - BOND_ALBEDO).powf(0.25))
}

pub fn habitability(c: &PlanetCandidate) -> String {
    let teq = equilibrium_temperature(c);
    let rocky = c.koi_prad > 0.0 && c.koi_prad <= ROCKY_RADIUS;
    let mild_star = HABITABLE_STEFF.contains(&c.koi_steff);
    let temperate = teq.is_some_and(|t| HABITABLE_TEQ.contains(&t));

    let verdict = match (rocky, mild_star, temperate) {
        (true, true, true) => "ALTA: planeta rocoso en zona templada de una estrella estable",
        (true, _, true) => "MEDIA: rocoso y templado, pero la estrella está fuera del rango solar",
        (true, _, false) => "BAJA: rocoso, pero fuera de la zona habitable",
        (false, _, true) => "BAJA: zona templada, pero probablemente gaseoso",
        (false, _, false) => "NULA: gigante gaseoso o condiciones extremas",
    };
    match teq {
        Some(t) => format!("{verdict} (Teq ≈ {t:.0} K)"),
        None => verdict.to_string(),
    }
}

pub fn technical_analysis(c: &PlanetCandidate, class: Classification) -> String {
    let composition = if c.koi_prad <= ROCKY_RADIUS {
        "rocosa"
    } else if c.koi_prad <= 4.0 {
        "tipo mini-Neptuno"
    } else {
        "gaseosa"
    };
    match class {
        Classification::Insufficient => format!(
            "{}: sin radio planetario válido no es posible evaluar el tránsito.",
            c.display_name()
        ),
        Classification::FalsePositive => format!(
            "{}: radio de {:.2} R⊕ excede {MAX_PLANET_RADIUS} R⊕; la señal es compatible con una binaria eclipsante. \
             Estrella de {:.0} K y {:.2} R☉, periodo de {:.2} días.",
            c.display_name(),
            c.koi_prad,
            c.koi_steff,
            c.koi_srad,
            c.koi_period
        ),
        Classification::Confirmed => format!(
            "{}: radio de {:.2} R⊕ (composición {composition}), periodo orbital de {:.2} días alrededor de una estrella de {:.0} K y {:.2} R☉.",
            c.display_name(),
            c.koi_prad,
            c.koi_period,
            c.koi_steff,
            c.koi_srad
        ),
    }
}

pub fn predict<R: Rng>(c: &PlanetCandidate, rng: &mut R) -> Prediction {
    let class = Classification::classify(c.koi_prad);
    let (lo, hi) = class.band();
    let probabilidad = if hi > lo { rng.gen_range(lo..hi) } else { lo };
    Prediction {
        prediccion: class.label().to_string(),
        probabilidad: (probabilidad * 10.0).round() / 10.0,
        analisis_tecnico: technical_analysis(c, class),
        habitabilidad: habitability(c),
    }
}

/// Prompt for the LLM commentary on a candidate.
pub fn analysis_prompt(c: &PlanetCandidate, prediction: &Prediction) -> String {
    format!(
        "Candidato {}: koi_prad={} R⊕, koi_srad={} R☉, koi_period={} días, koi_steff={} K. \
         Clasificación del modelo: {} ({}%). Habitabilidad: {}. \
         Da un análisis técnico breve (máximo 4 frases).",
        c.display_name(),
        c.koi_prad,
        c.koi_srad,
        c.koi_period,
        c.koi_steff,
        prediction.prediccion,
        prediction.probabilidad,
        prediction.habitabilidad
    )
}

pub fn deep_report_prompt(c: &PlanetCandidate) -> String {
    format!(
        "Genera un informe de misión en markdown para el candidato {} \
         (koi_prad={} R⊕, koi_srad={} R☉, koi_period={} días, koi_steff={} K) con secciones: \
         Resumen, Parámetros, Composición probable, Habitabilidad, Recomendación de misión.",
        c.display_name(),
        c.koi_prad,
        c.koi_srad,
        c.koi_period,
        c.koi_steff
    )
}

/// Offline markdown report, used when no LLM is configured.
pub fn deep_report(c: &PlanetCandidate) -> String {
    let class = Classification::classify(c.koi_prad);
    let teq = equilibrium_temperature(c)
        .map(|t| format!("{t:.0} K"))
        .unwrap_or_else(|| "desconocida".into());
    let recommendation = match class {
        Classification::Confirmed if c.koi_prad <= ROCKY_RADIUS => {
            "Prioridad alta: programar espectroscopía de tránsito para buscar atmósfera."
        }
        Classification::Confirmed => "Prioridad media: caracterizar masa mediante velocidad radial.",
        Classification::FalsePositive => "Descartar: reasignar tiempo de telescopio a otros objetivos.",
        Classification::Insufficient => "Repetir la observación: faltan parámetros del tránsito.",
    };
    format!(
        "# Informe AZTLAN: {name}\n\n\
         ## Resumen\n{summary}\n\n\
         ## Parámetros\n\
         | Parámetro | Valor |\n|---|---|\n\
         | Radio planetario | {prad:.2} R⊕ |\n\
         | Radio estelar | {srad:.2} R☉ |\n\
         | Periodo orbital | {period:.2} días |\n\
         | Temperatura estelar | {steff:.0} K |\n\
         | Temperatura de equilibrio | {teq} |\n\n\
         ## Clasificación\n**{label}**\n\n\
         ## Habitabilidad\n{habitability}\n\n\
         ## Recomendación de misión\n{recommendation}\n",
        name = c.display_name(),
        summary = technical_analysis(c, class),
        prad = c.koi_prad,
        srad = c.koi_srad,
        period = c.koi_period,
        steff = c.koi_steff,
        label = class.label(),
        habitability = habitability(c),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn earth_like() -> PlanetCandidate {
        PlanetCandidate {
            planet_name: "Kepler-442 b".into(),
            koi_prad: 1.34,
            koi_srad: 0.6,
            koi_period: 112.3,
            koi_steff: 4402.0,
        }
    }

    #[test]
    fn classification_is_a_radius_threshold() {
        assert_eq!(Classification::classify(1.0), Classification::Confirmed);
        assert_eq!(Classification::classify(15.0), Classification::Confirmed);
        assert_eq!(Classification::classify(15.1), Classification::FalsePositive);
        assert_eq!(Classification::classify(0.0), Classification::Insufficient);
    }

    #[test]
    fn same_candidate_same_prediction() {
        let c = earth_like();
        let mut a = StdRng::seed_from_u64(1);
        let mut b = StdRng::seed_from_u64(2);
        assert_eq!(predict(&c, &mut a).prediccion, predict(&c, &mut b).prediccion);
    }

    #[test]
    fn probability_stays_in_band() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let p = predict(&earth_like(), &mut rng).probabilidad;
            assert!((82.0..=97.5).contains(&p), "{p}");
        }
        let empty = predict(&PlanetCandidate::default(), &mut rng);
        assert_eq!(empty.probabilidad, 0.0);
        assert_eq!(empty.prediccion, "DATOS INSUFICIENTES");
    }

    #[test]
    fn kepler_442b_is_temperate() {
        let teq = equilibrium_temperature(&earth_like()).unwrap();
        assert!((200.0..260.0).contains(&teq), "{teq}");
        assert!(habitability(&earth_like()).starts_with("ALTA"));
    }

    #[test]
    fn hot_jupiter_is_not_habitable() {
        let c = PlanetCandidate {
            planet_name: "hot".into(),
            koi_prad: 11.0,
            koi_srad: 1.1,
            koi_period: 3.5,
            koi_steff: 6100.0,
        };
        assert!(habitability(&c).starts_with("NULA"));
    }

    #[test]
    fn numbers_may_arrive_as_strings() {
        let c: PlanetCandidate = serde_json::from_str(
            r#"{"planet_name":"K1","koi_prad":"2,5","koi_srad":1,"koi_period":"abc","koi_steff":null}"#,
        )
        .unwrap();
        assert_eq!(c.koi_prad, 2.5);
        assert_eq!(c.koi_srad, 1.0);
        assert_eq!(c.koi_period, 0.0);
        assert_eq!(c.koi_steff, 0.0);
    }

    #[test]
    fn offline_report_is_markdown() {
        let report = deep_report(&earth_like());
        assert!(report.starts_with("# Informe AZTLAN: Kepler-442 b"));
        assert!(report.contains("EXOPLANETA CONFIRMADO"));
        assert!(report.contains("Prioridad alta"));
    }
}
