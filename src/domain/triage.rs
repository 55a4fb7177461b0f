//! Triage classification types returned by the scoring server.
//!
//! Field names follow the server's JSON contract.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::intake::Sex;

/// Chilean emergency triage scale (ESI-like, 1 = most severe).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TriageLevel {
    /// C1 - resuscitation
    Rojo,
    /// C2 - emergency
    Naranjo,
    /// C3 - urgency
    Amarillo,
    /// C4 - minor urgency
    Verde,
    /// C5 - non urgent
    Azul,
}

impl TriageLevel {
    /// All levels, most severe first.
    pub const ALL: [TriageLevel; 5] = [
        Self::Rojo,
        Self::Naranjo,
        Self::Amarillo,
        Self::Verde,
        Self::Azul,
    ];

    /// Map a numeric level (1-5) to a triage level.
    #[must_use]
    pub fn from_level(level: u8) -> Option<Self> {
        match level {
            1 => Some(Self::Rojo),
            2 => Some(Self::Naranjo),
            3 => Some(Self::Amarillo),
            4 => Some(Self::Verde),
            5 => Some(Self::Azul),
            _ => None,
        }
    }

    /// Numeric level (1-5).
    #[must_use]
    pub fn level(&self) -> u8 {
        match self {
            Self::Rojo => 1,
            Self::Naranjo => 2,
            Self::Amarillo => 3,
            Self::Verde => 4,
            Self::Azul => 5,
        }
    }

    /// Zero-based slot used by the per-level charts.
    #[must_use]
    pub fn index(&self) -> usize {
        usize::from(self.level() - 1)
    }

    /// Colour label as the server names it.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Rojo => "Rojo",
            Self::Naranjo => "Naranjo",
            Self::Amarillo => "Amarillo",
            Self::Verde => "Verde",
            Self::Azul => "Azul",
        }
    }

    /// Short clinical description of the category.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Rojo => "Reanimación - atención inmediata",
            Self::Naranjo => "Emergencia - atención en minutos",
            Self::Amarillo => "Urgencia - atención prioritaria",
            Self::Verde => "Urgencia menor",
            Self::Azul => "No urgente",
        }
    }

    /// Display colour (RGB).
    #[must_use]
    pub fn color(&self) -> (u8, u8, u8) {
        match self {
            Self::Rojo => (220, 53, 69),     // #DC3545
            Self::Naranjo => (253, 126, 20), // #FD7E14
            Self::Amarillo => (255, 193, 7), // #FFC107
            Self::Verde => (40, 167, 69),    // #28A745
            Self::Azul => (23, 162, 184),    // #17A2B8
        }
    }
}

impl std::fmt::Display for TriageLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.label(), self.level())
    }
}

/// Classification of a single submitted patient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriageResult {
    /// Server-assigned patient id
    pub id: u64,
    pub nivel_triage: u8,
    pub color_triage: String,
    /// Probability in [0, 1]
    pub riesgo_mortalidad: f64,
    /// 1-based position in the current ranking
    pub ranking: u32,
    pub total_pacientes: u32,
}

impl TriageResult {
    #[must_use]
    pub fn level(&self) -> Option<TriageLevel> {
        TriageLevel::from_level(self.nivel_triage)
    }

    /// Mortality risk as a percentage label, e.g. `42.0%`.
    #[must_use]
    pub fn risk_label(&self) -> String {
        format_risk(self.riesgo_mortalidad)
    }

    /// Ranking position label, e.g. `1 de 5`.
    #[must_use]
    pub fn ranking_label(&self) -> String {
        format!("{} de {}", self.ranking, self.total_pacientes)
    }
}

/// One row of the server-ranked waiting list.
///
/// The server echoes the demographic fields as they were submitted, so
/// `edad` and `sexo` are decoded leniently: one odd row must not reject the
/// whole ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingEntry {
    pub posicion: u32,
    pub id: u64,
    pub nivel_triage: u8,
    pub color_triage: String,
    /// Age as reported, number or text
    #[serde(default, deserialize_with = "scalar_text")]
    pub edad: String,
    /// `None` when the server holds an unrecognised code
    #[serde(default, deserialize_with = "lenient_sex")]
    pub sexo: Option<Sex>,
    pub riesgo_mortalidad: f64,
    pub atendido: bool,
}

impl RankingEntry {
    #[must_use]
    pub fn level(&self) -> Option<TriageLevel> {
        TriageLevel::from_level(self.nivel_triage)
    }

    #[must_use]
    pub fn risk_label(&self) -> String {
        format_risk(self.riesgo_mortalidad)
    }

    /// Long sex label; unknown codes are shown as not reported.
    #[must_use]
    pub fn sex_label(&self) -> &'static str {
        self.sexo.map_or("No informado", |sex| sex.label())
    }

    /// Waiting status label.
    #[must_use]
    pub fn status_label(&self) -> &'static str {
        if self.atendido {
            "Atendido"
        } else {
            "En espera"
        }
    }
}

/// Aggregate counters sent alongside the ranking.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TriageStats {
    /// Patients per triage level; keys are the level as a JSON string.
    #[serde(default)]
    pub por_triage: BTreeMap<String, u64>,
    #[serde(default)]
    pub total_pacientes: Option<u64>,
    #[serde(default)]
    pub atendidos: Option<u64>,
    #[serde(default)]
    pub no_atendidos: Option<u64>,
}

/// Full `/ranking` payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RankingSnapshot {
    pub ranking: Vec<RankingEntry>,
    #[serde(default)]
    pub stats: TriageStats,
}

fn scalar_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => text.trim().to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

fn lenient_sex<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Sex>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(code) => Sex::from_code(&code),
        _ => None,
    })
}

/// Format a probability in [0, 1] as a one-decimal percentage.
#[must_use]
pub fn format_risk(probability: f64) -> String {
    format!("{:.1}%", probability * 100.0)
}
