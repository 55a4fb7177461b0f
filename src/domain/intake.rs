//! Patient intake: raw form draft, validated form and its wire encoding.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize, Serializer};
use zeroize::Zeroize;

/// Accepted oxygen saturation range, percent (inclusive).
pub const SATURATION_RANGE: (f64, f64) = (50.0, 100.0);

/// Accepted body temperature range, °C (inclusive).
pub const TEMPERATURE_RANGE: (f64, f64) = (30.0, 45.0);

/// Biological sex as encoded by the scoring server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sex {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
}

impl Sex {
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "M" | "m" => Some(Self::Male),
            "F" | "f" => Some(Self::Female),
            _ => None,
        }
    }

    /// Long label used in tables and exports.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Male => "Masculino",
            Self::Female => "Femenino",
        }
    }
}

/// AVPU level of consciousness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Consciousness {
    /// Alert
    #[serde(rename = "A")]
    Alert,
    /// Responds to voice
    #[serde(rename = "V")]
    Voice,
    /// Responds to pain
    #[serde(rename = "P")]
    Pain,
    /// Unresponsive
    #[serde(rename = "U")]
    Unresponsive,
}

impl Consciousness {
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_uppercase().as_str() {
            "A" => Some(Self::Alert),
            "V" => Some(Self::Voice),
            "P" => Some(Self::Pain),
            "U" => Some(Self::Unresponsive),
            _ => None,
        }
    }
}

/// Form fields that carry typed input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IntakeField {
    Age,
    Sex,
    SystolicBp,
    DiastolicBp,
    HeartRate,
    Temperature,
    Saturation,
    Consciousness,
    HoursSinceOnset,
}

impl IntakeField {
    /// Fields that must be filled before submission.
    pub const REQUIRED: [IntakeField; 8] = [
        Self::Age,
        Self::Sex,
        Self::SystolicBp,
        Self::DiastolicBp,
        Self::HeartRate,
        Self::Temperature,
        Self::Saturation,
        Self::Consciousness,
    ];

    /// Wire name of the field.
    #[must_use]
    pub fn key(&self) -> &'static str {
        match self {
            Self::Age => "edad",
            Self::Sex => "sexo",
            Self::SystolicBp => "presion_sistolica",
            Self::DiastolicBp => "presion_diastolica",
            Self::HeartRate => "frecuencia_cardiaca",
            Self::Temperature => "temperatura",
            Self::Saturation => "saturacion_o2",
            Self::Consciousness => "nivel_conciencia",
            Self::HoursSinceOnset => "tiempo_evolucion_horas",
        }
    }
}

/// Boolean symptom flags of the intake form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SymptomFlag {
    ChestPain,
    Dyspnea,
    Fever,
    RecentTrauma,
    ActiveBleeding,
    ChronicConditions,
}

impl SymptomFlag {
    pub const ALL: [SymptomFlag; 6] = [
        Self::ChestPain,
        Self::Dyspnea,
        Self::Fever,
        Self::RecentTrauma,
        Self::ActiveBleeding,
        Self::ChronicConditions,
    ];
}

/// Symptom flags; serialized as `0`/`1` integers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Symptoms {
    #[serde(rename = "dolor_toracico", serialize_with = "as_flag")]
    pub chest_pain: bool,
    #[serde(rename = "disnea", serialize_with = "as_flag")]
    pub dyspnea: bool,
    #[serde(rename = "fiebre", serialize_with = "as_flag")]
    pub fever: bool,
    #[serde(rename = "trauma_reciente", serialize_with = "as_flag")]
    pub recent_trauma: bool,
    #[serde(rename = "sangrado_activo", serialize_with = "as_flag")]
    pub active_bleeding: bool,
    #[serde(rename = "antecedentes_cronicos", serialize_with = "as_flag")]
    pub chronic_conditions: bool,
}

impl Symptoms {
    #[must_use]
    pub fn get(&self, flag: SymptomFlag) -> bool {
        match flag {
            SymptomFlag::ChestPain => self.chest_pain,
            SymptomFlag::Dyspnea => self.dyspnea,
            SymptomFlag::Fever => self.fever,
            SymptomFlag::RecentTrauma => self.recent_trauma,
            SymptomFlag::ActiveBleeding => self.active_bleeding,
            SymptomFlag::ChronicConditions => self.chronic_conditions,
        }
    }

    pub fn set(&mut self, flag: SymptomFlag, value: bool) {
        let slot = match flag {
            SymptomFlag::ChestPain => &mut self.chest_pain,
            SymptomFlag::Dyspnea => &mut self.dyspnea,
            SymptomFlag::Fever => &mut self.fever,
            SymptomFlag::RecentTrauma => &mut self.recent_trauma,
            SymptomFlag::ActiveBleeding => &mut self.active_bleeding,
            SymptomFlag::ChronicConditions => &mut self.chronic_conditions,
        };
        *slot = value;
    }

    pub fn toggle(&mut self, flag: SymptomFlag) {
        self.set(flag, !self.get(flag));
    }
}

fn as_flag<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u8(u8::from(*value))
}

/// Validated intake payload for `POST /predict`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntakeForm {
    pub edad: u32,
    pub sexo: Sex,
    pub presion_sistolica: i32,
    pub presion_diastolica: i32,
    pub frecuencia_cardiaca: i32,
    pub temperatura: f64,
    pub saturacion_o2: f64,
    pub nivel_conciencia: Consciousness,
    pub tiempo_evolucion_horas: u32,
    #[serde(flatten)]
    pub symptoms: Symptoms,
}

/// Fields rejected by validation, in form order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationFailure {
    pub fields: BTreeSet<IntakeField>,
}

impl ValidationFailure {
    #[must_use]
    pub fn contains(&self, field: IntakeField) -> bool {
        self.fields.contains(&field)
    }
}

impl std::fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let keys: Vec<&str> = self.fields.iter().map(IntakeField::key).collect();
        write!(f, "invalid fields: {}", keys.join(", "))
    }
}

/// Raw text of the intake form as typed by the operator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IntakeDraft {
    pub age: String,
    pub sex: String,
    pub systolic_bp: String,
    pub diastolic_bp: String,
    pub heart_rate: String,
    pub temperature: String,
    pub saturation: String,
    pub consciousness: String,
    pub hours_since_onset: String,
    pub symptoms: Symptoms,
}

impl IntakeDraft {
    #[must_use]
    pub fn value(&self, field: IntakeField) -> &str {
        match field {
            IntakeField::Age => &self.age,
            IntakeField::Sex => &self.sex,
            IntakeField::SystolicBp => &self.systolic_bp,
            IntakeField::DiastolicBp => &self.diastolic_bp,
            IntakeField::HeartRate => &self.heart_rate,
            IntakeField::Temperature => &self.temperature,
            IntakeField::Saturation => &self.saturation,
            IntakeField::Consciousness => &self.consciousness,
            IntakeField::HoursSinceOnset => &self.hours_since_onset,
        }
    }

    pub fn value_mut(&mut self, field: IntakeField) -> &mut String {
        match field {
            IntakeField::Age => &mut self.age,
            IntakeField::Sex => &mut self.sex,
            IntakeField::SystolicBp => &mut self.systolic_bp,
            IntakeField::DiastolicBp => &mut self.diastolic_bp,
            IntakeField::HeartRate => &mut self.heart_rate,
            IntakeField::Temperature => &mut self.temperature,
            IntakeField::Saturation => &mut self.saturation,
            IntakeField::Consciousness => &mut self.consciousness,
            IntakeField::HoursSinceOnset => &mut self.hours_since_onset,
        }
    }

    /// Check required fields and vital ranges, producing the wire form.
    ///
    /// Every failing field is reported, not just the first.
    ///
    /// # Errors
    /// Returns the set of invalid fields.
    pub fn validate(&self) -> Result<IntakeForm, ValidationFailure> {
        let mut failure = ValidationFailure::default();

        for field in IntakeField::REQUIRED {
            if self.value(field).trim().is_empty() {
                failure.fields.insert(field);
            }
        }

        let age = self.parse::<u32>(IntakeField::Age, &mut failure);
        let sex = self.parse_with(IntakeField::Sex, Sex::from_code, &mut failure);
        let systolic = self.parse::<i32>(IntakeField::SystolicBp, &mut failure);
        let diastolic = self.parse::<i32>(IntakeField::DiastolicBp, &mut failure);
        let heart_rate = self.parse::<i32>(IntakeField::HeartRate, &mut failure);
        let temperature = self.parse::<f64>(IntakeField::Temperature, &mut failure);
        let saturation = self.parse::<f64>(IntakeField::Saturation, &mut failure);
        let consciousness =
            self.parse_with(IntakeField::Consciousness, Consciousness::from_code, &mut failure);

        let hours = if self.hours_since_onset.trim().is_empty() {
            Some(0)
        } else {
            self.parse::<u32>(IntakeField::HoursSinceOnset, &mut failure)
        };

        if let Some(value) = saturation {
            if !in_range(value, SATURATION_RANGE) {
                failure.fields.insert(IntakeField::Saturation);
            }
        }
        if let Some(value) = temperature {
            if !in_range(value, TEMPERATURE_RANGE) {
                failure.fields.insert(IntakeField::Temperature);
            }
        }

        match (
            age,
            sex,
            systolic,
            diastolic,
            heart_rate,
            temperature,
            saturation,
            consciousness,
            hours,
        ) {
            (
                Some(edad),
                Some(sexo),
                Some(presion_sistolica),
                Some(presion_diastolica),
                Some(frecuencia_cardiaca),
                Some(temperatura),
                Some(saturacion_o2),
                Some(nivel_conciencia),
                Some(tiempo_evolucion_horas),
            ) if failure.fields.is_empty() => Ok(IntakeForm {
                edad,
                sexo,
                presion_sistolica,
                presion_diastolica,
                frecuencia_cardiaca,
                temperatura,
                saturacion_o2,
                nivel_conciencia,
                tiempo_evolucion_horas,
                symptoms: self.symptoms,
            }),
            _ => Err(failure),
        }
    }

    fn parse<T: std::str::FromStr>(
        &self,
        field: IntakeField,
        failure: &mut ValidationFailure,
    ) -> Option<T> {
        self.parse_with(field, |raw| raw.trim().parse::<T>().ok(), failure)
    }

    fn parse_with<T>(
        &self,
        field: IntakeField,
        parse: impl Fn(&str) -> Option<T>,
        failure: &mut ValidationFailure,
    ) -> Option<T> {
        let raw = self.value(field);
        if raw.trim().is_empty() {
            return None;
        }
        let parsed = parse(raw);
        if parsed.is_none() {
            failure.fields.insert(field);
        }
        parsed
    }

    /// Wipe the typed text and reset the flags.
    pub fn clear_sensitive(&mut self) {
        for field in [
            IntakeField::Age,
            IntakeField::Sex,
            IntakeField::SystolicBp,
            IntakeField::DiastolicBp,
            IntakeField::HeartRate,
            IntakeField::Temperature,
            IntakeField::Saturation,
            IntakeField::Consciousness,
            IntakeField::HoursSinceOnset,
        ] {
            self.value_mut(field).zeroize();
        }
        self.symptoms = Symptoms::default();
    }
}

fn in_range(value: f64, (min, max): (f64, f64)) -> bool {
    value.is_finite() && value >= min && value <= max
}
