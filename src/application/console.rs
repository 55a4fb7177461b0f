//! Console state machine.
//!
//! The console never performs I/O itself. Operator actions produce
//! [`Command`]s; the executor turns each command into a [`ConsoleEvent`]
//! and [`Console::apply`] folds the event back into state, possibly
//! issuing follow-up commands.

use std::collections::BTreeSet;

use chrono::{DateTime, Local};

use super::charts::ChartData;
use super::export::ExportSummary;
use super::notifications::{NotificationKind, Notifications};
use crate::domain::{
    IntakeDraft, IntakeField, IntakeForm, RankingEntry, RankingSnapshot, TriageResult, TriageStats,
};
use crate::ports::ApiError;
use crate::TriageError;

/// Aggregate warning shown when the intake form does not validate.
pub const VALIDATION_WARNING: &str =
    "Por favor complete todos los campos requeridos con valores válidos.";

/// Monotonic id attached to each ranking refresh.
pub type RefreshToken = u64;

/// Work requested from the scoring server.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Predict(IntakeForm),
    RefreshRanking(RefreshToken),
    MarkAttended(u64),
    Export,
}

/// Completion of a [`Command`].
#[derive(Debug)]
pub enum ConsoleEvent {
    Predicted(Result<TriageResult, ApiError>),
    RankingLoaded {
        token: RefreshToken,
        result: Result<RankingSnapshot, ApiError>,
    },
    AttendanceMarked {
        patient_id: u64,
        result: Result<(), ApiError>,
    },
    Exported(Result<ExportSummary, TriageError>),
}

/// Everything the views render.
#[derive(Debug, Default)]
pub struct Console {
    /// Latest classification; replaced on every successful prediction.
    pub result: Option<TriageResult>,
    /// Ranking as last applied, in server order.
    pub ranking: Vec<RankingEntry>,
    pub stats: TriageStats,
    pub charts: ChartData,
    pub notifications: Notifications,
    /// Fields flagged by the last failed validation.
    pub invalid_fields: BTreeSet<IntakeField>,
    pub refreshed_at: Option<DateTime<Local>>,
    issued_token: RefreshToken,
    applied_token: RefreshToken,
    settled_token: RefreshToken,
}

impl Console {
    #[must_use]
    pub fn new(notifications: Notifications) -> Self {
        Self {
            notifications,
            ..Self::default()
        }
    }

    /// Validate the draft and, if it passes, request a prediction.
    ///
    /// A failing draft flags its fields, raises one warning and yields no
    /// command.
    pub fn submit(&mut self, draft: &IntakeDraft) -> Option<Command> {
        match draft.validate() {
            Ok(form) => {
                self.invalid_fields.clear();
                Some(Command::Predict(form))
            }
            Err(failure) => {
                tracing::debug!(fields = failure.fields.len(), "intake form rejected");
                self.invalid_fields = failure.fields;
                self.notifications
                    .push(NotificationKind::Warning, VALIDATION_WARNING);
                None
            }
        }
    }

    /// Request a fresh ranking.
    pub fn refresh(&mut self) -> Command {
        self.issued_token += 1;
        Command::RefreshRanking(self.issued_token)
    }

    #[must_use]
    pub fn mark_attended(&self, patient_id: u64) -> Command {
        Command::MarkAttended(patient_id)
    }

    #[must_use]
    pub fn export(&self) -> Command {
        Command::Export
    }

    /// Whether a ranking refresh is still outstanding.
    #[must_use]
    pub fn is_refreshing(&self) -> bool {
        self.settled_token < self.issued_token
    }

    /// Fold a completed command into state and return follow-up commands.
    pub fn apply(&mut self, event: ConsoleEvent) -> Vec<Command> {
        match event {
            ConsoleEvent::Predicted(Ok(result)) => {
                tracing::info!(
                    patient_id = result.id,
                    nivel_triage = result.nivel_triage,
                    ranking = result.ranking,
                    "patient classified"
                );
                self.result = Some(result);
                vec![self.refresh()]
            }
            ConsoleEvent::Predicted(Err(err)) => {
                tracing::warn!(error = %err, "prediction failed");
                self.notifications.push(
                    NotificationKind::Danger,
                    err.user_message("Error al conectar con el servidor"),
                );
                Vec::new()
            }
            ConsoleEvent::RankingLoaded { token, result } => {
                self.apply_ranking(token, result);
                Vec::new()
            }
            ConsoleEvent::AttendanceMarked {
                patient_id,
                result: Ok(()),
            } => {
                tracing::info!(patient_id, "patient marked attended");
                self.notifications
                    .push(NotificationKind::Success, "Paciente marcado como atendido");
                vec![self.refresh()]
            }
            ConsoleEvent::AttendanceMarked {
                patient_id,
                result: Err(err),
            } => {
                tracing::warn!(patient_id, error = %err, "marking attended failed");
                self.notifications
                    .push(NotificationKind::Danger, err.user_message("Error"));
                Vec::new()
            }
            ConsoleEvent::Exported(Ok(summary)) => {
                self.notifications.push(
                    NotificationKind::Success,
                    format!(
                        "Ranking exportado a {} ({} pacientes)",
                        summary.path.display(),
                        summary.rows
                    ),
                );
                Vec::new()
            }
            ConsoleEvent::Exported(Err(err)) => {
                tracing::warn!(error = %err, "export failed");
                let message = match err {
                    TriageError::Api(api) => api.user_message("Error al exportar"),
                    other => format!("Error al exportar: {other}"),
                };
                self.notifications.push(NotificationKind::Danger, message);
                Vec::new()
            }
        }
    }

    fn apply_ranking(&mut self, token: RefreshToken, result: Result<RankingSnapshot, ApiError>) {
        self.settled_token = self.settled_token.max(token);

        if token <= self.applied_token {
            tracing::debug!(token, applied = self.applied_token, "discarding stale ranking");
            return;
        }

        match result {
            Ok(snapshot) => {
                tracing::debug!(token, entries = snapshot.ranking.len(), "ranking applied");
                self.applied_token = token;
                self.charts = ChartData::from_snapshot(&snapshot.stats, &snapshot.ranking);
                self.ranking = snapshot.ranking;
                self.stats = snapshot.stats;
                self.refreshed_at = Some(Local::now());
            }
            Err(err) => {
                tracing::warn!(token, error = %err, "ranking refresh failed");
                self.notifications.push(
                    NotificationKind::Danger,
                    err.user_message("Error al obtener ranking"),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Sex, Symptoms};

    fn valid_draft() -> IntakeDraft {
        IntakeDraft {
            age: "54".into(),
            sex: "F".into(),
            systolic_bp: "120".into(),
            diastolic_bp: "80".into(),
            heart_rate: "75".into(),
            temperature: "36.5".into(),
            saturation: "97".into(),
            consciousness: "A".into(),
            hours_since_onset: "2".into(),
            symptoms: Symptoms::default(),
        }
    }

    fn sample_result() -> TriageResult {
        TriageResult {
            id: 7,
            nivel_triage: 1,
            color_triage: "Rojo".into(),
            riesgo_mortalidad: 0.42,
            ranking: 1,
            total_pacientes: 5,
        }
    }

    fn snapshot(attended: bool) -> RankingSnapshot {
        serde_json::from_value(serde_json::json!({
            "ranking": [{
                "posicion": 1, "id": 7, "nivel_triage": 1, "color_triage": "Rojo",
                "edad": 54, "sexo": "F", "riesgo_mortalidad": 0.42, "atendido": attended
            }],
            "stats": {"por_triage": {"1": 1}}
        }))
        .expect("Should build snapshot")
    }

    fn latest_message(console: &Console) -> Option<&str> {
        console
            .notifications
            .items()
            .first()
            .map(|n| n.message.as_str())
    }

    #[test]
    fn test_invalid_submit_issues_no_command() {
        let mut console = Console::default();
        let mut draft = valid_draft();
        draft.age.clear();
        draft.saturation = "49.9".into();

        assert!(console.submit(&draft).is_none());
        assert!(console.invalid_fields.contains(&IntakeField::Age));
        assert!(console.invalid_fields.contains(&IntakeField::Saturation));
        assert_eq!(console.notifications.items().len(), 1);
        assert_eq!(
            console.notifications.items()[0].kind,
            NotificationKind::Warning
        );
    }

    #[test]
    fn test_valid_submit_clears_flags() {
        let mut console = Console::default();
        let mut bad = valid_draft();
        bad.temperature = "29.9".into();
        assert!(console.submit(&bad).is_none());

        let command = console.submit(&valid_draft()).expect("Should submit");
        assert!(matches!(command, Command::Predict(ref form) if form.sexo == Sex::Female));
        assert!(console.invalid_fields.is_empty());
    }

    #[test]
    fn test_prediction_success_triggers_refresh() {
        let mut console = Console::default();
        let follow_up = console.apply(ConsoleEvent::Predicted(Ok(sample_result())));

        assert_eq!(follow_up, vec![Command::RefreshRanking(1)]);
        assert_eq!(console.result.as_ref().map(|r| r.id), Some(7));
        assert!(console.is_refreshing());
    }

    #[test]
    fn test_prediction_error_keeps_previous_result() {
        let mut console = Console::default();
        console.apply(ConsoleEvent::Predicted(Ok(sample_result())));

        let follow_up = console.apply(ConsoleEvent::Predicted(Err(ApiError::Server("x".into()))));
        assert!(follow_up.is_empty());
        assert_eq!(console.result, Some(sample_result()));
        assert_eq!(latest_message(&console), Some("Error: x"));
    }

    #[test]
    fn test_ranking_error_leaves_table_and_charts() {
        let mut console = Console::default();
        let Command::RefreshRanking(first) = console.refresh() else {
            panic!("expected refresh command");
        };
        console.apply(ConsoleEvent::RankingLoaded {
            token: first,
            result: Ok(snapshot(false)),
        });
        let charts = console.charts.clone();

        let Command::RefreshRanking(second) = console.refresh() else {
            panic!("expected refresh command");
        };
        console.apply(ConsoleEvent::RankingLoaded {
            token: second,
            result: Err(ApiError::Server("x".into())),
        });

        assert_eq!(console.ranking, snapshot(false).ranking);
        assert_eq!(console.charts, charts);
        assert_eq!(latest_message(&console), Some("Error: x"));
        assert!(!console.is_refreshing());
    }

    #[test]
    fn test_stale_ranking_is_discarded() {
        let mut console = Console::default();
        let Command::RefreshRanking(older) = console.refresh() else {
            panic!("expected refresh command");
        };
        let Command::RefreshRanking(newer) = console.refresh() else {
            panic!("expected refresh command");
        };

        console.apply(ConsoleEvent::RankingLoaded {
            token: newer,
            result: Ok(snapshot(true)),
        });
        console.apply(ConsoleEvent::RankingLoaded {
            token: older,
            result: Ok(snapshot(false)),
        });

        assert!(console.ranking[0].atendido);
    }

    #[test]
    fn test_older_response_applies_when_newer_has_not_arrived() {
        let mut console = Console::default();
        let Command::RefreshRanking(older) = console.refresh() else {
            panic!("expected refresh command");
        };
        let _newer = console.refresh();

        console.apply(ConsoleEvent::RankingLoaded {
            token: older,
            result: Ok(snapshot(false)),
        });
        assert_eq!(console.ranking.len(), 1);
        assert!(console.is_refreshing());
    }

    #[test]
    fn test_ranking_updates_charts() {
        let mut console = Console::default();
        let Command::RefreshRanking(token) = console.refresh() else {
            panic!("expected refresh command");
        };
        console.apply(ConsoleEvent::RankingLoaded {
            token,
            result: Ok(snapshot(false)),
        });

        assert_eq!(console.charts.distribution, [1, 0, 0, 0, 0]);
        assert!((console.charts.mean_risk[0] - 0.42).abs() < 1e-9);
        assert!(console.refreshed_at.is_some());
    }

    #[test]
    fn test_attendance_success_refreshes() {
        let mut console = Console::default();
        let follow_up = console.apply(ConsoleEvent::AttendanceMarked {
            patient_id: 7,
            result: Ok(()),
        });

        assert_eq!(follow_up, vec![Command::RefreshRanking(1)]);
        assert_eq!(latest_message(&console), Some("Paciente marcado como atendido"));
    }

    #[test]
    fn test_attendance_error_no_refresh() {
        let mut console = Console::default();
        let follow_up = console.apply(ConsoleEvent::AttendanceMarked {
            patient_id: 99,
            result: Err(ApiError::Server("Paciente no encontrado".into())),
        });

        assert!(follow_up.is_empty());
        assert_eq!(latest_message(&console), Some("Error: Paciente no encontrado"));
    }

    #[test]
    fn test_export_outcomes() {
        let mut console = Console::default();
        console.apply(ConsoleEvent::Exported(Ok(ExportSummary {
            path: "ranking_triage.csv".into(),
            rows: 2,
        })));
        assert_eq!(
            latest_message(&console),
            Some("Ranking exportado a ranking_triage.csv (2 pacientes)")
        );

        console.apply(ConsoleEvent::Exported(Err(TriageError::Api(
            ApiError::Transport("timed out".into()),
        ))));
        assert_eq!(latest_message(&console), Some("Error al exportar: timed out"));
    }
}
