//! Command executor: runs console commands against the scoring server.

use std::path::PathBuf;
use std::sync::Arc;

use super::console::{Command, ConsoleEvent};
use super::export;
use crate::ports::TriageApi;

/// Executes [`Command`]s against a [`TriageApi`].
///
/// Blocking; the TUI calls it from worker threads.
pub struct CommandExecutor<A>
where
    A: TriageApi,
{
    api: Arc<A>,
    export_path: PathBuf,
}

impl<A> Clone for CommandExecutor<A>
where
    A: TriageApi,
{
    fn clone(&self) -> Self {
        Self {
            api: self.api.clone(),
            export_path: self.export_path.clone(),
        }
    }
}

impl<A> CommandExecutor<A>
where
    A: TriageApi,
{
    pub fn new(api: Arc<A>, export_path: impl Into<PathBuf>) -> Self {
        Self {
            api,
            export_path: export_path.into(),
        }
    }

    /// Run one command to completion.
    pub fn execute(&self, command: Command) -> ConsoleEvent {
        match command {
            Command::Predict(form) => ConsoleEvent::Predicted(self.api.predict(&form)),
            Command::RefreshRanking(token) => ConsoleEvent::RankingLoaded {
                token,
                result: self.api.ranking(),
            },
            Command::MarkAttended(patient_id) => ConsoleEvent::AttendanceMarked {
                patient_id,
                result: self.api.mark_attended(patient_id),
            },
            Command::Export => {
                // Always export what the server holds now, not the rendered table.
                let result = self
                    .api
                    .ranking()
                    .map_err(crate::TriageError::from)
                    .and_then(|snapshot| export::write_csv(&self.export_path, &snapshot.ranking));
                ConsoleEvent::Exported(result)
            }
        }
    }
}
