//! Background request worker.
//!
//! Every command runs on its own thread so the render loop never blocks on
//! the network. Completions come back over a single channel, in arrival
//! order; ordering between requests is not guaranteed.

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use crate::application::{Command, CommandExecutor, ConsoleEvent};
use crate::ports::TriageApi;

/// Dispatches commands to background threads and collects their events.
pub struct RequestWorker<A>
where
    A: TriageApi + 'static,
{
    executor: CommandExecutor<A>,
    event_tx: Sender<ConsoleEvent>,
    event_rx: Receiver<ConsoleEvent>,
    in_flight: usize,
}

impl<A> RequestWorker<A>
where
    A: TriageApi + 'static,
{
    #[must_use]
    pub fn new(executor: CommandExecutor<A>) -> Self {
        let (event_tx, event_rx) = mpsc::channel();
        Self {
            executor,
            event_tx,
            event_rx,
            in_flight: 0,
        }
    }

    /// Run `command` on a new thread.
    pub fn dispatch(&mut self, command: Command) {
        let executor = self.executor.clone();
        let tx = self.event_tx.clone();
        self.in_flight += 1;

        thread::spawn(move || {
            let event = executor.execute(command);
            // The receiver is gone only when the app is shutting down.
            let _ = tx.send(event);
        });
    }

    /// Next completed event, if any (non-blocking).
    pub fn try_recv(&mut self) -> Option<ConsoleEvent> {
        let event = self.event_rx.try_recv().ok();
        if event.is_some() {
            self.in_flight = self.in_flight.saturating_sub(1);
        }
        event
    }

    /// Number of dispatched commands not yet received.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    #[cfg(test)]
    pub(crate) fn recv_timeout(&mut self, timeout: std::time::Duration) -> Option<ConsoleEvent> {
        let event = self.event_rx.recv_timeout(timeout).ok();
        if event.is_some() {
            self.in_flight = self.in_flight.saturating_sub(1);
        }
        event
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory scoring server shared by the TUI tests.

    use std::sync::Mutex;

    use crate::domain::{IntakeForm, RankingEntry, RankingSnapshot, TriageResult, TriageStats};
    use crate::ports::{ApiError, TriageApi};

    #[derive(Default)]
    pub struct StubApi {
        pub patients: Mutex<Vec<RankingEntry>>,
        pub fail_with: Option<ApiError>,
    }

    impl TriageApi for StubApi {
        fn predict(&self, form: &IntakeForm) -> Result<TriageResult, ApiError> {
            if let Some(err) = &self.fail_with {
                return Err(err.clone());
            }
            let mut patients = self.patients.lock().expect("patients lock");
            let id = patients.len() as u64 + 1;
            patients.push(RankingEntry {
                posicion: id as u32,
                id,
                nivel_triage: 1,
                color_triage: "Rojo".into(),
                edad: form.edad.to_string(),
                sexo: Some(form.sexo),
                riesgo_mortalidad: 0.42,
                atendido: false,
            });
            Ok(TriageResult {
                id,
                nivel_triage: 1,
                color_triage: "Rojo".into(),
                riesgo_mortalidad: 0.42,
                ranking: 1,
                total_pacientes: patients.len() as u32,
            })
        }

        fn ranking(&self) -> Result<RankingSnapshot, ApiError> {
            if let Some(err) = &self.fail_with {
                return Err(err.clone());
            }
            let ranking = self.patients.lock().expect("patients lock").clone();
            let mut stats = TriageStats::default();
            for entry in &ranking {
                *stats
                    .por_triage
                    .entry(entry.nivel_triage.to_string())
                    .or_insert(0) += 1;
            }
            Ok(RankingSnapshot { ranking, stats })
        }

        fn mark_attended(&self, patient_id: u64) -> Result<(), ApiError> {
            if let Some(err) = &self.fail_with {
                return Err(err.clone());
            }
            let mut patients = self.patients.lock().expect("patients lock");
            match patients.iter_mut().find(|p| p.id == patient_id) {
                Some(p) => {
                    p.atendido = true;
                    Ok(())
                }
                None => Err(ApiError::Server("Paciente no encontrado".into())),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::StubApi;
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn test_dispatch_delivers_event() {
        let executor = CommandExecutor::new(Arc::new(StubApi::default()), "unused.csv");
        let mut worker = RequestWorker::new(executor);

        worker.dispatch(Command::RefreshRanking(1));
        assert_eq!(worker.in_flight(), 1);

        let event = worker
            .recv_timeout(Duration::from_secs(5))
            .expect("Worker should answer");
        assert!(matches!(
            event,
            ConsoleEvent::RankingLoaded { token: 1, result: Ok(_) }
        ));
        assert_eq!(worker.in_flight(), 0);
        assert!(worker.try_recv().is_none());
    }

    #[test]
    fn test_concurrent_dispatches_all_complete() {
        let executor = CommandExecutor::new(Arc::new(StubApi::default()), "unused.csv");
        let mut worker = RequestWorker::new(executor);

        for token in 1..=3 {
            worker.dispatch(Command::RefreshRanking(token));
        }

        let mut tokens = Vec::new();
        while let Some(event) = worker.recv_timeout(Duration::from_secs(5)) {
            if let ConsoleEvent::RankingLoaded { token, .. } = event {
                tokens.push(token);
            }
            if worker.in_flight() == 0 {
                break;
            }
        }
        tokens.sort_unstable();
        assert_eq!(tokens, vec![1, 2, 3]);
    }
}
