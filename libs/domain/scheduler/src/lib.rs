// [libs/domain/scheduler/src/lib.rs]
/*!
 * =================================================================
 * APARATO: SCHEDULER (V1.0 - GROUND ZERO)
 * CLASIFICACIÓN: DOMAIN ARBITER (ESTRATO L1)
 * RESPONSABILIDAD: EXCLUSIÓN MUTUA ENTRE ESCANEO, CAPTURA Y ENUMERACIÓN
 *
 * VISION HIPER-HOLÍSTICA:
 * Un único registro protegido por mutex {active_capture,
 * enumeration_active, scan_process} con dos transiciones exportadas,
 * `pause_for_enumeration` y `resume_from_enumeration`, cada una
 * reteniendo el candado durante toda la transición — incluido el
 * desmontaje de los procesos hijos — para que ninguna interleaving sea
 * posible entre el bucle de escaneo, el motor de captura y la
 * enumeración (§5, §9).
 * =================================================================
 */

use async_trait::async_trait;
use pendonn_domain_models::CaptureSession;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{info, instrument};

/// Un proceso hijo que el scheduler puede terminar sin conocer su tipo
/// concreto. `capture-engine` y `scan-loop` implementan esto alrededor
/// de su propio `tokio::process::Child`, desacoplando a este crate de
/// `tokio::process`.
#[async_trait]
pub trait TerminableProcess: Send + Sync {
    async fn terminate(&self);
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchedulerError {
    #[error("a capture session is already active for bssid {0}")]
    CaptureAlreadyActive(String),
    #[error("enumeration is currently active; radio resources are seized")]
    EnumerationActive,
}

struct SchedulerRecord {
    active_capture: Option<CaptureSession>,
    enumeration_active: bool,
    scan_process: Option<Arc<dyn TerminableProcess>>,
    capture_process: Option<Arc<dyn TerminableProcess>>,
}

pub struct Scheduler {
    record: Mutex<SchedulerRecord>,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            record: Mutex::new(SchedulerRecord {
                active_capture: None,
                enumeration_active: false,
                scan_process: None,
                capture_process: None,
            }),
        }
    }

    pub async fn active_captures_count(&self) -> usize {
        self.record.lock().await.active_capture.is_some() as usize
    }

    pub async fn is_enumeration_active(&self) -> bool {
        self.record.lock().await.enumeration_active
    }

    /// Precondición del bucle de escaneo (§4.E.1, §5): el NIC de monitor
    /// debe estar libre de captura y la enumeración no debe estar activa.
    pub async fn scan_loop_may_proceed(&self) -> bool {
        let record = self.record.lock().await;
        !record.enumeration_active && record.active_capture.is_none()
    }

    pub async fn register_scan_process(&self, process: Arc<dyn TerminableProcess>) {
        self.record.lock().await.scan_process = Some(process);
    }

    pub async fn clear_scan_process(&self) {
        self.record.lock().await.scan_process = None;
    }

    pub async fn current_capture_bssid(&self) -> Option<String> {
        self.record.lock().await.active_capture.as_ref().map(|session| session.bssid.clone())
    }

    /// Admite la nueva sesión de captura solo si ninguna otra está activa
    /// y la enumeración no ha seizado los recursos de radio.
    #[instrument(skip(self, session, process))]
    pub async fn try_start_capture(
        &self,
        session: CaptureSession,
        process: Arc<dyn TerminableProcess>,
    ) -> Result<(), SchedulerError> {
        let mut record = self.record.lock().await;
        if record.enumeration_active {
            return Err(SchedulerError::EnumerationActive);
        }
        if let Some(existing) = &record.active_capture {
            return Err(SchedulerError::CaptureAlreadyActive(existing.bssid.clone()));
        }
        record.active_capture = Some(session);
        record.capture_process = Some(process);
        Ok(())
    }

    pub async fn finish_capture(&self) {
        let mut record = self.record.lock().await;
        record.active_capture = None;
        record.capture_process = None;
    }

    /// §5: "Calling `pause_for_enumeration` atomically sets a flag, kills
    /// the scan child, and terminates all capture children." The lock is
    /// held for the entire transition, including both terminations.
    #[instrument(skip(self))]
    pub async fn pause_for_enumeration(&self) {
        let mut record = self.record.lock().await;
        record.enumeration_active = true;

        if let Some(scan_process) = record.scan_process.take() {
            scan_process.terminate().await;
        }
        if let Some(capture_process) = record.capture_process.take() {
            capture_process.terminate().await;
        }
        record.active_capture = None;

        info!("🛑 [SCHEDULER]: radio resources seized for enumeration.");
    }

    #[instrument(skip(self))]
    pub async fn resume_from_enumeration(&self) {
        let mut record = self.record.lock().await;
        record.enumeration_active = false;
        info!("▶️  [SCHEDULER]: radio resources released back to scan loop / capture engine.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingProcess(Arc<AtomicUsize>);

    #[async_trait]
    impl TerminableProcess for CountingProcess {
        async fn terminate(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn sample_session() -> CaptureSession {
        CaptureSession::new("aa:bb:cc:dd:ee:01", "TestNet", 6, "/tmp/base", Utc::now())
    }

    #[tokio::test]
    async fn at_most_one_capture_session_may_be_active() {
        let scheduler = Scheduler::new();
        let terminations = Arc::new(AtomicUsize::new(0));
        let process = Arc::new(CountingProcess(terminations.clone()));

        scheduler.try_start_capture(sample_session(), process.clone()).await.unwrap();
        assert_eq!(scheduler.active_captures_count().await, 1);

        let result = scheduler.try_start_capture(sample_session(), process).await;
        assert_eq!(result, Err(SchedulerError::CaptureAlreadyActive("aa:bb:cc:dd:ee:01".to_string())));
    }

    #[tokio::test]
    async fn pause_for_enumeration_terminates_both_children_and_clears_active_capture() {
        let scheduler = Scheduler::new();
        let terminations = Arc::new(AtomicUsize::new(0));
        let capture_process = Arc::new(CountingProcess(terminations.clone()));
        let scan_process = Arc::new(CountingProcess(terminations.clone()));

        scheduler.try_start_capture(sample_session(), capture_process).await.unwrap();
        scheduler.register_scan_process(scan_process).await;

        scheduler.pause_for_enumeration().await;

        assert_eq!(terminations.load(Ordering::SeqCst), 2);
        assert_eq!(scheduler.active_captures_count().await, 0);
        assert!(scheduler.is_enumeration_active().await);
        assert!(!scheduler.scan_loop_may_proceed().await);
    }

    #[tokio::test]
    async fn capture_cannot_start_while_enumeration_is_active() {
        let scheduler = Scheduler::new();
        scheduler.pause_for_enumeration().await;

        let terminations = Arc::new(AtomicUsize::new(0));
        let process = Arc::new(CountingProcess(terminations));
        let result = scheduler.try_start_capture(sample_session(), process).await;
        assert_eq!(result, Err(SchedulerError::EnumerationActive));

        scheduler.resume_from_enumeration().await;
        assert!(scheduler.scan_loop_may_proceed().await);
    }
}
