// [libs/domain/crack-pool/src/lib.rs]
/*!
 * =================================================================
 * APARATO: CRACK POOL (V1.0 - GROUND ZERO)
 * CLASIFICACIÓN: DOMAIN CORE (ESTRATO L1)
 * RESPONSABILIDAD: POOL ACOTADO DE TRABAJADORES DE CRACKING
 *
 * VISION HIPER-HOLÍSTICA:
 * Un monitor de ingesta puebla una cola acotada desde
 * `pending_handshakes()`, deduplicando por BSSID; un número fijo de
 * workers la drena en paralelo, cada uno corriendo la cascada de
 * motores del §4.F hasta que uno produzca una contraseña o todos
 * fallen (§4.F).
 * =================================================================
 */

pub mod engine;
pub mod errors;

pub use errors::CrackPoolError;

use pendonn_domain_models::{Handshake, HandshakeStatus};
use pendonn_infra_evidence_store::EvidenceStore;
use pendonn_infra_tool_adapter::Exec;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch, Mutex};
use tracing::{info, instrument, warn};

const INTAKE_POLL_INTERVAL: Duration = Duration::from_secs(10);
const QUEUE_CAPACITY: usize = 64;
const CAP_FILE_WAIT_TIMEOUT: Duration = Duration::from_secs(10);
const CAP_FILE_POLL_INTERVAL: Duration = Duration::from_millis(500);
const CAP_FILE_MIN_BYTES: u64 = 1024;

pub struct CrackPool<E: Exec> {
    exec: Arc<E>,
    store: EvidenceStore,
    engines: Vec<String>,
    wordlist_path: String,
    john_format: String,
    hashcat_mode: u32,
    worker_count: usize,
    in_flight: Arc<Mutex<HashSet<String>>>,
}

impl<E: Exec + 'static> CrackPool<E> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        exec: Arc<E>,
        store: EvidenceStore,
        engines: Vec<String>,
        wordlist_path: impl Into<String>,
        john_format: impl Into<String>,
        hashcat_mode: u32,
        worker_count: usize,
    ) -> Self {
        Self {
            exec,
            store,
            engines,
            wordlist_path: wordlist_path.into(),
            john_format: john_format.into(),
            hashcat_mode,
            worker_count: worker_count.max(1),
            in_flight: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Corre el monitor de ingesta y el conjunto de workers hasta que
    /// `shutdown` anuncia apagado cooperativo. Cada invocación de
    /// herramienta corre con `kill_on_drop` (§4.C), así que cancelar
    /// una tarea libera cualquier proceso de cracking en vuelo sin
    /// necesitar un manejador de proceso separado por worker.
    pub async fn run(self: Arc<Self>, shutdown: watch::Receiver<bool>) {
        let (sender, receiver) = mpsc::channel::<Handshake>(QUEUE_CAPACITY);
        let receiver = Arc::new(Mutex::new(receiver));
        let mut handles = Vec::new();

        let intake_pool = self.clone();
        let mut intake_shutdown = shutdown.clone();
        handles.push(tokio::spawn(async move {
            intake_pool.run_intake(sender, &mut intake_shutdown).await;
        }));

        for worker_id in 0..self.worker_count {
            let worker_pool = self.clone();
            let worker_receiver = receiver.clone();
            let mut worker_shutdown = shutdown.clone();
            handles.push(tokio::spawn(async move {
                worker_pool.run_worker(worker_id, worker_receiver, &mut worker_shutdown).await;
            }));
        }

        for handle in handles {
            let _ = handle.await;
        }
    }

    #[instrument(skip_all)]
    async fn run_intake(&self, sender: mpsc::Sender<Handshake>, shutdown: &mut watch::Receiver<bool>) {
        loop {
            if *shutdown.borrow() {
                info!("🛑 [CRACK_POOL]: intake monitor stopping.");
                return;
            }
            if let Err(error) = self.poll_and_enqueue(&sender).await {
                warn!("⚠️  [CRACK_POOL]: intake poll failed: {}", error);
            }
            tokio::select! {
                _ = tokio::time::sleep(INTAKE_POLL_INTERVAL) => {}
                _ = shutdown.changed() => {}
            }
        }
    }

    /// Encola cada handshake pendiente cuyo BSSID no esté ya en vuelo
    /// ni tenga una `CrackedKey` almacenada — la clave por BSSID evita
    /// que pollings repetidos reencolen el mismo objetivo (§4.F).
    async fn poll_and_enqueue(&self, sender: &mpsc::Sender<Handshake>) -> Result<(), CrackPoolError> {
        let pending = self.store.pending_handshakes().await?;
        for handshake in pending {
            let mut in_flight = self.in_flight.lock().await;
            if in_flight.contains(&handshake.bssid) {
                continue;
            }
            if self.store.key_for(&handshake.bssid).await?.is_some() {
                continue;
            }
            in_flight.insert(handshake.bssid.clone());
            drop(in_flight);

            if sender.send(handshake.clone()).await.is_err() {
                self.in_flight.lock().await.remove(&handshake.bssid);
                return Ok(());
            }
            info!("📥 [CRACK_POOL]: enqueued {} for cracking.", handshake.bssid);
        }
        Ok(())
    }

    #[instrument(skip_all, fields(worker = worker_id))]
    async fn run_worker(&self, worker_id: usize, receiver: Arc<Mutex<mpsc::Receiver<Handshake>>>, shutdown: &mut watch::Receiver<bool>) {
        loop {
            if *shutdown.borrow() {
                return;
            }
            let next = tokio::select! {
                item = async { receiver.lock().await.recv().await } => item,
                _ = shutdown.changed() => return,
            };
            let Some(handshake) = next else { return };

            let bssid = handshake.bssid.clone();
            let handshake_id = handshake.id;
            if let Err(error) = self.crack_one(handshake).await {
                warn!("⚠️  [CRACK_POOL]: worker {} failed cracking {}: {}", worker_id, bssid, error);
                if let Err(store_error) = self.store.set_handshake_status(handshake_id, HandshakeStatus::Failed).await {
                    warn!("⚠️  [CRACK_POOL]: could not mark {} as failed after a fatal error: {}", bssid, store_error);
                }
            }
            self.in_flight.lock().await.remove(&bssid);
        }
    }

    /// Procesa un único handshake a través de la cascada de motores
    /// configurada (§4.F): espera el archivo de captura, prueba cada
    /// motor en orden, y se detiene en el primero que produzca una
    /// contraseña no vacía.
    #[instrument(skip(self, handshake), fields(bssid = %handshake.bssid))]
    async fn crack_one(&self, handshake: Handshake) -> Result<(), CrackPoolError> {
        self.store.set_handshake_status(handshake.id, HandshakeStatus::Cracking).await?;

        if !self.wait_for_capture_file(&handshake.file_path).await {
            warn!("⚠️  [CRACK_POOL]: capture file for {} never reached {} bytes.", handshake.bssid, CAP_FILE_MIN_BYTES);
            self.store.set_handshake_status(handshake.id, HandshakeStatus::Failed).await?;
            return Ok(());
        }

        let started_at = std::time::Instant::now();
        for engine_name in &self.engines {
            let found = match engine_name.as_str() {
                "john" => engine::crack_with_john(self.exec.as_ref(), &handshake.file_path, &handshake.ssid, &self.john_format).await?,
                "hashcat" => engine::crack_with_hashcat(self.exec.as_ref(), &handshake.file_path, &self.wordlist_path, self.hashcat_mode).await?,
                "aircrack-ng" => engine::crack_with_aircrack(self.exec.as_ref(), &handshake.file_path, &handshake.bssid, &self.wordlist_path).await?,
                other => {
                    warn!("⚠️  [CRACK_POOL]: unrecognized engine '{}', skipping.", other);
                    None
                }
            };

            if let Some(password) = found {
                let crack_time_seconds = started_at.elapsed().as_secs() as i64;
                self.store.insert_cracked_key(handshake.id, &handshake.bssid, &handshake.ssid, &password, engine_name, crack_time_seconds).await?;
                info!("🔓 [CRACK_POOL]: {} cracked by {} in {}s.", handshake.bssid, engine_name, crack_time_seconds);
                return Ok(());
            }
        }

        info!("💀 [CRACK_POOL]: all engines exhausted for {}, marking failed.", handshake.bssid);
        self.store.set_handshake_status(handshake.id, HandshakeStatus::Failed).await?;
        Ok(())
    }

    /// Hasta 10 segundos esperando a que el artefacto de captura exista
    /// y pese al menos 1 KB (§4.F step 3).
    async fn wait_for_capture_file(&self, file_path: &str) -> bool {
        let deadline = tokio::time::Instant::now() + CAP_FILE_WAIT_TIMEOUT;
        loop {
            if let Ok(metadata) = tokio::fs::metadata(file_path).await {
                if metadata.len() >= CAP_FILE_MIN_BYTES {
                    return true;
                }
            }
            if tokio::time::Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(CAP_FILE_POLL_INTERVAL).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pendonn_domain_models::{Encryption, HandshakeQuality};
    use pendonn_infra_tool_adapter::{CommandOutput, MockExec};
    use tempfile::tempdir;

    async fn memory_store() -> EvidenceStore {
        EvidenceStore::connect("file::memory:?cache=shared&mode=memory").await.unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn wait_for_capture_file_gives_up_after_the_ceiling() {
        let exec = Arc::new(MockExec::new());
        let store = memory_store().await;
        let pool = CrackPool::new(exec, store, vec!["aircrack-ng".to_string()], "/wordlists/rockyou.txt", "wpapsk-opencl", 22000, 1);

        let handle = tokio::spawn(async move { pool.wait_for_capture_file("/no/such/file.cap").await });
        tokio::time::advance(Duration::from_secs(20)).await;
        assert!(!handle.await.unwrap());
    }

    #[tokio::test]
    async fn wait_for_capture_file_succeeds_once_the_file_is_large_enough() {
        let exec = Arc::new(MockExec::new());
        let store = memory_store().await;
        let tmp = tempdir().unwrap();
        let cap_path = tmp.path().join("h.cap");
        tokio::fs::write(&cap_path, vec![0u8; 2048]).await.unwrap();

        let pool = CrackPool::new(exec, store, vec!["aircrack-ng".to_string()], "/wordlists/rockyou.txt", "wpapsk-opencl", 22000, 1);
        assert!(pool.wait_for_capture_file(cap_path.to_str().unwrap()).await);
    }

    #[tokio::test]
    async fn crack_one_inserts_a_cracked_key_when_an_engine_succeeds() {
        let exec = Arc::new(MockExec::new());
        exec.set_response("aircrack-ng", CommandOutput { exit_code: 0, stdout: "KEY FOUND! [ hunter2 ]\n".to_string(), ..Default::default() });

        let store = memory_store().await;
        let tmp = tempdir().unwrap();
        let cap_path = tmp.path().join("h.cap");
        tokio::fs::write(&cap_path, vec![0u8; 2048]).await.unwrap();

        let network_id = store.upsert_network("TestNet", "aa:bb:cc:dd:ee:01", 6, Encryption::Wpa2, -40).await.unwrap();
        let handshake_id = store
            .insert_handshake(network_id, "aa:bb:cc:dd:ee:01", "TestNet", cap_path.to_str().unwrap(), HandshakeQuality::Good)
            .await
            .unwrap();

        let pool = CrackPool::new(exec, store.clone(), vec!["aircrack-ng".to_string()], "/wordlists/rockyou.txt", "wpapsk-opencl", 22000, 1);
        let handshake = Handshake {
            id: handshake_id,
            network_id,
            bssid: "aa:bb:cc:dd:ee:01".to_string(),
            ssid: "TestNet".to_string(),
            file_path: cap_path.to_str().unwrap().to_string(),
            capture_date: chrono::Utc::now(),
            status: HandshakeStatus::Pending,
            quality: HandshakeQuality::Good,
        };
        pool.crack_one(handshake).await.unwrap();

        assert_eq!(store.key_for("aa:bb:cc:dd:ee:01").await.unwrap(), Some("hunter2".to_string()));
    }

    #[tokio::test]
    async fn crack_one_falls_through_to_the_next_engine_when_the_first_is_missing() {
        let exec = Arc::new(MockExec::new());
        // the john engine's first step (hcx2john) is unavailable on this host.
        exec.set_error("hcx2john", pendonn_infra_tool_adapter::ToolAdapterError::ToolMissing("hcx2john".to_string()));
        exec.set_response("aircrack-ng", CommandOutput { exit_code: 0, stdout: "KEY FOUND! [ hunter2 ]\n".to_string(), ..Default::default() });

        let store = memory_store().await;
        let tmp = tempdir().unwrap();
        let cap_path = tmp.path().join("h.cap");
        tokio::fs::write(&cap_path, vec![0u8; 2048]).await.unwrap();

        let network_id = store.upsert_network("TestNet", "aa:bb:cc:dd:ee:01", 6, Encryption::Wpa2, -40).await.unwrap();
        let handshake_id = store
            .insert_handshake(network_id, "aa:bb:cc:dd:ee:01", "TestNet", cap_path.to_str().unwrap(), HandshakeQuality::Good)
            .await
            .unwrap();

        let pool = CrackPool::new(
            exec,
            store.clone(),
            vec!["john".to_string(), "aircrack-ng".to_string()],
            "/wordlists/rockyou.txt",
            "wpapsk-opencl",
            22000,
            1,
        );
        let handshake = Handshake {
            id: handshake_id,
            network_id,
            bssid: "aa:bb:cc:dd:ee:01".to_string(),
            ssid: "TestNet".to_string(),
            file_path: cap_path.to_str().unwrap().to_string(),
            capture_date: chrono::Utc::now(),
            status: HandshakeStatus::Pending,
            quality: HandshakeQuality::Good,
        };
        pool.crack_one(handshake).await.unwrap();

        assert_eq!(store.key_for("aa:bb:cc:dd:ee:01").await.unwrap(), Some("hunter2".to_string()));
        let key = store.list_cracked_keys().await.unwrap().into_iter().find(|key| key.bssid == "aa:bb:cc:dd:ee:01").unwrap();
        assert_eq!(key.engine, "aircrack-ng", "the cascade must fall through to the fallback engine, not get stuck on the missing one");
    }

    #[tokio::test]
    async fn poll_and_enqueue_skips_bssids_already_in_flight_or_already_cracked() {
        let exec = Arc::new(MockExec::new());
        let store = memory_store().await;
        let network_id = store.upsert_network("TestNet", "aa:bb:cc:dd:ee:01", 6, Encryption::Wpa2, -40).await.unwrap();
        let handshake_id = store.insert_handshake(network_id, "aa:bb:cc:dd:ee:01", "TestNet", "/tmp/h.cap", HandshakeQuality::Good).await.unwrap();

        let pool = CrackPool::new(exec, store.clone(), vec!["aircrack-ng".to_string()], "/wordlists/rockyou.txt", "wpapsk-opencl", 22000, 1);
        let (sender, mut receiver) = mpsc::channel::<Handshake>(QUEUE_CAPACITY);
        pool.poll_and_enqueue(&sender).await.unwrap();
        assert!(receiver.try_recv().is_ok());

        // a second poll must not re-enqueue the now-in-flight bssid.
        pool.poll_and_enqueue(&sender).await.unwrap();
        assert!(receiver.try_recv().is_err());

        store.set_handshake_status(handshake_id, HandshakeStatus::Cracking).await.unwrap();
        store.insert_cracked_key(handshake_id, "aa:bb:cc:dd:ee:01", "TestNet", "hunter2", "aircrack-ng", 1).await.unwrap();
        pool.in_flight.lock().await.clear();

        // now cracked — must not be re-enqueued even once in_flight is cleared.
        pool.poll_and_enqueue(&sender).await.unwrap();
        assert!(receiver.try_recv().is_err());
    }
}
