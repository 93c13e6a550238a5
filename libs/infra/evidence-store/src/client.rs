// [libs/infra/evidence-store/src/client.rs]
/*!
 * =================================================================
 * APARATO: EVIDENCE STORE CLIENT (V1.0 - GROUND ZERO)
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER (ESTRATO L3)
 * RESPONSABILIDAD: GESTIÓN DE ENLACES Y PERSISTENCIA DEL LEDGER
 *
 * En modo memoria (rutas con `mode=memory&cache=shared`, usado por la
 * suite de pruebas) se mantiene una conexión ancla viva durante toda la
 * vida del cliente para que SQLite no purgue el esquema entre hilos.
 * =================================================================
 */

use crate::errors::EvidenceStoreError;
use crate::schema::apply_schema;
use libsql::{Builder, Connection, Database};
use std::sync::Arc;
use tracing::{info, error, instrument};

#[derive(Clone)]
pub struct EvidenceStoreClient {
    driver: Arc<Database>,
    _memory_anchor: Option<Arc<Connection>>,
}

impl EvidenceStoreClient {
    #[instrument]
    pub async fn connect(database_path: &str) -> Result<Self, EvidenceStoreError> {
        if database_path.is_empty() {
            return Err(EvidenceStoreError::ConnectionError("store path is empty".into()));
        }

        info!("🔌 [EVIDENCE_STORE]: opening ledger at [{}]", database_path);

        let is_memory = database_path.contains(":memory:") || database_path.contains("mode=memory");

        let driver = Builder::new_local(database_path)
            .build()
            .await
            .map_err(|e| EvidenceStoreError::ConnectionError(e.to_string()))?;

        let shared_driver = Arc::new(driver);
        let mut anchor = None;

        if is_memory {
            let anchor_conn = shared_driver
                .connect()
                .map_err(|e| EvidenceStoreError::ConnectionError(e.to_string()))?;
            apply_schema(&anchor_conn).await?;
            anchor = Some(Arc::new(anchor_conn));
        } else {
            let bootstrap_conn = shared_driver
                .connect()
                .map_err(|e| EvidenceStoreError::ConnectionError(e.to_string()))?;
            apply_schema(&bootstrap_conn).await?;
        }

        Ok(Self { driver: shared_driver, _memory_anchor: anchor })
    }

    pub fn connection(&self) -> Result<Connection, EvidenceStoreError> {
        self.driver.connect().map_err(|e| {
            error!("⚠️  [EVIDENCE_STORE]: connection allocation failed: {}", e);
            EvidenceStoreError::ConnectionError(e.to_string())
        })
    }
}
