// [apps/orchestrator/src/lib.rs]
/*!
 * =================================================================
 * APARATO: ORCHESTRATOR LIBRARY ROOT (V1.0 - GROUND ZERO)
 * CLASIFICACIÓN: CRATE ROOT (ESTRATO L4)
 * RESPONSABILIDAD: DEFINICIÓN DEL ÁRBOL DE MÓDULOS DEL ORQUESTADOR
 * =================================================================
 */

pub mod cli;
pub mod kernel;

pub mod prelude {
    pub use crate::cli::Directives;
    pub use crate::kernel::OrchestratorKernel;
}
