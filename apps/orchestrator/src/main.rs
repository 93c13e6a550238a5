// [apps/orchestrator/src/main.rs]
/*!
 * =================================================================
 * APARATO: ORCHESTRATOR MAIN ENTRY POINT (V1.0 - GROUND ZERO)
 * CLASIFICACIÓN: APPLICATION SHELL (ESTRATO L4)
 * RESPONSABILIDAD: BOOTSTRAP DE ENTORNO, CONFIGURACIÓN E IGNICIÓN
 *
 * Switchboard puro: carga `.env`, inicializa telemetría, parsea
 * directivas y configuración, instala el manejador de señales, y
 * delega toda la operación al `OrchestratorKernel`. La elección entre
 * `DefaultExec` y `MockExec` (§1.4 "dry-run") es el único punto donde
 * este binario se monomorfiza sobre el parámetro genérico `E: Exec`.
 * =================================================================
 */

use anyhow::{Context, Result};
use clap::Parser;
use pendonn_domain_models::Config;
use pendonn_infra_tool_adapter::{DefaultExec, Exec, MockExec};
use pendonn_orchestrator::cli::Directives;
use pendonn_orchestrator::kernel::OrchestratorKernel;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    pendonn_shared_telemetry::init_tracing("pendonn_orchestrator");

    let directives = Directives::parse();
    let mut config = load_config(&directives.config).await?;

    if let Some(data_dir) = &directives.data_dir {
        config.general.data_dir = data_dir.clone();
    }
    config.dry_run = directives.dry_run;

    if let Err(error) = config.validate() {
        error!("❌ [BOOTSTRAP]: configuration invalid: {}", error);
        std::process::exit(1);
    }

    let shutdown = install_signal_handlers()?;

    if config.dry_run {
        info!("🧪 [BOOTSTRAP]: dry-run mode — routing through MockExec, no subprocesses will be spawned.");
        run_with_exec(Arc::new(MockExec::new()), config, shutdown).await
    } else {
        run_with_exec(Arc::new(DefaultExec), config, shutdown).await
    }
}

async fn load_config(path: &str) -> Result<Config> {
    let contents = tokio::fs::read_to_string(path).await.with_context(|| format!("reading configuration file at {path}"))?;
    toml::from_str(&contents).with_context(|| format!("parsing configuration file at {path}"))
}

/// Un único `watch` compartido entre SIGINT y SIGTERM (§6 "Signals"):
/// cualquiera de los dos marca el apagado cooperativo que cada bucle de
/// larga duración observa en su propio `tokio::select!`.
fn install_signal_handlers() -> Result<watch::Receiver<bool>> {
    let (sender, receiver) = watch::channel(false);
    ctrlc::set_handler(move || {
        warn!("⚠️  [SIGNAL]: shutdown requested, sealing current operations...");
        let _ = sender.send(true);
    })
    .context("installing SIGINT/SIGTERM handler")?;
    Ok(receiver)
}

async fn run_with_exec<E: Exec + 'static>(exec: Arc<E>, config: Config, shutdown: watch::Receiver<bool>) -> Result<()> {
    let kernel = OrchestratorKernel::ignite(exec, &config, Vec::new()).await?;
    kernel.run(shutdown).await
}
