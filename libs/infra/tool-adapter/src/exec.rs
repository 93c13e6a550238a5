// [libs/infra/tool-adapter/src/exec.rs]
/*!
 * Fachada uniforme de ejecución de subprocesos (§4.C). Cada herramienta
 * externa se invoca a través de este mismo contrato, que devuelve
 * código de salida, stdout, stderr y tiempo transcurrido sin pánico
 * nunca — la clasificación de fallos es responsabilidad de los
 * parsers, no del ejecutor.
 *
 * Grounded on `containers-containrs`'s `Exec`/`DefaultExec` trait-object
 * seam, generalized here with a timeout and a dry-run mock so the
 * scheduler/state-machine wiring can be exercised without root
 * privileges or real wireless adapters installed (§1.4).
 */

use crate::errors::ToolAdapterError;
use async_trait::async_trait;
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use std::collections::HashMap;
use std::process::Stdio;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::io::{AsyncWriteExt, AsyncReadExt};
use tokio::process::{Child, Command};
use tracing::{instrument, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    pub elapsed: Duration,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

#[async_trait]
pub trait Exec: Send + Sync {
    /// Ejecuta `argv[0]` con `argv[1..]` como argumentos. `stdin`, si se
    /// provee, se escribe y se cierra antes de esperar la salida.
    /// Se cancela con `Timeout` si excede `timeout`.
    async fn run(
        &self,
        argv: &[String],
        timeout: Duration,
        stdin: Option<&[u8]>,
    ) -> Result<CommandOutput, ToolAdapterError>;

    /// Lanza `argv` sin esperar su finalización — usado por la máquina de
    /// captura para `airodump-ng`, que corre en segundo plano mientras el
    /// resto de la máquina de estados envía deauths y sondea la
    /// verificación (§4.D). El proceso devuelto se termina explícitamente
    /// vía `SpawnedProcess::terminate`.
    async fn spawn(&self, argv: &[String]) -> Result<Box<dyn SpawnedProcess>, ToolAdapterError>;
}

/// Un proceso hijo lanzado en segundo plano. Separado del contrato
/// `TerminableProcess` del scheduler (que este crate no conoce) — los
/// crates que sí dependen del scheduler envuelven esto en un adaptador
/// que implementa ese trait.
#[async_trait]
pub trait SpawnedProcess: Send + Sync {
    /// `false` una vez que el proceso ha salido por cualquier razón.
    async fn is_alive(&self) -> bool;

    /// SIGTERM, y si el proceso sigue vivo pasado `grace`, SIGKILL. Nunca
    /// falla: un proceso ya muerto es un no-op silencioso.
    async fn terminate(&self, grace: Duration);
}

struct TokioSpawnedProcess {
    child: Mutex<Child>,
}

#[async_trait]
impl SpawnedProcess for TokioSpawnedProcess {
    async fn is_alive(&self) -> bool {
        matches!(self.child.lock().unwrap().try_wait(), Ok(None))
    }

    async fn terminate(&self, grace: Duration) {
        let pid = self.child.lock().unwrap().id();
        let Some(pid) = pid else { return };

        let _ = kill(Pid::from_raw(pid as i32), Signal::SIGTERM);
        tokio::time::sleep(grace).await;

        if self.is_alive().await {
            warn!("💀 [TOOL_ADAPTER]: pid {} ignored SIGTERM, sending SIGKILL.", pid);
            let _ = self.child.lock().unwrap().start_kill();
        }
        let _ = self.child.lock().unwrap().try_wait();
    }
}

#[derive(Debug, Clone, Default)]
pub struct DefaultExec;

#[async_trait]
impl Exec for DefaultExec {
    #[instrument(skip(self, stdin), fields(tool = %argv.first().map(String::as_str).unwrap_or("?")))]
    async fn run(
        &self,
        argv: &[String],
        timeout: Duration,
        stdin: Option<&[u8]>,
    ) -> Result<CommandOutput, ToolAdapterError> {
        let tool = argv.first().cloned().unwrap_or_default();
        if which::which(&tool).is_err() {
            return Err(ToolAdapterError::ToolMissing(tool));
        }

        let mut command = Command::new(&tool);
        command.args(&argv[1..]);
        command.stdin(if stdin.is_some() { Stdio::piped() } else { Stdio::null() });
        command.stdout(Stdio::piped());
        command.stderr(Stdio::piped());
        // dropping this future mid-await (e.g. a crack-pool worker task
        // cancelled on shutdown) still reaps the child instead of leaking it.
        command.kill_on_drop(true);

        let started_at = std::time::Instant::now();
        let mut child = command.spawn()?;

        if let Some(payload) = stdin {
            if let Some(mut pipe) = child.stdin.take() {
                pipe.write_all(payload).await?;
            }
        }

        let wait_result = tokio::time::timeout(timeout, async {
            let mut stdout_buffer = String::new();
            let mut stderr_buffer = String::new();
            if let Some(mut stdout) = child.stdout.take() {
                let _ = stdout.read_to_string(&mut stdout_buffer).await;
            }
            if let Some(mut stderr) = child.stderr.take() {
                let _ = stderr.read_to_string(&mut stderr_buffer).await;
            }
            let status = child.wait().await?;
            Ok::<_, std::io::Error>((status, stdout_buffer, stderr_buffer))
        })
        .await;

        match wait_result {
            Err(_elapsed) => {
                warn!("⏱️  [TOOL_TIMEOUT]: '{}' exceeded {:?}, killing.", tool, timeout);
                let _ = child.start_kill();
                Err(ToolAdapterError::Timeout(tool))
            }
            Ok(Err(io_error)) => Err(ToolAdapterError::Io(io_error)),
            Ok(Ok((status, stdout, stderr))) => Ok(CommandOutput {
                exit_code: status.code().unwrap_or(-1),
                stdout,
                stderr,
                elapsed: started_at.elapsed(),
            }),
        }
    }

    #[instrument(skip(self), fields(tool = %argv.first().map(String::as_str).unwrap_or("?")))]
    async fn spawn(&self, argv: &[String]) -> Result<Box<dyn SpawnedProcess>, ToolAdapterError> {
        let tool = argv.first().cloned().unwrap_or_default();
        if which::which(&tool).is_err() {
            return Err(ToolAdapterError::ToolMissing(tool));
        }

        let mut command = Command::new(&tool);
        command.args(&argv[1..]);
        command.stdin(Stdio::null());
        command.stdout(Stdio::null());
        command.stderr(Stdio::null());

        let child = command.spawn()?;
        Ok(Box::new(TokioSpawnedProcess { child: Mutex::new(child) }))
    }
}

/// `ToolAdapterError` no deriva `Clone` (envuelve `std::io::Error`), así
/// que `MockExec` reconstruye un error equivalente por variante cada vez
/// que se consulta un canned error.
fn clone_tool_adapter_error(error: &ToolAdapterError) -> ToolAdapterError {
    match error {
        ToolAdapterError::Io(io_error) => ToolAdapterError::Io(std::io::Error::new(io_error.kind(), io_error.to_string())),
        ToolAdapterError::ToolMissing(tool) => ToolAdapterError::ToolMissing(tool.clone()),
        ToolAdapterError::Timeout(tool) => ToolAdapterError::Timeout(tool.clone()),
        ToolAdapterError::NonZeroExit { tool, code, stderr } => {
            ToolAdapterError::NonZeroExit { tool: tool.clone(), code: *code, stderr: stderr.clone() }
        }
        ToolAdapterError::ParseError(detail) => ToolAdapterError::ParseError(detail.clone()),
    }
}

/// Sustituto de grabación para `--dry-run`: nunca invoca
/// `tokio::process::Command`. Devuelve una respuesta registrada para el
/// binario invocado, o una respuesta por defecto exitosa y vacía.
/// Grounded in `original_source/core/mock_wifi_monitor.py` /
/// `core/mock_cracker.py`.
#[derive(Debug, Default)]
pub struct MockExec {
    canned_responses: Mutex<HashMap<String, CommandOutput>>,
    canned_errors: Mutex<HashMap<String, ToolAdapterError>>,
    invocations: Mutex<Vec<Vec<String>>>,
}

impl MockExec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_response(&self, tool: impl Into<String>, output: CommandOutput) {
        self.canned_responses.lock().unwrap().insert(tool.into(), output);
    }

    /// Hace que la próxima invocación de `tool` devuelva este error en
    /// vez de una `CommandOutput` — usado para simular un binario
    /// ausente (`ToolMissing`) u otro fallo de herramienta en tests sin
    /// tocar un host real (§1.4).
    pub fn set_error(&self, tool: impl Into<String>, error: ToolAdapterError) {
        self.canned_errors.lock().unwrap().insert(tool.into(), error);
    }

    pub fn invocations(&self) -> Vec<Vec<String>> {
        self.invocations.lock().unwrap().clone()
    }
}

#[async_trait]
impl Exec for MockExec {
    async fn run(
        &self,
        argv: &[String],
        _timeout: Duration,
        _stdin: Option<&[u8]>,
    ) -> Result<CommandOutput, ToolAdapterError> {
        self.invocations.lock().unwrap().push(argv.to_vec());
        let tool = argv.first().cloned().unwrap_or_default();
        if let Some(error) = self.canned_errors.lock().unwrap().get(&tool) {
            return Err(clone_tool_adapter_error(error));
        }
        let canned = self.canned_responses.lock().unwrap();
        Ok(canned.get(&tool).cloned().unwrap_or(CommandOutput {
            exit_code: 0,
            stdout: String::new(),
            stderr: String::new(),
            elapsed: Duration::from_millis(0),
        }))
    }

    async fn spawn(&self, argv: &[String]) -> Result<Box<dyn SpawnedProcess>, ToolAdapterError> {
        self.invocations.lock().unwrap().push(argv.to_vec());
        Ok(Box::new(MockSpawnedProcess { alive: AtomicBool::new(true) }))
    }
}

/// Never actually spawns a subprocess — `is_alive` stays `true` until
/// `terminate` is called, modelling airodump-ng's "runs until killed"
/// lifecycle for tests that exercise the capture state machine without
/// a real monitor-mode NIC (§1.4).
pub struct MockSpawnedProcess {
    alive: AtomicBool,
}

#[async_trait]
impl SpawnedProcess for MockSpawnedProcess {
    async fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    async fn terminate(&self, _grace: Duration) {
        self.alive.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn default_exec_reports_tool_missing_for_unknown_binary() {
        let exec = DefaultExec;
        let result = exec
            .run(&["pendonn-nonexistent-binary-xyz".to_string()], Duration::from_secs(1), None)
            .await;
        assert!(matches!(result, Err(ToolAdapterError::ToolMissing(_))));
    }

    #[tokio::test]
    async fn mock_exec_returns_canned_response_and_records_invocation() {
        let mock = MockExec::new();
        mock.set_response(
            "airodump-ng",
            CommandOutput { exit_code: 0, stdout: "canned".to_string(), stderr: String::new(), elapsed: Duration::from_millis(1) },
        );
        let output = mock
            .run(&["airodump-ng".to_string(), "--band".to_string(), "abg".to_string()], Duration::from_secs(1), None)
            .await
            .unwrap();
        assert_eq!(output.stdout, "canned");
        assert_eq!(mock.invocations().len(), 1);
    }

    #[tokio::test]
    async fn mock_exec_defaults_to_empty_success_when_unregistered() {
        let mock = MockExec::new();
        let output = mock.run(&["nmap".to_string()], Duration::from_secs(1), None).await.unwrap();
        assert!(output.success());
        assert!(output.stdout.is_empty());
    }

    #[tokio::test]
    async fn mock_spawned_process_reports_dead_only_after_terminate() {
        let mock = MockExec::new();
        let process = mock.spawn(&["airodump-ng".to_string()]).await.unwrap();
        assert!(process.is_alive().await);
        process.terminate(Duration::from_millis(0)).await;
        assert!(!process.is_alive().await);
    }

    #[tokio::test]
    async fn mock_exec_returns_a_canned_error_instead_of_a_canned_response() {
        let mock = MockExec::new();
        mock.set_error("john", ToolAdapterError::ToolMissing("john".to_string()));
        let result = mock.run(&["john".to_string()], Duration::from_secs(1), None).await;
        assert!(matches!(result, Err(ToolAdapterError::ToolMissing(tool)) if tool == "john"));
    }

    #[tokio::test]
    async fn default_exec_spawn_reports_tool_missing_for_unknown_binary() {
        let exec = DefaultExec;
        let result = exec.spawn(&["pendonn-nonexistent-binary-xyz".to_string()]).await;
        assert!(matches!(result, Err(ToolAdapterError::ToolMissing(_))));
    }
}
