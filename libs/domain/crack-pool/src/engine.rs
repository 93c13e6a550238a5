// [libs/domain/crack-pool/src/engine.rs]
/*!
 * Cascada de motores de cracking (§4.F). Cada función es una corrida
 * pura sobre `Exec` — sin conocimiento del almacén de evidencia ni del
 * ciclo de vida del worker que las invoca — para poder probarlas de
 * forma aislada.
 */

use crate::errors::CrackPoolError;
use pendonn_infra_tool_adapter::errors::is_benign_stderr;
use pendonn_infra_tool_adapter::parsers::cracking;
use pendonn_infra_tool_adapter::{CommandOutput, Exec, ToolAdapterError};
use std::time::Duration;
use tracing::warn;

const ENGINE_STEP_TIMEOUT: Duration = Duration::from_secs(3600);

/// Ejecuta un paso de motor, acotando su fallo al motor actual (§7
/// `ToolMissing` / `ToolFailure { benign: true }`): un binario ausente o
/// un fallo transitorio de herramienta se registra y devuelve `Ok(None)`
/// para que la cascada de `crack_one` avance al siguiente motor en vez
/// de abortar. Cualquier otro error se propaga como fatal.
async fn run_scoped(exec: &dyn Exec, argv: &[String], timeout: Duration) -> Result<Option<CommandOutput>, CrackPoolError> {
    match exec.run(argv, timeout, None).await {
        Ok(output) => Ok(Some(output)),
        Err(ToolAdapterError::ToolMissing(tool)) => {
            warn!("⚠️  [CRACK_POOL]: engine tool '{}' is not installed, skipping this engine.", tool);
            Ok(None)
        }
        Err(ToolAdapterError::NonZeroExit { tool, code, stderr }) if is_benign_stderr(&stderr) => {
            warn!("⚠️  [CRACK_POOL]: '{}' exited {} with a benign failure, skipping this engine: {}", tool, code, stderr);
            Ok(None)
        }
        Err(error) => Err(error.into()),
    }
}

/// `hcx2john` primero; si no produce hash, no hay nada que probar.
/// Luego `john` contra el formato preferido y, si rechaza el
/// ciphertext, contra el fallback genérico; `john --show` extrae la
/// contraseña del SSID objetivo.
pub async fn crack_with_john(exec: &dyn Exec, cap_path: &str, ssid: &str, preferred_format: &str) -> Result<Option<String>, CrackPoolError> {
    let john_hash_path = format!("{cap_path}.john");
    let Some(hcx2john_output) = run_scoped(exec, &["hcx2john".to_string(), cap_path.to_string()], ENGINE_STEP_TIMEOUT).await? else {
        return Ok(None);
    };
    if hcx2john_output.stdout.trim().is_empty() {
        return Ok(None);
    }
    tokio::fs::write(&john_hash_path, &hcx2john_output.stdout).await?;

    let fallback_format = if preferred_format == "wpapsk-opencl" { "wpapsk" } else { preferred_format };
    for format in [preferred_format, fallback_format] {
        let Some(run_output) = run_scoped(exec, &["john".to_string(), format!("--format={format}"), john_hash_path.clone()], ENGINE_STEP_TIMEOUT).await? else {
            return Ok(None);
        };
        if run_output.stdout.contains("Unknown ciphertext format") || run_output.stderr.contains("Unknown ciphertext format") {
            continue;
        }
        let Some(show_output) = run_scoped(exec, &["john".to_string(), "--show".to_string(), john_hash_path.clone()], ENGINE_STEP_TIMEOUT).await? else {
            return Ok(None);
        };
        return Ok(cracking::parse_john_show(&show_output.stdout, ssid));
    }
    Ok(None)
}

/// `hcxpcapngtool` produce el hash `.22000`; `hashcat -m <mode> -a 0`
/// lo ataca contra la wordlist configurada y escribe `-o <hash>.cracked`.
pub async fn crack_with_hashcat(exec: &dyn Exec, cap_path: &str, wordlist_path: &str, hashcat_mode: u32) -> Result<Option<String>, CrackPoolError> {
    let hash_path = format!("{cap_path}.22000");
    let Some(_) = run_scoped(exec, &["hcxpcapngtool".to_string(), "-o".to_string(), hash_path.clone(), cap_path.to_string()], ENGINE_STEP_TIMEOUT).await? else {
        return Ok(None);
    };

    let cracked_path = format!("{hash_path}.cracked");
    let Some(_) = run_scoped(
        exec,
        &[
            "hashcat".to_string(),
            "-m".to_string(),
            hashcat_mode.to_string(),
            "-a".to_string(),
            "0".to_string(),
            hash_path.clone(),
            wordlist_path.to_string(),
            "-o".to_string(),
            cracked_path.clone(),
            "--force".to_string(),
        ],
        ENGINE_STEP_TIMEOUT,
    )
    .await?
    else {
        return Ok(None);
    };

    let contents = tokio::fs::read_to_string(&cracked_path).await.unwrap_or_default();
    Ok(cracking::parse_hashcat_output_file(&contents))
}

/// aircrack-ng directo sobre el `.cap`; acepta tanto el archivo `-l`
/// como una línea `KEY FOUND!` en stdout.
pub async fn crack_with_aircrack(exec: &dyn Exec, cap_path: &str, bssid: &str, wordlist_path: &str) -> Result<Option<String>, CrackPoolError> {
    let out_path = format!("{cap_path}.aircrack-out");
    let Some(output) = run_scoped(
        exec,
        &[
            "aircrack-ng".to_string(),
            "-w".to_string(),
            wordlist_path.to_string(),
            "-b".to_string(),
            bssid.to_string(),
            "-l".to_string(),
            out_path.clone(),
            cap_path.to_string(),
        ],
        ENGINE_STEP_TIMEOUT,
    )
    .await?
    else {
        return Ok(None);
    };

    if let Ok(contents) = tokio::fs::read_to_string(&out_path).await {
        if let Some(password) = cracking::parse_aircrack_output_file(&contents) {
            return Ok(Some(password));
        }
    }
    Ok(cracking::parse_aircrack_stdout(&output.stdout))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pendonn_infra_tool_adapter::{CommandOutput, MockExec};
    use tempfile::tempdir;

    #[tokio::test]
    async fn john_yields_nothing_when_hcx2john_produces_no_hash() {
        let exec = MockExec::new();
        exec.set_response("hcx2john", CommandOutput { exit_code: 0, stdout: String::new(), ..Default::default() });
        let tmp = tempdir().unwrap();
        let cap_path = tmp.path().join("h.cap").to_string_lossy().to_string();

        let result = crack_with_john(&exec, &cap_path, "TestNet", "wpapsk-opencl").await.unwrap();
        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn john_extracts_the_password_for_the_matching_ssid() {
        let exec = MockExec::new();
        exec.set_response("hcx2john", CommandOutput { exit_code: 0, stdout: "TestNet:$hash$...".to_string(), ..Default::default() });
        exec.set_response("john", CommandOutput { exit_code: 0, stdout: "TestNet:hunter2\n".to_string(), ..Default::default() });
        let tmp = tempdir().unwrap();
        let cap_path = tmp.path().join("h.cap").to_string_lossy().to_string();

        let result = crack_with_john(&exec, &cap_path, "TestNet", "wpapsk-opencl").await.unwrap();
        assert_eq!(result, Some("hunter2".to_string()));
    }

    #[tokio::test]
    async fn hashcat_reads_the_cracked_output_file() {
        let exec = MockExec::new();
        let tmp = tempdir().unwrap();
        let cap_path = tmp.path().join("h.cap").to_string_lossy().to_string();
        tokio::fs::write(format!("{cap_path}.22000.cracked"), "8f4a...*02000000...:hunter2\n").await.unwrap();

        let result = crack_with_hashcat(&exec, &cap_path, "/wordlists/rockyou.txt", 22000).await.unwrap();
        assert_eq!(result, Some("hunter2".to_string()));
    }

    #[tokio::test]
    async fn aircrack_falls_back_to_stdout_when_no_output_file_is_written() {
        let exec = MockExec::new();
        exec.set_response("aircrack-ng", CommandOutput { exit_code: 0, stdout: "KEY FOUND! [ hunter2 ]\n".to_string(), ..Default::default() });
        let tmp = tempdir().unwrap();
        let cap_path = tmp.path().join("h.cap").to_string_lossy().to_string();

        let result = crack_with_aircrack(&exec, &cap_path, "aa:bb:cc:dd:ee:01", "/wordlists/rockyou.txt").await.unwrap();
        assert_eq!(result, Some("hunter2".to_string()));
    }

    #[tokio::test]
    async fn john_yields_nothing_instead_of_erroring_when_hcx2john_is_missing() {
        let exec = MockExec::new();
        exec.set_error("hcx2john", ToolAdapterError::ToolMissing("hcx2john".to_string()));
        let tmp = tempdir().unwrap();
        let cap_path = tmp.path().join("h.cap").to_string_lossy().to_string();

        let result = crack_with_john(&exec, &cap_path, "TestNet", "wpapsk-opencl").await.unwrap();
        assert_eq!(result, None, "a missing engine tool must be scoped to Ok(None), not propagated as an error");
    }

    #[tokio::test]
    async fn aircrack_yields_nothing_instead_of_erroring_on_a_benign_tool_failure() {
        let exec = MockExec::new();
        exec.set_error(
            "aircrack-ng",
            ToolAdapterError::NonZeroExit { tool: "aircrack-ng".to_string(), code: 1, stderr: "Operation not permitted".to_string() },
        );
        let tmp = tempdir().unwrap();
        let cap_path = tmp.path().join("h.cap").to_string_lossy().to_string();

        let result = crack_with_aircrack(&exec, &cap_path, "aa:bb:cc:dd:ee:01", "/wordlists/rockyou.txt").await.unwrap();
        assert_eq!(result, None);
    }
}
