// [apps/orchestrator/src/cli.rs]
/*!
 * Directivas de arranque (§1.1 del alcance ampliado): la ruta del
 * archivo TOML, un override del directorio de datos, y el interruptor
 * de `--dry-run` que enruta el adaptador de herramientas hacia
 * `MockExec` en vez de invocar subprocesos reales.
 */

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    author = "Raz Podesta <metaShark Tech>",
    version,
    about = "PenDonn core orchestrator: wifi recon, handshake capture, cracking and LAN enumeration."
)]
pub struct Directives {
    /// Ruta del archivo de configuración TOML.
    #[arg(long, env = "PENDONN_CONFIG", default_value = "./pendonn.toml")]
    pub config: String,

    /// Sobrescribe `general.data_dir` del archivo de configuración.
    #[arg(long)]
    pub data_dir: Option<String>,

    /// Corre contra un adaptador de herramientas simulado en vez de
    /// subprocesos reales — exercita toda la máquina de estados sin
    /// privilegios de root ni adaptadores inalámbricos presentes.
    #[arg(long)]
    pub dry_run: bool,
}
