// [libs/infra/tool-adapter/src/parsers/convert.rs]
/*!
 * Conversión de artefactos de captura a los formatos de hash que
 * consumen los motores de cracking (§4.C, §4.F).
 */

/// `hcxpcapngtool` convierte un `.cap` a formato hashcat 22000. El
/// adaptador solo supervisa: un archivo de salida no vacío es la única
/// prueba aceptada de handshake presente (§4.D "verify" — el texto de
/// `aircrack-ng` nunca basta).
pub fn hcxpcapngtool_produced_handshake(output_file_byte_count: u64) -> bool {
    output_file_byte_count > 0
}

/// `hcx2john` escribe el hash john directamente a stdout; cualquier
/// salida no vacía implica handshake presente.
pub fn hcx2john_produced_handshake(stdout: &str) -> bool {
    !stdout.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_byte_conversion_output_is_not_a_handshake() {
        assert!(!hcxpcapngtool_produced_handshake(0));
        assert!(hcxpcapngtool_produced_handshake(128));
    }

    #[test]
    fn blank_hcx2john_stdout_is_not_a_handshake() {
        assert!(!hcx2john_produced_handshake("   \n"));
        assert!(hcx2john_produced_handshake("TestNet:$WPAPSK$..."));
    }
}
