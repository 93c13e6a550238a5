// [libs/infra/tool-adapter/src/parsers/cracking.rs]
/*!
 * Parsers de recuperación de contraseña para los tres motores de
 * cracking del §4.F. Invariante compartida (§4.C "Parser invariant"):
 * una contraseña solo se acepta si es no vacía, distinta de un literal
 * centinela, y recuperada del registro correcto para el handshake en
 * cuestión.
 */

const SENTINEL_LITERALS: [&str; 2] = ["password hash", "cracked"];

pub fn is_acceptable_password(candidate: &str) -> bool {
    let trimmed = candidate.trim();
    if trimmed.is_empty() {
        return false;
    }
    !SENTINEL_LITERALS.contains(&trimmed.to_lowercase().as_str())
}

/// `john --show` imprime `ssid:password` por línea recuperada. Solo se
/// acepta la línea cuyo SSID coincide con el handshake objetivo.
pub fn parse_john_show(output: &str, expected_ssid: &str) -> Option<String> {
    output.lines().find_map(|line| {
        let (ssid, password) = line.split_once(':')?;
        if ssid == expected_ssid && is_acceptable_password(password) {
            Some(password.trim().to_string())
        } else {
            None
        }
    })
}

/// hashcat escribe `hash*data:password` a su archivo `-o`.
pub fn parse_hashcat_output_file(contents: &str) -> Option<String> {
    let line = contents.lines().next()?;
    let (_, password) = line.rsplit_once(':')?;
    is_acceptable_password(password).then(|| password.trim().to_string())
}

/// aircrack-ng acepta dos formas de prueba: el contenido del archivo
/// `-l`, o una línea `KEY FOUND! [ password ]` en stdout.
pub fn parse_aircrack_output_file(contents: &str) -> Option<String> {
    let trimmed = contents.trim();
    is_acceptable_password(trimmed).then(|| trimmed.to_string())
}

pub fn parse_aircrack_stdout(stdout: &str) -> Option<String> {
    const MARKER: &str = "KEY FOUND! [";
    stdout.lines().find_map(|line| {
        let start = line.find(MARKER)?;
        let rest = &line[start + MARKER.len()..];
        let end = rest.find(']')?;
        let password = rest[..end].trim();
        is_acceptable_password(password).then(|| password.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn john_show_matches_only_the_target_ssid() {
        let output = "OtherNet:wrongpass\nTestNet:hunter2\n";
        assert_eq!(parse_john_show(output, "TestNet"), Some("hunter2".to_string()));
        assert_eq!(parse_john_show(output, "NoSuchNet"), None);
    }

    #[test]
    fn sentinel_literals_are_rejected_everywhere() {
        assert!(!is_acceptable_password("password hash"));
        assert!(!is_acceptable_password("cracked"));
        assert!(!is_acceptable_password(""));
        assert!(is_acceptable_password("hunter2"));
    }

    #[test]
    fn hashcat_output_file_takes_the_text_after_the_last_colon() {
        let contents = "8f4a...*02000000...:hunter2\n";
        assert_eq!(parse_hashcat_output_file(contents), Some("hunter2".to_string()));
    }

    #[test]
    fn aircrack_stdout_extracts_bracketed_key() {
        let stdout = "KEY FOUND! [ hunter2 ]\n";
        assert_eq!(parse_aircrack_stdout(stdout), Some("hunter2".to_string()));
    }

    #[test]
    fn aircrack_output_file_rejects_blank_contents() {
        assert_eq!(parse_aircrack_output_file("\n\n"), None);
    }
}
