// [libs/core/interface-registry/src/parsing.rs]
use std::collections::HashMap;

/// Construye un mapeo MAC -> nombre de interfaz a partir de
/// `ip -o link show`, porque los adaptadores USB se renumeran de forma
/// impredecible entre reinicios (§4.A).
pub fn parse_ip_link_show(output: &str) -> HashMap<String, String> {
    let mut mapping = HashMap::new();
    for line in output.lines() {
        let Some(colon_position) = line.find(": ") else { continue };
        let after_index = &line[colon_position + 2..];
        let Some(name_end) = after_index.find(':') else { continue };
        let name = after_index[..name_end].trim().to_string();

        if let Some(link_offset) = line.find("link/ether ") {
            let mac = line[link_offset + "link/ether ".len()..]
                .split_whitespace()
                .next()
                .unwrap_or_default()
                .to_lowercase();
            if !mac.is_empty() && !name.is_empty() {
                mapping.insert(mac, name);
            }
        }
    }
    mapping
}

/// Extrae el modo actual (`monitor`, `managed`, etc.) de `iw dev <nic> info`.
pub fn parse_iw_dev_mode(output: &str) -> Option<String> {
    output.lines().find_map(|line| {
        let trimmed = line.trim();
        trimmed.strip_prefix("type ").map(str::to_string)
    })
}
