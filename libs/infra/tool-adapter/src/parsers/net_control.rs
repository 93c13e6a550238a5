// [libs/infra/tool-adapter/src/parsers/net_control.rs]
/*!
 * Parsers de las salidas de `ip addr show`/`iw` usadas para confirmar
 * asociación y arrendamiento DHCP (§4.G.3, §4.G.4).
 */

/// Devuelve la primera dirección `inet` (con su CIDR) anunciada por
/// `ip addr show <nic>`, o `None` si la interfaz todavía no tiene
/// dirección — la condición que el paso de Asociación sondea con un
/// techo de 30 segundos.
pub fn parse_inet_cidr(ip_addr_show_output: &str) -> Option<String> {
    ip_addr_show_output.lines().find_map(|line| {
        let trimmed = line.trim();
        trimmed
            .strip_prefix("inet ")
            .and_then(|rest| rest.split_whitespace().next())
            .map(str::to_string)
    })
}

/// SSID actualmente asociado según `iwgetid <nic> -r`, o `None` si la
/// NIC no está asociada a ninguna red — la comprobación de seguridad
/// del paso 1 de enumeración (§4.G.1) la compara contra el SSID
/// objetivo antes de tocar cualquier interfaz.
pub fn parse_iwgetid_ssid(iwgetid_output: &str) -> Option<String> {
    let trimmed = iwgetid_output.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iwgetid_blank_output_means_not_associated() {
        assert_eq!(parse_iwgetid_ssid("\n"), None);
        assert_eq!(parse_iwgetid_ssid("HomeNetwork\n"), Some("HomeNetwork".to_string()));
    }

    #[test]
    fn extracts_first_inet_address_with_prefix_length() {
        let output = "2: wlan1: <BROADCAST,MULTICAST,UP>\n    inet 192.168.1.42/24 brd 192.168.1.255 scope global wlan1\n";
        assert_eq!(parse_inet_cidr(output), Some("192.168.1.42/24".to_string()));
    }

    #[test]
    fn returns_none_when_no_inet_line_present() {
        let output = "2: wlan1: <BROADCAST,MULTICAST>\n    link/ether aa:bb:cc:dd:ee:ff\n";
        assert_eq!(parse_inet_cidr(output), None);
    }
}
