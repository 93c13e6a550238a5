// [libs/infra/tool-adapter/src/parsers/airodump.rs]
/*!
 * Parser de la salida CSV de `airodump-ng` (§4.E.3): dos secciones
 * separadas por una línea en blanco. La sección de puntos de acceso va
 * primero; la de clientes, segunda.
 */

use pendonn_domain_models::Encryption;

#[derive(Debug, Clone, PartialEq)]
pub struct AccessPointRecord {
    pub bssid: String,
    pub ssid: String,
    pub channel: u8,
    pub encryption: Encryption,
    pub power: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClientRecord {
    pub client_mac: String,
    /// `None` cuando airodump reporta `(not associated)`.
    pub associated_bssid: Option<String>,
}

/// Deriva el cifrado a partir de las columnas "Privacy" y
/// "Authentication" de airodump (§4.E "Encryption mapping"):
/// `OPN` -> Open; `WPA2` en Privacy -> WPA2, o WPA/WPA2 si `WPA` también
/// aparece en Authentication; `WPA` solo -> WPA; `WEP` solo -> WEP; si no
/// coincide nada -> Unknown.
pub fn map_encryption(privacy: &str, authentication: &str) -> Encryption {
    let privacy_upper = privacy.to_uppercase();
    let auth_upper = authentication.to_uppercase();

    if privacy_upper.contains("OPN") {
        Encryption::Open
    } else if privacy_upper.contains("WPA2") {
        if auth_upper.contains("WPA") {
            Encryption::WpaWpa2
        } else {
            Encryption::Wpa2
        }
    } else if privacy_upper.contains("WPA") {
        Encryption::Wpa
    } else if privacy_upper.contains("WEP") {
        Encryption::Wep
    } else {
        Encryption::Unknown
    }
}

/// Parsea el volcado CSV completo en sus dos secciones. Si no hay fila
/// de cabecera de BSSID (archivo truncado o corrupto), devuelve cero
/// redes en vez de un error (§8 "Boundary behaviors").
pub fn parse_scan_csv(raw: &str) -> (Vec<AccessPointRecord>, Vec<ClientRecord>) {
    let normalized = raw.replace("\r\n", "\n");
    let mut sections = normalized.splitn(2, "\n\n");
    let ap_section = sections.next().unwrap_or_default();
    let client_section = sections.next().unwrap_or_default();
    (parse_access_point_section(ap_section), parse_client_section(client_section))
}

fn split_fields(line: &str) -> Vec<String> {
    line.split(',').map(|field| field.trim().to_string()).collect()
}

fn parse_access_point_section(section: &str) -> Vec<AccessPointRecord> {
    let mut lines = section.lines();
    let Some(header) = lines.next() else { return Vec::new() };
    if !header.to_uppercase().contains("BSSID") {
        return Vec::new();
    }

    let mut records = Vec::new();
    for line in lines {
        if line.trim().is_empty() {
            continue;
        }
        let fields = split_fields(line);
        if fields.len() < 14 {
            continue;
        }
        let bssid = fields[0].to_lowercase();
        if bssid.is_empty() {
            continue;
        }
        let channel: u8 = fields[3].parse().unwrap_or(0);
        let privacy = &fields[5];
        let authentication = &fields[7];
        let power: i32 = fields[8].parse().unwrap_or(0);
        let ssid = fields[13].clone();

        records.push(AccessPointRecord {
            bssid,
            ssid,
            channel,
            encryption: map_encryption(privacy, authentication),
            power,
        });
    }
    records
}

fn parse_client_section(section: &str) -> Vec<ClientRecord> {
    let mut lines = section.lines();
    let Some(header) = lines.next() else { return Vec::new() };
    if !header.to_uppercase().contains("STATION") {
        return Vec::new();
    }

    let mut records = Vec::new();
    for line in lines {
        if line.trim().is_empty() {
            continue;
        }
        let fields = split_fields(line);
        if fields.len() < 6 {
            continue;
        }
        let client_mac = fields[0].to_lowercase();
        if client_mac.is_empty() {
            continue;
        }
        let bssid_field = &fields[5];
        let associated_bssid = if bssid_field.eq_ignore_ascii_case("(not associated)") {
            None
        } else {
            Some(bssid_field.to_lowercase())
        };
        records.push(ClientRecord { client_mac, associated_bssid });
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_CSV: &str = concat!(
        "BSSID, First time seen, Last time seen, channel, Speed, Privacy, Cipher, Authentication, Power, # beacons, # IV, LAN IP, ID-length, ESSID, Key\n",
        "AA:BB:CC:DD:EE:01, 2026-01-01 00:00:00, 2026-01-01 00:01:00, 6, 54, WPA2, CCMP, PSK, -45, 10, 0, 0.0.0.0, 7, TestNet, \n",
        "AA:BB:CC:DD:EE:02, 2026-01-01 00:00:00, 2026-01-01 00:01:00, 11, 54, OPN, , , -70, 5, 0, 0.0.0.0, 8, OpenNet, \n",
        "\n",
        "Station MAC, First time seen, Last time seen, Power, # packets, BSSID, Probed ESSIDs\n",
        "11:22:33:44:55:66, 2026-01-01 00:00:00, 2026-01-01 00:01:00, -50, 3, AA:BB:CC:DD:EE:01, \n",
        "77:88:99:AA:BB:CC, 2026-01-01 00:00:00, 2026-01-01 00:01:00, -60, 1, (not associated), \n",
    );

    #[test]
    fn parses_ap_and_client_sections() {
        let (aps, clients) = parse_scan_csv(SAMPLE_CSV);
        assert_eq!(aps.len(), 2);
        assert_eq!(aps[0].bssid, "aa:bb:cc:dd:ee:01");
        assert_eq!(aps[0].ssid, "TestNet");
        assert_eq!(aps[0].channel, 6);
        assert_eq!(aps[0].encryption, Encryption::Wpa2);
        assert_eq!(aps[1].encryption, Encryption::Open);

        assert_eq!(clients.len(), 2);
        assert_eq!(clients[0].associated_bssid.as_deref(), Some("aa:bb:cc:dd:ee:01"));
        assert_eq!(clients[1].associated_bssid, None);
    }

    #[test]
    fn missing_header_row_yields_zero_networks_not_an_error() {
        let (aps, _clients) = parse_scan_csv("garbage\nmore garbage\n");
        assert!(aps.is_empty());
    }

    #[test]
    fn encryption_mapping_matches_documented_rules() {
        assert_eq!(map_encryption("OPN", ""), Encryption::Open);
        assert_eq!(map_encryption("WPA2", "PSK"), Encryption::Wpa2);
        assert_eq!(map_encryption("WPA2", "WPA PSK"), Encryption::WpaWpa2);
        assert_eq!(map_encryption("WPA", "PSK"), Encryption::Wpa);
        assert_eq!(map_encryption("WEP", ""), Encryption::Wep);
        assert_eq!(map_encryption("", ""), Encryption::Unknown);
    }
}
