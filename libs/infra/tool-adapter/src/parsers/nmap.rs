// [libs/infra/tool-adapter/src/parsers/nmap.rs]
/*!
 * Parsers de la salida "greppable" (`-oG`) de nmap (§4.G.4, §4.G.5):
 * descubrimiento de hosts vivos y registros (puerto, servicio,
 * producto, versión) por host.
 */

#[derive(Debug, Clone, PartialEq)]
pub struct HostPortRecord {
    pub host: String,
    pub port: u16,
    pub service: String,
    pub product: Option<String>,
    pub version: Option<String>,
}

/// Extrae las IPs vivas de un ping-scan (`nmap -sn -oG -`).
pub fn parse_live_hosts(greppable_output: &str) -> Vec<String> {
    greppable_output
        .lines()
        .filter(|line| line.starts_with("Host: ") && line.contains("Status: Up"))
        .filter_map(|line| line[6..].split_whitespace().next().map(str::to_string))
        .collect()
}

/// Extrae registros de puerto por host de un `-sV -oG -` contra un
/// rango de hosts.
pub fn parse_host_port_records(greppable_output: &str) -> Vec<HostPortRecord> {
    let mut records = Vec::new();
    for line in greppable_output.lines() {
        if !line.starts_with("Host: ") {
            continue;
        }
        let Some(ports_offset) = line.find("Ports: ") else { continue };
        let Some(host) = line[6..].split_whitespace().next() else { continue };
        let ports_blob = &line[ports_offset + "Ports: ".len()..];

        for entry in ports_blob.split(", ") {
            let fields: Vec<&str> = entry.split('/').collect();
            if fields.len() < 7 || fields[1] != "open" {
                continue;
            }
            let Ok(port) = fields[0].parse::<u16>() else { continue };
            let service = fields[4].to_string();
            let (product, version) = split_product_version(fields[6]);
            records.push(HostPortRecord { host: host.to_string(), port, service, product, version });
        }
    }
    records
}

fn split_product_version(version_info: &str) -> (Option<String>, Option<String>) {
    let trimmed = version_info.trim();
    if trimmed.is_empty() {
        return (None, None);
    }
    match trimmed.rsplit_once(' ') {
        Some((product, version)) if version.starts_with(|c: char| c.is_ascii_digit()) => {
            (Some(product.to_string()), Some(version.to_string()))
        }
        _ => (Some(trimmed.to_string()), None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_PING: &str = "Host: 192.168.1.10 ()\tStatus: Up\nHost: 192.168.1.11 ()\tStatus: Down\n";

    #[test]
    fn parse_live_hosts_only_returns_hosts_marked_up() {
        let hosts = parse_live_hosts(SAMPLE_PING);
        assert_eq!(hosts, vec!["192.168.1.10".to_string()]);
    }

    #[test]
    fn parse_host_port_records_extracts_open_ports_with_product_and_version() {
        let output = "Host: 192.168.1.10 ()\tPorts: 21/open/tcp//ftp//vsftpd 2.3.4/, 445/closed/tcp//microsoft-ds///\n";
        let records = parse_host_port_records(output);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].host, "192.168.1.10");
        assert_eq!(records[0].port, 21);
        assert_eq!(records[0].service, "ftp");
        assert_eq!(records[0].product.as_deref(), Some("vsftpd"));
        assert_eq!(records[0].version.as_deref(), Some("2.3.4"));
    }
}
