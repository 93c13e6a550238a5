// [libs/domain/enumeration/src/rules.rs]
/*!
 * Reglas de vulnerabilidad incorporadas (§4.G.6): un puerto abierto
 * conocido emite una fila de `Vulnerability` a severidad fija, sin
 * necesitar un plugin externo.
 */

use pendonn_domain_models::Severity;

pub const BUILTIN_PLUGIN_NAME: &str = "builtin";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuiltinRule {
    pub port: u16,
    pub service: &'static str,
    pub vuln_type: &'static str,
    pub severity: Severity,
    pub description: &'static str,
}

const RULES: [BuiltinRule; 6] = [
    BuiltinRule { port: 21, service: "ftp", vuln_type: "ftp-exposed", severity: Severity::Medium, description: "FTP service exposed to the LAN." },
    BuiltinRule { port: 23, service: "telnet", vuln_type: "telnet-exposed", severity: Severity::High, description: "Telnet is a cleartext remote administration protocol." },
    BuiltinRule { port: 445, service: "smb", vuln_type: "smb-exposed", severity: Severity::High, description: "SMB exposed to the LAN; check for known exploit chains." },
    BuiltinRule { port: 3389, service: "rdp", vuln_type: "rdp-exposed", severity: Severity::Medium, description: "RDP exposed to the LAN." },
    BuiltinRule { port: 5900, service: "vnc", vuln_type: "vnc-exposed", severity: Severity::High, description: "VNC is frequently deployed without authentication." },
    BuiltinRule { port: 8080, service: "http-proxy", vuln_type: "http-proxy-exposed", severity: Severity::Low, description: "Alternate HTTP port exposed to the LAN." },
];

/// La regla incorporada para `port`, si alguna lo cubre.
pub fn rule_for_port(port: u16) -> Option<&'static BuiltinRule> {
    RULES.iter().find(|rule| rule.port == port)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_documented_port_has_a_rule() {
        for port in [21, 23, 445, 3389, 5900, 8080] {
            assert!(rule_for_port(port).is_some(), "expected a rule for port {port}");
        }
    }

    #[test]
    fn unlisted_ports_have_no_rule() {
        assert!(rule_for_port(22).is_none());
    }
}
