// [libs/domain/models/src/vulnerability.rs]
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }

    pub fn parse(raw: &str) -> Self {
        match raw {
            "critical" => Severity::Critical,
            "high" => Severity::High,
            "medium" => Severity::Medium,
            _ => Severity::Low,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Un hallazgo registrado durante la fase de enumeración, emitido por una
/// regla incorporada (§4.G.6) o por un plugin externo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vulnerability {
    pub id: i64,
    pub scan_id: i64,
    /// IP o MAC del host afectado.
    pub host: String,
    pub port: Option<u16>,
    pub service: String,
    pub vuln_type: String,
    pub severity: Severity,
    pub description: String,
    pub plugin_name: String,
    pub discovered_date: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_orders_low_to_critical() {
        let mut severities = vec![Severity::Critical, Severity::Low, Severity::High, Severity::Medium];
        severities.sort();
        assert_eq!(
            severities,
            vec![Severity::Low, Severity::Medium, Severity::High, Severity::Critical]
        );
    }
}
