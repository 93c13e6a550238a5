// [libs/domain/models/src/network.rs]
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Cifrado anunciado por un punto de acceso, tal como se observa en el
/// beacon. Nunca se pasa como cadena libre más allá del parser que lo
/// deriva (ver el adaptador de herramientas).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Encryption {
    Open,
    Wep,
    Wpa,
    Wpa2,
    WpaWpa2,
    Unknown,
}

impl Encryption {
    /// Solo WPA/WPA2 (puro o mixto) es un objetivo elegible para captura.
    pub fn is_capturable(self) -> bool {
        matches!(self, Encryption::Wpa | Encryption::Wpa2 | Encryption::WpaWpa2)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Encryption::Open => "open",
            Encryption::Wep => "wep",
            Encryption::Wpa => "wpa",
            Encryption::Wpa2 => "wpa2",
            Encryption::WpaWpa2 => "wpa/wpa2",
            Encryption::Unknown => "unknown",
        }
    }

    /// Inverso de `as_str`, usado al leer filas persistidas. Cualquier
    /// valor no reconocido degrada a `Unknown` en vez de fallar — la
    /// persistencia nunca debe poder envenenar el arranque.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "open" => Encryption::Open,
            "wep" => Encryption::Wep,
            "wpa" => Encryption::Wpa,
            "wpa2" => Encryption::Wpa2,
            "wpa/wpa2" => Encryption::WpaWpa2,
            _ => Encryption::Unknown,
        }
    }
}

impl std::fmt::Display for Encryption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Una red inalámbrica observada, identificada de forma única por BSSID.
/// Creada en el primer avistamiento; mutada (señal/canal/última vez vista)
/// por avistamientos subsiguientes; nunca destruida por el núcleo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Network {
    pub id: i64,
    /// MAC de 48 bits en forma minúscula con dos puntos, p.ej. `aa:bb:cc:dd:ee:01`.
    pub bssid: String,
    /// Puede estar vacío para APs ocultos.
    pub ssid: String,
    /// 1-14 (2.4 GHz) o 36-165 (5 GHz).
    pub channel: u8,
    pub encryption: Encryption,
    /// dBm, entero negativo.
    pub signal_strength: i32,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    pub is_whitelisted: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_wpa_family_is_capturable() {
        assert!(Encryption::Wpa.is_capturable());
        assert!(Encryption::Wpa2.is_capturable());
        assert!(Encryption::WpaWpa2.is_capturable());
        assert!(!Encryption::Open.is_capturable());
        assert!(!Encryption::Wep.is_capturable());
        assert!(!Encryption::Unknown.is_capturable());
    }

    #[test]
    fn parse_is_the_exact_inverse_of_as_str_for_known_variants() {
        for variant in [Encryption::Open, Encryption::Wep, Encryption::Wpa, Encryption::Wpa2, Encryption::WpaWpa2] {
            assert_eq!(Encryption::parse(variant.as_str()), variant);
        }
        assert_eq!(Encryption::parse("garbage"), Encryption::Unknown);
    }

    #[test]
    fn encryption_round_trips_through_json() {
        for variant in [
            Encryption::Open,
            Encryption::Wep,
            Encryption::Wpa,
            Encryption::Wpa2,
            Encryption::WpaWpa2,
            Encryption::Unknown,
        ] {
            let encoded = serde_json::to_string(&variant).unwrap();
            let decoded: Encryption = serde_json::from_str(&encoded).unwrap();
            assert_eq!(decoded, variant);
        }
    }
}
