// [libs/domain/models/src/capture_session.rs]
use chrono::{DateTime, Utc};

/// Estados de la máquina de captura por BSSID (§4.D). A lo sumo una
/// instancia de este autómata corre en cualquier instante — el NIC de
/// captura solo puede fijarse a un canal a la vez.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaptureState {
    Idle,
    Arming,
    Listening,
    Deauthing,
    Verifying,
    Done,
    Timeout,
}

impl CaptureState {
    pub fn is_terminal(self) -> bool {
        matches!(self, CaptureState::Done | CaptureState::Timeout)
    }
}

/// Clasificación de la respuesta de `aireplay-ng --deauth` (§4.D).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeauthOutcome {
    Success,
    BenignBusy,
    BssidNotVisible,
    Fatal,
}

impl DeauthOutcome {
    /// Todas las variantes, incluso `Fatal`, se tratan como "enviado" para
    /// efectos de avanzar el reloj de la máquina de captura — solo la
    /// clasificación cambia el multiplicador de timeout o el registro.
    pub fn counts_as_sent(self) -> bool {
        true
    }

    /// `BssidNotVisible` extiende el timeout total a 1.5x la base.
    pub fn extends_timeout(self) -> bool {
        matches!(self, DeauthOutcome::BssidNotVisible)
    }
}

/// Estado transitorio de una sesión de captura activa. Nunca persistido;
/// vive solo en memoria del supervisor de captura.
#[derive(Debug, Clone)]
pub struct CaptureSession {
    pub bssid: String,
    pub ssid: String,
    pub channel: u8,
    pub state: CaptureState,
    /// Ruta base (sin sufijo `-01.cap`) escrita por airodump-ng.
    pub capture_base_path: String,
    pub started_at: DateTime<Utc>,
    pub first_deauth_sent_at: Option<DateTime<Utc>>,
    pub second_deauth_sent_at: Option<DateTime<Utc>>,
    /// Verdadero si algún intento de deauth fue clasificado `BssidNotVisible`,
    /// extendiendo el timeout total a 1.5x la base.
    pub deauth_warning: bool,
}

impl CaptureSession {
    pub fn new(bssid: impl Into<String>, ssid: impl Into<String>, channel: u8, capture_base_path: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            bssid: bssid.into(),
            ssid: ssid.into(),
            channel,
            state: CaptureState::Arming,
            capture_base_path: capture_base_path.into(),
            started_at: now,
            first_deauth_sent_at: None,
            second_deauth_sent_at: None,
            deauth_warning: false,
        }
    }

    /// Timeout efectivo en segundos dado el timeout base de configuración,
    /// aplicando el multiplicador de 1.5x cuando `deauth_warning` está
    /// activo. Nunca excede 2x la base (tope duro del §5).
    pub fn effective_timeout_seconds(&self, base_timeout_seconds: u64) -> u64 {
        let scaled = if self.deauth_warning {
            (base_timeout_seconds as f64 * 1.5).round() as u64
        } else {
            base_timeout_seconds
        };
        scaled.min(base_timeout_seconds * 2)
    }

    /// Verdadero una vez que han transcurrido al menos 10s desde el primer
    /// deauth — el piso que el verificador debe respetar (§4.D).
    pub fn eligible_for_verification(&self, now: DateTime<Utc>) -> bool {
        match self.first_deauth_sent_at {
            Some(sent_at) => (now - sent_at).num_seconds() >= 10,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z").unwrap().with_timezone(&Utc)
    }

    #[test]
    fn effective_timeout_applies_warning_multiplier_and_caps_at_double_base() {
        let mut session = CaptureSession::new("aa:bb:cc:dd:ee:01", "TestNet", 6, "/tmp/base", now());
        assert_eq!(session.effective_timeout_seconds(100), 100);
        session.deauth_warning = true;
        assert_eq!(session.effective_timeout_seconds(100), 150);
        assert_eq!(session.effective_timeout_seconds(160), 240.min(320));
    }

    #[test]
    fn verification_not_eligible_before_ten_seconds_post_deauth() {
        let mut session = CaptureSession::new("aa:bb:cc:dd:ee:01", "TestNet", 6, "/tmp/base", now());
        assert!(!session.eligible_for_verification(now()));
        session.first_deauth_sent_at = Some(now());
        assert!(!session.eligible_for_verification(now() + Duration::seconds(9)));
        assert!(session.eligible_for_verification(now() + Duration::seconds(10)));
    }

    #[test]
    fn bssid_not_visible_is_the_only_outcome_that_extends_timeout() {
        assert!(DeauthOutcome::BssidNotVisible.extends_timeout());
        assert!(!DeauthOutcome::Success.extends_timeout());
        assert!(!DeauthOutcome::BenignBusy.extends_timeout());
        assert!(!DeauthOutcome::Fatal.extends_timeout());
    }
}
