// [libs/domain/capture-engine/src/cooldown.rs]
/*!
 * Tabla de enfriamiento por BSSID (§4.D): un objetivo recién intentado,
 * con éxito o sin él, es inelegible para recaptura durante 300 segundos.
 * Vive solo en memoria del proceso — no hay requisito de persistirla a
 * través de reinicios (un reinicio ya implica que el operador quiere
 * reconsiderar los objetivos).
 */

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Mutex;

pub const COOLDOWN_SECONDS: i64 = 300;

#[derive(Default)]
pub struct CooldownTracker {
    last_attempt: Mutex<HashMap<String, DateTime<Utc>>>,
}

impl CooldownTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_eligible(&self, bssid: &str, now: DateTime<Utc>) -> bool {
        match self.last_attempt.lock().unwrap().get(bssid) {
            Some(last) => now - *last >= Duration::seconds(COOLDOWN_SECONDS),
            None => true,
        }
    }

    pub fn record_attempt(&self, bssid: &str, now: DateTime<Utc>) {
        self.last_attempt.lock().unwrap().insert(bssid.to_string(), now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn untried_bssid_is_eligible() {
        let tracker = CooldownTracker::new();
        assert!(tracker.is_eligible("aa:bb:cc:dd:ee:01", Utc::now()));
    }

    #[test]
    fn a_fresh_attempt_is_ineligible_until_the_cooldown_elapses() {
        let tracker = CooldownTracker::new();
        let now = Utc::now();
        tracker.record_attempt("aa:bb:cc:dd:ee:01", now);

        assert!(!tracker.is_eligible("aa:bb:cc:dd:ee:01", now + Duration::seconds(299)));
        assert!(tracker.is_eligible("aa:bb:cc:dd:ee:01", now + Duration::seconds(300)));
    }
}
