// [libs/domain/scan-loop/src/candidate.rs]
/*!
 * Puntuación y selección del próximo objetivo de captura (§4.D
 * "Candidate selection (delegated from Scan Loop)"). Función pura,
 * separada de la E/S de la barrida para poder probarla sin airodump.
 */

use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub network_id: i64,
    pub bssid: String,
    pub ssid: String,
    pub channel: u8,
    pub client_count: usize,
    pub signal_strength: i32,
    pub last_seen: DateTime<Utc>,
}

impl Candidate {
    pub fn score(&self) -> f64 {
        10.0 * self.client_count as f64 + self.signal_strength as f64 / 10.0
    }
}

/// Entre todos los candidatos capture-eligible (ya filtrados por
/// whitelist + cifrado WPA/WPA2 por el llamador), el de mayor
/// `10 * client_count + signal_dBm / 10`; empates resueltos por el
/// `last_seen` más reciente.
pub fn select_candidate(candidates: &[Candidate]) -> Option<Candidate> {
    candidates
        .iter()
        .max_by(|a, b| a.score().partial_cmp(&b.score()).unwrap_or(std::cmp::Ordering::Equal).then(a.last_seen.cmp(&b.last_seen)))
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(bssid: &str, client_count: usize, signal_strength: i32, last_seen: DateTime<Utc>) -> Candidate {
        Candidate { network_id: 1, bssid: bssid.to_string(), ssid: "TestNet".to_string(), channel: 6, client_count, signal_strength, last_seen }
    }

    #[test]
    fn picks_the_highest_scoring_candidate() {
        let now = Utc::now();
        let candidates = vec![candidate("aa:bb:cc:dd:ee:01", 1, -40, now), candidate("aa:bb:cc:dd:ee:02", 3, -80, now)];
        let winner = select_candidate(&candidates).unwrap();
        assert_eq!(winner.bssid, "aa:bb:cc:dd:ee:02");
    }

    #[test]
    fn ties_are_broken_by_most_recent_last_seen() {
        let now = Utc::now();
        let earlier = now - chrono::Duration::seconds(30);
        let candidates = vec![candidate("aa:bb:cc:dd:ee:01", 1, -40, earlier), candidate("aa:bb:cc:dd:ee:02", 1, -40, now)];
        let winner = select_candidate(&candidates).unwrap();
        assert_eq!(winner.bssid, "aa:bb:cc:dd:ee:02");
    }

    #[test]
    fn empty_candidate_list_selects_nothing() {
        assert!(select_candidate(&[]).is_none());
    }
}
