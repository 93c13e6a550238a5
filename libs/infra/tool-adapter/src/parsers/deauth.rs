// [libs/infra/tool-adapter/src/parsers/deauth.rs]
/*!
 * Clasificación de la respuesta de `aireplay-ng --deauth` (§4.D). La
 * clasificación decide si el timeout de la sesión se extiende y qué
 * nivel de log recibe el evento — nunca si el deauth "se considera
 * enviado" (siempre se marca así, incluso en el caso fatal, porque
 * puede haber suficiente tráfico ya capturado).
 */

use pendonn_domain_models::DeauthOutcome;

const BENIGN_PHRASES: [&str; 2] = ["Operation not permitted", "ioctl(SIOCSIWMODE) failed"];
const BSSID_NOT_VISIBLE_PHRASE: &str = "No such BSSID available";

pub fn classify_deauth_output(exit_code: i32, stdout: &str, stderr: &str) -> DeauthOutcome {
    let combined = format!("{stdout}\n{stderr}");

    if combined.contains(BSSID_NOT_VISIBLE_PHRASE) {
        return DeauthOutcome::BssidNotVisible;
    }
    if BENIGN_PHRASES.iter().any(|phrase| combined.contains(phrase)) {
        return DeauthOutcome::BenignBusy;
    }
    if exit_code == 0 {
        DeauthOutcome::Success
    } else {
        DeauthOutcome::Fatal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_exit_with_no_special_phrase_is_success() {
        assert_eq!(classify_deauth_output(0, "Sending 64 directed DeAuth", ""), DeauthOutcome::Success);
    }

    #[test]
    fn permission_denied_phrase_is_benign_busy() {
        assert_eq!(classify_deauth_output(1, "", "Operation not permitted"), DeauthOutcome::BenignBusy);
    }

    #[test]
    fn missing_bssid_phrase_overrides_even_a_zero_exit_code() {
        assert_eq!(classify_deauth_output(0, "No such BSSID available.", ""), DeauthOutcome::BssidNotVisible);
    }

    #[test]
    fn unrecognized_nonzero_exit_is_fatal() {
        assert_eq!(classify_deauth_output(1, "", "segmentation fault"), DeauthOutcome::Fatal);
    }
}
