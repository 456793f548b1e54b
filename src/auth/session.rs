use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Signed token payload. Only the expiry is carried; there is a single shared
/// admin identity, so there is no subject to encode.
#[derive(Deserialize)]
struct TokenPayload {
    exp: i64,
}

/// SHA-256 hex digest of the admin passphrase. The digest is both the value
/// compared against at login and the HMAC key for session tokens, so rotating
/// the passphrase invalidates every outstanding token at once.
pub fn compute_digest(secret: &str) -> String {
    hex::encode(Sha256::digest(secret.as_bytes()))
}

/// Issue a session token valid for `ttl_hours` from now.
///
/// Format: `base64url(JSON{exp}) . base64url(HMAC-SHA256(payload))`, keyed by
/// the digest. A negative `ttl_hours` produces an already-expired token.
pub fn issue_token(digest: &str, ttl_hours: i64) -> String {
    issue_token_at(digest, ttl_hours, Utc::now().timestamp())
}

pub fn issue_token_at(digest: &str, ttl_hours: i64, now: i64) -> String {
    let exp = now + ttl_hours * 3600;
    let payload = URL_SAFE_NO_PAD.encode(serde_json::json!({ "exp": exp }).to_string());
    let signature = URL_SAFE_NO_PAD.encode(sign(digest, &payload));
    format!("{payload}.{signature}")
}

/// Verify a token against the current digest. True iff the signature matches
/// and the expiry is still in the future. Malformed input of any kind
/// (wrong part count, bad base64, bad JSON, missing fields) is simply false.
pub fn verify_token(token: &str, digest: &str) -> bool {
    verify_token_at(token, digest, Utc::now().timestamp())
}

pub fn verify_token_at(token: &str, digest: &str, now: i64) -> bool {
    let mut parts = token.split('.');
    let (Some(payload), Some(signature), None) = (parts.next(), parts.next(), parts.next())
    else {
        return false;
    };

    let Ok(supplied) = URL_SAFE_NO_PAD.decode(signature) else {
        return false;
    };
    let expected = sign(digest, payload);
    if !bool::from(expected.ct_eq(&supplied)) {
        return false;
    }

    let Ok(raw) = URL_SAFE_NO_PAD.decode(payload) else {
        return false;
    };
    let Ok(decoded) = serde_json::from_slice::<TokenPayload>(&raw) else {
        return false;
    };

    decoded.exp > now
}

fn sign(digest: &str, message: &str) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(digest.as_bytes()).expect("HMAC key");
    mac.update(message.as_bytes());
    mac.finalize().into_bytes().to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_is_64_hex_chars_and_deterministic() {
        let d1 = compute_digest("open sesame");
        let d2 = compute_digest("open sesame");
        assert_eq!(d1.len(), 64);
        assert!(d1.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(d1, d2);
    }

    #[test]
    fn different_passphrases_yield_different_digests() {
        assert_ne!(compute_digest("alpha"), compute_digest("beta"));
    }

    #[test]
    fn fresh_token_verifies() {
        let digest = compute_digest("open sesame");
        let token = issue_token(&digest, 8);
        assert!(verify_token(&token, &digest));
    }

    #[test]
    fn token_fails_under_rotated_password() {
        let old = compute_digest("old password");
        let new = compute_digest("new password");
        let token = issue_token(&old, 8);
        assert!(!verify_token(&token, &new));
    }

    #[test]
    fn expired_token_fails_even_with_valid_signature() {
        let digest = compute_digest("open sesame");
        let token = issue_token(&digest, -1);
        assert!(!verify_token(&token, &digest));
    }

    #[test]
    fn token_expires_when_clock_advances_past_exp() {
        let digest = compute_digest("open sesame");
        let token = issue_token_at(&digest, 8, 1_000_000);
        assert!(verify_token_at(&token, &digest, 1_000_000 + 8 * 3600 - 1));
        // exp must be strictly in the future
        assert!(!verify_token_at(&token, &digest, 1_000_000 + 8 * 3600));
    }

    #[test]
    fn malformed_tokens_fail_without_panicking() {
        let digest = compute_digest("open sesame");
        for garbage in [
            "",
            ".",
            "notbase64",
            "one.two.three",
            "!!bad-base64!!.!!also-bad!!",
            "eyJleHAiOjF9", // payload only, no signature
        ] {
            assert!(!verify_token(garbage, &digest), "accepted: {garbage:?}");
        }
    }

    #[test]
    fn tampered_payload_fails() {
        let digest = compute_digest("open sesame");
        let token = issue_token(&digest, 8);
        let signature = token.split('.').nth(1).unwrap();
        let forged_payload =
            URL_SAFE_NO_PAD.encode(serde_json::json!({ "exp": i64::MAX }).to_string());
        let forged = format!("{forged_payload}.{signature}");
        assert!(!verify_token(&forged, &digest));
    }

    #[test]
    fn payload_without_exp_fails() {
        let digest = compute_digest("open sesame");
        let payload = URL_SAFE_NO_PAD.encode(serde_json::json!({ "sub": "admin" }).to_string());
        let signature = URL_SAFE_NO_PAD.encode(sign(&digest, &payload));
        let token = format!("{payload}.{signature}");
        assert!(!verify_token(&token, &digest));
    }
}
