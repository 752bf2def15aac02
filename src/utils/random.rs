// src/utils/random.rs
use base64::Engine;
use rand::Rng;

// The alphabet omits I, O, l, 0, and 1, which users confuse when
// retyping a password sent to them by e-mail.
const PASSWORD_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ\
abcdefghjkmnpqrstuvwxyz\
23456789\
!_-+*.^$#~%";

/// Generate a throw-away password, e.g. after a password reset.
pub fn random_password(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| PASSWORD_ALPHABET[rng.gen_range(0..PASSWORD_ALPHABET.len())] as char)
        .collect()
}

/// Random hex string for e-mail confirmation ids and reset codes.
pub fn random_confirm_id() -> String {
    let bytes: [u8; 8] = rand::thread_rng().gen();
    hex::encode(bytes)
}

/// URL-safe random secret for JWT signing keys and persistence tokens.
pub fn generate_secret() -> String {
    let bytes: [u8; 32] = rand::thread_rng().gen();
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_has_requested_length() {
        assert_eq!(random_password(10).chars().count(), 10);
        assert_eq!(random_password(0), "");
    }

    #[test]
    fn password_avoids_confusable_characters() {
        let pwd = random_password(2000);
        for bad in ['I', 'O', 'l', '0', '1'] {
            assert!(!pwd.contains(bad), "found confusable character {:?}", bad);
        }
    }

    #[test]
    fn confirm_ids_are_distinct() {
        let a = random_confirm_id();
        let b = random_confirm_id();
        assert_eq!(a.len(), 16);
        assert_ne!(a, b);
    }

    #[test]
    fn secrets_are_distinct() {
        assert_ne!(generate_secret(), generate_secret());
    }
}
