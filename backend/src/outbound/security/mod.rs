//! Salted PBKDF2-HMAC-SHA256 password digests.
//!
//! Encoded form: `pbkdf2_sha256$<rounds>$<salt-hex>$<digest-hex>`. The round
//! count travels with each digest so it can be raised without invalidating
//! stored passwords.

use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha256;
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use crate::domain::Password;
use crate::domain::ports::{PasswordHasher, PasswordHasherError};

const SCHEME: &str = "pbkdf2_sha256";
const SALT_BYTES: usize = 16;
const DIGEST_BYTES: usize = 32;
/// Default work factor for newly hashed passwords.
pub const DEFAULT_ROUNDS: u32 = 600_000;

/// [`PasswordHasher`] adapter using PBKDF2 with HMAC-SHA256.
#[derive(Debug, Clone, Copy)]
pub struct Pbkdf2PasswordHasher {
    rounds: u32,
}

impl Pbkdf2PasswordHasher {
    /// Create a hasher applying `rounds` iterations to new passwords.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use recipe_backend::domain::Password;
    /// use recipe_backend::domain::ports::PasswordHasher;
    /// use recipe_backend::outbound::security::Pbkdf2PasswordHasher;
    ///
    /// let hasher = Pbkdf2PasswordHasher::new(10);
    /// let password = Password::new("password", "s3cret").expect("password");
    /// let encoded = hasher.hash(&password).expect("hash");
    /// assert!(encoded.starts_with("pbkdf2_sha256$10$"));
    /// assert!(hasher.verify(&password, &encoded));
    /// ```
    pub fn new(rounds: u32) -> Self {
        Self {
            rounds: rounds.max(1),
        }
    }
}

impl Default for Pbkdf2PasswordHasher {
    fn default() -> Self {
        Self::new(DEFAULT_ROUNDS)
    }
}

fn derive(password: &[u8], salt: &[u8], rounds: u32) -> Zeroizing<[u8; DIGEST_BYTES]> {
    let mut key = Zeroizing::new([0_u8; DIGEST_BYTES]);
    pbkdf2_hmac::<Sha256>(password, salt, rounds, key.as_mut_slice());
    key
}

struct Encoded {
    rounds: u32,
    salt: Vec<u8>,
    digest: Vec<u8>,
}

fn parse(encoded: &str) -> Option<Encoded> {
    let mut parts = encoded.split('$');
    if parts.next()? != SCHEME {
        return None;
    }
    let rounds = parts.next()?.parse().ok().filter(|rounds| *rounds >= 1)?;
    let salt = hex::decode(parts.next()?).ok()?;
    let digest = hex::decode(parts.next()?).ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some(Encoded {
        rounds,
        salt,
        digest,
    })
}

impl PasswordHasher for Pbkdf2PasswordHasher {
    fn hash(&self, password: &Password) -> Result<String, PasswordHasherError> {
        let mut salt = [0_u8; SALT_BYTES];
        rand::thread_rng()
            .try_fill_bytes(&mut salt)
            .map_err(|err| PasswordHasherError::hash(err.to_string()))?;
        let digest = derive(password.expose().as_bytes(), &salt, self.rounds);
        Ok(format!(
            "{SCHEME}${}${}${}",
            self.rounds,
            hex::encode(salt),
            hex::encode(digest.as_slice())
        ))
    }

    fn verify(&self, password: &Password, encoded: &str) -> bool {
        let Some(stored) = parse(encoded) else {
            return false;
        };
        let candidate = derive(password.expose().as_bytes(), &stored.salt, stored.rounds);
        // Slices of unequal length compare unequal.
        bool::from(candidate.as_slice().ct_eq(stored.digest.as_slice()))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn hasher() -> Pbkdf2PasswordHasher {
        Pbkdf2PasswordHasher::new(3)
    }

    fn password(raw: &str) -> Password {
        Password::new("password", raw).expect("password")
    }

    #[rstest]
    fn matching_passwords_verify(hasher: Pbkdf2PasswordHasher) {
        let encoded = hasher.hash(&password("s3cret")).expect("hash");
        assert!(hasher.verify(&password("s3cret"), &encoded));
        assert!(!hasher.verify(&password("s3cret "), &encoded));
    }

    #[rstest]
    fn salts_differ_between_hashes(hasher: Pbkdf2PasswordHasher) {
        let first = hasher.hash(&password("same")).expect("hash");
        let second = hasher.hash(&password("same")).expect("hash");
        assert_ne!(first, second);
    }

    #[rstest]
    fn stored_round_counts_are_honoured(hasher: Pbkdf2PasswordHasher) {
        let encoded = Pbkdf2PasswordHasher::new(7)
            .hash(&password("pw"))
            .expect("hash");
        assert!(hasher.verify(&password("pw"), &encoded));
    }

    #[rstest]
    fn digests_match_the_pbkdf2_reference_vector() {
        // RFC 7914 section 11, first PBKDF2-HMAC-SHA256 vector, truncated to 32 bytes.
        let key = derive(b"passwd", b"salt", 1);
        assert_eq!(
            hex::encode(key.as_slice()),
            "55ac046e56e3089fec1691c22544b605f94185216dde0465e68b9d57c20dacbc"
        );
    }

    #[rstest]
    fn truncated_digests_never_verify(hasher: Pbkdf2PasswordHasher) {
        let encoded = hasher.hash(&password("pw")).expect("hash");
        let shortened: String = encoded.chars().take(encoded.len() - 2).collect();
        assert!(!hasher.verify(&password("pw"), &shortened));
    }

    #[rstest]
    #[case("")]
    #[case("md5$1$00$00")]
    #[case("sha256$1$00$00")]
    #[case("pbkdf2_sha256$0$00$00")]
    #[case("pbkdf2_sha256$1$zz$00")]
    #[case("pbkdf2_sha256$1$00$00$extra")]
    fn malformed_digests_never_verify(hasher: Pbkdf2PasswordHasher, #[case] encoded: &str) {
        assert!(!hasher.verify(&password("pw"), encoded));
    }
}
