// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Secret handling: at-rest encryption for custodial wallet keys, salted
//! password digests, and email canonicalization.
//!
//! The AEAD key comes from `ENCRYPTION_KEY` (base64, 32 bytes). Wallet
//! secrets are stored as `base64(nonce || ciphertext || tag)` and are never
//! returned by any API endpoint.

use base64ct::{Base64, Encoding};
use hmac::{Hmac, Mac};
use ring::aead::{Aad, LessSafeKey, Nonce, UnboundKey, AES_256_GCM, NONCE_LEN};
use ring::rand::{SecureRandom, SystemRandom};
use sha2::{Digest, Sha256};
use unicode_normalization::UnicodeNormalization;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    #[error("encryption key must be 32 bytes (base64-encoded)")]
    BadKey,
    #[error("random generator failure")]
    Rng,
    #[error("ciphertext is malformed or was tampered with")]
    BadCiphertext,
}

/// Canonicalize an email address: NFC-normalize, trim, lowercase.
///
/// Uniqueness checks and index lookups always go through this, so
/// `User@Example.com ` and `user@example.com` are the same account.
pub fn normalize_email(email: &str) -> String {
    email.trim().nfc().collect::<String>().to_lowercase()
}

/// Derive a salted password digest: `base64(salt).base64(hmac(salt, password))`.
///
/// Stands in for the platform's external credential store; kept simple and
/// constant-time on verify via the `hmac` crate.
pub fn password_digest(password: &str) -> Result<String, CryptoError> {
    let rng = SystemRandom::new();
    let mut salt = [0u8; 16];
    rng.fill(&mut salt).map_err(|_| CryptoError::Rng)?;
    Ok(digest_with_salt(password, &salt))
}

fn digest_with_salt(password: &str, salt: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(salt).expect("HMAC accepts any key length");
    mac.update(password.as_bytes());
    let tag = mac.finalize().into_bytes();
    format!("{}.{}", Base64::encode_string(salt), Base64::encode_string(&tag))
}

/// Verify a password against a stored digest.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let Some((salt_b64, tag_b64)) = stored.split_once('.') else {
        return false;
    };
    let Ok(salt) = Base64::decode_vec(salt_b64) else {
        return false;
    };
    let Ok(tag) = Base64::decode_vec(tag_b64) else {
        return false;
    };
    let mut mac = HmacSha256::new_from_slice(&salt).expect("HMAC accepts any key length");
    mac.update(password.as_bytes());
    mac.verify_slice(&tag).is_ok()
}

/// Decode the base64 `ENCRYPTION_KEY` value into AEAD key bytes.
pub fn decode_encryption_key(value: &str) -> Result<[u8; 32], CryptoError> {
    let bytes = Base64::decode_vec(value).map_err(|_| CryptoError::BadKey)?;
    bytes.try_into().map_err(|_| CryptoError::BadKey)
}

/// Encrypt a wallet secret with AES-256-GCM. Output: base64(nonce || ct || tag).
pub fn encrypt_secret(plaintext: &str, key: &[u8; 32]) -> Result<String, CryptoError> {
    let rng = SystemRandom::new();
    let mut nonce_bytes = [0u8; NONCE_LEN];
    rng.fill(&mut nonce_bytes).map_err(|_| CryptoError::Rng)?;

    let unbound = UnboundKey::new(&AES_256_GCM, key).map_err(|_| CryptoError::BadKey)?;
    let sealing = LessSafeKey::new(unbound);

    let mut buffer = plaintext.as_bytes().to_vec();
    sealing
        .seal_in_place_append_tag(
            Nonce::assume_unique_for_key(nonce_bytes),
            Aad::empty(),
            &mut buffer,
        )
        .map_err(|_| CryptoError::Rng)?;

    let mut out = Vec::with_capacity(NONCE_LEN + buffer.len());
    out.extend_from_slice(&nonce_bytes);
    out.extend_from_slice(&buffer);
    Ok(Base64::encode_string(&out))
}

/// Generate a custodial keypair.
///
/// The real signing backend is an external collaborator; here the secret is
/// 32 random bytes and the public key is derived by hashing, which is enough
/// for storage, ownership, and transfer accounting.
pub fn generate_keypair() -> Result<(String, String), CryptoError> {
    let rng = SystemRandom::new();
    let mut secret = [0u8; 32];
    rng.fill(&mut secret).map_err(|_| CryptoError::Rng)?;

    let public = Sha256::digest(secret);
    let public_key = format!("ACT{}", hex_encode(&public));
    let secret_key = Base64::encode_string(&secret);
    Ok((public_key, secret_key))
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    // Open `base64(nonce || ct || tag)` produced by `encrypt_secret`.
    fn open_secret(encoded: &str, key: &[u8; 32]) -> Result<String, CryptoError> {
        let bytes = Base64::decode_vec(encoded).map_err(|_| CryptoError::BadCiphertext)?;
        if bytes.len() < NONCE_LEN {
            return Err(CryptoError::BadCiphertext);
        }
        let (nonce_bytes, ciphertext) = bytes.split_at(NONCE_LEN);
        let nonce = Nonce::try_assume_unique_for_key(nonce_bytes)
            .map_err(|_| CryptoError::BadCiphertext)?;

        let unbound = UnboundKey::new(&AES_256_GCM, key).map_err(|_| CryptoError::BadKey)?;
        let opening = LessSafeKey::new(unbound);

        let mut buffer = ciphertext.to_vec();
        let plaintext = opening
            .open_in_place(nonce, Aad::empty(), &mut buffer)
            .map_err(|_| CryptoError::BadCiphertext)?;

        String::from_utf8(plaintext.to_vec()).map_err(|_| CryptoError::BadCiphertext)
    }

    #[test]
    fn normalize_email_trims_and_lowercases() {
        assert_eq!(normalize_email("  User@Example.COM "), "user@example.com");
        assert_eq!(normalize_email("café@example.com"), "café@example.com");
    }

    #[test]
    fn password_digest_roundtrip() {
        let digest = password_digest("correct horse").unwrap();
        assert!(verify_password("correct horse", &digest));
        assert!(!verify_password("wrong horse", &digest));
    }

    #[test]
    fn password_digests_are_salted() {
        let a = password_digest("same").unwrap();
        let b = password_digest("same").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn verify_password_rejects_malformed_digests() {
        assert!(!verify_password("x", "no-separator"));
        assert!(!verify_password("x", "!!!.###"));
    }

    #[test]
    fn secret_encryption_roundtrip() {
        let key = [7u8; 32];
        let encrypted = encrypt_secret("SECRETKEY123", &key).unwrap();
        assert_ne!(encrypted, "SECRETKEY123");
        let decrypted = open_secret(&encrypted, &key).unwrap();
        assert_eq!(decrypted, "SECRETKEY123");
    }

    #[test]
    fn decrypt_with_wrong_key_fails() {
        let encrypted = encrypt_secret("topsecret", &[1u8; 32]).unwrap();
        assert!(matches!(
            open_secret(&encrypted, &[2u8; 32]),
            Err(CryptoError::BadCiphertext)
        ));
    }

    #[test]
    fn generated_keypairs_are_unique_and_prefixed() {
        let (pub1, sec1) = generate_keypair().unwrap();
        let (pub2, sec2) = generate_keypair().unwrap();
        assert!(pub1.starts_with("ACT"));
        assert_eq!(pub1.len(), 3 + 64);
        assert_ne!(pub1, pub2);
        assert_ne!(sec1, sec2);
    }

    #[test]
    fn encryption_key_decoding() {
        let encoded = Base64::encode_string(&[9u8; 32]);
        assert_eq!(decode_encryption_key(&encoded).unwrap(), [9u8; 32]);
        assert!(decode_encryption_key("tooshort").is_err());
    }
}
