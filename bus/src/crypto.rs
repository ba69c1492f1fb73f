//! Optional AES-GCM payload encryption
//!
//! Encrypted frames are JSON objects `{"ciphertext", "tag", "nonce"}` with
//! hex-encoded fields. Only the first 16 bytes of the crypto key are used.

use crate::error::BusError;
use aes_gcm::aead::consts::U16;
use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng};
use aes_gcm::aes::Aes128;
use aes_gcm::{AesGcm, Nonce};
use serde::{Deserialize, Serialize};

/// AES-128 key length in bytes
pub const KEY_LEN: usize = 16;
const NONCE_LEN: usize = 16;
const TAG_LEN: usize = 16;

type HiveCipher = AesGcm<Aes128, U16>;

/// Wire form of an encrypted frame
#[derive(Debug, Serialize, Deserialize)]
pub struct EncryptedFrame {
    /// Hex-encoded ciphertext
    pub ciphertext: String,
    /// Hex-encoded authentication tag
    pub tag: String,
    /// Hex-encoded nonce
    pub nonce: String,
}

/// Check that `key` is long enough to encrypt with
pub fn validate_key(key: &str) -> Result<(), BusError> {
    if key.len() < KEY_LEN {
        return Err(BusError::InvalidCryptoKey(KEY_LEN));
    }
    Ok(())
}

fn cipher(key: &str) -> Result<HiveCipher, BusError> {
    validate_key(key)?;
    HiveCipher::new_from_slice(&key.as_bytes()[..KEY_LEN]).map_err(|_| BusError::InvalidCryptoKey(KEY_LEN))
}

/// Encrypt `plaintext` into a serialized [`EncryptedFrame`]
pub fn encrypt_as_json(key: &str, plaintext: &str) -> Result<String, BusError> {
    let cipher = cipher(key)?;
    let nonce = HiveCipher::generate_nonce(&mut OsRng);
    let mut sealed = cipher
        .encrypt(&nonce, plaintext.as_bytes())
        .map_err(|e| BusError::Encryption(e.to_string()))?;

    // aes-gcm appends the tag to the ciphertext
    let tag = sealed.split_off(sealed.len() - TAG_LEN);
    let frame = EncryptedFrame {
        ciphertext: hex::encode(sealed),
        tag: hex::encode(tag),
        nonce: hex::encode(nonce),
    };
    Ok(serde_json::to_string(&frame)?)
}

/// Decrypt a frame produced by [`encrypt_as_json`]
pub fn decrypt_from_json(key: &str, frame: &EncryptedFrame) -> Result<String, BusError> {
    let cipher = cipher(key)?;
    let decode = |field: &str, value: &str| {
        hex::decode(value).map_err(|e| BusError::Decryption(format!("{}: {}", field, e)))
    };

    let nonce = decode("nonce", &frame.nonce)?;
    if nonce.len() != NONCE_LEN {
        return Err(BusError::Decryption(format!(
            "nonce must be {} bytes, got {}",
            NONCE_LEN,
            nonce.len()
        )));
    }
    let mut sealed = decode("ciphertext", &frame.ciphertext)?;
    sealed.extend(decode("tag", &frame.tag)?);

    let plaintext = cipher
        .decrypt(Nonce::<U16>::from_slice(&nonce), sealed.as_slice())
        .map_err(|e| BusError::Decryption(e.to_string()))?;
    String::from_utf8(plaintext).map_err(|e| BusError::Decryption(e.to_string()))
}

/// Parse `raw` as an encrypted frame, if it looks like one
pub fn as_encrypted_frame(raw: &str) -> Option<EncryptedFrame> {
    serde_json::from_str(raw).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "43c4f64f936c6176";

    #[test]
    fn test_encrypt_then_decrypt() {
        let sealed = encrypt_as_json(KEY, r#"{"msg_type":"bus"}"#).unwrap();
        let frame = as_encrypted_frame(&sealed).unwrap();

        assert_eq!(hex::decode(&frame.nonce).unwrap().len(), NONCE_LEN);
        assert_eq!(hex::decode(&frame.tag).unwrap().len(), TAG_LEN);
        assert_eq!(decrypt_from_json(KEY, &frame).unwrap(), r#"{"msg_type":"bus"}"#);
    }

    #[test]
    fn test_long_key_is_truncated() {
        let sealed = encrypt_as_json("43c4f64f936c6176EXTRA", "hello").unwrap();
        let frame = as_encrypted_frame(&sealed).unwrap();
        assert_eq!(decrypt_from_json(KEY, &frame).unwrap(), "hello");
    }

    #[test]
    fn test_short_key_rejected() {
        assert!(matches!(
            encrypt_as_json("short", "hello"),
            Err(BusError::InvalidCryptoKey(16))
        ));
    }

    #[test]
    fn test_validate_key_length() {
        assert!(validate_key(KEY).is_ok());
        assert!(validate_key("43c4f64f936c6176EXTRA").is_ok());
        assert!(matches!(
            validate_key("43c4f64f936c617"),
            Err(BusError::InvalidCryptoKey(KEY_LEN))
        ));
    }

    #[test]
    fn test_wrong_key_fails() {
        let sealed = encrypt_as_json(KEY, "hello").unwrap();
        let frame = as_encrypted_frame(&sealed).unwrap();
        assert!(matches!(
            decrypt_from_json("ffffffffffffffff", &frame),
            Err(BusError::Decryption(_))
        ));
    }

    #[test]
    fn test_plain_frame_is_not_encrypted() {
        assert!(as_encrypted_frame(r#"{"msg_type":"bus","payload":{}}"#).is_none());
    }
}
