use crate::error::app_error::AppError;
use crate::models::session::{Identity, SessionClaims};
use aes_gcm::{
    Aes256Gcm, Nonce,
    aead::{Aead, AeadCore, KeyInit, OsRng},
};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{Duration, Utc};
use sha2::{Digest, Sha256};

const NONCE_LEN: usize = 12;

/// Encrypts session identities into opaque login tokens.
///
/// Token layout: `base64url(nonce || AES-256-GCM(json claims))`, key is
/// SHA-256 of the configured secret. Rotating the secret invalidates every
/// outstanding token.
pub struct TokenCodec {
    cipher: Aes256Gcm,
    ttl: Duration,
}

impl TokenCodec {
    pub fn new(secret: &str, ttl_seconds: i64) -> Self {
        let key = Sha256::digest(secret.as_bytes());
        Self {
            cipher: Aes256Gcm::new(&key),
            ttl: Duration::seconds(ttl_seconds.max(1)),
        }
    }

    pub fn encode(&self, identity: &Identity) -> Result<String, AppError> {
        let claims = SessionClaims {
            identity: identity.clone(),
            exp: (Utc::now() + self.ttl).timestamp(),
        };
        let plaintext = serde_json::to_vec(&claims)?;

        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = self
            .cipher
            .encrypt(&nonce, plaintext.as_slice())
            .map_err(|e| AppError::Crypto(format!("Token encryption failed: {}", e)))?;

        let mut bytes = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        bytes.extend_from_slice(&nonce);
        bytes.extend_from_slice(&ciphertext);
        Ok(URL_SAFE_NO_PAD.encode(bytes))
    }

    pub fn decode(&self, token: &str) -> Result<Identity, AppError> {
        if token.is_empty() {
            return Err(AppError::InvalidToken);
        }

        let bytes = URL_SAFE_NO_PAD.decode(token).map_err(|_| AppError::InvalidToken)?;
        if bytes.len() <= NONCE_LEN {
            return Err(AppError::InvalidToken);
        }

        let (nonce, ciphertext) = bytes.split_at(NONCE_LEN);
        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| AppError::InvalidToken)?;

        let claims: SessionClaims = serde_json::from_slice(&plaintext).map_err(|_| AppError::InvalidToken)?;
        if claims.exp <= Utc::now().timestamp() {
            return Err(AppError::InvalidToken);
        }

        Ok(claims.identity)
    }
}
