//! Token codec: signing, parsing and verification of the three-segment
//! token format.

use std::fmt;

use base64::engine::general_purpose::{URL_SAFE, URL_SAFE_NO_PAD};
use base64::Engine;
use constant_time_eq::constant_time_eq;
use hmac::{Hmac, Mac};
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::domain::entities::token::{Header, Payload};
use crate::errors::{ConfigError, TokenError, TokenResult};

type HmacSha256 = Hmac<Sha256>;

/// Encodes payloads into signed tokens and verifies them back
///
/// The signing key only lives inside the keyed MAC state; the codec keeps a
/// SHA-256 digest of it for namespacing revocation keys.
#[derive(Clone)]
pub struct TokenCodec {
    mac: HmacSha256,
    key_digest: String,
}

impl TokenCodec {
    /// Creates a codec signing with `key`
    pub fn new(key: impl AsRef<[u8]>) -> Result<Self, ConfigError> {
        let key = key.as_ref();
        let mac = HmacSha256::new_from_slice(key).map_err(|_| ConfigError::InvalidValue {
            field: "secret",
            reason: "rejected as HMAC key",
        })?;

        Ok(Self {
            mac,
            key_digest: hex_digest(key),
        })
    }

    /// Hex SHA-256 digest of the signing key
    pub fn key_digest(&self) -> &str {
        &self.key_digest
    }

    /// Encodes and signs `payload`
    ///
    /// # Errors
    ///
    /// `EncodeFailure` if the header or payload cannot be serialized.
    pub fn encode(&self, payload: &Payload) -> TokenResult<String> {
        let header_encoded = encode_part(&Header::default())?;
        let payload_encoded = encode_part(payload)?;
        let signing_input = format!("{header_encoded}.{payload_encoded}");
        let signature = self.sign(signing_input.as_bytes());
        Ok(format!(
            "{signing_input}.{}",
            URL_SAFE_NO_PAD.encode(signature)
        ))
    }

    /// Verifies `token` and returns its payload if it has not expired at `now`
    ///
    /// The header and signature are checked before any payload field is used.
    ///
    /// # Errors
    ///
    /// * `MalformedToken` - wrong segment count, empty segment, bad base64,
    ///   unparseable JSON or an algorithm other than HS256
    /// * `InvalidSignature` - the MAC does not match
    /// * `Expired` - `now >= exp`
    pub fn decode(&self, token: &str, now: i64) -> TokenResult<Payload> {
        let mut segments = token.split('.');
        let (Some(header_part), Some(payload_part), Some(signature_part), None) = (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) else {
            return Err(TokenError::MalformedToken);
        };
        if header_part.is_empty() || payload_part.is_empty() || signature_part.is_empty() {
            return Err(TokenError::MalformedToken);
        }

        let header_raw = decode_segment(header_part)?;
        let payload_raw = decode_segment(payload_part)?;
        let signature_raw = decode_segment(signature_part)?;

        let header: Header =
            serde_json::from_slice(&header_raw).map_err(|_| TokenError::MalformedToken)?;
        if !header.is_supported() {
            return Err(TokenError::MalformedToken);
        }

        if !self.verify(header_part, payload_part, &signature_raw) {
            return Err(TokenError::InvalidSignature);
        }

        let payload: Payload =
            serde_json::from_slice(&payload_raw).map_err(|_| TokenError::MalformedToken)?;
        if payload.is_expired_at(now) {
            return Err(TokenError::Expired);
        }

        Ok(payload)
    }

    fn sign(&self, input: &[u8]) -> Vec<u8> {
        let mut mac = self.mac.clone();
        mac.update(input);
        mac.finalize().into_bytes().to_vec()
    }

    fn verify(&self, header_part: &str, payload_part: &str, signature: &[u8]) -> bool {
        let mut signing_input = Vec::with_capacity(header_part.len() + payload_part.len() + 1);
        signing_input.extend_from_slice(header_part.as_bytes());
        signing_input.push(b'.');
        signing_input.extend_from_slice(payload_part.as_bytes());

        let expected = self.sign(&signing_input);
        constant_time_eq(&expected, signature)
    }
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("key_digest", &self.key_digest)
            .finish_non_exhaustive()
    }
}

/// Hex SHA-256 digest, used for revocation key components
pub(crate) fn hex_digest(input: impl AsRef<[u8]>) -> String {
    hex::encode(Sha256::digest(input.as_ref()))
}

fn encode_part<T: Serialize>(value: &T) -> TokenResult<String> {
    let json = serde_json::to_vec(value).map_err(TokenError::EncodeFailure)?;
    Ok(URL_SAFE_NO_PAD.encode(json))
}

/// Base64url-decodes a segment, right-padding it with `=` to a multiple of
/// four so padded and unpadded input are both accepted
pub(crate) fn decode_segment(segment: &str) -> TokenResult<Vec<u8>> {
    let remainder = segment.len() % 4;
    let decoded = if remainder == 0 {
        URL_SAFE.decode(segment)
    } else {
        let mut padded = String::with_capacity(segment.len() + 4 - remainder);
        padded.push_str(segment);
        padded.extend(std::iter::repeat('=').take(4 - remainder));
        URL_SAFE.decode(padded)
    };
    decoded.map_err(|_| TokenError::MalformedToken)
}
