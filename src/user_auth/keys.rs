//! RS256 key material.
//!
//! Built once at startup from configuration and shared read-only through an
//! `Arc`. Construction fails for unparsable PEM and for a private/public pair
//! that does not belong together, so the process refuses to start instead of
//! failing every login later.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::RsaConfig;

/// The only algorithm tokens are signed with and accepted under.
pub const SIGNING_ALGORITHM: Algorithm = Algorithm::RS256;

#[derive(Debug, Error)]
pub enum KeyError {
    #[error("invalid RSA private key: {0}")]
    PrivateKey(#[source] jsonwebtoken::errors::Error),

    #[error("invalid RSA public key: {0}")]
    PublicKey(#[source] jsonwebtoken::errors::Error),

    #[error("key pair self-test failed: {0}")]
    SelfTest(#[source] jsonwebtoken::errors::Error),
}

pub struct KeyMaterial {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

#[derive(Serialize, Deserialize)]
struct Probe {
    probe: String,
}

impl KeyMaterial {
    pub fn from_pem(private_pem: &str, public_pem: &str) -> Result<Self, KeyError> {
        let encoding =
            EncodingKey::from_rsa_pem(private_pem.as_bytes()).map_err(KeyError::PrivateKey)?;
        let decoding =
            DecodingKey::from_rsa_pem(public_pem.as_bytes()).map_err(KeyError::PublicKey)?;

        let material = Self { encoding, decoding };
        material.self_test()?;
        Ok(material)
    }

    pub fn from_config(config: &RsaConfig) -> Result<Self, KeyError> {
        Self::from_pem(&config.private, &config.public)
    }

    pub(crate) fn encoding_key(&self) -> &EncodingKey {
        &self.encoding
    }

    pub(crate) fn decoding_key(&self) -> &DecodingKey {
        &self.decoding
    }

    // Sign with the private half, verify with the public half.
    fn self_test(&self) -> Result<(), KeyError> {
        let probe = Probe {
            probe: "todose".to_string(),
        };
        let token = encode(&Header::new(SIGNING_ALGORITHM), &probe, &self.encoding)
            .map_err(KeyError::SelfTest)?;

        let mut validation = Validation::new(SIGNING_ALGORITHM);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();
        decode::<Probe>(&token, &self.decoding, &validation).map_err(KeyError::SelfTest)?;
        Ok(())
    }
}

impl std::fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("algorithm", &SIGNING_ALGORITHM)
            .finish_non_exhaustive()
    }
}
