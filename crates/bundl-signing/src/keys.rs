//! Private key loading.
//!
//! Security notes:
//! - Raw key bytes are held in zeroizing buffers during parsing.
//! - Keys are loaded once at startup; no runtime rotation.
//! - Never log private key material.

use std::path::PathBuf;

use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;
use tracing::info;
use zeroize::Zeroizing;

use crate::error::KeyError;

/// Source of the signing key.
#[derive(Debug, Clone)]
pub enum KeySource {
    /// Load from environment variable (development).
    EnvVar { var_name: String },
    /// Load from file (production, recommend 0600 permissions).
    File { path: PathBuf },
}

/// Holds the maker/fill signing key.
pub struct KeyManager {
    signer: PrivateKeySigner,
    address: Address,
}

impl KeyManager {
    /// Load the key from the given source and verify the derived address.
    ///
    /// # Errors
    /// Returns `KeyError` if the source is missing, the hex is malformed,
    /// the key is invalid, or the derived address does not match `expected`.
    pub fn load(source: &KeySource, expected: Option<Address>) -> Result<Self, KeyError> {
        let secret: Zeroizing<Vec<u8>> = match source {
            KeySource::EnvVar { var_name } => {
                let hex = std::env::var(var_name)
                    .map_err(|_| KeyError::EnvVarNotFound(var_name.clone()))?;
                parse_hex_key(&hex)?
            }
            KeySource::File { path } => {
                let content = std::fs::read_to_string(path)?;
                parse_hex_key(&content)?
            }
        };

        let manager = Self::from_bytes(&secret, expected)?;
        info!(address = %manager.address, "Signing key loaded");
        Ok(manager)
    }

    /// Build from raw key bytes.
    pub fn from_bytes(secret: &[u8], expected: Option<Address>) -> Result<Self, KeyError> {
        let signer = PrivateKeySigner::from_slice(secret)
            .map_err(|e| KeyError::InvalidKey(e.to_string()))?;

        if let Some(expected) = expected {
            if signer.address() != expected {
                return Err(KeyError::AddressMismatch {
                    expected,
                    actual: signer.address(),
                });
            }
        }

        Ok(Self {
            address: signer.address(),
            signer,
        })
    }

    pub fn signer(&self) -> &PrivateKeySigner {
        &self.signer
    }

    pub fn address(&self) -> Address {
        self.address
    }
}

fn parse_hex_key(hex_str: &str) -> Result<Zeroizing<Vec<u8>>, KeyError> {
    let trimmed = hex_str.trim().trim_start_matches("0x");
    Ok(Zeroizing::new(hex::decode(trimmed)?))
}
