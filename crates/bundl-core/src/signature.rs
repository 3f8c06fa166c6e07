//! Signature splitting and EIP-2098 compact form.
//!
//! The settlement contract takes signatures as `(r, vs)` where the recovery
//! bit is packed into the high bit of `vs`. Canonical ECDSA guarantees `s`'s
//! high bit is clear; a set bit means a malleable signature and is rejected
//! before any bytes are emitted.

use alloy::primitives::B256;

use crate::error::{CoreError, Result};

/// Expected hex length of a 65-byte signature (without the 0x prefix).
pub const SIGNATURE_HEX_LEN: usize = 130;

/// A full 65-byte `(r, s, v)` signature, `v` normalized to 27/28.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signature65 {
    pub r: B256,
    pub s: B256,
    pub v: u8,
}

impl Signature65 {
    /// Parse from a hex string (`0x` prefix optional).
    ///
    /// Length is validated before any slicing; malformed input never yields
    /// partial output.
    pub fn from_hex(signature: &str) -> Result<Self> {
        let stripped = signature.strip_prefix("0x").unwrap_or(signature);
        if stripped.len() != SIGNATURE_HEX_LEN {
            return Err(CoreError::SignatureLength {
                expected: SIGNATURE_HEX_LEN,
                actual: stripped.len(),
            });
        }

        let bytes = hex::decode(stripped)?;
        let v = match bytes[64] {
            v @ (27 | 28) => v,
            v @ (0 | 1) => v + 27,
            v => return Err(CoreError::InvalidRecoveryId(v)),
        };

        Ok(Self {
            r: B256::from_slice(&bytes[..32]),
            s: B256::from_slice(&bytes[32..64]),
            v,
        })
    }

    /// Serialize to the 65-byte wire form.
    pub fn to_bytes(&self) -> [u8; 65] {
        let mut out = [0u8; 65];
        out[..32].copy_from_slice(self.r.as_slice());
        out[32..64].copy_from_slice(self.s.as_slice());
        out[64] = self.v;
        out
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.to_bytes()))
    }

    /// Convert to compact `(r, vs)` form.
    ///
    /// Rejects non-canonical `s` (high bit set): packing would silently
    /// corrupt the recovery bit and waste gas on a doomed fill.
    pub fn to_compact(&self) -> Result<CompactSignature> {
        if self.s[0] & 0x80 != 0 {
            return Err(CoreError::NonCanonicalS);
        }
        let mut vs = self.s;
        if self.v == 28 {
            vs.0[0] |= 0x80;
        }
        Ok(CompactSignature { r: self.r, vs })
    }
}

/// EIP-2098 compact 64-byte signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompactSignature {
    pub r: B256,
    pub vs: B256,
}

impl CompactSignature {
    /// Recover the full `(r, s, v)` form.
    pub fn split(&self) -> Signature65 {
        let v = if self.vs[0] & 0x80 != 0 { 28 } else { 27 };
        let mut s = self.vs;
        s.0[0] &= 0x7f;
        Signature65 { r: self.r, s, v }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sig(v: u8) -> Signature65 {
        Signature65 {
            r: B256::repeat_byte(0x11),
            s: B256::from_slice(&{
                let mut s = [0x22u8; 32];
                s[0] = 0x12; // canonical: high bit clear
                s
            }),
            v,
        }
    }

    #[test]
    fn compact_roundtrip_both_parities() {
        for v in [27, 28] {
            let original = sig(v);
            let compact = original.to_compact().unwrap();
            assert_eq!(compact.vs[0] & 0x80 != 0, v == 28);
            assert_eq!(compact.split(), original);
        }
    }

    #[test]
    fn non_canonical_s_is_rejected() {
        let mut bad = sig(27);
        bad.s.0[0] = 0x80;
        assert!(matches!(bad.to_compact(), Err(CoreError::NonCanonicalS)));
    }

    #[test]
    fn from_hex_validates_length_first() {
        // 128 hex chars: too short, rejected before decoding.
        let short = format!("0x{}", "ab".repeat(64));
        let err = Signature65::from_hex(&short).unwrap_err();
        assert!(matches!(
            err,
            CoreError::SignatureLength {
                expected: 130,
                actual: 128
            }
        ));

        let long = format!("0x{}", "ab".repeat(66));
        assert!(Signature65::from_hex(&long).is_err());
    }

    #[test]
    fn from_hex_normalizes_recovery_id() {
        let raw = format!("{}{}{:02x}", "11".repeat(32), "22".repeat(32), 0);
        let parsed = Signature65::from_hex(&raw).unwrap();
        assert_eq!(parsed.v, 27);

        let raw = format!("0x{}{}{:02x}", "11".repeat(32), "22".repeat(32), 28);
        assert_eq!(Signature65::from_hex(&raw).unwrap().v, 28);
    }

    #[test]
    fn from_hex_rejects_bad_recovery_id() {
        let raw = format!("0x{}{}{:02x}", "11".repeat(32), "22".repeat(32), 5);
        assert!(matches!(
            Signature65::from_hex(&raw),
            Err(CoreError::InvalidRecoveryId(5))
        ));
    }

    #[test]
    fn hex_roundtrip() {
        let original = sig(28);
        let parsed = Signature65::from_hex(&original.to_hex()).unwrap();
        assert_eq!(parsed, original);
    }
}
