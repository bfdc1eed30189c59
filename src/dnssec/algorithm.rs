use std::fmt;

use ring::signature::{self, RsaPublicKeyComponents, UnparsedPublicKey};

use super::errors::{DnsSecError, Result};

/// DNSSEC signing algorithms the probe can verify (RFC 4034, 5702, 6605, 8080)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum DnsSecAlgorithm {
    /// RSA/SHA-1 (RFC 3110)
    RsaSha1 = 5,
    /// RSASHA1-NSEC3-SHA1 (RFC 5155)
    RsaSha1Nsec3Sha1 = 7,
    /// RSA/SHA-256 (RFC 5702)
    RsaSha256 = 8,
    /// RSA/SHA-512 (RFC 5702)
    RsaSha512 = 10,
    /// ECDSA Curve P-256 with SHA-256 (RFC 6605)
    EcdsaP256Sha256 = 13,
    /// ECDSA Curve P-384 with SHA-384 (RFC 6605)
    EcdsaP384Sha384 = 14,
    /// Ed25519 (RFC 8080)
    Ed25519 = 15,
}

impl DnsSecAlgorithm {
    /// Map an algorithm number, `None` when verification is not supported
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            5 => Some(Self::RsaSha1),
            7 => Some(Self::RsaSha1Nsec3Sha1),
            8 => Some(Self::RsaSha256),
            10 => Some(Self::RsaSha512),
            13 => Some(Self::EcdsaP256Sha256),
            14 => Some(Self::EcdsaP384Sha384),
            15 => Some(Self::Ed25519),
            _ => None,
        }
    }

    pub fn to_u8(self) -> u8 {
        self as u8
    }

    /// Verify `sig` over `message` with a DNSKEY public key field.
    pub fn verify(self, public_key: &[u8], message: &[u8], sig: &[u8]) -> Result<()> {
        match self {
            Self::RsaSha1 | Self::RsaSha1Nsec3Sha1 | Self::RsaSha256 | Self::RsaSha512 => {
                let params = match self {
                    Self::RsaSha256 => &signature::RSA_PKCS1_1024_8192_SHA256_FOR_LEGACY_USE_ONLY,
                    Self::RsaSha512 => &signature::RSA_PKCS1_1024_8192_SHA512_FOR_LEGACY_USE_ONLY,
                    _ => &signature::RSA_PKCS1_1024_8192_SHA1_FOR_LEGACY_USE_ONLY,
                };
                rsa_components(public_key)?
                    .verify(params, message, sig)
                    .map_err(|_| DnsSecError::SignatureVerificationFailed)
            }
            Self::EcdsaP256Sha256 | Self::EcdsaP384Sha384 => {
                let (params, key_len) = if self == Self::EcdsaP256Sha256 {
                    (&signature::ECDSA_P256_SHA256_FIXED, 64)
                } else {
                    (&signature::ECDSA_P384_SHA384_FIXED, 96)
                };
                if public_key.len() != key_len {
                    return Err(DnsSecError::InvalidPublicKey);
                }
                // ring expects an uncompressed SEC1 point
                let mut point = Vec::with_capacity(key_len + 1);
                point.push(0x04);
                point.extend_from_slice(public_key);
                UnparsedPublicKey::new(params, &point)
                    .verify(message, sig)
                    .map_err(|_| DnsSecError::SignatureVerificationFailed)
            }
            Self::Ed25519 => {
                if public_key.len() != 32 {
                    return Err(DnsSecError::InvalidPublicKey);
                }
                UnparsedPublicKey::new(&signature::ED25519, public_key)
                    .verify(message, sig)
                    .map_err(|_| DnsSecError::SignatureVerificationFailed)
            }
        }
    }
}

/// Split an RFC 3110 public key into exponent and modulus.
fn rsa_components(key: &[u8]) -> Result<RsaPublicKeyComponents<&[u8]>> {
    let (exp_len, start) = match key {
        [0, hi, lo, ..] => (((*hi as usize) << 8) | *lo as usize, 3),
        [len, ..] => (*len as usize, 1),
        [] => return Err(DnsSecError::InvalidPublicKey),
    };
    if exp_len == 0 || key.len() <= start + exp_len {
        return Err(DnsSecError::InvalidPublicKey);
    }
    Ok(RsaPublicKeyComponents {
        n: &key[start + exp_len..],
        e: &key[start..start + exp_len],
    })
}

impl fmt::Display for DnsSecAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RsaSha1 => write!(f, "RSASHA1"),
            Self::RsaSha1Nsec3Sha1 => write!(f, "RSASHA1-NSEC3-SHA1"),
            Self::RsaSha256 => write!(f, "RSASHA256"),
            Self::RsaSha512 => write!(f, "RSASHA512"),
            Self::EcdsaP256Sha256 => write!(f, "ECDSAP256SHA256"),
            Self::EcdsaP384Sha384 => write!(f, "ECDSAP384SHA384"),
            Self::Ed25519 => write!(f, "ED25519"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ring::signature::{Ed25519KeyPair, KeyPair};

    #[test]
    fn test_algorithm_numbers() {
        assert_eq!(DnsSecAlgorithm::from_u8(8), Some(DnsSecAlgorithm::RsaSha256));
        assert_eq!(DnsSecAlgorithm::from_u8(3), None);
        assert_eq!(DnsSecAlgorithm::from_u8(16), None);
        assert_eq!(DnsSecAlgorithm::Ed25519.to_u8(), 15);
        assert_eq!(DnsSecAlgorithm::EcdsaP256Sha256.to_string(), "ECDSAP256SHA256");
    }

    #[test]
    fn test_ed25519_verification() {
        let pair = Ed25519KeyPair::from_seed_unchecked(&[7u8; 32]).unwrap();
        let sig = pair.sign(b"signed data");
        let key = pair.public_key().as_ref();

        assert!(DnsSecAlgorithm::Ed25519.verify(key, b"signed data", sig.as_ref()).is_ok());
        assert_eq!(
            DnsSecAlgorithm::Ed25519.verify(key, b"other data", sig.as_ref()),
            Err(DnsSecError::SignatureVerificationFailed)
        );
        assert_eq!(
            DnsSecAlgorithm::Ed25519.verify(&key[..31], b"signed data", sig.as_ref()),
            Err(DnsSecError::InvalidPublicKey)
        );
    }

    #[test]
    fn test_rsa_key_parsing() {
        let key = [0x03, 0x01, 0x00, 0x01, 0xaa, 0xbb];
        let parts = rsa_components(&key).unwrap();
        assert_eq!(parts.e, &[0x01, 0x00, 0x01]);
        assert_eq!(parts.n, &[0xaa, 0xbb]);

        let long = [0x00, 0x00, 0x01, 0x03, 0xcc];
        let parts = rsa_components(&long).unwrap();
        assert_eq!(parts.e, &[0x03]);
        assert_eq!(parts.n, &[0xcc]);

        assert!(rsa_components(&[0x04, 0x01]).is_err());
        assert!(rsa_components(&[]).is_err());
    }

    #[test]
    fn test_ecdsa_rejects_wrong_key_length() {
        assert_eq!(
            DnsSecAlgorithm::EcdsaP256Sha256.verify(&[0u8; 63], b"x", &[0u8; 64]),
            Err(DnsSecError::InvalidPublicKey)
        );
    }
}
