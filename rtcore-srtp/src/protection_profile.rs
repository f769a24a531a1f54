//! SRTP protection profiles (RFC 5764 §4.1.2), as negotiated over the DTLS
//! `use_srtp` extension and carried in `a=crypto`-free DTLS-SRTP offers.

use shared::error::{Error, Result};

/// A cipher suite used to protect SRTP/SRTCP packets.
///
/// The discriminant values match the IANA "DTLS-SRTP Protection Profile"
/// registry, so they round-trip directly through the `use_srtp` extension.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ProtectionProfile {
    Aes128CmHmacSha1_80 = 0x0001,
    Aes128CmHmacSha1_32 = 0x0002,
    AeadAes128Gcm = 0x0007,
    AeadAes256Gcm = 0x0008,
}

impl ProtectionProfile {
    /// AES key length in bytes.
    pub fn key_len(&self) -> usize {
        match self {
            ProtectionProfile::Aes128CmHmacSha1_80
            | ProtectionProfile::Aes128CmHmacSha1_32
            | ProtectionProfile::AeadAes128Gcm => 16,
            ProtectionProfile::AeadAes256Gcm => 32,
        }
    }

    /// Salt length in bytes.
    pub fn salt_len(&self) -> usize {
        match self {
            ProtectionProfile::Aes128CmHmacSha1_80
            | ProtectionProfile::Aes128CmHmacSha1_32 => 14,
            ProtectionProfile::AeadAes128Gcm | ProtectionProfile::AeadAes256Gcm => 12,
        }
    }

    /// Length, in bytes, of the authentication tag appended to each packet.
    pub fn auth_tag_len(&self) -> usize {
        match self {
            ProtectionProfile::Aes128CmHmacSha1_80 => 10,
            ProtectionProfile::Aes128CmHmacSha1_32 => 4,
            ProtectionProfile::AeadAes128Gcm | ProtectionProfile::AeadAes256Gcm => 16,
        }
    }

    /// AEAD ciphers fold authentication into the cipher itself and don't use
    /// a separate HMAC pass or auth-key derivation.
    pub fn is_aead(&self) -> bool {
        matches!(
            self,
            ProtectionProfile::AeadAes128Gcm | ProtectionProfile::AeadAes256Gcm
        )
    }

    /// Length, in bytes, of the auth key derived for this profile (zero for
    /// AEAD ciphers, which don't derive one).
    pub fn auth_key_len(&self) -> usize {
        if self.is_aead() { 0 } else { 20 }
    }
}

impl TryFrom<u16> for ProtectionProfile {
    type Error = Error;

    fn try_from(value: u16) -> Result<Self> {
        match value {
            0x0001 => Ok(ProtectionProfile::Aes128CmHmacSha1_80),
            0x0002 => Ok(ProtectionProfile::Aes128CmHmacSha1_32),
            0x0007 => Ok(ProtectionProfile::AeadAes128Gcm),
            0x0008 => Ok(ProtectionProfile::AeadAes256Gcm),
            _ => Err(Error::ErrNoSuchSrtpProfile),
        }
    }
}
