//! Negotiated SRTP/SRTCP keying material, as exported from the DTLS
//! handshake's `use_srtp` extension and the DTLS-SRTP keying material
//! exporter.

use crate::protection_profile::ProtectionProfile;

/// One direction's (read or write) master key and salt, as produced by the
/// DTLS keying-material export (RFC5764 §4.2).
#[derive(Debug, Clone)]
pub struct Keys {
    pub master_key: Vec<u8>,
    pub master_salt: Vec<u8>,
}

/// Everything a [`crate::context::Context`] needs to protect and
/// unprotect both directions of SRTP and SRTCP traffic for a session.
#[derive(Debug, Clone)]
pub struct Config {
    pub profile: ProtectionProfile,
    pub local: Keys,
    pub remote: Keys,
}

impl Config {
    pub fn new(profile: ProtectionProfile, local: Keys, remote: Keys) -> Self {
        Config {
            profile,
            local,
            remote,
        }
    }

    /// Splits a DTLS-exported keying material block into local/remote
    /// master key and salt pairs.
    ///
    /// The exporter returns `2 * (key_len + salt_len)` bytes laid out as
    /// `client_key || server_key || client_salt || server_salt`
    /// (RFC5764 §4.2); `is_client` picks which half is "local".
    pub fn from_keying_material(
        profile: ProtectionProfile,
        keying_material: &[u8],
        is_client: bool,
    ) -> Option<Self> {
        let key_len = profile.key_len();
        let salt_len = profile.salt_len();
        if keying_material.len() != 2 * (key_len + salt_len) {
            return None;
        }

        let mut offset = 0;
        let client_key = &keying_material[offset..offset + key_len];
        offset += key_len;
        let server_key = &keying_material[offset..offset + key_len];
        offset += key_len;
        let client_salt = &keying_material[offset..offset + salt_len];
        offset += salt_len;
        let server_salt = &keying_material[offset..offset + salt_len];

        let (local_key, local_salt, remote_key, remote_salt) = if is_client {
            (client_key, client_salt, server_key, server_salt)
        } else {
            (server_key, server_salt, client_key, client_salt)
        };

        Some(Config {
            profile,
            local: Keys {
                master_key: local_key.to_vec(),
                master_salt: local_salt.to_vec(),
            },
            remote: Keys {
                master_key: remote_key.to_vec(),
                master_salt: remote_salt.to_vec(),
            },
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn splits_keying_material_for_client_and_server() {
        let profile = ProtectionProfile::Aes128CmHmacSha1_80;
        let mut material = Vec::new();
        material.extend(std::iter::repeat_n(1u8, 16)); // client key
        material.extend(std::iter::repeat_n(2u8, 16)); // server key
        material.extend(std::iter::repeat_n(3u8, 14)); // client salt
        material.extend(std::iter::repeat_n(4u8, 14)); // server salt

        let client = Config::from_keying_material(profile, &material, true).unwrap();
        assert_eq!(client.local.master_key, vec![1u8; 16]);
        assert_eq!(client.remote.master_key, vec![2u8; 16]);
        assert_eq!(client.local.master_salt, vec![3u8; 14]);
        assert_eq!(client.remote.master_salt, vec![4u8; 14]);

        let server = Config::from_keying_material(profile, &material, false).unwrap();
        assert_eq!(server.local.master_key, vec![2u8; 16]);
        assert_eq!(server.remote.master_key, vec![1u8; 16]);
    }

    #[test]
    fn rejects_wrong_length_material() {
        let profile = ProtectionProfile::Aes128CmHmacSha1_80;
        assert!(Config::from_keying_material(profile, &[0u8; 10], true).is_none());
    }
}
