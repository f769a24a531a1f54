//! SRTP key derivation (RFC3711 §4.3.1): an AES-CM based PRF that turns a
//! master key/salt pair into the session encryption key, session salt, and
//! session authentication key.

use aes::Aes128;
use aes::cipher::{KeyIvInit, StreamCipher};
use ctr::Ctr128BE;
use shared::error::{Error, Result};

pub(crate) const LABEL_SRTP_ENCRYPTION: u8 = 0x00;
pub(crate) const LABEL_SRTP_AUTHENTICATION_TAG: u8 = 0x01;
pub(crate) const LABEL_SRTP_SALT: u8 = 0x02;
pub(crate) const LABEL_SRTCP_ENCRYPTION: u8 = 0x03;
pub(crate) const LABEL_SRTCP_AUTHENTICATION_TAG: u8 = 0x04;
pub(crate) const LABEL_SRTCP_SALT: u8 = 0x05;

/// Derives `out_len` bytes of key material for `label` from a master
/// key/salt pair, using AES-128 in counter mode as the PRF. Only a key
/// derivation rate of zero (the common case — rekeying is handled by
/// renegotiating via DTLS, not by KDR) is supported.
pub(crate) fn aes_cm_key_derivation(
    label: u8,
    master_key: &[u8],
    master_salt: &[u8],
    out_len: usize,
) -> Result<Vec<u8>> {
    if master_key.len() != 16 {
        return Err(Error::InvalidMasterKeyLength);
    }

    // prf_in = master_salt, zero-padded to the block size, with `label`
    // XORed into the byte just before the padding (RFC3711 §4.3.1).
    let mut prf_in = [0u8; 16];
    prf_in[..master_salt.len()].copy_from_slice(master_salt);
    prf_in[7] ^= label;

    let mut cipher = Ctr128BE::<Aes128>::new(master_key.into(), (&prf_in).into());

    let padded_len = out_len.div_ceil(16) * 16;
    let mut out = vec![0u8; padded_len];
    cipher.apply_keystream(&mut out);
    out.truncate(out_len);
    Ok(out)
}

pub(crate) struct SessionKeys {
    pub(crate) session_key: Vec<u8>,
    pub(crate) session_salt: Vec<u8>,
    pub(crate) auth_key: Vec<u8>,
}

pub(crate) fn derive_session_keys(
    master_key: &[u8],
    master_salt: &[u8],
    key_len: usize,
    salt_len: usize,
    auth_key_len: usize,
    encryption_label: u8,
    salt_label: u8,
    auth_label: u8,
) -> Result<SessionKeys> {
    let session_key = aes_cm_key_derivation(encryption_label, master_key, master_salt, key_len)?;
    let session_salt = aes_cm_key_derivation(salt_label, master_key, master_salt, salt_len)?;
    let auth_key = if auth_key_len > 0 {
        aes_cm_key_derivation(auth_label, master_key, master_salt, auth_key_len)?
    } else {
        Vec::new()
    };
    Ok(SessionKeys {
        session_key,
        session_salt,
        auth_key,
    })
}
