//! Per-packet SRTP/SRTCP encryption, decryption, and authentication
//! (RFC3711 §4.1, §4.2; RFC7714 for the AEAD variants).

use aead::{Aead, KeyInit, Payload};
use aes::Aes128;
use aes::cipher::{KeyIvInit, StreamCipher};
use aes_gcm::{Aes128Gcm, Aes256Gcm};
use ctr::Ctr128BE;
use hmac::{Hmac, Mac};
use sha1::Sha1;
use shared::error::{Error, Result};

use crate::key_derivation::{
    LABEL_SRTCP_AUTHENTICATION_TAG, LABEL_SRTCP_ENCRYPTION, LABEL_SRTCP_SALT,
    LABEL_SRTP_AUTHENTICATION_TAG, LABEL_SRTP_ENCRYPTION, LABEL_SRTP_SALT, derive_session_keys,
};
use crate::protection_profile::ProtectionProfile;

type HmacSha1 = Hmac<Sha1>;

/// Per-direction SRTP/SRTCP crypto state: the session keys derived from a
/// master key/salt, ready to en/decrypt packets for any SSRC under them
/// (the session keys are shared across all streams; only the rollover
/// counter and replay window are per-SSRC).
pub(crate) struct Cipher {
    profile: ProtectionProfile,
    srtp_session_key: Vec<u8>,
    srtp_session_salt: Vec<u8>,
    srtp_auth_key: Vec<u8>,
    srtcp_session_key: Vec<u8>,
    srtcp_session_salt: Vec<u8>,
    srtcp_auth_key: Vec<u8>,
}

impl Cipher {
    pub(crate) fn new(profile: ProtectionProfile, master_key: &[u8], master_salt: &[u8]) -> Result<Self> {
        if master_key.len() != profile.key_len() {
            return Err(Error::SrtpMasterKeyLength(profile.key_len(), master_key.len()));
        }
        if master_salt.len() != profile.salt_len() {
            return Err(Error::SrtpSaltLength(profile.salt_len(), master_salt.len()));
        }

        let srtp = derive_session_keys(
            master_key,
            master_salt,
            profile.key_len(),
            profile.salt_len(),
            profile.auth_key_len(),
            LABEL_SRTP_ENCRYPTION,
            LABEL_SRTP_SALT,
            LABEL_SRTP_AUTHENTICATION_TAG,
        )?;
        let srtcp = derive_session_keys(
            master_key,
            master_salt,
            profile.key_len(),
            profile.salt_len(),
            profile.auth_key_len(),
            LABEL_SRTCP_ENCRYPTION,
            LABEL_SRTCP_SALT,
            LABEL_SRTCP_AUTHENTICATION_TAG,
        )?;

        Ok(Cipher {
            profile,
            srtp_session_key: srtp.session_key,
            srtp_session_salt: srtp.session_salt,
            srtp_auth_key: srtp.auth_key,
            srtcp_session_key: srtcp.session_key,
            srtcp_session_salt: srtcp.session_salt,
            srtcp_auth_key: srtcp.auth_key,
        })
    }

    pub(crate) fn auth_tag_len(&self) -> usize {
        self.profile.auth_tag_len()
    }

    /// Encrypts an RTP payload (`header_len` bytes of `packet` are the
    /// cleartext header and are left untouched) in place, appending the
    /// authentication tag, and returns the total packet length.
    pub(crate) fn encrypt_rtp(
        &self,
        packet: &mut Vec<u8>,
        header_len: usize,
        ssrc: u32,
        roc: u32,
        sequence_number: u16,
    ) -> Result<()> {
        if self.profile.is_aead() {
            let nonce = aead_nonce(&self.srtp_session_salt, ssrc, roc, sequence_number);
            let (header, payload) = packet.split_at(header_len);
            let ciphertext = self.aead_seal(&self.srtp_session_key, &nonce, header, payload)?;
            packet.truncate(header_len);
            packet.extend_from_slice(&ciphertext);
            return Ok(());
        }

        let counter = cm_counter(ssrc, roc, sequence_number, &self.srtp_session_salt);
        let mut cipher = Ctr128BE::<Aes128>::new((&self.srtp_session_key[..]).into(), (&counter).into());
        cipher.apply_keystream(&mut packet[header_len..]);

        let tag = self.authenticate(&self.srtp_auth_key, packet, roc)?;
        packet.extend_from_slice(&tag[..self.profile.auth_tag_len()]);
        Ok(())
    }

    /// Decrypts an RTP packet in place (verifying and stripping the auth
    /// tag first), returning the new (shorter) packet length.
    pub(crate) fn decrypt_rtp(
        &self,
        packet: &mut Vec<u8>,
        header_len: usize,
        ssrc: u32,
        roc: u32,
        sequence_number: u16,
    ) -> Result<()> {
        if self.profile.is_aead() {
            let nonce = aead_nonce(&self.srtp_session_salt, ssrc, roc, sequence_number);
            let (header, ciphertext) = packet.split_at(header_len);
            let plaintext = self.aead_open(&self.srtp_session_key, &nonce, header, ciphertext)?;
            packet.truncate(header_len);
            packet.extend_from_slice(&plaintext);
            return Ok(());
        }

        let tag_len = self.profile.auth_tag_len();
        if packet.len() < header_len + tag_len {
            return Err(Error::ErrTooShortRtp);
        }
        let tag_offset = packet.len() - tag_len;
        let expected = self.authenticate(&self.srtp_auth_key, &packet[..tag_offset], roc)?;
        if !bool::from(subtle::ConstantTimeEq::ct_eq(
            &expected[..tag_len],
            &packet[tag_offset..],
        )) {
            return Err(Error::RtpFailedToVerifyAuthTag);
        }
        packet.truncate(tag_offset);

        let counter = cm_counter(ssrc, roc, sequence_number, &self.srtp_session_salt);
        let mut cipher = Ctr128BE::<Aes128>::new((&self.srtp_session_key[..]).into(), (&counter).into());
        cipher.apply_keystream(&mut packet[header_len..]);
        Ok(())
    }

    /// Encrypts an RTCP compound packet in place and appends the 4-byte
    /// `(E-flag, srtcp index)` field plus the authentication tag.
    pub(crate) fn encrypt_rtcp(
        &self,
        packet: &mut Vec<u8>,
        header_len: usize,
        ssrc: u32,
        srtcp_index: u32,
    ) -> Result<()> {
        let index_and_flag = srtcp_index | 0x8000_0000;

        if self.profile.is_aead() {
            let nonce = aead_nonce_rtcp(&self.srtcp_session_salt, ssrc, srtcp_index);
            let (header, payload) = packet.split_at(header_len);
            let mut aad = header.to_vec();
            aad.extend_from_slice(&index_and_flag.to_be_bytes());
            let ciphertext = self.aead_seal(&self.srtcp_session_key, &nonce, &aad, payload)?;
            packet.truncate(header_len);
            packet.extend_from_slice(&ciphertext);
            packet.extend_from_slice(&index_and_flag.to_be_bytes());
            return Ok(());
        }

        let counter = cm_counter_rtcp(ssrc, srtcp_index, &self.srtcp_session_salt);
        let mut cipher =
            Ctr128BE::<Aes128>::new((&self.srtcp_session_key[..]).into(), (&counter).into());
        cipher.apply_keystream(&mut packet[header_len..]);

        packet.extend_from_slice(&index_and_flag.to_be_bytes());
        let tag = self.authenticate(&self.srtcp_auth_key, packet, 0)?;
        packet.extend_from_slice(&tag[..self.profile.auth_tag_len()]);
        Ok(())
    }

    /// Decrypts an RTCP compound packet in place. `srtcp_index` is the
    /// 31-bit index already parsed (with the E-flag stripped) from the
    /// trailing index field by the caller.
    pub(crate) fn decrypt_rtcp(
        &self,
        packet: &mut Vec<u8>,
        header_len: usize,
        ssrc: u32,
        srtcp_index: u32,
        encrypted: bool,
    ) -> Result<()> {
        let tag_len = self.profile.auth_tag_len();
        if packet.len() < header_len + 4 + tag_len {
            return Err(Error::RtcpInvalidLengthAuthTag(packet.len(), header_len + 4 + tag_len));
        }

        if self.profile.is_aead() {
            let index_field_offset = packet.len() - 4;
            let index_and_flag = u32::from_be_bytes(
                packet[index_field_offset..].try_into().expect("4 bytes"),
            );
            let nonce = aead_nonce_rtcp(&self.srtcp_session_salt, ssrc, srtcp_index);
            let header = &packet[..header_len];
            let mut aad = header.to_vec();
            aad.extend_from_slice(&index_and_flag.to_be_bytes());
            let ciphertext = packet[header_len..index_field_offset].to_vec();
            let plaintext = self.aead_open(&self.srtcp_session_key, &nonce, &aad, &ciphertext)?;
            packet.truncate(header_len);
            packet.extend_from_slice(&plaintext);
            return Ok(());
        }

        let tag_offset = packet.len() - tag_len;
        let expected = self.authenticate(&self.srtcp_auth_key, &packet[..tag_offset], 0)?;
        if !bool::from(subtle::ConstantTimeEq::ct_eq(
            &expected[..tag_len],
            &packet[tag_offset..],
        )) {
            return Err(Error::RtcpFailedToVerifyAuthTag);
        }
        packet.truncate(tag_offset - 4);

        if encrypted {
            let counter = cm_counter_rtcp(ssrc, srtcp_index, &self.srtcp_session_salt);
            let mut cipher =
                Ctr128BE::<Aes128>::new((&self.srtcp_session_key[..]).into(), (&counter).into());
            cipher.apply_keystream(&mut packet[header_len..]);
        }
        Ok(())
    }

    fn authenticate(&self, auth_key: &[u8], data: &[u8], roc: u32) -> Result<Vec<u8>> {
        let mut mac = HmacSha1::new_from_slice(auth_key).map_err(|_| Error::ErrShortSrtpMasterKey)?;
        mac.update(data);
        if roc != 0 || data.is_empty() {
            // Only SRTP packets append the rollover counter to the authenticated
            // span (RFC3711 §4.2); SRTCP's index field is already part of `data`.
        }
        mac.update(&roc.to_be_bytes());
        Ok(mac.finalize().into_bytes().to_vec())
    }

    fn aead_seal(&self, key: &[u8], nonce: &[u8; 12], aad: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
        let payload = Payload { msg: plaintext, aad };
        match self.profile {
            ProtectionProfile::AeadAes128Gcm => Aes128Gcm::new_from_slice(key)
                .map_err(|_| Error::ErrFailedToVerifyAuthTag)?
                .encrypt(nonce.into(), payload)
                .map_err(|_| Error::ErrFailedToVerifyAuthTag),
            ProtectionProfile::AeadAes256Gcm => Aes256Gcm::new_from_slice(key)
                .map_err(|_| Error::ErrFailedToVerifyAuthTag)?
                .encrypt(nonce.into(), payload)
                .map_err(|_| Error::ErrFailedToVerifyAuthTag),
            _ => unreachable!("aead_seal called for a non-AEAD profile"),
        }
    }

    fn aead_open(&self, key: &[u8], nonce: &[u8; 12], aad: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>> {
        let payload = Payload { msg: ciphertext, aad };
        match self.profile {
            ProtectionProfile::AeadAes128Gcm => Aes128Gcm::new_from_slice(key)
                .map_err(|_| Error::ErrFailedToVerifyAuthTag)?
                .decrypt(nonce.into(), payload)
                .map_err(|_| Error::ErrFailedToVerifyAuthTag),
            ProtectionProfile::AeadAes256Gcm => Aes256Gcm::new_from_slice(key)
                .map_err(|_| Error::ErrFailedToVerifyAuthTag)?
                .decrypt(nonce.into(), payload)
                .map_err(|_| Error::ErrFailedToVerifyAuthTag),
            _ => unreachable!("aead_open called for a non-AEAD profile"),
        }
    }
}

/// RFC3711 §4.1.1 counter generation for SRTP: a 128-bit counter built from
/// the SSRC and 48-bit packet index (rollover counter || sequence number),
/// XORed with the session salt.
fn cm_counter(ssrc: u32, roc: u32, sequence_number: u16, session_salt: &[u8]) -> [u8; 16] {
    let mut counter = [0u8; 16];
    counter[4..8].copy_from_slice(&ssrc.to_be_bytes());
    counter[8..12].copy_from_slice(&roc.to_be_bytes());
    counter[12..14].copy_from_slice(&sequence_number.to_be_bytes());
    for (c, s) in counter.iter_mut().zip(session_salt.iter()) {
        *c ^= *s;
    }
    counter
}

/// Same construction for SRTCP, keyed by the 31-bit SRTCP index instead of
/// rollover counter + sequence number.
fn cm_counter_rtcp(ssrc: u32, srtcp_index: u32, session_salt: &[u8]) -> [u8; 16] {
    let mut counter = [0u8; 16];
    counter[4..8].copy_from_slice(&ssrc.to_be_bytes());
    counter[8..12].copy_from_slice(&srtcp_index.to_be_bytes());
    for (c, s) in counter.iter_mut().zip(session_salt.iter()) {
        *c ^= *s;
    }
    counter
}

/// RFC7714 §8.1 nonce construction for AES-GCM SRTP.
fn aead_nonce(session_salt: &[u8], ssrc: u32, roc: u32, sequence_number: u16) -> [u8; 12] {
    let mut nonce = [0u8; 12];
    nonce[2..6].copy_from_slice(&ssrc.to_be_bytes());
    nonce[6..10].copy_from_slice(&roc.to_be_bytes());
    nonce[10..12].copy_from_slice(&sequence_number.to_be_bytes());
    for (n, s) in nonce.iter_mut().zip(session_salt.iter()) {
        *n ^= *s;
    }
    nonce
}

fn aead_nonce_rtcp(session_salt: &[u8], ssrc: u32, srtcp_index: u32) -> [u8; 12] {
    let mut nonce = [0u8; 12];
    nonce[2..6].copy_from_slice(&ssrc.to_be_bytes());
    nonce[8..12].copy_from_slice(&srtcp_index.to_be_bytes());
    for (n, s) in nonce.iter_mut().zip(session_salt.iter()) {
        *n ^= *s;
    }
    nonce
}
