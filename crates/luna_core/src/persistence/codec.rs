//! `.luna` payload codec.
//!
//! Layout before base64:
//! `b"LUNA1" | nonce (12) | tag (16) | AES-256-GCM ciphertext of gzip(JSON)`.

use super::document::workspace_from_slice;
use super::{CodecError, DocumentError};
use crate::model::workspace::Workspace;
use aes_gcm::aead::AeadInPlace;
use aes_gcm::{Aes256Gcm, KeyInit, Nonce, Tag};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};
use std::io::{Read, Write};

/// Format-version tag at the start of every decoded payload.
pub const MAGIC_HEADER: &[u8; 5] = b"LUNA1";
pub const NONCE_LEN: usize = 12;
pub const TAG_LEN: usize = 16;
const HEADER_LEN: usize = MAGIC_HEADER.len() + NONCE_LEN + TAG_LEN;

// Embedded key material. Not a secret: anyone with the binary can decrypt.
const KEY_MATERIAL: &[u8] = b"luna-notebook/workspace-file/v1";

/// Encodes a workspace into the base64 `.luna` payload.
///
/// Takes the workspace by shared reference, so it cannot change while the
/// snapshot is being encoded.
pub fn serialize(workspace: &Workspace) -> Result<String, CodecError> {
    let json = serde_json::to_vec(workspace).map_err(DocumentError::Encode)?;
    let compressed = gzip(&json)?;
    let sealed = seal(compressed)?;
    Ok(STANDARD.encode(sealed))
}

/// Decodes a base64 `.luna` payload back into a workspace.
///
/// # Errors
/// - `InvalidBase64`, `MissingMagicHeader`, `Truncated` for framing issues.
/// - `Authentication` when the tag check fails.
/// - `Compression` when the plaintext is not gzip.
/// - `Document` for invalid JSON or an unsupported `version`.
pub fn deserialize(payload: &str) -> Result<Workspace, CodecError> {
    let bytes = STANDARD.decode(payload.trim())?;
    let compressed = open(bytes)?;
    let json = gunzip(&compressed)?;
    Ok(workspace_from_slice(&json)?)
}

fn cipher() -> Result<Aes256Gcm, CodecError> {
    let key = Sha256::digest(KEY_MATERIAL);
    Aes256Gcm::new_from_slice(key.as_slice())
        .map_err(|err| CodecError::Cipher(format!("key init failed: {err}")))
}

fn seal(mut plaintext: Vec<u8>) -> Result<Vec<u8>, CodecError> {
    let mut nonce = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce);
    let tag = cipher()?
        .encrypt_in_place_detached(Nonce::from_slice(&nonce), b"", &mut plaintext)
        .map_err(|err| CodecError::Cipher(format!("encrypt failed: {err}")))?;

    let mut out = Vec::with_capacity(HEADER_LEN + plaintext.len());
    out.extend_from_slice(MAGIC_HEADER);
    out.extend_from_slice(&nonce);
    out.extend_from_slice(tag.as_slice());
    out.extend_from_slice(&plaintext);
    Ok(out)
}

fn open(mut sealed: Vec<u8>) -> Result<Vec<u8>, CodecError> {
    if !sealed.starts_with(MAGIC_HEADER) {
        return Err(CodecError::MissingMagicHeader);
    }
    if sealed.len() < HEADER_LEN {
        return Err(CodecError::Truncated {
            len: sealed.len(),
            min_len: HEADER_LEN,
        });
    }

    let mut ciphertext = sealed.split_off(HEADER_LEN);
    let nonce_start = MAGIC_HEADER.len();
    let tag_start = nonce_start + NONCE_LEN;
    let nonce = Nonce::from_slice(&sealed[nonce_start..tag_start]);
    let tag = Tag::from_slice(&sealed[tag_start..HEADER_LEN]);
    cipher()?
        .decrypt_in_place_detached(nonce, b"", &mut ciphertext, tag)
        .map_err(|_| CodecError::Authentication)?;
    Ok(ciphertext)
}

fn gzip(bytes: &[u8]) -> Result<Vec<u8>, CodecError> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(bytes).map_err(CodecError::Compression)?;
    encoder.finish().map_err(CodecError::Compression)
}

fn gunzip(bytes: &[u8]) -> Result<Vec<u8>, CodecError> {
    let mut decoder = GzDecoder::new(bytes);
    let mut out = Vec::new();
    decoder
        .read_to_end(&mut out)
        .map_err(CodecError::Compression)?;
    Ok(out)
}
