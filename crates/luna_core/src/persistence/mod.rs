//! Workspace persistence: document JSON, `.luna` codec and file I/O.
//!
//! # Responsibility
//! - Encode a `Workspace` as JSON, gzip it, wrap it in AES-256-GCM and
//!   base64 the result; decode the reverse way.
//! - Read and write `.luna` files.
//!
//! # Invariants
//! - Only document version `WORKSPACE_VERSION` is accepted; there is no
//!   migration or legacy fallback.
//! - Any header, authentication, decompression or version failure is a hard
//!   error. Partial workspaces are never returned.
//! - The cipher key is embedded in the binary. The encryption layer hides
//!   the gzip signature from file-type sniffing and provides no
//!   confidentiality or access control.

pub mod codec;
pub mod document;
pub mod file;

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub use codec::{deserialize, serialize};
pub use document::{from_workspace_json, to_workspace_json};
pub use file::{ensure_workspace_extension, load_workspace_file, save_workspace_file};

/// Errors from the JSON document layer.
#[derive(Debug)]
pub enum DocumentError {
    /// Input is not valid JSON.
    InvalidJson(serde_json::Error),
    /// Top-level JSON value is not an object.
    NotAnObject,
    /// `version` is missing or not the supported value.
    UnsupportedVersion(String),
    /// JSON object does not match the workspace schema.
    InvalidShape(serde_json::Error),
    /// Workspace could not be encoded.
    Encode(serde_json::Error),
}

impl Display for DocumentError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidJson(err) => write!(f, "invalid JSON: unable to parse workspace: {err}"),
            Self::NotAnObject => write!(f, "invalid workspace: expected an object at top level"),
            Self::UnsupportedVersion(found) => {
                write!(f, "unsupported workspace version: {found}")
            }
            Self::InvalidShape(err) => write!(f, "invalid workspace structure: {err}"),
            Self::Encode(err) => write!(f, "failed to encode workspace: {err}"),
        }
    }
}

impl Error for DocumentError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidJson(err) | Self::InvalidShape(err) | Self::Encode(err) => Some(err),
            Self::NotAnObject | Self::UnsupportedVersion(_) => None,
        }
    }
}

/// Errors from the `.luna` payload codec.
#[derive(Debug)]
pub enum CodecError {
    /// Payload is not valid base64.
    InvalidBase64(base64::DecodeError),
    /// Decoded bytes do not start with the expected magic header.
    MissingMagicHeader,
    /// Decoded bytes are shorter than header + nonce + tag.
    Truncated { len: usize, min_len: usize },
    /// Authentication tag check failed (corrupt or foreign payload).
    Authentication,
    /// Cipher could not be initialized or failed to encrypt.
    Cipher(String),
    /// gzip compression or decompression failed.
    Compression(std::io::Error),
    /// Inner JSON document is invalid.
    Document(DocumentError),
}

impl Display for CodecError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidBase64(err) => write!(f, "workspace payload is not base64: {err}"),
            Self::MissingMagicHeader => write!(f, "not a Luna workspace file (missing header)"),
            Self::Truncated { len, min_len } => write!(
                f,
                "workspace payload too short: {len} bytes, expected at least {min_len}"
            ),
            Self::Authentication => write!(f, "workspace payload failed authentication"),
            Self::Cipher(message) => write!(f, "workspace cipher error: {message}"),
            Self::Compression(err) => write!(f, "workspace compression error: {err}"),
            Self::Document(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CodecError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidBase64(err) => Some(err),
            Self::Compression(err) => Some(err),
            Self::Document(err) => Some(err),
            Self::MissingMagicHeader
            | Self::Truncated { .. }
            | Self::Authentication
            | Self::Cipher(_) => None,
        }
    }
}

impl From<DocumentError> for CodecError {
    fn from(value: DocumentError) -> Self {
        Self::Document(value)
    }
}

impl From<base64::DecodeError> for CodecError {
    fn from(value: base64::DecodeError) -> Self {
        Self::InvalidBase64(value)
    }
}

/// Errors from reading or writing workspace files.
#[derive(Debug)]
pub enum PersistError {
    /// File-system failure on `path`.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Path has an extension other than `.luna`.
    InvalidExtension(PathBuf),
    /// Payload could not be encoded or decoded.
    Codec(CodecError),
}

impl Display for PersistError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "{}: {source}", path.display()),
            Self::InvalidExtension(path) => write!(
                f,
                "workspace files must use the .luna extension: {}",
                path.display()
            ),
            Self::Codec(err) => write!(f, "could not open workspace: {err}"),
        }
    }
}

impl Error for PersistError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Codec(err) => Some(err),
            Self::InvalidExtension(_) => None,
        }
    }
}

impl From<CodecError> for PersistError {
    fn from(value: CodecError) -> Self {
        Self::Codec(value)
    }
}
