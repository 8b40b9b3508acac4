//! Plain JSON form of a workspace.

use super::DocumentError;
use crate::model::workspace::{Workspace, WORKSPACE_VERSION};
use serde_json::Value;

/// Encodes a workspace as JSON, pretty-printed with two-space indent on request.
pub fn to_workspace_json(workspace: &Workspace, pretty: bool) -> Result<String, DocumentError> {
    let encoded = if pretty {
        serde_json::to_string_pretty(workspace)
    } else {
        serde_json::to_string(workspace)
    };
    encoded.map_err(DocumentError::Encode)
}

/// Parses a JSON document and enforces the supported version.
///
/// The version is checked before the typed parse so an unsupported document
/// is reported as such rather than as a shape mismatch.
pub fn from_workspace_json(json: &str) -> Result<Workspace, DocumentError> {
    let value: Value = serde_json::from_str(json).map_err(DocumentError::InvalidJson)?;
    workspace_from_value(value)
}

pub(crate) fn workspace_from_slice(bytes: &[u8]) -> Result<Workspace, DocumentError> {
    let value: Value = serde_json::from_slice(bytes).map_err(DocumentError::InvalidJson)?;
    workspace_from_value(value)
}

fn workspace_from_value(value: Value) -> Result<Workspace, DocumentError> {
    let Some(object) = value.as_object() else {
        return Err(DocumentError::NotAnObject);
    };
    match object.get("version") {
        Some(version) if version.as_u64() == Some(u64::from(WORKSPACE_VERSION)) => {}
        Some(other) => return Err(DocumentError::UnsupportedVersion(other.to_string())),
        None => return Err(DocumentError::UnsupportedVersion("missing".to_string())),
    }
    serde_json::from_value(value).map_err(DocumentError::InvalidShape)
}
