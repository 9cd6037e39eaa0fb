use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use gridforge_core::Blueprint;

const SHARE_DOMAIN: &str = "blueprint";
const SHARE_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded blueprint payload.
pub const SHARE_CODE_HEADER: &str = "blueprint:v1";
/// Delimiter used to separate the prefix, version and payload.
const FIELD_DELIMITER: char = ':';

/// Errors that can occur while encoding or decoding share codes.
#[derive(Debug, thiserror::Error)]
pub enum ShareCodeError {
    /// The provided string was empty or contained only whitespace.
    #[error("share code was empty")]
    EmptyPayload,
    /// The share code did not contain a version segment.
    #[error("share code is missing the version")]
    MissingVersion,
    /// The share code did not include the payload segment.
    #[error("share code is missing the payload")]
    MissingPayload,
    /// The share code used an unexpected prefix segment.
    #[error("share code prefix '{0}' is not supported")]
    InvalidPrefix(String),
    /// The share code used an unsupported version identifier.
    #[error("share code version '{0}' is not supported")]
    UnsupportedVersion(String),
    /// The base64 payload could not be decoded.
    #[error("could not decode share code payload: {0}")]
    InvalidEncoding(#[source] base64::DecodeError),
    /// The decoded payload was not a blueprint document.
    #[error("could not parse share code payload: {0}")]
    InvalidPayload(#[source] serde_json::Error),
    /// The blueprint carried no components.
    #[error("shared blueprint '{0}' has no components")]
    EmptyBlueprint(String),
}

/// Encodes a blueprint, normalized to its first part, into a single line.
pub fn encode_share_code(blueprint: &Blueprint) -> Result<String, ShareCodeError> {
    if blueprint.is_empty() {
        return Err(ShareCodeError::EmptyBlueprint(blueprint.name().to_owned()));
    }
    let json = serde_json::to_vec(&blueprint.clone().normalized())
        .map_err(ShareCodeError::InvalidPayload)?;
    let encoded = STANDARD_NO_PAD.encode(json);
    Ok(format!("{SHARE_CODE_HEADER}{FIELD_DELIMITER}{encoded}"))
}

/// Decodes a blueprint from a share code.
pub fn decode_share_code(value: &str) -> Result<Blueprint, ShareCodeError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ShareCodeError::EmptyPayload);
    }

    let mut parts = trimmed.splitn(3, FIELD_DELIMITER);
    let domain = parts.next().ok_or(ShareCodeError::EmptyPayload)?;
    if domain != SHARE_DOMAIN {
        return Err(ShareCodeError::InvalidPrefix(domain.to_owned()));
    }
    let version = parts.next().ok_or(ShareCodeError::MissingVersion)?;
    if version != SHARE_VERSION {
        return Err(ShareCodeError::UnsupportedVersion(version.to_owned()));
    }
    let payload = parts
        .next()
        .filter(|payload| !payload.is_empty())
        .ok_or(ShareCodeError::MissingPayload)?;

    let bytes = STANDARD_NO_PAD
        .decode(payload.as_bytes())
        .map_err(ShareCodeError::InvalidEncoding)?;
    let blueprint: Blueprint =
        serde_json::from_slice(&bytes).map_err(ShareCodeError::InvalidPayload)?;
    if blueprint.is_empty() {
        return Err(ShareCodeError::EmptyBlueprint(blueprint.name().to_owned()));
    }
    Ok(blueprint)
}
