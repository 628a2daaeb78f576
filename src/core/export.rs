// plain nested views (json / toon) of anatomy values
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::core::error::AnatomyError;

pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, AnatomyError> {
    Ok(serde_json::to_string(value)?)
}

pub fn to_json_pretty<T: Serialize + ?Sized>(value: &T) -> Result<String, AnatomyError> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Nested map/sequence view, for callers that post-process before emitting.
pub fn to_value<T: Serialize + ?Sized>(value: &T) -> Result<serde_json::Value, AnatomyError> {
    Ok(serde_json::to_value(value)?)
}

pub fn to_toon<T: Serialize>(value: &T) -> Result<String, AnatomyError> {
    toon_format::encode_default(value).map_err(|e| AnatomyError::Toon(e.to_string()))
}

pub fn from_toon<T: DeserializeOwned>(text: &str) -> Result<T, AnatomyError> {
    toon_format::decode_default(text).map_err(|e| AnatomyError::Toon(e.to_string()))
}
