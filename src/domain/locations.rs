// Saved location bookmarks.

use crate::domain::errors::LocationError;
use crate::domain::position::Position;
use serde::{Deserialize, Serialize};

/// A user-named coordinate bookmark. The serialized shape matches the stored blob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedLocation {
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub timestamp: String,
}

impl SavedLocation {
    pub fn position(&self) -> Position {
        Position::new(self.x, self.y, self.z)
    }
}

/// Trims a requested location name, rejecting blank input.
pub fn validate_location_name(value: &str) -> Result<String, LocationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(LocationError::BlankName);
    }
    Ok(trimmed.to_string())
}
