//! Inbound webhook payload and its validation rules.
//!
//! A delivery is decoded as-is and checked by [`WebhookRequest::validate`]
//! before any side effect. Validation order is fixed so a given bad payload
//! always produces the same error: aspect_type → object_type → event_time →
//! object_id → owner_id → subscription_id.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Aspect type: a new object was created.
pub const ASPECT_CREATE: &str = "create";
/// Aspect type: an existing object was updated.
pub const ASPECT_UPDATE: &str = "update";
/// Aspect type: an existing object was deleted.
pub const ASPECT_DELETE: &str = "delete";

/// Object type: an activity changed.
pub const OBJECT_ACTIVITY: &str = "activity";
/// Object type: an athlete changed (e.g. deauthorization).
pub const OBJECT_ATHLETE: &str = "athlete";

const VALID_ASPECT_TYPES: [&str; 3] = [ASPECT_CREATE, ASPECT_UPDATE, ASPECT_DELETE];
const VALID_OBJECT_TYPES: [&str; 2] = [OBJECT_ACTIVITY, OBJECT_ATHLETE];

/// A single webhook delivery from the fitness platform.
///
/// Constructed fresh per inbound HTTP call, immutable after decode, never
/// persisted by this subsystem. All fields default so that a missing field
/// surfaces as a validation error rather than a decode error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookRequest {
    /// What happened to the object: create, update, or delete.
    #[serde(default)]
    pub aspect_type: String,
    /// What kind of object changed: activity or athlete.
    #[serde(default)]
    pub object_type: String,
    /// Identifier of the changed object.
    #[serde(default)]
    pub object_id: i64,
    /// Identifier of the object's owner.
    #[serde(default)]
    pub owner_id: i64,
    /// Epoch seconds of when the change occurred upstream.
    #[serde(default)]
    pub event_time: i64,
    /// Which webhook subscription this delivery belongs to.
    #[serde(default)]
    pub subscription_id: i64,
    /// Changed-field-name → new value; only meaningful for updates.
    #[serde(default)]
    pub updates: HashMap<String, serde_json::Value>,
}

/// A structurally or semantically invalid delivery.
///
/// Display strings are part of the HTTP error contract; callers surface
/// them verbatim in the `details` field of a 400 response.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// `aspect_type` is not one of create/update/delete.
    #[error("invalid aspect_type: {0}")]
    InvalidAspectType(String),

    /// `object_type` is not one of activity/athlete.
    #[error("invalid object_type: {0}")]
    InvalidObjectType(String),

    /// A required scalar field is absent or zero.
    #[error("{0} is required")]
    MissingField(&'static str),
}

impl WebhookRequest {
    /// Check structural and semantic validity. Pure, no side effects.
    ///
    /// Returns the first failing check only; callers get a single
    /// descriptive error, never an aggregate.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !VALID_ASPECT_TYPES.contains(&self.aspect_type.as_str()) {
            return Err(ValidationError::InvalidAspectType(self.aspect_type.clone()));
        }
        if !VALID_OBJECT_TYPES.contains(&self.object_type.as_str()) {
            return Err(ValidationError::InvalidObjectType(self.object_type.clone()));
        }
        if self.event_time == 0 {
            return Err(ValidationError::MissingField("event_time"));
        }
        if self.object_id == 0 {
            return Err(ValidationError::MissingField("object_id"));
        }
        if self.owner_id == 0 {
            return Err(ValidationError::MissingField("owner_id"));
        }
        if self.subscription_id == 0 {
            return Err(ValidationError::MissingField("subscription_id"));
        }
        Ok(())
    }

    /// Whether this delivery concerns an activity (the only object type the
    /// gateway forwards to the bus).
    pub fn is_activity(&self) -> bool {
        self.object_type == OBJECT_ACTIVITY
    }
}
