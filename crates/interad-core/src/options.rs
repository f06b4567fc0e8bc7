#![forbid(unsafe_code)]

//! Session construction input.

use crate::error::AdError;

/// Input for creating an interactive ad session.
///
/// `provider` and `placement_id` are required; validation failures are
/// returned as values from the session factory, never panics. Custom event
/// names declared here become registrable alongside the base events.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdOptions {
    /// Identifier of the third-party ad SDK integration.
    pub provider: String,
    /// Identifier of the ad slot within the provider.
    pub placement_id: String,
    /// Provider-specific event names beyond the base set.
    pub custom_events: Vec<String>,
}

impl AdOptions {
    #[must_use]
    pub fn new(provider: impl Into<String>, placement_id: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            placement_id: placement_id.into(),
            custom_events: Vec::new(),
        }
    }

    /// Declare an additional registrable event name.
    #[must_use]
    pub fn with_custom_event(mut self, name: impl Into<String>) -> Self {
        self.custom_events.push(name.into());
        self
    }

    /// Check the required identity fields.
    ///
    /// # Errors
    /// Returns an invalid-options error naming the first missing field.
    pub fn validate(&self) -> Result<(), AdError> {
        if self.provider.is_empty() {
            return Err(AdError::invalid_options("provider"));
        }
        if self.placement_id.is_empty() {
            return Err(AdError::invalid_options("placementId"));
        }
        Ok(())
    }
}
