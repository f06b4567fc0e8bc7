#![forbid(unsafe_code)]

//! Native plugin bridge: the capability surface a provider plugin exposes.
//!
//! Plugins are resolved by provider identifier and drive every operation
//! through single-shot callbacks. A callback may fire synchronously (hosts
//! that fail fast, mocks) or on a later turn; each fires exactly once.

use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Callback invoked once when a native `initSDK` call completes.
pub type InitCallback = Box<dyn FnOnce(BridgeResult)>;

/// Callback invoked once when a native load/show call succeeds.
pub type SuccessCallback = Box<dyn FnOnce(BridgeResult)>;

/// Callback invoked once when a native load/show call fails.
pub type FailureCallback = Box<dyn FnOnce(BridgeError)>;

/// Shared handle to a provider's initialized native plugin.
///
/// The handle is the plugin itself: a successful initialization makes the
/// resolved plugin usable for load/show/destroy.
pub type PluginHandle = Rc<dyn AdPlugin>;

/// Result payload delivered by a native call's success path.
///
/// The host signals success with `code == 1`; some hosts report the code as
/// a string, which the lenient deserializer normalizes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeResult {
    #[serde(deserialize_with = "lenient_code")]
    pub code: i64,
    #[serde(default)]
    pub message: String,
    /// Provider-specific payload attached to the result.
    #[serde(default)]
    pub data: Value,
}

impl BridgeResult {
    /// A bare success result (`code == 1`, no payload).
    #[must_use]
    pub fn success() -> Self {
        Self {
            code: 1,
            message: String::new(),
            data: Value::Null,
        }
    }

    /// A non-success result with the given code and message.
    #[must_use]
    pub fn failure(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: Value::Null,
        }
    }

    /// Attach a provider payload.
    #[must_use]
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = data;
        self
    }

    /// Whether the host reported success.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.code == 1
    }
}

/// Error payload delivered by a native call's failure path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeError {
    pub code: i64,
    #[serde(default)]
    pub message: String,
}

impl BridgeError {
    #[must_use]
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// JSON payload for event dispatch (`{ code, message }`).
    #[must_use]
    pub fn to_payload(&self) -> Value {
        serde_json::json!({ "code": self.code, "message": self.message })
    }
}

impl fmt::Display for BridgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code {})", self.message, self.code)
    }
}

/// Parameter block passed to load/show/destroy.
///
/// On the wire the placement id travels under the host's `adpid` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementParams {
    #[serde(rename = "adpid")]
    pub placement_id: String,
}

impl PlacementParams {
    #[must_use]
    pub fn new(placement_id: impl Into<String>) -> Self {
        Self {
            placement_id: placement_id.into(),
        }
    }
}

/// Capability surface of a provider's native ad plugin.
///
/// `destroy` is an optional capability; the default body is a no-op so
/// plugins without it need not implement anything.
pub trait AdPlugin {
    /// Initialize the provider SDK. The callback fires exactly once with the
    /// host's result; success is `code == 1`.
    fn init_sdk(&self, done: InitCallback);

    /// Load ad data for a placement. Exactly one of the two callbacks fires.
    fn load_data(
        &self,
        params: PlacementParams,
        on_success: SuccessCallback,
        on_failure: FailureCallback,
    );

    /// Show a previously loaded ad. Exactly one of the two callbacks fires.
    fn show(
        &self,
        params: PlacementParams,
        on_success: SuccessCallback,
        on_failure: FailureCallback,
    );

    /// Release native resources for a placement.
    fn destroy(&self, params: PlacementParams) {
        let _ = params;
    }
}

/// Resolves a provider identifier to its native plugin.
///
/// Returning `None` means the host knows no plugin for the identifier; the
/// registry reports this as an unknown-provider error without retry.
pub trait PluginResolver {
    fn resolve(&self, provider: &str) -> Option<PluginHandle>;
}

/// Accept `code` as either a JSON number or its string form.
fn lenient_code<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    struct CodeVisitor;

    impl serde::de::Visitor<'_> for CodeVisitor {
        type Value = i64;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("an integer or an integer string")
        }

        fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<i64, E> {
            Ok(v)
        }

        fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<i64, E> {
            i64::try_from(v).map_err(|_| E::custom("code out of range"))
        }

        fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<i64, E> {
            v.trim()
                .parse()
                .map_err(|_| E::custom(format!("invalid code string: {v:?}")))
        }
    }

    deserializer.deserialize_any(CodeVisitor)
}
