/// User id recorded when a lookup carries none.
pub const ANONYMOUS_USER: &str = "anonymous";

/// Session id recorded when a lookup carries none.
pub const UNKNOWN_SESSION: &str = "unknown";

/// `source` property stamped on view events.
pub const VIEW_SOURCE: &str = "api";

/// Who is looking at a product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Viewer {
    pub user_id: String,
    pub session_id: String,
}

impl Viewer {
    /// Builds a viewer, falling back to placeholders for missing or blank ids.
    pub fn new(user_id: Option<String>, session_id: Option<String>) -> Self {
        fn or_default(value: Option<String>, default: &str) -> String {
            value
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        }

        Self {
            user_id: or_default(user_id, ANONYMOUS_USER),
            session_id: or_default(session_id, UNKNOWN_SESSION),
        }
    }

    pub fn anonymous() -> Self {
        Self::new(None, None)
    }
}
