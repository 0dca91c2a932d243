//! Navigation intents emitted by presentation adapters

use serde::Serialize;
use std::fmt;

/// A user request to move through the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Intent {
    /// Load the page after the current one
    Next,

    /// Load the page before the current one
    Previous,

    /// Jump to a specific page
    GoToPage { page: u32 },

    /// Jump to page 1
    First,

    /// Jump to the last known page
    Last,

    /// Re-request the current page
    Reload,
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Intent::Next => f.write_str("next"),
            Intent::Previous => f.write_str("previous"),
            Intent::GoToPage { page } => write!(f, "go to page {}", page),
            Intent::First => f.write_str("first"),
            Intent::Last => f.write_str("last"),
            Intent::Reload => f.write_str("reload"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intent_wire_format() {
        let json = serde_json::to_string(&Intent::GoToPage { page: 4 }).unwrap();
        assert_eq!(json, r#"{"type":"go_to_page","page":4}"#);
        assert_eq!(serde_json::to_string(&Intent::Next).unwrap(), r#"{"type":"next"}"#);
        assert_eq!(Intent::GoToPage { page: 4 }.to_string(), "go to page 4");
    }
}
