//! Identifier newtypes for voters, terminals, and polling stations.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! id_type {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            pub fn new(raw: impl Into<String>) -> Self {
                Self(raw.into())
            }

            /// Return the raw identifier string.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Whether the identifier is non-empty after trimming.
            pub fn is_valid(&self) -> bool {
                !self.0.trim().is_empty()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }
    };
}

id_type! {
    /// A registered voter's unique identifier, issued by the voter registry.
    VoterId
}

id_type! {
    /// A check-in terminal's identifier.
    TerminalId
}

id_type! {
    /// A polling station's identifier.
    StationId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_id_is_invalid() {
        assert!(!VoterId::new("").is_valid());
        assert!(!TerminalId::new("   ").is_valid());
    }

    #[test]
    fn non_empty_id_is_valid() {
        assert!(VoterId::new("V-12345").is_valid());
        assert!(StationId::new("S1").is_valid());
    }

    #[test]
    fn display_round_trips() {
        let id = TerminalId::new("T-9");
        assert_eq!(id.to_string(), "T-9");
        assert_eq!(id.as_str(), "T-9");
    }
}
