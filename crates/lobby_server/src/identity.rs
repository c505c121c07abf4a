//! Session identity generation.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier handed to a connection when it opens.
///
/// Wraps a random UUID; on the wire it is the plain hyphenated string, e.g.
/// `"550e8400-e29b-41d4-a716-446655440000"`. The value is assigned once and
/// never changes for the lifetime of the connection.
///
/// # Examples
///
/// ```rust
/// use lobby_server::SessionId;
///
/// let a = SessionId::new();
/// let b = SessionId::new();
/// assert_ne!(a, b);
/// println!("session: {}", a);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub Uuid);

impl SessionId {
    /// Creates a new random session ID using UUID v4.
    ///
    /// 122 bits of randomness make collisions negligible for the lifetime of
    /// a process, so no duplicate detection is performed.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::str::FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
