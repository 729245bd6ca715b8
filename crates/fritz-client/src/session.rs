//! Gateway session state

use std::fmt;

/// Session id the gateway hands out when a login fails or a session expired
pub const ZERO_SID: &str = "0000000000000000";

/// Opaque session id of an authenticated session. Never the zero id.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionId(String);

impl SessionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Session ids are credentials; keep them out of logs
impl fmt::Debug for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionId(..)")
    }
}

/// Authentication state of one gateway client.
///
/// Starts out `Unauthenticated`, becomes `Authenticated` after a successful
/// login and is replaced wholesale by the next login. There is no refresh.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Session {
    #[default]
    Unauthenticated,
    Authenticated(SessionId),
}

impl Session {
    /// Interpret a session id returned by the gateway.
    ///
    /// The zero id means "not logged in".
    pub fn from_sid(sid: &str) -> Self {
        let sid = sid.trim();
        if sid.is_empty() || sid == ZERO_SID {
            Self::Unauthenticated
        } else {
            Self::Authenticated(SessionId(sid.to_string()))
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    pub fn id(&self) -> Option<&SessionId> {
        match self {
            Self::Authenticated(id) => Some(id),
            Self::Unauthenticated => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_sid_is_unauthenticated() {
        assert_eq!(Session::from_sid(ZERO_SID), Session::Unauthenticated);
        assert_eq!(Session::from_sid(""), Session::Unauthenticated);
        assert!(!Session::default().is_authenticated());
    }

    #[test]
    fn test_real_sid_is_authenticated() {
        let session = Session::from_sid("9c3b0a4d5e6f7081");
        assert!(session.is_authenticated());
        assert_eq!(session.id().map(SessionId::as_str), Some("9c3b0a4d5e6f7081"));
    }

    #[test]
    fn test_debug_hides_sid() {
        let session = Session::from_sid("9c3b0a4d5e6f7081");
        assert!(!format!("{:?}", session).contains("9c3b"));
    }
}
