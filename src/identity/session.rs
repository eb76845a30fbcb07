use std::fmt::{Debug, Formatter};

/// Opaque identity credential. Only its presence is ever inspected; `Debug` masks it.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    /// Blank tokens count as no session.
    pub fn new<S: Into<String>>(raw: S) -> Option<Self> {
        let raw = raw.into();
        if raw.trim().is_empty() { None } else { Some(Self(raw)) }
    }

    pub fn as_str(&self) -> &str { &self.0 }

    /// `Authorization` header value for the gateway hop.
    pub fn bearer(&self) -> String { format!("Bearer {}", self.0) }

    pub fn masked(&self) -> String {
        let prefix: String = self.0.chars().take(10).collect();
        format!("{}...", prefix)
    }
}

impl Debug for SessionToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("SessionToken").field(&self.masked()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_is_no_token() {
        assert!(SessionToken::new("").is_none());
        assert!(SessionToken::new("   ").is_none());
        assert!(SessionToken::new("abc").is_some());
    }

    #[test]
    fn bearer_and_masking() {
        let t = SessionToken::new("eyJhbGciOiJSUzI1NiJ9.payload.sig").unwrap();
        assert_eq!(t.bearer(), "Bearer eyJhbGciOiJSUzI1NiJ9.payload.sig");
        let dbg = format!("{:?}", t);
        assert!(dbg.contains("eyJhbGciOi..."));
        assert!(!dbg.contains("payload"));
    }
}
