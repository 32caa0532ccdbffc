use std::fmt;

/// Bearer token for one of the upstream services.
///
/// `Debug` never prints the secret so configs and clients can be logged freely.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct Token(String);

impl Token {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for Token {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for Token {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str("Token(<empty>)")
        } else {
            f.write_str("Token(<redacted>)")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_secret() {
        let token = Token::from("squ_secret");
        let printed = format!("{token:?}");
        assert!(!printed.contains("squ_secret"));
        assert_eq!(printed, "Token(<redacted>)");
    }

    #[test]
    fn test_empty_token() {
        assert!(Token::default().is_empty());
        assert_eq!(format!("{:?}", Token::default()), "Token(<empty>)");
    }
}
