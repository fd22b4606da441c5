use std::fmt;

use crate::error::CoreError;

const MAX_CONTENT_CHARS: usize = 10_000;

/// Post or comment body: trimmed, non-empty, bounded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Content(String);

impl Content {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<&str> for Content {
    type Error = CoreError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(CoreError::InvalidContent("empty content".to_string()));
        }
        if trimmed.chars().count() > MAX_CONTENT_CHARS {
            return Err(CoreError::InvalidContent("content too long".to_string()));
        }
        Ok(Content(trimmed.to_string()))
    }
}

impl fmt::Display for Content {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::Content;

    #[test]
    fn content_trims_surrounding_whitespace() {
        let content = Content::try_from("  hello  ").unwrap();
        assert_eq!(content.as_str(), "hello");
    }

    #[test]
    fn content_rejects_empty_and_blank() {
        assert!(Content::try_from("").is_err());
        assert!(Content::try_from("   \n\t").is_err());
    }

    #[test]
    fn content_rejects_oversized_body() {
        let body = "x".repeat(10_001);
        assert!(Content::try_from(body.as_str()).is_err());
    }
}
