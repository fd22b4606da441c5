use std::fmt;

use crate::error::CoreError;

/// Normalized email address: trimmed, lowercased, structurally checked.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmailAddress(String);

impl EmailAddress {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for EmailAddress {
    type Error = CoreError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        if normalized.is_empty() {
            return Err(CoreError::InvalidEmail("empty address".to_string()));
        }
        if normalized.chars().any(char::is_whitespace) {
            return Err(CoreError::InvalidEmail(normalized));
        }
        let Some((local, domain)) = normalized.split_once('@') else {
            return Err(CoreError::InvalidEmail(normalized));
        };
        if local.is_empty() || domain.is_empty() || domain.contains('@') {
            return Err(CoreError::InvalidEmail(normalized));
        }
        let valid_domain = domain.split('.').count() >= 2
            && domain.split('.').all(|label| !label.is_empty());
        if !valid_domain {
            return Err(CoreError::InvalidEmail(normalized));
        }
        Ok(EmailAddress(normalized))
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::EmailAddress;

    #[test]
    fn email_lowercases_and_trims() {
        let email = EmailAddress::try_from("  Ada@Example.COM ").unwrap();
        assert_eq!(email.as_str(), "ada@example.com");
    }

    #[test]
    fn email_rejects_missing_at_sign() {
        assert!(EmailAddress::try_from("ada.example.com").is_err());
    }

    #[test]
    fn email_rejects_bare_domain() {
        assert!(EmailAddress::try_from("ada@localhost").is_err());
        assert!(EmailAddress::try_from("ada@.com").is_err());
        assert!(EmailAddress::try_from("@example.com").is_err());
    }

    #[test]
    fn email_rejects_embedded_whitespace() {
        assert!(EmailAddress::try_from("ada smith@example.com").is_err());
    }
}
