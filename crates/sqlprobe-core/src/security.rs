//! Identifier validation for interpolated information_schema queries.
//!
//! Table, column, schema and database names are spliced into SQL as
//! single-quoted literals. Anything that could close the literal or start a
//! second statement is rejected before the query text is built.

use crate::dialect::DialectError;

/// Maximum accepted identifier length in bytes
pub const MAX_IDENTIFIER_LEN: usize = 255;

/// Validate a name before it is interpolated into a query.
///
/// Rejects:
/// - empty names and names over 255 bytes
/// - quote characters (`'`, `"`, `` ` ``) and backslashes
/// - `;` statement separators
/// - whitespace and control characters
///
/// Hyphens, dots, dollars and non-ASCII letters are allowed since MySQL and
/// PostgreSQL both permit them in quoted identifiers.
///
/// # Examples
///
/// ```
/// use sqlprobe_core::security::validate_identifier;
///
/// assert!(validate_identifier("users").is_ok());
/// assert!(validate_identifier("order-items").is_ok());
/// assert!(validate_identifier("x' OR '1'='1").is_err());
/// assert!(validate_identifier("user name").is_err());
/// ```
pub fn validate_identifier(name: &str) -> Result<(), DialectError> {
    if name.is_empty() {
        return Err(DialectError::InvalidIdentifier(
            "identifier cannot be empty".to_string(),
        ));
    }

    if name.len() > MAX_IDENTIFIER_LEN {
        return Err(DialectError::InvalidIdentifier(format!(
            "identifier too long: {} bytes (max {})",
            name.len(),
            MAX_IDENTIFIER_LEN
        )));
    }

    if let Some(c) = name.chars().find(|c| is_forbidden(*c)) {
        return Err(DialectError::InvalidIdentifier(format!(
            "'{}' contains forbidden character {:?}",
            name.escape_debug(),
            c
        )));
    }

    Ok(())
}

fn is_forbidden(c: char) -> bool {
    matches!(c, '\'' | '"' | '`' | '\\' | ';') || c.is_whitespace() || c.is_control()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_common_names() {
        for name in ["users", "my_table", "_private", "Orders2024", "order-items", "public", "café"] {
            assert!(validate_identifier(name).is_ok(), "should accept {}", name);
        }
    }

    #[test]
    fn rejects_empty_and_oversized() {
        assert!(validate_identifier("").is_err());
        assert!(validate_identifier(&"a".repeat(256)).is_err());
        assert!(validate_identifier(&"a".repeat(255)).is_ok());
    }

    #[test]
    fn rejects_injection_attempts() {
        let attempts = [
            "x' OR '1'='1",
            "users'; DROP TABLE users--",
            "a\"b",
            "a`b",
            "a\\b",
            "a;b",
            "user name",
            "tab\tname",
            "x\nDROP TABLE",
            "x\0",
        ];
        for name in attempts {
            assert!(
                matches!(validate_identifier(name), Err(DialectError::InvalidIdentifier(_))),
                "should reject {:?}",
                name
            );
        }
    }
}
