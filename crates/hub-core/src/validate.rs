//! Field validation helpers shared by the input types.
//!
//! Every helper names the failing field so the HTTP layer can report it.

use crate::{Error, Result};

/// Trims `value` and checks its length in characters.
pub(crate) fn text(field: &str, value: &str, min: usize, max: usize) -> Result<String> {
    let trimmed = value.trim();
    let len = trimmed.chars().count();
    if len < min {
        return Err(if min <= 1 {
            Error::validation_field(field, "must not be empty")
        } else {
            Error::validation_field(field, format!("must be at least {min} characters"))
        });
    }
    if len > max {
        return Err(Error::validation_field(
            field,
            format!("must be at most {max} characters"),
        ));
    }
    Ok(trimmed.to_string())
}

/// Like [`text`], but an empty value becomes `None`.
pub(crate) fn optional_text(field: &str, value: Option<&str>, max: usize) -> Result<Option<String>> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => text(field, v, 1, max).map(Some),
    }
}

/// Normalises an email address to trimmed lowercase and checks its shape.
pub(crate) fn email(field: &str, value: &str) -> Result<String> {
    let email = value.trim().to_lowercase();
    if email.len() > 254 {
        return Err(Error::validation_field(field, "is too long"));
    }

    let invalid = || Error::validation_field(field, "must be a valid email address");
    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') || email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let (host, tld) = domain.rsplit_once('.').ok_or_else(invalid)?;
    if host.is_empty() || tld.len() < 2 {
        return Err(invalid());
    }
    Ok(email)
}

/// Checks that `value` is an absolute HTTP(S) URL.
pub(crate) fn url(field: &str, value: &str) -> Result<String> {
    let value = value.trim();
    let rest = value
        .strip_prefix("https://")
        .or_else(|| value.strip_prefix("http://"))
        .ok_or_else(|| Error::validation_field(field, "must start with http:// or https://"))?;
    if rest.is_empty() || rest.starts_with('/') || value.chars().any(char::is_whitespace) {
        return Err(Error::validation_field(field, "must be a valid URL"));
    }
    if value.len() > 2048 {
        return Err(Error::validation_field(field, "is too long"));
    }
    Ok(value.to_string())
}

/// Checks a list length.
pub(crate) fn max_items(field: &str, len: usize, max: usize) -> Result<()> {
    if len > max {
        return Err(Error::validation_field(
            field,
            format!("must contain at most {max} entries"),
        ));
    }
    Ok(())
}

/// Trims every entry, drops empty ones, and checks count and entry length.
pub(crate) fn text_list(
    field: &str,
    values: Vec<String>,
    max_items_count: usize,
    max_len: usize,
) -> Result<Vec<String>> {
    let values: Vec<String> = values
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect();
    max_items(field, values.len(), max_items_count)?;
    for value in &values {
        text(field, value, 1, max_len)?;
    }
    Ok(values)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_text_trims() {
        assert_eq!(text("title", "  Hello  ", 1, 10).unwrap(), "Hello");
    }

    #[test]
    fn test_text_bounds() {
        assert!(text("title", "   ", 1, 10).is_err());
        assert!(text("title", "ab", 3, 10).is_err());
        assert!(text("title", "abcdefghijk", 1, 10).is_err());
    }

    #[test]
    fn test_text_counts_chars_not_bytes() {
        assert!(text("title", "ééééé", 1, 5).is_ok());
    }

    #[test]
    fn test_optional_text_empty_is_none() {
        assert_eq!(optional_text("bio", Some("  "), 10).unwrap(), None);
        assert_eq!(optional_text("bio", None, 10).unwrap(), None);
        assert_eq!(optional_text("bio", Some(" hi "), 10).unwrap(), Some("hi".to_string()));
    }

    #[test]
    fn test_email_normalizes() {
        assert_eq!(email("email", " Alice@Uni.EDU ").unwrap(), "alice@uni.edu");
    }

    #[test]
    fn test_email_rejects_bad_shapes() {
        for bad in ["", "alice", "@uni.edu", "alice@", "alice@uni", "a@b@c.com", "a b@uni.edu", "alice@.e"] {
            assert!(email("email", bad).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn test_url() {
        assert!(url("url", "https://github.com/x/y").is_ok());
        assert!(url("url", "http://localhost:3000").is_ok());
        assert!(url("url", "github.com/x").is_err());
        assert!(url("url", "https://").is_err());
        assert!(url("url", "https:///path").is_err());
    }

    #[test]
    fn test_text_list_drops_blank_entries() {
        let list = text_list("tools", vec![" Rust ".into(), "".into(), "  ".into()], 5, 20).unwrap();
        assert_eq!(list, vec!["Rust".to_string()]);
    }

    proptest! {
        #[test]
        fn prop_text_result_is_trimmed(s in "\\PC{0,40}") {
            if let Ok(out) = text("f", &s, 1, 40) {
                prop_assert_eq!(out.trim(), out.as_str());
                prop_assert!(!out.is_empty());
            }
        }

        #[test]
        fn prop_valid_emails_are_lowercase(local in "[a-zA-Z0-9.]{1,20}", host in "[a-zA-Z]{1,10}") {
            let raw = format!("{local}@{host}.edu");
            let normalized = email("email", &raw).unwrap();
            prop_assert_eq!(normalized.clone(), normalized.to_lowercase());
        }
    }
}
