//! Validation Utilities

use super::error::ChatError;

/// Validate a channel key.
///
/// Keys must be non-empty and consist only of ASCII letters, digits,
/// `_` and `-` (the pattern `^[A-Za-z0-9_-]+$`). The same rule applies to
/// the recipient-derived keys of private channels, which is why hyphenated
/// UUIDs are valid keys.
pub fn validate_channel_key(key: &str) -> Result<(), ChatError> {
    if key.is_empty() || !key.chars().all(is_valid_key_char) {
        return Err(ChatError::InvalidKey(key.to_string()));
    }
    Ok(())
}

fn is_valid_key_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("town")]
    #[test_case("global-chat")]
    #[test_case("vip_lounge")]
    #[test_case("a")]
    #[test_case("0af5bb2d-9337-4a34-9a99-b28b267b0e38"; "uuid shaped key")]
    fn test_valid_keys(key: &str) {
        assert!(validate_channel_key(key).is_ok());
    }

    #[test_case(""; "empty")]
    #[test_case(" "; "blank")]
    #[test_case("town square"; "inner space")]
    #[test_case("über"; "non ascii")]
    #[test_case("town!"; "punctuation")]
    fn test_invalid_keys(key: &str) {
        assert_eq!(
            validate_channel_key(key),
            Err(ChatError::InvalidKey(key.to_string()))
        );
    }
}
