// src/api/params.rs
//
// Shared validation for the request parameters the listing and form
// endpoints have in common. The old site re-validated these with a
// hand-written switch in every script; every endpoint here decodes
// through serde and normalizes through this one module.

pub const DEFAULT_LIMIT: i64 = 20;
pub const MAX_LIMIT: i64 = 1000;

/// Normalize a `lang` parameter to a lowercase two-letter code with an
/// optional region suffix (`en`, `fr`, `en-CA`). Anything else falls
/// back to the default.
pub fn validate_lang(value: Option<&str>, default: &str) -> String {
    let value = match value {
        Some(v) => v.trim(),
        None => return default.to_string(),
    };

    if value.len() < 2 || !value[..2].chars().all(|c| c.is_ascii_alphabetic()) {
        return default.to_string();
    }

    let mut lang = value[..2].to_lowercase();
    if value.len() == 5 && &value[2..3] == "-" {
        lang.push_str(&value[2..]);
    }
    lang
}

/// Clamp paging parameters: offsets are non-negative, the limit stays
/// between 1 and the cap and defaults to 20 rows per page.
pub fn paging(offset: Option<i64>, limit: Option<i64>) -> (i64, i64) {
    let offset = offset.unwrap_or(0).max(0);
    let limit = limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    (offset, limit)
}

/// A search pattern is significant only when non-empty after trimming.
pub fn pattern(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

/// Parse the comma-separated list of record keys a message is posted
/// against. Keys are positive integers.
pub fn parse_key_list(value: &str) -> Result<Vec<i64>, String> {
    let mut keys = Vec::new();
    for part in value.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        match part.parse::<i64>() {
            Ok(key) if key > 0 => keys.push(key),
            _ => return Err(format!("Invalid record key '{}'", part)),
        }
    }
    if keys.is_empty() {
        return Err("No record key supplied".to_string());
    }
    Ok(keys)
}

/// Minimal sanity check on an e-mail address: the rules the
/// registration form has always enforced.
pub fn valid_email(value: &str) -> bool {
    value.len() >= 6 && value.contains('@') && !value.contains('\'')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lang_normalization() {
        assert_eq!(validate_lang(Some("EN"), "en"), "en");
        assert_eq!(validate_lang(Some("fr"), "en"), "fr");
        assert_eq!(validate_lang(Some("en-CA"), "en"), "en-CA");
        assert_eq!(validate_lang(Some("german"), "en"), "ge");
        assert_eq!(validate_lang(Some("x"), "en"), "en");
        assert_eq!(validate_lang(Some("12"), "en"), "en");
        assert_eq!(validate_lang(None, "en"), "en");
    }

    #[test]
    fn paging_clamps() {
        assert_eq!(paging(None, None), (0, DEFAULT_LIMIT));
        assert_eq!(paging(Some(-5), Some(0)), (0, 1));
        assert_eq!(paging(Some(40), Some(25)), (40, 25));
        assert_eq!(paging(Some(0), Some(100_000)), (0, MAX_LIMIT));
    }

    #[test]
    fn patterns_drop_blanks() {
        assert_eq!(pattern(Some("  ")), None);
        assert_eq!(pattern(Some(" mar ")), Some("mar".to_string()));
        assert_eq!(pattern(None), None);
    }

    #[test]
    fn key_lists() {
        assert_eq!(parse_key_list("42").unwrap(), vec![42]);
        assert_eq!(parse_key_list("1, 2,3").unwrap(), vec![1, 2, 3]);
        assert!(parse_key_list("").is_err());
        assert!(parse_key_list("1,x").is_err());
        assert!(parse_key_list("0").is_err());
        assert!(parse_key_list("-3").is_err());
    }

    #[test]
    fn email_rules() {
        assert!(valid_email("a@bc.de"));
        assert!(!valid_email("a@b"));
        assert!(!valid_email("nobody.example.com"));
        assert!(!valid_email("o'brien@example.com"));
    }
}
