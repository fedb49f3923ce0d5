//! Client-to-storage field name normalization
//!
//! Clients send camelCase field names; the storage layer uses
//! lowercase snake_case. The transform is pure and entity-agnostic.

/// Normalize a client-supplied field name into the storage convention.
///
/// `startDate` becomes `start_date`, `HTMLContent` becomes `html_content`,
/// and names already in snake_case pass through unchanged.
#[must_use]
pub fn normalize_key(client_key: &str) -> String {
    let chars: Vec<char> = client_key.chars().collect();
    let mut out = String::with_capacity(client_key.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            let prev_lower = i > 0 && (chars[i - 1].is_lowercase() || chars[i - 1].is_ascii_digit());
            // Break before the last capital of an acronym run: "HTMLBody" -> "html_body"
            let next_lower = i > 0
                && chars[i - 1].is_uppercase()
                && chars.get(i + 1).is_some_and(|next| next.is_lowercase());
            if prev_lower || next_lower {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camel_case() {
        assert_eq!(normalize_key("startDate"), "start_date");
        assert_eq!(normalize_key("endDate"), "end_date");
        assert_eq!(normalize_key("completed"), "completed");
    }

    #[test]
    fn test_snake_case_passes_through() {
        assert_eq!(normalize_key("start_date"), "start_date");
        assert_eq!(normalize_key("title"), "title");
    }

    #[test]
    fn test_pascal_case() {
        assert_eq!(normalize_key("StartDate"), "start_date");
    }

    #[test]
    fn test_acronym_runs() {
        assert_eq!(normalize_key("HTMLContent"), "html_content");
        assert_eq!(normalize_key("myID"), "my_id");
    }

    #[test]
    fn test_digits() {
        assert_eq!(normalize_key("line2Break"), "line2_break");
    }

    #[test]
    fn test_empty() {
        assert_eq!(normalize_key(""), "");
    }
}
