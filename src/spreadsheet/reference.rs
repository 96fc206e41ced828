//! Excel-style column letter helpers.

/// Converts column letters to a 0-based column index (A = 0, B = 1, ..., Z = 25, AA = 26, ...).
///
/// Letters are case-insensitive. Returns None for an empty string, for any
/// character outside A-Z, or when the value does not fit in a `usize`.
pub fn column_to_index(letters: &str) -> Option<usize> {
    if letters.is_empty() {
        return None;
    }
    letters
        .chars()
        .try_fold(0usize, |index, letter| {
            let letter = letter.to_ascii_uppercase();
            if !letter.is_ascii_uppercase() {
                return None;
            }
            let digit = letter as usize - 'A' as usize + 1;
            index.checked_mul(26)?.checked_add(digit)
        })
        .map(|column| column - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_single_letters() {
        assert_eq!(column_to_index("A"), Some(0));
        assert_eq!(column_to_index("B"), Some(1));
        assert_eq!(column_to_index("Z"), Some(25));
    }

    #[test]
    fn decode_multiple_letters() {
        assert_eq!(column_to_index("AA"), Some(26));
        assert_eq!(column_to_index("AZ"), Some(51));
        assert_eq!(column_to_index("BA"), Some(52));
        assert_eq!(column_to_index("XFD"), Some(16_383));
    }

    #[test]
    fn decode_is_case_insensitive() {
        assert_eq!(column_to_index("b"), Some(1));
        assert_eq!(column_to_index("aA"), Some(26));
    }

    #[test]
    fn decode_rejects_invalid_letters() {
        assert_eq!(column_to_index(""), None);
        assert_eq!(column_to_index("A1"), None);
        assert_eq!(column_to_index("Ä"), None);
        assert_eq!(column_to_index(&"Z".repeat(64)), None);
    }
}
