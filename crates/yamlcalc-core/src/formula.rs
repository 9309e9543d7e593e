//! Formula cell detection

/// Character that marks a string value as a formula
pub const FORMULA_MARKER: char = '=';

/// Get the expression text of a formula cell
///
/// A string is a formula when its content, after trimming surrounding
/// whitespace, starts with [`FORMULA_MARKER`]. The payload is everything after
/// the marker. Empty and unmarked strings are never formulas.
pub fn formula_payload(text: &str) -> Option<&str> {
    text.trim().strip_prefix(FORMULA_MARKER)
}

/// Check if a string value is a formula
pub fn is_formula(text: &str) -> bool {
    formula_payload(text).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formula_payload() {
        assert_eq!(formula_payload("=1+1"), Some("1+1"));
        assert_eq!(formula_payload("  = self['a'] \n"), Some(" self['a']"));
        assert_eq!(formula_payload("="), Some(""));
    }

    #[test]
    fn test_not_formula() {
        assert!(!is_formula(""));
        assert!(!is_formula("   "));
        assert!(!is_formula("a = b"));
        assert!(!is_formula("1+1"));
    }
}
