//! Timing-safe equality for hashes, signatures and MACs.
//!
//! Running time depends only on the length of the first operand, never on the
//! position of the first differing byte. On a length mismatch the first operand
//! is still compared against itself so that length and content mismatches cost
//! the same.

use subtle::ConstantTimeEq;

/// Constant-time byte equality.
pub fn ct_eq_bytes(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        let _ = std::hint::black_box(a.ct_eq(a));
        return false;
    }
    a.ct_eq(b).into()
}

/// Constant-time string equality over the UTF-8 bytes.
pub fn ct_eq_str(a: &str, b: &str) -> bool {
    ct_eq_bytes(a.as_bytes(), b.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_strings() {
        assert!(ct_eq_str("abc", "abc"));
        assert!(ct_eq_str("", ""));
    }

    #[test]
    fn test_unequal_same_length() {
        assert!(!ct_eq_str("abc", "abd"));
        assert!(!ct_eq_str("xbc", "abc"));
    }

    #[test]
    fn test_unequal_lengths() {
        assert!(!ct_eq_str("abc", "abcd"));
        assert!(!ct_eq_str("", "a"));
        assert!(!ct_eq_str("a", ""));
    }

    #[test]
    fn test_bytes() {
        assert!(ct_eq_bytes(&[1, 2, 3], &[1, 2, 3]));
        assert!(!ct_eq_bytes(&[1, 2, 3], &[1, 2, 4]));
        assert!(!ct_eq_bytes(&[], &[0]));
    }
}
