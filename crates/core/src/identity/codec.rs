//! Email to config-section encoding.
//!
//! Git config subsection names may hold almost anything, but dots in the key
//! would make `identity.<section>.name` ambiguous to split. `@` and `.` are
//! therefore spelled out. Two emails that differ only by a literal `_at_` or
//! `_dot_` versus `@` or `.` map to the same section; that is a known limit.

/// Encode an email address as a config section name.
pub fn encode_email(email: &str) -> String {
    email.replace('@', "_at_").replace('.', "_dot_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_email() {
        assert_eq!(encode_email("john@example.com"), "john_at_example_dot_com");
        assert_eq!(
            encode_email("first.last@sub.example.org"),
            "first_dot_last_at_sub_dot_example_dot_org"
        );
        assert_eq!(encode_email("no-symbols+tag"), "no-symbols+tag");
        assert_eq!(encode_email(""), "");
    }

    #[test]
    fn test_encode_is_deterministic() {
        let email = "a.b@c.d";
        assert_eq!(encode_email(email), encode_email(email));
    }

    #[test]
    fn test_known_collision() {
        assert_eq!(encode_email("a@b.com"), encode_email("a_at_b_dot_com"));
    }
}
