//! Temporary tokens for placeholders
//!
//! Tokens live only while one submission is in flight. The reserved prefix
//! keeps them out of the remote id space; the millisecond timestamp plus a
//! random suffix makes collisions unlikely but not impossible.

use uuid::Uuid;

/// Reserved prefix of every temporary token
pub const TEMPORARY_TOKEN_PREFIX: &str = "tmp-";

const RANDOM_SUFFIX_LEN: usize = 12;

/// True if `id` belongs to the temporary token space
pub fn is_temporary_id(id: &str) -> bool {
    id.starts_with(TEMPORARY_TOKEN_PREFIX)
}

/// Source of fresh temporary tokens
pub trait TokenSource: Send + Sync {
    fn next_token(&self, now_ms: i64) -> String;
}

/// `tmp-<millis>-<12 hex chars of a v4 UUID>`
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomTokenSource;

impl TokenSource for RandomTokenSource {
    fn next_token(&self, now_ms: i64) -> String {
        let random = Uuid::new_v4().simple().to_string();
        format!(
            "{}{}-{}",
            TEMPORARY_TOKEN_PREFIX,
            now_ms,
            &random[..RANDOM_SUFFIX_LEN]
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_shape() {
        let token = RandomTokenSource.next_token(1_700_000_000_123);

        assert!(is_temporary_id(&token));
        assert!(token.starts_with("tmp-1700000000123-"));
        assert_eq!(token.len(), "tmp-1700000000123-".len() + RANDOM_SUFFIX_LEN);
    }

    #[test]
    fn test_tokens_differ_within_same_millisecond() {
        let a = RandomTokenSource.next_token(42);
        let b = RandomTokenSource.next_token(42);
        assert_ne!(a, b);
    }

    #[test]
    fn test_remote_ids_are_not_temporary() {
        assert!(!is_temporary_id("abc"));
        assert!(!is_temporary_id("0190b2c4-tmp-"));
    }
}
