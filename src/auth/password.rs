/// Passwords are exactly six ASCII letters or digits
pub const PASSWORD_LENGTH: usize = 6;

pub fn is_valid_password(password: &str) -> bool {
    password.len() == PASSWORD_LENGTH && password.chars().all(|c| c.is_ascii_alphanumeric())
}

pub fn hash_password(password: &str, cost: u32) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(password, cost)
}

/// A malformed stored hash counts as a mismatch
pub fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_rule() {
        assert!(is_valid_password("abc123"));
        assert!(is_valid_password("ABCDEF"));
        assert!(!is_valid_password("abc12"));
        assert!(!is_valid_password("abc1234"));
        assert!(!is_valid_password("abc 12"));
        assert!(!is_valid_password("abcdé1"));
    }

    #[test]
    fn hash_round_trip() {
        let hash = hash_password("abc123", 4).unwrap();
        assert!(verify_password("abc123", &hash));
        assert!(!verify_password("abc124", &hash));
        assert!(!verify_password("abc123", "not-a-bcrypt-hash"));
    }
}
