//! Validation helpers for DTOs.

use validator::ValidationError;

/// Longest accepted game name, in characters.
const MAX_NAME_LENGTH: usize = 64;

/// Validates that a game name is non-blank and at most 64 characters.
///
/// # Examples
///
/// ```ignore
/// validate_game_name("friday captions") // Ok
/// validate_game_name("   ")             // Err - blank
/// ```
pub fn validate_game_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        let mut err = ValidationError::new("game_name_blank");
        err.message = Some("Game name must not be blank".into());
        return Err(err);
    }

    if name.chars().count() > MAX_NAME_LENGTH {
        let mut err = ValidationError::new("game_name_length");
        err.message = Some(
            format!(
                "Game name must be at most {MAX_NAME_LENGTH} characters (got {})",
                name.chars().count()
            )
            .into(),
        );
        return Err(err);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_game_name_valid() {
        assert!(validate_game_name("friday captions").is_ok());
        assert!(validate_game_name("x").is_ok());
    }

    #[test]
    fn test_validate_game_name_blank() {
        assert!(validate_game_name("").is_err());
        assert!(validate_game_name("   ").is_err());
        assert!(validate_game_name("\t\n").is_err());
    }

    #[test]
    fn test_validate_game_name_too_long() {
        assert!(validate_game_name(&"x".repeat(64)).is_ok());
        assert!(validate_game_name(&"x".repeat(65)).is_err());
    }
}
