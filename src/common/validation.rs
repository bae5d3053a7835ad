// src/common/validation.rs

use validator::ValidationError;

/// Rejeita texto vazio ou só com espaços; o `length` do validator conta os espaços.
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_only_is_blank() {
        assert!(not_blank("   ").is_err());
        assert!(not_blank("\t\n").is_err());
        assert!(not_blank("").is_err());
        assert!(not_blank(" R-01 ").is_ok());
    }
}
