//! Validation utilities for RuralGest
//!
//! Client-side convenience checks; the services re-validate before writing.

/// Maximum length accepted for free-text notes and reports
pub const MAX_NOTE_LEN: usize = 2000;

/// Validate an email has a plausible shape (one `@`, non-empty parts, a dot
/// in the domain)
pub fn validate_email(email: &str) -> Result<(), &'static str> {
    let mut parts = email.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None)
            if !local.is_empty() && domain.contains('.') && !domain.starts_with('.') =>
        {
            Ok(())
        }
        _ => Err("Invalid email address"),
    }
}

/// Validate a password meets the minimum length
pub fn validate_password(password: &str) -> Result<(), &'static str> {
    if password.chars().count() < 8 {
        return Err("Password must be at least 8 characters");
    }
    Ok(())
}

/// Validate a CPF document number: exactly 11 digits after stripping
/// formatting
pub fn validate_cpf(document: &str) -> Result<(), &'static str> {
    let digits: Vec<char> = document.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() != 11 {
        return Err("CPF must have 11 digits");
    }
    if document
        .chars()
        .any(|c| !c.is_ascii_digit() && c != '.' && c != '-' && c != ' ')
    {
        return Err("CPF contains invalid characters");
    }
    Ok(())
}

/// Validate a Brazilian phone number: 10 or 11 digits (DDD + number)
pub fn validate_phone(phone: &str) -> Result<(), &'static str> {
    let digits = phone.chars().filter(|c| c.is_ascii_digit()).count();
    if !(10..=11).contains(&digits) {
        return Err("Phone must have 10 or 11 digits");
    }
    Ok(())
}

/// Validate a free-text note fits the storage cap
pub fn validate_note(note: &str) -> Result<(), &'static str> {
    if note.chars().count() > MAX_NOTE_LEN {
        return Err("Note is too long");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email() {
        assert!(validate_email("maria@fazenda.br").is_ok());
        assert!(validate_email("semarroba").is_err());
        assert!(validate_email("a@b").is_err());
        assert!(validate_email("@dominio.com").is_err());
    }

    #[test]
    fn test_cpf() {
        assert!(validate_cpf("123.456.789-09").is_ok());
        assert!(validate_cpf("12345678909").is_ok());
        assert!(validate_cpf("1234567890").is_err());
        assert!(validate_cpf("123.456.789-0x").is_err());
    }

    #[test]
    fn test_phone() {
        assert!(validate_phone("(54) 99999-8888").is_ok());
        assert!(validate_phone("5499998888").is_ok());
        assert!(validate_phone("999").is_err());
    }

    #[test]
    fn test_note_cap() {
        assert!(validate_note("urgente").is_ok());
        assert!(validate_note(&"x".repeat(MAX_NOTE_LEN + 1)).is_err());
    }
}
