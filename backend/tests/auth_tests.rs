//! Authentication and registration validation tests
//!
//! Property-based tests for the signup field validations with
//! Brazilian-format data (CPF, DDD phone numbers) plus role parsing.

use proptest::prelude::*;

use shared::models::Role;
use shared::validation::{
    validate_cpf, validate_email, validate_note, validate_password, validate_phone, MAX_NOTE_LEN,
};

// ============================================================================
// Property Test Strategies
// ============================================================================

/// Generate valid email addresses
fn email_strategy() -> impl Strategy<Value = String> {
    "[a-z]{3,10}@[a-z]{3,10}\\.(com|org|net|com\\.br|agr\\.br)"
}

/// Generate valid passwords (8+ chars)
fn password_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9!@#$%]{8,20}"
}

/// Generate valid CPF document numbers, formatted or bare
fn cpf_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        // Bare 11 digits
        "[0-9]{11}",
        // Standard format XXX.XXX.XXX-XX
        "[0-9]{3}\\.[0-9]{3}\\.[0-9]{3}-[0-9]{2}",
    ]
}

/// Generate valid Brazilian phone numbers (DDD + 8 or 9 digits)
fn phone_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        // Bare digits
        "[1-9][0-9]{9,10}",
        // Formatted (DD) 9XXXX-XXXX
        "\\([1-9][0-9]\\) 9[0-9]{4}-[0-9]{4}",
    ]
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #[test]
    fn prop_valid_emails_accepted(email in email_strategy()) {
        prop_assert!(validate_email(&email).is_ok());
    }

    #[test]
    fn prop_email_without_at_rejected(text in "[a-z0-9.]{1,30}") {
        prop_assert!(validate_email(&text).is_err());
    }

    #[test]
    fn prop_valid_passwords_accepted(password in password_strategy()) {
        prop_assert!(validate_password(&password).is_ok());
    }

    #[test]
    fn prop_short_passwords_rejected(password in "[a-zA-Z0-9]{0,7}") {
        prop_assert!(validate_password(&password).is_err());
    }

    #[test]
    fn prop_valid_cpfs_accepted(cpf in cpf_strategy()) {
        prop_assert!(validate_cpf(&cpf).is_ok());
    }

    #[test]
    fn prop_wrong_length_cpfs_rejected(cpf in "[0-9]{1,10}") {
        prop_assert!(validate_cpf(&cpf).is_err());
    }

    #[test]
    fn prop_valid_phones_accepted(phone in phone_strategy()) {
        prop_assert!(validate_phone(&phone).is_ok());
    }

    #[test]
    fn prop_short_phones_rejected(phone in "[0-9]{1,9}") {
        prop_assert!(validate_phone(&phone).is_err());
    }

    /// Role parsing is total: arbitrary strings either map to a known role
    /// or to `None`, never a panic
    #[test]
    fn prop_role_parse_total(tag in "\\PC{0,32}") {
        let _ = Role::parse(&tag);
    }

    /// Every canonical role tag round-trips through parse
    #[test]
    fn prop_role_as_str_round_trips(role in prop_oneof![
        Just(Role::Admin),
        Just(Role::Farmer),
        Just(Role::Technician),
        Just(Role::Operator),
    ]) {
        prop_assert_eq!(Role::parse(role.as_str()), Some(role));
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[test]
fn test_note_length_boundary() {
    assert!(validate_note(&"a".repeat(MAX_NOTE_LEN)).is_ok());
    assert!(validate_note(&"a".repeat(MAX_NOTE_LEN + 1)).is_err());
    assert!(validate_note("").is_ok());
}

#[test]
fn test_cpf_rejects_letters() {
    assert!(validate_cpf("123.456.789-0a").is_err());
    assert!(validate_cpf("abc.def.ghi-jk").is_err());
}

#[test]
fn test_role_synonyms() {
    assert_eq!(Role::parse("gestor"), Some(Role::Admin));
    assert_eq!(Role::parse("agricultor"), Some(Role::Farmer));
    assert_eq!(Role::parse("produtor"), Some(Role::Farmer));
}

#[test]
fn test_staff_classification() {
    assert!(Role::Admin.is_staff());
    assert!(Role::Technician.is_staff());
    assert!(Role::Operator.is_staff());
    assert!(!Role::Farmer.is_staff());

    assert!(Role::Technician.is_field_staff());
    assert!(Role::Operator.is_field_staff());
    assert!(!Role::Admin.is_field_staff());
}
