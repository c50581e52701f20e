//! Tests for core_kernel error types

use core_kernel::error::CoreError;
use core_kernel::{InvalidCodeError, LocaleId};

#[test]
fn test_core_error_validation() {
    let error = CoreError::validation("Invalid input");

    match error {
        CoreError::Validation(msg) => assert_eq!(msg, "Invalid input"),
        _ => panic!("Expected Validation error"),
    }
}

#[test]
fn test_core_error_not_found() {
    let error = CoreError::not_found("Organization not found");

    match error {
        CoreError::NotFound(msg) => assert_eq!(msg, "Organization not found"),
        _ => panic!("Expected NotFound error"),
    }
}

#[test]
fn test_core_error_from_invalid_code() {
    let core_error: CoreError = InvalidCodeError::new("party type", "robot").into();

    assert!(matches!(core_error, CoreError::InvalidCode(_)));
    assert_eq!(core_error.to_string(), "Unrecognized party type code 'robot'");
}

#[test]
fn test_core_error_from_invalid_locale() {
    let locale_error = LocaleId::parse("??").unwrap_err();
    let core_error: CoreError = locale_error.into();

    assert!(matches!(core_error, CoreError::InvalidLocale(_)));
}

#[test]
fn test_core_error_display() {
    let error = CoreError::validation("Test error");
    let display = format!("{}", error);

    assert!(display.contains("Validation error"));
}

#[test]
fn test_core_error_configuration() {
    let error = CoreError::configuration("Missing config");

    match error {
        CoreError::Configuration(msg) => assert_eq!(msg, "Missing config"),
        _ => panic!("Expected Configuration error"),
    }
}
