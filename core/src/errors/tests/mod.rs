//! Tests for error types

mod token_error_tests;
