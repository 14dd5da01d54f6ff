//! Tests for the token codec and service

mod config_tests;
