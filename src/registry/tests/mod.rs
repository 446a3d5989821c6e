//! Unit tests for the registry.

mod domain_tests;
