//! Unit tests for the envelope codec and dispatcher.

mod dispatcher_tests;
