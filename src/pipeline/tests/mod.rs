//! Unit tests for the log pipeline.
