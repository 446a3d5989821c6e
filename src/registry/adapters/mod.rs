//! Adapter implementations for agent card persistence.

pub mod memory;
pub mod postgres;
