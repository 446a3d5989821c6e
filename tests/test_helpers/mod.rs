//! Shared helpers for integration tests.

pub mod fleet;

use std::collections::HashMap;
use std::env;
use std::ffi::OsString;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Variables the agent binary reads its settings from.
pub const AGENT_SETTINGS: [&str; 9] = [
    "A2A_BIND",
    "A2A_REGISTRY_URL",
    "A2A_MAX_DELIVERIES",
    "A2A_BATCH_SIZE",
    "A2A_CONCURRENCY",
    "A2A_ROUTER_AGENT",
    "A2A_SINK_AGENT",
    "A2A_SKIP_SEED",
    "DATABASE_URL",
];

static SERIAL: Mutex<()> = Mutex::new(());

/// Agent environment for the duration of one test.
///
/// Starts with every [`AGENT_SETTINGS`] entry unset, so a stray value in the
/// developer's shell cannot leak into a parsing test. Tests holding one run
/// one at a time, and every variable touched is put back on drop.
pub struct AgentEnv {
    originals: HashMap<&'static str, Option<OsString>>,
    _serial: MutexGuard<'static, ()>,
}

impl AgentEnv {
    /// Clears every agent setting.
    pub fn clean() -> Self {
        let mut scoped = Self {
            originals: HashMap::new(),
            _serial: SERIAL.lock().unwrap_or_else(PoisonError::into_inner),
        };
        for key in AGENT_SETTINGS {
            scoped.write(key, None);
        }
        scoped
    }

    /// Sets `key` to `value` until the guard is dropped.
    #[must_use]
    pub fn with(mut self, key: &'static str, value: &str) -> Self {
        self.write(key, Some(value));
        self
    }

    fn write(&mut self, key: &'static str, value: Option<&str>) {
        self.originals
            .entry(key)
            .or_insert_with(|| env::var_os(key));
        // SAFETY: `SERIAL` is held, so no other test in this binary reads or
        // writes the environment concurrently.
        unsafe {
            match value {
                Some(text) => env::set_var(key, text),
                None => env::remove_var(key),
            }
        }
    }
}

impl Drop for AgentEnv {
    fn drop(&mut self) {
        for (key, original) in self.originals.drain() {
            // SAFETY: `SERIAL` is released only after this loop finishes.
            unsafe {
                match original {
                    Some(text) => env::set_var(key, text),
                    None => env::remove_var(key),
                }
            }
        }
    }
}
