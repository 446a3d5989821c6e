//! In-memory registry store.

mod card_store;

pub use card_store::InMemoryCardStore;
