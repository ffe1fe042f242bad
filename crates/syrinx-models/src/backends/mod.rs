//! Built-in backends.
//!
//! | Module path | Behaviour |
//! |---|---|
//! | [`dummy::MODULE_PATH`] | every operation is a no-op |
//! | [`console::MODULE_PATH`] | logs each call, then behaves like dummy |
//! | [`memory::MODULE_PATH`] | thread-safe in-memory store |
//!
//! The persistent SQLite backend lives in the `syrinx-db` crate.

pub mod console;
pub mod dummy;
pub mod memory;

pub use console::ConsoleBackend;
pub use dummy::DummyBackend;
pub use memory::MemoryBackend;
