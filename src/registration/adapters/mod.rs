//! Infrastructure adapters for push provider registration.

pub mod file;
pub mod memory;
pub mod scripted;

pub use file::FileRegistrationStore;
pub use memory::InMemoryRegistrationStore;
pub use scripted::{ScriptedProvider, ScriptedReply, ScriptedUnregisterReply};
