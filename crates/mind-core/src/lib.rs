//! mind-core: Core types for the mind engine
//!
//! This crate provides:
//! - Note and outline model types
//! - The `Memory` contract the association engine learns from
//! - An in-process `Memory` implementation

pub mod memory;
pub mod types;

// Re-export commonly used types at crate root for convenience
pub use memory::{InMemoryMemory, Memory};
pub use types::{
    DEFAULT_NOTE_TYPE, Note, NoteBuilder, NoteId, Outline, OutlineId, ResourceType,
};
