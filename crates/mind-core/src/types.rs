//! Core data types for the mind engine.
//!
//! This module defines the document model the association engine reads:
//!
//! - An outline is a named container of notes (one Markdown file, typically)
//! - A note has a title, a type, tags and a free-text description
//! - Every note belongs to exactly one outline
//!
//! The engine never mutates these values. It takes snapshots from a
//! [`Memory`](crate::memory::Memory) and hands back copies, so nothing a
//! caller receives can alias engine-internal storage.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ============================================================================
// ID Types
// ============================================================================

/// Unique identifier for a note.
///
/// Wraps a UUID v4, providing type safety to distinguish note IDs from other
/// UUID-based identifiers in the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(pub Uuid);

impl NoteId {
    /// Creates a new random NoteId using UUID v4.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a NoteId from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for NoteId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for NoteId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Unique identifier for an outline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OutlineId(pub Uuid);

impl OutlineId {
    /// Creates a new random OutlineId using UUID v4.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an OutlineId from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for OutlineId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for OutlineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for OutlineId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

// ============================================================================
// Resource Types
// ============================================================================

/// Kind of thing an association query starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    Outline,
    Note,
    Word,
}

/// Default note type assigned when none is given.
pub const DEFAULT_NOTE_TYPE: &str = "note";

// ============================================================================
// Note
// ============================================================================

/// A single note inside an outline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    /// Unique identifier for this note.
    pub id: NoteId,

    /// The outline this note lives in.
    pub outline_id: OutlineId,

    /// Note title (the Markdown section heading).
    pub title: String,

    /// Note type, e.g. "note", "task", "question".
    pub note_type: String,

    /// Tags attached to the note.
    pub tags: Vec<String>,

    /// Free-text description (the section body).
    pub description: String,
}

impl Note {
    /// Creates a builder for constructing a Note.
    #[must_use]
    pub fn builder() -> NoteBuilder {
        NoteBuilder::default()
    }

    /// Returns the text used for bag-of-words tokenization: title followed
    /// by description.
    pub fn text(&self) -> String {
        let mut text = String::with_capacity(self.title.len() + self.description.len() + 1);
        text.push_str(&self.title);
        text.push('\n');
        text.push_str(&self.description);
        text
    }
}

/// Builder for constructing Note instances.
#[derive(Debug, Default)]
pub struct NoteBuilder {
    id: Option<NoteId>,
    outline_id: Option<OutlineId>,
    title: String,
    note_type: Option<String>,
    tags: Vec<String>,
    description: String,
}

impl NoteBuilder {
    /// Sets the note ID (generates a new one if not set).
    #[must_use]
    pub fn id(mut self, id: NoteId) -> Self {
        self.id = Some(id);
        self
    }

    /// Sets the owning outline.
    #[must_use]
    pub fn outline(mut self, outline_id: OutlineId) -> Self {
        self.outline_id = Some(outline_id);
        self
    }

    /// Sets the title.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Sets the note type.
    #[must_use]
    pub fn note_type(mut self, note_type: impl Into<String>) -> Self {
        self.note_type = Some(note_type.into());
        self
    }

    /// Sets the tags.
    #[must_use]
    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the description text.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Builds the Note, using defaults for unset fields.
    #[must_use]
    pub fn build(self) -> Note {
        Note {
            id: self.id.unwrap_or_default(),
            outline_id: self.outline_id.unwrap_or_default(),
            title: self.title,
            note_type: self
                .note_type
                .unwrap_or_else(|| DEFAULT_NOTE_TYPE.to_string()),
            tags: self.tags,
            description: self.description,
        }
    }
}

// ============================================================================
// Outline
// ============================================================================

/// A named container of notes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outline {
    /// Unique identifier for this outline.
    pub id: OutlineId,

    /// Outline title.
    pub title: String,

    /// Outline type, e.g. "outline", "grow", "analysis".
    pub outline_type: String,

    /// Tags attached to the outline itself.
    pub tags: Vec<String>,

    /// Outline-level description (text before the first note).
    pub description: String,

    /// Notes in document order.
    pub notes: Vec<Note>,
}

impl Outline {
    /// Creates a new empty outline with the given title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: OutlineId::new(),
            title: title.into(),
            outline_type: "outline".to_string(),
            tags: Vec::new(),
            description: String::new(),
            notes: Vec::new(),
        }
    }

    /// Sets the outline description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the outline tags.
    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Appends a note, re-parenting it into this outline.
    pub fn add_note(&mut self, mut note: Note) -> NoteId {
        note.outline_id = self.id;
        let id = note.id;
        self.notes.push(note);
        id
    }

    /// Builder-style variant of [`add_note`](Self::add_note).
    #[must_use]
    pub fn with_note(mut self, note: Note) -> Self {
        self.add_note(note);
        self
    }

    /// Returns the outline header represented as a note.
    ///
    /// The descriptor shares the outline's UUID so it is stable across
    /// calls and distinct from every real note.
    pub fn descriptor_note(&self) -> Note {
        Note {
            id: NoteId::from_uuid(self.id.0),
            outline_id: self.id,
            title: self.title.clone(),
            note_type: self.outline_type.clone(),
            tags: self.tags.clone(),
            description: self.description.clone(),
        }
    }

    /// Finds a note by ID.
    pub fn note(&self, id: &NoteId) -> Option<&Note> {
        self.notes.iter().find(|n| &n.id == id)
    }
}

// ============================================================================
// Tests
// ============================================================================
