//! Loads a directory of Markdown outlines into memory.
//!
//! Each `.md` file is one outline:
//!
//! ```text
//! # Outline title <!-- Metadata: type: Outline; tags: rust,notes; -->
//! Outline description...
//!
//! ## Note title <!-- Metadata: type: Note; tags: ownership; -->
//! Note description...
//! ```
//!
//! The metadata comment is optional. Only `type` and `tags` are read, other
//! keys are ignored.

use mind_core::{InMemoryMemory, Note, Outline};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),
}

const METADATA_OPEN: &str = "<!-- Metadata:";
const METADATA_CLOSE: &str = "-->";

/// A heading line split into its title and metadata.
#[derive(Debug, Default, PartialEq)]
struct Heading {
    title: String,
    kind: Option<String>,
    tags: Vec<String>,
}

fn parse_heading(text: &str) -> Heading {
    let Some(start) = text.find(METADATA_OPEN) else {
        return Heading {
            title: text.trim().to_string(),
            ..Heading::default()
        };
    };

    let mut heading = Heading {
        title: text[..start].trim().to_string(),
        ..Heading::default()
    };
    let rest = &text[start + METADATA_OPEN.len()..];
    let body = rest.find(METADATA_CLOSE).map_or(rest, |end| &rest[..end]);

    for field in body.split(';') {
        let Some((key, value)) = field.split_once(':') else {
            continue;
        };
        match key.trim() {
            "type" => heading.kind = Some(value.trim().to_string()),
            "tags" => {
                heading.tags = value
                    .split(',')
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(String::from)
                    .collect()
            }
            _ => {}
        }
    }
    heading
}

fn finish_note(outline: &mut Outline, heading: Heading, body: &[&str]) {
    let mut builder = Note::builder()
        .title(heading.title)
        .tags(heading.tags)
        .description(body.join("\n").trim());
    if let Some(kind) = heading.kind {
        builder = builder.note_type(kind);
    }
    outline.add_note(builder.build());
}

/// Parses one Markdown outline. `fallback_title` is used when the text has
/// no `# ` heading.
pub fn parse_outline(text: &str, fallback_title: &str) -> Outline {
    let mut outline = Outline::new(fallback_title);
    let mut preamble: Vec<&str> = Vec::new();
    let mut current: Option<(Heading, Vec<&str>)> = None;
    let mut titled = false;

    for line in text.lines() {
        if let Some(rest) = line.strip_prefix("## ") {
            if let Some((heading, body)) = current.take() {
                finish_note(&mut outline, heading, &body);
            }
            current = Some((parse_heading(rest), Vec::new()));
            continue;
        }

        match (&mut current, line.strip_prefix("# ")) {
            (None, Some(rest)) if !titled => {
                let heading = parse_heading(rest);
                outline.title = heading.title;
                if let Some(kind) = heading.kind {
                    outline.outline_type = kind;
                }
                outline.tags = heading.tags;
                titled = true;
            }
            (Some((_, body)), _) => body.push(line),
            (None, _) => preamble.push(line),
        }
    }

    if let Some((heading, body)) = current {
        finish_note(&mut outline, heading, &body);
    }
    outline.description = preamble.join("\n").trim().to_string();
    outline
}

/// Reads every `.md` file directly under `dir`, in file name order.
pub fn load_outlines(dir: &Path) -> Result<Vec<Outline>, LoadError> {
    if !dir.is_dir() {
        return Err(LoadError::NotADirectory(dir.to_path_buf()));
    }

    let io_error = |source| LoadError::Io {
        path: dir.to_path_buf(),
        source,
    };
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(io_error)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "md"))
        .collect();
    paths.sort();

    let mut outlines = Vec::with_capacity(paths.len());
    for path in paths {
        let text = fs::read_to_string(&path).map_err(|source| LoadError::Io {
            path: path.clone(),
            source,
        })?;
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let outline = parse_outline(&text, &stem);
        debug!("Loaded outline '{}' with {} notes", outline.title, outline.notes.len());
        outlines.push(outline);
    }

    info!("Loaded {} outlines from {}", outlines.len(), dir.display());
    Ok(outlines)
}

/// Loads `dir` into an in-process memory.
pub fn load_memory(dir: &Path) -> Result<InMemoryMemory, LoadError> {
    Ok(InMemoryMemory::with_outlines(load_outlines(dir)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mind_core::Memory;
    use tempfile::TempDir;

    const RUST_MD: &str = "\
# Rust <!-- Metadata: type: Outline; tags: programming,systems; created: 2024-01-01; -->
Notes about the language.

## Ownership <!-- Metadata: type: Note; tags: memory; -->
Each value has a single owner.
Moves transfer it.

## Borrowing
References borrow without owning.
";

    #[test]
    fn test_parse_heading_with_metadata() {
        let heading = parse_heading("Rust <!-- Metadata: tags: a, b; type: Outline; reads: 3; -->");
        assert_eq!(heading.title, "Rust");
        assert_eq!(heading.kind.as_deref(), Some("Outline"));
        assert_eq!(heading.tags, vec!["a", "b"]);
    }

    #[test]
    fn test_parse_heading_plain() {
        let heading = parse_heading("  Plain title ");
        assert_eq!(heading.title, "Plain title");
        assert!(heading.kind.is_none());
        assert!(heading.tags.is_empty());
    }

    #[test]
    fn test_parse_outline() {
        let outline = parse_outline(RUST_MD, "fallback");

        assert_eq!(outline.title, "Rust");
        assert_eq!(outline.outline_type, "Outline");
        assert_eq!(outline.tags, vec!["programming", "systems"]);
        assert_eq!(outline.description, "Notes about the language.");
        assert_eq!(outline.notes.len(), 2);

        let ownership = &outline.notes[0];
        assert_eq!(ownership.title, "Ownership");
        assert_eq!(ownership.tags, vec!["memory"]);
        assert_eq!(
            ownership.description,
            "Each value has a single owner.\nMoves transfer it."
        );
        assert_eq!(ownership.outline_id, outline.id);
        assert_eq!(outline.notes[1].title, "Borrowing");
    }

    #[test]
    fn test_parse_outline_without_title_uses_fallback() {
        let outline = parse_outline("## Only note\nBody", "scratch");
        assert_eq!(outline.title, "scratch");
        assert_eq!(outline.notes.len(), 1);
    }

    #[test]
    fn test_load_directory() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("b-rust.md"), RUST_MD).unwrap();
        fs::write(dir.path().join("a-garden.md"), "# Garden\n## Tomatoes\nWater daily.\n").unwrap();
        fs::write(dir.path().join("ignored.txt"), "# Not an outline").unwrap();

        let memory = load_memory(dir.path()).unwrap();
        let outlines = memory.outlines();

        assert_eq!(outlines.len(), 2);
        assert_eq!(outlines[0].title, "Garden");
        assert_eq!(outlines[1].title, "Rust");
        assert_eq!(memory.notes_count(), 3);
        assert!(memory.find_note_by_title("Tomatoes").is_some());
    }

    #[test]
    fn test_load_missing_directory() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        assert!(matches!(
            load_outlines(&missing),
            Err(LoadError::NotADirectory(_))
        ));
    }
}
