//! Non-fatal compiler findings
//!
//! Warnings never abort the pipeline. They accumulate in a [`Notices`]
//! collection while a pass runs, and the driver prints whatever piled up
//! once compilation finishes. Anything fatal travels as
//! [`crate::CompileError`] on the `Result` path instead.

use crate::Position;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Level {
    Warning,
    Note,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Warning => write!(f, "warning"),
            Level::Note => write!(f, "note"),
        }
    }
}

/// One finding: a level, the offending location when one is known, and the
/// explanation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: Level,
    pub pos: Option<Position>,
    pub text: String,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.pos {
            Some(pos) => write!(f, "{}: {}: {}", pos, self.level, self.text),
            None => write!(f, "{}: {}", self.level, self.text),
        }
    }
}

/// An append-only collection of findings, in the order they were made.
#[derive(Debug, Clone, Default)]
pub struct Notices {
    items: Vec<Notice>,
}

impl Notices {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warn(&mut self, pos: Option<Position>, text: impl Into<String>) {
        self.items.push(Notice { level: Level::Warning, pos, text: text.into() });
    }

    pub fn note(&mut self, pos: Option<Position>, text: impl Into<String>) {
        self.items.push(Notice { level: Level::Note, pos, text: text.into() });
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Notice> {
        self.items.iter()
    }
}

impl<'a> IntoIterator for &'a Notices {
    type Item = &'a Notice;
    type IntoIter = std::slice::Iter<'a, Notice>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
