// src/stack.rs
//
// Open-element tracking. Frames are pushed on start tags and removed on the
// matching end tag; what happens when an end tag does not match the innermost
// frame depends on the `StackMode`.

use std::collections::BTreeMap;

pub type Attributes = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagFrame {
    pub name: String,
    pub attrs: Attributes,
    /// Position of the start tag among all frames pushed this conversion.
    pub ordinal: usize,
}

impl TagFrame {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StackMode {
    /// Remove the nearest open frame with the same name, wherever it is.
    #[default]
    Tolerant,
    /// Remove a frame only when it is the innermost one.
    Strict,
}

#[derive(Debug, Default)]
pub struct TagStack {
    frames: Vec<TagFrame>,
    mode: StackMode,
    next_ordinal: usize,
}

impl TagStack {
    pub fn new(mode: StackMode) -> Self {
        Self {
            frames: Vec::new(),
            mode,
            next_ordinal: 0,
        }
    }

    /// Push a frame and return its ordinal.
    pub fn push(&mut self, name: &str, attrs: Attributes) -> usize {
        let ordinal = self.next_ordinal;
        self.next_ordinal += 1;
        self.frames.push(TagFrame {
            name: name.to_string(),
            attrs,
            ordinal,
        });
        ordinal
    }

    /// Index of the frame an end tag named `name` would close.
    fn closing_index(&self, name: &str) -> Option<usize> {
        match self.mode {
            StackMode::Strict => {
                let idx = self.frames.len().checked_sub(1)?;
                (self.frames[idx].name == name).then_some(idx)
            }
            StackMode::Tolerant => self.frames.iter().rposition(|f| f.name == name),
        }
    }

    /// The frame an end tag named `name` would close, without closing it.
    pub fn matching(&self, name: &str) -> Option<&TagFrame> {
        self.closing_index(name).map(|idx| &self.frames[idx])
    }

    /// Remove the frame closed by an end tag named `name`.
    ///
    /// Returns `None`, leaving the stack untouched, when no frame matches.
    pub fn pop(&mut self, name: &str) -> Option<TagFrame> {
        let idx = self.closing_index(name)?;
        Some(self.frames.remove(idx))
    }

    pub fn top(&self) -> Option<&TagFrame> {
        self.frames.last()
    }

    pub fn is_open(&self, name: &str) -> bool {
        self.frames.iter().any(|f| f.name == name)
    }

    /// Number of open frames named `name`.
    pub fn depth_of(&self, name: &str) -> usize {
        self.frames.iter().filter(|f| f.name == name).count()
    }

    /// Innermost open frame whose name is one of `names`.
    pub fn nearest(&self, names: &[&str]) -> Option<&TagFrame> {
        self.frames
            .iter()
            .rev()
            .find(|f| names.contains(&f.name.as_str()))
    }

    /// Open frames, outermost first.
    pub fn frames(&self) -> &[TagFrame] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}
