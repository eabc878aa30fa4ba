//! A single-source-per-run source map.
//!
//! The front end this crate implements only ever analyzes one translation
//! unit at a time, but every diagnostic is still tagged with a `SourceId` —
//! the shape the rest of the stack (and this crate's own multi-file-ready
//! collaborators, like the diagnostics printer) expects, and a shape that
//! costs nothing to keep even with exactly one entry.

use loomc_core::LineIndex;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct SourceId(u32);

impl SourceId {
    /// The source map's first (and, in this single-translation-unit front
    /// end, only) entry.
    pub(crate) fn first() -> Self {
        Self(0)
    }
}

#[derive(Debug, Clone)]
struct SourceEntry {
    name: String,
    text: String,
    line_index: LineIndex,
}

#[derive(Default, Debug, Clone)]
pub struct SourceMap {
    sources: Vec<SourceEntry>,
}

impl SourceMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, name: impl Into<String>, text: impl Into<String>) -> SourceId {
        let text = text.into();
        let line_index = LineIndex::new(&text);
        let id = SourceId(self.sources.len() as u32);
        self.sources.push(SourceEntry { name: name.into(), text, line_index });
        id
    }

    pub fn name(&self, id: SourceId) -> &str {
        &self.sources[id.0 as usize].name
    }

    pub fn text(&self, id: SourceId) -> &str {
        &self.sources[id.0 as usize].text
    }

    pub fn line_index(&self, id: SourceId) -> &LineIndex {
        &self.sources[id.0 as usize].line_index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_returns_distinct_ids() {
        let mut map = SourceMap::new();
        let a = map.add("a.lang", "int x;");
        let b = map.add("b.lang", "int y;");
        assert_ne!(a, b);
        assert_eq!(map.name(a), "a.lang");
        assert_eq!(map.text(b), "int y;");
    }
}
