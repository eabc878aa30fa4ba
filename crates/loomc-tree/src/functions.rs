//! Per-function entry-offset table: maps each declared function's name to
//! the offset of its `TFuncdef` entry in the flattened tree stream, so the
//! code generator can locate a function body without a linear scan.

use loomc_core::Repr;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct FunctionEntry {
    pub name: Repr,
    /// Word offset of this function's `TFuncdef` tag in the flattened tree.
    pub tree_offset: u32,
}

#[derive(Clone, Debug, Default)]
pub struct FunctionsTable {
    entries: Vec<FunctionEntry>,
}

impl FunctionsTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, name: Repr, tree_offset: u32) {
        self.entries.push(FunctionEntry { name, tree_offset });
    }

    pub fn lookup(&self, name: Repr) -> Option<u32> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.tree_offset)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FunctionEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_finds_recorded_offset() {
        let mut table = FunctionsTable::new();
        let name = Repr::from_raw(3);
        table.record(name, 42);
        assert_eq!(table.lookup(name), Some(42));
        assert_eq!(table.lookup(Repr::from_raw(99)), None);
    }
}
