//! Mode table (mode-tab): interning store for structural types.
//!
//! Unlike [`crate::repr::ReprTable`], which interns by exact byte equality,
//! the mode table interns by *structural* equality: two composite modes with
//! the same shape (same field modes, same field names, same parameter list)
//! collapse to the same entry. We use a content hash over the composite's
//! shape as the lookup key — the redesign spec.md calls for in place of a
//! mutable "has this shape been seen" scan of the whole table.

use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::collections::hash_map::DefaultHasher;

use crate::repr::Repr;

/// A stable handle into the mode table, or one of the built-in primitive
/// sentinels.
///
/// Primitive modes never occupy a table slot: there is exactly one `int`,
/// one `float`, and so on for the whole compilation, so they are represented
/// as fixed sentinel values rather than interned entries.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Mode {
    Int,
    Float,
    Char,
    Void,
    VoidPointer,
    /// Index into [`ModeTable`]'s composite entries.
    Composite(ModeIndex),
}

impl Mode {
    pub fn is_primitive(self) -> bool {
        !matches!(self, Mode::Composite(_))
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct ModeIndex(u32);

impl ModeIndex {
    #[inline]
    pub fn as_u32(self) -> u32 {
        self.0
    }

    #[inline]
    pub fn from_raw(index: u32) -> Self {
        Self(index)
    }
}

/// One field of a struct mode: its type and its name in repr-tab.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct Field {
    pub mode: Mode,
    pub name: Repr,
}

/// The shape stored for a composite mode-table entry.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum Shape {
    /// `MFUNCTION`: return mode and ordered parameter modes.
    Function { ret: Mode, params: Vec<Mode> },
    /// `MARRAY`: element mode. Dimension count is tracked by repeated
    /// nesting, matching how the tree encodes multi-dimensional
    /// declarators one dimension at a time.
    Array { element: Mode },
    /// `MSTRUCT`: ordered fields. Field order is part of the shape — two
    /// structs with the same fields in different order are distinct modes.
    Struct { fields: Vec<Field> },
    /// `MPOINTER`: pointee mode.
    Pointer { pointee: Mode },
}

impl Shape {
    /// Word size of a value of this shape, used for struct field layout and
    /// frame-size accounting. Matches the original's flat word-count model:
    /// every scalar and every pointer is one word, arrays are long as their
    /// element count times the element's word size (not tracked here, since
    /// dimension lengths live on the declarator, not the mode), and structs
    /// are the sum of their fields' word sizes.
    pub fn word_size(&self, table: &ModeTable) -> u32 {
        match self {
            Shape::Function { .. } => 1,
            Shape::Array { .. } => 1,
            Shape::Pointer { .. } => 1,
            Shape::Struct { fields } => fields
                .iter()
                .map(|f| table.word_size(f.mode))
                .sum(),
        }
    }

    fn field_count(&self) -> u32 {
        match self {
            Shape::Struct { fields } => fields.len() as u32,
            _ => 0,
        }
    }
}

/// Interning store for structural (composite) types, plus the three modes
/// every compilation preinstalls before user source is read.
#[derive(Debug, Clone)]
pub struct ModeTable {
    shapes: Vec<Shape>,
    by_hash: HashMap<u64, Vec<ModeIndex>>,
    /// The mode index of the preinstalled message-info struct:
    /// `struct { int num_threads; int data; }`.
    pub message_info: ModeIndex,
    /// The mode index of the preinstalled `t_msg_send(message_info)`
    /// function.
    pub msg_send: ModeIndex,
    /// The mode index of the preinstalled `interpreter(void*) -> void*`
    /// function, the thread-entry-point mode used by `t_create_direct`.
    pub interpreter: ModeIndex,
    /// The first mode index available for user-declared composite types —
    /// the index immediately after the three preinstalled modes above.
    pub start_mode: ModeIndex,
}

fn hash_shape(shape: &Shape) -> u64 {
    let mut hasher = DefaultHasher::new();
    shape.hash(&mut hasher);
    hasher.finish()
}

impl ModeTable {
    /// Build a fresh table with the three preinstalled modes already
    /// interned, in the same order every compilation installs them:
    /// the message-info struct, then `t_msg_send`, then `interpreter`.
    /// `start_mode` is recorded as the index immediately after
    /// `interpreter`, mirroring `init_modetab`'s `start_mode = 14`.
    pub fn with_preinstalled_modes(num_threads_name: Repr, data_name: Repr) -> Self {
        let mut table = Self {
            shapes: Vec::new(),
            by_hash: HashMap::new(),
            message_info: ModeIndex(0),
            msg_send: ModeIndex(0),
            interpreter: ModeIndex(0),
            start_mode: ModeIndex(0),
        };

        let message_info = table.intern(Shape::Struct {
            fields: vec![
                Field { mode: Mode::Int, name: num_threads_name },
                Field { mode: Mode::Int, name: data_name },
            ],
        });
        let msg_send = table.intern(Shape::Function {
            ret: Mode::Void,
            params: vec![Mode::Composite(message_info)],
        });
        let interpreter = table.intern(Shape::Function {
            ret: Mode::VoidPointer,
            params: vec![Mode::VoidPointer],
        });

        table.message_info = message_info;
        table.msg_send = msg_send;
        table.interpreter = interpreter;
        table.start_mode = ModeIndex(table.shapes.len() as u32);
        table
    }

    /// Intern a shape, returning the existing entry if an equal shape has
    /// already been installed.
    pub fn intern(&mut self, shape: Shape) -> ModeIndex {
        let hash = hash_shape(&shape);
        if let Some(candidates) = self.by_hash.get(&hash) {
            for &candidate in candidates {
                if self.shapes[candidate.as_u32() as usize] == shape {
                    return candidate;
                }
            }
        }
        let index = ModeIndex(self.shapes.len() as u32);
        self.shapes.push(shape);
        self.by_hash.entry(hash).or_default().push(index);
        index
    }

    #[inline]
    pub fn shape(&self, index: ModeIndex) -> &Shape {
        &self.shapes[index.as_u32() as usize]
    }

    pub fn field_count(&self, index: ModeIndex) -> u32 {
        self.shape(index).field_count()
    }

    /// Word size of an arbitrary mode, primitive or composite.
    pub fn word_size(&self, mode: Mode) -> u32 {
        match mode {
            Mode::Composite(index) => self.shape(index).word_size(self),
            _ => 1,
        }
    }

    /// Look up a struct field by name, returning its zero-based position and
    /// mode. Used for `.`/`->` field access.
    pub fn find_field(&self, index: ModeIndex, name: Repr) -> Option<(u32, Mode)> {
        match self.shape(index) {
            Shape::Struct { fields } => fields
                .iter()
                .enumerate()
                .find(|(_, f)| f.name == name)
                .map(|(i, f)| (i as u32, f.mode)),
            _ => None,
        }
    }

    /// Mode of a struct field at the zero-based position `find_field`
    /// returns, for recovering a `Select` node's mode from its base's
    /// struct shape after the field name itself has been discarded.
    pub fn field_mode_at(&self, index: ModeIndex, position: u32) -> Option<Mode> {
        match self.shape(index) {
            Shape::Struct { fields } => fields.get(position as usize).map(|f| f.mode),
            _ => None,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repr::ReprTable;

    fn sample_table() -> (ReprTable, ModeTable) {
        let mut reprs = ReprTable::new();
        let num_threads = reprs.intern("num_threads");
        let data = reprs.intern("data");
        let modes = ModeTable::with_preinstalled_modes(num_threads, data);
        (reprs, modes)
    }

    #[test]
    fn preinstalled_modes_are_in_ruc_order() {
        let (_, modes) = sample_table();
        assert_eq!(modes.message_info, ModeIndex(0));
        assert_eq!(modes.msg_send, ModeIndex(1));
        assert_eq!(modes.interpreter, ModeIndex(2));
        assert_eq!(modes.start_mode, ModeIndex(3));
        assert_eq!(modes.len(), 3);
    }

    #[test]
    fn structural_interning_dedups_equal_shapes() {
        let (mut reprs, mut modes) = sample_table();
        let a = reprs.intern("a");
        let b = reprs.intern("b");
        let s1 = modes.intern(Shape::Struct {
            fields: vec![
                Field { mode: Mode::Int, name: a },
                Field { mode: Mode::Int, name: b },
            ],
        });
        let s2 = modes.intern(Shape::Struct {
            fields: vec![
                Field { mode: Mode::Int, name: a },
                Field { mode: Mode::Int, name: b },
            ],
        });
        assert_eq!(s1, s2);
        assert_eq!(modes.len(), modes.start_mode.as_u32() as usize + 1);
    }

    #[test]
    fn field_order_distinguishes_shapes() {
        let (mut reprs, mut modes) = sample_table();
        let a = reprs.intern("a");
        let b = reprs.intern("b");
        let s1 = modes.intern(Shape::Struct {
            fields: vec![
                Field { mode: Mode::Int, name: a },
                Field { mode: Mode::Int, name: b },
            ],
        });
        let s2 = modes.intern(Shape::Struct {
            fields: vec![
                Field { mode: Mode::Int, name: b },
                Field { mode: Mode::Int, name: a },
            ],
        });
        assert_ne!(s1, s2);
    }

    #[test]
    fn find_field_reports_position_and_mode() {
        let (mut reprs, mut modes) = sample_table();
        let a = reprs.intern("a");
        let b = reprs.intern("b");
        let s = modes.intern(Shape::Struct {
            fields: vec![
                Field { mode: Mode::Int, name: a },
                Field { mode: Mode::Int, name: b },
            ],
        });
        assert_eq!(modes.find_field(s, b), Some((1, Mode::Int)));
        assert_eq!(modes.find_field(s, reprs.intern("c")), None);
    }
}
