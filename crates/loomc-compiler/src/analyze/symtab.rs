//! Identifier table (ident-tab): a scoped symbol table mapping name →
//! (mode, displacement, kind), with O(1) push/pop of local scopes.
//!
//! The table itself is append-only and immortal, matching repr-tab and
//! mode-tab's lifecycle — what changes on scope exit is not the table but a
//! separate "current binding" overlay (one `HashMap` per active scope,
//! pushed and popped with the scope), per this front end's adopted redesign
//! of the reference compiler's "mutate repr-tab's current-binding pointer in
//! place" approach.

use std::collections::HashMap;

use loomc_core::{Mode, Repr};
use loomc_tree::Displacement;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct IdentIndex(u32);

impl IdentIndex {
    #[inline]
    pub fn as_u32(self) -> u32 {
        self.0
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum IdentKind {
    Variable,
    Parameter,
    Function,
    Label,
}

#[derive(Clone, Debug)]
pub struct IdentEntry {
    pub repr: Repr,
    pub mode: Mode,
    pub displacement: Displacement,
    pub kind: IdentKind,
    /// The ident-tab entry this one shadowed, if any — lets scope exit
    /// restore the pre-shadow binding in O(1) without rescanning history.
    pub prev_with_same_name: Option<IdentIndex>,
}

#[derive(Debug)]
pub struct RedeclarationError {
    pub existing: IdentIndex,
}

/// One active scope: the name-to-binding overlay entries it introduced, so
/// they can be un-shadowed on exit. Frame-allocation rewind is handled
/// separately by `FrameAllocator`, which the parser saves/restores a
/// cursor into around the same scope.
struct ScopeFrame {
    introduced: Vec<Repr>,
}

pub struct SymbolTable {
    entries: Vec<IdentEntry>,
    /// repr → current (innermost visible) binding.
    current_binding: HashMap<Repr, IdentIndex>,
    scopes: Vec<ScopeFrame>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            current_binding: HashMap::new(),
            scopes: vec![ScopeFrame { introduced: Vec::new() }],
        }
    }

    pub fn enter_scope(&mut self) {
        self.scopes.push(ScopeFrame { introduced: Vec::new() });
    }

    /// Pop the innermost scope, restoring every name it shadowed to its
    /// pre-scope binding (or removing it if it had none).
    pub fn leave_scope(&mut self) {
        let frame = self.scopes.pop().expect("leave_scope without matching enter_scope");
        for repr in frame.introduced {
            match self.entries[self.current_binding[&repr].as_u32() as usize].prev_with_same_name {
                Some(prev) => {
                    self.current_binding.insert(repr, prev);
                }
                None => {
                    self.current_binding.remove(&repr);
                }
            }
        }
    }

    /// Declare `repr` in the current scope. Fails if an entry with the same
    /// repr already exists in the *current* scope (shadowing an outer
    /// scope's binding of the same name is allowed and is the normal case).
    pub fn declare(
        &mut self,
        repr: Repr,
        mode: Mode,
        displacement: Displacement,
        kind: IdentKind,
    ) -> Result<IdentIndex, RedeclarationError> {
        let current_scope = self.scopes.last().expect("at least one scope always active");
        if current_scope.introduced.contains(&repr) {
            let existing = self.current_binding[&repr];
            return Err(RedeclarationError { existing });
        }

        let prev = self.current_binding.get(&repr).copied();
        let index = IdentIndex(self.entries.len() as u32);
        self.entries.push(IdentEntry { repr, mode, displacement, kind, prev_with_same_name: prev });
        self.current_binding.insert(repr, index);
        self.scopes.last_mut().unwrap().introduced.push(repr);
        Ok(index)
    }

    /// Resolve `repr` to its innermost visible binding.
    pub fn resolve(&self, repr: Repr) -> Option<IdentIndex> {
        self.current_binding.get(&repr).copied()
    }

    pub fn entry(&self, index: IdentIndex) -> &IdentEntry {
        &self.entries[index.as_u32() as usize]
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redeclaration_in_same_scope_is_rejected() {
        let mut table = SymbolTable::new();
        let x = Repr::from_raw(0);
        table.declare(x, Mode::Int, 0, IdentKind::Variable).unwrap();
        assert!(table.declare(x, Mode::Int, 1, IdentKind::Variable).is_err());
    }

    #[test]
    fn shadowing_in_a_nested_scope_is_allowed_and_restored_on_exit() {
        let mut table = SymbolTable::new();
        let x = Repr::from_raw(0);
        let outer = table.declare(x, Mode::Int, 0, IdentKind::Variable).unwrap();

        table.enter_scope();
        let inner = table.declare(x, Mode::Float, 1, IdentKind::Variable).unwrap();
        assert_eq!(table.resolve(x), Some(inner));
        table.leave_scope();

        assert_eq!(table.resolve(x), Some(outer));
    }

    #[test]
    fn undeclared_name_resolves_to_none() {
        let table = SymbolTable::new();
        assert_eq!(table.resolve(Repr::from_raw(5)), None);
    }

    #[test]
    fn scope_exit_removes_names_with_no_outer_binding() {
        let mut table = SymbolTable::new();
        let y = Repr::from_raw(1);
        table.enter_scope();
        table.declare(y, Mode::Int, 0, IdentKind::Variable).unwrap();
        table.leave_scope();
        assert_eq!(table.resolve(y), None);
    }
}
