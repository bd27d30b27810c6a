//! The symbol table: a shadowing, append-only directory of names.
//!
//! Entries are never removed or overwritten. [`SymbolTable::install`] always
//! appends a new entry, and [`SymbolTable::lookup`] scans from the newest
//! entry backwards, so a later installation of a name hides every earlier one
//! from lookup. Handles ([`SymbolId`]) taken before the newer installation keep
//! pointing at the entry they were issued for.

use crate::error::SymbolError;
use std::fmt;

/// Stable handle to a symbol table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(usize);

impl SymbolId {
    /// Wrap a raw table index.
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    /// The raw table index.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A named unary numeric function, as installed for a built-in.
#[derive(Clone, Copy)]
pub struct BuiltinFn {
    name: &'static str,
    func: fn(f64) -> f64,
}

impl BuiltinFn {
    pub const fn new(name: &'static str, func: fn(f64) -> f64) -> Self {
        Self { name, func }
    }

    /// The name the function was registered under.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Apply the function.
    pub fn call(&self, x: f64) -> f64 {
        (self.func)(x)
    }
}

impl fmt::Debug for BuiltinFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BuiltinFn({})", self.name)
    }
}

// Function pointer identity plus name; two registrations of the same
// function under different names are different built-ins.
impl PartialEq for BuiltinFn {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.func as usize == other.func as usize
    }
}

/// What kind of entry a symbol is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    /// A variable or named constant holding a number.
    Variable,
    /// A built-in unary function.
    Builtin,
    /// A name that has been referenced but never assigned.
    Undefined,
}

impl SymbolKind {
    pub fn name(&self) -> &'static str {
        match self {
            SymbolKind::Variable => "variable",
            SymbolKind::Builtin => "builtin",
            SymbolKind::Undefined => "undefined",
        }
    }
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Kind and payload of a symbol, installed together.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Binding {
    /// Referenced, not yet assigned.
    Undefined,
    /// Holds a number.
    Variable(f64),
    /// A built-in function. Immutable once installed.
    Builtin(BuiltinFn),
}

impl Binding {
    pub fn kind(&self) -> SymbolKind {
        match self {
            Binding::Undefined => SymbolKind::Undefined,
            Binding::Variable(_) => SymbolKind::Variable,
            Binding::Builtin(_) => SymbolKind::Builtin,
        }
    }
}

/// A symbol table entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    name: String,
    binding: Binding,
}

impl Symbol {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> SymbolKind {
        self.binding.kind()
    }

    pub fn binding(&self) -> &Binding {
        &self.binding
    }

    /// The stored number, if this is a variable.
    pub fn value(&self) -> Option<f64> {
        match self.binding {
            Binding::Variable(v) => Some(v),
            _ => None,
        }
    }

    /// The function, if this is a built-in.
    pub fn builtin(&self) -> Option<BuiltinFn> {
        match self.binding {
            Binding::Builtin(f) => Some(f),
            _ => None,
        }
    }

    /// Store `value`, promoting an undefined symbol to a variable.
    ///
    /// Built-ins are immutable and reject the assignment.
    pub fn assign(&mut self, value: f64) -> Result<(), SymbolError> {
        match self.binding {
            Binding::Variable(_) | Binding::Undefined => {
                self.binding = Binding::Variable(value);
                Ok(())
            }
            Binding::Builtin(_) => Err(SymbolError::NotAVariable {
                name: self.name.clone(),
            }),
        }
    }
}

/// Append-only symbol arena with most-recent-wins lookup.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    entries: Vec<Symbol>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a new entry as the newest one, even if `name` already exists.
    pub fn install(&mut self, name: &str, binding: Binding) -> Result<SymbolId, SymbolError> {
        self.entries
            .try_reserve(1)
            .map_err(|_| SymbolError::OutOfMemory)?;
        let mut owned = String::new();
        owned
            .try_reserve_exact(name.len())
            .map_err(|_| SymbolError::OutOfMemory)?;
        owned.push_str(name);

        let id = SymbolId(self.entries.len());
        self.entries.push(Symbol {
            name: owned,
            binding,
        });
        Ok(id)
    }

    /// Find the most recently installed entry named `name`.
    pub fn lookup(&self, name: &str) -> Option<SymbolId> {
        self.entries
            .iter()
            .rposition(|sym| sym.name == name)
            .map(SymbolId)
    }

    pub fn get(&self, id: SymbolId) -> Option<&Symbol> {
        self.entries.get(id.0)
    }

    pub fn get_mut(&mut self, id: SymbolId) -> Option<&mut Symbol> {
        self.entries.get_mut(id.0)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries newest first, the order lookup sees them in.
    pub fn iter(&self) -> impl Iterator<Item = (SymbolId, &Symbol)> {
        self.entries
            .iter()
            .enumerate()
            .rev()
            .map(|(i, sym)| (SymbolId(i), sym))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn double(x: f64) -> f64 {
        x * 2.0
    }

    #[test]
    fn lookup_missing_is_none() {
        let table = SymbolTable::new();
        assert_eq!(table.lookup("x"), None);
        assert!(table.is_empty());
    }

    #[test]
    fn install_then_lookup() {
        let mut table = SymbolTable::new();
        let id = table.install("x", Binding::Variable(1.5)).unwrap();
        assert_eq!(table.lookup("x"), Some(id));
        assert_eq!(table.get(id).unwrap().value(), Some(1.5));
        assert_eq!(table.get(id).unwrap().kind(), SymbolKind::Variable);
    }

    #[test]
    fn newer_install_shadows_older() {
        let mut table = SymbolTable::new();
        let old = table.install("x", Binding::Variable(1.0)).unwrap();
        let new = table.install("x", Binding::Variable(2.0)).unwrap();
        assert_ne!(old, new);
        assert_eq!(table.lookup("x"), Some(new));
        // The older entry is still reachable through its handle.
        assert_eq!(table.get(old).unwrap().value(), Some(1.0));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn shadowing_is_per_name() {
        let mut table = SymbolTable::new();
        let a = table.install("a", Binding::Variable(1.0)).unwrap();
        table.install("b", Binding::Variable(2.0)).unwrap();
        assert_eq!(table.lookup("a"), Some(a));
    }

    #[test]
    fn assign_promotes_undefined() {
        let mut table = SymbolTable::new();
        let id = table.install("y", Binding::Undefined).unwrap();
        let sym = table.get_mut(id).unwrap();
        assert_eq!(sym.kind(), SymbolKind::Undefined);
        assert_eq!(sym.value(), None);
        sym.assign(4.0).unwrap();
        assert_eq!(sym.kind(), SymbolKind::Variable);
        assert_eq!(sym.value(), Some(4.0));
    }

    #[test]
    fn assign_to_builtin_rejected() {
        let mut table = SymbolTable::new();
        let id = table
            .install("double", Binding::Builtin(BuiltinFn::new("double", double)))
            .unwrap();
        let sym = table.get_mut(id).unwrap();
        assert_eq!(
            sym.assign(1.0),
            Err(SymbolError::NotAVariable {
                name: "double".to_string()
            })
        );
        assert_eq!(sym.kind(), SymbolKind::Builtin);
        assert_eq!(sym.builtin().unwrap().call(3.0), 6.0);
    }

    #[test]
    fn iter_is_newest_first() {
        let mut table = SymbolTable::new();
        table.install("a", Binding::Undefined).unwrap();
        table.install("b", Binding::Undefined).unwrap();
        let names: Vec<&str> = table.iter().map(|(_, s)| s.name()).collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn builtin_fn_identity() {
        let f = BuiltinFn::new("double", double);
        assert_eq!(f, BuiltinFn::new("double", double));
        assert_ne!(f, BuiltinFn::new("twice", double));
        assert_eq!(format!("{f:?}"), "BuiltinFn(double)");
    }

    #[test]
    fn kind_display() {
        assert_eq!(SymbolKind::Undefined.to_string(), "undefined");
        assert_eq!(SymbolKind::Builtin.to_string(), "builtin");
    }
}
