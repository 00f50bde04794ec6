//! Symbol table mapping function names to stable identifiers.
//!
//! Names are case-insensitive. Each identifier keeps an alias set: when a
//! function is renamed mid-pass, the old name can stay live as an alias so
//! lookups performed before the rename keep resolving, while a full
//! [`SymbolTable::restore`] (done at the start of each evaluation pass)
//! prunes everything back to the canonical names.
//!
//! Bound expressions refer to functions by [`FunctionId`], never by name,
//! so later renames do not break references that were bound earlier.

use std::collections::{HashMap, HashSet};

use uuid::Uuid;

// ---------------------------------------------------------------------------
// Function identifier
// ---------------------------------------------------------------------------

/// A stable, unique identifier for a function in a document.
///
/// Survives renames: the symbol table maps names to ids, and everything
/// downstream of the binder uses the id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FunctionId(Uuid);

impl FunctionId {
    /// Create a fresh identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for FunctionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for FunctionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Symbol table
// ---------------------------------------------------------------------------

/// Bidirectional name ↔ id mapping with per-id alias sets.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    /// Folded (lowercased) name → id.
    name_to_id: HashMap<String, FunctionId>,
    /// Id → folded names currently or previously claiming it.
    aliases: HashMap<FunctionId, HashSet<String>>,
}

/// Case-insensitive key folding.
fn fold(name: &str) -> String {
    name.to_ascii_lowercase()
}

impl SymbolTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the table from the document's function list, discarding all
    /// alias history. Every function with a non-blank name ends up with
    /// exactly one active alias.
    pub fn restore<'a>(&mut self, functions: impl IntoIterator<Item = (&'a str, FunctionId)>) {
        self.name_to_id.clear();
        self.aliases.clear();
        for (name, id) in functions {
            if !name.trim().is_empty() {
                self.set_name(name, id, false);
            }
        }
    }

    /// Look up the id currently claiming `name`.
    #[must_use]
    pub fn get_id(&self, name: &str) -> Option<FunctionId> {
        self.name_to_id.get(&fold(name)).copied()
    }

    /// Claim `name` for `id`.
    ///
    /// Any identifier previously claiming the name loses it (no two
    /// distinct ids may hold the same active name). With
    /// `keep_old_aliases`, the id's previous names stay resolvable for the
    /// rest of the pass; without it they are pruned — but only mappings
    /// that still point at `id`, so other identifiers' names are never
    /// disturbed.
    pub fn set_name(&mut self, name: &str, id: FunctionId, keep_old_aliases: bool) {
        let folded = fold(name);
        let alias_set = self.aliases.entry(id).or_default();
        alias_set.insert(folded.clone());
        self.name_to_id.insert(folded.clone(), id);

        if !keep_old_aliases {
            let stale: Vec<String> = alias_set
                .iter()
                .filter(|alias| **alias != folded)
                .cloned()
                .collect();
            for alias in stale {
                if self.name_to_id.get(&alias) == Some(&id) {
                    self.name_to_id.remove(&alias);
                }
                if let Some(set) = self.aliases.get_mut(&id) {
                    set.remove(&alias);
                }
            }
        }
    }

    /// Remove an identifier and all names it still holds.
    pub fn remove(&mut self, id: FunctionId) {
        if let Some(alias_set) = self.aliases.remove(&id) {
            for alias in alias_set {
                if self.name_to_id.get(&alias) == Some(&id) {
                    self.name_to_id.remove(&alias);
                }
            }
        }
    }

    /// The alias set currently recorded for `id`.
    #[must_use]
    pub fn aliases(&self, id: FunctionId) -> Option<&HashSet<String>> {
        self.aliases.get(&id)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
