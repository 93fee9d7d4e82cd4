//! Name lookup.
//!
//! # Design
//!
//! Every lookup flavour shares one pipeline:
//!
//! 1. **Gather**: collect the declarations visible under a name, level by
//!    level (`scope_walk.rs` for the lexical chain and using-directives,
//!    `bases.rs` for base classes). The first level that yields anything
//!    hides every outer level.
//! 2. **Filter**: a [`LookupMode`] narrows candidates *before* the
//!    emptiness test, so `struct S` skips a variable named `S` and keeps
//!    walking outward.
//! 3. **Resolve**: `resolve.rs` deduplicates aliases, applies
//!    type/non-type hiding and decides between a single declaration, an
//!    overload set, or an ambiguity error.
//!
//! The public entry points differ only in the start of the walk, the mode,
//! and whether an overload set is an acceptable answer.

mod bases;
mod resolve;
mod scope_walk;

use cxx_ir::Name;
use smallvec::SmallVec;

use crate::error::{SymbolResult, SymbolTableError};
use crate::symbol::SymbolId;
use crate::type_info::TypeKind;
use crate::SymbolTable;

/// What a lookup is for; decides which declarations count as found.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum LookupMode {
    Ordinary,
    /// `class X`, `struct X`, `union X`, `enum X`.
    Elaborated(TypeKind),
    /// The `X` in `X::y`.
    NestedName,
    /// A call: the answer may be an overload set.
    Function,
}

pub(crate) type Candidates = SmallVec<[SymbolId; 4]>;

impl SymbolTable {
    /// Unqualified lookup of `name` as seen from `scope`.
    #[tracing::instrument(level = "trace", skip(self))]
    pub fn lookup(&self, scope: SymbolId, name: &str) -> SymbolResult<Option<SymbolId>> {
        let Some(name_id) = self.interner.get(name) else {
            return Ok(None);
        };
        let found = self.unqualified_set(scope, name_id, LookupMode::Ordinary)?;
        self.single(name_id, found)
    }

    /// Lookup of `name` as a member of `scope` (`scope::name`).
    #[tracing::instrument(level = "trace", skip(self))]
    pub fn qualified_lookup(&self, scope: SymbolId, name: &str) -> SymbolResult<Option<SymbolId>> {
        let Some(name_id) = self.interner.get(name) else {
            return Ok(None);
        };
        let found = self.qualified_set(scope, name_id, LookupMode::Ordinary)?;
        self.single(name_id, found)
    }

    /// Unqualified lookup that only sees declarations of the given tag kind.
    #[tracing::instrument(level = "trace", skip(self))]
    pub fn elaborated_lookup(
        &self,
        scope: SymbolId,
        kind: TypeKind,
        name: &str,
    ) -> SymbolResult<Option<SymbolId>> {
        let Some(name_id) = self.interner.get(name) else {
            return Ok(None);
        };
        let found = self.unqualified_set(scope, name_id, LookupMode::Elaborated(kind))?;
        self.single(name_id, found)
    }

    /// Look up the declaration an out-of-line definition refers to: direct
    /// members of `scope` only.
    pub fn lookup_member_for_definition(
        &self,
        scope: SymbolId,
        name: &str,
    ) -> SymbolResult<Option<SymbolId>> {
        let Some(name_id) = self.interner.get(name) else {
            return Ok(None);
        };
        let Some(data) = self.symbol(scope).scope() else {
            return Ok(None);
        };
        let found: Vec<SymbolId> = data.named(name_id).to_vec();
        let resolved = self.resolve_candidates(name_id, found, LookupMode::Ordinary)?;
        self.single(name_id, resolved)
    }

    /// Lookup of the qualifier in `name::...`: only namespaces, classes,
    /// enumerations and typedefs of classes are seen. A typedef is
    /// answered with the class it names.
    #[tracing::instrument(level = "trace", skip(self))]
    pub fn lookup_nested_name_specifier(
        &self,
        scope: SymbolId,
        name: &str,
    ) -> SymbolResult<Option<SymbolId>> {
        let Some(name_id) = self.interner.get(name) else {
            return Ok(None);
        };
        let found = self.unqualified_set(scope, name_id, LookupMode::NestedName)?;
        let Some(symbol) = self.single(name_id, found)? else {
            return Ok(None);
        };
        let symbol = self.resolve_alias(symbol);
        Ok(Some(self.typedef_target(symbol).unwrap_or(symbol)))
    }

    fn single(&self, name: Name, found: Vec<SymbolId>) -> SymbolResult<Option<SymbolId>> {
        match found.as_slice() {
            [] => Ok(None),
            [only] => Ok(Some(*only)),
            _ => Err(self.ambiguous(name, found)),
        }
    }

    pub(crate) fn ambiguous(
        &self,
        name: Name,
        candidates: impl IntoIterator<Item = SymbolId>,
    ) -> SymbolTableError {
        let candidates: Vec<SymbolId> = candidates.into_iter().collect();
        let name = self.interner.lookup(name).to_owned();
        tracing::debug!(%name, ?candidates, "ambiguous lookup");
        SymbolTableError::Ambiguous { name, candidates }
    }

    /// Whether `id` is visible under `mode` at all.
    pub(crate) fn accepts(&self, mode: LookupMode, id: SymbolId) -> bool {
        let target = self.resolve_alias(id);
        let kind = self.symbol(target).type_kind();
        match mode {
            LookupMode::Ordinary | LookupMode::Function => true,
            LookupMode::Elaborated(wanted) => match wanted {
                TypeKind::Class | TypeKind::Struct => {
                    matches!(kind, TypeKind::Class | TypeKind::Struct)
                }
                wanted => kind == wanted,
            },
            LookupMode::NestedName => self.is_qualifier(target),
        }
    }

    fn is_qualifier(&self, id: SymbolId) -> bool {
        let symbol = self.symbol(id);
        let container_kind = matches!(
            symbol.type_kind(),
            TypeKind::Namespace
                | TypeKind::Class
                | TypeKind::Struct
                | TypeKind::Union
                | TypeKind::Enumeration
        );
        (container_kind && symbol.scope().is_some())
            || symbol.instance_of.is_some()
            || self.typedef_target(id).is_some()
    }

    /// The class a typedef (or a `Type` symbol without storage) names.
    pub(crate) fn typedef_target(&self, id: SymbolId) -> Option<SymbolId> {
        let symbol = self.symbol(id);
        if symbol.scope().is_some() || symbol.type_kind() != TypeKind::Type {
            return None;
        }
        let flat = self.flatten_type(&symbol.type_info);
        if !flat.ptr_ops.is_empty() {
            return None;
        }
        let target = self.resolve_alias(flat.type_symbol?);
        self.symbol(target).is_class_like().then_some(target)
    }

    /// Declarations of `name` directly in `scope` accepted by `mode`.
    pub(crate) fn declared_in(&self, scope: SymbolId, name: Name, mode: LookupMode) -> Candidates {
        self.symbol(scope)
            .scope()
            .map(|data| {
                data.named(name)
                    .iter()
                    .copied()
                    .filter(|id| self.accepts(mode, *id))
                    .collect()
            })
            .unwrap_or_default()
    }
}
