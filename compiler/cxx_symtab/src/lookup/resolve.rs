//! Turning a raw candidate list into a lookup answer.

use cxx_ir::Name;
use rustc_hash::FxHashSet;
use smallvec::SmallVec;

use super::LookupMode;
use crate::error::SymbolResult;
use crate::symbol::SymbolId;
use crate::SymbolTable;

impl SymbolTable {
    /// Deduplicate, apply type/non-type hiding, and reject ambiguities.
    ///
    /// The result is empty, a single declaration, or (only when every
    /// candidate is a function) an overload set. In [`LookupMode::Function`]
    /// the result keeps only functions.
    pub(crate) fn resolve_candidates(
        &self,
        name: Name,
        found: Vec<SymbolId>,
        mode: LookupMode,
    ) -> SymbolResult<Vec<SymbolId>> {
        // Aliases and repeated finds of one entity count once; the first
        // id seen (possibly the alias) represents it.
        let mut seen: FxHashSet<SymbolId> = FxHashSet::default();
        let unique: SmallVec<[SymbolId; 4]> = found
            .into_iter()
            .filter(|id| seen.insert(self.resolve_alias(*id)))
            .collect();

        let (types, non_types): (SmallVec<[SymbolId; 4]>, SmallVec<[SymbolId; 4]>) = unique
            .iter()
            .copied()
            .partition(|id| self.symbol(self.resolve_alias(*id)).type_kind().is_tag());

        let mut resolved: Vec<SymbolId> = if non_types.is_empty() {
            match types.as_slice() {
                [] => return Ok(Vec::new()),
                [only] => vec![*only],
                _ => return Err(self.ambiguous(name, types)),
            }
        } else {
            // A non-type hides a type only when both come from one scope.
            let hiding: SmallVec<[Option<SymbolId>; 4]> = non_types
                .iter()
                .map(|id| self.entity_container(*id))
                .collect();
            let visible_type = types
                .iter()
                .any(|id| !hiding.contains(&self.entity_container(*id)));
            if visible_type {
                return Err(self.ambiguous(name, unique));
            }
            let all_functions = non_types
                .iter()
                .all(|id| self.symbol(self.resolve_alias(*id)).is_function());
            if non_types.len() > 1 && !all_functions {
                return Err(self.ambiguous(name, non_types));
            }
            non_types.into_vec()
        };

        if mode == LookupMode::Function {
            resolved.retain(|id| self.symbol(self.resolve_alias(*id)).is_function());
        }
        Ok(resolved)
    }

    /// Container of the declaration an id names (the alias's own scope is
    /// not what decides hiding).
    fn entity_container(&self, id: SymbolId) -> Option<SymbolId> {
        self.container_of(self.resolve_alias(id))
    }
}
