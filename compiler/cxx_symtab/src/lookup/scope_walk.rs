//! Lexical scope chains and using-directive visibility.
//!
//! A namespace nominated by a using-directive in scope `S` behaves, for
//! unqualified lookup, as if its members were declared in the nearest
//! scope that encloses both `S` and the namespace. Directives inside a
//! nominated namespace are followed transitively and treated as if they
//! were written in `S`. Each namespace is expanded at most once per lookup,
//! so directive cycles terminate.

use std::collections::VecDeque;

use cxx_ir::Name;
use rustc_hash::FxHashSet;
use smallvec::SmallVec;

use super::LookupMode;
use crate::error::SymbolResult;
use crate::symbol::SymbolId;
use crate::SymbolTable;

type Chain = SmallVec<[SymbolId; 8]>;

impl SymbolTable {
    /// All declarations of `name` visible from `start`, resolved.
    pub(crate) fn unqualified_set(
        &self,
        start: SymbolId,
        name: Name,
        mode: LookupMode,
    ) -> SymbolResult<Vec<SymbolId>> {
        let chain: Chain = self.ancestors(start).collect();
        let nominated = self.directives_by_level(&chain);

        for (level, &scope) in chain.iter().enumerate() {
            let mut found: Vec<SymbolId> = self.declared_in(scope, name, mode).into_vec();
            for &namespace in &nominated[level] {
                found.extend(self.declared_in(namespace, name, mode));
            }
            if found.is_empty() && self.symbol(scope).class().is_some() {
                found = self.lookup_in_bases(scope, name, mode)?;
            }
            if !found.is_empty() {
                tracing::trace!(level, %scope, count = found.len(), "found");
                return self.resolve_candidates(name, found, mode);
            }
        }
        Ok(Vec::new())
    }

    /// For each chain level, the namespaces whose members become visible
    /// there through using-directives.
    fn directives_by_level(&self, chain: &[SymbolId]) -> Vec<SmallVec<[SymbolId; 2]>> {
        let mut levels = vec![SmallVec::new(); chain.len()];
        if !self.options.is_cpp() {
            return levels;
        }
        let mut visited: FxHashSet<SymbolId> = FxHashSet::default();
        let mut pending: VecDeque<(usize, SymbolId)> = VecDeque::new();

        for (origin, &scope) in chain.iter().enumerate() {
            pending.extend(
                self.using_directives(scope)
                    .iter()
                    .map(|namespace| (origin, *namespace)),
            );
            while let Some((origin, namespace)) = pending.pop_front() {
                if !visited.insert(namespace) {
                    continue;
                }
                let level = (origin..chain.len())
                    .find(|&level| self.encloses(chain[level], namespace))
                    .unwrap_or(chain.len() - 1);
                levels[level].push(namespace);
                pending.extend(
                    self.using_directives(namespace)
                        .iter()
                        .map(|next| (origin, *next)),
                );
            }
        }
        levels
    }

    /// Whether `inner` is `outer` or nested (transitively) inside it.
    pub(crate) fn encloses(&self, outer: SymbolId, inner: SymbolId) -> bool {
        self.ancestors(inner).any(|ancestor| ancestor == outer)
    }

    /// Declarations of `name` that are members of `scope`, resolved.
    ///
    /// Searches the scope itself, then its bases, then the namespaces its
    /// using-directives nominate (breadth-first; a namespace that declares
    /// the name is not expanded further).
    pub(crate) fn qualified_set(
        &self,
        scope: SymbolId,
        name: Name,
        mode: LookupMode,
    ) -> SymbolResult<Vec<SymbolId>> {
        if self.symbol(scope).scope().is_none() {
            return Ok(Vec::new());
        }
        let mut found: Vec<SymbolId> = self.declared_in(scope, name, mode).into_vec();
        if found.is_empty() && self.symbol(scope).class().is_some() {
            found = self.lookup_in_bases(scope, name, mode)?;
        }
        if found.is_empty() && self.options.is_cpp() {
            found = self.nominated_members(scope, name, mode);
        }
        self.resolve_candidates(name, found, mode)
    }

    fn nominated_members(&self, scope: SymbolId, name: Name, mode: LookupMode) -> Vec<SymbolId> {
        let mut visited: FxHashSet<SymbolId> = FxHashSet::default();
        visited.insert(scope);
        let mut pending: VecDeque<SymbolId> =
            self.using_directives(scope).iter().copied().collect();
        let mut found = Vec::new();

        while let Some(namespace) = pending.pop_front() {
            if !visited.insert(namespace) {
                continue;
            }
            let declared = self.declared_in(namespace, name, mode);
            if declared.is_empty() {
                pending.extend(self.using_directives(namespace));
            } else {
                found.extend(declared);
            }
        }
        found
    }
}
