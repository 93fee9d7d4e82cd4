//! Member lookup through base classes.
//!
//! Bases are searched depth-first in declaration order. A base that
//! declares the name itself stops the descent along that path; a base that
//! does not is searched through its own bases.
//!
//! Each finding is tagged with the base-class subobject it was found in.
//! A virtual edge starts a fresh, shared path, so a virtual base reached
//! along several routes is still one subobject, and is searched only once.

use cxx_ir::Name;
use rustc_hash::FxHashSet;
use smallvec::SmallVec;

use super::{Candidates, LookupMode};
use crate::error::{SymbolResult, SymbolTableError};
use crate::stack::ensure_sufficient_stack;
use crate::symbol::SymbolId;
use crate::type_info::{TypeFlags, TypeKind};
use crate::SymbolTable;

/// Identity of a base-class subobject within the most-derived class.
#[derive(Clone, Debug, PartialEq, Eq)]
struct Subobject {
    /// The path starts at a virtual base rather than the derived class.
    virtual_root: bool,
    path: SmallVec<[SymbolId; 4]>,
}

impl Subobject {
    fn root() -> Self {
        Subobject {
            virtual_root: false,
            path: SmallVec::new(),
        }
    }

    fn through(&self, base: SymbolId, is_virtual: bool) -> Self {
        if is_virtual {
            let mut path = SmallVec::new();
            path.push(base);
            Subobject {
                virtual_root: true,
                path,
            }
        } else {
            let mut next = self.clone();
            next.path.push(base);
            next
        }
    }
}

#[derive(Debug)]
struct Finding {
    decls: Candidates,
    subobject: Subobject,
}

/// State of one base-class search.
struct BaseWalk {
    name: Name,
    mode: LookupMode,
    /// Classes from the most-derived class down to the current one.
    path: SmallVec<[SymbolId; 8]>,
    searched_virtual: FxHashSet<SymbolId>,
    findings: Vec<Finding>,
}

impl SymbolTable {
    /// Declarations of `name` inherited by `class`, merged across
    /// subobjects.
    pub(crate) fn lookup_in_bases(
        &self,
        class: SymbolId,
        name: Name,
        mode: LookupMode,
    ) -> SymbolResult<Vec<SymbolId>> {
        let mut walk = BaseWalk {
            name,
            mode,
            path: SmallVec::new(),
            searched_virtual: FxHashSet::default(),
            findings: Vec::new(),
        };
        walk.path.push(class);
        self.collect_findings(class, &Subobject::root(), &mut walk)?;
        self.merge_findings(name, walk.findings)
    }

    fn collect_findings(
        &self,
        class: SymbolId,
        subobject: &Subobject,
        walk: &mut BaseWalk,
    ) -> SymbolResult<()> {
        ensure_sufficient_stack(|| {
            for edge in self.parents(class) {
                let base = self.resolve_alias(edge.base);
                if walk.path.contains(&base) {
                    tracing::debug!(%class, %base, "cycle in base classes");
                    return Err(SymbolTableError::CircularInheritance { symbol: base });
                }
                // dependent base (template parameter)
                if self.symbol(base).scope().is_none() {
                    continue;
                }
                // the same virtual subobject, already searched
                if edge.is_virtual && !walk.searched_virtual.insert(base) {
                    continue;
                }
                let here = subobject.through(base, edge.is_virtual);
                let decls = self.declared_in(base, walk.name, walk.mode);
                if decls.is_empty() {
                    walk.path.push(base);
                    let result = self.collect_findings(base, &here, walk);
                    walk.path.pop();
                    result?;
                } else {
                    walk.findings.push(Finding {
                        decls,
                        subobject: here,
                    });
                }
            }
            Ok(())
        })
    }

    fn merge_findings(&self, name: Name, findings: Vec<Finding>) -> SymbolResult<Vec<SymbolId>> {
        let Some(first) = findings.first() else {
            return Ok(Vec::new());
        };

        if findings.iter().all(|f| f.subobject == first.subobject) {
            let mut merged: Vec<SymbolId> = Vec::new();
            for id in findings.iter().flat_map(|f| f.decls.iter().copied()) {
                if !merged.contains(&id) {
                    merged.push(id);
                }
            }
            return Ok(merged);
        }

        let same_decls = findings.iter().all(|f| same_set(&f.decls, &first.decls));
        if same_decls && first.decls.iter().all(|id| self.is_shared_member(*id)) {
            return Ok(first.decls.to_vec());
        }

        let mut all: Vec<SymbolId> = Vec::new();
        for id in findings.iter().flat_map(|f| f.decls.iter().copied()) {
            if !all.contains(&id) {
                all.push(id);
            }
        }
        Err(self.ambiguous(name, all))
    }

    /// Members that exist once regardless of how many subobjects reach
    /// them: static members, enumerators, nested types.
    fn is_shared_member(&self, id: SymbolId) -> bool {
        let ty = &self.symbol(self.resolve_alias(id)).type_info;
        ty.flags.intersects(TypeFlags::STATIC | TypeFlags::TYPEDEF)
            || ty.kind == TypeKind::Enumerator
            || ty.kind.is_tag()
    }
}

fn same_set(a: &[SymbolId], b: &[SymbolId]) -> bool {
    a.len() == b.len() && a.iter().all(|id| b.contains(id))
}
