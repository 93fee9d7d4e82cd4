//! Function lookup and overload resolution.
//!
//! # Design
//!
//! A call is resolved in three steps:
//!
//! 1. **Candidates**: ordinary lookup that keeps whole overload sets,
//!    extended (in C++, when argument types are known) by
//!    argument-dependent lookup unless the ordinary lookup found a class
//!    member.
//! 2. **Viability**: no more arguments than parameters, and every
//!    parameter beyond the arguments has a default.
//! 3. **Best viable function**: each viable candidate gets one
//!    [`ConversionRank`] per argument. A candidate wins if it is no worse
//!    than every other candidate on every argument and strictly better on
//!    at least one. No unique winner, or a winner whose conversion is
//!    itself ambiguous, is an ambiguity error.
//!
//! Passing `None` for the arguments models a bare reference to the name
//! (taking its address, say): a single candidate, or several with
//! identical signatures, is returned as is.

mod adl;
mod conversion;

pub use conversion::{ConversionRank, ImplicitConversion};

use cxx_ir::Name;
use smallvec::SmallVec;

use crate::error::SymbolResult;
use crate::lookup::LookupMode;
use crate::symbol::SymbolId;
use crate::type_info::TypeInfo;
use crate::SymbolTable;

struct Viable {
    function: SymbolId,
    conversions: SmallVec<[ImplicitConversion; 4]>,
}

impl Viable {
    /// Never worse, and better on at least one argument.
    fn beats(&self, other: &Viable) -> bool {
        let mut strictly = false;
        for (mine, theirs) in self.conversions.iter().zip(&other.conversions) {
            if mine.rank > theirs.rank {
                return false;
            }
            strictly |= mine.rank < theirs.rank;
        }
        strictly
    }
}

impl SymbolTable {
    /// Resolve a call `name(args...)` made from `scope`.
    #[tracing::instrument(level = "debug", skip(self, args), fields(argc = args.map_or(0, |a| a.len())))]
    pub fn unqualified_function_lookup(
        &self,
        scope: SymbolId,
        name: &str,
        args: Option<&[TypeInfo]>,
    ) -> SymbolResult<Option<SymbolId>> {
        let Some(name_id) = self.interner.get(name) else {
            return Ok(None);
        };
        let mut candidates = self.unqualified_set(scope, name_id, LookupMode::Function)?;

        let found_member = candidates.iter().any(|id| {
            self.entity_scope(*id)
                .is_some_and(|container| self.symbol(container).is_class_like())
        });
        if let Some(args) = args {
            if self.options.is_cpp() && !found_member {
                let flat: Vec<TypeInfo> = args.iter().map(|a| self.flatten_type(a)).collect();
                for extra in self.argument_dependent_candidates(name_id, &flat) {
                    let entity = self.resolve_alias(extra);
                    if !candidates.iter().any(|c| self.resolve_alias(*c) == entity) {
                        candidates.push(extra);
                    }
                }
            }
        }
        self.resolve_overloads(name_id, candidates, args)
    }

    /// Resolve a member call `object.name(args...)` on `class`.
    #[tracing::instrument(level = "debug", skip(self, args), fields(argc = args.map_or(0, |a| a.len())))]
    pub fn member_function_lookup(
        &self,
        class: SymbolId,
        name: &str,
        args: Option<&[TypeInfo]>,
    ) -> SymbolResult<Option<SymbolId>> {
        let Some(name_id) = self.interner.get(name) else {
            return Ok(None);
        };
        let candidates = self.qualified_set(class, name_id, LookupMode::Function)?;
        self.resolve_overloads(name_id, candidates, args)
    }

    fn entity_scope(&self, id: SymbolId) -> Option<SymbolId> {
        self.container_of(self.resolve_alias(id))
    }

    fn resolve_overloads(
        &self,
        name: Name,
        candidates: Vec<SymbolId>,
        args: Option<&[TypeInfo]>,
    ) -> SymbolResult<Option<SymbolId>> {
        let Some(&first) = candidates.first() else {
            return Ok(None);
        };
        let args: &[TypeInfo] = match args {
            Some(args) => args,
            None => {
                let same = candidates[1..]
                    .iter()
                    .all(|other| self.has_same_parameters(first, *other));
                if same {
                    return Ok(Some(first));
                }
                &[]
            }
        };

        let flat: SmallVec<[TypeInfo; 4]> = args.iter().map(|a| self.flatten_type(a)).collect();
        let viable: Vec<Viable> = candidates
            .iter()
            .filter_map(|&function| self.viable(function, &flat))
            .collect();

        if viable.is_empty() {
            tracing::debug!(candidates = candidates.len(), "no viable function");
            return Ok(None);
        }
        let mut best = 0;
        for (index, candidate) in viable.iter().enumerate().skip(1) {
            if candidate.beats(&viable[best]) {
                best = index;
            }
        }
        let winner = &viable[best];

        let rivals: SmallVec<[SymbolId; 4]> = viable
            .iter()
            .enumerate()
            .filter(|(index, other)| *index != best && !winner.beats(other))
            .map(|(_, other)| other.function)
            .collect();
        if !rivals.is_empty() {
            return Err(self.ambiguous(name, std::iter::once(winner.function).chain(rivals)));
        }
        if winner.conversions.iter().any(|c| c.ambiguous) {
            return Err(self.ambiguous(name, [winner.function]));
        }
        Ok(Some(winner.function))
    }

    fn viable(&self, function: SymbolId, args: &[TypeInfo]) -> Option<Viable> {
        let data = self.symbol(self.resolve_alias(function)).callable()?;
        let params = data.effective_parameters();
        if args.len() > params.len() || params[args.len()..].iter().any(|p| !p.has_default) {
            return None;
        }
        let conversions = args
            .iter()
            .zip(params)
            .map(|(arg, param)| self.implicit_conversion(arg, &self.flatten_type(&param.ty)))
            .collect::<Option<SmallVec<_>>>()?;
        Some(Viable {
            function,
            conversions,
        })
    }
}
