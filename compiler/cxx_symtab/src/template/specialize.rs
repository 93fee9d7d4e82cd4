//! Choosing a specialization for a normalized argument list.
//!
//! A pattern entry that names one of the specialization's own parameters
//! matches any argument whose indirection chain ends with the entry's
//! chain (`T*` matches `int**` with `T = int*`); every use of a parameter
//! must bind it to the same type. Any other entry must equal the argument
//! structurally, constant value included.
//!
//! Partial ordering between specializations is not attempted: more than
//! one match is an ambiguity.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::error::SymbolResult;
use crate::symbol::SymbolId;
use crate::type_info::{TypeFlags, TypeInfo};
use crate::SymbolTable;

type Bindings = FxHashMap<SymbolId, TypeInfo>;

impl SymbolTable {
    /// The unique specialization of `template` matching `args`, with the
    /// deduced arguments for its own parameters.
    pub(super) fn select_specialization(
        &self,
        template: SymbolId,
        args: &[TypeInfo],
    ) -> SymbolResult<Option<(SymbolId, Vec<TypeInfo>)>> {
        let mut matches: SmallVec<[(SymbolId, Vec<TypeInfo>); 2]> = SmallVec::new();
        for &specialization in self.specializations(template) {
            if let Some(bound) = self.match_specialization(specialization, args) {
                matches.push((specialization, bound));
            }
        }
        match matches.len() {
            0 => Ok(None),
            1 => Ok(matches.pop()),
            _ => Err(self.ambiguous(
                self.symbol(template).name,
                matches.iter().map(|(specialization, _)| *specialization),
            )),
        }
    }

    fn match_specialization(
        &self,
        specialization: SymbolId,
        args: &[TypeInfo],
    ) -> Option<Vec<TypeInfo>> {
        let data = &self.symbol(specialization).callable()?.template;
        if data.pattern.len() != args.len() {
            return None;
        }
        let mut bindings = Bindings::default();
        for (pattern, arg) in data.pattern.iter().zip(args) {
            if !self.match_pattern(pattern, arg, &data.params, &mut bindings) {
                return None;
            }
        }
        data.params
            .iter()
            .map(|param| bindings.get(param).cloned())
            .collect()
    }

    fn match_pattern(
        &self,
        pattern: &TypeInfo,
        arg: &TypeInfo,
        params: &[SymbolId],
        bindings: &mut Bindings,
    ) -> bool {
        let Some(param) = pattern.type_symbol.filter(|symbol| params.contains(symbol)) else {
            return self.normalize_argument(pattern) == *arg;
        };

        let depth = pattern.ptr_ops.len();
        let Some(split) = arg.ptr_ops.len().checked_sub(depth) else {
            return false;
        };
        if arg.ptr_ops[split..] != pattern.ptr_ops[..] {
            return false;
        }
        let required_cv = pattern.flags & TypeFlags::CV;
        if !arg.flags.contains(required_cv) {
            return false;
        }

        let mut bound = arg.clone();
        bound.ptr_ops.truncate(split);
        bound.flags -= required_cv;
        match bindings.get(&param) {
            Some(previous) => *previous == bound,
            None => {
                bindings.insert(param, bound);
                true
            }
        }
    }
}
