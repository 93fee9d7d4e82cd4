//! Argument-dependent lookup.
//!
//! The associated classes of a call are the class types of its arguments
//! (through pointers and references) and all of their bases. Functions
//! declared directly in the namespaces enclosing those classes join the
//! candidate set; using-directives in those namespaces are ignored.

use cxx_ir::Name;
use smallvec::SmallVec;

use crate::lookup::LookupMode;
use crate::symbol::SymbolId;
use crate::type_info::{TypeInfo, TypeKind};
use crate::SymbolTable;

impl SymbolTable {
    pub(crate) fn argument_dependent_candidates(
        &self,
        name: Name,
        args: &[TypeInfo],
    ) -> Vec<SymbolId> {
        let mut classes: SmallVec<[SymbolId; 8]> = SmallVec::new();
        for arg in args {
            let Some(class) = self.class_of(arg) else {
                continue;
            };
            if !classes.contains(&class) {
                classes.push(class);
            }
            self.for_each_base(class, &mut |base| {
                if !classes.contains(&base) && self.symbol(base).is_class_like() {
                    classes.push(base);
                }
            });
        }

        let mut namespaces: SmallVec<[SymbolId; 4]> = SmallVec::new();
        for class in classes {
            if let Some(namespace) = self.enclosing_namespace(class) {
                if !namespaces.contains(&namespace) {
                    namespaces.push(namespace);
                }
            }
        }
        tracing::trace!(?namespaces, "associated namespaces");

        namespaces
            .into_iter()
            .flat_map(|namespace| self.declared_in(namespace, name, LookupMode::Function))
            .filter(|id| self.symbol(self.resolve_alias(*id)).is_function())
            .collect()
    }

    fn enclosing_namespace(&self, id: SymbolId) -> Option<SymbolId> {
        self.ancestors(id)
            .skip(1)
            .find(|ancestor| self.symbol(*ancestor).type_kind() == TypeKind::Namespace)
    }
}
