//! Deep cloning of a template body with parameters replaced.
//!
//! Cloning runs in two passes. The first allocates a copy of every symbol
//! in the body and records the original-to-copy map; the second rewrites
//! every id held by a copy (type references, parameters, base edges,
//! directives, alias targets) through that map and the parameter bindings.
//! Two passes let members refer to siblings declared after them.

use rustc_hash::FxHashMap;

use crate::error::{InvalidUse, SymbolResult};
use crate::stack::ensure_sufficient_stack;
use crate::symbol::{SymbolId, SymbolKind};
use crate::type_info::{DefaultArg, TypeInfo};
use crate::SymbolTable;

#[derive(Debug, Default)]
pub(crate) struct Substitution {
    args: FxHashMap<SymbolId, TypeInfo>,
    clones: FxHashMap<SymbolId, SymbolId>,
    order: Vec<(SymbolId, SymbolId)>,
}

impl Substitution {
    pub(crate) fn new(params: &[SymbolId], args: &[TypeInfo]) -> Self {
        Substitution {
            args: params.iter().copied().zip(args.iter().cloned()).collect(),
            ..Substitution::default()
        }
    }

    fn remap(&self, id: SymbolId) -> SymbolId {
        self.clones.get(&id).copied().unwrap_or(id)
    }

    /// `ty` with parameter references replaced by their arguments and
    /// references into the cloned body redirected to the copies.
    ///
    /// A parameter used with extra operators (`T*` with `T = int*`) keeps
    /// both: the argument's operators come first.
    pub(crate) fn apply(&self, ty: &TypeInfo) -> TypeInfo {
        let mut out = ty.clone();
        if let Some(symbol) = ty.type_symbol {
            if let Some(arg) = self.args.get(&symbol) {
                out.kind = arg.kind;
                out.type_symbol = arg.type_symbol;
                out.flags = arg.flags | ty.flags;
                out.ptr_ops = arg.ptr_ops.iter().chain(&ty.ptr_ops).copied().collect();
                out.value = arg.value.or(ty.value);
            } else {
                out.type_symbol = Some(self.remap(symbol));
            }
        }
        if let Some(DefaultArg::Type(inner)) = &ty.default {
            out.default = Some(DefaultArg::Type(Box::new(self.apply(inner))));
        }
        out
    }
}

impl SymbolTable {
    /// Clone `body` into a new symbol owned by `owner`.
    ///
    /// On failure every symbol allocated here is discarded again.
    pub(super) fn clone_body(
        &mut self,
        owner: SymbolId,
        body: SymbolId,
        substitution: &mut Substitution,
    ) -> SymbolResult<SymbolId> {
        let checkpoint = self.symbols.len();
        let root = self.clone_subtree(body, owner, substitution);
        if let Err(err) = self.rewrite_clones(substitution) {
            tracing::debug!(%body, "instantiation failed, discarding clones");
            self.symbols.truncate(checkpoint);
            return Err(err);
        }
        Ok(root)
    }

    fn clone_subtree(
        &mut self,
        original: SymbolId,
        container: SymbolId,
        substitution: &mut Substitution,
    ) -> SymbolId {
        ensure_sufficient_stack(|| {
            let mut copy = self.symbol(original).clone();
            let members = copy
                .scope()
                .map(|scope| scope.members().to_vec())
                .unwrap_or_default();
            if let Some(scope) = copy.scope_mut() {
                *scope = scope.without_members();
            }
            copy.container = Some(container);
            copy.origin = Some(original);
            copy.instance_of = None;

            let id = self.alloc(copy);
            substitution.clones.insert(original, id);
            substitution.order.push((original, id));

            for member in members {
                let name = self.symbol(member).name;
                let cloned = self.clone_subtree(member, id, substitution);
                if let Some(scope) = self.symbol_mut(id).scope_mut() {
                    scope.insert(name, cloned);
                }
            }
            id
        })
    }

    fn rewrite_clones(&mut self, substitution: &Substitution) -> SymbolResult<()> {
        for &(_, copy) in &substitution.order {
            let mut symbol = self.symbol(copy).clone();
            symbol.type_info = substitution.apply(&symbol.type_info);

            match &mut symbol.kind {
                SymbolKind::Inheritable(class) => {
                    for edge in &mut class.parents {
                        edge.base = self.substitute_base(edge.base, substitution)?;
                    }
                }
                SymbolKind::Callable(callable) => {
                    for param in &mut callable.parameters {
                        param.ty = substitution.apply(&param.ty);
                    }
                    if let Some(result) = &callable.return_type {
                        callable.return_type = Some(substitution.apply(result));
                    }
                    for param in &mut callable.template.params {
                        *param = substitution.remap(*param);
                    }
                }
                SymbolKind::UsingDeclaration { target } => *target = substitution.remap(*target),
                SymbolKind::Plain | SymbolKind::Scope(_) => {}
            }
            if let Some(scope) = symbol.scope_mut() {
                for namespace in &mut scope.using_directives {
                    *namespace = substitution.remap(*namespace);
                }
                for enumerator in &mut scope.enumerators {
                    *enumerator = substitution.remap(*enumerator);
                }
            }
            self.symbols[copy.index()] = symbol;
        }
        Ok(())
    }

    /// A base edge naming a template parameter becomes the argument's class.
    fn substitute_base(&self, base: SymbolId, substitution: &Substitution) -> SymbolResult<SymbolId> {
        let Some(arg) = substitution.args.get(&base) else {
            return Ok(substitution.remap(base));
        };
        arg.ptr_ops
            .is_empty()
            .then(|| self.class_of(arg))
            .flatten()
            .ok_or_else(|| InvalidUse::TemplateArgumentNotAClass { param: base }.into())
    }
}
