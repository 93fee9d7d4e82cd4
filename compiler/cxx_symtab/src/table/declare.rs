//! Graph mutations: attaching declarations, base classes, parameters and
//! using-directives/declarations. Every successful mutation is journaled;
//! a failed one leaves the graph untouched.

use cxx_ir::Name;
use smallvec::SmallVec;

use super::SymbolTable;
use crate::error::{InvalidUse, SymbolResult, SymbolTableError};
use crate::lookup::LookupMode;
use crate::stack::ensure_sufficient_stack;
use crate::symbol::{Access, Parameter, ParentEdge, Symbol, SymbolId, SymbolKind};
use crate::transaction::LogEntry;
use crate::type_info::{PtrOp, TypeFlags, TypeInfo, TypeKind};

impl SymbolTable {
    /// Attach `symbol` to `scope`.
    ///
    /// Adding into an enumeration declares an enumerator: it is placed in
    /// the scope enclosing the enumeration and typed by it. Adding a
    /// non-static member function to a class also declares its `this`.
    #[tracing::instrument(level = "trace", skip(self), fields(name = %self.name_of(symbol)))]
    pub fn add_symbol(&mut self, scope: SymbolId, symbol: SymbolId) -> SymbolResult<()> {
        if symbol == self.root || self.symbol(symbol).container.is_some() {
            return Err(InvalidUse::AlreadyAttached { symbol }.into());
        }
        if self.symbol(scope).scope().is_none() {
            return Err(InvalidUse::NotAScope { symbol: scope }.into());
        }
        if self.ancestors(scope).any(|ancestor| ancestor == symbol) {
            return Err(InvalidUse::AlreadyAttached { symbol }.into());
        }
        self.require_mutable(scope)?;
        if self.symbol(scope).type_kind() == TypeKind::Enumeration {
            return self.add_enumerator(scope, symbol);
        }

        let name = self.symbol(symbol).name;
        self.check_redeclaration(scope, name, self.resolve_alias(symbol))?;
        self.attach(scope, symbol);

        let member = self.symbol(symbol);
        let is_method = self.options.is_cpp()
            && self.symbol(scope).is_class_like()
            && member.is_function()
            && !member.type_info.flags.contains(TypeFlags::STATIC);
        if is_method {
            self.declare_this(symbol, scope);
        }
        Ok(())
    }

    fn attach(&mut self, scope: SymbolId, symbol: SymbolId) {
        let name = self.symbol(symbol).name;
        if let Some(data) = self.symbol_mut(scope).scope_mut() {
            data.insert(name, symbol);
        }
        self.symbol_mut(symbol).container = Some(scope);
        self.log.record(LogEntry::AddSymbol { scope, symbol });
    }

    fn add_enumerator(&mut self, enumeration: SymbolId, symbol: SymbolId) -> SymbolResult<()> {
        let Some(scope) = self.symbol(enumeration).container else {
            return Err(InvalidUse::DetachedEnumeration { enumeration }.into());
        };
        let name = self.symbol(symbol).name;
        self.check_redeclaration(scope, name, symbol)?;

        let previous = Box::new(self.symbol(symbol).type_info.clone());
        let enumerator = self.symbol_mut(symbol);
        enumerator.type_info.kind = TypeKind::Enumerator;
        enumerator.type_info.type_symbol = Some(enumeration);
        enumerator.container = Some(scope);
        if let Some(data) = self.symbol_mut(scope).scope_mut() {
            data.insert(name, symbol);
        }
        if let Some(data) = self.symbol_mut(enumeration).scope_mut() {
            data.enumerators.push(symbol);
        }
        self.log.record(LogEntry::AddEnumerator {
            enumeration,
            scope,
            symbol,
            previous,
        });
        Ok(())
    }

    fn declare_this(&mut self, function: SymbolId, class: SymbolId) {
        let this = Name::THIS;
        let already = self
            .symbol(function)
            .scope()
            .is_some_and(|scope| !scope.named(this).is_empty());
        if already {
            return;
        }
        let flags = self.symbol(function).type_info.flags;
        let ty = TypeInfo::of_symbol(TypeKind::Type, class).with_ptr_op(PtrOp::pointer().with_cv(
            flags.contains(TypeFlags::CONST),
            flags.contains(TypeFlags::VOLATILE),
        ));
        let id = self.alloc(Symbol::new(this, ty, SymbolKind::Plain));
        self.attach(function, id);
    }

    /// Reject `entity` (already resolved through aliases) if `scope`
    /// declares something under `name` it would clash with.
    pub(crate) fn check_redeclaration(
        &self,
        scope: SymbolId,
        name: Name,
        entity: SymbolId,
    ) -> SymbolResult<()> {
        let new = self.symbol(entity);
        if name.is_empty() && !new.is_function() {
            return Ok(());
        }
        let Some(data) = self.symbol(scope).scope() else {
            return Ok(());
        };
        for &existing in data.named(name) {
            let old_id = self.resolve_alias(existing);
            let old = self.symbol(old_id);
            let clash = if old_id == entity {
                true
            } else if old.is_function() && new.is_function() {
                self.has_same_parameters(old_id, entity)
            } else {
                old.type_kind().is_tag() == new.type_kind().is_tag()
            };
            if clash {
                return Err(InvalidUse::Redeclaration {
                    name: self.interner.lookup(name).to_owned(),
                }
                .into());
            }
        }
        Ok(())
    }

    /// Append a public, non-virtual base class.
    pub fn add_parent(&mut self, class: SymbolId, base: SymbolId) -> SymbolResult<()> {
        self.add_parent_edge(
            class,
            ParentEdge {
                base,
                is_virtual: false,
                access: Access::Public,
            },
        )
    }

    /// Append a base-class edge.
    ///
    /// With eager cycle checking, an edge that would make `class` its own
    /// base is rejected here; otherwise the cycle surfaces on lookup.
    #[tracing::instrument(level = "trace", skip(self))]
    pub fn add_parent_edge(&mut self, class: SymbolId, edge: ParentEdge) -> SymbolResult<()> {
        self.require_cpp("base classes")?;
        if self.symbol(class).class().is_none() {
            return Err(InvalidUse::NotInheritable { symbol: class }.into());
        }
        self.require_mutable(class)?;
        let base = self.resolve_alias(edge.base);
        let candidate = self.symbol(base);
        let is_template_param =
            candidate.type_kind() == TypeKind::Undef && matches!(candidate.kind, SymbolKind::Plain);
        if candidate.class().is_none() && !is_template_param {
            return Err(InvalidUse::InvalidBase { base }.into());
        }
        if base == class || (self.options.eager_cycle_check && self.derives_from(base, class)) {
            tracing::debug!(%class, %base, "rejecting circular base");
            return Err(SymbolTableError::CircularInheritance { symbol: base });
        }
        if let Some(data) = self.symbol_mut(class).class_mut() {
            data.parents.push(ParentEdge { base, ..edge });
        }
        self.log.record(LogEntry::AddParent { class });
        Ok(())
    }

    /// Whether `base` is reachable from `derived` through base edges.
    pub fn derives_from(&self, derived: SymbolId, base: SymbolId) -> bool {
        let mut seen: SmallVec<[SymbolId; 8]> = SmallVec::new();
        let mut pending: SmallVec<[SymbolId; 8]> = SmallVec::new();
        pending.push(derived);
        while let Some(current) = pending.pop() {
            for edge in self.parents(current) {
                if edge.base == base {
                    return true;
                }
                if !seen.contains(&edge.base) {
                    seen.push(edge.base);
                    pending.push(edge.base);
                }
            }
        }
        false
    }

    /// Nominate `namespace` for unqualified lookup from `scope`.
    pub fn add_using_directive(&mut self, scope: SymbolId, namespace: SymbolId) -> SymbolResult<()> {
        self.require_cpp("using-directives")?;
        if self.symbol(scope).scope().is_none() {
            return Err(InvalidUse::NotAScope { symbol: scope }.into());
        }
        let target = self.symbol(namespace);
        if target.scope().is_none() || target.type_kind() != TypeKind::Namespace {
            return Err(InvalidUse::NotANamespace { symbol: namespace }.into());
        }
        self.require_mutable(scope)?;
        if let Some(data) = self.symbol_mut(scope).scope_mut() {
            data.using_directives.push(namespace);
        }
        self.log.record(LogEntry::AddUsingDirective { scope });
        Ok(())
    }

    /// Declare `name` from `source` in `scope` and return the first alias.
    ///
    /// Every overload visible at this point gets its own alias; overloads
    /// added to `source` later are not picked up. Inside a class, `source`
    /// must be one of its bases.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn add_using_declaration(
        &mut self,
        scope: SymbolId,
        name: &str,
        source: SymbolId,
    ) -> SymbolResult<SymbolId> {
        self.require_cpp("using-declarations")?;
        if self.symbol(scope).scope().is_none() {
            return Err(InvalidUse::NotAScope { symbol: scope }.into());
        }
        self.require_mutable(scope)?;
        let not_found = || InvalidUse::UsingDeclarationNotFound {
            name: name.to_owned(),
        };
        let name_id = self.interner.get(name).ok_or_else(not_found)?;
        let found = self.qualified_set(source, name_id, LookupMode::Ordinary)?;
        if found.is_empty() {
            return Err(not_found().into());
        }
        if self.symbol(scope).is_class_like() && !self.derives_from(scope, source) {
            return Err(InvalidUse::UsingDeclarationNotBaseMember {
                name: name.to_owned(),
            }
            .into());
        }

        let targets: SmallVec<[SymbolId; 4]> =
            found.iter().map(|id| self.resolve_alias(*id)).collect();
        for &target in &targets {
            self.check_redeclaration(scope, name_id, target)?;
        }

        let mut first = None;
        for target in targets {
            let ty = self.symbol(target).type_info.clone();
            let alias = self.alloc(Symbol::new(
                name_id,
                ty,
                SymbolKind::UsingDeclaration { target },
            ));
            if let Some(data) = self.symbol_mut(scope).scope_mut() {
                data.insert(name_id, alias);
            }
            self.symbol_mut(alias).container = Some(scope);
            self.log
                .record(LogEntry::AddUsingDeclaration { scope, alias });
            first.get_or_insert(alias);
        }
        first.ok_or_else(|| not_found().into())
    }

    /// Append a parameter to a function or template.
    pub fn add_parameter(
        &mut self,
        callable: SymbolId,
        ty: TypeInfo,
        has_default: bool,
    ) -> SymbolResult<()> {
        if self.symbol(callable).callable().is_none() {
            return Err(InvalidUse::NotACallable { symbol: callable }.into());
        }
        self.require_mutable(callable)?;
        if let Some(data) = self.symbol_mut(callable).callable_mut() {
            data.parameters.push(Parameter { ty, has_default });
        }
        self.log.record(LogEntry::AddParameter { callable });
        Ok(())
    }

    /// Instances and everything cloned into them are frozen once created.
    pub(crate) fn require_mutable(&self, scope: SymbolId) -> SymbolResult<()> {
        let frozen = self.ancestors(scope).any(|ancestor| {
            let symbol = self.symbol(ancestor);
            symbol.instance_of.is_some() || symbol.origin.is_some()
        });
        if frozen {
            Err(InvalidUse::InstanceIsImmutable { symbol: scope }.into())
        } else {
            Ok(())
        }
    }

    /// Walk every base of `class` depth-first, including indirect ones.
    pub(crate) fn for_each_base(&self, class: SymbolId, visit: &mut impl FnMut(SymbolId)) {
        let mut seen: SmallVec<[SymbolId; 8]> = SmallVec::new();
        self.walk_bases(class, &mut seen, visit);
    }

    fn walk_bases(
        &self,
        class: SymbolId,
        seen: &mut SmallVec<[SymbolId; 8]>,
        visit: &mut impl FnMut(SymbolId),
    ) {
        ensure_sufficient_stack(|| {
            for edge in self.parents(class) {
                if seen.contains(&edge.base) {
                    continue;
                }
                seen.push(edge.base);
                visit(edge.base);
                self.walk_bases(edge.base, seen, visit);
            }
        });
    }

    pub(crate) fn require_cpp(&self, operation: &'static str) -> SymbolResult<()> {
        if self.options.is_cpp() {
            Ok(())
        } else {
            Err(InvalidUse::UnsupportedInLanguage { operation }.into())
        }
    }
}
