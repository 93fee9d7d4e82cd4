//! The symbol table: arena, creation, accessors and type setters.
//!
//! # Design
//!
//! [`SymbolTable`] owns every symbol in a single `Vec`, indexed by
//! [`SymbolId`]. Symbols are created detached and become visible only when
//! attached to a scope (see `declare.rs`). Id `0` is the compilation unit,
//! an anonymous namespace that is never attached anywhere.
//!
//! Names cross the public API as `&str` and are interned into
//! [`StringInterner`]. Lookups never intern: a string that was never
//! interned cannot name anything.
//!
//! Symbols are never freed. Rolling back a transaction detaches them, and
//! a detached symbol is unreachable from the root.

mod declare;

use cxx_ir::{Name, StringInterner};
use rustc_hash::FxHashMap;

use crate::error::{InvalidUse, SymbolResult};
use crate::options::TableOptions;
use crate::symbol::{
    CallableData, ClassData, InstanceInfo, Parameter, ParentEdge, ScopeData, Symbol, SymbolId,
    SymbolKind,
};
use crate::template::InstanceKey;
use crate::transaction::TransactionLog;
use crate::type_info::{DefaultArg, PtrOp, TypeFlags, TypeInfo, TypeKind};

/// Symbol graph for one translation unit.
pub struct SymbolTable {
    pub(crate) interner: StringInterner,
    pub(crate) symbols: Vec<Symbol>,
    pub(crate) root: SymbolId,
    pub(crate) options: TableOptions,
    pub(crate) log: TransactionLog,
    pub(crate) instances: FxHashMap<InstanceKey, SymbolId>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::with_options(TableOptions::default())
    }

    pub fn with_options(options: TableOptions) -> Self {
        let unit = Symbol::new(
            Name::EMPTY,
            TypeInfo::new(TypeKind::Namespace),
            SymbolKind::Scope(ScopeData::default()),
        );
        tracing::debug!(language = ?options.language, "new symbol table");
        SymbolTable {
            interner: StringInterner::new(),
            symbols: vec![unit],
            root: SymbolId::from_raw(0),
            options,
            log: TransactionLog::default(),
            instances: FxHashMap::default(),
        }
    }

    #[inline]
    pub fn options(&self) -> &TableOptions {
        &self.options
    }

    /// The root (global) namespace.
    #[inline]
    pub fn compilation_unit(&self) -> SymbolId {
        self.root
    }

    #[inline]
    pub fn interner(&self) -> &StringInterner {
        &self.interner
    }

    pub fn intern(&self, name: &str) -> Name {
        self.interner.intern(name)
    }

    /// Number of symbols ever created, detached ones included.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.len() <= 1
    }

    // === Creation ===

    /// A symbol with no member scope (variables, typedefs, enumerators,
    /// template parameters).
    pub fn new_symbol(&mut self, name: &str, kind: TypeKind) -> SymbolId {
        self.create(name, kind, SymbolKind::Plain)
    }

    /// A symbol owning members (namespaces, enumerations, blocks, and
    /// classes that never take bases).
    pub fn new_scope_symbol(&mut self, name: &str, kind: TypeKind) -> SymbolId {
        self.create(name, kind, SymbolKind::Scope(ScopeData::default()))
    }

    /// A class, struct or union that may take base classes.
    pub fn new_inheritable_scope_symbol(&mut self, name: &str, kind: TypeKind) -> SymbolId {
        self.create(name, kind, SymbolKind::Inheritable(ClassData::default()))
    }

    /// A function or template.
    pub fn new_callable_symbol(&mut self, name: &str, kind: TypeKind) -> SymbolId {
        self.create(name, kind, SymbolKind::Callable(CallableData::default()))
    }

    fn create(&mut self, name: &str, kind: TypeKind, payload: SymbolKind) -> SymbolId {
        let name = self.interner.intern(name);
        self.alloc(Symbol::new(name, TypeInfo::new(kind), payload))
    }

    pub(crate) fn alloc(&mut self, symbol: Symbol) -> SymbolId {
        let raw = u32::try_from(self.symbols.len())
            .unwrap_or_else(|_| panic!("symbol arena exceeded {} entries", u32::MAX));
        self.symbols.push(symbol);
        SymbolId::from_raw(raw)
    }

    // === Accessors ===

    #[inline]
    pub fn symbol(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.index()]
    }

    #[inline]
    pub(crate) fn symbol_mut(&mut self, id: SymbolId) -> &mut Symbol {
        &mut self.symbols[id.index()]
    }

    pub fn name_of(&self, id: SymbolId) -> &str {
        self.interner.lookup(self.symbol(id).name)
    }

    pub fn type_info(&self, id: SymbolId) -> &TypeInfo {
        &self.symbol(id).type_info
    }

    pub fn container_of(&self, id: SymbolId) -> Option<SymbolId> {
        self.symbol(id).container
    }

    pub fn is_attached(&self, id: SymbolId) -> bool {
        id == self.root || self.symbol(id).container.is_some()
    }

    /// Members of `scope` in declaration order; empty for non-scopes.
    pub fn contained_symbols(&self, scope: SymbolId) -> &[SymbolId] {
        self.symbol(scope).scope().map_or(&[], ScopeData::members)
    }

    pub fn parents(&self, class: SymbolId) -> &[ParentEdge] {
        self.symbol(class)
            .class()
            .map_or(&[], |data| data.parents.as_slice())
    }

    pub fn using_directives(&self, scope: SymbolId) -> &[SymbolId] {
        self.symbol(scope)
            .scope()
            .map_or(&[], ScopeData::using_directives)
    }

    pub fn enumerators(&self, enumeration: SymbolId) -> &[SymbolId] {
        self.symbol(enumeration)
            .scope()
            .map_or(&[], ScopeData::enumerators)
    }

    /// Declared parameters of a function (through a using-declaration alias).
    pub fn parameters(&self, callable: SymbolId) -> &[Parameter] {
        self.callable_data(callable)
            .map_or(&[], |data| data.parameters.as_slice())
    }

    pub fn return_type(&self, callable: SymbolId) -> Option<&TypeInfo> {
        self.callable_data(callable)
            .and_then(|data| data.return_type.as_ref())
    }

    pub fn template_parameters(&self, template: SymbolId) -> &[SymbolId] {
        self.callable_data(template)
            .map_or(&[], |data| data.template.params.as_slice())
    }

    pub fn specializations(&self, template: SymbolId) -> &[SymbolId] {
        self.callable_data(template)
            .map_or(&[], |data| data.template.specializations.as_slice())
    }

    pub fn instance_of(&self, id: SymbolId) -> Option<&InstanceInfo> {
        self.symbol(id).instance_of.as_ref()
    }

    /// The template-body symbol an instance member was cloned from.
    pub fn origin_of(&self, id: SymbolId) -> Option<SymbolId> {
        self.symbol(id).origin
    }

    pub fn extension(&self, id: SymbolId) -> Option<u64> {
        self.symbol(id).extension
    }

    /// Follow a using-declaration alias to the declaration it names.
    pub fn resolve_alias(&self, id: SymbolId) -> SymbolId {
        let mut current = id;
        while let Some(target) = self.symbol(current).using_target() {
            if target == current {
                break;
            }
            current = target;
        }
        current
    }

    fn callable_data(&self, id: SymbolId) -> Option<&CallableData> {
        self.symbol(self.resolve_alias(id)).callable()
    }

    /// `id` followed by its containers up to (and including) the root.
    pub(crate) fn ancestors(&self, id: SymbolId) -> impl Iterator<Item = SymbolId> + '_ {
        std::iter::successors(Some(id), |current| self.container_of(*current))
    }

    // === Type setters (not journaled) ===

    pub fn set_type(&mut self, id: SymbolId, kind: TypeKind) {
        self.symbol_mut(id).type_info.kind = kind;
    }

    pub fn set_type_symbol(&mut self, id: SymbolId, target: SymbolId) {
        self.symbol_mut(id).type_info.type_symbol = Some(target);
    }

    pub fn set_flag(&mut self, id: SymbolId, flags: TypeFlags) {
        self.symbol_mut(id).type_info.flags |= flags;
    }

    pub fn add_ptr_op(&mut self, id: SymbolId, op: PtrOp) {
        self.symbol_mut(id).type_info.ptr_ops.push(op);
    }

    pub fn set_default(&mut self, id: SymbolId, default: DefaultArg) {
        self.symbol_mut(id).type_info.default = Some(default);
    }

    pub fn set_type_info(&mut self, id: SymbolId, ty: TypeInfo) {
        self.symbol_mut(id).type_info = ty;
    }

    pub fn set_extension(&mut self, id: SymbolId, extension: u64) {
        self.symbol_mut(id).extension = Some(extension);
    }

    pub fn set_return_type(&mut self, callable: SymbolId, ty: TypeInfo) -> SymbolResult<()> {
        let data = self
            .symbol_mut(callable)
            .callable_mut()
            .ok_or(InvalidUse::NotACallable { symbol: callable })?;
        data.return_type = Some(ty);
        Ok(())
    }

    // === Signatures ===

    /// Whether two functions have the same parameter-type list, after
    /// typedef flattening and ignoring top-level cv and storage bits.
    pub fn has_same_parameters(&self, a: SymbolId, b: SymbolId) -> bool {
        let (Some(left), Some(right)) = (self.callable_data(a), self.callable_data(b)) else {
            return false;
        };
        let (left, right) = (left.effective_parameters(), right.effective_parameters());
        left.len() == right.len()
            && left
                .iter()
                .zip(right)
                .all(|(l, r)| self.signature_type(&l.ty) == self.signature_type(&r.ty))
    }

    fn signature_type(&self, ty: &TypeInfo) -> TypeInfo {
        let mut ty = self.flatten_type(ty).normalized().decayed();
        match ty.ptr_ops.last_mut() {
            Some(op) => {
                op.is_const = false;
                op.is_volatile = false;
            }
            None => ty.flags -= TypeFlags::CV,
        }
        ty
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SymbolTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SymbolTable")
            .field("symbols", &self.symbols.len())
            .field("instances", &self.instances.len())
            .field("options", &self.options)
            .field("log_len", &self.log.len())
            .finish_non_exhaustive()
    }
}
