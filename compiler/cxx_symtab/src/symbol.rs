//! Symbol records and their kind-specific payloads.
//!
//! # Design
//!
//! Symbols live in one arena owned by [`SymbolTable`](crate::SymbolTable)
//! and are addressed by [`SymbolId`]. Every symbol shares a common record
//! (name, type, owning scope); what a symbol *can do* is a closed
//! [`SymbolKind`] variant, so lookup and overload code match on the kind
//! rather than dispatching through a trait.
//!
//! Relations between symbols (containment, base classes, using-directives,
//! using-declaration targets) are stored as ids. Nothing here owns another
//! symbol, so scope/member cycles need no special handling.

use std::fmt;

use cxx_ir::Name;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::type_info::{TypeInfo, TypeKind};

/// Handle to a symbol in a [`SymbolTable`](crate::SymbolTable).
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct SymbolId(u32);

impl SymbolId {
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        SymbolId(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SymbolId({})", self.0)
    }
}

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Member access of a base-class edge.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Access {
    #[default]
    Public,
    Protected,
    Private,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ParentEdge {
    pub base: SymbolId,
    pub is_virtual: bool,
    pub access: Access,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Parameter {
    pub ty: TypeInfo,
    pub has_default: bool,
}

/// Name-keyed members of a scope, plus its using-directive edges.
#[derive(Clone, Debug, Default)]
pub struct ScopeData {
    by_name: FxHashMap<Name, SmallVec<[SymbolId; 2]>>,
    order: Vec<SymbolId>,
    pub(crate) using_directives: Vec<SymbolId>,
    /// Enumerators declared through this enumeration (forwarded outward).
    pub(crate) enumerators: Vec<SymbolId>,
}

impl ScopeData {
    /// Members declared under `name`, in declaration order.
    pub fn named(&self, name: Name) -> &[SymbolId] {
        self.by_name.get(&name).map_or(&[], |ids| ids.as_slice())
    }

    /// All members in declaration order.
    pub fn members(&self) -> &[SymbolId] {
        &self.order
    }

    pub fn using_directives(&self) -> &[SymbolId] {
        &self.using_directives
    }

    pub fn enumerators(&self) -> &[SymbolId] {
        &self.enumerators
    }

    pub(crate) fn insert(&mut self, name: Name, id: SymbolId) {
        self.by_name.entry(name).or_default().push(id);
        self.order.push(id);
    }

    /// Same directives and enumerators, no members.
    pub(crate) fn without_members(&self) -> ScopeData {
        ScopeData {
            by_name: FxHashMap::default(),
            order: Vec::new(),
            using_directives: self.using_directives.clone(),
            enumerators: self.enumerators.clone(),
        }
    }

    pub(crate) fn remove(&mut self, name: Name, id: SymbolId) {
        if let Some(ids) = self.by_name.get_mut(&name) {
            ids.retain(|member| *member != id);
            if ids.is_empty() {
                self.by_name.remove(&name);
            }
        }
        self.order.retain(|member| *member != id);
    }
}

#[derive(Clone, Debug, Default)]
pub struct ClassData {
    pub scope: ScopeData,
    pub parents: Vec<ParentEdge>,
}

/// Template bookkeeping; empty for ordinary functions.
#[derive(Clone, Debug, Default)]
pub struct TemplateData {
    pub params: Vec<SymbolId>,
    pub specializations: Vec<SymbolId>,
    /// Argument pattern of a specialization.
    pub pattern: Vec<TypeInfo>,
    /// The primary template of a specialization.
    pub primary: Option<SymbolId>,
}

#[derive(Clone, Debug, Default)]
pub struct CallableData {
    pub scope: ScopeData,
    pub parameters: Vec<Parameter>,
    pub return_type: Option<TypeInfo>,
    pub template: TemplateData,
}

impl CallableData {
    /// Parameters with a lone `void` read as an empty list.
    pub fn effective_parameters(&self) -> &[Parameter] {
        match self.parameters.as_slice() {
            [only] if only.ty.is_void_parameter() => &[],
            params => params,
        }
    }
}

#[derive(Clone, Debug)]
pub enum SymbolKind {
    Plain,
    Scope(ScopeData),
    Inheritable(ClassData),
    Callable(CallableData),
    /// Alias frozen at declaration time.
    UsingDeclaration { target: SymbolId },
}

/// Provenance of a template instance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InstanceInfo {
    /// The primary template or specialization that was instantiated.
    pub template: SymbolId,
    /// Normalized arguments, one per template parameter.
    pub args: Vec<TypeInfo>,
}

#[derive(Clone, Debug)]
pub struct Symbol {
    pub(crate) name: Name,
    pub(crate) type_info: TypeInfo,
    pub(crate) container: Option<SymbolId>,
    pub(crate) extension: Option<u64>,
    pub(crate) instance_of: Option<InstanceInfo>,
    /// The template-body symbol this one was cloned from.
    pub(crate) origin: Option<SymbolId>,
    pub(crate) kind: SymbolKind,
}

impl Symbol {
    pub(crate) fn new(name: Name, type_info: TypeInfo, kind: SymbolKind) -> Self {
        Symbol {
            name,
            type_info,
            container: None,
            extension: None,
            instance_of: None,
            origin: None,
            kind,
        }
    }

    pub fn name(&self) -> Name {
        self.name
    }

    pub fn type_info(&self) -> &TypeInfo {
        &self.type_info
    }

    pub fn type_kind(&self) -> TypeKind {
        self.type_info.kind
    }

    pub fn container(&self) -> Option<SymbolId> {
        self.container
    }

    pub fn extension(&self) -> Option<u64> {
        self.extension
    }

    pub fn instance_of(&self) -> Option<&InstanceInfo> {
        self.instance_of.as_ref()
    }

    pub fn origin(&self) -> Option<SymbolId> {
        self.origin
    }

    pub fn kind(&self) -> &SymbolKind {
        &self.kind
    }

    pub fn scope(&self) -> Option<&ScopeData> {
        match &self.kind {
            SymbolKind::Scope(scope) => Some(scope),
            SymbolKind::Inheritable(class) => Some(&class.scope),
            SymbolKind::Callable(callable) => Some(&callable.scope),
            SymbolKind::Plain | SymbolKind::UsingDeclaration { .. } => None,
        }
    }

    pub(crate) fn scope_mut(&mut self) -> Option<&mut ScopeData> {
        match &mut self.kind {
            SymbolKind::Scope(scope) => Some(scope),
            SymbolKind::Inheritable(class) => Some(&mut class.scope),
            SymbolKind::Callable(callable) => Some(&mut callable.scope),
            SymbolKind::Plain | SymbolKind::UsingDeclaration { .. } => None,
        }
    }

    pub fn class(&self) -> Option<&ClassData> {
        match &self.kind {
            SymbolKind::Inheritable(class) => Some(class),
            _ => None,
        }
    }

    pub(crate) fn class_mut(&mut self) -> Option<&mut ClassData> {
        match &mut self.kind {
            SymbolKind::Inheritable(class) => Some(class),
            _ => None,
        }
    }

    pub fn callable(&self) -> Option<&CallableData> {
        match &self.kind {
            SymbolKind::Callable(callable) => Some(callable),
            _ => None,
        }
    }

    pub(crate) fn callable_mut(&mut self) -> Option<&mut CallableData> {
        match &mut self.kind {
            SymbolKind::Callable(callable) => Some(callable),
            _ => None,
        }
    }

    pub fn using_target(&self) -> Option<SymbolId> {
        match self.kind {
            SymbolKind::UsingDeclaration { target } => Some(target),
            _ => None,
        }
    }

    /// Class, struct or union with its own member scope.
    pub fn is_class_like(&self) -> bool {
        self.type_info.kind.is_class_key() && self.scope().is_some()
    }

    pub fn is_function(&self) -> bool {
        self.type_info.kind == TypeKind::Function && self.callable().is_some()
    }

    pub fn is_template(&self) -> bool {
        self.type_info.kind == TypeKind::Template && self.callable().is_some()
    }
}
