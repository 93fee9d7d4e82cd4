//! Type descriptors.
//!
//! A [`TypeInfo`] is a plain value describing the declared type of a symbol,
//! a parameter, a call argument, or a template argument. It never owns other
//! symbols; a class, typedef or template parameter it refers to is named by
//! [`SymbolId`] and resolved against the table when needed.
//!
//! # Layout
//!
//! - `kind`: the base type (fundamental, class reference, function, ...)
//! - `flags`: qualifiers and storage class ([`TypeFlags`])
//! - `ptr_ops`: the declarator chain, innermost first (`const int* &` is
//!   `[Pointer, Reference]` with `CONST` on the base)
//! - `type_symbol`: the referenced declaration, if any
//! - `default` / `value`: default arguments and non-type template values

use bitflags::bitflags;
use smallvec::SmallVec;

use crate::SymbolId;

/// Base type of a descriptor.
///
/// Variant order matters: [`TypeInfo::is_type_in`] tests inclusive ranges.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TypeKind {
    /// Not yet known; also the kind of a type template parameter.
    #[default]
    Undef,
    /// Refers to another declaration through `type_symbol`.
    Type,
    Class,
    Struct,
    Union,
    Enumeration,
    Enumerator,
    Namespace,
    Function,
    Template,
    Block,
    Bool,
    Char,
    WChar,
    Int,
    Float,
    Double,
    Void,
}

impl TypeKind {
    #[inline]
    pub fn is_class_key(self) -> bool {
        matches!(self, TypeKind::Class | TypeKind::Struct | TypeKind::Union)
    }

    /// Class keys and enumerations: the names that non-types can hide.
    #[inline]
    pub fn is_tag(self) -> bool {
        self.is_class_key() || self == TypeKind::Enumeration
    }

    #[inline]
    pub fn is_arithmetic(self) -> bool {
        TypeKind::Bool <= self && self <= TypeKind::Double
    }

    #[inline]
    pub fn is_fundamental(self) -> bool {
        TypeKind::Bool <= self && self <= TypeKind::Void
    }

    /// Kinds whose symbols own a member scope.
    #[inline]
    pub fn can_hold_symbols(self) -> bool {
        (TypeKind::Class <= self && self <= TypeKind::Enumeration)
            || (TypeKind::Namespace <= self && self <= TypeKind::Block)
    }
}

bitflags! {
    /// Qualifier, size/sign and storage-class bits.
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct TypeFlags: u32 {
        // === CV qualifiers ===
        const CONST = 1 << 0;
        const VOLATILE = 1 << 1;

        // === Size and sign ===
        const SHORT = 1 << 2;
        const LONG = 1 << 3;
        const SIGNED = 1 << 4;
        const UNSIGNED = 1 << 5;

        // === Storage class and specifiers ===
        const STATIC = 1 << 8;
        const EXTERN = 1 << 9;
        const MUTABLE = 1 << 10;
        const VIRTUAL = 1 << 11;
        const INLINE = 1 << 12;
        const EXPLICIT = 1 << 13;
        const TYPEDEF = 1 << 14;
        const REGISTER = 1 << 15;
        const AUTO = 1 << 16;
        const FRIEND = 1 << 17;
        const FORWARD = 1 << 18;

        // === Groups ===
        const CV = Self::CONST.bits() | Self::VOLATILE.bits();
        const SIZE_SIGN = Self::SHORT.bits()
            | Self::LONG.bits()
            | Self::SIGNED.bits()
            | Self::UNSIGNED.bits();
        const STORAGE = Self::STATIC.bits()
            | Self::EXTERN.bits()
            | Self::MUTABLE.bits()
            | Self::VIRTUAL.bits()
            | Self::INLINE.bits()
            | Self::EXPLICIT.bits()
            | Self::TYPEDEF.bits()
            | Self::REGISTER.bits()
            | Self::AUTO.bits()
            | Self::FRIEND.bits()
            | Self::FORWARD.bits();
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PtrOpKind {
    Pointer,
    Reference,
    Array,
}

/// One declarator operator with its own cv-qualification.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PtrOp {
    pub kind: PtrOpKind,
    pub is_const: bool,
    pub is_volatile: bool,
}

impl PtrOp {
    pub const fn new(kind: PtrOpKind) -> Self {
        PtrOp {
            kind,
            is_const: false,
            is_volatile: false,
        }
    }

    pub const fn pointer() -> Self {
        PtrOp::new(PtrOpKind::Pointer)
    }

    pub const fn reference() -> Self {
        PtrOp::new(PtrOpKind::Reference)
    }

    pub const fn array() -> Self {
        PtrOp::new(PtrOpKind::Array)
    }

    #[must_use]
    pub const fn with_cv(mut self, is_const: bool, is_volatile: bool) -> Self {
        self.is_const = is_const;
        self.is_volatile = is_volatile;
        self
    }

    #[inline]
    pub(crate) fn cv(self) -> TypeFlags {
        let mut cv = TypeFlags::empty();
        cv.set(TypeFlags::CONST, self.is_const);
        cv.set(TypeFlags::VOLATILE, self.is_volatile);
        cv
    }
}

/// Default argument attached to a parameter.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DefaultArg {
    /// A function parameter default; the expression itself is not modeled.
    Expression,
    /// A template parameter default, possibly naming an earlier parameter.
    Type(Box<TypeInfo>),
}

/// Type descriptor.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TypeInfo {
    pub kind: TypeKind,
    pub flags: TypeFlags,
    pub ptr_ops: SmallVec<[PtrOp; 2]>,
    pub type_symbol: Option<SymbolId>,
    pub default: Option<DefaultArg>,
    pub value: Option<i64>,
}

impl TypeInfo {
    pub fn new(kind: TypeKind) -> Self {
        TypeInfo {
            kind,
            ..TypeInfo::default()
        }
    }

    /// Descriptor referring to another declaration (`kind` is usually `Type`).
    pub fn of_symbol(kind: TypeKind, symbol: SymbolId) -> Self {
        TypeInfo {
            kind,
            type_symbol: Some(symbol),
            ..TypeInfo::default()
        }
    }

    #[must_use]
    pub fn with_ptr_op(mut self, op: PtrOp) -> Self {
        self.ptr_ops.push(op);
        self
    }

    #[must_use]
    pub fn with_flags(mut self, flags: TypeFlags) -> Self {
        self.flags |= flags;
        self
    }

    #[must_use]
    pub fn with_value(mut self, value: i64) -> Self {
        self.value = Some(value);
        self
    }

    #[must_use]
    pub fn with_default(mut self, default: DefaultArg) -> Self {
        self.default = Some(default);
        self
    }

    #[inline]
    pub fn is_type(&self, kind: TypeKind) -> bool {
        self.kind == kind
    }

    /// Inclusive range test over [`TypeKind`] order.
    #[inline]
    pub fn is_type_in(&self, low: TypeKind, high: TypeKind) -> bool {
        low <= self.kind && self.kind <= high
    }

    #[inline]
    pub fn is_class_key(&self) -> bool {
        self.kind.is_class_key()
    }

    #[inline]
    pub fn can_hold_symbols(&self) -> bool {
        self.kind.can_hold_symbols()
    }

    /// Arithmetic value type: no declarator operators.
    #[inline]
    pub fn is_arithmetic(&self) -> bool {
        self.kind.is_arithmetic() && self.ptr_ops.is_empty()
    }

    #[inline]
    pub fn is_reference(&self) -> bool {
        matches!(self.ptr_ops.last(), Some(op) if op.kind == PtrOpKind::Reference)
    }

    /// A lone `void` parameter, meaning "no parameters".
    #[inline]
    pub fn is_void_parameter(&self) -> bool {
        self.kind == TypeKind::Void && self.ptr_ops.is_empty()
    }

    /// Copy with the outermost reference removed.
    #[must_use]
    pub fn without_reference(&self) -> TypeInfo {
        let mut ty = self.clone();
        if ty.is_reference() {
            ty.ptr_ops.pop();
        }
        ty
    }

    /// Copy with an outermost array operator decayed to a pointer.
    #[must_use]
    pub fn decayed(&self) -> TypeInfo {
        let mut ty = self.clone();
        if let Some(op) = ty.ptr_ops.last_mut() {
            if op.kind == PtrOpKind::Array {
                op.kind = PtrOpKind::Pointer;
            }
        }
        ty
    }

    /// Qualifiers that apply to the object itself rather than a pointee.
    pub(crate) fn top_level_cv(&self) -> TypeFlags {
        match self.ptr_ops.last() {
            Some(op) => op.cv(),
            None => self.flags & TypeFlags::CV,
        }
    }

    /// Drop storage-class bits and defaults, and spell class references as
    /// `Type`, so that structurally equal types compare and hash equal.
    #[must_use]
    pub fn normalized(&self) -> TypeInfo {
        let kind = match self.kind {
            kind if kind.is_tag() && self.type_symbol.is_some() => TypeKind::Type,
            kind => kind,
        };
        TypeInfo {
            kind,
            flags: self.flags - TypeFlags::STORAGE,
            ptr_ops: self.ptr_ops.clone(),
            type_symbol: self.type_symbol,
            default: None,
            value: self.value,
        }
    }
}
