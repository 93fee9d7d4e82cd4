//! Implicit conversion sequences.
//!
//! Arguments and parameters are compared after [flattening](SymbolTable::flatten_type),
//! so typedefs and variables are already replaced by the types they name.
//! An argument's trailing reference only marks it as an lvalue and is
//! dropped; an array argument decays to a pointer.

use smallvec::SmallVec;

use crate::symbol::{SymbolId, SymbolKind};
use crate::type_info::{PtrOpKind, TypeFlags, TypeInfo, TypeKind};
use crate::SymbolTable;

/// Quality of one argument-to-parameter conversion, best first.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ConversionRank {
    Exact,
    ReferenceBinding,
    /// Adding cv-qualifiers below the top level (`T*` to `const T*`).
    Qualification,
    /// Derived-to-base; the payload is the inheritance distance.
    DerivedToBase(u32),
    Promotion,
    Conversion,
    UserDefined,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ImplicitConversion {
    pub rank: ConversionRank,
    /// More than one user-defined route exists.
    pub ambiguous: bool,
}

impl ImplicitConversion {
    fn standard(rank: ConversionRank) -> Self {
        ImplicitConversion {
            rank,
            ambiguous: false,
        }
    }
}

impl SymbolTable {
    /// Replace typedef and variable references by the types they name.
    ///
    /// Indirection operators accumulate (the typedef's own operators come
    /// first), qualifiers are merged, storage-class bits of the followed
    /// declaration are dropped. An enumerator becomes its enumeration type.
    /// At most `max_typedef_depth` links are followed.
    pub fn flatten_type(&self, ty: &TypeInfo) -> TypeInfo {
        let mut flat = ty.clone();
        for _ in 0..self.options.max_typedef_depth {
            if flat.kind != TypeKind::Type {
                break;
            }
            let Some(target_id) = flat.type_symbol else {
                break;
            };
            let target = self.symbol(self.resolve_alias(target_id));
            if !matches!(target.kind, SymbolKind::Plain) {
                break;
            }
            let inner = &target.type_info;
            if inner.kind == TypeKind::Enumerator {
                flat.type_symbol = inner.type_symbol;
                break;
            }
            if inner.kind != TypeKind::Type && !inner.kind.is_fundamental() {
                break;
            }
            let mut ptr_ops = inner.ptr_ops.clone();
            ptr_ops.extend(flat.ptr_ops.iter().copied());
            flat = TypeInfo {
                kind: inner.kind,
                flags: (inner.flags - TypeFlags::STORAGE) | flat.flags,
                ptr_ops,
                type_symbol: inner.type_symbol,
                default: flat.default,
                value: flat.value,
            };
        }
        flat
    }

    /// Best implicit conversion from a flattened argument to a flattened
    /// parameter, or `None` if there is none.
    pub(crate) fn implicit_conversion(
        &self,
        arg: &TypeInfo,
        param: &TypeInfo,
    ) -> Option<ImplicitConversion> {
        let arg = arg.without_reference().decayed();
        if let Some(rank) = self.standard_conversion(&arg, param) {
            return Some(ImplicitConversion::standard(rank));
        }
        self.user_defined_conversion(&arg, param)
    }

    fn standard_conversion(&self, arg: &TypeInfo, param: &TypeInfo) -> Option<ConversionRank> {
        if !param.is_reference() {
            return self.value_conversion(arg, &param.decayed());
        }
        let target = param.without_reference();
        if !target.top_level_cv().contains(arg.top_level_cv()) {
            return None;
        }
        match self.value_conversion(arg, &target)? {
            ConversionRank::Exact => Some(ConversionRank::ReferenceBinding),
            rank @ ConversionRank::DerivedToBase(_) => Some(rank),
            // binds to a temporary
            rank if target.top_level_cv().contains(TypeFlags::CONST) => Some(rank),
            _ => None,
        }
    }

    fn value_conversion(&self, arg: &TypeInfo, param: &TypeInfo) -> Option<ConversionRank> {
        if self.same_shape(arg, param) {
            return qualification(arg, param);
        }
        match (arg.ptr_ops.as_slice(), param.ptr_ops.as_slice()) {
            ([], []) => {
                if let (Some(derived), Some(base)) = (self.class_of(arg), self.class_of(param)) {
                    return self
                        .base_distance(derived, base)
                        .map(ConversionRank::DerivedToBase);
                }
                if self.is_promotion(arg, param) {
                    return Some(ConversionRank::Promotion);
                }
                let numeric = arg.is_arithmetic() || self.is_enum(arg);
                (numeric && param.is_arithmetic()).then_some(ConversionRank::Conversion)
            }
            ([from], [to]) if from.kind == PtrOpKind::Pointer && to.kind == PtrOpKind::Pointer => {
                let pointee_cv = param.flags & TypeFlags::CV;
                if !pointee_cv.contains(arg.flags & TypeFlags::CV) {
                    return None;
                }
                if let (Some(derived), Some(base)) = (self.class_of(arg), self.class_of(param)) {
                    return self
                        .base_distance(derived, base)
                        .map(ConversionRank::DerivedToBase);
                }
                (param.kind == TypeKind::Void).then_some(ConversionRank::Conversion)
            }
            _ => None,
        }
    }

    /// Same base type and the same operator kinds, qualifiers aside.
    fn same_shape(&self, a: &TypeInfo, b: &TypeInfo) -> bool {
        let (a, b) = (a.normalized(), b.normalized());
        a.kind == b.kind
            && a.type_symbol.map(|id| self.resolve_alias(id))
                == b.type_symbol.map(|id| self.resolve_alias(id))
            && size_and_sign(&a) == size_and_sign(&b)
            && a.ptr_ops.len() == b.ptr_ops.len()
            && a.ptr_ops
                .iter()
                .zip(&b.ptr_ops)
                .all(|(x, y)| x.kind == y.kind)
    }

    fn is_promotion(&self, arg: &TypeInfo, param: &TypeInfo) -> bool {
        let plain_int = param.kind == TypeKind::Int
            && !param
                .flags
                .intersects(TypeFlags::SHORT | TypeFlags::LONG | TypeFlags::UNSIGNED);
        if plain_int {
            return matches!(arg.kind, TypeKind::Bool | TypeKind::Char | TypeKind::WChar)
                || (arg.kind == TypeKind::Int && arg.flags.contains(TypeFlags::SHORT))
                || self.is_enum(arg);
        }
        param.kind == TypeKind::Double
            && !param.flags.contains(TypeFlags::LONG)
            && arg.kind == TypeKind::Float
    }

    fn is_enum(&self, ty: &TypeInfo) -> bool {
        ty.ptr_ops.is_empty()
            && matches!(ty.kind, TypeKind::Type | TypeKind::Enumeration)
            && ty.type_symbol.is_some_and(|id| {
                self.symbol(self.resolve_alias(id)).type_kind() == TypeKind::Enumeration
            })
    }

    /// The class a descriptor refers to, ignoring its operators.
    pub(crate) fn class_of(&self, ty: &TypeInfo) -> Option<SymbolId> {
        if ty.kind != TypeKind::Type && !ty.kind.is_class_key() {
            return None;
        }
        let id = self.resolve_alias(ty.type_symbol?);
        self.symbol(id).is_class_like().then_some(id)
    }

    /// Number of inheritance edges from `derived` up to `base`, if `base`
    /// is a base of `derived`.
    pub(crate) fn base_distance(&self, derived: SymbolId, base: SymbolId) -> Option<u32> {
        let mut seen: SmallVec<[SymbolId; 8]> = SmallVec::new();
        let mut level: SmallVec<[SymbolId; 4]> = SmallVec::new();
        level.push(derived);
        let mut distance = 0;
        while !level.is_empty() {
            distance += 1;
            let mut next = SmallVec::new();
            for class in level {
                for edge in self.parents(class) {
                    if edge.base == base {
                        return Some(distance);
                    }
                    if !seen.contains(&edge.base) {
                        seen.push(edge.base);
                        next.push(edge.base);
                    }
                }
            }
            level = next;
        }
        None
    }

    /// Conversion through a converting constructor of the target class or
    /// a conversion function of the source class.
    fn user_defined_conversion(
        &self,
        arg: &TypeInfo,
        param: &TypeInfo,
    ) -> Option<ImplicitConversion> {
        let target = param.without_reference();
        let target_class = target
            .ptr_ops
            .is_empty()
            .then(|| self.class_of(&target))
            .flatten();
        let source_class = arg
            .ptr_ops
            .is_empty()
            .then(|| self.class_of(arg))
            .flatten();

        let mut by_constructor: SmallVec<[ConversionRank; 2]> = SmallVec::new();
        if let Some(class) = target_class {
            for ctor in self.converting_constructors(class) {
                let first = &self.parameters(ctor)[0];
                let first = self.flatten_type(&first.ty);
                if let Some(rank) = self.standard_conversion(arg, &first) {
                    by_constructor.push(rank);
                }
            }
        }

        let mut by_operator: SmallVec<[ConversionRank; 2]> = SmallVec::new();
        if let Some(class) = source_class {
            for member in self.contained_symbols(class) {
                let function = self.resolve_alias(*member);
                if !self.is_conversion_function(function) {
                    continue;
                }
                if let Some(result) = self.return_type(function) {
                    let result = self.flatten_type(result).without_reference();
                    if let Some(rank) = self.standard_conversion(&result, param) {
                        by_operator.push(rank);
                    }
                } else if target_class.is_some_and(|class| self.names_conversion_to(function, class))
                {
                    by_operator.push(ConversionRank::Exact);
                }
            }
        }

        if by_constructor.is_empty() && by_operator.is_empty() {
            return None;
        }
        let ambiguous = (!by_constructor.is_empty() && !by_operator.is_empty())
            || tied_best(&by_constructor)
            || tied_best(&by_operator);
        Some(ImplicitConversion {
            rank: ConversionRank::UserDefined,
            ambiguous,
        })
    }

    /// Non-explicit constructors of `class` callable with one argument.
    fn converting_constructors(&self, class: SymbolId) -> impl Iterator<Item = SymbolId> + '_ {
        let class_name = self.symbol(class).name;
        self.contained_symbols(class)
            .iter()
            .map(|member| self.resolve_alias(*member))
            .filter(move |&function| {
                let symbol = self.symbol(function);
                let Some(data) = symbol.callable() else {
                    return false;
                };
                let named = symbol.name.is_empty() || symbol.name == class_name;
                let params = data.effective_parameters();
                named
                    && symbol.is_function()
                    && !symbol.type_info.flags.contains(TypeFlags::EXPLICIT)
                    && !params.is_empty()
                    && params[1..].iter().all(|p| p.has_default)
            })
    }

    /// A member function spelled `operator T` that takes no arguments.
    fn is_conversion_function(&self, function: SymbolId) -> bool {
        let symbol = self.symbol(function);
        let spelled = self
            .name_of(function)
            .strip_prefix("operator")
            .is_some_and(|rest| rest.starts_with(char::is_whitespace) && !rest.trim().is_empty());
        spelled
            && symbol.is_function()
            && symbol
                .callable()
                .is_some_and(|data| data.effective_parameters().is_empty())
    }

    /// `operator Target` without a declared return type.
    fn names_conversion_to(&self, function: SymbolId, class: SymbolId) -> bool {
        self.name_of(function)
            .strip_prefix("operator")
            .is_some_and(|rest| rest.trim() == self.name_of(class))
    }
}

fn size_and_sign(ty: &TypeInfo) -> TypeFlags {
    let mut bits = ty.flags & (TypeFlags::SHORT | TypeFlags::LONG | TypeFlags::UNSIGNED);
    if ty.kind == TypeKind::Char {
        bits |= ty.flags & TypeFlags::SIGNED;
    }
    bits
}

/// `Exact` or `Qualification` between two types of the same shape;
/// top-level qualifiers are ignored.
fn qualification(arg: &TypeInfo, param: &TypeInfo) -> Option<ConversionRank> {
    let depth = arg.ptr_ops.len();
    if depth == 0 {
        return Some(ConversionRank::Exact);
    }
    let levels = |ty: &TypeInfo| -> SmallVec<[TypeFlags; 4]> {
        std::iter::once(ty.flags & TypeFlags::CV)
            .chain(ty.ptr_ops[..depth - 1].iter().map(|op| op.cv()))
            .collect()
    };
    let (from, to) = (levels(arg), levels(param));
    if from == to {
        Some(ConversionRank::Exact)
    } else if from.iter().zip(&to).all(|(f, t)| t.contains(*f)) {
        Some(ConversionRank::Qualification)
    } else {
        None
    }
}

/// Several routes share the best rank.
fn tied_best(routes: &[ConversionRank]) -> bool {
    routes
        .iter()
        .min()
        .is_some_and(|best| routes.iter().filter(|rank| *rank == best).count() > 1)
}
