//! Error taxonomy for table mutations and queries.
//!
//! Lookups that find nothing return `Ok(None)`; only program errors
//! (ambiguity, circular inheritance) and driver misuse are reported here.
//! A mutation that fails leaves the graph exactly as it was before the call.

use crate::SymbolId;

/// Result alias used by every fallible table operation.
pub type SymbolResult<T> = Result<T, SymbolTableError>;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SymbolTableError {
    /// Two or more equally valid declarations were found.
    #[error("`{name}` is ambiguous ({} candidates)", candidates.len())]
    Ambiguous {
        name: String,
        candidates: Vec<SymbolId>,
    },

    /// A base-class walk revisited a class already on the current path.
    #[error("circular inheritance through {symbol}")]
    CircularInheritance { symbol: SymbolId },

    #[error(transparent)]
    InvalidUse(#[from] InvalidUse),
}

impl SymbolTableError {
    /// Candidates of an ambiguity error, empty for every other kind.
    pub fn candidates(&self) -> &[SymbolId] {
        match self {
            SymbolTableError::Ambiguous { candidates, .. } => candidates,
            _ => &[],
        }
    }

    pub fn is_ambiguous(&self) -> bool {
        matches!(self, SymbolTableError::Ambiguous { .. })
    }

    pub fn is_circular_inheritance(&self) -> bool {
        matches!(self, SymbolTableError::CircularInheritance { .. })
    }
}

/// API misuse by the driver.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum InvalidUse {
    #[error("{symbol} is already attached to a scope")]
    AlreadyAttached { symbol: SymbolId },

    #[error("{symbol} cannot contain declarations")]
    NotAScope { symbol: SymbolId },

    #[error("{symbol} cannot have base classes")]
    NotInheritable { symbol: SymbolId },

    #[error("{base} cannot be used as a base class")]
    InvalidBase { base: SymbolId },

    #[error("redeclaration of `{name}`")]
    Redeclaration { name: String },

    #[error("{symbol} is not a namespace")]
    NotANamespace { symbol: SymbolId },

    #[error("no member named `{name}` for using-declaration")]
    UsingDeclarationNotFound { name: String },

    #[error("using-declaration of `{name}` does not name a member of a base class")]
    UsingDeclarationNotBaseMember { name: String },

    #[error("{symbol} is not a function or template")]
    NotACallable { symbol: SymbolId },

    #[error("{symbol} is not a template")]
    NotATemplate { symbol: SymbolId },

    #[error("too many template arguments: expected at most {expected}, found {found}")]
    TooManyTemplateArguments { expected: usize, found: usize },

    #[error("template argument {index} has no value and no default")]
    MissingTemplateArgument { index: usize },

    #[error("template {template} declares no member with its own name")]
    NoTemplateBody { template: SymbolId },

    #[error("argument for template parameter {param} is used as a base class but is not a class")]
    TemplateArgumentNotAClass { param: SymbolId },

    #[error("{symbol} belongs to a template instance and cannot be changed")]
    InstanceIsImmutable { symbol: SymbolId },

    #[error("enumeration {enumeration} must be attached before enumerators are added")]
    DetachedEnumeration { enumeration: SymbolId },

    #[error("{operation} is not supported in C")]
    UnsupportedInLanguage { operation: &'static str },
}
