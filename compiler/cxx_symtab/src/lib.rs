//! Symbol table and name resolution for C and C++.
//!
//! A parser or driver classifies declarations (kind, name, type, storage
//! class) and feeds them into a [`SymbolTable`]; the table answers the
//! semantic questions a C++ front end needs:
//!
//! - unqualified, qualified, elaborated and nested-name lookup, with
//!   using-directives, using-declarations and base-class subobjects
//! - overload resolution with implicit-conversion ranking and
//!   argument-dependent lookup
//! - template instantiation with defaults and specialization selection
//! - speculative parsing through [marks](SymbolTable::set_mark) that roll
//!   back every graph mutation
//!
//! # Ownership
//!
//! The table owns every symbol in one arena. Callers hold [`SymbolId`]
//! handles; containment, base classes and aliases are ids too, so the
//! graph may contain cycles without reference counting.
//!
//! # Errors
//!
//! Not finding a name is `Ok(None)`. Program errors (ambiguity, circular
//! inheritance) and driver misuse are [`SymbolTableError`]s.

mod error;
mod lookup;
mod options;
mod overload;
mod stack;
mod symbol;
mod table;
mod template;
mod transaction;
mod type_info;

pub use error::{InvalidUse, SymbolResult, SymbolTableError};
pub use options::{Language, TableOptions};
pub use overload::{ConversionRank, ImplicitConversion};
pub use symbol::{
    Access, CallableData, ClassData, InstanceInfo, Parameter, ParentEdge, ScopeData, Symbol,
    SymbolId, SymbolKind, TemplateData,
};
pub use table::SymbolTable;
pub use template::InstanceKey;
pub use transaction::{LogEntry, Mark};
pub use type_info::{DefaultArg, PtrOp, PtrOpKind, TypeFlags, TypeInfo, TypeKind};

pub use cxx_ir::Name;

#[cfg(target_pointer_width = "64")]
mod size_asserts {
    use super::SymbolId;
    cxx_ir::static_assert_size!(SymbolId, 4);
}
