//! Shared identifier types for the C/C++ symbol table.
//!
//! Every declaration name that enters the engine is interned once and
//! carried around as a 32-bit [`Name`]. Equality and hashing are O(1) and
//! the string itself is only materialized for diagnostics.
//!
//! # Pre-interned names
//!
//! - `""` is always [`Name::EMPTY`] (constructors and unnamed parameters).
//! - `"this"` is always [`Name::THIS`] (the implicit object pointer).

/// Compile-time assertion that a type has a specific size.
///
/// Used to prevent accidental size regressions in frequently-allocated types.
#[macro_export]
macro_rules! static_assert_size {
    ($ty:ty, $size:expr) => {
        const _: [(); $size] = [(); ::std::mem::size_of::<$ty>()];
    };
}

mod interner;
mod name;

pub use interner::{InternError, StringInterner};
pub use name::Name;

#[cfg(target_pointer_width = "64")]
mod size_asserts {
    use super::Name;
    static_assert_size!(Name, 4);
}
