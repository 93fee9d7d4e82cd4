//! String interner for declaration names.
//!
//! Names are interned once when a symbol is created and compared as
//! integers from then on. The table only needs single-writer access, but
//! the interner is shared by reference between the table and its callers,
//! so interior mutability goes through a `parking_lot::RwLock`.

use super::Name;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

/// Error when interning a string fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InternError {
    #[error("interner exceeded capacity: {count} strings, max is {max}", max = u32::MAX)]
    Overflow { count: usize },
}

#[derive(Default)]
struct InternTable {
    map: FxHashMap<&'static str, u32>,
    strings: Vec<&'static str>,
}

impl InternTable {
    fn push(&mut self, s: &'static str) -> Result<Name, InternError> {
        let index = u32::try_from(self.strings.len()).map_err(|_| InternError::Overflow {
            count: self.strings.len(),
        })?;
        self.strings.push(s);
        self.map.insert(s, index);
        Ok(Name::from_raw(index))
    }
}

/// String interner with O(1) lookup in both directions.
///
/// Interned strings are leaked and live for the rest of the process.
pub struct StringInterner {
    table: RwLock<InternTable>,
}

impl StringInterner {
    /// Create a new interner with `""` and `"this"` pre-interned.
    pub fn new() -> Self {
        let mut table = InternTable::default();
        table.strings.reserve(256);
        for s in ["", "this"] {
            let index = u32::try_from(table.strings.len()).unwrap_or(u32::MAX);
            table.strings.push(s);
            table.map.insert(s, index);
        }
        debug_assert_eq!(table.map.get("this"), Some(&Name::THIS.raw()));
        StringInterner {
            table: RwLock::new(table),
        }
    }

    /// Try to intern a string, returning its Name or an error on overflow.
    pub fn try_intern(&self, s: &str) -> Result<Name, InternError> {
        if let Some(name) = self.get(s) {
            return Ok(name);
        }

        let mut guard = self.table.write();
        // Another caller may have inserted it between the locks.
        if let Some(&index) = guard.map.get(s) {
            return Ok(Name::from_raw(index));
        }
        let leaked: &'static str = Box::leak(s.to_owned().into_boxed_str());
        guard.push(leaked)
    }

    /// Intern a string, returning its Name.
    ///
    /// # Panics
    /// Panics if the interner exceeds capacity. Use `try_intern` for
    /// fallible interning.
    #[inline]
    pub fn intern(&self, s: &str) -> Name {
        self.try_intern(s).unwrap_or_else(|e| panic!("{}", e))
    }

    /// Name for `s` if it was interned before, without interning it.
    pub fn get(&self, s: &str) -> Option<Name> {
        self.table.read().map.get(s).copied().map(Name::from_raw)
    }

    /// Look up the string for a Name.
    ///
    /// Names from a different interner resolve to `"<unknown>"`.
    pub fn lookup(&self, name: Name) -> &'static str {
        self.table
            .read()
            .strings
            .get(name.index())
            .copied()
            .unwrap_or("<unknown>")
    }

    /// Number of interned strings, including the pre-interned ones.
    pub fn len(&self) -> usize {
        self.table.read().strings.len()
    }

    /// Whether only the pre-interned strings are present.
    pub fn is_empty(&self) -> bool {
        self.len() <= 2
    }
}

impl Default for StringInterner {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for StringInterner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StringInterner")
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}
