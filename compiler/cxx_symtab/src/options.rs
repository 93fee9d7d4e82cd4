//! Table configuration.

/// Source language whose rules the table enforces.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Language {
    /// C: no namespaces-by-directive, no inheritance, no templates, no ADL.
    C,
    /// C++ (2003 core language).
    #[default]
    Cpp,
}

/// Options fixed at table construction.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TableOptions {
    pub language: Language,
    /// Reject cycle-closing base edges in `add_parent`. When off, cycles are
    /// accepted and reported by the lookups that run into them.
    pub eager_cycle_check: bool,
    /// Upper bound on typedef/variable indirections followed while
    /// flattening a type descriptor.
    pub max_typedef_depth: u32,
}

impl TableOptions {
    /// Default options for the given language.
    pub fn for_language(language: Language) -> Self {
        TableOptions {
            language,
            ..TableOptions::default()
        }
    }

    #[inline]
    pub fn is_cpp(&self) -> bool {
        self.language == Language::Cpp
    }
}

impl Default for TableOptions {
    fn default() -> Self {
        TableOptions {
            language: Language::Cpp,
            eager_cycle_check: true,
            max_typedef_depth: 64,
        }
    }
}
