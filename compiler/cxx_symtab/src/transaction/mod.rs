//! Mutation journal for speculative parsing.
//!
//! # Design
//!
//! Every graph mutation appends a [`LogEntry`] naming what to undo. A
//! [`Mark`] remembers the log length at the time it was set; rolling back
//! replays the entries after that position in reverse. Marks nest: rolling
//! back to an older mark invalidates every younger one, and committing a
//! mark folds its entries into the next older mark.
//!
//! Entries are only recorded while at least one mark is live. Type
//! descriptor setters are not journaled.

use crate::symbol::SymbolId;
use crate::template::InstanceKey;
use crate::type_info::TypeInfo;
use crate::SymbolTable;

/// Checkpoint returned by [`SymbolTable::set_mark`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Mark {
    id: u64,
}

/// A journaled mutation and the operands needed to reverse it.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LogEntry {
    AddSymbol {
        scope: SymbolId,
        symbol: SymbolId,
    },
    AddEnumerator {
        enumeration: SymbolId,
        scope: SymbolId,
        symbol: SymbolId,
        previous: Box<TypeInfo>,
    },
    AddParent {
        class: SymbolId,
    },
    AddUsingDirective {
        scope: SymbolId,
    },
    AddUsingDeclaration {
        scope: SymbolId,
        alias: SymbolId,
    },
    AddParameter {
        callable: SymbolId,
    },
    AddTemplateParameter {
        template: SymbolId,
        param: SymbolId,
    },
    AddSpecialization {
        template: SymbolId,
        specialization: SymbolId,
    },
    AddSpecializationArgument {
        specialization: SymbolId,
    },
    CacheInstance {
        key: InstanceKey,
    },
}

#[derive(Copy, Clone, Debug)]
struct LiveMark {
    id: u64,
    position: usize,
}

#[derive(Debug, Default)]
pub(crate) struct TransactionLog {
    entries: Vec<LogEntry>,
    marks: Vec<LiveMark>,
    next_mark: u64,
}

impl TransactionLog {
    #[inline]
    pub(crate) fn is_recording(&self) -> bool {
        !self.marks.is_empty()
    }

    pub(crate) fn record(&mut self, entry: LogEntry) {
        if self.is_recording() {
            self.entries.push(entry);
        }
    }

    fn set_mark(&mut self) -> Mark {
        let id = self.next_mark;
        self.next_mark += 1;
        self.marks.push(LiveMark {
            id,
            position: self.entries.len(),
        });
        Mark { id }
    }

    fn position_of(&self, mark: Mark) -> Option<usize> {
        self.marks.iter().position(|live| live.id == mark.id)
    }

    /// Drop `mark` and every younger mark, returning the entries to undo
    /// (oldest first).
    fn take_since(&mut self, mark: Mark) -> Option<Vec<LogEntry>> {
        let index = self.position_of(mark)?;
        let position = self.marks[index].position;
        self.marks.truncate(index);
        let undo = self.entries.split_off(position);
        if self.marks.is_empty() {
            self.entries.clear();
        }
        Some(undo)
    }

    fn commit(&mut self, mark: Mark) -> bool {
        let Some(index) = self.position_of(mark) else {
            return false;
        };
        self.marks.remove(index);
        if self.marks.is_empty() {
            self.entries.clear();
        }
        true
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn live_marks(&self) -> usize {
        self.marks.len()
    }
}

impl SymbolTable {
    /// Start journaling from the current state.
    pub fn set_mark(&mut self) -> Mark {
        let mark = self.log.set_mark();
        tracing::trace!(?mark, log_len = self.log.len(), "mark set");
        mark
    }

    /// Undo every mutation made since `mark` was set.
    ///
    /// Returns `false` (and changes nothing) if `mark` is no longer live.
    pub fn roll_back(&mut self, mark: Mark) -> bool {
        let Some(undo) = self.log.take_since(mark) else {
            tracing::debug!(?mark, "roll back of stale mark");
            return false;
        };
        tracing::debug!(?mark, entries = undo.len(), "rolling back");
        for entry in undo.into_iter().rev() {
            self.undo(entry);
        }
        true
    }

    /// Give up the ability to roll back to `mark`.
    ///
    /// Returns `false` if `mark` is no longer live.
    pub fn commit(&mut self, mark: Mark) -> bool {
        let committed = self.log.commit(mark);
        tracing::debug!(?mark, committed, "commit");
        committed
    }

    /// Number of journaled entries.
    pub fn log_len(&self) -> usize {
        self.log.len()
    }

    /// Number of marks that can still be rolled back or committed.
    pub fn live_marks(&self) -> usize {
        self.log.live_marks()
    }

    fn undo(&mut self, entry: LogEntry) {
        match entry {
            LogEntry::AddSymbol { scope, symbol }
            | LogEntry::AddUsingDeclaration {
                scope,
                alias: symbol,
            } => self.detach(scope, symbol),
            LogEntry::AddEnumerator {
                enumeration,
                scope,
                symbol,
                previous,
            } => {
                self.detach(scope, symbol);
                if let Some(data) = self.symbol_mut(enumeration).scope_mut() {
                    data.enumerators.retain(|id| *id != symbol);
                }
                self.symbol_mut(symbol).type_info = *previous;
            }
            LogEntry::AddParent { class } => {
                if let Some(data) = self.symbol_mut(class).class_mut() {
                    data.parents.pop();
                }
            }
            LogEntry::AddUsingDirective { scope } => {
                if let Some(data) = self.symbol_mut(scope).scope_mut() {
                    data.using_directives.pop();
                }
            }
            LogEntry::AddParameter { callable } => {
                if let Some(data) = self.symbol_mut(callable).callable_mut() {
                    data.parameters.pop();
                }
            }
            LogEntry::AddTemplateParameter { template, param } => {
                if let Some(data) = self.symbol_mut(template).callable_mut() {
                    data.template.params.pop();
                }
                self.detach(template, param);
            }
            LogEntry::AddSpecialization {
                template,
                specialization,
            } => {
                if let Some(data) = self.symbol_mut(template).callable_mut() {
                    data.template.specializations.pop();
                }
                let entry = self.symbol_mut(specialization);
                entry.container = None;
                if let Some(data) = entry.callable_mut() {
                    data.template.primary = None;
                }
            }
            LogEntry::AddSpecializationArgument { specialization } => {
                if let Some(data) = self.symbol_mut(specialization).callable_mut() {
                    data.template.pattern.pop();
                }
            }
            LogEntry::CacheInstance { key } => {
                self.instances.remove(&key);
            }
        }
    }

    fn detach(&mut self, scope: SymbolId, symbol: SymbolId) {
        let name = self.symbol(symbol).name;
        if let Some(data) = self.symbol_mut(scope).scope_mut() {
            data.remove(name, symbol);
        }
        self.symbol_mut(symbol).container = None;
    }
}
