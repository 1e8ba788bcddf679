//! Indentation stack resolver
//!
//! Folds scanned lines left to right and gives each one the index of its
//! nearest enclosing, strictly less indented, eligible line. The stack of open
//! scopes is implicit: it is the `outer` chain of the current scope, so popping
//! a scope is following one `outer` link. Every pop undoes an earlier push, so
//! the whole pass is amortized O(n).

use crate::scanner::ScannedLine;
use crate::types::{LineKind, LineRecord};

/// Cursor carried from one line to the next
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct ResolverState {
    /// Scope the next line belongs to unless its indentation says otherwise
    current_outer: Option<u32>,
    /// Indentation of the most recent eligible line (or of the scope popped to)
    previous_indentation: u32,
    last_eligible: Option<u32>,
}

impl ResolverState {
    /// Resolve `line` (at position `records.len()`) and append its record
    pub(crate) fn push_line(&mut self, records: &mut Vec<LineRecord>, line: ScannedLine) {
        let index = records.len() as u32;
        let eligible = line.kind.is_eligible();
        let indentation = if line.kind == LineKind::Blank {
            self.previous_indentation
        } else {
            line.indentation
        };

        if eligible {
            if indentation < self.previous_indentation {
                self.pop_to(records, indentation);
            } else if indentation > self.previous_indentation {
                self.current_outer = self.last_eligible;
            }
        }

        debug_assert!(self.current_outer.map_or(true, |outer| outer < index));
        records.push(LineRecord {
            indentation,
            outer: self.current_outer,
            span: line.span,
            kind: line.kind,
        });

        if eligible {
            self.previous_indentation = indentation;
            self.last_eligible = Some(index);
        }
    }

    /// Close every open scope whose header is indented at least as far as `indentation`
    fn pop_to(&mut self, records: &[LineRecord], indentation: u32) {
        while let Some(outer) = self.current_outer {
            let header = &records[outer as usize];
            if header.indentation < indentation {
                break;
            }
            self.current_outer = header.outer;
            self.previous_indentation = self
                .current_outer
                .map_or(0, |o| records[o as usize].indentation);
        }
    }
}

/// Resolve a full sequence of scanned lines
pub(crate) fn resolve<I>(lines: I, capacity: usize) -> Vec<LineRecord>
where
    I: IntoIterator<Item = ScannedLine>,
{
    let mut records = Vec::with_capacity(capacity);
    let mut state = ResolverState::default();
    for line in lines {
        state.push_line(&mut records, line);
    }
    records
}
