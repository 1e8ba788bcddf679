use crate::error::{Result, ScopeError};
use crate::types::{ChainEntry, ContextChain, LineKind, LineRecord};

/// Ancestors of `index`, innermost first, straight from the `outer` links
fn ancestors(records: &[LineRecord], index: usize) -> impl Iterator<Item = u32> + '_ {
    std::iter::successors(records[index].outer, move |&outer| {
        records[outer as usize].outer
    })
}

/// Replace a bare `{` ancestor by the line it belongs to.
///
/// Scans backward in line order (not along `outer`) for the nearest eligible,
/// non-brace line indented no deeper than the brace. `None` when the scan runs
/// off the start of the buffer.
fn informative_ancestor(records: &[LineRecord], index: u32) -> Option<u32> {
    let brace = &records[index as usize];
    if brace.kind != LineKind::Brace {
        return Some(index);
    }

    records[..index as usize]
        .iter()
        .rposition(|record| {
            record.kind == LineKind::Code && record.indentation <= brace.indentation
        })
        .map(|found| found as u32)
}

/// Build the context chain of line `target` (0-based).
///
/// Entries run outermost to innermost with strictly increasing indices.
/// Ancestors fewer than `window` lines above the target are left out and
/// reported through [`ContextChain::elided`].
pub fn context_chain(records: &[LineRecord], target: usize, window: u32) -> Result<ContextChain> {
    if target >= records.len() {
        return Err(ScopeError::out_of_range(target, records.len()));
    }

    let depth = ancestors(records, target).count();
    let mut reported: Vec<u32> = Vec::with_capacity(depth);

    // innermost first; a substitute may jump above ancestors still to come
    let mut floor = target as u32;
    for outer in ancestors(records, target) {
        let Some(index) = informative_ancestor(records, outer) else {
            continue;
        };
        if index >= floor {
            continue;
        }
        reported.push(index);
        floor = index;
    }
    reported.reverse();

    let mut elided = false;
    let entries = reported
        .into_iter()
        .filter(|&index| {
            let near = (target as u32 - index) < window;
            elided |= near;
            !near
        })
        .map(|index| ChainEntry::new(index, &records[index as usize]))
        .collect();

    Ok(ContextChain { entries, elided })
}
