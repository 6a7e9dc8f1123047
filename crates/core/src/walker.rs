//! Loading-context hierarchy walk.
//!
//! The walk is lazy, pre-order and cycle-safe. Parents are dispatched over
//! [`ParentLinks`]; a context whose parents cannot be introspected is a leaf.

use classcope_api::{ContextId, ContextRef, ParentLinks};
use std::collections::HashSet;
use std::iter::FusedIterator;
use tracing::debug;

/// Non-restartable sequence of contexts reachable from a root
pub struct ContextWalk<'v> {
    pending: Vec<ContextRef>,
    visited: &'v mut HashSet<ContextId>,
}

/// Walk `root` and its ancestors, skipping anything already in `visited`
pub fn walk(root: ContextRef, visited: &mut HashSet<ContextId>) -> ContextWalk<'_> {
    ContextWalk {
        pending: vec![root],
        visited,
    }
}

impl Iterator for ContextWalk<'_> {
    type Item = ContextRef;

    fn next(&mut self) -> Option<ContextRef> {
        while let Some(context) = self.pending.pop() {
            if !self.visited.insert(context.id()) {
                continue;
            }

            match context.parents() {
                Ok(ParentLinks::None) => {}
                Ok(ParentLinks::Single(parent)) => self.pending.push(parent),
                Ok(ParentLinks::Multi(parents)) => {
                    // Stack: reversed so the first parent is visited first
                    self.pending.extend(parents.into_iter().rev());
                }
                Err(e) => {
                    debug!("Treating {} as a leaf: {}", context.name(), e);
                }
            }

            return Some(context);
        }
        None
    }
}

impl FusedIterator for ContextWalk<'_> {}
