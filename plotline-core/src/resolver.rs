//! Dependency ordering for bound functions.
//!
//! A function that calls another must be sampled after its callee, so that
//! the callee's value array exists when the caller indexes it. The resolver
//! performs a depth-first topological sort over the call graph. A back edge
//! marks the whole cycle invalid; functions that depend on an invalid
//! function (directly or transitively) are excluded as well, each with its
//! own diagnostic.
//!
//! Iteration follows the caller-supplied id slice, so the returned order is
//! deterministic for a given document.

use std::collections::{HashMap, HashSet};

use crate::bound::BoundFunction;
use crate::diagnostics::{DiagnosticBag, DiagnosticCategory};
use crate::symbols::FunctionId;

const IN_PROGRESS: u8 = 1;
const DONE: u8 = 2;

/// Compute the evaluation order for the given functions.
///
/// `ids` lists every function of the pass in document order; `bound` maps
/// each id to its bound form (`None` when binding failed this pass, which
/// excludes the function but is not itself an ordering error). Cycle
/// diagnostics are appended to `diagnostics` per offending id. The returned
/// order contains exactly the ids that are bound and cycle-free.
pub fn evaluation_order(
    ids: &[FunctionId],
    bound: &HashMap<FunctionId, Option<BoundFunction>>,
    diagnostics: &mut HashMap<FunctionId, DiagnosticBag>,
) -> Vec<FunctionId> {
    let mut states: HashMap<FunctionId, u8> = HashMap::new();
    let mut invalid: HashSet<FunctionId> = HashSet::new();
    let mut order = Vec::new();

    for &id in ids {
        visit(id, bound, &mut states, &mut invalid, &mut order, diagnostics);
    }

    order
}

/// Returns true when `id` is usable as a dependency.
fn visit(
    id: FunctionId,
    bound: &HashMap<FunctionId, Option<BoundFunction>>,
    states: &mut HashMap<FunctionId, u8>,
    invalid: &mut HashSet<FunctionId>,
    order: &mut Vec<FunctionId>,
    diagnostics: &mut HashMap<FunctionId, DiagnosticBag>,
) -> bool {
    match states.get(&id) {
        Some(&IN_PROGRESS) => {
            // Back edge: this node closes a cycle.
            diagnostics
                .entry(id)
                .or_default()
                .add(DiagnosticCategory::Bind, "cyclic dependency detected");
            invalid.insert(id);
            return false;
        }
        Some(&DONE) => return !invalid.contains(&id),
        _ => {}
    }

    let Some(Some(function)) = bound.get(&id) else {
        // Unbound this pass; calls to it evaluate to NaN, not an ordering
        // error, so it neither enters the order nor poisons callers.
        states.insert(id, DONE);
        return false;
    };

    states.insert(id, IN_PROGRESS);

    let mut poisoned = false;
    for dependency in function.expression.dependencies() {
        let usable = visit(dependency, bound, states, invalid, order, diagnostics);
        if !usable && invalid.contains(&dependency) {
            poisoned = true;
        }
    }

    states.insert(id, DONE);

    // A self cycle marks the node invalid while it is still in progress;
    // keep that verdict.
    if invalid.contains(&id) {
        poisoned = true;
    }

    if poisoned {
        diagnostics
            .entry(id)
            .or_default()
            .add(DiagnosticCategory::Bind, "depends on a cyclic function");
        invalid.insert(id);
        return false;
    }

    order.push(id);
    true
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
