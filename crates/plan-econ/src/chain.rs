//! Chain resolution: how much of every downstream good a starting quantity
//! can become.

use plan_core::{GoodId, ProcessId, Repository};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, trace};

/// A good reached during chain resolution.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChainStep {
    pub good_id: GoodId,
    pub good_name: String,
    /// Quantity obtainable at this point of the chain.
    pub quantity: Decimal,
    /// Recursion depth; the starting good is stage 0.
    pub stage: u32,
}

/// Expand `quantity` of `start` through every process that consumes it,
/// recursively, and list the goods reached in depth-first pre-order.
///
/// Each process is expanded at most once per call, which bounds the walk on
/// cyclic recipe graphs; a good may still appear at several stages when
/// different processes reach it. The cycle count derived at each step is not
/// capped by the process' monthly throughput.
///
/// Unknown goods are not listed but do not stop the walk. Processes whose
/// matching input quantity is not positive are skipped.
pub fn resolve_chain<R: Repository + ?Sized>(
    repo: &R,
    start: &GoodId,
    quantity: Decimal,
) -> Vec<ChainStep> {
    let mut walk = ChainWalk {
        repo,
        visited: BTreeSet::new(),
        steps: Vec::new(),
    };
    walk.expand(start, quantity, 0);
    debug!(
        start = %start,
        steps = walk.steps.len(),
        processes = walk.visited.len(),
        "chain resolved"
    );
    walk.steps
}

struct ChainWalk<'r, R: Repository + ?Sized> {
    repo: &'r R,
    visited: BTreeSet<&'r ProcessId>,
    steps: Vec<ChainStep>,
}

impl<'r, R: Repository + ?Sized> ChainWalk<'r, R> {
    fn expand(&mut self, good_id: &GoodId, available: Decimal, stage: u32) {
        let repo = self.repo;
        match repo.good(good_id) {
            Some(good) => self.steps.push(ChainStep {
                good_id: good_id.clone(),
                good_name: good.name.clone(),
                quantity: available,
                stage,
            }),
            None => debug!(good = %good_id, stage, "unknown good, not listed"),
        }

        for process in repo.processes_consuming(good_id) {
            // Marked before recursing so a cycle back to this process stops here.
            if !self.visited.insert(&process.id) {
                trace!(process = %process.id, "already expanded");
                continue;
            }
            let Some(input) = process.input_for(good_id) else {
                continue;
            };
            if input.quantity_per_cycle <= Decimal::ZERO {
                debug!(
                    process = %process.id,
                    good = %good_id,
                    "non-positive input ratio, skipped"
                );
                continue;
            }
            let Some(cycles) = available.checked_div(input.quantity_per_cycle) else {
                debug!(process = %process.id, "cycle count out of range, skipped");
                continue;
            };
            for output in &process.outputs {
                match cycles.checked_mul(output.quantity_per_cycle) {
                    Some(produced) => self.expand(&output.good_id, produced, stage + 1),
                    None => debug!(
                        process = %process.id,
                        good = %output.good_id,
                        "output out of range, skipped"
                    ),
                }
            }
        }
    }
}
