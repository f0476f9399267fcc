//! Input requirements of a process running at full throughput.

use crate::{EconError, MONTHS_PER_YEAR};
use plan_core::{GoodId, ProcessId, Repository};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

const UNKNOWN: &str = "Unknown";

/// Amount of one input good needed over a period.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InputRequirement {
    pub good_id: GoodId,
    pub good_name: String,
    pub quantity: Decimal,
    pub unit: String,
}

/// Monthly and yearly input requirements, one entry per input edge.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CapacityReport {
    pub process_id: ProcessId,
    pub process_name: String,
    pub inputs_per_month: Vec<InputRequirement>,
    pub inputs_per_year: Vec<InputRequirement>,
}

/// Inputs required to run `process_id` at its full `cycles_per_month`.
///
/// Inputs whose good is unknown are still reported, named "Unknown". An input
/// whose yearly quantity does not fit in a `Decimal` is left out of both lists.
pub fn project_capacity<R: Repository + ?Sized>(
    repo: &R,
    process_id: &ProcessId,
) -> Result<CapacityReport, EconError> {
    let process = repo
        .process(process_id)
        .ok_or_else(|| EconError::ProcessNotFound(process_id.0.clone()))?;

    let mut inputs_per_month = Vec::with_capacity(process.inputs.len());
    let mut inputs_per_year = Vec::with_capacity(process.inputs.len());
    for input in &process.inputs {
        let (good_name, unit) = match repo.good(&input.good_id) {
            Some(g) => (g.name.clone(), g.unit.clone()),
            None => (UNKNOWN.to_string(), UNKNOWN.to_string()),
        };
        let Some((monthly, yearly)) = input
            .quantity_per_cycle
            .checked_mul(process.cycles_per_month)
            .and_then(|m| Some((m, m.checked_mul(Decimal::from(MONTHS_PER_YEAR))?)))
        else {
            debug!(
                process = %process_id,
                good = %input.good_id,
                "input requirement out of range, skipped"
            );
            continue;
        };
        inputs_per_month.push(InputRequirement {
            good_id: input.good_id.clone(),
            good_name: good_name.clone(),
            quantity: monthly,
            unit: unit.clone(),
        });
        inputs_per_year.push(InputRequirement {
            good_id: input.good_id.clone(),
            good_name,
            quantity: yearly,
            unit,
        });
    }

    Ok(CapacityReport {
        process_id: process_id.clone(),
        process_name: process.name.clone(),
        inputs_per_month,
        inputs_per_year,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{bakery_chain, d};
    use catalog::Catalog;
    use plan_core::Process;
    use proptest::prelude::*;

    #[test]
    fn milling_full_capacity() {
        let repo = bakery_chain();
        let r = project_capacity(&repo, &ProcessId::new("milling")).unwrap();
        assert_eq!(r.process_name, "Milling");
        assert_eq!(r.inputs_per_month.len(), 1);
        let m = &r.inputs_per_month[0];
        assert_eq!(m.good_id, GoodId::new("wheat"));
        assert_eq!(m.good_name, "Wheat");
        assert_eq!(m.unit, "Liter");
        assert_eq!(m.quantity, d(100_000));
        assert_eq!(r.inputs_per_year[0].quantity, d(1_200_000));
    }

    #[test]
    fn unknown_process_is_not_found() {
        let repo = bakery_chain();
        assert_eq!(
            project_capacity(&repo, &ProcessId::new("ghost")),
            Err(EconError::ProcessNotFound("ghost".into()))
        );
    }

    #[test]
    fn unknown_input_good_is_labelled() {
        let mut repo = Catalog::new();
        repo.upsert_process(Process::new("p", "P", d(4)).with_input("mystery", d(3)));
        let r = project_capacity(&repo, &ProcessId::new("p")).unwrap();
        assert_eq!(r.inputs_per_month[0].good_name, "Unknown");
        assert_eq!(r.inputs_per_month[0].unit, "Unknown");
        assert_eq!(r.inputs_per_month[0].quantity, d(12));
    }

    #[test]
    fn source_process_has_no_inputs() {
        let mut repo = Catalog::new();
        repo.upsert_process(Process::new("well", "Well", d(50)).with_output("water", d(100)));
        let r = project_capacity(&repo, &ProcessId::new("well")).unwrap();
        assert!(r.inputs_per_month.is_empty());
        assert!(r.inputs_per_year.is_empty());
    }

    #[test]
    fn out_of_range_inputs_are_left_out() {
        let mut repo = Catalog::new();
        let cycles = Decimal::MAX / d(10);
        repo.upsert_process(
            Process::new("p", "P", cycles)
                .with_input("monthly-overflow", d(20))
                .with_input("yearly-overflow", d(1))
                .with_input("tiny", Decimal::new(1, 20)),
        );
        let r = project_capacity(&repo, &ProcessId::new("p")).unwrap();
        assert_eq!(r.inputs_per_month.len(), 1);
        assert_eq!(r.inputs_per_year.len(), 1);
        assert_eq!(r.inputs_per_month[0].good_id, GoodId::new("tiny"));
        assert_eq!(r.inputs_per_year[0].quantity, r.inputs_per_month[0].quantity * d(12));
    }

    proptest! {
        #[test]
        fn yearly_is_twelve_months(
            cycles in 0i64..100_000,
            q1 in 1i64..1_000_000,
            q2 in 1i64..1_000_000,
        ) {
            let mut repo = Catalog::new();
            repo.upsert_process(
                Process::new("p", "P", Decimal::new(cycles, 1))
                    .with_input("a", Decimal::new(q1, 3))
                    .with_input("b", d(q2)),
            );
            let r = project_capacity(&repo, &ProcessId::new("p")).unwrap();
            prop_assert_eq!(r.inputs_per_month.len(), 2);
            for (m, y) in r.inputs_per_month.iter().zip(&r.inputs_per_year) {
                prop_assert_eq!(&m.good_id, &y.good_id);
                prop_assert_eq!(y.quantity, m.quantity * d(12));
            }
        }
    }
}
