//! Revenue aggregation over a portfolio of processes.

use crate::DEFAULT_RUNTIME_MONTHS;
use plan_core::{Process, ProcessId, Repository};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

fn default_runtime_months() -> Decimal {
    DEFAULT_RUNTIME_MONTHS
}

/// Processes to evaluate together and for how long.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RevenueRequest {
    pub process_ids: Vec<ProcessId>,
    /// Defaults to one month.
    #[serde(default = "default_runtime_months")]
    pub runtime_months: Decimal,
}

/// Per-process figures over the requested runtime.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProcessRevenue {
    pub process_id: ProcessId,
    pub process_name: String,
    pub cycles_run: Decimal,
    pub fixed_costs: Decimal,
    pub variable_costs: Decimal,
    pub facility_costs: Decimal,
    /// Sales value of all outputs.
    pub revenue: Decimal,
}

impl ProcessRevenue {
    /// Sum of the three cost categories, or `None` if it leaves the decimal range.
    pub fn total_costs(&self) -> Option<Decimal> {
        self.fixed_costs
            .checked_add(self.variable_costs)?
            .checked_add(self.facility_costs)
    }
}

/// Per-process entries plus cost totals by category.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RevenueBreakdown {
    pub processes: Vec<ProcessRevenue>,
    pub total_fixed_costs: Decimal,
    pub total_variable_costs: Decimal,
    pub total_facility_costs: Decimal,
}

/// Portfolio result.
///
/// `net_revenue == gross_revenue - production_costs` and `production_costs`
/// equals the sum of the three breakdown totals.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RevenueReport {
    pub gross_revenue: Decimal,
    pub production_costs: Decimal,
    pub net_revenue: Decimal,
    pub breakdown: RevenueBreakdown,
}

impl RevenueReport {
    /// Adds `entry` to the report. The report is left untouched when any
    /// running total would leave the decimal range.
    fn push_checked(&mut self, entry: ProcessRevenue) -> Option<()> {
        let b = &self.breakdown;
        let gross = self.gross_revenue.checked_add(entry.revenue)?;
        let costs = self.production_costs.checked_add(entry.total_costs()?)?;
        let net = gross.checked_sub(costs)?;
        let fixed = b.total_fixed_costs.checked_add(entry.fixed_costs)?;
        let variable = b.total_variable_costs.checked_add(entry.variable_costs)?;
        let facility = b.total_facility_costs.checked_add(entry.facility_costs)?;

        self.gross_revenue = gross;
        self.production_costs = costs;
        self.net_revenue = net;
        self.breakdown.total_fixed_costs = fixed;
        self.breakdown.total_variable_costs = variable;
        self.breakdown.total_facility_costs = facility;
        self.breakdown.processes.push(entry);
        Some(())
    }
}

impl RevenueRequest {
    pub fn evaluate<R: Repository + ?Sized>(&self, repo: &R) -> RevenueReport {
        aggregate_revenue(repo, &self.process_ids, self.runtime_months)
    }
}

/// Run every listed process at full throughput for `runtime_months` and
/// total revenue and costs.
///
/// Processes are evaluated in the given order; ids unknown to `repo` are
/// skipped. Revenue prices every output at its good's price per 1000 units;
/// outputs whose good is unknown sell for nothing. Facility costs are charged
/// for every facility hosting the process. A process whose figures, or whose
/// contribution to the totals, would leave the decimal range is skipped.
pub fn aggregate_revenue<R: Repository + ?Sized>(
    repo: &R,
    process_ids: &[ProcessId],
    runtime_months: Decimal,
) -> RevenueReport {
    let mut report = RevenueReport::default();

    for id in process_ids {
        let Some(process) = repo.process(id) else {
            debug!(process = %id, "unknown process, skipped");
            continue;
        };
        let Some(entry) = evaluate_process(repo, process, runtime_months) else {
            debug!(process = %id, "figures out of range, skipped");
            continue;
        };
        if report.push_checked(entry).is_none() {
            debug!(process = %id, "totals out of range, skipped");
        }
    }

    debug!(
        processes = report.breakdown.processes.len(),
        gross = %report.gross_revenue,
        net = %report.net_revenue,
        "revenue aggregated"
    );
    report
}

fn evaluate_process<R: Repository + ?Sized>(
    repo: &R,
    process: &Process,
    months: Decimal,
) -> Option<ProcessRevenue> {
    let cycles_run = process.cycles_per_month.checked_mul(months)?;
    let fixed_costs = process.fixed_costs_per_month.checked_mul(months)?;
    let variable_costs = process.variable_costs_per_cycle.checked_mul(cycles_run)?;

    let mut facility_costs = Decimal::ZERO;
    for facility in repo.facilities_hosting(&process.id) {
        let rent = facility.building_costs_per_month.checked_mul(months)?;
        facility_costs = facility_costs.checked_add(rent)?;
    }

    let mut revenue = Decimal::ZERO;
    for output in &process.outputs {
        let Some(good) = repo.good(&output.good_id) else {
            debug!(
                process = %process.id,
                good = %output.good_id,
                "unknown output good, unpriced"
            );
            continue;
        };
        let sold = cycles_run
            .checked_mul(output.quantity_per_cycle)?
            .checked_mul(good.unit_price())?;
        revenue = revenue.checked_add(sold)?;
    }

    Some(ProcessRevenue {
        process_id: process.id.clone(),
        process_name: process.name.clone(),
        cycles_run,
        fixed_costs,
        variable_costs,
        facility_costs,
        revenue,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{bakery_chain, d};
    use catalog::Catalog;
    use plan_core::{Facility, Good, Process};
    use proptest::prelude::*;

    fn pid(s: &str) -> ProcessId {
        ProcessId::new(s)
    }

    #[test]
    fn milling_one_month() {
        let mut repo = Catalog::new();
        repo.upsert_good(Good::new("wheat", "Wheat", d(500)));
        repo.upsert_good(Good::new("flour", "Flour", d(800)));
        repo.upsert_process(
            Process::new("milling", "Milling", d(100))
                .with_costs(d(1000), d(5))
                .with_input("wheat", d(1000))
                .with_output("flour", d(800)),
        );
        let r = aggregate_revenue(&repo, &[pid("milling")], d(1));
        let p = &r.breakdown.processes[0];
        assert_eq!(p.cycles_run, d(100));
        assert_eq!(p.fixed_costs, d(1000));
        assert_eq!(p.variable_costs, d(500));
        assert_eq!(p.facility_costs, Decimal::ZERO);
        assert_eq!(p.revenue, d(64_000));
        assert_eq!(r.production_costs, d(1500));
        assert_eq!(r.net_revenue, d(62_500));
    }

    #[test]
    fn facility_costs_from_every_hosting_facility() {
        let repo = bakery_chain();
        let r = aggregate_revenue(&repo, &[pid("milling")], d(2));
        let p = &r.breakdown.processes[0];
        // Mill 300 + Bakery 500, for two months.
        assert_eq!(p.facility_costs, d(1600));
        assert_eq!(p.cycles_run, d(200));
        assert_eq!(p.fixed_costs, d(2000));
        assert_eq!(p.variable_costs, d(1000));
        assert_eq!(r.production_costs, d(4600));
        assert_eq!(r.breakdown.total_facility_costs, d(1600));
    }

    #[test]
    fn per_process_revenue_sums_all_outputs() {
        let mut repo = bakery_chain();
        repo.upsert_good(Good::new("bran", "Bran", d(100)));
        repo.upsert_process(
            Process::new("milling", "Milling", d(100))
                .with_costs(d(1000), d(5))
                .with_input("wheat", d(1000))
                .with_output("flour", d(800))
                .with_output("bran", d(150)),
        );
        let r = aggregate_revenue(&repo, &[pid("milling")], d(1));
        // 100*800*0.8 + 100*150*0.1
        assert_eq!(r.breakdown.processes[0].revenue, d(65_500));
        assert_eq!(r.gross_revenue, d(65_500));
    }

    #[test]
    fn unknown_ids_and_goods_are_skipped() {
        let mut repo = bakery_chain();
        repo.upsert_process(
            Process::new("mystery", "Mystery", d(10)).with_output("unobtainium", d(5)),
        );
        let r = aggregate_revenue(&repo, &[pid("ghost"), pid("mystery")], d(1));
        assert_eq!(r.breakdown.processes.len(), 1);
        assert_eq!(r.breakdown.processes[0].process_id, pid("mystery"));
        assert_eq!(r.gross_revenue, Decimal::ZERO);
    }

    #[test]
    fn empty_portfolio_is_zero() {
        let repo = bakery_chain();
        assert_eq!(aggregate_revenue(&repo, &[], d(3)), RevenueReport::default());
    }

    #[test]
    fn caller_order_is_kept_and_duplicates_count_twice() {
        let repo = bakery_chain();
        let ids = [pid("baking"), pid("milling"), pid("baking")];
        let r = aggregate_revenue(&repo, &ids, d(1));
        let names: Vec<_> = r
            .breakdown
            .processes
            .iter()
            .map(|p| p.process_name.as_str())
            .collect();
        assert_eq!(names, vec!["Baking", "Milling", "Baking"]);
        // Baking: 80 cycles * 600 bread * 1.5 = 72_000, twice; milling 64_000.
        assert_eq!(r.gross_revenue, d(208_000));
    }

    #[test]
    fn fractional_runtime() {
        let mut repo = Catalog::new();
        repo.upsert_good(Good::new("milk", "Milk", d(1000)));
        repo.upsert_process(
            Process::new("dairy", "Dairy", d(30))
                .with_costs(d(600), d(2))
                .with_output("milk", d(10)),
        );
        repo.upsert_facility(Facility::new("barn", "Barn", d(90)).hosting("dairy"));
        let r = aggregate_revenue(&repo, &[pid("dairy")], Decimal::new(5, 1));
        let p = &r.breakdown.processes[0];
        assert_eq!(p.cycles_run, d(15));
        assert_eq!(p.fixed_costs, d(300));
        assert_eq!(p.variable_costs, d(30));
        assert_eq!(p.facility_costs, d(45));
        assert_eq!(p.revenue, d(150));
        assert_eq!(r.net_revenue, d(-225));
    }

    #[test]
    fn out_of_range_process_is_skipped() {
        let mut repo = bakery_chain();
        repo.upsert_good(Good::new("gem", "Gem", d(1_000_000_000_000)));
        repo.upsert_process(
            Process::new("mine", "Mine", d(1_000_000_000))
                .with_output("gem", d(1_000_000_000_000)),
        );
        // 1e12 cycles * 1e12 gems * 1e9 per gem does not fit in a Decimal.
        let r = aggregate_revenue(&repo, &[pid("mine"), pid("milling")], d(1000));
        assert_eq!(r.breakdown.processes.len(), 1);
        assert_eq!(r.breakdown.processes[0].process_id, pid("milling"));
        assert_eq!(r.net_revenue, r.gross_revenue - r.production_costs);
    }

    #[test]
    fn overflowing_totals_keep_earlier_entries() {
        let mut repo = Catalog::new();
        repo.upsert_process(Process::new("rent", "Rent", d(1)).with_costs(Decimal::MAX, d(0)));
        let r = aggregate_revenue(&repo, &[pid("rent"), pid("rent")], d(1));
        assert_eq!(r.breakdown.processes.len(), 1);
        assert_eq!(r.production_costs, Decimal::MAX);
        assert_eq!(r.breakdown.total_fixed_costs, Decimal::MAX);
        assert_eq!(r.net_revenue, -Decimal::MAX);
    }

    #[test]
    fn request_defaults_to_one_month() {
        let req: RevenueRequest = serde_json::from_str(r#"{"process_ids":["milling"]}"#).unwrap();
        assert_eq!(req.runtime_months, Decimal::ONE);
        let repo = bakery_chain();
        let r = req.evaluate(&repo);
        assert_eq!(r.breakdown.processes[0].cycles_run, d(100));
    }

    proptest! {
        #[test]
        fn totals_are_consistent(
            cycles in 0i64..10_000,
            fixed in 0i64..1_000_000,
            variable in 0i64..10_000,
            building in 0i64..100_000,
            qty in 1i64..10_000,
            price in 0i64..100_000,
            months in 0i64..1200,
        ) {
            let mut repo = Catalog::new();
            repo.upsert_good(Good::new("out", "Out", Decimal::new(price, 2)));
            repo.upsert_process(
                Process::new("p", "P", d(cycles))
                    .with_costs(Decimal::new(fixed, 2), Decimal::new(variable, 2))
                    .with_output("out", d(qty)),
            );
            repo.upsert_facility(Facility::new("f", "F", Decimal::new(building, 2)).hosting("p"));
            let r = aggregate_revenue(&repo, &[pid("p"), pid("p")], Decimal::new(months, 1));
            let b = &r.breakdown;
            prop_assert_eq!(r.net_revenue, r.gross_revenue - r.production_costs);
            prop_assert_eq!(
                r.production_costs,
                b.total_fixed_costs + b.total_variable_costs + b.total_facility_costs
            );
            let summed: Decimal = b.processes.iter().map(|p| p.revenue).sum();
            prop_assert_eq!(summed, r.gross_revenue);
        }
    }
}
