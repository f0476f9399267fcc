use crate::Catalog;
use plan_core::{Facility, Good, Process};
use rust_decimal::Decimal;

/// Seed data: wheat is milled into flour, flour is baked into bread, and one
/// bakery hosts both processes.
pub fn sample_catalog() -> Catalog {
    let mut c = Catalog::new();
    c.upsert_good(Good::new("wheat", "Wheat", Decimal::new(500, 0)));
    c.upsert_good(Good::new("flour", "Flour", Decimal::new(800, 0)));
    c.upsert_good(Good::new("bread", "Bread", Decimal::new(1500, 0)));

    let mut milling = Process::new("flour-milling", "Flour Milling", Decimal::new(100, 0))
        .with_costs(Decimal::new(1000, 0), Decimal::new(5, 0))
        .with_input("wheat", Decimal::new(1000, 0))
        .with_output("flour", Decimal::new(800, 0));
    milling.description = "Mill wheat into flour".to_string();
    c.upsert_process(milling);

    let mut baking = Process::new("bread-baking", "Bread Baking", Decimal::new(80, 0))
        .with_costs(Decimal::new(1500, 0), Decimal::new(8, 0))
        .with_input("flour", Decimal::new(800, 0))
        .with_output("bread", Decimal::new(600, 0));
    baking.description = "Bake flour into bread".to_string();
    c.upsert_process(baking);

    c.upsert_facility(
        Facility::new("bakery", "Bakery", Decimal::new(500, 0))
            .hosting("flour-milling")
            .hosting("bread-baking"),
    );
    c
}
