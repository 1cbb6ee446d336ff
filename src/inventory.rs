//! Reconciles a remnant inventory with a computed plan.

use std::collections::HashMap;

use crate::packer::IdSource;
use crate::types::{CuttingPlan, Length, OriginKind, RemnantStock};

/// Leftovers at or below this length are not worth restocking.
pub const DEFAULT_MIN_LEFTOVER: Length = Length::from_mm(500);

pub const LEFTOVER_SOURCE: &str = "cut_leftover";

/// Inventory after the plan's remnant bars are taken out. Lines whose copies
/// are all used disappear; the input is left as is.
pub fn consume_remnants(inventory: &[RemnantStock], plan: &CuttingPlan) -> Vec<RemnantStock> {
    let mut used: HashMap<&str, u32> = HashMap::new();
    for (_, group) in plan.groups() {
        if group.origin() == OriginKind::Remnant {
            for id in &group.ids {
                *used.entry(id.as_str()).or_default() += 1;
            }
        }
    }

    let mut remaining = Vec::with_capacity(inventory.len());
    for line in inventory {
        let available = line.copies();
        // Duplicate ids share the usage count; earlier lines are drawn first.
        let taken = used
            .get_mut(line.id.as_str())
            .map(|n| {
                let t = (*n).min(available);
                *n -= t;
                t
            })
            .unwrap_or(0);
        if taken == 0 {
            remaining.push(line.clone());
        } else if taken < available {
            remaining.push(RemnantStock {
                quantity: available - taken,
                ..line.clone()
            });
        }
    }
    remaining
}

/// One new remnant line per bar group whose leftover is longer than
/// `min_length`.
pub fn harvest_leftovers<I: IdSource>(
    plan: &CuttingPlan,
    min_length: Length,
    ids: &mut I,
) -> Vec<RemnantStock> {
    plan.groups()
        .filter(|(_, g)| g.remaining > min_length)
        .map(|(diameter, g)| RemnantStock {
            id: ids.next_id(),
            diameter,
            length: g.remaining,
            quantity: g.count as u32,
            source: LEFTOVER_SOURCE.to_string(),
        })
        .collect()
}

/// Inventory to keep after executing the plan: consumed remnants removed,
/// reusable leftovers added.
pub fn restock<I: IdSource>(
    inventory: &[RemnantStock],
    plan: &CuttingPlan,
    min_length: Length,
    ids: &mut I,
) -> Vec<RemnantStock> {
    let mut next = consume_remnants(inventory, plan);
    let harvested = harvest_leftovers(plan, min_length, ids);
    tracing::info!(
        consumed_copies = plan.bar_count(OriginKind::Remnant),
        exhausted_lines = inventory.len().saturating_sub(next.len()),
        harvested = harvested.len(),
        "inventory reconciled"
    );
    next.extend(harvested);
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packer::SequentialIds;
    use crate::plan::compute_cutting_plan;
    use crate::types::{DemandPiece, Diameter, PlanConfig};

    fn cm(v: f64) -> Length {
        Length::from_cm(v)
    }

    fn demand(len: f64, qty: u32) -> DemandPiece {
        DemandPiece::new(Diameter::D10_0, cm(len), qty)
    }

    #[test]
    fn test_consume_decrements_copies() {
        let inventory = vec![
            RemnantStock::new("r1", Diameter::D10_0, cm(500.0), 3),
            RemnantStock::new("r2", Diameter::D10_0, cm(300.0), 1),
        ];
        let plan = compute_cutting_plan(&[demand(450.0, 2)], &inventory, &PlanConfig::default()).unwrap();
        let after = consume_remnants(&inventory, &plan);
        assert_eq!(after.len(), 2);
        assert_eq!(after[0].id, "r1");
        assert_eq!(after[0].quantity, 1);
        assert_eq!(after[1], inventory[1]);
    }

    #[test]
    fn test_consumed_copies_match_remnant_bars() {
        let inventory = vec![
            RemnantStock::new("r1", Diameter::D10_0, cm(500.0), 3),
            RemnantStock::new("r2", Diameter::D10_0, cm(300.0), 2),
        ];
        // 450 x3 takes r1 x3, 280 x2 takes r2 x2: five copies, two exhausted lines
        let plan = compute_cutting_plan(
            &[demand(450.0, 3), demand(280.0, 2)],
            &inventory,
            &PlanConfig::default(),
        )
        .unwrap();
        fn copies(lines: &[RemnantStock]) -> usize {
            lines.iter().map(|l| l.copies() as usize).sum()
        }
        let after = consume_remnants(&inventory, &plan);
        assert_eq!(plan.bar_count(OriginKind::Remnant), 5);
        assert_eq!(copies(&inventory) - copies(&after), 5);
        assert!(after.is_empty());
    }

    #[test]
    fn test_consume_drops_exhausted_lines() {
        let inventory = vec![RemnantStock::new("r1", Diameter::D10_0, cm(400.0), 0)];
        let plan = compute_cutting_plan(&[demand(350.0, 1)], &inventory, &PlanConfig::default()).unwrap();
        assert!(consume_remnants(&inventory, &plan).is_empty());
    }

    #[test]
    fn test_harvest_respects_threshold() {
        // [700] x2 leaves 500 each (kept), [1180] leaves 20 (dropped)
        let plan = compute_cutting_plan(
            &[demand(700.0, 2), demand(1180.0, 1)],
            &[],
            &PlanConfig::default(),
        )
        .unwrap();
        let mut ids = SequentialIds::new("sobra");
        let harvested = harvest_leftovers(&plan, DEFAULT_MIN_LEFTOVER, &mut ids);
        assert_eq!(harvested.len(), 1);
        assert_eq!(harvested[0].id, "sobra-1");
        assert_eq!(harvested[0].length, cm(500.0));
        assert_eq!(harvested[0].quantity, 2);
        assert_eq!(harvested[0].diameter, Diameter::D10_0);
        assert_eq!(harvested[0].source, LEFTOVER_SOURCE);
    }

    #[test]
    fn test_restock() {
        let inventory = vec![RemnantStock::new("r1", Diameter::D10_0, cm(400.0), 1)];
        let plan = compute_cutting_plan(
            &[demand(350.0, 1), demand(600.0, 1)],
            &inventory,
            &PlanConfig::default(),
        )
        .unwrap();
        let mut ids = SequentialIds::new("sobra");
        let after = restock(&inventory, &plan, DEFAULT_MIN_LEFTOVER, &mut ids);
        // 600 + 350 share a new bar leaving 250; the remnant stays untouched
        assert_eq!(after.len(), 2);
        assert_eq!(after[0], inventory[0]);
        assert_eq!(after[1].length, cm(250.0));
        assert_eq!(after[1].quantity, 1);
    }

    #[test]
    fn test_restock_replaces_used_remnant() {
        let inventory = vec![RemnantStock::new("r1", Diameter::D10_0, cm(1100.0), 1)];
        let plan = compute_cutting_plan(&[demand(400.0, 1)], &inventory, &PlanConfig::default()).unwrap();
        let mut ids = SequentialIds::new("sobra");
        let after = restock(&inventory, &plan, DEFAULT_MIN_LEFTOVER, &mut ids);
        assert_eq!(after.len(), 1);
        assert_eq!(after[0].id, "sobra-1");
        assert_eq!(after[0].length, cm(700.0));
    }
}
