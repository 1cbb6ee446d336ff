use tracing::info;

use crate::error::{PlanError, Result};
use crate::expand::{expand_demand, expand_remnants, partition};
use crate::grouper::group_bars;
use crate::packer::{IdSource, Packer, SequentialIds};
use crate::types::{CuttingPlan, DemandPiece, DiameterPlan, PlanConfig, RemnantStock};

/// Computes the cutting plan, numbering new bars `new-1`, `new-2`, ...
pub fn compute_cutting_plan(
    demand: &[DemandPiece],
    remnants: &[RemnantStock],
    config: &PlanConfig,
) -> Result<CuttingPlan> {
    compute_cutting_plan_with_ids(demand, remnants, config, SequentialIds::default())
}

/// Same as [`compute_cutting_plan`] with a caller-supplied id source. One
/// source serves every diameter class, so ids are unique within the plan.
pub fn compute_cutting_plan_with_ids<I: IdSource>(
    demand: &[DemandPiece],
    remnants: &[RemnantStock],
    config: &PlanConfig,
    ids: I,
) -> Result<CuttingPlan> {
    if config.standard_bar_length.is_zero() {
        return Err(PlanError::InvalidBarLength);
    }

    let mut packer = Packer::new(*config, ids);
    let mut plan = CuttingPlan::default();

    for (diameter, class) in partition(demand, remnants) {
        let pieces = expand_demand(&class.demand);
        let instances = expand_remnants(&class.remnants);
        info!(
            diameter = %diameter,
            pieces = pieces.len(),
            remnants = instances.len(),
            "packing diameter class"
        );

        let bars = packer.pack(pieces, instances)?;
        let bar_groups = group_bars(bars);
        plan.diameters.push(DiameterPlan {
            diameter,
            bar_groups,
        });
    }

    Ok(plan)
}
