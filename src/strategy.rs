use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::metrics::USABLE_FROM;
use crate::plan::compute_cutting_plan;
use crate::types::{CuttingPlan, DemandPiece, OriginKind, PlanConfig, RemnantStock};

/// Efficiency gain (percentage points) above which combining is worth it
/// even when no bar is saved.
pub const MIN_EFFICIENCY_GAIN: f64 = 1.5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    pub demand: Vec<DemandPiece>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    Separate,
    Combined,
}

/// Lengths in centimetres; `loss` sums leftovers too short to restock.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ScenarioMetrics {
    pub new_bars: usize,
    pub remnant_bars: usize,
    pub raw_length: f64,
    pub used_length: f64,
    pub loss: f64,
    pub efficiency: f64,
}

impl ScenarioMetrics {
    fn absorb(&mut self, plan: &CuttingPlan) {
        for (_, group) in plan.groups() {
            let count = group.count as f64;
            match group.origin() {
                OriginKind::New => self.new_bars += group.count,
                OriginKind::Remnant => self.remnant_bars += group.count,
            }
            self.raw_length += group.original_length().cm() * count;
            self.used_length += group.cut_total().cm() * count;
            if group.remaining < USABLE_FROM {
                self.loss += group.remaining.cm() * count;
            }
        }
        self.efficiency = if self.raw_length > 0.0 {
            self.used_length / self.raw_length * 100.0
        } else {
            0.0
        };
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategyComparison {
    pub separate: ScenarioMetrics,
    pub combined: ScenarioMetrics,
    pub bars_saved: i64,
    pub efficiency_gain: f64,
    pub recommendation: Strategy,
}

/// All projects' demand in one list, each line labelled with its project.
pub fn combine_projects(projects: &[Project]) -> Vec<DemandPiece> {
    projects
        .iter()
        .flat_map(|p| {
            p.demand.iter().map(move |d| {
                let mut line = d.clone();
                line.metadata.origin = p.name.clone();
                line
            })
        })
        .collect()
}

/// Plans every project on its own and all of them together, both against
/// the full remnant inventory, and recommends the better option.
pub fn compare_strategies(
    projects: &[Project],
    remnants: &[RemnantStock],
    config: &PlanConfig,
) -> Result<StrategyComparison> {
    let mut separate = ScenarioMetrics::default();
    for project in projects {
        let plan = compute_cutting_plan(&project.demand, remnants, config)?;
        separate.absorb(&plan);
    }

    let mut combined = ScenarioMetrics::default();
    let plan = compute_cutting_plan(&combine_projects(projects), remnants, config)?;
    combined.absorb(&plan);

    let bars_saved = separate.new_bars as i64 - combined.new_bars as i64;
    let efficiency_gain = combined.efficiency - separate.efficiency;
    let recommendation = if efficiency_gain > MIN_EFFICIENCY_GAIN || bars_saved > 0 {
        Strategy::Combined
    } else {
        Strategy::Separate
    };

    tracing::info!(
        projects = projects.len(),
        bars_saved,
        efficiency_gain,
        ?recommendation,
        "strategy comparison done"
    );

    Ok(StrategyComparison {
        separate,
        combined,
        bars_saved,
        efficiency_gain,
        recommendation,
    })
}
