//! Plan evaluation figures.
//!
//! Leftovers are classified per bar: below [`SCRAP_BELOW`] they are scrap,
//! from [`USABLE_FROM`] up they can go back to stock, and anything in
//! between is technical waste.

use serde::Serialize;
use std::collections::HashSet;

use crate::types::{CuttingPlan, Length, OriginKind};

pub const SCRAP_BELOW: Length = Length::from_mm(300);
pub const USABLE_FROM: Length = Length::from_mm(1000);

/// Utilization (percent) a plan should reach.
pub const UTILIZATION_TARGET: f64 = 92.0;

/// Lengths are in centimetres, shares in percent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlanMetrics {
    pub new_bars: usize,
    pub remnant_bars: usize,
    pub total_bars: usize,
    pub patterns: usize,
    pub diameters: usize,
    pub total_cuts: usize,
    pub raw_length: f64,
    pub raw_length_new: f64,
    pub raw_length_remnant: f64,
    pub parts_length: f64,
    pub scrap: f64,
    pub technical_waste: f64,
    pub usable_leftover: f64,
    pub utilization: f64,
    pub new_material_share: f64,
    pub repeatability: f64,
}

impl PlanMetrics {
    pub fn from_plan(plan: &CuttingPlan) -> Self {
        let mut m = PlanMetrics::default();
        let mut diameters = HashSet::new();

        for (diameter, group) in plan.groups() {
            diameters.insert(diameter);
            let count = group.count as f64;
            let raw = group.original_length().cm() * count;

            m.total_bars += group.count;
            m.patterns += 1;
            m.total_cuts += group.cuts().len() * group.count;
            m.raw_length += raw;
            m.parts_length += group.cut_total().cm() * count;

            match group.origin() {
                OriginKind::New => {
                    m.new_bars += group.count;
                    m.raw_length_new += raw;
                }
                OriginKind::Remnant => {
                    m.remnant_bars += group.count;
                    m.raw_length_remnant += raw;
                }
            }

            let leftover = group.remaining.cm() * count;
            if group.remaining < SCRAP_BELOW {
                m.scrap += leftover;
            } else if group.remaining >= USABLE_FROM {
                m.usable_leftover += leftover;
            } else {
                m.technical_waste += leftover;
            }
        }

        m.diameters = diameters.len();
        if m.raw_length > 0.0 {
            m.utilization = m.parts_length / m.raw_length * 100.0;
            m.new_material_share = m.raw_length_new / m.raw_length * 100.0;
        }
        if m.patterns > 0 {
            m.repeatability = m.total_bars as f64 / m.patterns as f64;
        }
        m
    }

    pub fn meets_target(&self) -> bool {
        self.utilization >= UTILIZATION_TARGET
    }
}
