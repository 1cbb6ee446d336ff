pub mod error;
pub mod expand;
pub mod grouper;
pub mod inventory;
pub mod metrics;
pub mod packer;
pub mod plan;
pub mod render;
pub mod strategy;
pub mod types;

pub use error::{PlanError, Result};
pub use plan::{compute_cutting_plan, compute_cutting_plan_with_ids};
