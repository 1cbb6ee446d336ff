//! Error types for cutting plan computation.

use thiserror::Error;

use crate::types::{CutMetadata, Diameter, Length};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanError {
    /// No open bar, remnant or new standard bar can hold the piece.
    #[error(
        "piece of {length} cm (diameter {diameter} mm) exceeds the standard bar length of {max} cm and no remnant can hold it"
    )]
    ExceedsMaximumLength {
        diameter: Diameter,
        length: Length,
        max: Length,
        metadata: CutMetadata,
    },

    #[error("standard bar length must be greater than zero")]
    InvalidBarLength,

    #[error("unknown diameter class {0} mm")]
    UnknownDiameter(f64),

    #[error("length of {0} cm is out of range")]
    LengthOutOfRange(f64),
}

pub type Result<T> = std::result::Result<T, PlanError>;
