use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::Add;

use crate::error::PlanError;

/// Commercial rebar diameter class, in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub enum Diameter {
    D4_2,
    D5_0,
    D6_3,
    D8_0,
    D10_0,
    D12_5,
    D16_0,
    D20_0,
    D25_0,
    D32_0,
    D40_0,
}

impl Diameter {
    pub const ALL: [Diameter; 11] = [
        Diameter::D4_2,
        Diameter::D5_0,
        Diameter::D6_3,
        Diameter::D8_0,
        Diameter::D10_0,
        Diameter::D12_5,
        Diameter::D16_0,
        Diameter::D20_0,
        Diameter::D25_0,
        Diameter::D32_0,
        Diameter::D40_0,
    ];

    fn tenths_mm(self) -> u32 {
        match self {
            Diameter::D4_2 => 42,
            Diameter::D5_0 => 50,
            Diameter::D6_3 => 63,
            Diameter::D8_0 => 80,
            Diameter::D10_0 => 100,
            Diameter::D12_5 => 125,
            Diameter::D16_0 => 160,
            Diameter::D20_0 => 200,
            Diameter::D25_0 => 250,
            Diameter::D32_0 => 320,
            Diameter::D40_0 => 400,
        }
    }

    pub fn mm(self) -> f64 {
        self.tenths_mm() as f64 / 10.0
    }
}

impl TryFrom<f64> for Diameter {
    type Error = PlanError;

    fn try_from(mm: f64) -> Result<Self, Self::Error> {
        if !mm.is_finite() {
            return Err(PlanError::UnknownDiameter(mm));
        }
        let tenths = (mm * 10.0).round();
        Diameter::ALL
            .into_iter()
            .find(|d| d.tenths_mm() as f64 == tenths)
            .ok_or(PlanError::UnknownDiameter(mm))
    }
}

impl From<Diameter> for f64 {
    fn from(d: Diameter) -> Self {
        d.mm()
    }
}

impl fmt::Display for Diameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}", self.mm())
    }
}

/// Non-negative bar length, stored as whole millimetres so that lengths
/// given in centimetres with one decimal compare and subtract exactly.
/// Serialized as centimetres; values beyond `Length::MAX` are rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Length(u32);

impl Length {
    pub const ZERO: Length = Length(0);
    pub const MAX: Length = Length(u32::MAX);

    pub const fn from_mm(mm: u32) -> Self {
        Self(mm)
    }

    /// Non-positive and non-finite values collapse to zero, values past
    /// `Length::MAX` saturate. Use `try_from` for untrusted input.
    pub fn from_cm(cm: f64) -> Self {
        Self::try_from(cm).unwrap_or(Self::MAX)
    }

    pub fn mm(self) -> u32 {
        self.0
    }

    pub fn cm(self) -> f64 {
        self.0 as f64 / 10.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn checked_sub(self, other: Length) -> Option<Length> {
        self.0.checked_sub(other.0).map(Length)
    }

    pub fn saturating_sub(self, other: Length) -> Length {
        Length(self.0.saturating_sub(other.0))
    }

    pub fn checked_add(self, other: Length) -> Option<Length> {
        self.0.checked_add(other.0).map(Length)
    }

    pub fn saturating_add(self, other: Length) -> Length {
        Length(self.0.saturating_add(other.0))
    }
}

impl TryFrom<f64> for Length {
    type Error = PlanError;

    fn try_from(cm: f64) -> Result<Self, Self::Error> {
        if cm.is_nan() || cm <= 0.0 {
            return Ok(Self::ZERO);
        }
        let mm = (cm * 10.0).round();
        if mm > u32::MAX as f64 {
            return Err(PlanError::LengthOutOfRange(cm));
        }
        Ok(Self(mm as u32))
    }
}

impl From<Length> for f64 {
    fn from(l: Length) -> Self {
        l.cm()
    }
}

impl Add for Length {
    type Output = Length;

    /// Saturates at `Length::MAX`.
    fn add(self, rhs: Length) -> Length {
        self.saturating_add(rhs)
    }
}

impl Sum for Length {
    fn sum<I: Iterator<Item = Length>>(iter: I) -> Length {
        iter.fold(Length::ZERO, Add::add)
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 % 10 == 0 {
            write!(f, "{}", self.0 / 10)
        } else {
            write!(f, "{}.{}", self.0 / 10, self.0 % 10)
        }
    }
}

/// Accepts any JSON number for a count. Negative or non-finite values
/// become 0 and fractional values are rounded.
pub fn deserialize_u32_from_number<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    if value.is_finite() && value > 0.0 {
        Ok(value.round() as u32)
    } else {
        Ok(0)
    }
}

/// Traceability data carried by every cut back to its demand line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct CutMetadata {
    pub element: String,
    pub position: String,
    pub work_order: String,
    pub origin: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandPiece {
    pub diameter: Diameter,
    pub length: Length,
    #[serde(default, deserialize_with = "deserialize_u32_from_number")]
    pub quantity: u32,
    #[serde(flatten)]
    pub metadata: CutMetadata,
}

impl DemandPiece {
    pub fn new(diameter: Diameter, length: Length, quantity: u32) -> Self {
        Self {
            diameter,
            length,
            quantity,
            metadata: CutMetadata::default(),
        }
    }

    pub fn with_metadata(mut self, metadata: CutMetadata) -> Self {
        self.metadata = metadata;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemnantStock {
    pub id: String,
    pub diameter: Diameter,
    pub length: Length,
    #[serde(default, deserialize_with = "deserialize_u32_from_number")]
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub source: String,
}

impl RemnantStock {
    pub fn new(id: impl Into<String>, diameter: Diameter, length: Length, quantity: u32) -> Self {
        Self {
            id: id.into(),
            diameter,
            length,
            quantity,
            source: String::new(),
        }
    }

    /// Number of physical copies; an absent or zero quantity means one.
    pub fn copies(&self) -> u32 {
        self.quantity.max(1)
    }
}

/// One unsplittable demand instance.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitPiece {
    pub diameter: Diameter,
    pub length: Length,
    pub metadata: CutMetadata,
}

/// One allocatable remnant copy, local to a single optimization run.
#[derive(Debug, Clone, PartialEq)]
pub struct RemnantInstance {
    pub stock_id: String,
    pub length: Length,
    pub consumed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CutRecord {
    pub length: Length,
    pub metadata: CutMetadata,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OriginKind {
    New,
    Remnant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BarOrigin {
    NewStandard,
    FromRemnant { remnant_id: String },
}

impl BarOrigin {
    pub fn kind(&self) -> OriginKind {
        match self {
            BarOrigin::NewStandard => OriginKind::New,
            BarOrigin::FromRemnant { .. } => OriginKind::Remnant,
        }
    }
}

/// A physical bar being filled by the packer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkingBar {
    pub id: String,
    pub origin: BarOrigin,
    pub original_length: Length,
    pub remaining: Length,
    pub cuts: Vec<CutRecord>,
}

impl WorkingBar {
    pub fn cut_total(&self) -> Length {
        self.cuts.iter().map(|c| c.length).sum()
    }
}

/// Structural grouping key. Cut lengths are sorted descending.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Signature {
    pub origin: OriginKind,
    pub original_length: Length,
    pub cuts: Vec<Length>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarGroup {
    pub signature: Signature,
    pub count: usize,
    pub remaining: Length,
    /// New-bar ids or remnant stock ids, one per member bar.
    pub ids: Vec<String>,
    pub all_instances_metadata: Vec<Vec<CutMetadata>>,
}

impl BarGroup {
    pub fn origin(&self) -> OriginKind {
        self.signature.origin
    }

    pub fn original_length(&self) -> Length {
        self.signature.original_length
    }

    pub fn cuts(&self) -> &[Length] {
        &self.signature.cuts
    }

    pub fn cut_total(&self) -> Length {
        self.signature.cuts.iter().copied().sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiameterPlan {
    pub diameter: Diameter,
    pub bar_groups: Vec<BarGroup>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CuttingPlan {
    pub diameters: Vec<DiameterPlan>,
}

impl CuttingPlan {
    pub fn groups(&self) -> impl Iterator<Item = (Diameter, &BarGroup)> {
        self.diameters
            .iter()
            .flat_map(|d| d.bar_groups.iter().map(move |g| (d.diameter, g)))
    }

    pub fn bar_count(&self, origin: OriginKind) -> usize {
        self.groups()
            .filter(|(_, g)| g.origin() == origin)
            .map(|(_, g)| g.count)
            .sum()
    }

    pub fn new_bar_count(&self) -> usize {
        self.bar_count(OriginKind::New)
    }
}

fn default_standard_bar_length() -> Length {
    Length::from_cm(1200.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlanConfig {
    #[serde(default = "default_standard_bar_length")]
    pub standard_bar_length: Length,
    #[serde(default)]
    pub kerf_loss: Length,
}

impl Default for PlanConfig {
    fn default() -> Self {
        Self {
            standard_bar_length: default_standard_bar_length(),
            kerf_loss: Length::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diameter_from_mm() {
        assert_eq!(Diameter::try_from(10.0).unwrap(), Diameter::D10_0);
        assert_eq!(Diameter::try_from(12.5).unwrap(), Diameter::D12_5);
        assert_eq!(Diameter::try_from(4.2).unwrap(), Diameter::D4_2);
        assert!(Diameter::try_from(11.0).is_err());
        assert!(Diameter::try_from(f64::NAN).is_err());
    }

    #[test]
    fn test_diameter_display() {
        assert_eq!(Diameter::D10_0.to_string(), "10.0");
        assert_eq!(Diameter::D6_3.to_string(), "6.3");
    }

    #[test]
    fn test_length_from_cm() {
        assert_eq!(Length::from_cm(300.0).mm(), 3000);
        assert_eq!(Length::from_cm(0.3).mm(), 3);
        assert_eq!(Length::from_cm(-5.0), Length::ZERO);
        assert_eq!(Length::from_cm(f64::NAN), Length::ZERO);
        // 0.1 + 0.2 style float noise must not leak into comparisons
        assert_eq!(Length::from_cm(0.1 + 0.2), Length::from_cm(0.3));
    }

    #[test]
    fn test_length_out_of_range() {
        assert!(Length::try_from(5e8).is_err());
        assert_eq!(Length::try_from(429_496_729.5), Ok(Length::MAX));
        assert_eq!(Length::from_cm(5e9), Length::MAX);
        assert_eq!(Length::MAX + Length::from_cm(0.5), Length::MAX);
        assert_eq!(Length::MAX.checked_add(Length::from_mm(1)), None);

        let json = r#"{"diameter": 10, "length": 1e12, "quantity": 1}"#;
        assert!(serde_json::from_str::<DemandPiece>(json).is_err());
        let json = r#"{"id": "r1", "diameter": 10, "length": 5e9}"#;
        assert!(serde_json::from_str::<RemnantStock>(json).is_err());
    }

    #[test]
    fn test_length_display() {
        assert_eq!(Length::from_cm(300.0).to_string(), "300");
        assert_eq!(Length::from_cm(112.5).to_string(), "112.5");
    }

    #[test]
    fn test_demand_deserialize() {
        let json = r#"{"diameter": 12.5, "length": 350.5, "quantity": 3, "element": "V1", "work_order": "OS-7"}"#;
        let piece: DemandPiece = serde_json::from_str(json).unwrap();
        assert_eq!(piece.diameter, Diameter::D12_5);
        assert_eq!(piece.length, Length::from_mm(3505));
        assert_eq!(piece.quantity, 3);
        assert_eq!(piece.metadata.element, "V1");
        assert_eq!(piece.metadata.work_order, "OS-7");
        assert_eq!(piece.metadata.position, "");
    }

    #[test]
    fn test_demand_negative_quantity_clamps() {
        let json = r#"{"diameter": 8, "length": 100, "quantity": -2}"#;
        let piece: DemandPiece = serde_json::from_str(json).unwrap();
        assert_eq!(piece.quantity, 0);
    }

    #[test]
    fn test_unknown_diameter_rejected() {
        let json = r#"{"diameter": 9, "length": 100, "quantity": 1}"#;
        assert!(serde_json::from_str::<DemandPiece>(json).is_err());
    }

    #[test]
    fn test_remnant_default_quantity() {
        let json = r#"{"id": "r1", "diameter": 10, "length": 400}"#;
        let remnant: RemnantStock = serde_json::from_str(json).unwrap();
        assert_eq!(remnant.quantity, 0);
        assert_eq!(remnant.copies(), 1);
    }

    #[test]
    fn test_config_defaults() {
        let config: PlanConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, PlanConfig::default());
        assert_eq!(config.standard_bar_length, Length::from_cm(1200.0));
        assert_eq!(config.kerf_loss, Length::ZERO);
    }

    #[test]
    fn test_config_field_names() {
        let config: PlanConfig =
            serde_json::from_str(r#"{"standard_bar_length": 600, "kerf_loss": 0.5}"#).unwrap();
        assert_eq!(config.standard_bar_length, Length::from_cm(600.0));
        assert_eq!(config.kerf_loss, Length::from_mm(5));
        let out = serde_json::to_value(config).unwrap();
        assert_eq!(out["kerf_loss"], 0.5);
    }
}
