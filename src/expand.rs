use std::collections::BTreeMap;

use crate::types::{DemandPiece, Diameter, RemnantInstance, RemnantStock, UnitPiece};

/// Demand and remnant lines belonging to one diameter class.
#[derive(Debug, Default)]
pub struct ClassInput<'a> {
    pub demand: Vec<&'a DemandPiece>,
    pub remnants: Vec<&'a RemnantStock>,
}

/// Splits the input into one sub-problem per diameter class present in the
/// demand. Remnants of a class nobody asked for are left out. Classes come
/// back in ascending diameter order.
pub fn partition<'a>(
    demand: &'a [DemandPiece],
    remnants: &'a [RemnantStock],
) -> BTreeMap<Diameter, ClassInput<'a>> {
    let mut classes: BTreeMap<Diameter, ClassInput<'a>> = BTreeMap::new();
    for d in demand {
        classes.entry(d.diameter).or_default().demand.push(d);
    }
    for r in remnants {
        if let Some(class) = classes.get_mut(&r.diameter) {
            class.remnants.push(r);
        }
    }
    classes
}

/// One unit piece per requested copy. Lines with a zero length or quantity
/// contribute nothing.
pub fn expand_demand(lines: &[&DemandPiece]) -> Vec<UnitPiece> {
    let mut pieces = Vec::new();
    for d in lines {
        if d.length.is_zero() {
            continue;
        }
        for _ in 0..d.quantity {
            pieces.push(UnitPiece {
                diameter: d.diameter,
                length: d.length,
                metadata: d.metadata.clone(),
            });
        }
    }
    pieces
}

pub fn expand_remnants(lines: &[&RemnantStock]) -> Vec<RemnantInstance> {
    let mut instances = Vec::new();
    for r in lines {
        if r.length.is_zero() {
            continue;
        }
        for _ in 0..r.copies() {
            instances.push(RemnantInstance {
                stock_id: r.id.clone(),
                length: r.length,
                consumed: false,
            });
        }
    }
    instances
}
