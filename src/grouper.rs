use std::collections::HashMap;

use crate::types::{BarGroup, CutMetadata, CutRecord, Signature, WorkingBar};

/// Merges bars with the same origin kind, original length and cut lengths.
/// Groups appear in the order their first bar was opened.
pub fn group_bars(bars: Vec<WorkingBar>) -> Vec<BarGroup> {
    let mut groups: Vec<BarGroup> = Vec::new();
    let mut index: HashMap<Signature, usize> = HashMap::new();

    for bar in bars {
        let origin = bar.origin.kind();
        let mut cuts: Vec<CutRecord> = bar.cuts;
        cuts.sort_by(|a, b| b.length.cmp(&a.length));

        let signature = Signature {
            origin,
            original_length: bar.original_length,
            cuts: cuts.iter().map(|c| c.length).collect(),
        };
        let metadata: Vec<CutMetadata> = cuts.into_iter().map(|c| c.metadata).collect();

        match index.get(&signature).copied() {
            Some(gi) => {
                let group = &mut groups[gi];
                group.count += 1;
                group.ids.push(bar.id);
                group.all_instances_metadata.push(metadata);
            }
            None => {
                index.insert(signature.clone(), groups.len());
                groups.push(BarGroup {
                    signature,
                    count: 1,
                    remaining: bar.remaining,
                    ids: vec![bar.id],
                    all_instances_metadata: vec![metadata],
                });
            }
        }
    }

    groups
}
