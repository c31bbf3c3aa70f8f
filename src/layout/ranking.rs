use std::collections::BTreeMap;

use log::debug;

use super::LayoutNode;

/// Horizontal extent of one rank.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankBounds {
    pub min_x: f32,
    pub max_x: f32,
}

impl RankBounds {
    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    pub fn center(&self) -> f32 {
        (self.min_x + self.max_x) / 2.0
    }
}

/// Node indices keyed by their rounded vertical coordinate.
pub fn group_ranks(nodes: &[LayoutNode]) -> BTreeMap<i64, Vec<usize>> {
    let mut ranks: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
    for (idx, node) in nodes.iter().enumerate() {
        ranks.entry(node.y.round() as i64).or_default().push(idx);
    }
    ranks
}

pub fn rank_bounds(nodes: &[LayoutNode], members: &[usize]) -> Option<RankBounds> {
    let mut bounds: Option<RankBounds> = None;
    for &idx in members {
        let node = nodes.get(idx)?;
        let (left, right) = (node.left(), node.right());
        bounds = Some(match bounds {
            Some(b) => RankBounds {
                min_x: b.min_x.min(left),
                max_x: b.max_x.max(right),
            },
            None => RankBounds {
                min_x: left,
                max_x: right,
            },
        });
    }
    bounds
}

/// Centers every rank on the midpoint of the widest rank. Equal widths go to
/// the topmost rank. Singleton ranks are snapped to the reference exactly and
/// `y` is never touched. Returns the reference center.
pub fn center_ranks(nodes: &mut [LayoutNode]) -> Option<f32> {
    let ranks = group_ranks(nodes);

    let mut bounds: Vec<(&Vec<usize>, RankBounds)> = Vec::with_capacity(ranks.len());
    for members in ranks.values() {
        if let Some(b) = rank_bounds(nodes, members) {
            bounds.push((members, b));
        }
    }

    let mut widest: Option<RankBounds> = None;
    for (_, b) in &bounds {
        if widest.is_none_or(|w| b.width() > w.width()) {
            widest = Some(*b);
        }
    }
    let reference = widest?.center();

    for (members, b) in &bounds {
        if let [only] = members.as_slice() {
            nodes[*only].x = reference;
            continue;
        }
        let delta = reference - b.center();
        for &idx in members.iter() {
            nodes[idx].x += delta;
        }
    }

    debug!(ranks = bounds.len(), reference_center = reference; "Ranks centered");
    Some(reference)
}
