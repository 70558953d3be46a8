//! One-step reachability used by the session after every move.

use std::collections::BTreeSet;

use trailgrid_core::{GridLayout, NodeIndex};

/// Candidate nodes one step away from `current`, before any map filtering.
///
/// The candidates are the horizontal neighbours of `current`, the nodes
/// directly above and below it, and the horizontal neighbours of those two.
/// Horizontal neighbours are clipped to the row of their anchor so a step
/// never wraps around a grid edge. The vertical nodes themselves are kept even
/// when they lie outside the grid; callers filter against their node sets.
pub(crate) fn neighbours(layout: &GridLayout, current: NodeIndex) -> Vec<NodeIndex> {
    let n = current.get();
    let mut candidates = Vec::with_capacity(8);
    candidates.extend(same_row(layout, current));

    for vertical in [n.checked_sub(layout.columns()), n.checked_add(layout.columns())]
        .into_iter()
        .flatten()
    {
        let anchor = NodeIndex::new(vertical);
        candidates.push(anchor);
        candidates.extend(same_row(layout, anchor));
    }
    candidates
}

/// Path nodes reachable in one step from `current`.
pub(crate) fn walkable(
    layout: &GridLayout,
    paths: &BTreeSet<NodeIndex>,
    current: NodeIndex,
) -> BTreeSet<NodeIndex> {
    neighbours(layout, current)
        .into_iter()
        .filter(|node| paths.contains(node))
        .collect()
}

fn same_row(layout: &GridLayout, anchor: NodeIndex) -> impl Iterator<Item = NodeIndex> {
    let span = layout.row_span(anchor);
    let n = anchor.get();
    [n.checked_sub(1), n.checked_add(1)]
        .into_iter()
        .flatten()
        .map(NodeIndex::new)
        .filter(move |node| span.is_some_and(|(start, end)| *node >= start && *node <= end))
}
