// SPDX-FileCopyrightText: 2026 The Vellum Authors
// SPDX-License-Identifier: LicenseRef-Vellum-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Vellum and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Rank assignment and in-rank ordering for a directed graph of element ids.
//!
//! Pipeline:
//! - Cycles are broken by reversing DFS back-edges (visiting nodes in input order).
//! - Ranks come from longest-path layering over a deterministic topological order.
//! - Each rank starts ordered by the caller's position hint, then alternating median sweeps
//!   (barycenter tie-break) try to reduce crossings. An order is only replaced by one with
//!   strictly fewer crossings.
//!
//! Long edges are not split into dummy nodes; crossings are counted between adjacent ranks.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use crate::model::ElementId;

const MAX_SWEEPS: usize = 8;

#[derive(Debug, Clone, PartialEq)]
pub struct LayerNode {
    pub id: ElementId,
    /// Cross-axis position used for the initial in-rank order.
    pub hint: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layering {
    layers: Vec<Vec<ElementId>>,
    ranks: BTreeMap<ElementId, usize>,
    reversed_edges: Vec<(ElementId, ElementId)>,
    crossings: usize,
}

impl Layering {
    pub fn layers(&self) -> &[Vec<ElementId>] {
        &self.layers
    }

    pub fn rank(&self, node_id: &ElementId) -> Option<usize> {
        self.ranks.get(node_id).copied()
    }

    pub fn order(&self, node_id: &ElementId) -> Option<usize> {
        let rank = self.rank(node_id)?;
        self.layers[rank].iter().position(|id| id == node_id)
    }

    /// Edges that were flipped to make the graph acyclic, in their original direction.
    pub fn reversed_edges(&self) -> &[(ElementId, ElementId)] {
        &self.reversed_edges
    }

    /// Crossings between adjacent ranks in the final order.
    pub fn crossings(&self) -> usize {
        self.crossings
    }
}

/// Layers `nodes` connected by `edges` (source, target).
///
/// Self-loops, duplicate edges and edges touching unknown nodes are ignored.
pub fn layer_graph(nodes: &[LayerNode], edges: &[(ElementId, ElementId)]) -> Layering {
    let known = nodes.iter().map(|node| &node.id).collect::<BTreeSet<_>>();
    let mut seen = BTreeSet::new();
    let mut graph_edges = Vec::new();
    for (from, to) in edges {
        if from == to || !known.contains(from) || !known.contains(to) {
            continue;
        }
        if seen.insert((from.clone(), to.clone())) {
            graph_edges.push((from.clone(), to.clone()));
        }
    }

    let (acyclic, reversed_edges) = break_cycles(nodes, &graph_edges);

    let mut outgoing = BTreeMap::<ElementId, Vec<ElementId>>::new();
    let mut predecessors = BTreeMap::<ElementId, Vec<ElementId>>::new();
    for node in nodes {
        outgoing.entry(node.id.clone()).or_default();
        predecessors.entry(node.id.clone()).or_default();
    }
    for (from, to) in &acyclic {
        if let Some(tos) = outgoing.get_mut(from) {
            tos.push(to.clone());
        }
        if let Some(froms) = predecessors.get_mut(to) {
            froms.push(from.clone());
        }
    }
    for tos in outgoing.values_mut() {
        tos.sort();
        tos.dedup();
    }
    for froms in predecessors.values_mut() {
        froms.sort();
        froms.dedup();
    }

    let topo = topo_sort(&outgoing);
    let ranks = assign_ranks(&topo, &outgoing);

    let max_rank = ranks.values().copied().max().unwrap_or(0);
    let mut layers = vec![Vec::<ElementId>::new(); if nodes.is_empty() { 0 } else { max_rank + 1 }];
    let hints = nodes
        .iter()
        .map(|node| (node.id.clone(), node.hint))
        .collect::<BTreeMap<_, _>>();
    for node in nodes {
        if let Some(&rank) = ranks.get(&node.id) {
            if !layers[rank].contains(&node.id) {
                layers[rank].push(node.id.clone());
            }
        }
    }
    for layer in layers.iter_mut() {
        layer.sort_by(|a, b| {
            let ha = hints.get(a).copied().unwrap_or(0.0);
            let hb = hints.get(b).copied().unwrap_or(0.0);
            ha.total_cmp(&hb).then_with(|| a.cmp(b))
        });
    }

    let (layers, crossings) = minimize_crossings(layers, &ranks, &outgoing, &predecessors);

    Layering {
        layers,
        ranks,
        reversed_edges,
        crossings,
    }
}

/// Splits edges into an acyclic set (with back-edges flipped) and the list of flipped edges.
fn break_cycles(
    nodes: &[LayerNode],
    edges: &[(ElementId, ElementId)],
) -> (Vec<(ElementId, ElementId)>, Vec<(ElementId, ElementId)>) {
    #[derive(Clone, Copy, PartialEq, Eq)]
    enum Mark {
        Unvisited,
        OnStack,
        Done,
    }

    let mut outgoing = BTreeMap::<&ElementId, Vec<&ElementId>>::new();
    for (from, to) in edges {
        outgoing.entry(from).or_default().push(to);
    }
    for tos in outgoing.values_mut() {
        tos.sort();
    }

    let mut marks = nodes
        .iter()
        .map(|node| (&node.id, Mark::Unvisited))
        .collect::<BTreeMap<_, _>>();
    let mut back_edges = BTreeSet::<(ElementId, ElementId)>::new();

    for root in nodes.iter().map(|node| &node.id) {
        if marks.get(root) != Some(&Mark::Unvisited) {
            continue;
        }

        // Iterative DFS: (node, next child index).
        let mut stack = vec![(root, 0usize)];
        marks.insert(root, Mark::OnStack);
        while let Some((node, child_idx)) = stack.last().copied() {
            let children = outgoing.get(node).map(Vec::as_slice).unwrap_or(&[]);
            let Some(&child) = children.get(child_idx) else {
                marks.insert(node, Mark::Done);
                stack.pop();
                continue;
            };
            if let Some(top) = stack.last_mut() {
                top.1 += 1;
            }

            match marks.get(child).copied().unwrap_or(Mark::Done) {
                Mark::Unvisited => {
                    marks.insert(child, Mark::OnStack);
                    stack.push((child, 0));
                }
                Mark::OnStack => {
                    back_edges.insert((node.clone(), child.clone()));
                }
                Mark::Done => {}
            }
        }
    }

    let mut acyclic = Vec::with_capacity(edges.len());
    let mut reversed = Vec::new();
    for (from, to) in edges {
        if back_edges.contains(&(from.clone(), to.clone())) {
            acyclic.push((to.clone(), from.clone()));
            reversed.push((from.clone(), to.clone()));
        } else {
            acyclic.push((from.clone(), to.clone()));
        }
    }
    (acyclic, reversed)
}

fn topo_sort(outgoing: &BTreeMap<ElementId, Vec<ElementId>>) -> Vec<ElementId> {
    let mut indegree = outgoing
        .keys()
        .map(|node_id| (node_id.clone(), 0usize))
        .collect::<BTreeMap<_, _>>();
    for tos in outgoing.values() {
        for to in tos {
            if let Some(degree) = indegree.get_mut(to) {
                *degree += 1;
            }
        }
    }

    let mut ready = indegree
        .iter()
        .filter_map(|(node_id, degree)| (*degree == 0).then(|| node_id.clone()))
        .collect::<BTreeSet<_>>();

    let mut topo = Vec::with_capacity(indegree.len());
    while let Some(next) = ready.pop_first() {
        for to in outgoing.get(&next).map(Vec::as_slice).unwrap_or(&[]) {
            if let Some(degree) = indegree.get_mut(to) {
                *degree = degree.saturating_sub(1);
                if *degree == 0 {
                    ready.insert(to.clone());
                }
            }
        }
        topo.push(next);
    }

    topo
}

/// Longest-path ranks: every node sits one rank below its deepest predecessor.
fn assign_ranks(
    topo: &[ElementId],
    outgoing: &BTreeMap<ElementId, Vec<ElementId>>,
) -> BTreeMap<ElementId, usize> {
    let mut ranks = topo
        .iter()
        .map(|node_id| (node_id.clone(), 0usize))
        .collect::<BTreeMap<_, _>>();

    for from in topo {
        let from_rank = ranks.get(from).copied().unwrap_or(0);
        for to in outgoing.get(from).map(Vec::as_slice).unwrap_or(&[]) {
            let to_rank = ranks.get(to).copied().unwrap_or(0);
            ranks.insert(to.clone(), to_rank.max(from_rank + 1));
        }
    }

    ranks
}

fn minimize_crossings(
    initial: Vec<Vec<ElementId>>,
    ranks: &BTreeMap<ElementId, usize>,
    outgoing: &BTreeMap<ElementId, Vec<ElementId>>,
    predecessors: &BTreeMap<ElementId, Vec<ElementId>>,
) -> (Vec<Vec<ElementId>>, usize) {
    let mut best_crossings = count_crossings(&initial, ranks, outgoing);
    let mut best = initial;
    if best_crossings == 0 || best.len() < 2 {
        return (best, best_crossings);
    }

    let mut current = best.clone();
    for sweep in 0..MAX_SWEEPS {
        if sweep % 2 == 0 {
            for rank in 1..current.len() {
                let positions = positions_of(&current);
                sort_rank_by_median(&mut current[rank], &positions, predecessors, ranks, rank, true);
            }
        } else {
            for rank in (0..current.len().saturating_sub(1)).rev() {
                let positions = positions_of(&current);
                sort_rank_by_median(&mut current[rank], &positions, outgoing, ranks, rank, false);
            }
        }

        let crossings = count_crossings(&current, ranks, outgoing);
        if crossings < best_crossings {
            best_crossings = crossings;
            best = current.clone();
            if best_crossings == 0 {
                break;
            }
        }
    }

    (best, best_crossings)
}

fn positions_of(layers: &[Vec<ElementId>]) -> BTreeMap<ElementId, usize> {
    layers
        .iter()
        .flat_map(|layer| {
            layer
                .iter()
                .enumerate()
                .map(|(idx, node_id)| (node_id.clone(), idx))
        })
        .collect()
}

/// Reorders one rank by the median position of its neighbours on the already-swept side.
///
/// Nodes without such neighbours keep their current position as key, so they stay put
/// relative to their surroundings.
fn sort_rank_by_median(
    rank_nodes: &mut [ElementId],
    positions: &BTreeMap<ElementId, usize>,
    neighbours: &BTreeMap<ElementId, Vec<ElementId>>,
    ranks: &BTreeMap<ElementId, usize>,
    rank: usize,
    look_up: bool,
) {
    let keys = rank_nodes
        .iter()
        .enumerate()
        .map(|(own_idx, node_id)| {
            let mut neighbour_positions = neighbours
                .get(node_id)
                .map(Vec::as_slice)
                .unwrap_or(&[])
                .iter()
                .filter(|other| {
                    ranks.get(*other).is_some_and(|&other_rank| {
                        if look_up {
                            other_rank < rank
                        } else {
                            other_rank > rank
                        }
                    })
                })
                .filter_map(|other| positions.get(other).map(|&pos| pos as f64))
                .collect::<Vec<_>>();
            neighbour_positions.sort_by(f64::total_cmp);

            let key = match median(&neighbour_positions) {
                Some(median) => SortKey {
                    median,
                    barycenter: neighbour_positions.iter().sum::<f64>()
                        / neighbour_positions.len() as f64,
                },
                None => SortKey {
                    median: own_idx as f64,
                    barycenter: own_idx as f64,
                },
            };
            (node_id.clone(), key, own_idx)
        })
        .collect::<Vec<_>>();

    let mut sorted = keys;
    sorted.sort_by(|(_, a, a_idx), (_, b, b_idx)| {
        a.median
            .total_cmp(&b.median)
            .then_with(|| a.barycenter.total_cmp(&b.barycenter))
            .then_with(|| a_idx.cmp(b_idx))
    });

    for (slot, (node_id, _, _)) in rank_nodes.iter_mut().zip(sorted) {
        *slot = node_id;
    }
}

#[derive(Debug, Clone, Copy)]
struct SortKey {
    median: f64,
    barycenter: f64,
}

fn median(sorted: &[f64]) -> Option<f64> {
    match sorted.len() {
        0 => None,
        n if n % 2 == 1 => Some(sorted[n / 2]),
        n => Some((sorted[n / 2 - 1] + sorted[n / 2]) / 2.0),
    }
}

/// Pairwise crossings of edges between consecutive ranks.
pub fn count_crossings(
    layers: &[Vec<ElementId>],
    ranks: &BTreeMap<ElementId, usize>,
    outgoing: &BTreeMap<ElementId, Vec<ElementId>>,
) -> usize {
    let positions = positions_of(layers);
    let mut total = 0;

    for (rank, layer) in layers.iter().enumerate() {
        let mut segments = Vec::new();
        for from in layer {
            for to in outgoing.get(from).map(Vec::as_slice).unwrap_or(&[]) {
                if ranks.get(to) != Some(&(rank + 1)) {
                    continue;
                }
                if let (Some(&a), Some(&b)) = (positions.get(from), positions.get(to)) {
                    segments.push((a, b));
                }
            }
        }

        for (i, (a1, b1)) in segments.iter().enumerate() {
            for (a2, b2) in &segments[i + 1..] {
                if (a1.cmp(a2) == Ordering::Less && b1.cmp(b2) == Ordering::Greater)
                    || (a1.cmp(a2) == Ordering::Greater && b1.cmp(b2) == Ordering::Less)
                {
                    total += 1;
                }
            }
        }
    }

    total
}
