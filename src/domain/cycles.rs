//! Circular call detection for diagnostics.
//!
//! One representative cycle per strongly connected component; cycles are not enumerated.
//! Tree traversal does not depend on this module to terminate.

use std::collections::{HashMap, HashSet, VecDeque};

use petgraph::algo::tarjan_scc;

use crate::domain::graph::CallGraph;
use crate::domain::node::MethodSignature;

/// A closed call path: the first signature is repeated at the end.
pub type Cycle = Vec<MethodSignature>;

pub struct CycleDetector<'a> {
    graph: &'a CallGraph,
}

impl<'a> CycleDetector<'a> {
    pub fn new(graph: &'a CallGraph) -> Self {
        Self { graph }
    }

    /// Signatures of every nontrivial component (more than one node, or a self-loop).
    pub fn components(&self) -> Vec<Vec<&'a str>> {
        let mut components: Vec<Vec<&'a str>> = tarjan_scc(&self.graph.graph)
            .into_iter()
            .filter(|scc| {
                scc.len() > 1
                    || scc
                        .first()
                        .is_some_and(|&idx| self.graph.graph.find_edge(idx, idx).is_some())
            })
            .map(|scc| {
                let mut members: Vec<&'a str> = scc
                    .into_iter()
                    .map(|idx| self.graph.graph[idx].signature.as_str())
                    .collect();
                members.sort_unstable();
                members
            })
            .collect();
        components.sort();
        components
    }

    /// One cycle per component, starting at the component's smallest signature.
    pub fn detect(&self) -> Vec<Cycle> {
        self.components()
            .into_iter()
            .filter_map(|members| self.cycle_within(&members))
            .collect()
    }

    /// Shortest cycle through the first member, searching only the induced subgraph.
    fn cycle_within(&self, members: &[&'a str]) -> Option<Cycle> {
        let start = *members.first()?;
        let allowed: HashSet<&str> = members.iter().copied().collect();

        let mut parent: HashMap<&str, &str> = HashMap::new();
        let mut queue: VecDeque<&str> = VecDeque::from([start]);
        let mut seen: HashSet<&str> = HashSet::from([start]);

        while let Some(current) = queue.pop_front() {
            for next in self.graph.successors(current) {
                if !allowed.contains(next) {
                    continue;
                }
                if next == start {
                    let mut path = vec![current];
                    let mut cursor = current;
                    while let Some(&prev) = parent.get(cursor) {
                        path.push(prev);
                        cursor = prev;
                    }
                    path.reverse();
                    // `path` begins at `start` (or is just `[start]` for a self-loop).
                    let mut cycle: Cycle = path.into_iter().map(str::to_string).collect();
                    cycle.push(start.to_string());
                    return Some(cycle);
                }
                if seen.insert(next) {
                    parent.insert(next, current);
                    queue.push_back(next);
                }
            }
        }
        None
    }
}
