use std::collections::{HashMap, HashSet};

use super::graph::CitizenGraph;
use super::normalize::identity_key;

#[derive(Clone, Debug, Default)]
struct Adjacency {
    neighbors: Vec<usize>,
    incident: Vec<usize>,
}

#[derive(Clone, Debug, Default)]
pub struct AdjacencyIndex {
    by_key: HashMap<String, Adjacency>,
    max_degree: usize,
}

impl AdjacencyIndex {
    pub fn build(graph: &CitizenGraph) -> Self {
        let mut by_key: HashMap<String, Adjacency> = graph
            .nodes()
            .iter()
            .map(|node| (identity_key(&node.id), Adjacency::default()))
            .collect();

        let mut seen_pairs = HashSet::with_capacity(graph.link_count() * 2);
        for (link_index, link) in graph.links().iter().enumerate() {
            let (Some(source), Some(target)) =
                (graph.node_index(&link.source), graph.node_index(&link.target))
            else {
                continue;
            };

            for (from, to) in [(source, target), (target, source)] {
                let key = identity_key(&graph.nodes()[from].id);
                let entry = by_key.entry(key).or_default();
                entry.incident.push(link_index);
                if seen_pairs.insert((from, to)) {
                    entry.neighbors.push(to);
                }
            }
        }

        let max_degree = by_key
            .values()
            .map(|adjacency| adjacency.incident.len())
            .max()
            .unwrap_or(0);

        Self { by_key, max_degree }
    }

    pub fn degree(&self, id: &str) -> usize {
        self.by_key
            .get(&identity_key(id))
            .map_or(0, |adjacency| adjacency.incident.len())
    }

    pub fn neighbors(&self, id: &str) -> &[usize] {
        self.by_key
            .get(&identity_key(id))
            .map_or(&[], |adjacency| adjacency.neighbors.as_slice())
    }

    pub fn incident_links(&self, id: &str) -> &[usize] {
        self.by_key
            .get(&identity_key(id))
            .map_or(&[], |adjacency| adjacency.incident.as_slice())
    }

    pub fn max_degree(&self) -> usize {
        self.max_degree
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    use super::*;
    use crate::citizens::graph::{CategoryKind, CitizenAttributes, Link, Node, RelationType};

    fn graph(ids: &[&str], links: &[(&str, &str, RelationType)]) -> CitizenGraph {
        let nodes = ids
            .iter()
            .map(|id| Node::citizen((*id).to_owned(), CitizenAttributes::default()))
            .chain([Node::category(CategoryKind::TokenHolder)])
            .collect();
        let links = links
            .iter()
            .map(|(source, target, relation)| Link::new(*source, *target, *relation))
            .collect();
        CitizenGraph::from_parts(nodes, links).0
    }

    #[test]
    fn counts_both_endpoints_and_dedups_neighbors() {
        let graph = graph(
            &["0x01", "0x02", "0x03"],
            &[
                ("0x01", "0x02", RelationType::SocialFollow),
                ("0x02", "0x01", RelationType::SocialFollow),
                ("0x01", "TECHolder", RelationType::TokenHolding),
            ],
        );

        let index = AdjacencyIndex::build(&graph);

        assert_eq!(index.degree("0x01"), 3);
        assert_eq!(index.degree("0X02"), 2);
        assert_eq!(index.degree("0x03"), 0);
        assert_eq!(index.degree("TECHolder"), 1);
        assert_eq!(index.max_degree(), 3);
        assert_eq!(index.neighbors("0x01"), &[1, 3]);
        assert_eq!(index.incident_links("0x02"), &[0, 1]);
        assert!(index.neighbors("0x03").is_empty());
    }

    #[test]
    fn unknown_identity_has_no_connectivity() {
        let index = AdjacencyIndex::build(&graph(&["0x01"], &[]));

        assert_eq!(index.degree("0xmissing"), 0);
        assert!(index.incident_links("0xmissing").is_empty());
        assert_eq!(index.max_degree(), 0);
    }

    #[test]
    fn hub_lists_each_member_once() {
        let ids = (0..3000).map(|n| format!("0x{n:04x}")).collect::<Vec<_>>();
        let id_refs = ids.iter().map(String::as_str).collect::<Vec<_>>();
        let mut links = id_refs
            .iter()
            .map(|id| (*id, "TECHolder", RelationType::TokenHolding))
            .collect::<Vec<_>>();
        links.push(("0x0000", "0x0001", RelationType::SocialFollow));
        links.push(("0x0001", "0x0000", RelationType::SocialFollow));

        let index = AdjacencyIndex::build(&graph(&id_refs, &links));

        assert_eq!(index.degree("TECHolder"), 3000);
        assert_eq!(index.neighbors("TECHolder").len(), 3000);
        assert_eq!(index.degree("0x0000"), 3);
        assert_eq!(index.neighbors("0x0000"), &[3000, 1]);
    }

    proptest! {
        #[test]
        fn degree_matches_incident_link_count(
            pairs in prop::collection::vec((0usize..5, 0usize..5), 0..20)
        ) {
            let ids = ["0x00", "0x01", "0x02", "0x03", "0x04"];
            let links = pairs
                .iter()
                .filter(|(a, b)| a != b)
                .map(|(a, b)| (ids[*a], ids[*b], RelationType::PeerTransfer))
                .collect::<Vec<_>>();
            let graph = graph(&ids, &links);
            let index = AdjacencyIndex::build(&graph);

            for node in graph.nodes() {
                let expected = graph
                    .links()
                    .iter()
                    .filter(|link| link.source == node.id || link.target == node.id)
                    .count();
                prop_assert_eq!(index.degree(&node.id), expected);
                prop_assert_eq!(index.incident_links(&node.id).len(), expected);
            }
        }
    }
}
