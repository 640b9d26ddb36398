use std::collections::BTreeSet;

use tracing::debug;

use super::degree::AdjacencyIndex;
use super::graph::{CitizenGraph, NodeKind, RelationType};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilterSelection {
    node_kinds: BTreeSet<NodeKind>,
    relations: BTreeSet<RelationType>,
}

impl Default for FilterSelection {
    fn default() -> Self {
        Self {
            node_kinds: BTreeSet::from([NodeKind::Citizen]),
            relations: RelationType::ALL.into_iter().collect(),
        }
    }
}

impl FilterSelection {
    pub fn new(
        node_kinds: impl IntoIterator<Item = NodeKind>,
        relations: impl IntoIterator<Item = RelationType>,
    ) -> Self {
        Self {
            node_kinds: node_kinds.into_iter().collect(),
            relations: relations.into_iter().collect(),
        }
    }

    pub fn is_kind_selected(&self, kind: NodeKind) -> bool {
        self.node_kinds.contains(&kind)
    }

    pub fn is_relation_selected(&self, relation: RelationType) -> bool {
        self.relations.contains(&relation)
    }

    pub fn set_kind(&mut self, kind: NodeKind, selected: bool) {
        if selected {
            self.node_kinds.insert(kind);
        } else {
            self.node_kinds.remove(&kind);
        }
    }

    pub fn set_relation(&mut self, relation: RelationType, selected: bool) {
        if selected {
            self.relations.insert(relation);
        } else {
            self.relations.remove(&relation);
        }
    }

    fn keeps_node(&self, kind: NodeKind) -> bool {
        match kind {
            NodeKind::Citizen => self.is_kind_selected(kind),
            NodeKind::Category(category) => {
                self.is_kind_selected(kind) || self.is_relation_selected(category.relation())
            }
        }
    }
}

pub fn filter_graph(full: &CitizenGraph, selection: &FilterSelection) -> CitizenGraph {
    let nodes = full
        .nodes()
        .iter()
        .filter(|node| selection.keeps_node(node.kind))
        .cloned()
        .collect();
    let links = full
        .links()
        .iter()
        .filter(|link| selection.is_relation_selected(link.relation))
        .cloned()
        .collect();

    CitizenGraph::from_parts(nodes, links).0
}

#[derive(Clone, Debug, Default)]
pub struct GraphView {
    graph: CitizenGraph,
    index: AdjacencyIndex,
}

impl GraphView {
    pub fn build(full: &CitizenGraph, selection: &FilterSelection) -> Self {
        let graph = filter_graph(full, selection);
        let index = AdjacencyIndex::build(&graph);
        debug!(
            nodes = graph.node_count(),
            links = graph.link_count(),
            max_degree = index.max_degree(),
            "rebuilt visible graph"
        );
        Self { graph, index }
    }

    pub fn graph(&self) -> &CitizenGraph {
        &self.graph
    }

    pub fn index(&self) -> &AdjacencyIndex {
        &self.index
    }

    pub fn degree(&self, id: &str) -> usize {
        self.index.degree(id)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    use super::*;
    use crate::citizens::graph::{CategoryKind, assemble};
    use crate::citizens::records::{
        CitizenRecord, FollowRecord, TokenHolderRecord, TransferRecord,
    };
    use crate::citizens::source::SourceSet;

    fn citizen(id: &str) -> CitizenRecord {
        CitizenRecord {
            id: id.to_owned(),
            ..Default::default()
        }
    }

    fn sample() -> CitizenGraph {
        assemble(&SourceSet {
            citizens: Some(vec![citizen("0xAA"), citizen("0xBB"), citizen("0xCC")]),
            token_holders: Some(vec![TokenHolderRecord {
                id: "0xaa".to_owned(),
                balance: "1".to_owned(),
            }]),
            follows: Some(vec![FollowRecord {
                source: "0xAA".to_owned(),
                target: "0xBB".to_owned(),
            }]),
            transfers: Some(vec![
                TransferRecord {
                    from: "0xaa".to_owned(),
                    to: "0xcc".to_owned(),
                    ..Default::default()
                },
                TransferRecord {
                    from: "0xBB".to_owned(),
                    to: "0xCC".to_owned(),
                    ..Default::default()
                },
            ]),
            ..Default::default()
        })
    }

    #[test]
    fn dropping_peer_transfer_keeps_other_degrees() {
        let full = sample();
        let all = GraphView::build(&full, &FilterSelection::default());
        assert_eq!(all.degree("0xaa"), 3);

        let mut selection = FilterSelection::default();
        selection.set_relation(RelationType::PeerTransfer, false);
        let view = GraphView::build(&full, &selection);

        assert!(
            view.graph()
                .links()
                .iter()
                .all(|link| link.relation != RelationType::PeerTransfer)
        );
        assert_eq!(view.graph().citizens().count(), 3);
        assert_eq!(view.degree("0xaa"), 2);
        assert_eq!(view.degree("0xbb"), 1);
        assert_eq!(view.degree("0xcc"), 0);
    }

    #[test]
    fn category_node_follows_its_relation() {
        let full = sample();
        let mut selection = FilterSelection::default();
        assert!(filter_graph(&full, &selection).contains("TECHolder"));

        selection.set_relation(RelationType::TokenHolding, false);
        assert!(!filter_graph(&full, &selection).contains("TECHolder"));

        selection.set_kind(NodeKind::Category(CategoryKind::TokenHolder), true);
        let view = filter_graph(&full, &selection);
        assert!(view.contains("TECHolder"));
        assert!(
            view.links()
                .iter()
                .all(|link| link.relation != RelationType::TokenHolding)
        );
    }

    #[test]
    fn hub_kind_hidden_once_relation_is_off() {
        let full = sample();
        let mut selection = FilterSelection::new(
            [NodeKind::Citizen, NodeKind::Category(CategoryKind::TokenHolder)],
            [RelationType::SocialFollow],
        );
        let before = filter_graph(&full, &selection);
        assert!(before.contains("TECHolder"));

        selection.set_kind(NodeKind::Category(CategoryKind::TokenHolder), false);
        let after = filter_graph(&full, &selection);

        assert!(!after.contains("TECHolder"));
        assert_eq!(after.node_count(), before.node_count() - 1);
    }

    #[test]
    fn hiding_citizens_removes_their_links() {
        let full = sample();
        let mut selection = FilterSelection::default();
        selection.set_kind(NodeKind::Citizen, false);

        let view = filter_graph(&full, &selection);

        assert_eq!(view.citizens().count(), 0);
        assert_eq!(view.link_count(), 0);
        assert!(view.contains("TECHolder"));
    }

    fn all_kinds() -> Vec<NodeKind> {
        std::iter::once(NodeKind::Citizen)
            .chain(CategoryKind::ALL.into_iter().map(NodeKind::Category))
            .collect()
    }

    fn arb_selection() -> impl Strategy<Value = FilterSelection> {
        (
            prop::sample::subsequence(all_kinds(), 0..=all_kinds().len()),
            prop::sample::subsequence(RelationType::ALL.to_vec(), 0..=RelationType::ALL.len()),
        )
            .prop_map(|(kinds, relations)| FilterSelection::new(kinds, relations))
    }

    proptest! {
        #[test]
        fn filtered_links_resolve(selection in arb_selection()) {
            let view = filter_graph(&sample(), &selection);
            for link in view.links() {
                prop_assert!(view.contains(&link.source));
                prop_assert!(view.contains(&link.target));
            }
        }

        #[test]
        fn removing_a_relation_never_adds_links(
            selection in arb_selection(),
            relation in prop::sample::select(RelationType::ALL.to_vec()),
        ) {
            let full = sample();
            let before = filter_graph(&full, &selection);
            let mut narrowed = selection.clone();
            narrowed.set_relation(relation, false);
            let after = filter_graph(&full, &narrowed);
            prop_assert!(after.link_count() <= before.link_count());
            prop_assert!(after.node_count() <= before.node_count());
        }

        #[test]
        fn removing_a_kind_never_adds_nodes(
            selection in arb_selection(),
            kind in prop::sample::select(all_kinds()),
        ) {
            let full = sample();
            let before = filter_graph(&full, &selection);
            let mut narrowed = selection.clone();
            narrowed.set_kind(kind, false);
            let after = filter_graph(&full, &narrowed);
            prop_assert!(after.node_count() <= before.node_count());
        }
    }
}
