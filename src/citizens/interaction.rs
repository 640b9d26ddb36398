use std::collections::HashSet;

use tracing::debug;

use super::filter::GraphView;
use super::normalize::identity_key;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InteractionState {
    Idle,
    Hovering(String),
    HoveringLink(usize),
    Selected(String),
    SearchPreview(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InteractionEffect {
    OpenDetails(String),
    CloseDetails,
    UpdateLocation(String),
    ClearLocation,
    FocusCamera(String),
}

// Nodes (by identity key) and links (by index into the visible link list) to emphasise.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HighlightSet {
    nodes: HashSet<String>,
    links: HashSet<usize>,
}

impl HighlightSet {
    pub fn around(view: &GraphView, id: &str) -> Self {
        let graph = view.graph();
        let index = view.index();

        let mut nodes = HashSet::with_capacity(index.neighbors(id).len() + 1);
        nodes.insert(identity_key(id));
        nodes.extend(
            index
                .neighbors(id)
                .iter()
                .map(|&neighbor| identity_key(&graph.nodes()[neighbor].id)),
        );

        Self {
            nodes,
            links: index.incident_links(id).iter().copied().collect(),
        }
    }

    pub fn along(view: &GraphView, link_index: usize) -> Self {
        let Some(link) = view.graph().links().get(link_index) else {
            return Self::default();
        };
        Self {
            nodes: HashSet::from([identity_key(&link.source), identity_key(&link.target)]),
            links: HashSet::from([link_index]),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.contains(&identity_key(id))
    }

    pub fn contains_link(&self, link_index: usize) -> bool {
        self.links.contains(&link_index)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Hover {
    Node(String),
    Link(usize),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum PinKind {
    Selected,
    SearchPreview,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct Pin {
    node: String,
    kind: PinKind,
}

#[derive(Clone, Debug, Default)]
pub struct InteractionMachine {
    hovered: Option<Hover>,
    pinned: Option<Pin>,
    highlight: HighlightSet,
}

impl InteractionMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> InteractionState {
        match &self.hovered {
            Some(Hover::Node(node)) => return InteractionState::Hovering(node.clone()),
            Some(Hover::Link(link)) => return InteractionState::HoveringLink(*link),
            None => {}
        }
        match &self.pinned {
            Some(Pin {
                node,
                kind: PinKind::Selected,
            }) => InteractionState::Selected(node.clone()),
            Some(Pin {
                node,
                kind: PinKind::SearchPreview,
            }) => InteractionState::SearchPreview(node.clone()),
            None => InteractionState::Idle,
        }
    }

    pub fn highlight(&self) -> &HighlightSet {
        &self.highlight
    }

    pub fn selected(&self) -> Option<&str> {
        self.pinned.as_ref().map(|pin| pin.node.as_str())
    }

    pub fn pointer_enter(&mut self, view: &GraphView, id: &str) {
        let Some(node) = view.graph().node(id) else {
            return;
        };
        if matches!(&self.hovered, Some(Hover::Node(current)) if *current == node.id) {
            return;
        }
        self.hovered = Some(Hover::Node(node.id.clone()));
        self.recompute(view);
    }

    pub fn pointer_enter_link(&mut self, view: &GraphView, link_index: usize) {
        if link_index >= view.graph().link_count() {
            return;
        }
        if self.hovered == Some(Hover::Link(link_index)) {
            return;
        }
        self.hovered = Some(Hover::Link(link_index));
        self.recompute(view);
    }

    pub fn pointer_leave(&mut self, view: &GraphView) {
        if self.hovered.take().is_some() {
            self.recompute(view);
        }
    }

    pub fn click_node(&mut self, view: &GraphView, id: &str) -> Vec<InteractionEffect> {
        let Some(node) = view.graph().node(id) else {
            return Vec::new();
        };
        let node = node.id.clone();
        self.pinned = Some(Pin {
            node: node.clone(),
            kind: PinKind::Selected,
        });
        self.recompute(view);
        debug!(node = %node, "selected node");
        vec![
            InteractionEffect::OpenDetails(node.clone()),
            InteractionEffect::UpdateLocation(node),
        ]
    }

    pub fn click_background(&mut self, view: &GraphView) -> Vec<InteractionEffect> {
        let Some(pin) = self.pinned.take() else {
            return Vec::new();
        };
        self.recompute(view);
        debug!(node = %pin.node, "cleared selection");
        Self::release_effects(pin.kind)
    }

    pub fn select_search_result(&mut self, view: &GraphView, id: &str) -> Vec<InteractionEffect> {
        let Some(node) = view.graph().node(id).filter(|node| node.is_citizen()) else {
            return Vec::new();
        };
        let node = node.id.clone();
        self.pinned = Some(Pin {
            node: node.clone(),
            kind: PinKind::SearchPreview,
        });
        self.recompute(view);
        debug!(node = %node, "previewing search result");
        vec![InteractionEffect::FocusCamera(node)]
    }

    pub fn refresh(&mut self, view: &GraphView) -> Vec<InteractionEffect> {
        let graph = view.graph();
        let hover_gone = match &self.hovered {
            // Link indices belong to the previous view.
            Some(Hover::Link(_)) => true,
            Some(Hover::Node(node)) => !graph.contains(node),
            None => false,
        };
        if hover_gone {
            self.hovered = None;
        }

        let mut effects = Vec::new();
        if let Some(pin) = self.pinned.take_if(|pin| !graph.contains(&pin.node)) {
            debug!(node = %pin.node, "selection left the visible graph");
            effects = Self::release_effects(pin.kind);
        }

        self.recompute(view);
        effects
    }

    fn release_effects(kind: PinKind) -> Vec<InteractionEffect> {
        match kind {
            PinKind::Selected => vec![
                InteractionEffect::CloseDetails,
                InteractionEffect::ClearLocation,
            ],
            PinKind::SearchPreview => Vec::new(),
        }
    }

    fn recompute(&mut self, view: &GraphView) {
        self.highlight = match (&self.hovered, &self.pinned) {
            (Some(Hover::Node(node)), _) | (None, Some(Pin { node, .. })) => {
                HighlightSet::around(view, node)
            }
            (Some(Hover::Link(link)), _) => HighlightSet::along(view, *link),
            (None, None) => HighlightSet::default(),
        };
    }
}
