use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use tracing::debug;

use super::links::synthesize;
use super::normalize::{identity_key, normalize};
use super::source::SourceSet;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RelationType {
    TokenHolding,
    ScoreMembership,
    TrustMembership,
    SocialFollow,
    Referral,
    PeerTransfer,
    PoapMembership,
}

impl RelationType {
    pub const ALL: [Self; 7] = [
        Self::SocialFollow,
        Self::Referral,
        Self::PoapMembership,
        Self::ScoreMembership,
        Self::TrustMembership,
        Self::PeerTransfer,
        Self::TokenHolding,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Self::TokenHolding => "TECHolder",
            Self::ScoreMembership => "RegenScore",
            Self::TrustMembership => "TrustedSeed",
            Self::SocialFollow => "FarcasterConnection",
            Self::Referral => "BadgeHolderReferral",
            Self::PeerTransfer => "CitizenTransaction",
            Self::PoapMembership => "RegenPOAP",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::TokenHolding => "TEC Holder",
            Self::ScoreMembership => "RegenScore",
            Self::TrustMembership => "Trusted Seed",
            Self::SocialFollow => "Farcaster connections",
            Self::Referral => "BadgeHolder Referral",
            Self::PeerTransfer => "Mutual Transactions",
            Self::PoapMembership => "ReFi POAPs",
        }
    }

    pub fn category(self) -> Option<CategoryKind> {
        match self {
            Self::TokenHolding => Some(CategoryKind::TokenHolder),
            Self::ScoreMembership => Some(CategoryKind::Score),
            Self::TrustMembership => Some(CategoryKind::Trust),
            Self::PoapMembership => Some(CategoryKind::Poap),
            Self::SocialFollow | Self::Referral | Self::PeerTransfer => None,
        }
    }
}

impl fmt::Display for RelationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for RelationType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let wanted = value.trim();
        Self::ALL
            .into_iter()
            .find(|relation| relation.key().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                let known = Self::ALL.map(Self::key).join(", ");
                format!("unknown relation `{wanted}` (expected one of: {known})")
            })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CategoryKind {
    TokenHolder,
    Score,
    Trust,
    Poap,
}

impl CategoryKind {
    pub const ALL: [Self; 4] = [Self::TokenHolder, Self::Score, Self::Trust, Self::Poap];

    pub fn node_id(self) -> &'static str {
        self.relation().key()
    }

    pub fn relation(self) -> RelationType {
        match self {
            Self::TokenHolder => RelationType::TokenHolding,
            Self::Score => RelationType::ScoreMembership,
            Self::Trust => RelationType::TrustMembership,
            Self::Poap => RelationType::PoapMembership,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeKind {
    Citizen,
    Category(CategoryKind),
}

impl NodeKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Citizen => "Citizens",
            Self::Category(kind) => kind.relation().label(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Profile {
    pub image: Option<String>,
    pub handle: Option<String>,
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub following_count: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReferralEntry {
    pub address: String,
    pub round: String,
    pub method: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReferralMetadata {
    pub referred_by: Vec<ReferralEntry>,
    pub referred: Vec<ReferralEntry>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CitizenAttributes {
    pub alias: Option<String>,
    pub profile: Profile,
    pub token_balance: Option<String>,
    pub score: Option<f64>,
    pub trusted: bool,
    pub poap_holder: bool,
    pub has_social_profile: bool,
    pub referrals: Option<ReferralMetadata>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub id: String,
    pub kind: NodeKind,
    pub citizen: Option<CitizenAttributes>,
}

impl Node {
    pub fn citizen(id: String, attributes: CitizenAttributes) -> Self {
        Self {
            id,
            kind: NodeKind::Citizen,
            citizen: Some(attributes),
        }
    }

    pub fn category(kind: CategoryKind) -> Self {
        Self {
            id: kind.node_id().to_owned(),
            kind: NodeKind::Category(kind),
            citizen: None,
        }
    }

    pub fn is_citizen(&self) -> bool {
        self.kind == NodeKind::Citizen
    }

    pub fn alias(&self) -> Option<&str> {
        self.citizen.as_ref().and_then(|citizen| citizen.alias.as_deref())
    }

    pub fn handle(&self) -> Option<&str> {
        self.citizen
            .as_ref()
            .and_then(|citizen| citizen.profile.handle.as_deref())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Link {
    pub source: String,
    pub target: String,
    pub relation: RelationType,
}

impl Link {
    pub fn new(source: impl Into<String>, target: impl Into<String>, relation: RelationType) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            relation,
        }
    }

    pub fn is_self_loop(&self) -> bool {
        identity_key(&self.source) == identity_key(&self.target)
    }
}

#[derive(Clone, Debug, Default)]
pub struct CitizenGraph {
    nodes: Vec<Node>,
    links: Vec<Link>,
    index_by_key: HashMap<String, usize>,
}

impl CitizenGraph {
    /// Builds a graph from candidate parts. Later nodes that repeat an identity are
    /// dropped, link endpoints are rewritten to the stored node id, and links whose
    /// endpoints are missing are omitted. Returns the graph and the omitted link count.
    pub fn from_parts(nodes: Vec<Node>, links: Vec<Link>) -> (Self, usize) {
        let mut index_by_key = HashMap::with_capacity(nodes.len());
        let mut kept_nodes = Vec::with_capacity(nodes.len());
        for node in nodes {
            let key = identity_key(&node.id);
            if index_by_key.contains_key(&key) {
                continue;
            }
            index_by_key.insert(key, kept_nodes.len());
            kept_nodes.push(node);
        }

        let mut dangling = 0usize;
        let mut kept_links = Vec::with_capacity(links.len());
        for link in links {
            let source = index_by_key.get(&identity_key(&link.source)).copied();
            let target = index_by_key.get(&identity_key(&link.target)).copied();
            match (source, target) {
                (Some(source), Some(target)) => kept_links.push(Link {
                    source: kept_nodes[source].id.clone(),
                    target: kept_nodes[target].id.clone(),
                    relation: link.relation,
                }),
                _ => dangling += 1,
            }
        }

        (
            Self {
                nodes: kept_nodes,
                links: kept_links,
                index_by_key,
            },
            dangling,
        )
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn node_index(&self, id: &str) -> Option<usize> {
        self.index_by_key.get(&identity_key(id)).copied()
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.node_index(id).map(|index| &self.nodes[index])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index_by_key.contains_key(&identity_key(id))
    }

    pub fn citizens(&self) -> impl Iterator<Item = &Node> + '_ {
        self.nodes.iter().filter(|node| node.is_citizen())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AssemblyReport {
    pub citizens: usize,
    pub duplicate_citizens: usize,
    pub links: usize,
    pub dangling_links: usize,
    pub self_loops: usize,
    pub duplicate_links: usize,
}

#[cfg(test)]
pub(crate) fn assemble(sources: &SourceSet) -> CitizenGraph {
    assemble_with_report(sources).0
}

pub fn assemble_with_report(sources: &SourceSet) -> (CitizenGraph, AssemblyReport) {
    let mut citizens = normalize(sources);
    let mut synthesized = synthesize(&citizens, sources);

    let mut nodes = Vec::with_capacity(citizens.roster.len() + CategoryKind::ALL.len());
    for key in &citizens.roster {
        let mut attributes = citizens.attributes.remove(key).unwrap_or_default();
        attributes.referrals = synthesized.referrals.remove(key);
        nodes.push(Node::citizen(key.clone(), attributes));
    }

    // A hub only exists once some citizen actually belongs to it.
    for kind in CategoryKind::ALL {
        if synthesized
            .links
            .iter()
            .any(|link| link.relation == kind.relation())
        {
            nodes.push(Node::category(kind));
        }
    }

    let (graph, dangling_links) = CitizenGraph::from_parts(nodes, synthesized.links);
    let report = AssemblyReport {
        citizens: citizens.roster.len(),
        duplicate_citizens: citizens.duplicates,
        links: graph.link_count(),
        dangling_links,
        self_loops: synthesized.self_loops,
        duplicate_links: synthesized.duplicates,
    };

    debug!(
        nodes = graph.node_count(),
        links = report.links,
        dangling = report.dangling_links,
        self_loops = report.self_loops,
        duplicates = report.duplicate_links,
        "assembled citizen graph"
    );

    (graph, report)
}
