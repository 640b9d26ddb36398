use std::collections::{HashMap, HashSet};

use super::graph::{CategoryKind, Link, ReferralEntry, ReferralMetadata, RelationType};
use super::normalize::{NormalizedCitizens, ZERO_ADDRESS, identity_key};
use super::source::SourceSet;

#[derive(Clone, Debug, Default)]
pub struct SynthesizedLinks {
    pub links: Vec<Link>,
    pub referrals: HashMap<String, ReferralMetadata>,
    pub self_loops: usize,
    pub duplicates: usize,
}

#[derive(Default)]
struct LinkSink {
    seen: HashSet<Link>,
    out: SynthesizedLinks,
}

impl LinkSink {
    fn push(&mut self, source: String, target: String, relation: RelationType) {
        let link = Link::new(source, target, relation);
        if link.is_self_loop() {
            self.out.self_loops += 1;
            return;
        }
        if !self.seen.insert(link.clone()) {
            self.out.duplicates += 1;
            return;
        }
        self.out.links.push(link);
    }
}

pub fn synthesize(citizens: &NormalizedCitizens, sources: &SourceSet) -> SynthesizedLinks {
    let mut sink = LinkSink::default();

    for key in &citizens.roster {
        for kind in CategoryKind::ALL {
            if citizens.is_member(kind, key) {
                sink.push(key.clone(), kind.node_id().to_owned(), kind.relation());
            }
        }
    }

    for follow in sources.follows.iter().flatten() {
        sink.push(
            identity_key(&follow.source),
            identity_key(&follow.target),
            RelationType::SocialFollow,
        );
    }

    for transfer in sources.transfers.iter().flatten() {
        sink.push(
            identity_key(&transfer.from),
            identity_key(&transfer.to),
            RelationType::PeerTransfer,
        );
    }

    for record in sources.referrals.iter().flatten() {
        let referrer = identity_key(&record.referred_by);
        let recipient = identity_key(&record.recipient);
        if referrer.is_empty() || referrer == ZERO_ADDRESS || recipient.is_empty() {
            continue;
        }

        if referrer != recipient {
            let referrals = &mut sink.out.referrals;
            referrals
                .entry(referrer.clone())
                .or_default()
                .referred
                .push(ReferralEntry {
                    address: recipient.clone(),
                    round: record.rpgf_round.clone(),
                    method: record.referred_method.clone(),
                });
            referrals
                .entry(recipient.clone())
                .or_default()
                .referred_by
                .push(ReferralEntry {
                    address: referrer.clone(),
                    round: record.rpgf_round.clone(),
                    method: record.referred_method.clone(),
                });
        }

        sink.push(referrer, recipient, RelationType::Referral);
    }

    sink.out
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::citizens::normalize::normalize;
    use crate::citizens::records::{
        CitizenRecord, FollowRecord, PoapHolderRecord, ReferralRecord, TransferRecord,
    };

    fn sources_with(citizens: &[&str]) -> SourceSet {
        SourceSet {
            citizens: Some(
                citizens
                    .iter()
                    .map(|id| CitizenRecord {
                        id: (*id).to_owned(),
                        ..Default::default()
                    })
                    .collect(),
            ),
            ..Default::default()
        }
    }

    #[test]
    fn duplicate_rows_emit_one_link() {
        let mut sources = sources_with(&["0x01", "0x02"]);
        sources.transfers = Some(vec![
            TransferRecord {
                from: "0x01".to_owned(),
                to: "0x02".to_owned(),
                ..Default::default()
            },
            TransferRecord {
                from: "0X01".to_owned(),
                to: "0x02".to_owned(),
                ..Default::default()
            },
        ]);

        let synthesized = synthesize(&normalize(&sources), &sources);

        assert_eq!(
            synthesized.links,
            vec![Link::new("0x01", "0x02", RelationType::PeerTransfer)]
        );
        assert_eq!(synthesized.duplicates, 1);
    }

    #[test]
    fn opposite_directions_are_distinct_links() {
        let mut sources = sources_with(&["0x01", "0x02"]);
        sources.follows = Some(vec![
            FollowRecord {
                source: "0x01".to_owned(),
                target: "0x02".to_owned(),
            },
            FollowRecord {
                source: "0x02".to_owned(),
                target: "0x01".to_owned(),
            },
        ]);

        let synthesized = synthesize(&normalize(&sources), &sources);

        assert_eq!(synthesized.links.len(), 2);
    }

    #[test]
    fn category_links_only_for_roster_members() {
        let mut sources = sources_with(&["0xAA"]);
        sources.poap_holders = Some(vec![
            PoapHolderRecord {
                holder: "0xaa".to_owned(),
                count: 2,
            },
            PoapHolderRecord {
                holder: "0xBB".to_owned(),
                count: 1,
            },
        ]);

        let synthesized = synthesize(&normalize(&sources), &sources);

        assert_eq!(
            synthesized.links,
            vec![Link::new("0xaa", "RegenPOAP", RelationType::PoapMembership)]
        );
    }

    #[test]
    fn zero_address_referrals_are_ignored() {
        let mut sources = sources_with(&["0x01"]);
        sources.referrals = Some(vec![ReferralRecord {
            recipient: "0x01".to_owned(),
            referred_by: ZERO_ADDRESS.to_owned(),
            rpgf_round: "4".to_owned(),
            referred_method: "Default".to_owned(),
        }]);

        let synthesized = synthesize(&normalize(&sources), &sources);

        assert!(synthesized.links.is_empty());
        assert!(synthesized.referrals.is_empty());
    }

    #[test]
    fn referral_metadata_accumulates_per_identity() {
        let mut sources = sources_with(&["0x01", "0x02", "0x03"]);
        sources.referrals = Some(
            ["0x02", "0x03"]
                .iter()
                .map(|recipient| ReferralRecord {
                    recipient: (*recipient).to_owned(),
                    referred_by: "0x01".to_owned(),
                    rpgf_round: "3".to_owned(),
                    referred_method: "Nomination".to_owned(),
                })
                .collect(),
        );

        let synthesized = synthesize(&normalize(&sources), &sources);

        let referrer = &synthesized.referrals["0x01"];
        assert_eq!(referrer.referred.len(), 2);
        assert!(referrer.referred_by.is_empty());
        assert_eq!(synthesized.referrals["0x03"].referred_by[0].address, "0x01");
    }
}
