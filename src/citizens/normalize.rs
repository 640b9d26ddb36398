use std::collections::{HashMap, HashSet};

use super::graph::{CategoryKind, CitizenAttributes, Profile};
use super::source::SourceSet;

pub const ZERO_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

pub fn identity_key(raw: &str) -> String {
    raw.trim().to_lowercase()
}

#[derive(Clone, Debug, Default)]
pub struct NormalizedCitizens {
    pub roster: Vec<String>,
    pub attributes: HashMap<String, CitizenAttributes>,
    // Category membership per identity key. May hold addresses outside the roster.
    pub memberships: HashMap<CategoryKind, HashSet<String>>,
    pub duplicates: usize,
}

impl NormalizedCitizens {
    pub fn contains(&self, key: &str) -> bool {
        self.attributes.contains_key(key)
    }

    pub fn is_member(&self, kind: CategoryKind, key: &str) -> bool {
        self.memberships
            .get(&kind)
            .is_some_and(|members| members.contains(key))
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
}

fn membership<'a>(keys: impl Iterator<Item = &'a str>) -> HashSet<String> {
    keys.map(identity_key).filter(|key| !key.is_empty()).collect()
}

pub fn normalize(sources: &SourceSet) -> NormalizedCitizens {
    let mut normalized = NormalizedCitizens::default();

    for record in sources.citizens.iter().flatten() {
        let key = identity_key(&record.id);
        if key.is_empty() {
            continue;
        }
        if normalized.contains(&key) {
            normalized.duplicates += 1;
            continue;
        }

        let handle = non_empty(&record.profile_name);
        let attributes = CitizenAttributes {
            alias: non_empty(&record.ens),
            profile: Profile {
                image: non_empty(&record.profile_image),
                handle,
                display_name: non_empty(&record.profile_display_name),
                bio: non_empty(&record.profile_bio),
                following_count: record.followings.len(),
            },
            has_social_profile: non_empty(&record.user_id).is_some(),
            ..Default::default()
        };

        normalized.roster.push(key.clone());
        normalized.attributes.insert(key, attributes);
    }

    let mut balances = HashMap::new();
    for holder in sources.token_holders.iter().flatten() {
        balances
            .entry(identity_key(&holder.id))
            .or_insert_with(|| holder.balance.clone());
    }

    let mut scores = HashMap::new();
    for record in sources.scores.iter().flatten() {
        if let Some(score) = record.score {
            scores.entry(identity_key(&record.address)).or_insert(score);
        }
    }

    normalized.memberships.insert(
        CategoryKind::TokenHolder,
        membership(sources.token_holders.iter().flatten().map(|holder| holder.id.as_str())),
    );
    normalized.memberships.insert(
        CategoryKind::Score,
        membership(sources.scores.iter().flatten().map(|record| record.address.as_str())),
    );
    normalized.memberships.insert(
        CategoryKind::Trust,
        membership(sources.trusted_seeds.iter().flatten().map(|seed| seed.id.as_str())),
    );
    normalized.memberships.insert(
        CategoryKind::Poap,
        membership(sources.poap_holders.iter().flatten().map(|holder| holder.holder.as_str())),
    );

    let trusted = &normalized.memberships[&CategoryKind::Trust];
    let poap = &normalized.memberships[&CategoryKind::Poap];
    for (key, attributes) in &mut normalized.attributes {
        attributes.token_balance = balances.get(key).cloned();
        attributes.score = scores.get(key).copied();
        attributes.trusted = trusted.contains(key);
        attributes.poap_holder = poap.contains(key);
    }

    normalized
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::citizens::records::{CitizenRecord, ScoreRecord, TokenHolderRecord};

    #[test]
    fn identity_key_lowercases_and_trims() {
        assert_eq!(identity_key("  0xAbCdEf "), "0xabcdef");
    }

    #[test]
    fn secondary_attributes_join_case_insensitively() {
        let sources = SourceSet {
            citizens: Some(vec![
                CitizenRecord {
                    id: "0xABC".to_owned(),
                    profile_name: Some("alice".to_owned()),
                    user_id: Some("77".to_owned()),
                    ..Default::default()
                },
                CitizenRecord {
                    id: "0xdef".to_owned(),
                    ..Default::default()
                },
            ]),
            token_holders: Some(vec![TokenHolderRecord {
                id: "0xabc".to_owned(),
                balance: "5.5".to_owned(),
            }]),
            scores: Some(vec![ScoreRecord {
                address: "0xDEF".to_owned(),
                score: Some(42.0),
            }]),
            ..Default::default()
        };

        let normalized = normalize(&sources);

        assert_eq!(normalized.roster, vec!["0xabc".to_owned(), "0xdef".to_owned()]);
        let abc = &normalized.attributes["0xabc"];
        assert_eq!(abc.token_balance.as_deref(), Some("5.5"));
        assert_eq!(abc.score, None);
        assert_eq!(abc.profile.handle.as_deref(), Some("alice"));
        assert!(abc.has_social_profile);
        let def = &normalized.attributes["0xdef"];
        assert_eq!(def.score, Some(42.0));
        assert_eq!(def.token_balance, None);
    }

    #[test]
    fn off_roster_members_do_not_become_citizens() {
        let sources = SourceSet {
            citizens: Some(vec![CitizenRecord {
                id: "0x01".to_owned(),
                ..Default::default()
            }]),
            token_holders: Some(vec![TokenHolderRecord {
                id: "0xFF".to_owned(),
                balance: "1".to_owned(),
            }]),
            ..Default::default()
        };

        let normalized = normalize(&sources);

        assert_eq!(normalized.roster.len(), 1);
        assert!(!normalized.contains("0xff"));
        assert!(normalized.is_member(CategoryKind::TokenHolder, "0xff"));
    }

    #[test]
    fn repeated_roster_rows_merge_into_first() {
        let sources = SourceSet {
            citizens: Some(vec![
                CitizenRecord {
                    id: "0xAA".to_owned(),
                    ens: Some("first.eth".to_owned()),
                    ..Default::default()
                },
                CitizenRecord {
                    id: "0xaa".to_owned(),
                    ens: Some("second.eth".to_owned()),
                    ..Default::default()
                },
            ]),
            ..Default::default()
        };

        let normalized = normalize(&sources);

        assert_eq!(normalized.roster, vec!["0xaa".to_owned()]);
        assert_eq!(normalized.duplicates, 1);
        assert_eq!(
            normalized.attributes["0xaa"].alias.as_deref(),
            Some("first.eth")
        );
    }
}
