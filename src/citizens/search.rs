use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use super::filter::GraphView;
use crate::util::short_address;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchHit {
    pub id: String,
    pub label: String,
}

#[derive(Clone, Debug)]
struct SearchEntry {
    id: String,
    label: String,
    fields: Vec<String>,
}

pub fn normalize_term(raw: &str) -> String {
    raw.chars()
        .filter(|ch| !ch.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

pub struct SearchIndex {
    entries: Vec<SearchEntry>,
    matcher: SkimMatcherV2,
}

impl SearchIndex {
    pub fn build(view: &GraphView) -> Self {
        let entries = view
            .graph()
            .citizens()
            .map(|node| {
                let fields = [Some(node.id.as_str()), node.alias(), node.handle()]
                    .into_iter()
                    .flatten()
                    .map(normalize_term)
                    .filter(|field| !field.is_empty())
                    .collect();
                let label = node
                    .alias()
                    .or(node.handle())
                    .map_or_else(|| short_address(&node.id), str::to_owned);
                SearchEntry {
                    id: node.id.clone(),
                    label,
                    fields,
                }
            })
            .collect();

        Self {
            entries,
            matcher: SkimMatcherV2::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // Matches ordered by match quality, then by graph order. An empty term matches nothing.
    pub fn search(&self, term: &str) -> Vec<SearchHit> {
        let term = normalize_term(term);
        if term.is_empty() {
            return Vec::new();
        }

        let mut ranked = self
            .entries
            .iter()
            .enumerate()
            .filter_map(|(order, entry)| {
                entry
                    .fields
                    .iter()
                    .filter(|field| field.contains(&term))
                    .map(|field| self.matcher.fuzzy_match(field, &term).unwrap_or(0))
                    .max()
                    .map(|score| (score, order, entry))
            })
            .collect::<Vec<_>>();
        ranked.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));

        ranked
            .into_iter()
            .map(|(_, _, entry)| SearchHit {
                id: entry.id.clone(),
                label: entry.label.clone(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::citizens::filter::FilterSelection;
    use crate::citizens::graph::assemble;
    use crate::citizens::records::{CitizenRecord, TokenHolderRecord};
    use crate::citizens::source::SourceSet;

    fn view() -> GraphView {
        let graph = assemble(&SourceSet {
            citizens: Some(vec![
                CitizenRecord {
                    id: "0xAA".to_owned(),
                    ens: Some("a.eth".to_owned()),
                    ..Default::default()
                },
                CitizenRecord {
                    id: "0xBB".to_owned(),
                    profile_name: Some("Bee Keeper".to_owned()),
                    ..Default::default()
                },
            ]),
            token_holders: Some(vec![TokenHolderRecord {
                id: "0xaa".to_owned(),
                balance: "1".to_owned(),
            }]),
            ..Default::default()
        });
        GraphView::build(&graph, &FilterSelection::default())
    }

    #[test]
    fn alias_prefix_finds_citizen() {
        let index = SearchIndex::build(&view());

        assert_eq!(
            index.search("a.e"),
            vec![SearchHit {
                id: "0xaa".to_owned(),
                label: "a.eth".to_owned(),
            }]
        );
    }

    #[test]
    fn empty_term_matches_nothing() {
        let index = SearchIndex::build(&view());

        assert_eq!(index.len(), 2);
        assert!(index.search("").is_empty());
        assert!(index.search("   ").is_empty());
    }

    #[test]
    fn matching_ignores_case_and_whitespace() {
        let index = SearchIndex::build(&view());

        let hits = index.search("beek EEPER");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "0xbb");
        assert_eq!(index.search("0XB").len(), 1);
    }

    #[test]
    fn category_nodes_are_never_hits() {
        let index = SearchIndex::build(&view());

        assert!(index.search("TECHolder").is_empty());
    }

    #[test]
    fn results_keep_graph_order_on_ties() {
        let index = SearchIndex::build(&view());

        let ids = index
            .search("0x")
            .into_iter()
            .map(|hit| hit.id)
            .collect::<Vec<_>>();
        assert_eq!(ids, vec!["0xaa".to_owned(), "0xbb".to_owned()]);
    }
}
