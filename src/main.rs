mod app;
mod citizens;
mod util;

use std::path::PathBuf;

use anyhow::anyhow;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use citizens::{CategoryKind, FilterSelection, NodeKind, RelationType};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Directory holding the citizen source JSON files.
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,
    /// Relations shown at startup, comma separated. All relations when omitted.
    #[arg(long, value_delimiter = ',')]
    relations: Vec<RelationType>,
    /// Start with citizen nodes hidden.
    #[arg(long)]
    hide_citizens: bool,
    /// Also show the category hubs at startup.
    #[arg(long)]
    show_categories: bool,
}

impl Args {
    fn initial_selection(&self) -> FilterSelection {
        let relations = if self.relations.is_empty() {
            RelationType::ALL.to_vec()
        } else {
            self.relations.clone()
        };
        let mut kinds = Vec::new();
        if !self.hide_citizens {
            kinds.push(NodeKind::Citizen);
        }
        if self.show_categories {
            kinds.extend(CategoryKind::ALL.into_iter().map(NodeKind::Category));
        }
        FilterSelection::new(kinds, relations)
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("citizen_graph=info")),
        )
        .init();

    let args = Args::parse();
    let selection = args.initial_selection();
    info!(data_dir = %args.data_dir.display(), ?selection, "starting citizen-graph");

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_title("citizen-graph")
            .with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    let data_dir = args.data_dir;
    eframe::run_native(
        "citizen-graph",
        options,
        Box::new(move |cc| {
            Ok(Box::new(app::CitizenGraphApp::new(
                cc,
                data_dir.clone(),
                selection.clone(),
            )))
        }),
    )
    .map_err(|error| anyhow!("failed to run the graph window: {error}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_relation_list() {
        let args = Args::try_parse_from([
            "citizen-graph",
            "--relations",
            "BadgeHolderReferral,citizentransaction",
            "--show-categories",
        ])
        .unwrap();
        let selection = args.initial_selection();
        assert!(selection.is_relation_selected(RelationType::Referral));
        assert!(selection.is_relation_selected(RelationType::PeerTransfer));
        assert!(!selection.is_relation_selected(RelationType::SocialFollow));
        assert!(selection.is_kind_selected(NodeKind::Citizen));
        assert!(selection.is_kind_selected(NodeKind::Category(CategoryKind::Poap)));
    }

    #[test]
    fn rejects_unknown_relation() {
        assert!(Args::try_parse_from(["citizen-graph", "--relations", "friendship"]).is_err());
    }
}
