use eframe::egui::{self, RichText, Ui};

use crate::citizens::graph::{CitizenAttributes, ReferralEntry};
use crate::citizens::{Node, NodeKind};
use crate::util::short_address;

use super::super::ViewModel;

fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}

impl ViewModel {
    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) {
        ui.heading("Selection Details");
        ui.add_space(6.0);

        let Some(selected_id) = self.details.clone() else {
            ui.label("Click a node in the graph to inspect it.");
            return;
        };

        let Some(node) = self.view.graph().node(&selected_id).cloned() else {
            ui.label("The selected node is hidden by the current filters.");
            return;
        };
        let degree = self.view.degree(&node.id);

        match (&node.kind, &node.citizen) {
            (NodeKind::Citizen, Some(citizen)) => {
                self.draw_citizen_details(ui, &node, citizen, degree);
            }
            _ => {
                ui.label(RichText::new(node.kind.label()).strong());
                ui.small(node.id.as_str());
                ui.add_space(6.0);
                ui.label(format!("Visible members: {degree}"));
            }
        }

        ui.separator();
        ui.label(RichText::new("Visible neighbours").strong());
        let neighbours = self
            .view
            .index()
            .neighbors(&node.id)
            .iter()
            .map(|&index| &self.view.graph().nodes()[index])
            .map(|neighbour| (neighbour.id.clone(), Self::display_name(neighbour)))
            .collect::<Vec<_>>();
        if neighbours.is_empty() {
            ui.label("No visible links.");
            return;
        }

        let mut clicked = None;
        egui::ScrollArea::vertical()
            .id_salt("neighbour_scroll")
            .max_height(280.0)
            .auto_shrink([false, true])
            .show_rows(ui, 20.0, neighbours.len(), |ui, row_range| {
                for (id, label) in &neighbours[row_range] {
                    if ui.link(label.as_str()).on_hover_text(id.as_str()).clicked() {
                        clicked = Some(id.clone());
                    }
                }
            });
        if let Some(id) = clicked {
            let effects = self.interaction.click_node(&self.view, &id);
            self.pending_effects.extend(effects);
        }
    }

    pub(in crate::app) fn display_name(node: &Node) -> String {
        match node.kind {
            NodeKind::Citizen => node
                .alias()
                .or(node.handle())
                .map_or_else(|| short_address(&node.id), str::to_owned),
            NodeKind::Category(_) => node.kind.label().to_owned(),
        }
    }

    fn draw_citizen_details(
        &mut self,
        ui: &mut Ui,
        node: &Node,
        citizen: &CitizenAttributes,
        degree: usize,
    ) {
        ui.label(RichText::new(Self::display_name(node)).strong());
        ui.small(node.id.as_str());
        ui.add_space(6.0);

        let profile = &citizen.profile;
        if let Some(display_name) = &profile.display_name {
            ui.label(format!("Name: {display_name}"));
        }
        if let Some(handle) = &profile.handle {
            ui.label(format!("Handle: @{handle}"));
        }
        if let Some(bio) = &profile.bio {
            ui.label(bio.as_str());
        }
        ui.label(format!("Following: {}", profile.following_count));
        ui.label(format!("Visible connections: {degree}"));

        ui.separator();
        ui.label(format!(
            "TEC balance: {}",
            citizen.token_balance.as_deref().unwrap_or("-")
        ));
        ui.label(format!(
            "RegenScore: {}",
            citizen
                .score
                .map_or_else(|| "-".to_owned(), |score| format!("{score:.1}"))
        ));
        ui.label(format!("Trusted Seed: {}", yes_no(citizen.trusted)));
        ui.label(format!("ReFi POAP holder: {}", yes_no(citizen.poap_holder)));
        ui.label(format!("Farcaster profile: {}", yes_no(citizen.has_social_profile)));

        let Some(referrals) = &citizen.referrals else {
            return;
        };

        ui.separator();
        let mut clicked = None;
        for (title, entries) in [
            ("Referred by", &referrals.referred_by),
            ("Referred", &referrals.referred),
        ] {
            if entries.is_empty() {
                continue;
            }
            ui.label(RichText::new(title).strong());
            for entry in entries {
                if let Some(id) = self.draw_referral_entry(ui, entry) {
                    clicked = Some(id);
                }
            }
        }

        if let Some(id) = clicked {
            let effects = self.interaction.click_node(&self.view, &id);
            self.pending_effects.extend(effects);
        }
    }

    fn draw_referral_entry(&self, ui: &mut Ui, entry: &ReferralEntry) -> Option<String> {
        let counterpart = self
            .view
            .graph()
            .node(&entry.address)
            .map_or_else(|| short_address(&entry.address), Self::display_name);
        let mut clicked = None;
        ui.horizontal(|ui| {
            if !self.view.graph().contains(&entry.address) {
                ui.label(counterpart).on_hover_text("Hidden by the current filters.");
            } else if ui
                .link(counterpart)
                .on_hover_text(entry.address.as_str())
                .clicked()
            {
                clicked = Some(entry.address.clone());
            }
            ui.small(format!("round {}  |  {}", entry.round, entry.method));
        });
        clicked
    }
}
