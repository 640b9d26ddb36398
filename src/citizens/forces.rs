use super::filter::GraphView;
use super::graph::NodeKind;

pub const MIN_NODE_RADIUS: f32 = 5.0;
pub const MAX_NODE_RADIUS: f32 = 12.0;
pub const COLLISION_RADIUS_SCALE: f32 = 1.5;
pub const RADIAL_RADIUS: f32 = 50.0;

const ISOLATE_REPULSION: f32 = 300.0;
const BASE_REPULSION: f32 = 160.0;
const REPULSION_PER_DEGREE: f32 = 10.0;
const MIN_REPULSION: f32 = 30.0;

const BASE_LINK_DISTANCE: f32 = 100.0;
const ISOLATE_LINK_SCALE: f32 = 0.7;
const LINK_DISTANCE_PER_DEGREE: f32 = 5.0;
const MIN_LINK_DISTANCE: f32 = 10.0;

const ISOLATE_RADIAL_PULL: f32 = 0.8;
const MIN_RADIAL_PULL: f32 = 0.01;
const MAX_RADIAL_PULL: f32 = 0.06;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ForceModel {
    max_degree: usize,
}

impl ForceModel {
    pub fn new(max_degree: usize) -> Self {
        Self { max_degree }
    }

    pub fn for_view(view: &GraphView) -> Self {
        Self::new(view.index().max_degree())
    }

    pub fn max_degree(self) -> usize {
        self.max_degree
    }

    fn normalized(self, degree: usize) -> f32 {
        if self.max_degree == 0 {
            return 0.0;
        }
        (degree as f32 / self.max_degree as f32).min(1.0)
    }

    pub fn repulsion(self, degree: usize) -> f32 {
        if degree == 0 {
            return ISOLATE_REPULSION;
        }
        (BASE_REPULSION - REPULSION_PER_DEGREE * degree as f32).max(MIN_REPULSION)
    }

    pub fn link_distance(self, source_degree: usize, target_degree: usize) -> f32 {
        if source_degree == 0 || target_degree == 0 {
            return BASE_LINK_DISTANCE * ISOLATE_LINK_SCALE;
        }
        let shared = source_degree.min(target_degree) as f32;
        (BASE_LINK_DISTANCE - shared * LINK_DISTANCE_PER_DEGREE).max(MIN_LINK_DISTANCE)
    }

    pub fn radial_pull(self, degree: usize) -> f32 {
        if degree == 0 {
            return ISOLATE_RADIAL_PULL;
        }
        MIN_RADIAL_PULL + self.normalized(degree) * (MAX_RADIAL_PULL - MIN_RADIAL_PULL)
    }

    pub fn collision_radius(self) -> f32 {
        MIN_NODE_RADIUS * COLLISION_RADIUS_SCALE
    }

    pub fn node_radius(self, kind: NodeKind, degree: usize) -> f32 {
        match kind {
            NodeKind::Citizen => {
                MIN_NODE_RADIUS + (MAX_NODE_RADIUS - MIN_NODE_RADIUS) * self.normalized(degree)
            }
            NodeKind::Category(_) => MIN_NODE_RADIUS,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    use super::*;
    use crate::citizens::graph::CategoryKind;

    #[test]
    fn isolates_repel_hardest_and_pull_inward() {
        let model = ForceModel::new(8);

        assert_eq!(model.repulsion(0), 300.0);
        assert_eq!(model.repulsion(1), 150.0);
        assert_eq!(model.repulsion(50), 30.0);
        assert_eq!(model.radial_pull(0), 0.8);
        assert!(model.radial_pull(1) < 0.1);
    }

    #[test]
    fn link_distance_shrinks_with_minimum_degree() {
        let model = ForceModel::new(30);

        assert_eq!(model.link_distance(0, 4), 70.0);
        assert_eq!(model.link_distance(2, 9), 90.0);
        assert_eq!(model.link_distance(9, 2), 90.0);
        assert_eq!(model.link_distance(25, 30), 10.0);
    }

    #[test]
    fn empty_view_guards_max_degree() {
        let model = ForceModel::new(0);

        assert_eq!(model.radial_pull(0), 0.8);
        assert_eq!(model.radial_pull(3), MIN_RADIAL_PULL);
        assert_eq!(model.node_radius(NodeKind::Citizen, 0), MIN_NODE_RADIUS);
    }

    #[test]
    fn radius_scales_citizens_only() {
        let model = ForceModel::new(4);

        assert_eq!(model.node_radius(NodeKind::Citizen, 4), MAX_NODE_RADIUS);
        assert_eq!(model.node_radius(NodeKind::Citizen, 2), 8.5);
        assert_eq!(
            model.node_radius(NodeKind::Category(CategoryKind::Score), 4),
            MIN_NODE_RADIUS
        );
        assert_eq!(model.collision_radius(), 7.5);
    }

    proptest! {
        #[test]
        fn repulsion_is_non_increasing(degree in 1usize..500) {
            let model = ForceModel::new(500);
            prop_assert!(model.repulsion(degree + 1) <= model.repulsion(degree));
            prop_assert!(model.repulsion(degree) >= MIN_REPULSION);
        }

        #[test]
        fn link_distance_stays_positive(a in 0usize..1000, b in 0usize..1000) {
            prop_assert!(ForceModel::new(1000).link_distance(a, b) >= MIN_LINK_DISTANCE);
        }
    }
}
