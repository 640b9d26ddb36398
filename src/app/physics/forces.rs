use eframe::egui::{Vec2, vec2};

use super::quadtree::QuadNode;

#[derive(Clone, Copy)]
pub(super) struct RepulsionParams {
    pub(super) gain: f32,
    pub(super) softening: f32,
    pub(super) theta: f32,
}

#[derive(Clone, Copy)]
pub(super) struct CollisionParams {
    pub(super) strength: f32,
    pub(super) min_distance: f32,
}

fn push_direction(delta: Vec2, from: usize, to: usize) -> (Vec2, f32) {
    let distance = delta.length();
    if distance > 0.0001 {
        return (delta / distance, distance);
    }
    let angle = ((from as f32) * 0.618_034 + (to as f32) * 0.414_214) * std::f32::consts::TAU;
    (vec2(angle.cos(), angle.sin()), distance)
}

pub(super) fn accumulate_repulsion_for_node(
    node: &QuadNode,
    index: usize,
    positions: &[Vec2],
    charges: &[f32],
    params: RepulsionParams,
    force: &mut Vec2,
) {
    if node.charge <= 0.0 {
        return;
    }

    let point = positions[index];

    if node.is_leaf() {
        for &other in &node.indices {
            if other == index {
                continue;
            }
            let delta = point - positions[other];
            let (direction, distance) = push_direction(delta, index, other);
            *force += direction
                * (params.gain * charges[other] / (distance * distance + params.softening));
        }
        return;
    }

    let delta = point - node.center_of_charge;
    let distance_sq = delta.length_sq().max(0.0001);
    let distance = distance_sq.sqrt();
    let can_approximate = !node.bounds.contains(point)
        && (node.bounds.side_length() / distance) < params.theta
        && node.body_count > 1;

    if can_approximate {
        *force += (delta / distance) * (params.gain * node.charge / (distance_sq + params.softening));
        return;
    }

    for child in node.children.iter().flatten() {
        accumulate_repulsion_for_node(child, index, positions, charges, params, force);
    }
}

fn separate_pair(
    from: usize,
    to: usize,
    positions: &[Vec2],
    params: CollisionParams,
    forces: &mut [Vec2],
) {
    let (direction, distance) = push_direction(positions[from] - positions[to], from, to);
    if distance < params.min_distance {
        let overlap_push = (params.min_distance - distance) * params.strength;
        forces[from] += direction * overlap_push;
        forces[to] -= direction * overlap_push;
    }
}

pub(super) fn accumulate_collision_pairs(
    node_a: &QuadNode,
    node_b: &QuadNode,
    same_node: bool,
    positions: &[Vec2],
    params: CollisionParams,
    forces: &mut [Vec2],
) {
    if node_a.bounds.distance_sq_to(node_b.bounds) > params.min_distance * params.min_distance {
        return;
    }

    if node_a.is_leaf() && node_b.is_leaf() {
        if same_node {
            for (offset, &from) in node_a.indices.iter().enumerate() {
                for &to in &node_a.indices[offset + 1..] {
                    separate_pair(from, to, positions, params, forces);
                }
            }
        } else {
            for &from in &node_a.indices {
                for &to in &node_b.indices {
                    separate_pair(from, to, positions, params, forces);
                }
            }
        }
        return;
    }

    if same_node {
        for first in 0..4 {
            let Some(child_a) = node_a.children[first].as_ref() else {
                continue;
            };

            accumulate_collision_pairs(child_a, child_a, true, positions, params, forces);

            for second in (first + 1)..4 {
                let Some(child_b) = node_a.children[second].as_ref() else {
                    continue;
                };
                accumulate_collision_pairs(child_a, child_b, false, positions, params, forces);
            }
        }
        return;
    }

    let split_a = if node_a.is_leaf() {
        false
    } else if node_b.is_leaf() {
        true
    } else {
        node_a.bounds.half_extent >= node_b.bounds.half_extent
    };

    if split_a {
        for child in node_a.children.iter().flatten() {
            accumulate_collision_pairs(child, node_b, false, positions, params, forces);
        }
    } else {
        for child in node_b.children.iter().flatten() {
            accumulate_collision_pairs(node_a, child, false, positions, params, forces);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PARAMS: RepulsionParams = RepulsionParams {
        gain: 100.0,
        softening: 1.0,
        theta: 0.7,
    };

    #[test]
    fn stronger_charge_pushes_harder() {
        let positions = [vec2(0.0, 0.0), vec2(10.0, 0.0), vec2(-10.0, 0.0)];
        let charges = [30.0, 300.0, 30.0];
        let Some(root) = QuadNode::build(&positions, &charges) else {
            panic!("quadtree should build for finite points");
        };

        let mut force = Vec2::ZERO;
        accumulate_repulsion_for_node(&root, 0, &positions, &charges, PARAMS, &mut force);

        assert!(force.x < 0.0);
    }

    #[test]
    fn overlapping_bodies_are_separated() {
        let positions = [vec2(0.0, 0.0), vec2(4.0, 0.0)];
        let Some(root) = QuadNode::build(&positions, &[1.0, 1.0]) else {
            panic!("quadtree should build for finite points");
        };
        let mut forces = vec![Vec2::ZERO; 2];

        accumulate_collision_pairs(
            &root,
            &root,
            true,
            &positions,
            CollisionParams {
                strength: 1.0,
                min_distance: 15.0,
            },
            &mut forces,
        );

        assert!(forces[0].x < 0.0);
        assert!(forces[1].x > 0.0);
    }
}
