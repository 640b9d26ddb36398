mod forces;
mod quadtree;

use eframe::egui::{Vec2, vec2};

use crate::citizens::forces::RADIAL_RADIUS;

use super::{PhysicsConfig, RenderGraph, RenderNode};
use forces::{
    CollisionParams, RepulsionParams, accumulate_collision_pairs, accumulate_repulsion_for_node,
};
pub(in crate::app) use quadtree::QuadtreeCell;
use quadtree::{QuadNode, collect_quadtree_cells};

const BARNES_HUT_THETA: f32 = 0.72;
const REPULSION_GAIN: f32 = 260.0;
const REPULSION_SOFTENING: f32 = 120.0;
const SPRING_STRENGTH: f32 = 0.035;
const SPRING_DAMPING: f32 = 0.22;
const COLLISION_STRENGTH: f32 = 0.9;
const RADIAL_GAIN: f32 = 0.06;

pub(in crate::app) fn quadtree_cells(
    nodes: &[RenderNode],
    positions: &mut Vec<Vec2>,
    charges: &mut Vec<f32>,
    cells: &mut Vec<QuadtreeCell>,
) {
    positions.clear();
    charges.clear();
    for node in nodes {
        positions.push(node.world_pos);
        charges.push(node.charge);
    }

    cells.clear();
    let Some(quadtree) = QuadNode::build(positions, charges) else {
        return;
    };

    collect_quadtree_cells(&quadtree, 0, cells);
}

pub(super) fn step_physics(cache: &mut RenderGraph, config: PhysicsConfig) -> bool {
    let node_count = cache.nodes.len();
    if node_count == 0 {
        return false;
    }

    let scratch = &mut cache.physics_scratch;
    scratch.forces.clear();
    scratch.forces.resize(node_count, Vec2::ZERO);
    scratch.positions.clear();
    scratch.charges.clear();
    for node in &cache.nodes {
        scratch.positions.push(node.world_pos);
        scratch.charges.push(node.charge);
    }

    let forces = &mut scratch.forces;
    let positions = &scratch.positions;
    let charges = &scratch.charges;

    let intensity = config.intensity.clamp(0.2, 2.5);
    let repulsion = RepulsionParams {
        gain: REPULSION_GAIN * intensity * config.repulsion_scale.clamp(0.25, 2.6),
        softening: REPULSION_SOFTENING,
        theta: BARNES_HUT_THETA,
    };
    let spring_strength = SPRING_STRENGTH * intensity * config.spring_scale.clamp(0.2, 2.2);
    let radial_gain = RADIAL_GAIN * intensity * config.radial_scale.clamp(0.0, 3.0);
    let damping = (config.velocity_damping - (intensity * 0.015)).clamp(0.78, 0.97);
    let time_step_scale = (config.delta_seconds * 60.0).clamp(0.25, 3.0);
    let damping_factor = damping.powf(time_step_scale);

    if node_count > 1
        && let Some(quadtree) = QuadNode::build(positions, charges)
    {
        for (index, force) in forces.iter_mut().enumerate() {
            accumulate_repulsion_for_node(&quadtree, index, positions, charges, repulsion, force);
        }

        accumulate_collision_pairs(
            &quadtree,
            &quadtree,
            true,
            positions,
            CollisionParams {
                strength: COLLISION_STRENGTH * intensity * config.collision_scale.clamp(0.2, 2.0),
                min_distance: cache.collision_radius * 2.0,
            },
            forces,
        );
    }

    for edge in &cache.edges {
        let (from, to) = (edge.source, edge.target);
        if from >= node_count || to >= node_count || from == to {
            continue;
        }

        let delta = cache.nodes[from].world_pos - cache.nodes[to].world_pos;
        let distance_sq = delta.length_sq();
        if distance_sq <= 0.0001 * 0.0001 {
            continue;
        }
        let distance = distance_sq.sqrt();
        let direction = delta / distance;

        let spring = (distance - edge.distance) * spring_strength;
        let relative_velocity = cache.nodes[from].velocity - cache.nodes[to].velocity;
        let damping_force = relative_velocity.dot(direction) * SPRING_DAMPING;
        let correction = direction * (spring + damping_force);

        forces[from] -= correction;
        forces[to] += correction;
    }

    for (index, (force, node)) in forces.iter_mut().zip(&cache.nodes).enumerate() {
        let radius = node.world_pos.length();
        let outward = if radius > 0.0001 {
            node.world_pos / radius
        } else {
            let angle = ((index as f32) * 0.618_034 + 0.37) * std::f32::consts::TAU;
            vec2(angle.cos(), angle.sin())
        };
        *force += outward * (RADIAL_RADIUS - radius) * node.radial_pull * radial_gain;
    }

    let max_force = 165.0 + (intensity * 90.0);
    let max_force_sq = max_force * max_force;
    let max_speed = 11.0 + (intensity * 15.0);
    let max_speed_sq = max_speed * max_speed;
    let min_sleep_speed_sq = 0.02 * 0.02;
    let min_sleep_force_sq = 0.08 * 0.08;
    let mut any_motion = false;
    let mut average_velocity = Vec2::ZERO;
    for (node, force_value) in cache.nodes.iter_mut().zip(forces.iter()) {
        let mut force = *force_value;
        let force_sq = force.length_sq();
        if force_sq > max_force_sq {
            force *= max_force / force_sq.sqrt();
        }

        let mut velocity = (node.velocity + (force * (0.055 * time_step_scale))) * damping_factor;
        let mut speed_sq = velocity.length_sq();
        if speed_sq > max_speed_sq {
            velocity *= max_speed / speed_sq.sqrt();
            speed_sq = max_speed_sq;
        }

        if speed_sq < min_sleep_speed_sq && force_sq < min_sleep_force_sq {
            velocity = Vec2::ZERO;
            speed_sq = 0.0;
        }

        node.velocity = velocity;
        average_velocity += velocity;
        node.world_pos += velocity * time_step_scale;
        if speed_sq > 0.000_001 {
            any_motion = true;
        }
    }

    average_velocity /= node_count as f32;
    if average_velocity.length_sq() > 0.000_001 {
        for node in &mut cache.nodes {
            node.velocity -= average_velocity;
        }
    }

    let mut centroid = Vec2::ZERO;
    for node in &cache.nodes {
        centroid += node.world_pos;
    }
    centroid /= node_count as f32;
    if centroid.length_sq() > 0.000_001 {
        for node in &mut cache.nodes {
            node.world_pos -= centroid;
        }
    }

    any_motion
}
