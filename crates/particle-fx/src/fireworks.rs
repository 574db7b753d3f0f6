//! Firework rockets and their burst cascades
//!
//! A rocket owns a [`FireworkArena`]: a flat vector of nodes linked by
//! parent/child indices. Every burst appends nodes; spent nodes are unlinked
//! from their parent's child list and stay in the arena until the whole
//! rocket is dropped from its emitter. A rocket is spent once its stage
//! reaches [`Stage::Done`], which happens bottom-up: a shell is done when all
//! of its children are dead.
//!
//! ```text
//! Ascending --(age >= explosion time)--> Exploding --(no live children)--> Done
//! ```
//!
//! Complex rockets may burst several times while `Exploding`; each scheduled
//! time is consumed once, front to back.

use crate::config::FireworkConfig;
use crate::emission::{ParticleRng, create_ember, create_sub_shell};
use crate::render::{LineBatch, PointBatch};
use glam::Vec3;
use log::{debug, trace};
use std::collections::VecDeque;

/// Index of a node inside a [`FireworkArena`]
pub type NodeId = usize;

/// Lifecycle of a rocket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Stage {
    /// Climbing and leaving a trail
    #[default]
    Ascending,
    /// Burst happened; children are flying
    Exploding,
    /// Every child is dead; the rocket can be collected
    Done,
}

/// Bounded history of past positions, oldest evicted first
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Trail {
    points: VecDeque<Vec3>,
    capacity: usize,
}

impl Trail {
    pub fn new(capacity: usize) -> Self {
        Self {
            points: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Record a position, evicting the oldest entry once full
    pub fn push(&mut self, point: Vec3) {
        if self.capacity == 0 {
            return;
        }
        if self.points.len() == self.capacity {
            self.points.pop_front();
        }
        self.points.push_back(point);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Oldest first
    pub fn iter(&self) -> impl Iterator<Item = &Vec3> {
        self.points.iter()
    }

    /// Consecutive point pairs, oldest first
    pub fn segments(&self) -> impl Iterator<Item = (Vec3, Vec3)> + '_ {
        self.points
            .iter()
            .zip(self.points.iter().skip(1))
            .map(|(a, b)| (*a, *b))
    }
}

/// Rocket that climbs in a straight line and bursts once
#[derive(Debug, Clone, PartialEq)]
pub struct SimpleShell {
    pub velocity: Vec3,
    pub explosion_time: f32,
    pub stage: Stage,
    pub trail: Trail,
}

impl SimpleShell {
    pub fn new(velocity: Vec3, explosion_time: f32, trail_length: usize) -> Self {
        Self {
            velocity,
            explosion_time,
            stage: Stage::Ascending,
            trail: Trail::new(trail_length),
        }
    }
}

/// Payload of an arena node
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// A secondary rocket
    Shell(SimpleShell),
    /// A burst fragment moving in a straight line
    Ember { velocity: Vec3 },
}

/// One particle inside a firework cascade
#[derive(Debug, Clone, PartialEq)]
pub struct FireworkNode {
    pub position: Vec3,
    pub age: f32,
    pub life: f32,
    pub parent: Option<NodeId>,
    /// Live children only
    pub children: Vec<NodeId>,
    pub kind: NodeKind,
}

impl FireworkNode {
    pub fn ember(position: Vec3, life: f32, velocity: Vec3, parent: Option<NodeId>) -> Self {
        Self {
            position,
            age: 0.0,
            life,
            parent,
            children: Vec::new(),
            kind: NodeKind::Ember { velocity },
        }
    }

    pub fn shell(
        position: Vec3,
        velocity: Vec3,
        explosion_time: f32,
        trail_length: usize,
        parent: Option<NodeId>,
    ) -> Self {
        Self {
            position,
            age: 0.0,
            life: SimpleFirework::LIFE,
            parent,
            children: Vec::new(),
            kind: NodeKind::Shell(SimpleShell::new(velocity, explosion_time, trail_length)),
        }
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.age < self.life
    }

    /// Alpha for fade-out effects, `1 - age / life`
    pub fn fade_alpha(&self) -> f32 {
        if self.life > 0.0 {
            1.0 - (self.age / self.life).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Stage of a shell node; embers report `None`
    pub fn stage(&self) -> Option<Stage> {
        match &self.kind {
            NodeKind::Shell(shell) => Some(shell.stage),
            NodeKind::Ember { .. } => None,
        }
    }

    fn vacant() -> Self {
        Self::ember(Vec3::ZERO, 0.0, Vec3::ZERO, None)
    }
}

/// Flat storage for every descendant of one rocket
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FireworkArena {
    nodes: Vec<FireworkNode>,
}

impl FireworkArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: NodeId) -> Option<&FireworkNode> {
        self.nodes.get(id)
    }

    /// Nodes ever spawned, dead ones included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes still alive
    pub fn live_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_alive()).count()
    }

    fn insert(&mut self, node: FireworkNode) -> NodeId {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    /// Burst `count` embers from `origin`
    pub fn spawn_embers(
        &mut self,
        parent: Option<NodeId>,
        origin: Vec3,
        count: usize,
        rng: &mut ParticleRng,
    ) -> Vec<NodeId> {
        (0..count)
            .map(|_| {
                let node = create_ember(origin, parent, rng);
                self.insert(node)
            })
            .collect()
    }

    /// Burst `count` secondary rockets from `origin`
    pub fn spawn_shells(
        &mut self,
        parent: Option<NodeId>,
        origin: Vec3,
        count: usize,
        rng: &mut ParticleRng,
    ) -> Vec<NodeId> {
        (0..count)
            .map(|_| {
                let node = create_sub_shell(origin, parent, rng);
                self.insert(node)
            })
            .collect()
    }

    /// Advance every listed child, then unlink the dead ones
    pub fn step_children(
        &mut self,
        children: &mut Vec<NodeId>,
        dt: f32,
        config: &FireworkConfig,
        rng: &mut ParticleRng,
    ) {
        for &id in children.iter() {
            self.step_node(id, dt, config, rng);
        }
        children.retain(|&id| self.nodes[id].is_alive());
    }

    fn step_node(&mut self, id: NodeId, dt: f32, config: &FireworkConfig, rng: &mut ParticleRng) {
        let node = &mut self.nodes[id];
        if let NodeKind::Ember { velocity } = node.kind {
            node.position += velocity * dt;
            node.age += dt;
            return;
        }

        // Take the shell out so it can spawn into the arena while stepping.
        let mut node = std::mem::replace(&mut self.nodes[id], FireworkNode::vacant());
        let FireworkNode {
            position,
            age,
            life,
            children,
            kind,
            ..
        } = &mut node;
        if let NodeKind::Shell(shell) = kind {
            let body = Body {
                position,
                age,
                life: *life,
                children,
            };
            advance_simple(shell, body, self, Some(id), dt, config, rng);
        }
        self.nodes[id] = node;
    }

    /// Draw every live descendant of `children`
    fn render_children(
        &self,
        children: &[NodeId],
        palette: &Palette,
        points: &mut PointBatch,
    ) {
        for &id in children {
            let node = &self.nodes[id];
            match &node.kind {
                NodeKind::Ember { .. } => {
                    let [r, g, b] = palette.ember;
                    points.push(node.position, [r, g, b, node.fade_alpha()], EMBER_SIZE);
                }
                NodeKind::Shell(shell) => {
                    if shell.stage == Stage::Ascending {
                        points.push(node.position, palette.sub_shell, SUB_SHELL_SIZE);
                    } else {
                        self.render_children(&node.children, palette, points);
                    }
                }
            }
        }
    }
}

/// Mutable view of the fields a shell update touches
struct Body<'a> {
    position: &'a mut Vec3,
    age: &'a mut f32,
    life: f32,
    children: &'a mut Vec<NodeId>,
}

fn advance_simple(
    shell: &mut SimpleShell,
    body: Body<'_>,
    arena: &mut FireworkArena,
    parent: Option<NodeId>,
    dt: f32,
    config: &FireworkConfig,
    rng: &mut ParticleRng,
) {
    match shell.stage {
        Stage::Ascending => {
            *body.position += shell.velocity * dt;
            shell.trail.push(*body.position);
            *body.age += dt;
            if *body.age >= shell.explosion_time {
                shell.stage = Stage::Exploding;
                let embers = arena.spawn_embers(parent, *body.position, config.embers, rng);
                debug!(
                    "shell burst at {} into {} embers",
                    body.position,
                    embers.len()
                );
                body.children.extend(embers);
            }
        }
        Stage::Exploding => {
            arena.step_children(body.children, dt, config, rng);
            if body.children.is_empty() {
                shell.stage = Stage::Done;
                *body.age = body.life;
            }
        }
        Stage::Done => {}
    }
}

const ROCKET_SIZE: f32 = 32.0;
const SUB_SHELL_SIZE: f32 = 24.0;
const EMBER_SIZE: f32 = 16.0;
const TRAIL_COLOR: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

struct Palette {
    rocket: [f32; 4],
    sub_shell: [f32; 4],
    ember: [f32; 3],
}

const SIMPLE_PALETTE: Palette = Palette {
    rocket: [1.0, 1.0, 0.0, 1.0],
    sub_shell: [1.0, 1.0, 0.0, 1.0],
    ember: [1.0, 0.0, 0.0],
};

const COMPLEX_PALETTE: Palette = Palette {
    rocket: [0.0, 1.0, 0.0, 1.0],
    sub_shell: [0.0, 0.0, 1.0, 1.0],
    ember: [1.0, 1.0, 1.0],
};

fn push_trail(trail: &Trail, lines: &mut LineBatch) {
    for (a, b) in trail.segments() {
        lines.push_segment(a, TRAIL_COLOR, b, TRAIL_COLOR);
    }
}

/// Root rocket that bursts into embers
#[derive(Debug, Clone, PartialEq)]
pub struct SimpleFirework {
    pub shell: SimpleShell,
    /// Live embers
    pub children: Vec<NodeId>,
    pub arena: FireworkArena,
}

impl SimpleFirework {
    /// Lifespan budget of a rocket; it is cut short when the burst fades
    pub const LIFE: f32 = 100.0;

    pub fn new(velocity: Vec3, explosion_time: f32, trail_length: usize) -> Self {
        Self {
            shell: SimpleShell::new(velocity, explosion_time, trail_length),
            children: Vec::new(),
            arena: FireworkArena::new(),
        }
    }

    pub fn stage(&self) -> Stage {
        self.shell.stage
    }

    /// Advance the rocket; `position` and `age` belong to the owning particle
    pub fn step(
        &mut self,
        position: &mut Vec3,
        age: &mut f32,
        life: f32,
        dt: f32,
        config: &FireworkConfig,
        rng: &mut ParticleRng,
    ) {
        let Self {
            shell,
            children,
            arena,
        } = self;
        let body = Body {
            position,
            age,
            life,
            children,
        };
        advance_simple(shell, body, arena, None, dt, config, rng);
    }

    /// Rocket head and trail while climbing, embers afterwards
    pub fn render_into(&self, position: Vec3, points: &mut PointBatch, lines: &mut LineBatch) {
        if self.shell.stage == Stage::Ascending {
            points.push(position, SIMPLE_PALETTE.rocket, ROCKET_SIZE);
            push_trail(&self.shell.trail, lines);
        } else {
            self.arena
                .render_children(&self.children, &SIMPLE_PALETTE, points);
        }
    }
}

/// Root rocket that wobbles sideways and bursts into secondary rockets
#[derive(Debug, Clone, PartialEq)]
pub struct ComplexFirework {
    pub initial_x: f32,
    pub velocity_y: f32,
    pub amplitude: f32,
    pub frequency: f32,
    /// Remaining burst times, consumed front to back
    pub explosion_times: VecDeque<f32>,
    pub stage: Stage,
    pub trail: Trail,
    /// Bursts fired so far
    pub bursts: usize,
    /// Live secondary rockets
    pub children: Vec<NodeId>,
    pub arena: FireworkArena,
}

impl ComplexFirework {
    /// Lifespan budget of a rocket; it is cut short when the cascade fades
    pub const LIFE: f32 = 100.0;

    pub fn new(
        initial_x: f32,
        velocity_y: f32,
        amplitude: f32,
        frequency: f32,
        explosion_times: impl IntoIterator<Item = f32>,
        trail_length: usize,
    ) -> Self {
        Self {
            initial_x,
            velocity_y,
            amplitude,
            frequency,
            explosion_times: explosion_times.into_iter().collect(),
            stage: Stage::Ascending,
            trail: Trail::new(trail_length),
            bursts: 0,
            children: Vec::new(),
            arena: FireworkArena::new(),
        }
    }

    /// Advance the rocket; `position` and `age` belong to the owning particle
    pub fn step(
        &mut self,
        position: &mut Vec3,
        age: &mut f32,
        life: f32,
        dt: f32,
        config: &FireworkConfig,
        rng: &mut ParticleRng,
    ) {
        if self.stage == Stage::Ascending {
            self.trail.push(*position);
            position.y += self.velocity_y * dt;
            position.x = self.initial_x + self.amplitude * (self.frequency * *age).sin();
            *age += dt;
        }

        while let Some(&time) = self.explosion_times.front() {
            if *age < time {
                break;
            }
            let shells = self
                .arena
                .spawn_shells(None, *position, config.sub_shells, rng);
            trace!("burst {} at t={time} released {} shells", self.bursts, shells.len());
            self.children.extend(shells);
            self.explosion_times.pop_front();
            self.bursts += 1;
            self.stage = Stage::Exploding;
        }

        self.arena
            .step_children(&mut self.children, dt, config, rng);

        if self.explosion_times.is_empty() && self.children.is_empty() {
            if self.stage != Stage::Done {
                debug!("complex firework done after {} bursts", self.bursts);
            }
            self.stage = Stage::Done;
            *age = life;
        }
    }

    /// Rocket head and trail while climbing, plus every live descendant
    pub fn render_into(&self, position: Vec3, points: &mut PointBatch, lines: &mut LineBatch) {
        if self.stage == Stage::Ascending {
            points.push(position, COMPLEX_PALETTE.rocket, ROCKET_SIZE);
            push_trail(&self.trail, lines);
        }
        self.arena
            .render_children(&self.children, &COMPLEX_PALETTE, points);
    }
}
