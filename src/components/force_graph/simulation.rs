//! Bounded force relaxation: Idle → Running → Settled.
//!
//! A run is started by the user, advances one tick per timer callback, and
//! ends after the tick budget or once alpha has decayed, pinning every node
//! where it stands. Forces applied each tick, all scaled by alpha:
//! - centering: free nodes drift toward the canvas center
//! - springs: each link pulls its endpoints toward the rest length
//! - collision: overlapping circles (plus a buffer) push apart
//! - integration: damped velocity moves free nodes, clamped to the canvas

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, info};

use crate::config::{CanvasConfig, SimulationConfig};

use super::layout::clamp_to_canvas;
use super::types::{GraphData, Vec2};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimulationPhase {
	Idle,
	Running,
	Settled,
}

/// What the scheduler should do after a tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
	/// Nothing ran; do not reschedule.
	Skipped,
	/// Still running; schedule the next tick.
	Continue,
	/// This tick finished the run.
	Settled,
}

/// Shared flag that stops a scheduled tick chain.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
	pub fn cancel(&self) {
		self.0.store(true, Ordering::Relaxed);
	}

	pub fn is_cancelled(&self) -> bool {
		self.0.load(Ordering::Relaxed)
	}
}

pub struct ForceSimulation {
	config: SimulationConfig,
	canvas: CanvasConfig,
	phase: SimulationPhase,
	alpha: f64,
	ticks: u32,
	token: CancelToken,
}

impl ForceSimulation {
	pub fn new(config: SimulationConfig, canvas: CanvasConfig) -> Self {
		Self {
			config,
			canvas,
			phase: SimulationPhase::Idle,
			alpha: 0.0,
			ticks: 0,
			token: CancelToken::default(),
		}
	}

	pub fn phase(&self) -> SimulationPhase {
		self.phase
	}

	pub fn is_settled(&self) -> bool {
		self.phase == SimulationPhase::Settled
	}

	/// Token of the current run.
	pub fn token(&self) -> CancelToken {
		self.token.clone()
	}

	/// Begin a run. Pins are released except for ids in `keep_pinned`.
	///
	/// Any previous tick chain is cancelled; the returned token belongs to
	/// the new run.
	pub fn start(&mut self, data: &mut GraphData, keep_pinned: &HashSet<String>) -> CancelToken {
		self.token.cancel();
		self.token = CancelToken::default();
		for node in &mut data.nodes {
			if !keep_pinned.contains(&node.id) {
				node.unpin();
			}
		}
		self.phase = SimulationPhase::Running;
		self.alpha = self.config.alpha_start;
		self.ticks = 0;
		info!("simulation started over {} nodes", data.nodes.len());
		self.token()
	}

	/// Advance one step. Nodes in `dragged` are left entirely to the pointer.
	///
	/// Outside a run, or with alpha at zero, this touches nothing.
	pub fn tick(&mut self, data: &mut GraphData, dragged: &HashSet<String>) -> TickOutcome {
		if self.phase != SimulationPhase::Running || self.alpha <= 0.0 {
			return TickOutcome::Skipped;
		}

		let free: Vec<bool> = data
			.nodes
			.iter()
			.map(|n| n.fixed.is_none() && !dragged.contains(&n.id))
			.collect();

		self.apply_centering(data, &free);
		self.apply_links(data, &free);
		self.apply_collisions(data, &free);
		self.integrate(data, dragged);

		self.alpha *= 1.0 - self.config.alpha_decay;
		self.ticks += 1;

		if self.ticks >= self.config.max_ticks || self.alpha < self.config.alpha_min {
			self.settle(data);
			return TickOutcome::Settled;
		}
		TickOutcome::Continue
	}

	/// Finish the run and pin every node at its current position.
	pub fn settle(&mut self, data: &mut GraphData) {
		self.phase = SimulationPhase::Settled;
		self.alpha = 0.0;
		self.token.cancel();
		for node in &mut data.nodes {
			node.pin();
			node.vel = Vec2::ZERO;
		}
		info!("simulation settled after {} ticks", self.ticks);
	}

	/// Early stop requested by the user; same end state as settling.
	pub fn stop(&mut self, data: &mut GraphData) {
		if self.phase == SimulationPhase::Running {
			debug!("simulation stopped at alpha {:.3}", self.alpha);
			self.settle(data);
		}
	}

	/// Back to Idle, e.g. after the layout was reset or the graph rebuilt.
	pub fn reset(&mut self) {
		self.token.cancel();
		self.phase = SimulationPhase::Idle;
		self.alpha = 0.0;
		self.ticks = 0;
	}

	fn apply_centering(&self, data: &mut GraphData, free: &[bool]) {
		let (cx, cy) = self.canvas.center();
		let center = Vec2::new(cx, cy);
		let k = self.config.center_strength * self.alpha;
		for (node, _) in data.nodes.iter_mut().zip(free).filter(|(_, f)| **f) {
			node.vel += (center - node.pos) * k;
		}
	}

	fn apply_links(&self, data: &mut GraphData, free: &[bool]) {
		let rest = self.config.link_distance;
		for l in 0..data.links.len() {
			let (Some(s), Some(t)) = (
				data.index_of(&data.links[l].source),
				data.index_of(&data.links[l].target),
			) else {
				continue;
			};
			let delta = data.nodes[t].pos - data.nodes[s].pos;
			let dist = delta.length();
			if dist == 0.0 {
				continue;
			}
			let magnitude = (dist - rest) * data.links[l].strength * self.alpha;
			let force = delta * (magnitude / dist * 0.5);
			if free[s] {
				data.nodes[s].vel += force;
			}
			if free[t] {
				data.nodes[t].vel += force * -1.0;
			}
		}
	}

	fn apply_collisions(&self, data: &mut GraphData, free: &[bool]) {
		let n = data.nodes.len();
		let mut forces = vec![Vec2::ZERO; n];
		for i in 0..n {
			for j in (i + 1)..n {
				let (a, b) = (&data.nodes[i], &data.nodes[j]);
				let min = a.radius + b.radius + self.config.collision_buffer;
				let delta = b.pos - a.pos;
				let dist = delta.length();
				if dist >= min {
					continue;
				}
				// coincident centers separate along x
				let dir = if dist > 0.0 {
					delta * (1.0 / dist)
				} else {
					Vec2::new(1.0, 0.0)
				};
				let push = dir * ((min - dist) * 0.5 * self.alpha);
				forces[i] += push * -1.0;
				forces[j] += push;
			}
		}
		for (i, node) in data.nodes.iter_mut().enumerate() {
			if free[i] {
				node.vel += forces[i];
			}
		}
	}

	fn integrate(&self, data: &mut GraphData, dragged: &HashSet<String>) {
		let keep = 1.0 - self.config.velocity_decay;
		for node in &mut data.nodes {
			if dragged.contains(&node.id) {
				continue;
			}
			if let Some(fixed) = node.fixed {
				node.pos = fixed;
				node.vel = Vec2::ZERO;
				continue;
			}
			node.vel = node.vel * keep;
			let moved = node.pos + node.vel;
			let clamped = clamp_to_canvas(moved, node.radius, &self.canvas);
			if clamped.x != moved.x {
				node.vel.x = 0.0;
			}
			if clamped.y != moved.y {
				node.vel.y = 0.0;
			}
			node.pos = clamped;
		}
	}
}
