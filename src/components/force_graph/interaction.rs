//! Pointer handling for the graph: drag, hover and click.
//!
//! The browser wiring lives in the component; this layer only turns pointer
//! positions (already in canvas coordinates) into node updates.

use std::collections::HashSet;

use log::debug;

use crate::config::{CanvasConfig, InteractionConfig};

use super::layout::clamp_to_canvas;
use super::types::{GraphData, Vec2};

#[derive(Clone, Debug, PartialEq)]
struct DragState {
	node_id: String,
	origin: Vec2,
	/// Farthest the pointer got from `origin` during this press.
	travelled: f64,
	/// Node position and pin before the press, restored when it was a click.
	prior_pos: Vec2,
	prior_fixed: Option<Vec2>,
}

/// A click that should open the submission detail of a subtask.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClickTarget {
	pub subtask_id: i64,
}

/// Text shown next to the hovered node.
#[derive(Clone, Debug, PartialEq)]
pub struct Tooltip {
	pub title: String,
	pub owner: Option<String>,
	pub detail: String,
	pub anchor: Vec2,
}

pub struct InteractionLayer {
	config: InteractionConfig,
	canvas: CanvasConfig,
	drag: Option<DragState>,
	hovered: Option<String>,
	/// Nodes released while the simulation was settled; they keep their pin.
	manual_pins: HashSet<String>,
}

impl InteractionLayer {
	pub fn new(config: InteractionConfig, canvas: CanvasConfig) -> Self {
		Self {
			config,
			canvas,
			drag: None,
			hovered: None,
			manual_pins: HashSet::new(),
		}
	}

	/// Topmost node whose circle contains `p`.
	pub fn hit_test(&self, data: &GraphData, p: Vec2) -> Option<String> {
		data.nodes
			.iter()
			.rev()
			.find(|n| n.pos.distance(p) <= n.radius)
			.map(|n| n.id.clone())
	}

	pub fn is_dragging(&self) -> bool {
		self.drag.is_some()
	}

	/// Ids the simulation must not integrate this frame.
	pub fn dragged_ids(&self) -> HashSet<String> {
		self.drag.iter().map(|d| d.node_id.clone()).collect()
	}

	pub fn manual_pins(&self) -> &HashSet<String> {
		&self.manual_pins
	}

	/// Forget manual pins, e.g. after a layout reset.
	pub fn clear_manual_pins(&mut self) {
		self.manual_pins.clear();
	}

	/// Press over a node pins it and starts a drag. Returns whether it did.
	pub fn pointer_down(&mut self, data: &mut GraphData, p: Vec2) -> bool {
		let Some(id) = self.hit_test(data, p) else {
			return false;
		};
		let Some(node) = data.node_mut(&id) else {
			return false;
		};
		let (prior_pos, prior_fixed) = (node.pos, node.fixed);
		node.pin();
		debug!("drag start on {id}");
		self.drag = Some(DragState {
			node_id: id,
			origin: p,
			travelled: 0.0,
			prior_pos,
			prior_fixed,
		});
		true
	}

	/// Move the dragged node to the pointer, or update hover when not dragging.
	///
	/// Returns whether anything visible changed.
	pub fn pointer_move(&mut self, data: &mut GraphData, p: Vec2) -> bool {
		let Some(drag) = self.drag.as_mut() else {
			let hovered = self.hit_test(data, p);
			let changed = hovered != self.hovered;
			self.hovered = hovered;
			return changed;
		};
		drag.travelled = drag.travelled.max(p.distance(drag.origin));
		let Some(node) = data.node_mut(&drag.node_id) else {
			return false;
		};
		let pos = clamp_to_canvas(p, node.radius, &self.canvas);
		node.pos = pos;
		node.fixed = Some(pos);
		node.vel = Vec2::ZERO;
		true
	}

	/// End the press.
	///
	/// A drag keeps its pin only when the simulation is settled. A press that
	/// barely moved is a click: the node goes back to its prior position and
	/// pin, and a click on a subtask yields its target.
	pub fn pointer_up(&mut self, data: &mut GraphData, settled: bool) -> Option<ClickTarget> {
		let drag = self.drag.take()?;
		let node = data.node_mut(&drag.node_id)?;
		debug!(
			"drag end on {} after {:.1} units",
			drag.node_id, drag.travelled
		);

		if drag.travelled <= self.config.click_threshold {
			node.pos = drag.prior_pos;
			node.fixed = drag.prior_fixed;
			node.vel = Vec2::ZERO;
			return node.subtask_id.map(|subtask_id| ClickTarget { subtask_id });
		}
		if settled {
			self.manual_pins.insert(drag.node_id);
		} else {
			node.unpin();
			self.manual_pins.remove(&drag.node_id);
		}
		None
	}

	pub fn hover(&mut self, id: Option<String>) {
		self.hovered = id;
	}

	pub fn hovered(&self) -> Option<&str> {
		self.hovered.as_deref()
	}

	pub fn tooltip(&self, data: &GraphData) -> Option<Tooltip> {
		let node = data.node(self.hovered.as_deref()?)?;
		let detail = if node.is_task() {
			format!("{:.0}% selesai", node.completion * 100.0)
		} else if node.is_done {
			"Selesai".to_string()
		} else {
			"Belum selesai".to_string()
		};
		Some(Tooltip {
			title: node.name.clone(),
			owner: node.owner.clone(),
			detail,
			anchor: node.pos + Vec2::new(node.radius + 8.0, -node.radius),
		})
	}
}
