use std::collections::HashSet;

use log::debug;

use crate::api::Task;
use crate::config::GraphConfig;

use super::interaction::{ClickTarget, InteractionLayer, Tooltip};
use super::layout::apply_static_layout;
use super::model::build_graph;
use super::simulation::{CancelToken, ForceSimulation, SimulationPhase, TickOutcome};
use super::types::{GraphData, Vec2};

/// Maps the fixed logical canvas onto the element, letterboxed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct HoverState {
	pub node: Option<String>,
	pub neighbors: HashSet<String>,
}

pub struct ForceGraphState {
	pub config: GraphConfig,
	pub graph: GraphData,
	pub simulation: ForceSimulation,
	pub interaction: InteractionLayer,
	pub transform: ViewTransform,
	pub hover: HoverState,
	pub width: f64,
	pub height: f64,
	tasks: Vec<Task>,
	search: String,
	task_filter: Option<i64>,
}

impl ForceGraphState {
	pub fn new(config: GraphConfig, width: f64, height: f64) -> Self {
		let mut state = Self {
			simulation: ForceSimulation::new(config.simulation, config.canvas),
			interaction: InteractionLayer::new(config.interaction, config.canvas),
			config,
			graph: GraphData::default(),
			transform: ViewTransform::default(),
			hover: HoverState::default(),
			width,
			height,
			tasks: Vec::new(),
			search: String::new(),
			task_filter: None,
		};
		state.resize(width, height);
		state
	}

	/// Replace the inputs and rebuild the graph from scratch.
	pub fn set_source(&mut self, tasks: Vec<Task>, search: String, task_filter: Option<i64>) {
		self.tasks = tasks;
		self.search = search;
		self.task_filter = task_filter;
		self.rebuild();
	}

	fn rebuild(&mut self) {
		self.graph = build_graph(&self.tasks, &self.search, self.task_filter, &self.config);
		apply_static_layout(&mut self.graph, &self.config.layout, &self.config.canvas);
		self.simulation.reset();
		self.interaction.clear_manual_pins();
		self.set_hover(None);
		debug!(
			"graph rebuilt: {} nodes, {} links",
			self.graph.nodes.len(),
			self.graph.links.len()
		);
	}

	/// Back to the static grid, dropping any manual placement.
	pub fn reset_layout(&mut self) {
		apply_static_layout(&mut self.graph, &self.config.layout, &self.config.canvas);
		self.simulation.reset();
		self.interaction.clear_manual_pins();
	}

	pub fn phase(&self) -> SimulationPhase {
		self.simulation.phase()
	}

	pub fn start_simulation(&mut self) -> CancelToken {
		let mut keep = self.interaction.manual_pins().clone();
		keep.extend(self.interaction.dragged_ids());
		self.simulation.start(&mut self.graph, &keep)
	}

	pub fn stop_simulation(&mut self) {
		self.simulation.stop(&mut self.graph);
	}

	pub fn tick(&mut self) -> TickOutcome {
		let dragged = self.interaction.dragged_ids();
		self.simulation.tick(&mut self.graph, &dragged)
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> Vec2 {
		Vec2::new(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	pub fn pointer_down(&mut self, sx: f64, sy: f64) -> bool {
		let p = self.screen_to_graph(sx, sy);
		let started = self.interaction.pointer_down(&mut self.graph, p);
		if started {
			self.set_hover(None);
		}
		started
	}

	pub fn pointer_move(&mut self, sx: f64, sy: f64) {
		let p = self.screen_to_graph(sx, sy);
		if self.interaction.pointer_move(&mut self.graph, p) && !self.interaction.is_dragging() {
			let hovered = self.interaction.hovered().map(String::from);
			self.set_hover(hovered);
		}
	}

	pub fn pointer_up(&mut self) -> Option<ClickTarget> {
		let settled = self.simulation.is_settled();
		self.interaction.pointer_up(&mut self.graph, settled)
	}

	pub fn set_hover(&mut self, node: Option<String>) {
		if self.hover.node == node {
			return;
		}
		self.interaction.hover(node.clone());
		self.hover.neighbors.clear();
		if let Some(id) = &node {
			for link in &self.graph.links {
				if &link.source == id {
					self.hover.neighbors.insert(link.target.clone());
				} else if &link.target == id {
					self.hover.neighbors.insert(link.source.clone());
				}
			}
		}
		self.hover.node = node;
	}

	pub fn is_highlighted(&self, id: &str) -> bool {
		self.hover.node.as_deref() == Some(id) || self.hover.neighbors.contains(id)
	}

	pub fn has_active_highlight(&self) -> bool {
		self.hover.node.is_some()
	}

	pub fn tooltip(&self) -> Option<Tooltip> {
		self.interaction.tooltip(&self.graph)
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
		let canvas = self.config.canvas;
		let k = (width / canvas.width).min(height / canvas.height);
		let k = if k.is_finite() && k > 0.0 { k } else { 1.0 };
		self.transform = ViewTransform {
			x: (width - canvas.width * k) / 2.0,
			y: (height - canvas.height * k) / 2.0,
			k,
		};
	}
}
