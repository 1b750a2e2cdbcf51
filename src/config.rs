//! Tunables for the graph view and its REST collaborators.
//!
//! Everything here is compile-time configuration: the defaults are what the
//! dashboard ships with, and the component accepts an override through its
//! `config` prop.

/// Logical drawing surface. Node positions live in this coordinate space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CanvasConfig {
	/// Logical width.
	pub width: f64,
	/// Logical height.
	pub height: f64,
}

impl CanvasConfig {
	/// Center of the canvas.
	pub fn center(&self) -> (f64, f64) {
		(self.width / 2.0, self.height / 2.0)
	}
}

impl Default for CanvasConfig {
	fn default() -> Self {
		Self {
			width: 800.0,
			height: 600.0,
		}
	}
}

/// Grid and ring placement used before any physics runs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutConfig {
	/// Distance between neighbouring task cells.
	pub cell_size: f64,
	/// Offset of the first grid cell from the canvas origin.
	pub margin: f64,
	/// Radius of the ring subtasks sit on around their task.
	pub ring_radius: f64,
	/// Radius of task nodes.
	pub task_radius: f64,
	/// Radius of subtask nodes.
	pub subtask_radius: f64,
	/// Maximum initial jitter applied by the graph model.
	pub jitter: f64,
}

impl Default for LayoutConfig {
	fn default() -> Self {
		Self {
			cell_size: 200.0,
			margin: 150.0,
			ring_radius: 80.0,
			task_radius: 20.0,
			subtask_radius: 12.0,
			jitter: 10.0,
		}
	}
}

/// Force simulation constants.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimulationConfig {
	/// Alpha on start.
	pub alpha_start: f64,
	/// Multiplicative alpha loss per tick (0.02 = 2%).
	pub alpha_decay: f64,
	/// Below this alpha the run settles.
	pub alpha_min: f64,
	/// Pull toward the canvas center.
	pub center_strength: f64,
	/// Spring rest length.
	pub link_distance: f64,
	/// Spring strength used for new links.
	pub link_strength: f64,
	/// Extra spacing added to the sum of radii before nodes collide.
	pub collision_buffer: f64,
	/// Fraction of velocity lost each tick.
	pub velocity_decay: f64,
	/// Tick budget for one run.
	pub max_ticks: u32,
	/// Delay between scheduled ticks, in milliseconds.
	pub tick_interval_ms: i32,
}

impl Default for SimulationConfig {
	fn default() -> Self {
		Self {
			alpha_start: 1.0,
			alpha_decay: 0.02,
			alpha_min: 0.001,
			center_strength: 0.001,
			link_distance: 100.0,
			link_strength: 0.1,
			collision_buffer: 10.0,
			velocity_decay: 0.4,
			max_ticks: 50,
			tick_interval_ms: 16,
		}
	}
}

/// Pointer handling.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InteractionConfig {
	/// Pointer travel (logical units) after which a press is a drag, not a click.
	pub click_threshold: f64,
}

impl Default for InteractionConfig {
	fn default() -> Self {
		Self {
			click_threshold: 3.0,
		}
	}
}

/// REST endpoints.
#[derive(Clone, Debug, PartialEq)]
pub struct ApiConfig {
	/// Prefix every endpoint is resolved against.
	pub base_url: String,
	/// How long a fetched submission stays fresh, in milliseconds.
	pub submission_ttl_ms: f64,
	/// Extra attempts at marking a subtask done after its review was written.
	pub mark_done_retries: u32,
}

impl Default for ApiConfig {
	fn default() -> Self {
		Self {
			base_url: "/api".into(),
			submission_ttl_ms: 5.0 * 60.0 * 1000.0,
			mark_done_retries: 2,
		}
	}
}

/// All graph tunables in one place.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphConfig {
	/// Drawing surface.
	pub canvas: CanvasConfig,
	/// Static placement.
	pub layout: LayoutConfig,
	/// Physics.
	pub simulation: SimulationConfig,
	/// Pointer handling.
	pub interaction: InteractionConfig,
}
