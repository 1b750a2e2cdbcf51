//! Deterministic grid/ring placement used whenever the graph is rebuilt or reset.

use std::f64::consts::PI;

use crate::config::{CanvasConfig, LayoutConfig};

use super::types::{GraphData, Vec2};

/// Keep a circle of `radius` fully inside the canvas.
pub fn clamp_to_canvas(pos: Vec2, radius: f64, canvas: &CanvasConfig) -> Vec2 {
	let clamp = |v: f64, max: f64| {
		if max - radius < radius {
			max / 2.0
		} else {
			v.clamp(radius, max - radius)
		}
	};
	Vec2::new(clamp(pos.x, canvas.width), clamp(pos.y, canvas.height))
}

/// Grid cell center for task `i` of a grid with `cols` columns.
pub fn grid_position(i: usize, cols: usize, layout: &LayoutConfig) -> Vec2 {
	let (row, col) = (i / cols, i % cols);
	Vec2::new(
		layout.margin + col as f64 * layout.cell_size,
		layout.margin + row as f64 * layout.cell_size,
	)
}

/// Position of subtask `j` of `count` siblings around `center`.
pub fn ring_position(center: Vec2, j: usize, count: usize, layout: &LayoutConfig) -> Vec2 {
	let angle = 2.0 * PI * j as f64 / count as f64;
	center + Vec2::new(angle.cos(), angle.sin()) * layout.ring_radius
}

/// Place tasks on a square-ish grid and their subtasks on a ring around them.
///
/// Velocities are zeroed and pins released, so the result is a clean starting
/// point for a later simulation run.
pub fn apply_static_layout(data: &mut GraphData, layout: &LayoutConfig, canvas: &CanvasConfig) {
	let task_ids: Vec<String> = data
		.nodes
		.iter()
		.filter(|n| n.is_task())
		.map(|n| n.id.clone())
		.collect();
	let cols = (task_ids.len() as f64).sqrt().ceil().max(1.0) as usize;

	for (i, task_id) in task_ids.iter().enumerate() {
		let center = grid_position(i, cols, layout);
		let children: Vec<String> = data.children_of(task_id).map(String::from).collect();

		if let Some(node) = data.node_mut(task_id) {
			node.pos = clamp_to_canvas(center, node.radius, canvas);
		}
		for (j, child) in children.iter().enumerate() {
			if let Some(node) = data.node_mut(child) {
				let pos = ring_position(center, j, children.len(), layout);
				node.pos = clamp_to_canvas(pos, node.radius, canvas);
			}
		}
	}

	for node in &mut data.nodes {
		// orphans keep their seed position, still inside the canvas
		node.pos = clamp_to_canvas(node.pos, node.radius, canvas);
		node.vel = Vec2::ZERO;
		node.unpin();
	}
}

#[cfg(test)]
mod tests {
	use proptest::prelude::*;

	use super::*;
	use crate::components::force_graph::model::build_graph;
	use crate::components::force_graph::model::tests::{laporan_bulanan, subtask};
	use crate::api::Task;
	use crate::config::GraphConfig;

	fn close(a: Vec2, b: Vec2) -> bool {
		a.distance(b) < 1e-9
	}

	#[test]
	fn single_task_example_positions() {
		let config = GraphConfig::default();
		let mut data = build_graph(&[laporan_bulanan()], "", None, &config);
		apply_static_layout(&mut data, &config.layout, &config.canvas);

		let task = data.node("task-1").unwrap().pos;
		assert!(close(task, Vec2::new(150.0, 150.0)));

		let expected = [0.0_f64, 120.0, 240.0].map(|deg| {
			let a = deg.to_radians();
			Vec2::new(150.0 + 80.0 * a.cos(), 150.0 + 80.0 * a.sin())
		});
		for (id, want) in ["subtask-11", "subtask-12", "subtask-13"].iter().zip(expected) {
			assert!(close(data.node(id).unwrap().pos, want), "{id}");
		}
	}

	#[test]
	fn single_subtask_sits_at_angle_zero() {
		let config = GraphConfig::default();
		let task = Task {
			id: 5,
			title: "Rilis".into(),
			status: None,
			subtasks: vec![subtask(51, "Unggah", false, None)],
		};
		let mut data = build_graph(&[task], "", None, &config);
		apply_static_layout(&mut data, &config.layout, &config.canvas);
		assert!(close(data.nodes[1].pos, Vec2::new(230.0, 150.0)));
	}

	#[test]
	fn grid_wraps_by_ceil_sqrt() {
		let layout = LayoutConfig::default();
		// five tasks → three columns
		assert_eq!(grid_position(2, 3, &layout), Vec2::new(550.0, 150.0));
		assert_eq!(grid_position(3, 3, &layout), Vec2::new(150.0, 350.0));
	}

	#[test]
	fn far_cells_are_clamped() {
		let canvas = CanvasConfig::default();
		let pos = clamp_to_canvas(Vec2::new(950.0, -40.0), 20.0, &canvas);
		assert_eq!(pos, Vec2::new(780.0, 20.0));
	}

	#[test]
	fn layout_releases_pins_and_velocity() {
		let config = GraphConfig::default();
		let mut data = build_graph(&[laporan_bulanan()], "", None, &config);
		for node in &mut data.nodes {
			node.vel = Vec2::new(3.0, 3.0);
			node.pin();
		}
		apply_static_layout(&mut data, &config.layout, &config.canvas);
		assert!(data.nodes.iter().all(|n| n.fixed.is_none() && n.vel == Vec2::ZERO));
	}

	fn many_tasks(sizes: Vec<usize>) -> Vec<Task> {
		sizes
			.into_iter()
			.enumerate()
			.map(|(i, k)| Task {
				id: i as i64,
				title: format!("T{i}"),
				status: None,
				subtasks: (0..k)
					.map(|j| subtask((i * 100 + j) as i64, "s", j % 2 == 0, None))
					.collect(),
			})
			.collect()
	}

	proptest! {
		#[test]
		fn every_node_inside_canvas(sizes in prop::collection::vec(0usize..7, 0..20)) {
			let config = GraphConfig::default();
			let mut data = build_graph(&many_tasks(sizes), "", None, &config);
			apply_static_layout(&mut data, &config.layout, &config.canvas);
			for n in &data.nodes {
				prop_assert!(n.pos.x >= n.radius && n.pos.x <= config.canvas.width - n.radius);
				prop_assert!(n.pos.y >= n.radius && n.pos.y <= config.canvas.height - n.radius);
			}
		}

		#[test]
		fn subtasks_evenly_spaced_on_ring(k in 1usize..9) {
			// a single task at (150, 150) keeps its whole ring on-canvas
			let config = GraphConfig::default();
			let mut data = build_graph(&many_tasks(vec![k]), "", None, &config);
			apply_static_layout(&mut data, &config.layout, &config.canvas);
			let center = data.nodes[0].pos;
			let subs: Vec<_> = data.nodes.iter().filter(|n| !n.is_task()).collect();
			prop_assert_eq!(subs.len(), k);
			for (j, n) in subs.iter().enumerate() {
				prop_assert!((n.pos.distance(center) - 80.0).abs() < 1e-9);
				let want = ring_position(center, j, k, &config.layout);
				prop_assert!(close(n.pos, want));
			}
		}
	}
}
