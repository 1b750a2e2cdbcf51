//! Derivation of graph nodes and links from the fetched task list.

use crate::api::Task;
use crate::config::GraphConfig;

use super::types::{GraphData, GraphLink, GraphNode, NodeLevel, Vec2};

pub fn task_node_id(task_id: i64) -> String {
	format!("task-{task_id}")
}

pub fn subtask_node_id(subtask_id: i64) -> String {
	format!("subtask-{subtask_id}")
}

/// Simple pseudo-random number generator (deterministic for consistency).
fn rand_simple(seed: usize) -> f64 {
	let x = ((seed + 1) * 9301 + 49297) % 233280;
	(x as f64) / 233280.0
}

fn jitter(seed: usize, amount: f64) -> Vec2 {
	Vec2::new(
		(rand_simple(seed * 2) - 0.5) * amount,
		(rand_simple(seed * 2 + 1) - 0.5) * amount,
	)
}

/// Case-insensitive match on the task title, any subtask title, or any assignee name.
pub fn matches_search(task: &Task, needle: &str) -> bool {
	let needle = needle.trim().to_lowercase();
	if needle.is_empty() {
		return true;
	}
	let hit = |s: &str| s.to_lowercase().contains(&needle);
	hit(&task.title)
		|| task.subtasks.iter().any(|s| {
			hit(&s.title) || s.assignee.as_ref().is_some_and(|a| hit(&a.name))
		})
}

/// Build the task/subtask star graph.
///
/// `search` narrows the tasks (blank means no narrowing) and `task_filter`
/// restricts the graph to one task id. Positions are only a seed; the static
/// layout places nodes properly afterwards.
pub fn build_graph(
	tasks: &[Task],
	search: &str,
	task_filter: Option<i64>,
	config: &GraphConfig,
) -> GraphData {
	let (cx, cy) = config.canvas.center();
	let center = Vec2::new(cx, cy);
	let mut data = GraphData::default();

	let retained = tasks
		.iter()
		.filter(|t| task_filter.is_none_or(|id| t.id == id))
		.filter(|t| matches_search(t, search));

	for task in retained {
		let task_id = task_node_id(task.id);
		let owner = task
			.subtasks
			.iter()
			.find_map(|s| s.assignee.as_ref().map(|a| a.name.clone()));

		let seed = data.nodes.len();
		data.nodes.push(GraphNode {
			id: task_id.clone(),
			name: task.title.clone(),
			level: NodeLevel::Task,
			completion: task.completion(),
			pos: center + jitter(seed, config.layout.jitter),
			vel: Vec2::ZERO,
			radius: config.layout.task_radius,
			fixed: None,
			avatar: None,
			owner,
			task_id: task.id,
			subtask_id: None,
			is_done: !task.subtasks.is_empty() && task.done_count() == task.subtasks.len(),
		});

		for subtask in &task.subtasks {
			let id = subtask_node_id(subtask.id);
			let seed = data.nodes.len();
			data.nodes.push(GraphNode {
				id: id.clone(),
				name: subtask.title.clone(),
				level: NodeLevel::Subtask,
				completion: if subtask.is_done { 1.0 } else { 0.0 },
				pos: center + jitter(seed, config.layout.jitter),
				vel: Vec2::ZERO,
				radius: config.layout.subtask_radius,
				fixed: None,
				avatar: subtask.assignee.as_ref().and_then(|a| a.avatar_url.clone()),
				owner: subtask.assignee.as_ref().map(|a| a.name.clone()),
				task_id: task.id,
				subtask_id: Some(subtask.id),
				is_done: subtask.is_done,
			});
			data.links.push(GraphLink {
				source: task_id.clone(),
				target: id,
				strength: config.simulation.link_strength,
			});
		}
	}

	data
}

#[cfg(test)]
pub(crate) mod tests {
	use std::collections::HashSet;

	use pretty_assertions::assert_eq;
	use proptest::prelude::*;

	use super::*;
	use crate::api::{Assignee, Subtask};

	pub(crate) fn subtask(id: i64, title: &str, done: bool, who: Option<&str>) -> Subtask {
		Subtask {
			id,
			title: title.into(),
			is_done: done,
			assignee: who.map(|name| Assignee {
				id: Some(id * 10),
				name: name.into(),
				avatar_url: Some(format!("/avatars/{}.png", name.to_lowercase())),
			}),
		}
	}

	pub(crate) fn laporan_bulanan() -> Task {
		Task {
			id: 1,
			title: "Laporan Bulanan".into(),
			status: Some("in_progress".into()),
			subtasks: vec![
				subtask(11, "Kumpulkan data", true, Some("Sari")),
				subtask(12, "Susun draf", true, Some("Budi")),
				subtask(13, "Verifikasi", false, None),
			],
		}
	}

	pub(crate) fn sample_tasks() -> Vec<Task> {
		vec![
			laporan_bulanan(),
			Task {
				id: 2,
				title: "Koordinasi Antar Instansi".into(),
				status: None,
				subtasks: vec![subtask(21, "Rapat teknis", false, Some("Dewi"))],
			},
			Task {
				id: 3,
				title: "Publikasi Media".into(),
				status: None,
				subtasks: vec![],
			},
		]
	}

	#[test]
	fn single_task_example() {
		let data = build_graph(&[laporan_bulanan()], "", None, &GraphConfig::default());
		assert_eq!(data.nodes.len(), 4);
		assert_eq!(data.links.len(), 3);

		let task = &data.nodes[0];
		assert_eq!(task.id, "task-1");
		assert_eq!(task.level, NodeLevel::Task);
		assert!((task.completion - 2.0 / 3.0).abs() < 1e-9);
		assert_eq!(task.owner.as_deref(), Some("Sari"));

		for link in &data.links {
			assert_eq!(link.source, "task-1");
			assert_eq!(data.node(&link.target).unwrap().level, NodeLevel::Subtask);
			assert_eq!(link.strength, 0.1);
		}
		let targets: Vec<_> = data.children_of("task-1").collect();
		assert_eq!(targets, vec!["subtask-11", "subtask-12", "subtask-13"]);
	}

	#[test]
	fn subtask_carries_avatar_and_owner() {
		let data = build_graph(&[laporan_bulanan()], "", None, &GraphConfig::default());
		let node = data.node("subtask-12").unwrap();
		assert_eq!(node.avatar.as_deref(), Some("/avatars/budi.png"));
		assert_eq!(node.owner.as_deref(), Some("Budi"));
		assert_eq!(node.subtask_id, Some(12));
		assert!(node.is_done);
		assert_eq!(data.node("subtask-13").unwrap().avatar, None);
	}

	#[test]
	fn radii_differ_by_level() {
		let data = build_graph(&sample_tasks(), "", None, &GraphConfig::default());
		for node in &data.nodes {
			let expected = if node.is_task() { 20.0 } else { 12.0 };
			assert_eq!(node.radius, expected);
		}
	}

	#[test]
	fn search_matches_task_title_case_insensitively() {
		let data = build_graph(&sample_tasks(), "  publikasi ", None, &GraphConfig::default());
		let ids: Vec<_> = data.nodes.iter().map(|n| n.id.as_str()).collect();
		assert_eq!(ids, vec!["task-3"]);
	}

	#[test]
	fn search_matches_subtask_and_assignee() {
		let config = GraphConfig::default();
		let by_subtask = build_graph(&sample_tasks(), "VERIFIKASI", None, &config);
		assert_eq!(by_subtask.nodes[0].id, "task-1");
		// the whole task is retained, not only the matching subtask
		assert_eq!(by_subtask.nodes.len(), 4);

		let by_assignee = build_graph(&sample_tasks(), "dewi", None, &config);
		assert_eq!(by_assignee.nodes.len(), 2);
		assert_eq!(by_assignee.nodes[0].id, "task-2");
	}

	#[test]
	fn task_filter_restricts_to_one_task() {
		let config = GraphConfig::default();
		let data = build_graph(&sample_tasks(), "", Some(2), &config);
		assert_eq!(data.nodes.len(), 2);
		assert!(data.nodes.iter().all(|n| n.task_id == 2));

		assert_eq!(build_graph(&sample_tasks(), "", Some(99), &config), GraphData::default());
		assert_eq!(build_graph(&sample_tasks(), "rapat", Some(1), &config), GraphData::default());
	}

	#[test]
	fn empty_task_has_zero_completion_and_no_links() {
		let data = build_graph(&sample_tasks(), "", Some(3), &GraphConfig::default());
		assert_eq!(data.nodes.len(), 1);
		assert_eq!(data.nodes[0].completion, 0.0);
		assert!(data.links.is_empty());
	}

	fn arb_tasks() -> impl Strategy<Value = Vec<Task>> {
		let sub = (any::<bool>(), prop::option::of("[a-z]{1,6}"));
		prop::collection::vec(("[a-z ]{0,10}", prop::collection::vec(sub, 0..6)), 0..8).prop_map(
			|raw| {
				raw.into_iter()
					.enumerate()
					.map(|(i, (title, subs))| Task {
						id: i as i64,
						title,
						status: None,
						subtasks: subs
							.into_iter()
							.enumerate()
							.map(|(j, (done, who))| Subtask {
								id: (i * 100 + j) as i64,
								title: format!("sub {j}"),
								is_done: done,
								assignee: who.map(|name| Assignee {
									id: None,
									name,
									avatar_url: None,
								}),
							})
							.collect(),
					})
					.collect()
			},
		)
	}

	proptest! {
		#[test]
		fn derivation_is_pure(tasks in arb_tasks(), search in "[a-z]{0,2}", filter in prop::option::of(0i64..8)) {
			let config = GraphConfig::default();
			let a = build_graph(&tasks, &search, filter, &config);
			let b = build_graph(&tasks, &search, filter, &config);
			let shape = |d: &GraphData| {
				(
					d.nodes.iter().map(|n| (n.id.clone(), n.level, n.completion.to_bits())).collect::<Vec<_>>(),
					d.links.iter().map(|l| (l.source.clone(), l.target.clone())).collect::<Vec<_>>(),
				)
			};
			prop_assert_eq!(shape(&a), shape(&b));
		}

		#[test]
		fn every_subtask_has_one_parent_link(tasks in arb_tasks()) {
			let data = build_graph(&tasks, "", None, &GraphConfig::default());
			for node in data.nodes.iter().filter(|n| !n.is_task()) {
				let incoming: Vec<_> = data.links.iter().filter(|l| l.target == node.id).collect();
				prop_assert_eq!(incoming.len(), 1);
				prop_assert_eq!(&incoming[0].source, &task_node_id(node.task_id));
			}
			let sources: HashSet<_> = data.links.iter().map(|l| l.source.as_str()).collect();
			for source in sources {
				prop_assert!(data.node(source).unwrap().is_task());
			}
		}
	}
}
