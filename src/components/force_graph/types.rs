use std::ops::{Add, AddAssign, Mul, Sub};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec2 {
	pub x: f64,
	pub y: f64,
}

impl Vec2 {
	pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	pub fn length(self) -> f64 {
		(self.x * self.x + self.y * self.y).sqrt()
	}

	pub fn distance(self, other: Self) -> f64 {
		(other - self).length()
	}
}

impl Add for Vec2 {
	type Output = Self;
	fn add(self, rhs: Self) -> Self {
		Self::new(self.x + rhs.x, self.y + rhs.y)
	}
}

impl AddAssign for Vec2 {
	fn add_assign(&mut self, rhs: Self) {
		self.x += rhs.x;
		self.y += rhs.y;
	}
}

impl Sub for Vec2 {
	type Output = Self;
	fn sub(self, rhs: Self) -> Self {
		Self::new(self.x - rhs.x, self.y - rhs.y)
	}
}

impl Mul<f64> for Vec2 {
	type Output = Self;
	fn mul(self, k: f64) -> Self {
		Self::new(self.x * k, self.y * k)
	}
}

/// Depth in the task hierarchy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeLevel {
	Task = 0,
	Subtask = 1,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GraphNode {
	pub id: String,
	pub name: String,
	pub level: NodeLevel,
	/// Done ratio in `[0, 1]`.
	pub completion: f64,
	pub pos: Vec2,
	pub vel: Vec2,
	pub radius: f64,
	/// Forced position while dragged or after the simulation settled.
	pub fixed: Option<Vec2>,
	pub avatar: Option<String>,
	pub owner: Option<String>,
	pub task_id: i64,
	pub subtask_id: Option<i64>,
	pub is_done: bool,
}

impl GraphNode {
	pub fn is_task(&self) -> bool {
		self.level == NodeLevel::Task
	}

	/// Hold the node where it currently is.
	pub fn pin(&mut self) {
		self.fixed = Some(self.pos);
	}

	pub fn unpin(&mut self) {
		self.fixed = None;
	}
}

/// Task → subtask containment.
#[derive(Clone, Debug, PartialEq)]
pub struct GraphLink {
	pub source: String,
	pub target: String,
	pub strength: f64,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphData {
	pub nodes: Vec<GraphNode>,
	pub links: Vec<GraphLink>,
}

impl GraphData {
	pub fn index_of(&self, id: &str) -> Option<usize> {
		self.nodes.iter().position(|n| n.id == id)
	}

	pub fn node(&self, id: &str) -> Option<&GraphNode> {
		self.nodes.iter().find(|n| n.id == id)
	}

	pub fn node_mut(&mut self, id: &str) -> Option<&mut GraphNode> {
		self.nodes.iter_mut().find(|n| n.id == id)
	}

	/// Subtask nodes linked from `task_id`, in link order.
	pub fn children_of<'a>(&'a self, task_id: &'a str) -> impl Iterator<Item = &'a str> + 'a {
		self.links
			.iter()
			.filter(move |l| l.source == task_id)
			.map(|l| l.target.as_str())
	}
}
