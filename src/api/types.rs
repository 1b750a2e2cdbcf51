use serde::{Deserialize, Serialize};

/// Employee a subtask is assigned to.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Assignee {
	pub id: Option<i64>,
	pub name: String,
	#[serde(default)]
	pub avatar_url: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Subtask {
	pub id: i64,
	pub title: String,
	#[serde(default)]
	pub is_done: bool,
	#[serde(default)]
	pub assignee: Option<Assignee>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Task {
	pub id: i64,
	pub title: String,
	#[serde(default)]
	pub status: Option<String>,
	#[serde(default)]
	pub subtasks: Vec<Subtask>,
}

impl Task {
	/// Number of subtasks marked done.
	pub fn done_count(&self) -> usize {
		self.subtasks.iter().filter(|s| s.is_done).count()
	}

	/// Done ratio in `[0, 1]`; a task without subtasks counts as 0.
	pub fn completion(&self) -> f64 {
		if self.subtasks.is_empty() {
			0.0
		} else {
			self.done_count() as f64 / self.subtasks.len() as f64
		}
	}
}

/// Identity block nested in a submission.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SubmissionSubject {
	pub task_id: i64,
	pub task_title: String,
	pub subtask_id: i64,
	pub subtask_title: String,
	#[serde(default)]
	pub assignee: Option<Assignee>,
}

/// Work uploaded for a subtask.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Submission {
	pub id: i64,
	#[serde(default)]
	pub file_url: Option<String>,
	#[serde(default)]
	pub comment: Option<String>,
	pub submitted_at: String,
	#[serde(default)]
	pub is_revision: bool,
	pub subject: SubmissionSubject,
}

/// Star rating a reviewer left on a subtask.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Review {
	pub id: i64,
	pub subtask_id: i64,
	pub rating: u8,
	pub reviewer_id: String,
}

/// Body of a review create-or-update call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReviewInput {
	pub subtask_id: i64,
	pub rating: u8,
	pub reviewer_id: String,
}

impl ReviewInput {
	/// Key the server uses to recognize a retried write of the same review.
	pub fn idempotency_key(&self) -> String {
		format!("review-{}-{}", self.subtask_id, self.reviewer_id)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn task_payload_parses_with_missing_optionals() {
		let json = r#"[{
			"id": 7,
			"title": "Laporan Bulanan",
			"subtasks": [
				{"id": 1, "title": "Draft", "is_done": true,
				 "assignee": {"id": 3, "name": "Sari", "avatar_url": "/a/sari.png"}},
				{"id": 2, "title": "Review"}
			]
		}]"#;
		let tasks: Vec<Task> = serde_json::from_str(json).unwrap();
		assert_eq!(tasks[0].status, None);
		assert_eq!(tasks[0].subtasks.len(), 2);
		assert!(!tasks[0].subtasks[1].is_done);
		assert_eq!(
			tasks[0].subtasks[0].assignee.as_ref().unwrap().avatar_url.as_deref(),
			Some("/a/sari.png")
		);
	}

	#[test]
	fn completion_of_empty_task_is_zero() {
		let task = Task {
			id: 1,
			title: "Kosong".into(),
			status: None,
			subtasks: vec![],
		};
		assert_eq!(task.completion(), 0.0);
	}

	#[test]
	fn idempotency_key_is_stable() {
		let input = ReviewInput {
			subtask_id: 12,
			rating: 4,
			reviewer_id: "u-9".into(),
		};
		assert_eq!(input.idempotency_key(), "review-12-u-9");
		assert_eq!(input.idempotency_key(), input.clone().idempotency_key());
	}
}
