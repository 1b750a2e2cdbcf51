use std::collections::HashMap;

use super::types::{Review, Submission};

/// What a subtask click needs to show: the submission and any existing review.
#[derive(Clone, Debug, PartialEq)]
pub struct SubmissionDetail {
	pub submission: Submission,
	pub review: Option<Review>,
}

struct Entry {
	detail: SubmissionDetail,
	fetched_at_ms: f64,
}

/// Short-lived memo of submission lookups keyed by subtask id.
///
/// Time is passed in by the caller (`js_sys::Date::now()` in the browser) so
/// the cache stays testable off-wasm.
pub struct SubmissionCache {
	ttl_ms: f64,
	entries: HashMap<i64, Entry>,
}

impl SubmissionCache {
	pub fn new(ttl_ms: f64) -> Self {
		Self {
			ttl_ms,
			entries: HashMap::new(),
		}
	}

	/// Fresh entry for `subtask_id`, evicting it when stale.
	pub fn get(&mut self, subtask_id: i64, now_ms: f64) -> Option<SubmissionDetail> {
		let fresh = self
			.entries
			.get(&subtask_id)
			.is_some_and(|e| now_ms - e.fetched_at_ms < self.ttl_ms);
		if !fresh {
			self.entries.remove(&subtask_id);
			return None;
		}
		self.entries.get(&subtask_id).map(|e| e.detail.clone())
	}

	/// Store a fresh lookup, pruning whatever has expired by `now_ms`.
	pub fn insert(&mut self, subtask_id: i64, detail: SubmissionDetail, now_ms: f64) {
		let ttl_ms = self.ttl_ms;
		self.entries.retain(|_, e| now_ms - e.fetched_at_ms < ttl_ms);
		self.entries.insert(
			subtask_id,
			Entry {
				detail,
				fetched_at_ms: now_ms,
			},
		);
	}

	/// Drop an entry after its review changed.
	pub fn invalidate(&mut self, subtask_id: i64) {
		self.entries.remove(&subtask_id);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::api::types::SubmissionSubject;

	fn detail(id: i64) -> SubmissionDetail {
		SubmissionDetail {
			submission: Submission {
				id,
				file_url: Some("/files/laporan.pdf".into()),
				comment: None,
				submitted_at: "2024-05-01T08:00:00Z".into(),
				is_revision: false,
				subject: SubmissionSubject {
					task_id: 1,
					task_title: "Laporan Bulanan".into(),
					subtask_id: id,
					subtask_title: "Draft".into(),
					assignee: None,
				},
			},
			review: None,
		}
	}

	#[test]
	fn hit_within_ttl() {
		let mut cache = SubmissionCache::new(300_000.0);
		cache.insert(5, detail(5), 1_000.0);
		assert_eq!(cache.get(5, 200_000.0), Some(detail(5)));
	}

	#[test]
	fn stale_entry_is_evicted() {
		let mut cache = SubmissionCache::new(300_000.0);
		cache.insert(5, detail(5), 0.0);
		assert_eq!(cache.get(5, 300_000.0), None);
		assert_eq!(cache.entries.len(), 0);
	}

	#[test]
	fn insert_prunes_expired_entries() {
		let mut cache = SubmissionCache::new(300_000.0);
		cache.insert(1, detail(1), 0.0);
		cache.insert(2, detail(2), 100_000.0);
		// 1 is past its ttl, 2 is not
		cache.insert(3, detail(3), 350_000.0);
		let mut ids: Vec<i64> = cache.entries.keys().copied().collect();
		ids.sort();
		assert_eq!(ids, vec![2, 3]);
	}

	#[test]
	fn invalidate_forces_refetch() {
		let mut cache = SubmissionCache::new(300_000.0);
		cache.insert(5, detail(5), 0.0);
		cache.invalidate(5);
		assert_eq!(cache.get(5, 1.0), None);
	}
}
