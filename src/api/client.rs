use log::debug;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;

use crate::config::ApiConfig;

use super::cache::SubmissionDetail;
use super::error::{ApiError, Result};
use super::types::{Review, ReviewInput, Submission, Task};

/// Thin JSON client over the dashboard's REST routes.
#[derive(Clone, Debug)]
pub struct ApiClient {
	http: Client,
	base_url: String,
}

impl ApiClient {
	/// `base_url` must be absolute; relative prefixes are joined onto `origin`.
	pub fn new(base_url: &str, origin: Option<&str>) -> Self {
		let base_url = match origin {
			Some(origin) if base_url.starts_with('/') => {
				format!("{}{}", origin.trim_end_matches('/'), base_url)
			}
			_ => base_url.to_string(),
		};
		Self {
			http: Client::new(),
			base_url: base_url.trim_end_matches('/').to_string(),
		}
	}

	/// Client rooted at the page origin.
	pub fn for_browser(config: &ApiConfig) -> Self {
		let origin = web_sys::window().and_then(|w| w.location().origin().ok());
		Self::new(&config.base_url, origin.as_deref())
	}

	pub fn url(&self, path: &str) -> String {
		format!("{}/{}", self.base_url, path.trim_start_matches('/'))
	}

	async fn get_json<T: DeserializeOwned>(&self, url: String) -> Result<T> {
		let response = self.http.get(&url).send().await?;
		let status = response.status();
		if status == StatusCode::NOT_FOUND {
			return Err(ApiError::NotFound);
		}
		if !status.is_success() {
			return Err(ApiError::Status {
				status: status.as_u16(),
				url,
			});
		}
		Ok(response.json().await?)
	}

	fn check(status: StatusCode, url: String) -> Result<()> {
		match status {
			StatusCode::NOT_FOUND => Err(ApiError::NotFound),
			s if s.is_success() => Ok(()),
			s => Err(ApiError::Status {
				status: s.as_u16(),
				url,
			}),
		}
	}

	/// A failed review lookup reads as "not reviewed yet".
	fn review_or_none(subtask_id: i64, result: Result<Review>) -> Option<Review> {
		match result {
			Ok(review) => Some(review),
			Err(err) => {
				debug!("no review for subtask {subtask_id}: {err}");
				None
			}
		}
	}

	pub async fn fetch_tasks(&self) -> Result<Vec<Task>> {
		self.get_json(self.url("tasks")).await
	}

	pub async fn fetch_submission(&self, subtask_id: i64) -> Result<Submission> {
		self.get_json(self.url(&format!("submissions?subtask_id={subtask_id}")))
			.await
	}

	/// Existing review, if any. A 404 or transport failure yields `None`.
	pub async fn fetch_review(&self, subtask_id: i64) -> Option<Review> {
		let result = self
			.get_json(self.url(&format!("reviews?subtask_id={subtask_id}")))
			.await;
		Self::review_or_none(subtask_id, result)
	}

	/// Submission plus review, fetched one after the other.
	pub async fn fetch_detail(&self, subtask_id: i64) -> Result<SubmissionDetail> {
		let submission = self.fetch_submission(subtask_id).await?;
		let review = self.fetch_review(subtask_id).await;
		Ok(SubmissionDetail { submission, review })
	}

	pub async fn upsert_review(&self, input: &ReviewInput) -> Result<Review> {
		let url = self.url("reviews");
		let response = self
			.http
			.post(&url)
			.header("Idempotency-Key", input.idempotency_key())
			.json(input)
			.send()
			.await?;
		Self::check(response.status(), url)?;
		Ok(response.json().await?)
	}

	pub async fn mark_subtask_done(&self, subtask_id: i64) -> Result<()> {
		let url = self.url(&format!("subtasks/{subtask_id}"));
		let response = self
			.http
			.patch(&url)
			.json(&serde_json::json!({ "is_done": true }))
			.send()
			.await?;
		Self::check(response.status(), url)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn relative_base_joins_origin() {
		let client = ApiClient::new("/api", Some("https://dash.example.go.id/"));
		assert_eq!(
			client.url("tasks"),
			"https://dash.example.go.id/api/tasks"
		);
	}

	#[test]
	fn absolute_base_ignores_origin() {
		let client = ApiClient::new("http://localhost:3000/api/", Some("https://other"));
		assert_eq!(
			client.url("/subtasks/4"),
			"http://localhost:3000/api/subtasks/4"
		);
	}

	#[test]
	fn status_mapping() {
		assert!(matches!(
			ApiClient::check(StatusCode::NOT_FOUND, "u".into()),
			Err(ApiError::NotFound)
		));
		assert!(matches!(
			ApiClient::check(StatusCode::BAD_GATEWAY, "u".into()),
			Err(ApiError::Status { status: 502, .. })
		));
		assert!(ApiClient::check(StatusCode::CREATED, "u".into()).is_ok());
	}

	#[test]
	fn review_lookup_failures_read_as_unreviewed() {
		let transport = Client::new()
			.get("not a url")
			.build()
			.expect_err("relative url without base");
		let failures = [
			ApiError::NotFound,
			ApiError::Status {
				status: 500,
				url: "u".into(),
			},
			ApiError::Http(transport),
		];
		for err in failures {
			assert_eq!(ApiClient::review_or_none(7, Err(err)), None);
		}

		let review = Review {
			id: 3,
			subtask_id: 7,
			rating: 4,
			reviewer_id: "17".into(),
		};
		assert_eq!(
			ApiClient::review_or_none(7, Ok(review.clone())),
			Some(review)
		);
	}
}
