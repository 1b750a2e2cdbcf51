use log::{info, warn};

use super::client::ApiClient;
use super::error::{ApiError, Result};
use super::types::{Review, ReviewInput};

/// The two writes a rating needs.
pub trait ReviewStore {
	async fn upsert_review(&self, input: &ReviewInput) -> Result<Review>;
	async fn mark_subtask_done(&self, subtask_id: i64) -> Result<()>;
}

impl ReviewStore for ApiClient {
	async fn upsert_review(&self, input: &ReviewInput) -> Result<Review> {
		ApiClient::upsert_review(self, input).await
	}

	async fn mark_subtask_done(&self, subtask_id: i64) -> Result<()> {
		ApiClient::mark_subtask_done(self, subtask_id).await
	}
}

/// Store a review, then mark its subtask done.
///
/// The review write carries an idempotency key, so only the second write is
/// retried: up to `retries` extra attempts. When every attempt fails the
/// review exists but the subtask is still open, reported as
/// [`ApiError::PartialWrite`].
pub async fn submit_rating<S: ReviewStore>(
	store: &S,
	input: ReviewInput,
	retries: u32,
) -> Result<Review> {
	if !(1..=5).contains(&input.rating) {
		return Err(ApiError::InvalidRating(input.rating));
	}

	let review = store.upsert_review(&input).await?;

	for attempt in 0..=retries {
		match store.mark_subtask_done(input.subtask_id).await {
			Ok(()) => {
				info!(
					"subtask {} rated {} by {}",
					input.subtask_id, input.rating, input.reviewer_id
				);
				return Ok(review);
			}
			Err(err) => warn!(
				"marking subtask {} done failed (attempt {}): {err}",
				input.subtask_id,
				attempt + 1
			),
		}
	}

	Err(ApiError::PartialWrite {
		subtask_id: input.subtask_id,
	})
}
