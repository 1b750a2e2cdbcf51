//! REST collaborators of the graph view: task list, submission detail, rating.

mod cache;
mod client;
mod error;
mod rating;
mod types;

pub use cache::{SubmissionCache, SubmissionDetail};
pub use client::ApiClient;
pub use rating::submit_rating;
pub use types::{Assignee, ReviewInput, Subtask, Task};
