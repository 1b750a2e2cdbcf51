use thiserror::Error;

pub type Result<T> = std::result::Result<T, ApiError>;

/// Failures talking to the dashboard REST endpoints.
#[derive(Debug, Error)]
pub enum ApiError {
	/// Transport or decode failure
	#[error("request failed: {0}")]
	Http(#[from] reqwest::Error),

	/// Endpoint answered with a non-success status
	#[error("{url} answered {status}")]
	Status { status: u16, url: String },

	/// Record does not exist
	#[error("not found")]
	NotFound,

	/// Ratings are whole stars from 1 to 5
	#[error("rating must be between 1 and 5, got {0}")]
	InvalidRating(u8),

	/// Review was stored but the subtask could not be marked done
	#[error("review for subtask {subtask_id} saved but subtask not marked done")]
	PartialWrite { subtask_id: i64 },
}

impl ApiError {
	/// Message safe to show in an alert dialog.
	pub fn user_message(&self) -> &'static str {
		match self {
			Self::InvalidRating(_) => "Pilih rating 1 sampai 5 bintang.",
			Self::PartialWrite { .. } => {
				"Penilaian tersimpan, tetapi status subtugas belum diperbarui. Coba lagi."
			}
			_ => "Terjadi kesalahan. Silakan coba lagi.",
		}
	}
}
