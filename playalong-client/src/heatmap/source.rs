use crate::episode::MediaId;
use async_trait::async_trait;
use static_assertions::assert_obj_safe;
use thiserror::Error;
use url::Url;

/// Provides the timestamps of all comments on a medium.
#[async_trait]
pub trait CommentSource: Send + Sync {
	async fn comment_timestamps(&self, media_id: &MediaId) -> Result<Vec<f64>, CommentFetchError>;
}

assert_obj_safe!(CommentSource);

#[derive(Error, Debug)]
pub enum CommentFetchError {
	#[error("'{0}' cannot be a base URL.")]
	InvalidBaseUrl(Url),
	#[error("Request for comments failed: {0}")]
	Request(#[from] reqwest::Error),
}

/// Fetches `GET {backend}/api/comments/{media_id}`.
#[derive(Clone)]
pub struct HttpCommentSource {
	client: reqwest::Client,
	backend_url: Url,
}

impl HttpCommentSource {
	pub fn new(client: reqwest::Client, backend_url: Url) -> Self {
		Self { client, backend_url }
	}

	/// The media id always stays a single path segment.
	fn comments_url(&self, media_id: &MediaId) -> Result<Url, CommentFetchError> {
		let mut url = self.backend_url.clone();
		url.path_segments_mut()
			.map_err(|()| CommentFetchError::InvalidBaseUrl(self.backend_url.clone()))?
			.pop_if_empty()
			.extend(["api", "comments", media_id.as_str()]);
		Ok(url)
	}
}

#[async_trait]
impl CommentSource for HttpCommentSource {
	async fn comment_timestamps(&self, media_id: &MediaId) -> Result<Vec<f64>, CommentFetchError> {
		let url = self.comments_url(media_id)?;
		let timestamps = self
			.client
			.get(url)
			.send()
			.await?
			.error_for_status()?
			.json::<Vec<f64>>()
			.await?;
		Ok(timestamps)
	}
}
