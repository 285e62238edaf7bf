use crate::application::access::parse_id;
use crate::domain::entities::PostWithAuthor;
use crate::domain::types::PostStatus;

use super::service::PostService;
use super::types::PostServiceError;

impl PostService {
    pub async fn list_posts(
        &self,
        status: Option<PostStatus>,
    ) -> Result<Vec<PostWithAuthor>, PostServiceError> {
        Ok(self.reader.list_with_authors(status).await?)
    }

    pub async fn get_post(&self, post_id: &str) -> Result<PostWithAuthor, PostServiceError> {
        let Some(id) = parse_id(post_id) else {
            return Err(PostServiceError::NotFound { entity: "post" });
        };
        self.reader
            .find_with_author(id)
            .await?
            .ok_or(PostServiceError::NotFound { entity: "post" })
    }
}
