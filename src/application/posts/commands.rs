use metrics::counter;
use tracing::{info, warn};

use crate::application::access::parse_id;
use crate::application::images::{ImageUpload, StoredImage, validate_image};
use crate::application::repos::{
    CreatePostParams, UpdatePostContentParams, UpdatePostStatusParams,
};
use crate::domain::entities::{PostRecord, PostWithAuthor};
use crate::domain::moderation::{ensure_can_modify, initial_status, normalize_reject_reason};
use crate::domain::types::PostStatus;

use super::service::PostService;
use super::types::{
    CreatePostCommand, EditPostCommand, PostServiceError, ensure_non_empty, normalize_subtitle,
};

const MODERATED_COUNTER: &str = "pulseboard_posts_moderated_total";
const RELEASED_COUNTER: &str = "pulseboard_images_released_total";

impl PostService {
    pub async fn create_post(
        &self,
        command: CreatePostCommand,
    ) -> Result<PostWithAuthor, PostServiceError> {
        let author_missing = command
            .author_id
            .as_deref()
            .is_none_or(|id| id.trim().is_empty());
        if command.title.trim().is_empty() || command.content.trim().is_empty() || author_missing
        {
            return Err(PostServiceError::Validation(
                "title, content and author are required".to_string(),
            ));
        }
        if let Some(image) = &command.image {
            self.check_image(image)?;
        }

        let author = self.access.require_actor(command.author_id.as_deref()).await?;
        let status = initial_status(author.role);

        let stored = match command.image {
            Some(image) => Some(self.images.upload(image).await?),
            None => None,
        };

        let params = CreatePostParams {
            title: command.title,
            subtitle: normalize_subtitle(command.subtitle),
            content: command.content,
            image_url: stored.as_ref().map(|image| image.url.clone()),
            image_public_id: stored.as_ref().map(|image| image.public_id.clone()),
            author_id: author.id,
            status,
            created_at: self.clock.now(),
        };

        let post = match self.writer.create_post(params).await {
            Ok(post) => post,
            Err(err) => {
                if let Some(image) = &stored {
                    self.release_image(&image.public_id).await;
                }
                return Err(err.into());
            }
        };

        info!(
            target = "pulseboard::posts",
            post_id = %post.id,
            author_id = %author.id,
            status = post.status.as_str(),
            "Post created"
        );

        Ok(PostWithAuthor { post, author })
    }

    pub async fn approve_post(
        &self,
        post_id: &str,
        admin_id: Option<&str>,
    ) -> Result<PostRecord, PostServiceError> {
        let admin = self.access.require_admin(admin_id).await?;
        let post = self.load_post(post_id).await?;

        let updated = self
            .writer
            .update_post_status(UpdatePostStatusParams {
                id: post.id,
                status: PostStatus::Approved,
                rejected_reason: None,
                updated_at: self.clock.now(),
            })
            .await?;

        counter!(MODERATED_COUNTER, "action" => "approve").increment(1);
        info!(
            target = "pulseboard::moderation",
            post_id = %updated.id,
            admin_id = %admin.id,
            previous = post.status.as_str(),
            "Post approved"
        );

        Ok(updated)
    }

    /// Returns the stored post together with the normalized reason.
    pub async fn reject_post(
        &self,
        post_id: &str,
        admin_id: Option<&str>,
        reason: Option<&str>,
    ) -> Result<(PostRecord, String), PostServiceError> {
        if admin_id.is_none_or(|id| id.trim().is_empty()) {
            return Err(PostServiceError::Validation(
                "acting user id is required".to_string(),
            ));
        }
        let reason = normalize_reject_reason(reason)?;
        let admin = self.access.require_admin(admin_id).await?;
        let post = self.load_post(post_id).await?;

        let updated = self
            .writer
            .update_post_status(UpdatePostStatusParams {
                id: post.id,
                status: PostStatus::Rejected,
                rejected_reason: Some(reason.clone()),
                updated_at: self.clock.now(),
            })
            .await?;

        counter!(MODERATED_COUNTER, "action" => "reject").increment(1);
        info!(
            target = "pulseboard::moderation",
            post_id = %updated.id,
            admin_id = %admin.id,
            previous = post.status.as_str(),
            "Post rejected"
        );

        Ok((updated, reason))
    }

    /// Deletes a post after releasing its hosted image.
    pub async fn delete_post(
        &self,
        post_id: &str,
        actor_id: Option<&str>,
    ) -> Result<(), PostServiceError> {
        let actor = self.access.require_actor(actor_id).await?;
        let target = self.load_post_with_author(post_id).await?;
        ensure_can_modify(&actor, &target.author)?;

        if let Some(public_id) = target.post.image_public_id.as_deref() {
            self.release_image(public_id).await;
        }

        self.writer.delete_post(target.post.id).await?;

        counter!(MODERATED_COUNTER, "action" => "delete").increment(1);
        info!(
            target = "pulseboard::moderation",
            post_id = %target.post.id,
            actor_id = %actor.id,
            "Post deleted"
        );

        Ok(())
    }

    /// Replaces the editable fields of a post.
    ///
    /// A replacement image is stored before anything else changes; the previous image is
    /// released only once the record points at the new one.
    pub async fn edit_post(
        &self,
        post_id: &str,
        actor_id: Option<&str>,
        command: EditPostCommand,
    ) -> Result<PostWithAuthor, PostServiceError> {
        let actor = self.access.require_actor(actor_id).await?;
        let target = self.load_post_with_author(post_id).await?;
        ensure_can_modify(&actor, &target.author)?;

        ensure_non_empty(&command.title, "title")?;
        ensure_non_empty(&command.content, "content")?;
        let replacement = command.image.filter(|image| !image.data.is_empty());
        if let Some(image) = &replacement {
            self.check_image(image)?;
        }

        let stored: Option<StoredImage> = match replacement {
            Some(image) => Some(self.images.upload(image).await?),
            None => None,
        };

        let (image_url, image_public_id) = match &stored {
            Some(image) => (Some(image.url.clone()), Some(image.public_id.clone())),
            None => (
                target.post.image_url.clone(),
                target.post.image_public_id.clone(),
            ),
        };

        let params = UpdatePostContentParams {
            id: target.post.id,
            title: command.title,
            subtitle: normalize_subtitle(command.subtitle),
            content: command.content,
            image_url,
            image_public_id,
            updated_at: self.clock.now(),
        };

        let updated = match self.writer.update_post_content(params).await {
            Ok(post) => post,
            Err(err) => {
                if let Some(image) = &stored {
                    self.release_image(&image.public_id).await;
                }
                return Err(err.into());
            }
        };

        if stored.is_some()
            && let Some(previous) = target.post.image_public_id.as_deref()
        {
            self.release_image(previous).await;
        }

        info!(
            target = "pulseboard::posts",
            post_id = %updated.id,
            actor_id = %actor.id,
            image_replaced = stored.is_some(),
            "Post updated"
        );

        Ok(PostWithAuthor {
            post: updated,
            author: target.author,
        })
    }

    /// Stores a standalone image and returns its hosted location.
    pub async fn upload_image(&self, image: ImageUpload) -> Result<StoredImage, PostServiceError> {
        self.check_image(&image)?;
        Ok(self.images.upload(image).await?)
    }

    pub(crate) fn check_image(&self, image: &ImageUpload) -> Result<(), PostServiceError> {
        validate_image(image, self.max_image_bytes).map_err(PostServiceError::Validation)
    }

    async fn load_post(&self, post_id: &str) -> Result<PostRecord, PostServiceError> {
        let Some(id) = parse_id(post_id) else {
            return Err(PostServiceError::NotFound { entity: "post" });
        };
        self.reader
            .find_by_id(id)
            .await?
            .ok_or(PostServiceError::NotFound { entity: "post" })
    }

    async fn load_post_with_author(
        &self,
        post_id: &str,
    ) -> Result<PostWithAuthor, PostServiceError> {
        let Some(id) = parse_id(post_id) else {
            return Err(PostServiceError::NotFound { entity: "post" });
        };
        self.reader
            .find_with_author(id)
            .await?
            .ok_or(PostServiceError::NotFound { entity: "post" })
    }

    /// Release failures are logged and never abort the surrounding operation.
    async fn release_image(&self, public_id: &str) {
        match self.images.delete(public_id).await {
            Ok(true) => {
                counter!(RELEASED_COUNTER).increment(1);
            }
            Ok(false) => {
                warn!(
                    target = "pulseboard::images",
                    public_id,
                    "Image host did not recognise image"
                );
            }
            Err(err) => {
                warn!(
                    target = "pulseboard::images",
                    public_id,
                    error = %err,
                    "Failed to release hosted image"
                );
            }
        }
    }
}
