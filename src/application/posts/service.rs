use std::sync::Arc;

use crate::application::access::AccessControl;
use crate::application::clock::Clock;
use crate::application::images::ImageHost;
use crate::application::repos::{PostsRepo, PostsWriteRepo};

#[derive(Clone)]
pub struct PostService {
    pub(crate) reader: Arc<dyn PostsRepo>,
    pub(crate) writer: Arc<dyn PostsWriteRepo>,
    pub(crate) access: AccessControl,
    pub(crate) images: Arc<dyn ImageHost>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) max_image_bytes: u64,
}

impl PostService {
    pub fn new(
        reader: Arc<dyn PostsRepo>,
        writer: Arc<dyn PostsWriteRepo>,
        access: AccessControl,
        images: Arc<dyn ImageHost>,
        clock: Arc<dyn Clock>,
        max_image_bytes: u64,
    ) -> Self {
        Self {
            reader,
            writer,
            access,
            images,
            clock,
            max_image_bytes,
        }
    }
}
