use std::sync::Arc;

use crate::application::admin_stats::AdminStatsService;
use crate::application::goal::GoalService;
use crate::application::posts::PostService;
use crate::application::users::UserService;

#[derive(Clone)]
pub struct ApiState {
    pub goal: Arc<GoalService>,
    pub posts: Arc<PostService>,
    pub users: Arc<UserService>,
    pub admin_stats: Arc<AdminStatsService>,
}
