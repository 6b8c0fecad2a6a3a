use crate::domain::entities::Post;
use crate::domain::value_objects::{PostId, PostPatch};
use crate::shared::error::AppError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// いいねトグルのサーバー応答。カウントは常にサーバー値が正。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LikeOutcome {
    pub liked: bool,
    pub like_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookmarkOutcome {
    pub bookmarked: bool,
}

/// リポストトグルのサーバー応答。
///
/// リポストが作成された場合のみ、採番済みのリポスト行エンティティが返る。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepostOutcome {
    pub reposted: bool,
    pub repost_count: u32,
    pub repost: Option<Post>,
}

/// リポスト取り消しのサーバー応答。カウントは元投稿のもの。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CancelRepostOutcome {
    pub repost_count: u32,
}

/// リモート API へのゲートウェイポート。
///
/// トランスポート（HTTP + Cookie）はこのコアの外。すべて失敗しうるが、
/// 部分成功はない。
#[async_trait]
pub trait PostGateway: Send + Sync {
    async fn toggle_like(&self, post_id: &PostId) -> Result<LikeOutcome, AppError>;
    async fn toggle_bookmark(&self, post_id: &PostId) -> Result<BookmarkOutcome, AppError>;
    async fn toggle_repost(&self, post_id: &PostId) -> Result<RepostOutcome, AppError>;
    async fn cancel_repost(&self, repost_id: &PostId) -> Result<CancelRepostOutcome, AppError>;
    async fn create_quote_repost(
        &self,
        post_id: &PostId,
        content: &str,
    ) -> Result<Post, AppError>;
    async fn update_post(&self, post_id: &PostId, patch: &PostPatch) -> Result<(), AppError>;
    async fn delete_post(&self, post_id: &PostId) -> Result<(), AppError>;
}
