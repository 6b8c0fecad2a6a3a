use super::PostId;
use serde::{Deserialize, Serialize};

/// 投稿編集のパッチ。`None` のフィールドは変更しない。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostPatch {
    pub content: Option<String>,
}

impl PostPatch {
    pub fn content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
        }
    }
}

/// ビューコンシューマから発火されるミューテーション・インテント。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MutationKind {
    ToggleLike { post_id: PostId },
    ToggleBookmark { post_id: PostId },
    ToggleRepost { post_id: PostId },
    CancelRepost { repost_id: PostId },
    QuoteRepost { post_id: PostId, content: String },
    Edit { post_id: PostId, patch: PostPatch },
    Delete { post_id: PostId },
}

impl MutationKind {
    /// ミューテーションの対象エンティティ ID。
    pub fn target(&self) -> &PostId {
        match self {
            MutationKind::ToggleLike { post_id }
            | MutationKind::ToggleBookmark { post_id }
            | MutationKind::ToggleRepost { post_id }
            | MutationKind::QuoteRepost { post_id, .. }
            | MutationKind::Edit { post_id, .. }
            | MutationKind::Delete { post_id } => post_id,
            MutationKind::CancelRepost { repost_id } => repost_id,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MutationKind::ToggleLike { .. } => "toggle_like",
            MutationKind::ToggleBookmark { .. } => "toggle_bookmark",
            MutationKind::ToggleRepost { .. } => "toggle_repost",
            MutationKind::CancelRepost { .. } => "cancel_repost",
            MutationKind::QuoteRepost { .. } => "quote_repost",
            MutationKind::Edit { .. } => "edit",
            MutationKind::Delete { .. } => "delete",
        }
    }
}
