use super::{PostId, TeamId, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// ビュープロジェクションのキー。
///
/// 「フィルタ署名 + ページ」単位で 1 ビューを表す。ストア側はキーの意味を解釈せず、
/// コーディネータが渡す述語でのみマッチングする。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ViewKey {
    /// 単一投稿の詳細ビュー。
    PostDetail(PostId),
    /// フィードの 1 ページ。`team` が `None` なら全体フィード。
    Feed { team: Option<TeamId>, page: u32 },
    /// 特定ユーザーのフィードの 1 ページ。
    UserFeed { user: UserId, page: u32 },
}

impl ViewKey {
    /// フィード系ビュー（全体・チーム別・ユーザー別）かどうか。
    pub fn is_feed(&self) -> bool {
        matches!(self, ViewKey::Feed { .. } | ViewKey::UserFeed { .. })
    }

    pub fn is_detail_of(&self, post_id: &PostId) -> bool {
        matches!(self, ViewKey::PostDetail(id) if id == post_id)
    }

    pub fn is_user_feed_of(&self, user_id: &UserId) -> bool {
        matches!(self, ViewKey::UserFeed { user, .. } if user == user_id)
    }

    pub fn is_first_page(&self) -> bool {
        match self {
            ViewKey::PostDetail(_) => false,
            ViewKey::Feed { page, .. } | ViewKey::UserFeed { page, .. } => *page == 0,
        }
    }
}

impl fmt::Display for ViewKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewKey::PostDetail(id) => write!(f, "post:{id}"),
            ViewKey::Feed { team: None, page } => write!(f, "feed:all:{page}"),
            ViewKey::Feed {
                team: Some(team),
                page,
            } => write!(f, "feed:{team}:{page}"),
            ViewKey::UserFeed { user, page } => write!(f, "user:{user}:{page}"),
        }
    }
}
