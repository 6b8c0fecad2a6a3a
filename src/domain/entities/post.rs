use crate::domain::value_objects::{PostId, PostPatch, TeamId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 投稿エンティティ。キャッシュの同一性単位。
///
/// `repost_of` が設定されている場合は派生エンティティ（リポスト行）であり、
/// 自身のカウンタは独立だが、存在自体が元投稿へのリポスト操作の副作用になる。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub author_id: UserId,
    pub content: String,
    pub team_id: Option<TeamId>,
    pub created_at: DateTime<Utc>,
    pub like_count: u32,
    pub liked_by_me: bool,
    pub repost_count: u32,
    pub reposted_by_me: bool,
    pub bookmarked: bool,
    pub comment_count: u32,
    pub repost_of: Option<PostId>,
    pub is_owner: bool,
    pub is_pending_edit: bool,
}

impl Post {
    pub fn new(id: PostId, author_id: UserId, content: String) -> Self {
        Self {
            id,
            author_id,
            content,
            team_id: None,
            created_at: Utc::now(),
            like_count: 0,
            liked_by_me: false,
            repost_count: 0,
            reposted_by_me: false,
            bookmarked: false,
            comment_count: 0,
            repost_of: None,
            is_owner: false,
            is_pending_edit: false,
        }
    }

    pub fn with_team(mut self, team_id: TeamId) -> Self {
        self.team_id = Some(team_id);
        self
    }

    pub fn as_repost_of(mut self, original_id: PostId) -> Self {
        self.repost_of = Some(original_id);
        self
    }

    /// この投稿がリポスト行（派生エンティティ）かどうか。
    pub fn is_repost(&self) -> bool {
        self.repost_of.is_some()
    }

    /// いいねのトグル。フラグとカウンタは必ず同方向に動く。
    pub fn toggle_like(&mut self) {
        if self.liked_by_me {
            self.liked_by_me = false;
            self.like_count = self.like_count.saturating_sub(1);
        } else {
            self.liked_by_me = true;
            self.like_count += 1;
        }
    }

    /// リポストのトグル。カウンタは 0 でクランプする。
    pub fn toggle_repost(&mut self) {
        if self.reposted_by_me {
            self.reposted_by_me = false;
            self.repost_count = self.repost_count.saturating_sub(1);
        } else {
            self.reposted_by_me = true;
            self.repost_count += 1;
        }
    }

    pub fn toggle_bookmark(&mut self) {
        self.bookmarked = !self.bookmarked;
    }

    pub fn increment_reposts(&mut self) {
        self.repost_count += 1;
    }

    pub fn decrement_reposts(&mut self) {
        self.repost_count = self.repost_count.saturating_sub(1);
    }

    pub fn apply_comment_delta(&mut self, delta: i32) {
        if delta >= 0 {
            self.comment_count = self.comment_count.saturating_add(delta as u32);
        } else {
            self.comment_count = self.comment_count.saturating_sub(delta.unsigned_abs());
        }
    }

    pub fn apply_patch(&mut self, patch: &PostPatch) {
        if let Some(content) = &patch.content {
            self.content = content.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_post() -> Post {
        Post::new(
            PostId::new("post_1".to_string()).unwrap(),
            UserId::new("user_1".to_string()).unwrap(),
            "観戦してきた".to_string(),
        )
    }

    #[test]
    fn toggle_like_pair_is_identity() {
        let mut post = sample_post();
        post.like_count = 10;

        post.toggle_like();
        assert_eq!(post.like_count, 11);
        assert!(post.liked_by_me);

        post.toggle_like();
        assert_eq!(post.like_count, 10);
        assert!(!post.liked_by_me);
    }

    #[test]
    fn toggle_like_clamps_at_zero() {
        let mut post = sample_post();
        post.liked_by_me = true;
        post.like_count = 0;

        post.toggle_like();
        assert_eq!(post.like_count, 0);
        assert!(!post.liked_by_me);
    }

    #[test]
    fn repost_count_never_goes_negative() {
        let mut post = sample_post();
        post.decrement_reposts();
        assert_eq!(post.repost_count, 0);

        post.toggle_repost();
        post.toggle_repost();
        post.decrement_reposts();
        assert_eq!(post.repost_count, 0);
    }

    #[test]
    fn comment_delta_is_clamped() {
        let mut post = sample_post();
        post.apply_comment_delta(2);
        assert_eq!(post.comment_count, 2);
        post.apply_comment_delta(-5);
        assert_eq!(post.comment_count, 0);
    }

    #[test]
    fn patch_only_overwrites_present_fields() {
        let mut post = sample_post();
        post.apply_patch(&PostPatch::default());
        assert_eq!(post.content, "観戦してきた");

        post.apply_patch(&PostPatch::content("修正した"));
        assert_eq!(post.content, "修正した");
    }
}
