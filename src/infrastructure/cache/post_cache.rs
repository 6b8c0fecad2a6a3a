use crate::domain::entities::Post;
use crate::domain::value_objects::PostId;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// 投稿エンティティのキャッシュ。
///
/// フェッチ結果の正規化コピーを ID 単位で保持する。ビュープロジェクションは
/// ここへの ID 参照のみを持つため、エンティティの可変フィールドは常にこの
/// 1 箇所だけが真実になる。
#[derive(Clone)]
pub struct PostCacheService {
    posts: Arc<RwLock<HashMap<PostId, Post>>>,
    /// リポスト ID -> 元投稿 ID の逆引きインデックス。put/remove で維持する。
    repost_index: Arc<RwLock<HashMap<PostId, PostId>>>,
}

impl PostCacheService {
    pub fn new() -> Self {
        Self {
            posts: Arc::new(RwLock::new(HashMap::new())),
            repost_index: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// 投稿をキャッシュに追加（全置換）。
    pub async fn put(&self, post: Post) {
        let mut index = self.repost_index.write().await;
        match &post.repost_of {
            Some(original_id) => {
                index.insert(post.id.clone(), original_id.clone());
            }
            None => {
                index.remove(&post.id);
            }
        }
        drop(index);

        let mut posts = self.posts.write().await;
        posts.insert(post.id.clone(), post);
    }

    /// 複数の投稿をキャッシュに追加。
    pub async fn put_many(&self, batch: Vec<Post>) {
        for post in batch {
            self.put(post).await;
        }
    }

    /// ID で投稿を取得。
    pub async fn get(&self, id: &PostId) -> Option<Post> {
        let posts = self.posts.read().await;
        posts.get(id).cloned()
    }

    /// 投稿に変換を適用し、上書き前の値を返す。
    ///
    /// ID が存在しない場合は何もせず `None` を返す。ビューが未フェッチ・破棄済みの
    /// エンティティを参照しているだけなので、エラーではない。
    pub async fn update(
        &self,
        id: &PostId,
        transform: impl FnOnce(&mut Post),
    ) -> Option<Post> {
        let mut posts = self.posts.write().await;
        let post = posts.get_mut(id)?;
        let previous = post.clone();
        transform(post);
        Some(previous)
    }

    /// 投稿をキャッシュから削除。
    pub async fn remove(&self, id: &PostId) -> Option<Post> {
        let mut index = self.repost_index.write().await;
        index.remove(id);
        drop(index);

        let mut posts = self.posts.write().await;
        posts.remove(id)
    }

    /// リポスト行の元投稿 ID を逆引きする。
    pub async fn original_of(&self, repost_id: &PostId) -> Option<PostId> {
        let index = self.repost_index.read().await;
        index.get(repost_id).cloned()
    }

    /// 指定した元投稿に対する、ログインユーザー自身のリポスト行を列挙する。
    pub async fn owned_reposts_of(&self, original_id: &PostId) -> Vec<PostId> {
        let index = self.repost_index.read().await;
        let candidates: Vec<PostId> = index
            .iter()
            .filter(|(_, original)| *original == original_id)
            .map(|(repost_id, _)| repost_id.clone())
            .collect();
        drop(index);

        let posts = self.posts.read().await;
        candidates
            .into_iter()
            .filter(|id| posts.get(id).is_some_and(|post| post.is_owner))
            .collect()
    }

    pub async fn clear(&self) {
        self.posts.write().await.clear();
        self.repost_index.write().await.clear();
    }

    pub async fn len(&self) -> usize {
        self.posts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for PostCacheService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::UserId;

    fn post_id(value: &str) -> PostId {
        PostId::new(value.to_string()).unwrap()
    }

    fn sample_post(id: &str) -> Post {
        Post::new(
            post_id(id),
            UserId::new("user_1".to_string()).unwrap(),
            format!("本文 {id}"),
        )
    }

    #[tokio::test]
    async fn update_returns_previous_value() {
        let cache = PostCacheService::new();
        let mut post = sample_post("post_1");
        post.like_count = 10;
        cache.put(post).await;

        let previous = cache
            .update(&post_id("post_1"), |p| p.toggle_like())
            .await
            .expect("post should be cached");
        assert_eq!(previous.like_count, 10);
        assert!(!previous.liked_by_me);

        let current = cache.get(&post_id("post_1")).await.unwrap();
        assert_eq!(current.like_count, 11);
        assert!(current.liked_by_me);
    }

    #[tokio::test]
    async fn update_on_missing_id_is_noop() {
        let cache = PostCacheService::new();
        let previous = cache.update(&post_id("missing"), |p| p.toggle_like()).await;
        assert!(previous.is_none());
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn repost_index_tracks_put_and_remove() {
        let cache = PostCacheService::new();
        cache.put(sample_post("original")).await;
        cache
            .put(sample_post("repost").as_repost_of(post_id("original")))
            .await;

        assert_eq!(
            cache.original_of(&post_id("repost")).await,
            Some(post_id("original"))
        );

        cache.remove(&post_id("repost")).await;
        assert_eq!(cache.original_of(&post_id("repost")).await, None);
    }

    #[tokio::test]
    async fn owned_reposts_only_lists_own_rows() {
        let cache = PostCacheService::new();
        cache.put(sample_post("original")).await;

        let mut mine = sample_post("mine").as_repost_of(post_id("original"));
        mine.is_owner = true;
        cache.put(mine).await;

        let theirs = sample_post("theirs").as_repost_of(post_id("original"));
        cache.put(theirs).await;

        let owned = cache.owned_reposts_of(&post_id("original")).await;
        assert_eq!(owned, vec![post_id("mine")]);
    }
}
