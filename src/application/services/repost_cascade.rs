use super::events::{ChangeNotifier, TimelineEvent};
use crate::application::ports::gateway::PostGateway;
use crate::domain::entities::Post;
use crate::domain::value_objects::{PostId, UserId, ViewKey};
use crate::infrastructure::cache::{PostCacheService, ViewStoreService};
use crate::shared::error::AppError;
use std::sync::Arc;
use tracing::{debug, warn};

/// リポスト系ミューテーションのカスケードハンドラ。
///
/// 派生エンティティ（リポスト行）への操作は、元投稿のカウンタにも波及する。
/// 元投稿の解決には `PostCacheService` の逆引きインデックスを使い、引けない場合は
/// ローカル更新をスキップしてサーバー呼び出しだけ行う（次のフェッチで自己修復する）。
pub struct RepostCascade {
    cache: Arc<PostCacheService>,
    views: Arc<ViewStoreService>,
    gateway: Arc<dyn PostGateway>,
    notifier: ChangeNotifier,
    current_user: UserId,
}

impl RepostCascade {
    pub(crate) fn new(
        cache: Arc<PostCacheService>,
        views: Arc<ViewStoreService>,
        gateway: Arc<dyn PostGateway>,
        notifier: ChangeNotifier,
        current_user: UserId,
    ) -> Self {
        Self {
            cache,
            views,
            gateway,
            notifier,
            current_user,
        }
    }

    /// リポストのトグル。
    ///
    /// 楽観更新は元投稿のフラグ＋カウンタのみ。新しいリポスト行は ID がサーバー
    /// 採番のため合成せず、成功応答に含まれていた場合にだけ自分のフィード先頭へ
    /// 挿入する。
    pub async fn toggle_repost(&self, post_id: &PostId) -> Result<(), AppError> {
        let previous = self.cache.update(post_id, |post| post.toggle_repost()).await;
        if previous.is_some() {
            self.notifier.post_updated(post_id).await;
        }

        match self.gateway.toggle_repost(post_id).await {
            Ok(outcome) => {
                self.cache
                    .update(post_id, |post| {
                        post.reposted_by_me = outcome.reposted;
                        post.repost_count = outcome.repost_count;
                    })
                    .await;
                self.notifier.post_updated(post_id).await;

                if outcome.reposted {
                    if let Some(repost) = outcome.repost {
                        self.insert_own_repost(repost).await;
                    }
                } else {
                    self.drop_own_reposts(post_id).await;
                }
                Ok(())
            }
            Err(err) => {
                warn!("toggle_repost failed for {post_id}, rolling back: {err}");
                if let Some(previous) = previous {
                    self.cache.put(previous).await;
                    self.notifier.post_updated(post_id).await;
                }
                self.notifier.invalidate_feeds().await;
                Err(err)
            }
        }
    }

    /// リポストの取り消し。対象はリポスト行エンティティの ID。
    pub async fn cancel_repost(&self, repost_id: &PostId) -> Result<(), AppError> {
        let original_id = match self.cache.original_of(repost_id).await {
            Some(id) => Some(id),
            None => self
                .cache
                .get(repost_id)
                .await
                .and_then(|post| post.repost_of),
        };
        if original_id.is_none() {
            // 元投稿が見つからない場合もサーバーへは送る。カウンタは次の
            // フェッチで追い付く（許容された staleness ウィンドウ）。
            warn!("original post for repost {repost_id} not resolvable, skipping cascade");
        }

        let removed_positions = self.views.remove_everywhere(repost_id).await;
        for (key, _) in &removed_positions {
            self.notifier.emit(TimelineEvent::ViewUpdated(key.clone()));
        }

        let previous_original = match &original_id {
            Some(id) => {
                let previous = self
                    .cache
                    .update(id, |post| {
                        post.decrement_reposts();
                        post.reposted_by_me = false;
                    })
                    .await;
                if previous.is_some() {
                    self.notifier.post_updated(id).await;
                }
                previous
            }
            None => None,
        };

        match self.gateway.cancel_repost(repost_id).await {
            Ok(outcome) => {
                if let Some(id) = &original_id {
                    self.cache
                        .update(id, |post| post.repost_count = outcome.repost_count)
                        .await;
                    self.notifier.post_updated(id).await;
                }
                if self.cache.remove(repost_id).await.is_some() {
                    self.notifier
                        .emit(TimelineEvent::PostRemoved(repost_id.clone()));
                }
                Ok(())
            }
            Err(err) => {
                warn!("cancel_repost failed for {repost_id}, rolling back: {err}");
                self.views
                    .restore_removed(repost_id, &removed_positions)
                    .await;
                for (key, _) in &removed_positions {
                    self.notifier.emit(TimelineEvent::ViewUpdated(key.clone()));
                }
                if let (Some(id), Some(previous)) = (&original_id, previous_original) {
                    self.cache.put(previous).await;
                    self.notifier.post_updated(id).await;
                }
                self.notifier.invalidate_feeds().await;
                Err(err)
            }
        }
    }

    /// 引用リポストの作成。
    ///
    /// 元投稿への楽観変更はしない。並び順も本文もサーバー決定のため、成功後に
    /// カウンタを 1 進め、フィードを無効化して次のフェッチで新エンティティを
    /// 取り込む。
    pub async fn quote_repost(&self, post_id: &PostId, content: &str) -> Result<(), AppError> {
        if content.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Quote repost content cannot be empty".to_string(),
            ));
        }

        let created = self.gateway.create_quote_repost(post_id, content).await?;
        let created_id = created.id.clone();
        self.cache.put(created).await;
        self.notifier.emit(TimelineEvent::PostUpdated(created_id));

        if self
            .cache
            .update(post_id, |post| post.increment_reposts())
            .await
            .is_some()
        {
            self.notifier.post_updated(post_id).await;
        }
        self.notifier.invalidate_feeds().await;
        Ok(())
    }

    /// サーバーが返したリポスト行をキャッシュし、自分のフィード先頭へ挿入する。
    async fn insert_own_repost(&self, repost: Post) {
        let repost_id = repost.id.clone();
        self.cache.put(repost).await;
        self.notifier
            .emit(TimelineEvent::PostUpdated(repost_id.clone()));

        let head_key = ViewKey::UserFeed {
            user: self.current_user.clone(),
            page: 0,
        };
        if self.views.insert_into(&head_key, repost_id.clone(), 0).await {
            debug!("inserted repost {repost_id} into {head_key}");
            self.notifier.emit(TimelineEvent::ViewUpdated(head_key));
        }
    }

    /// サーバー側でリポストが解除されていた場合、自分のリポスト行を取り除く。
    async fn drop_own_reposts(&self, original_id: &PostId) {
        for repost_id in self.cache.owned_reposts_of(original_id).await {
            for (key, _) in self.views.remove_everywhere(&repost_id).await {
                self.notifier.emit(TimelineEvent::ViewUpdated(key));
            }
            self.cache.remove(&repost_id).await;
            self.notifier.emit(TimelineEvent::PostRemoved(repost_id));
        }
    }
}
