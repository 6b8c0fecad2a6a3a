use crate::domain::value_objects::{PostId, ViewKey};
use crate::infrastructure::cache::ViewStoreService;
use std::sync::Arc;
use tokio::sync::broadcast;

/// キャッシュ・ビューの変更通知。
///
/// ビューコンシューマはこれを購読し、該当するエンティティ／ビューを読み直す。
/// ビューは ID 参照しか持たないため、通知を受けてキャッシュ経由で再解決すれば
/// 全ビューが同じ値を示す。
#[derive(Debug, Clone, PartialEq)]
pub enum TimelineEvent {
    /// エンティティの可変フィールドが変わった（楽観適用・照合・ロールバック）。
    PostUpdated(PostId),
    /// エンティティがキャッシュから消えた（削除・リポスト取り消し）。
    PostRemoved(PostId),
    /// ビューの ID リストが変わった。
    ViewUpdated(ViewKey),
    /// ビューが stale になり、再フェッチが必要。
    ViewInvalidated(ViewKey),
}

/// 変更通知の発行ヘルパー。コーディネータとカスケードハンドラで共有する。
#[derive(Clone)]
pub(crate) struct ChangeNotifier {
    views: Arc<ViewStoreService>,
    events: broadcast::Sender<TimelineEvent>,
}

impl ChangeNotifier {
    pub fn new(views: Arc<ViewStoreService>, events: broadcast::Sender<TimelineEvent>) -> Self {
        Self { views, events }
    }

    /// イベントを発行する。購読者がいない場合の送信失敗は無視する
    /// （コンシューマのティアダウン後も安全な no-op になる）。
    pub fn emit(&self, event: TimelineEvent) {
        let _ = self.events.send(event);
    }

    /// エンティティ変更を、本体と参照している全ビューに通知する。
    pub async fn post_updated(&self, id: &PostId) {
        self.emit(TimelineEvent::PostUpdated(id.clone()));
        for key in self.views.views_containing(id).await {
            self.emit(TimelineEvent::ViewUpdated(key));
        }
    }

    /// フィード系ビューをまとめて stale にし、無効化を通知する。
    pub async fn invalidate_feeds(&self) {
        for key in self.views.mark_stale(ViewKey::is_feed).await {
            self.emit(TimelineEvent::ViewInvalidated(key));
        }
    }
}
