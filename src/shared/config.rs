use crate::domain::value_objects::UserId;
use serde::{Deserialize, Serialize};

/// タイムラインコアの設定。アプリ起動時に構築し、`TimelineService` に注入する。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineConfig {
    /// ログイン中ユーザー。リポスト行の挿入先フィードの特定に使う。
    pub current_user: UserId,
    /// 変更通知チャンネルのバッファサイズ。
    pub event_channel_capacity: usize,
    /// フィード1ページあたりの件数（フェッチ側コラボレータへのヒント）。
    pub feed_page_size: u32,
}

impl TimelineConfig {
    pub fn new(current_user: UserId) -> Self {
        Self {
            current_user,
            event_channel_capacity: 256,
            feed_page_size: 20,
        }
    }
}
