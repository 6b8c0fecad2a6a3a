use crate::domain::value_objects::{PostId, ViewKey};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// 1 ビュー分のプロジェクション。
///
/// エンティティ本体は持たず、キャッシュへの ID 参照の順序付きリストと
/// ページネーションのメタデータだけを保持する。
#[derive(Debug, Clone, PartialEq)]
pub struct ViewProjection {
    pub post_ids: Vec<PostId>,
    pub is_last_page: bool,
    /// 再フェッチが必要な状態。ロールバック後の広域無効化で立てる。
    pub is_stale: bool,
}

impl ViewProjection {
    pub fn new(post_ids: Vec<PostId>, is_last_page: bool) -> Self {
        Self {
            post_ids,
            is_last_page,
            is_stale: false,
        }
    }

    pub fn contains(&self, id: &PostId) -> bool {
        self.post_ids.iter().any(|held| held == id)
    }
}

/// ビュープロジェクションのストア。
///
/// キーは不透明に扱い、コーディネータから渡される述語でのみマッチングする。
#[derive(Clone)]
pub struct ViewStoreService {
    views: Arc<RwLock<HashMap<ViewKey, ViewProjection>>>,
}

impl ViewStoreService {
    pub fn new() -> Self {
        Self {
            views: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// フェッチ済みページを登録（全置換）。stale フラグは下りる。
    pub async fn apply_page(&self, key: ViewKey, post_ids: Vec<PostId>, is_last_page: bool) {
        let mut views = self.views.write().await;
        views.insert(key, ViewProjection::new(post_ids, is_last_page));
    }

    pub async fn get(&self, key: &ViewKey) -> Option<ViewProjection> {
        let views = self.views.read().await;
        views.get(key).cloned()
    }

    pub async fn contains(&self, key: &ViewKey, id: &PostId) -> bool {
        let views = self.views.read().await;
        views.get(key).is_some_and(|view| view.contains(id))
    }

    /// 指定エンティティを参照しているビューのキーを列挙する。
    pub async fn views_containing(&self, id: &PostId) -> Vec<ViewKey> {
        let views = self.views.read().await;
        views
            .iter()
            .filter(|(_, view)| view.contains(id))
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// 述語にマッチする全ビューへ変換を適用し、触れたキーを返す。
    pub async fn for_each_matching(
        &self,
        predicate: impl Fn(&ViewKey) -> bool,
        mut apply: impl FnMut(&ViewKey, &mut ViewProjection),
    ) -> Vec<ViewKey> {
        let mut views = self.views.write().await;
        let mut touched = Vec::new();
        for (key, view) in views.iter_mut() {
            if predicate(key) {
                apply(key, view);
                touched.push(key.clone());
            }
        }
        touched
    }

    /// ロード済みのビューへエンティティ ID を挿入する。
    ///
    /// ビューが未ロードなら何もしない。既に含まれている場合も何もしない
    /// （リポスト再挿入時の重複行を防ぐ）。挿入したかどうかを返す。
    pub async fn insert_into(&self, key: &ViewKey, id: PostId, position: usize) -> bool {
        let mut views = self.views.write().await;
        let Some(view) = views.get_mut(key) else {
            return false;
        };
        if view.contains(&id) {
            return false;
        }
        let position = position.min(view.post_ids.len());
        view.post_ids.insert(position, id);
        true
    }

    /// 単一ビューからエンティティ ID を取り除き、取り除いた位置を返す。
    pub async fn remove_from(&self, key: &ViewKey, id: &PostId) -> Option<usize> {
        let mut views = self.views.write().await;
        let view = views.get_mut(key)?;
        let position = view.post_ids.iter().position(|held| held == id)?;
        view.post_ids.remove(position);
        Some(position)
    }

    /// 全ビューからエンティティ ID を取り除き、元の位置を返す（ロールバック用）。
    pub async fn remove_everywhere(&self, id: &PostId) -> Vec<(ViewKey, usize)> {
        let mut views = self.views.write().await;
        let mut removed = Vec::new();
        for (key, view) in views.iter_mut() {
            if let Some(position) = view.post_ids.iter().position(|held| held == id) {
                view.post_ids.remove(position);
                removed.push((key.clone(), position));
            }
        }
        removed
    }

    /// `remove_everywhere` の逆操作。記録された位置へ ID を戻す。
    pub async fn restore_removed(&self, id: &PostId, positions: &[(ViewKey, usize)]) {
        let mut views = self.views.write().await;
        for (key, position) in positions {
            let Some(view) = views.get_mut(key) else {
                continue;
            };
            if view.contains(id) {
                continue;
            }
            let position = (*position).min(view.post_ids.len());
            view.post_ids.insert(position, id.clone());
        }
    }

    /// 述語にマッチするビューを再フェッチ対象として印付けする。
    pub async fn mark_stale(&self, predicate: impl Fn(&ViewKey) -> bool) -> Vec<ViewKey> {
        self.for_each_matching(predicate, |_, view| view.is_stale = true)
            .await
    }

    pub async fn remove_view(&self, key: &ViewKey) -> Option<ViewProjection> {
        let mut views = self.views.write().await;
        views.remove(key)
    }

    pub async fn clear(&self) {
        self.views.write().await.clear();
    }

    pub async fn len(&self) -> usize {
        self.views.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for ViewStoreService {
    fn default() -> Self {
        Self::new()
    }
}
