//! DestinationCatalog 核心实现
//!
//! 从 ChatProvider 枚举对话，筛选并分类可发送的目标。

use contracts::{ChatProvider, Destination, DestinationKind, Dialog, DialogEntity};
use tracing::{debug, info, instrument, warn};

use crate::error::Result;

/// Destination Catalog
///
/// 每次调用 `resolve` 都会重新查询 provider，不做缓存：
/// 成员关系与权限可能在轮次之间变化。
pub struct DestinationCatalog<'a, P: ChatProvider> {
    provider: &'a P,
}

impl<'a, P: ChatProvider> DestinationCatalog<'a, P> {
    /// 创建新的 DestinationCatalog
    pub fn new(provider: &'a P) -> Self {
        Self { provider }
    }

    /// 解析当前可广播的目标列表
    ///
    /// 保持 provider 返回的顺序。枚举失败时返回错误，
    /// 不会将失败与“没有目标”混为一谈，由调用方决定如何处理。
    #[instrument(name = "catalog_resolve", skip(self))]
    pub async fn resolve(&self) -> Result<Vec<Destination>> {
        let dialogs = self.provider.list_dialogs().await.map_err(|e| {
            warn!(error = %e, fatal = e.is_fatal(), "dialog enumeration failed");
            e
        })?;

        let total = dialogs.len();
        let destinations: Vec<Destination> = dialogs
            .into_iter()
            .filter_map(|dialog| {
                let kind = classify(&dialog);
                if kind.is_none() {
                    debug!(dialog_id = %dialog.id, title = %dialog.title, "dialog is not a broadcast target");
                }
                kind.map(|kind| Destination::new(dialog.id, dialog.title, kind))
            })
            .collect();

        if destinations.is_empty() {
            warn!(dialogs = total, "no broadcastable destinations found");
        } else {
            info!(
                dialogs = total,
                destinations = destinations.len(),
                "catalog resolved"
            );
        }

        Ok(destinations)
    }
}

/// 对话分类
///
/// - megagroup 一律为 `Supergroup`，与 broadcast 标志无关
/// - 非 megagroup 的广播频道不接受成员发帖，排除
/// - 其他频道为 `Channel`，普通群为 `Group`
/// - 私聊排除
pub fn classify(dialog: &Dialog) -> Option<DestinationKind> {
    match dialog.entity {
        DialogEntity::User => None,
        DialogEntity::Chat => Some(DestinationKind::Group),
        DialogEntity::Channel { megagroup: true, .. } => Some(DestinationKind::Supergroup),
        DialogEntity::Channel {
            broadcast: true, ..
        } => None,
        DialogEntity::Channel { .. } => Some(DestinationKind::Channel),
    }
}
