//! # Dispatcher
//!
//! 消息投递模块。
//!
//! 负责：
//! - 按排除集合划分目标 (ExclusionSet)
//! - 按目录顺序逐个发送，绝不并发
//! - 分类 provider 错误；限流时全局暂停 `w + 1` 秒并仅重试一次
//! - 产出每个目标的 `DeliveryRecord`

pub mod dispatch;
pub mod error;
pub mod filter;
pub mod pacer;

pub use contracts::{DeliveryRecord, Destination, SendOutcome};
pub use dispatch::{cooldown_for, DispatchLoop, DispatchReport, COOLDOWN_MARGIN_SECS};
pub use error::DispatchError;
pub use filter::{filter, ExclusionSet, Partition};
pub use pacer::{LocalPacer, Pacer, PauseReason, RecordingPacer, TokioPacer};
