//! # Broadcaster
//!
//! 广播引擎对外入口。
//!
//! 负责：
//! - Round Controller：每轮重新解析目录 → 过滤 → 投递，轮间固定暂停
//! - Result Aggregator：把投递记录折叠为 `RoundResult` / `BroadcastSummary`
//! - 调用方 API：`list_destinations`、`plan`、`broadcast`
//!
//! ## 使用示例
//!
//! ```ignore
//! use broadcaster::{BroadcastRequest, Broadcaster};
//! use dispatcher::TokioPacer;
//! use events::EventBus;
//!
//! let bus = EventBus::disabled();
//! let mut engine = Broadcaster::new(&provider, TokioPacer, &bus);
//! let request = BroadcastRequest::new("hello", 2, Duration::from_secs(10))?;
//! let summary = engine.broadcast(&request).await?;
//! println!("{summary}");
//! ```

pub mod aggregate;
pub mod engine;
pub mod error;
pub mod request;

pub use aggregate::{fold_round, ResultAggregator};
pub use contracts::{BroadcastSummary, CatalogErrorPolicy, RoundResult};
pub use dispatcher::{ExclusionSet, Partition};
pub use engine::Broadcaster;
pub use error::BroadcastError;
pub use request::BroadcastRequest;
