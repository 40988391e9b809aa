//! # Events
//!
//! 结构化事件流模块。
//!
//! 负责：
//! - 为每次 publish 编号并打时间戳
//! - Fan-out 到多个 sinks
//! - 隔离慢 sink，不阻塞发送主链路

pub mod bus;
pub mod error;
pub mod handle;
pub mod metrics;
pub mod sinks;

pub use bus::{create_event_bus, EventBus};
pub use contracts::{BroadcastEvent, EventEnvelope, EventSink};
pub use error::EventError;
pub use handle::SinkHandle;
pub use metrics::{MetricsSnapshot, SinkMetrics};
pub use sinks::{FileSink, LogSink, MemorySink};
