//! Mock Chat Provider
//!
//! 用于单元测试与离线运行的 mock 实现，支持注入失败场景。
//! 配置可序列化，CLI 通过 `--fixture` 从文件加载。

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use contracts::{
    ChatProvider, Credentials, Destination, DestinationId, Dialog, ProviderError, SendError,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// 单次发送的脚本化结果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum ScriptedSend {
    #[default]
    Ok,
    RateLimited {
        wait_secs: u64,
    },
    PermissionDenied,
    AccountBanned,
    Disconnected,
    Other {
        message: String,
    },
}

impl ScriptedSend {
    fn into_result(self) -> Result<(), SendError> {
        match self {
            Self::Ok => Ok(()),
            Self::RateLimited { wait_secs } => Err(SendError::RateLimited { wait_secs }),
            Self::PermissionDenied => Err(SendError::PermissionDenied),
            Self::AccountBanned => Err(SendError::AccountBanned),
            Self::Disconnected => Err(SendError::disconnected("mock session dropped")),
            Self::Other { message } => Err(SendError::Other { message }),
        }
    }
}

/// 某个目标的发送脚本：先依次消费 `results`，之后一直返回 `then`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendScript {
    pub destination_id: DestinationId,
    #[serde(default)]
    pub results: Vec<ScriptedSend>,
    #[serde(default)]
    pub then: ScriptedSend,
}

/// 对话枚举的脚本化失败
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "error", rename_all = "snake_case")]
pub enum ScriptedListFailure {
    Transport { message: String },
    Disconnected { message: String },
}

impl From<ScriptedListFailure> for ProviderError {
    fn from(failure: ScriptedListFailure) -> Self {
        match failure {
            ScriptedListFailure::Transport { message } => ProviderError::Transport { message },
            ScriptedListFailure::Disconnected { message } => {
                ProviderError::Disconnected { message }
            }
        }
    }
}

/// Mock provider 配置
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct MockConfig {
    /// 默认对话列表
    #[serde(default)]
    pub dialogs: Vec<Dialog>,

    /// 按调用次序返回的对话快照，耗尽后回落到 `dialogs`
    #[serde(default)]
    pub dialog_sequence: Vec<Vec<Dialog>>,

    /// 每个目标的发送脚本；未列出的目标总是成功
    #[serde(default)]
    pub scripts: Vec<SendScript>,

    /// 前 N 次枚举依次返回的失败
    #[serde(default)]
    pub list_failures: Vec<ScriptedListFailure>,

    /// 拒绝连接
    #[serde(default)]
    pub reject_auth: bool,
}

impl MockConfig {
    pub fn with_dialogs(mut self, dialogs: Vec<Dialog>) -> Self {
        self.dialogs = dialogs;
        self
    }

    /// 追加一个按调用次序返回的对话快照
    pub fn then_dialogs(mut self, dialogs: Vec<Dialog>) -> Self {
        self.dialog_sequence.push(dialogs);
        self
    }

    pub fn script(
        mut self,
        destination_id: i64,
        results: Vec<ScriptedSend>,
        then: ScriptedSend,
    ) -> Self {
        self.scripts.push(SendScript {
            destination_id: DestinationId::new(destination_id),
            results,
            then,
        });
        self
    }

    pub fn fail_listing(mut self, failure: ScriptedListFailure) -> Self {
        self.list_failures.push(failure);
        self
    }
}

/// 一次发送尝试的记录
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendAttempt {
    pub destination_id: DestinationId,
    pub text: String,
}

struct Script {
    pending: VecDeque<ScriptedSend>,
    then: ScriptedSend,
}

/// Mock Chat Provider
pub struct MockChatProvider {
    dialogs: Vec<Dialog>,
    reject_auth: bool,
    dialog_sequence: Mutex<VecDeque<Vec<Dialog>>>,
    scripts: Mutex<HashMap<DestinationId, Script>>,
    list_failures: Mutex<VecDeque<ScriptedListFailure>>,
    attempts: Mutex<Vec<SendAttempt>>,
    list_calls: AtomicUsize,
    connected: AtomicBool,
}

impl MockChatProvider {
    /// 使用配置创建 mock provider（未连接）
    pub fn new(config: MockConfig) -> Self {
        let scripts = config
            .scripts
            .into_iter()
            .map(|s| {
                (
                    s.destination_id,
                    Script {
                        pending: s.results.into(),
                        then: s.then,
                    },
                )
            })
            .collect();

        Self {
            dialogs: config.dialogs,
            reject_auth: config.reject_auth,
            dialog_sequence: Mutex::new(config.dialog_sequence.into()),
            scripts: Mutex::new(scripts),
            list_failures: Mutex::new(config.list_failures.into()),
            attempts: Mutex::new(Vec::new()),
            list_calls: AtomicUsize::new(0),
            connected: AtomicBool::new(false),
        }
    }

    /// 创建已连接的 mock provider
    pub fn connected(config: MockConfig) -> Self {
        let provider = Self::new(config);
        provider.connected.store(true, Ordering::SeqCst);
        provider
    }

    /// 所有发送尝试，按发生顺序
    pub fn attempts(&self) -> Vec<SendAttempt> {
        lock(&self.attempts).clone()
    }

    /// 发送尝试的目标 id 序列
    pub fn attempted_ids(&self) -> Vec<DestinationId> {
        lock(&self.attempts)
            .iter()
            .map(|a| a.destination_id)
            .collect()
    }

    /// `list_dialogs` 被调用的次数
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn ensure_connected(&self) -> Result<(), ProviderError> {
        if self.is_connected() {
            Ok(())
        } else {
            Err(ProviderError::disconnected("not connected"))
        }
    }

    fn next_send_result(&self, destination_id: DestinationId) -> ScriptedSend {
        let mut scripts = lock(&self.scripts);
        match scripts.get_mut(&destination_id) {
            Some(script) => script
                .pending
                .pop_front()
                .unwrap_or_else(|| script.then.clone()),
            None => ScriptedSend::Ok,
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl ChatProvider for MockChatProvider {
    #[instrument(name = "mock_provider_connect", skip_all, fields(session = %credentials.session_name))]
    async fn connect(&mut self, credentials: &Credentials) -> Result<(), ProviderError> {
        if self.reject_auth {
            return Err(ProviderError::Auth {
                message: format!("mock rejected api_id {}", credentials.api_id),
            });
        }
        self.connected.store(true, Ordering::SeqCst);
        Ok(())
    }

    #[instrument(name = "mock_provider_list_dialogs", skip(self))]
    async fn list_dialogs(&self) -> Result<Vec<Dialog>, ProviderError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.ensure_connected()?;

        if let Some(failure) = lock(&self.list_failures).pop_front() {
            return Err(failure.into());
        }

        let snapshot = lock(&self.dialog_sequence).pop_front();
        Ok(snapshot.unwrap_or_else(|| self.dialogs.clone()))
    }

    #[instrument(
        name = "mock_provider_send_message",
        skip(self, destination, text),
        fields(destination_id = %destination.id)
    )]
    async fn send_message(&self, destination: &Destination, text: &str) -> Result<(), SendError> {
        if !self.is_connected() {
            return Err(SendError::disconnected("not connected"));
        }

        lock(&self.attempts).push(SendAttempt {
            destination_id: destination.id,
            text: text.to_string(),
        });

        let result = self.next_send_result(destination.id);
        if result == ScriptedSend::Disconnected {
            self.connected.store(false, Ordering::SeqCst);
        }
        result.into_result()
    }

    #[instrument(name = "mock_provider_disconnect", skip(self))]
    async fn disconnect(&mut self) -> Result<(), ProviderError> {
        // 幂等
        self.connected.store(false, Ordering::SeqCst);
        Ok(())
    }
}
