//! 配置校验模块
//!
//! 校验规则：
//! - account: api_id > 0, api_hash / phone_number 非空
//! - broadcast: rounds >= 1, message (若提供) 非空白
//! - sink 名称非空且唯一, queue_capacity > 0
//! - file sink 必须提供 params.path

use std::collections::HashSet;

use contracts::{BroadcastProfile, ContractError, SinkType};

/// 校验 BroadcastProfile 配置
///
/// 返回第一个遇到的错误，或 Ok(())。
pub fn validate(profile: &BroadcastProfile) -> Result<(), ContractError> {
    validate_account(profile)?;
    validate_broadcast(profile)?;
    validate_sinks(profile)?;
    Ok(())
}

fn validate_account(profile: &BroadcastProfile) -> Result<(), ContractError> {
    let account = &profile.account;

    if account.api_id <= 0 {
        return Err(ContractError::config_validation(
            "account.api_id",
            format!("api_id must be > 0, got {}", account.api_id),
        ));
    }
    if account.api_hash.trim().is_empty() {
        return Err(ContractError::config_validation(
            "account.api_hash",
            "api_hash cannot be empty",
        ));
    }
    if account.phone_number.trim().is_empty() {
        return Err(ContractError::config_validation(
            "account.phone_number",
            "phone_number cannot be empty",
        ));
    }
    Ok(())
}

fn validate_broadcast(profile: &BroadcastProfile) -> Result<(), ContractError> {
    let broadcast = &profile.broadcast;

    if broadcast.rounds == 0 {
        return Err(ContractError::config_validation(
            "broadcast.rounds",
            "rounds must be >= 1",
        ));
    }

    if let Some(message) = &broadcast.message {
        if message.trim().is_empty() {
            return Err(ContractError::config_validation(
                "broadcast.message",
                "message cannot be blank",
            ));
        }
    }

    Ok(())
}

/// 校验 sink 配置
fn validate_sinks(profile: &BroadcastProfile) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for (idx, sink) in profile.sinks.iter().enumerate() {
        if sink.name.is_empty() {
            return Err(ContractError::config_validation(
                format!("sinks[{}].name", idx),
                "sink name cannot be empty",
            ));
        }
        if !seen.insert(sink.name.as_str()) {
            return Err(ContractError::config_validation(
                format!("sinks[name={}]", sink.name),
                "duplicate sink name",
            ));
        }
        if sink.queue_capacity == 0 {
            return Err(ContractError::config_validation(
                format!("sinks[{}].queue_capacity", sink.name),
                "queue_capacity must be > 0",
            ));
        }
        if sink.sink_type == SinkType::File && !sink.params.contains_key("path") {
            return Err(ContractError::config_validation(
                format!("sinks[{}].params.path", sink.name),
                "file sink requires a path",
            ));
        }
    }
    Ok(())
}
