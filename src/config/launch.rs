//! 启动参数解析
//!
//! 启动参数是逗号分隔的 token 列表。目前只识别 `remoteDebugging`，其后必须紧跟一个布尔字面量。

use super::{ConfigError, ConfigResult};

const REMOTE_DEBUGGING: &str = "remoteDebugging";

/// 解析后的启动参数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LaunchArguments {
    /// `None` 表示未指定或取值无法解析为布尔值
    pub remote_debugging: Option<bool>,
}

impl LaunchArguments {
    /// 解析启动参数
    ///
    /// - 空或缺省参数：不做任何事
    /// - 不含 `remoteDebugging`：不做任何事
    /// - `remoteDebugging` 是最后一个 token：返回 [`ConfigError::MissingArgumentValue`]
    /// - 取值不是布尔字面量：忽略
    pub fn parse(arguments: Option<&str>) -> ConfigResult<Self> {
        let arguments = match arguments {
            Some(arguments) if !arguments.is_empty() => arguments,
            _ => return Ok(Self::default()),
        };

        let tokens: Vec<&str> = arguments.split(',').collect();
        let index = match tokens.iter().position(|token| *token == REMOTE_DEBUGGING) {
            Some(index) => index,
            None => return Ok(Self::default()),
        };

        let value = tokens
            .get(index + 1)
            .ok_or(ConfigError::MissingArgumentValue {
                argument: REMOTE_DEBUGGING,
            })?;

        Ok(Self {
            remote_debugging: parse_bool(value),
        })
    }
}

fn parse_bool(token: &str) -> Option<bool> {
    let token = token.trim();
    if token.eq_ignore_ascii_case("true") {
        Some(true)
    } else if token.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}
