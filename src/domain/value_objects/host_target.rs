use std::fmt;
use url::Url;

use crate::common::error::MigrateError;
use crate::common::result::{MigrateResult, OptionExt};

/// ホスト名未指定時のホスト
pub const DEFAULT_HOST: &str = "github.com";

const API_SUFFIX: &str = "/api/v3";

/// 正規化済みのホスティング先
///
/// `github.example.com`、`https://github.example.com/`、`https://github.example.com/api/v3`
/// のいずれも受け付け、ホスト名（とポート）だけを保持する。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostTarget {
    host: String,
}

impl HostTarget {
    pub fn parse(input: &str) -> MigrateResult<Self> {
        let trimmed = input.trim();
        let without_scheme = trimmed
            .strip_prefix("https://")
            .or_else(|| trimmed.strip_prefix("http://"))
            .unwrap_or(trimmed);
        let without_api = without_scheme.trim_end_matches('/');
        let bare = without_api
            .strip_suffix(API_SUFFIX)
            .unwrap_or(without_api)
            .trim_end_matches('/');

        if bare.is_empty() {
            return Err(MigrateError::config_error(format!(
                "hostname '{}' is empty after normalization",
                input
            )));
        }

        let url = Url::parse(&format!("https://{}", bare)).map_err(|e| {
            MigrateError::config_error_with_source(format!("invalid hostname '{}'", input), e)
        })?;
        if url.path() != "/" || url.query().is_some() || !url.username().is_empty() {
            return Err(MigrateError::config_error(format!(
                "hostname '{}' must not contain a path or credentials",
                input
            )));
        }

        let host = url
            .host_str()
            .ok_or_config_error(format!("hostname '{}' has no host part", input))?;
        let host = match url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };

        Ok(Self { host })
    }

    /// 省略可能なホスト名を正規化する（未指定なら[`DEFAULT_HOST`]）
    pub fn from_option(input: Option<&str>) -> MigrateResult<Self> {
        match input.map(str::trim).filter(|s| !s.is_empty()) {
            Some(value) => Self::parse(value),
            None => Ok(Self::default()),
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn is_enterprise(&self) -> bool {
        self.host != DEFAULT_HOST
    }

    /// REST APIのURL（Enterprise Serverでは`https://<host>/api/v3`）
    pub fn api_url(&self) -> String {
        if self.is_enterprise() {
            format!("https://{}{}", self.host, API_SUFFIX)
        } else {
            format!("https://api.{}", DEFAULT_HOST)
        }
    }
}

impl Default for HostTarget {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
        }
    }
}

impl fmt::Display for HostTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.host)
    }
}
