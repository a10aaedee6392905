use std::fmt;
use thiserror::Error;

use super::credential::Credential;

/// スキームと残りの部分の区切り
pub const SCHEME_SEPARATOR: &str = "://";

/// クローンURL検証のエラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CloneLocatorError {
    #[error("expected exactly one '://' separator in '{locator}', found {found}")]
    SeparatorCount { locator: String, found: usize },

    #[error("missing scheme in '{0}'")]
    MissingScheme(String),

    #[error("missing host in '{0}'")]
    MissingHost(String),
}

/// 入力ファイルから読み込んだクローン元URL
///
/// 区切り`://`をちょうど1つ含み、その前のスキームと後ろの部分がどちらも空でないこと。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CloneLocator {
    raw: String,
    scheme_end: usize,
}

impl CloneLocator {
    pub fn parse(locator: &str) -> Result<Self, CloneLocatorError> {
        let found = locator.matches(SCHEME_SEPARATOR).count();
        if found != 1 {
            return Err(CloneLocatorError::SeparatorCount {
                locator: locator.to_string(),
                found,
            });
        }

        let (scheme, remainder) = locator
            .split_once(SCHEME_SEPARATOR)
            .ok_or_else(|| CloneLocatorError::SeparatorCount {
                locator: locator.to_string(),
                found: 0,
            })?;

        if scheme.is_empty() {
            return Err(CloneLocatorError::MissingScheme(locator.to_string()));
        }
        if remainder.is_empty() {
            return Err(CloneLocatorError::MissingHost(locator.to_string()));
        }

        Ok(Self {
            raw: locator.to_string(),
            scheme_end: scheme.len(),
        })
    }

    /// `host`上の`organization/repository`を指すhttpsのURL
    pub fn for_repository(host: &str, organization: &str, repository: &str) -> Self {
        let raw = format!("https://{}/{}/{}.git", host, organization, repository);
        Self {
            raw,
            scheme_end: "https".len(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn scheme(&self) -> &str {
        &self.raw[..self.scheme_end]
    }

    /// 区切り以降（ホストとパス）
    pub fn remainder(&self) -> &str {
        &self.raw[self.scheme_end + SCHEME_SEPARATOR.len()..]
    }

    /// スキームとホストの間に認証情報を挿入する
    pub fn authenticate(&self, credential: &Credential) -> AuthenticatedLocator {
        AuthenticatedLocator {
            url: format!(
                "{}{}{}@{}",
                self.scheme(),
                SCHEME_SEPARATOR,
                credential.expose(),
                self.remainder()
            ),
            credential: credential.clone(),
        }
    }
}

impl fmt::Display for CloneLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl TryFrom<&str> for CloneLocator {
    type Error = CloneLocatorError;

    fn try_from(locator: &str) -> Result<Self, Self::Error> {
        CloneLocator::parse(locator)
    }
}

/// 認証情報付きのURL（`scheme://credential@host/path`）
///
/// 表示は常にマスク済みの形になる。生の文字列は[`AuthenticatedLocator::expose`]でのみ取得できる。
#[derive(Clone, PartialEq, Eq)]
pub struct AuthenticatedLocator {
    url: String,
    credential: Credential,
}

impl AuthenticatedLocator {
    pub fn expose(&self) -> &str {
        &self.url
    }

    pub fn redacted(&self) -> String {
        self.credential.redact(&self.url)
    }
}

impl fmt::Display for AuthenticatedLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.redacted())
    }
}

impl fmt::Debug for AuthenticatedLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AuthenticatedLocator")
            .field(&self.redacted())
            .finish()
    }
}
