use serde::{Serialize, Serializer};
use std::fmt;

/// 秘匿化されたトークンの置換文字列
pub const REDACTION_MASK: &str = "****";

/// ホスティングサービスへのアクセストークン
///
/// `Debug`・`Display`・`Serialize`のいずれでもトークンは出力されない。
/// プロセス出力やエラー文など、トークンを含みうる文字列は[`Credential::redact`]を通す。
#[derive(Clone, PartialEq, Eq, Default)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into().trim().to_string())
    }

    /// 生のトークン（プロセス引数の組み立て専用）
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `text`中のトークンをすべて[`REDACTION_MASK`]に置き換える
    pub fn redact(&self, text: &str) -> String {
        if self.0.is_empty() {
            return text.to_string();
        }
        text.replace(&self.0, REDACTION_MASK)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Credential").field(&REDACTION_MASK).finish()
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTION_MASK)
    }
}

impl Serialize for Credential {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(REDACTION_MASK)
    }
}

impl From<&str> for Credential {
    fn from(token: &str) -> Self {
        Self::new(token)
    }
}

impl From<String> for Credential {
    fn from(token: String) -> Self {
        Self::new(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redact_replaces_every_occurrence() {
        let credential = Credential::new("ghp_secret");
        let text = "fatal: https://ghp_secret@github.com/org/repo.git: ghp_secret rejected";
        let redacted = credential.redact(text);

        assert!(!redacted.contains("ghp_secret"));
        assert_eq!(redacted.matches(REDACTION_MASK).count(), 2);
    }

    #[test]
    fn test_redact_without_occurrence_is_identity() {
        let credential = Credential::new("ghp_secret");
        assert_eq!(credential.redact("nothing to hide"), "nothing to hide");
    }

    #[test]
    fn test_empty_credential_does_not_mangle_text() {
        let credential = Credential::new("   ");
        assert!(credential.is_empty());
        assert_eq!(credential.redact("abc"), "abc");
    }

    #[test]
    fn test_formatting_never_prints_token() {
        let credential = Credential::new("ghp_secret");
        assert_eq!(credential.to_string(), REDACTION_MASK);
        assert!(!format!("{:?}", credential).contains("ghp_secret"));
        assert_eq!(credential.expose(), "ghp_secret");
    }

    #[test]
    fn test_validation_params_hold_mask() {
        let credential = Credential::new("ghp_secret");
        let mut error = validator::ValidationError::new("required");
        error.add_param("value".into(), &credential);

        assert_eq!(error.params["value"].as_str(), Some(REDACTION_MASK));
        assert!(!format!("{:?}", error).contains("ghp_secret"));
    }
}
