use std::path::{Path, PathBuf};
use std::time::Duration;

use url::Url;
use validator::{Validate, ValidationError};

use crate::common::result::MigrateResult;
use crate::domain::value_objects::{
    clone_locator::{AuthenticatedLocator, CloneLocator},
    credential::{Credential, REDACTION_MASK},
    host_target::HostTarget,
};

/// デフォルトの入力ファイル（syncフェーズ）
pub const DEFAULT_SYNC_INPUT: &str = "lfs-repos.csv";

/// デフォルトのリトライ回数
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// デフォルトのリトライ間隔
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

fn validate_credential(credential: &Credential) -> Result<(), ValidationError> {
    if credential.is_empty() {
        let mut error = ValidationError::new("required");
        error.message = Some("access token is required".into());
        return Err(error);
    }
    Ok(())
}

fn validate_path(path: &Path) -> Result<(), ValidationError> {
    if path.as_os_str().is_empty() {
        let mut error = ValidationError::new("required");
        error.message = Some("path must not be empty".into());
        return Err(error);
    }
    Ok(())
}

fn validate_org_name(organization: &str) -> Result<(), ValidationError> {
    if organization.contains('/') || organization.chars().any(char::is_whitespace) {
        let mut error = ValidationError::new("invalid_organization");
        error.message = Some("organization name must not contain '/' or whitespace".into());
        return Err(error);
    }
    Ok(())
}

/// gitプロセスに渡すプロキシ設定
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProxySettings {
    pub http_proxy: Option<String>,
    pub https_proxy: Option<String>,
    pub no_proxy: Option<String>,
}

impl ProxySettings {
    pub fn is_configured(&self) -> bool {
        self.http_proxy.is_some() || self.https_proxy.is_some()
    }

    /// 子プロセスの環境変数（大文字・小文字の両方）
    pub fn environment(&self) -> Vec<(String, String)> {
        let mut vars = Vec::new();
        let entries = [
            ("HTTP_PROXY", &self.http_proxy),
            ("HTTPS_PROXY", &self.https_proxy),
            ("NO_PROXY", &self.no_proxy),
        ];
        for (key, value) in entries {
            if let Some(value) = value.as_ref().filter(|v| !v.is_empty()) {
                vars.push((key.to_string(), value.clone()));
                vars.push((key.to_lowercase(), value.clone()));
            }
        }
        vars
    }

    /// 表示用の設定（プロキシURLのユーザー情報を伏せ字にする）
    pub fn redacted(&self) -> Self {
        Self {
            http_proxy: self.http_proxy.as_deref().map(mask_userinfo),
            https_proxy: self.https_proxy.as_deref().map(mask_userinfo),
            no_proxy: self.no_proxy.clone(),
        }
    }
}

fn mask_userinfo(proxy: &str) -> String {
    if let Ok(mut url) = Url::parse(proxy) {
        if url.has_host() {
            if url.username().is_empty() && url.password().is_none() {
                return proxy.to_string();
            }
            if url.set_username(REDACTION_MASK).is_ok() && url.set_password(None).is_ok() {
                return url.to_string();
            }
            return REDACTION_MASK.to_string();
        }
    }

    // スキーム省略の`user:pass@host:port`形式は`@`より前を伏せる
    match proxy.rsplit_once('@') {
        Some((_, host)) => format!("{}@{}", REDACTION_MASK, host),
        None => proxy.to_string(),
    }
}

/// 外部gitコマンドの実行設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitSettings {
    /// gitの実行ファイル
    pub executable: String,

    /// 失敗したコマンドの再試行回数
    pub max_retries: u32,

    /// 再試行までの待ち時間
    pub retry_delay: Duration,

    pub proxy: ProxySettings,
}

impl Default for GitSettings {
    fn default() -> Self {
        Self {
            executable: "git".to_string(),
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay: DEFAULT_RETRY_DELAY,
            proxy: ProxySettings::default(),
        }
    }
}

impl GitSettings {
    pub fn with_executable(mut self, executable: impl Into<String>) -> Self {
        self.executable = executable.into();
        self
    }

    pub fn with_retries(mut self, max_retries: u32, retry_delay: Duration) -> Self {
        self.max_retries = max_retries;
        self.retry_delay = retry_delay;
        self
    }

    pub fn with_proxy(mut self, proxy: ProxySettings) -> Self {
        self.proxy = proxy;
        self
    }
}

/// pullフェーズの設定
#[derive(Debug, Clone, Validate)]
pub struct PullSettings {
    /// リポジトリ一覧（CSV）
    #[validate(custom(function = "validate_path"))]
    pub input_file: PathBuf,

    /// クローン先の作業ディレクトリ
    #[validate(custom(function = "validate_path"))]
    pub work_dir: PathBuf,

    #[validate(custom(function = "validate_credential"))]
    pub credential: Credential,

    /// 並列ワーカー数（1未満は1として扱う）
    pub workers: usize,

    /// 1ジョブあたりの制限時間
    pub job_timeout: Option<Duration>,

    pub host: HostTarget,
}

impl PullSettings {
    pub fn new(
        input_file: impl Into<PathBuf>,
        work_dir: impl Into<PathBuf>,
        credential: Credential,
    ) -> Self {
        Self {
            input_file: input_file.into(),
            work_dir: work_dir.into(),
            credential,
            workers: 1,
            job_timeout: None,
            host: HostTarget::default(),
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn with_job_timeout(mut self, job_timeout: Option<Duration>) -> Self {
        self.job_timeout = job_timeout;
        self
    }

    pub fn with_host(mut self, host: HostTarget) -> Self {
        self.host = host;
        self
    }

    /// 設定を検証し、問題があれば設定エラーを返す
    pub fn validated(self) -> MigrateResult<Self> {
        self.validate()?;
        Ok(self)
    }
}

/// syncフェーズの設定
#[derive(Debug, Clone, Validate)]
pub struct SyncSettings {
    #[validate(custom(function = "validate_path"))]
    pub input_file: PathBuf,

    /// pullフェーズでクローン済みのリポジトリがある作業ディレクトリ
    #[validate(custom(function = "validate_path"))]
    pub work_dir: PathBuf,

    /// 移行先の組織
    #[validate(
        length(min = 1, message = "target organization is required"),
        custom(function = "validate_org_name")
    )]
    pub target_org: String,

    #[validate(custom(function = "validate_credential"))]
    pub credential: Credential,

    pub workers: usize,

    pub job_timeout: Option<Duration>,

    /// 移行先のホスト
    pub host: HostTarget,
}

impl SyncSettings {
    pub fn new(
        input_file: impl Into<PathBuf>,
        work_dir: impl Into<PathBuf>,
        target_org: impl Into<String>,
        credential: Credential,
    ) -> Self {
        Self {
            input_file: input_file.into(),
            work_dir: work_dir.into(),
            target_org: target_org.into(),
            credential,
            workers: 1,
            job_timeout: None,
            host: HostTarget::default(),
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn with_job_timeout(mut self, job_timeout: Option<Duration>) -> Self {
        self.job_timeout = job_timeout;
        self
    }

    pub fn with_host(mut self, host: HostTarget) -> Self {
        self.host = host;
        self
    }

    pub fn validated(self) -> MigrateResult<Self> {
        self.validate()?;
        Ok(self)
    }

    /// 移行先リモートのURL（認証情報付き）
    pub fn target_remote(&self, repository: &str) -> AuthenticatedLocator {
        CloneLocator::for_repository(self.host.host(), &self.target_org, repository)
            .authenticate(&self.credential)
    }
}
