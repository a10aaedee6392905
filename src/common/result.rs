use crate::common::error::MigrateError;

/// Result alias used across the crate.
///
/// # Examples
///
/// ```
/// use migrate_lfs::common::result::MigrateResult;
/// use migrate_lfs::common::error::MigrateError;
///
/// fn example_function() -> MigrateResult<String> {
///     Ok("success".to_string())
/// }
///
/// fn example_with_error() -> MigrateResult<()> {
///     Err(MigrateError::config_error("Something went wrong"))
/// }
/// ```
pub type MigrateResult<T> = Result<T, MigrateError>;

/// Conversions from `Option` into [`MigrateResult`].
pub trait OptionExt<T> {
    /// Turn `None` into a configuration error.
    ///
    /// # Examples
    ///
    /// ```
    /// use migrate_lfs::common::result::{MigrateResult, OptionExt};
    ///
    /// let none_value: Option<String> = None;
    /// let result: MigrateResult<String> = none_value.ok_or_config_error("hostname has no host part");
    /// assert!(result.is_err());
    /// ```
    fn ok_or_config_error(self, message: impl Into<String>) -> MigrateResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_config_error(self, message: impl Into<String>) -> MigrateResult<T> {
        self.ok_or_else(|| MigrateError::config_error(message))
    }
}

/// Conversions from foreign `Result`s into [`MigrateResult`].
pub trait ResultExt<T, E> {
    /// Wrap an I/O failure as a file system error carrying `path`.
    ///
    /// # Examples
    ///
    /// ```
    /// use migrate_lfs::common::result::{MigrateResult, ResultExt};
    ///
    /// let result: Result<(), std::io::Error> = Err(std::io::Error::new(
    ///     std::io::ErrorKind::PermissionDenied, "denied"
    /// ));
    /// let mapped: MigrateResult<()> = result.with_filesystem_error("Failed to create directory", None);
    /// assert!(mapped.is_err());
    /// ```
    fn with_filesystem_error(
        self,
        message: impl Into<String>,
        path: Option<std::path::PathBuf>,
    ) -> MigrateResult<T>
    where
        E: Into<std::io::Error>;
}

impl<T, E> ResultExt<T, E> for Result<T, E> {
    fn with_filesystem_error(
        self,
        message: impl Into<String>,
        path: Option<std::path::PathBuf>,
    ) -> MigrateResult<T>
    where
        E: Into<std::io::Error>,
    {
        self.map_err(|e| MigrateError::filesystem_error_with_source(message, path, e.into()))
    }
}
