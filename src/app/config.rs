//! Configuration types for container assembly.

/// Configuration for building the container.
///
/// # Examples
///
/// ```
/// use weft::app::ContainerConfig;
///
/// let config = ContainerConfig::new().with_auto_proxy_filter("*Service");
/// assert_eq!(config.auto_proxy_filter.as_deref(), Some("*Service"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ContainerConfig {
    /// Auto-proxy naming convention: only target types whose name matches
    /// this glob are eligible for advising. `None` admits every type.
    /// Validated (fail-fast) when the container is built.
    pub auto_proxy_filter: Option<String>,
}

impl ContainerConfig {
    /// Configuration admitting every type.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the auto-proxy type-name filter.
    pub fn with_auto_proxy_filter(mut self, pattern: impl Into<String>) -> Self {
        self.auto_proxy_filter = Some(pattern.into());
        self
    }
}
