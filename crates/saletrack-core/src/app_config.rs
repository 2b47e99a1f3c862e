use std::path::PathBuf;

/// Process-level settings read from the environment.
///
/// Per-site parameters (URLs, retries, timeouts) live in the sites file and
/// are loaded separately through [`crate::load_sites`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub sites_path: PathBuf,
    pub log_level: String,
    pub user_agent: String,
    /// Wall-clock budget for one scan. `None` means no deadline.
    pub run_deadline_secs: Option<u64>,
    /// Follow up on products whose listing card lacks variant or compare-at data.
    pub product_lookups: bool,
    /// Keep items that have no resolvable discount (shown with 0% off).
    pub include_undiscounted: bool,
    pub history_path: Option<PathBuf>,
}
