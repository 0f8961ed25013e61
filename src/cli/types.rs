//! Argument types that need their own parsing.

use std::fmt;
use std::str::FromStr;

use crate::{error::ReportError, export::ExpirationPolicy, Result};

/// Default share link lifetime in days.
pub const DEFAULT_SHARE_DAYS: u32 = 30;

/// Lifetime of a share link: `never`, `30` or `30d`.
///
/// # Examples
///
/// ```rust
/// use playbook_export::cli::types::ShareExpiry;
///
/// let expiry: ShareExpiry = "14d".parse().unwrap();
/// assert_eq!(expiry, ShareExpiry::Days(14));
/// assert_eq!(expiry.to_string(), "14");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareExpiry {
    Never,
    Days(u32),
}

impl Default for ShareExpiry {
    fn default() -> Self {
        ShareExpiry::Days(DEFAULT_SHARE_DAYS)
    }
}

impl From<ShareExpiry> for ExpirationPolicy {
    fn from(value: ShareExpiry) -> Self {
        match value {
            ShareExpiry::Never => ExpirationPolicy::Never,
            ShareExpiry::Days(days) => ExpirationPolicy::AfterDays { days },
        }
    }
}

impl fmt::Display for ShareExpiry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShareExpiry::Never => write!(f, "never"),
            ShareExpiry::Days(days) => write!(f, "{}", days),
        }
    }
}

impl FromStr for ShareExpiry {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self> {
        let value = s.trim().to_lowercase();
        if value == "never" {
            return Ok(ShareExpiry::Never);
        }
        let digits = value.strip_suffix('d').unwrap_or(&value);
        match digits.parse::<u32>() {
            Ok(days) if days > 0 => Ok(ShareExpiry::Days(days)),
            _ => Err(ReportError::InvalidConfig {
                message: format!(
                    "share expiry '{}' must be a positive number of days or 'never'",
                    s
                ),
            }),
        }
    }
}
