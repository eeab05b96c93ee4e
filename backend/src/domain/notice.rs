//! One-shot notices reported to the acting administrator.
//!
//! Services describe the result of a mutation as a [`Notice`]; the HTTP
//! adapter carries it across the following redirect and shows it once.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Severity of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    /// The operation completed.
    Success,
    /// Additional steps are required before the operation can complete.
    Info,
    /// The operation was refused or failed.
    Danger,
}

/// Message plus severity.
///
/// # Examples
/// ```
/// use farm_backend::domain::{Notice, NoticeKind};
///
/// let notice = Notice::success("Farm created successfully");
/// assert_eq!(notice.kind(), NoticeKind::Success);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Notice {
    message: String,
    kind: NoticeKind,
}

impl Notice {
    /// Build a notice of the given kind.
    pub fn new(kind: NoticeKind, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind,
        }
    }

    /// Successful completion.
    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NoticeKind::Success, message)
    }

    /// Informational follow-up.
    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NoticeKind::Info, message)
    }

    /// Refusal or failure.
    pub fn danger(message: impl Into<String>) -> Self {
        Self::new(NoticeKind::Danger, message)
    }

    /// Notice text.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Notice severity.
    pub fn kind(&self) -> NoticeKind {
        self.kind
    }

    /// Whether the notice reports a completed operation.
    pub fn is_success(&self) -> bool {
        self.kind == NoticeKind::Success
    }
}
