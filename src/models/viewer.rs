use crate::services::EmbedTarget;

/// What the viewer pane is currently showing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewerState {
    pub title: String,
    pub target: EmbedTarget,
}

impl ViewerState {
    pub fn status_label(&self) -> &'static str {
        "LIVE STREAMING"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NoticeLevel {
    #[default]
    Info,
    Warning,
    Error,
}

/// One-line message surfaced to the user in the status bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            text: text.into(),
        }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            text: text.into(),
        }
    }
}
