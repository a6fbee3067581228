use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::models::AnalysisResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Normal,
    Destructive,
}

/// A toast-style message for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub severity: Severity,
    pub title: String,
    pub description: String,
}

/// Where rejection and rate-limit messages go.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Where a completed analysis is shown.
pub trait ResultDisplay: Send + Sync {
    fn open(&self, result: AnalysisResult, file_name: &str);
    fn dismiss(&self);
}

/// Snapshot of the result modal's visibility.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ModalVisibility {
    pub visible: bool,
    pub file_name: String,
}

#[derive(Default)]
struct ModalInner {
    visibility: ModalVisibility,
    result: Option<AnalysisResult>,
}

/// In-memory result modal. Holds the result only while visible.
#[derive(Default)]
pub struct ModalState {
    inner: Mutex<ModalInner>,
}

impl ModalState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visibility(&self) -> ModalVisibility {
        self.lock().visibility.clone()
    }

    pub fn is_visible(&self) -> bool {
        self.lock().visibility.visible
    }

    pub fn file_name(&self) -> String {
        self.lock().visibility.file_name.clone()
    }

    pub fn result(&self) -> Option<AnalysisResult> {
        self.lock().result.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ModalInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl ResultDisplay for ModalState {
    fn open(&self, result: AnalysisResult, file_name: &str) {
        let mut inner = self.lock();
        inner.visibility = ModalVisibility {
            visible: true,
            file_name: file_name.to_string(),
        };
        inner.result = Some(result);
    }

    fn dismiss(&self) {
        let mut inner = self.lock();
        inner.visibility.visible = false;
        inner.result = None;
    }
}

/// Collects notices in arrival order. Used by headless hosts and tests.
#[derive(Default)]
pub struct NoticeLog {
    notices: Mutex<Vec<Notice>>,
}

impl NoticeLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn last(&self) -> Option<Notice> {
        self.notices
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .last()
            .cloned()
    }
}

impl Notifier for NoticeLog {
    fn notify(&self, notice: Notice) {
        tracing::debug!(title = %notice.title, "notice");
        self.notices
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(notice);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intake::analyzer::static_result;

    #[test]
    fn test_modal_open_and_dismiss() {
        let modal = ModalState::new();
        assert!(!modal.is_visible());

        modal.open(static_result(), "resume.pdf");
        assert!(modal.is_visible());
        assert_eq!(modal.file_name(), "resume.pdf");
        assert_eq!(modal.result().map(|r| r.score), Some(78));

        modal.dismiss();
        assert!(!modal.is_visible());
        assert!(modal.result().is_none());
    }

    #[test]
    fn test_modal_reopen_replaces_result() {
        let modal = ModalState::new();
        modal.open(static_result(), "a.pdf");
        let mut other = static_result();
        other.score = 40;
        modal.open(other, "b.pdf");
        assert_eq!(
            modal.visibility(),
            ModalVisibility {
                visible: true,
                file_name: "b.pdf".to_string()
            }
        );
        assert_eq!(modal.result().map(|r| r.score), Some(40));
    }

    #[test]
    fn test_notice_log_keeps_order() {
        let log = NoticeLog::new();
        for title in ["first", "second"] {
            log.notify(Notice {
                severity: Severity::Normal,
                title: title.to_string(),
                description: String::new(),
            });
        }
        let titles: Vec<_> = log.notices().into_iter().map(|n| n.title).collect();
        assert_eq!(titles, vec!["first", "second"]);
        assert_eq!(log.last().map(|n| n.title), Some("second".to_string()));
    }
}
