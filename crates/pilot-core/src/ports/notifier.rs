//! User-facing notifications (toasts)

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

/// Sink for the terminal notification each operation ends with
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);

    fn success(&self, text: &str) {
        self.notify(Notice {
            level: NoticeLevel::Success,
            text: text.to_string(),
        });
    }

    fn info(&self, text: &str) {
        self.notify(Notice {
            level: NoticeLevel::Info,
            text: text.to_string(),
        });
    }

    fn error(&self, text: &str) {
        self.notify(Notice {
            level: NoticeLevel::Error,
            text: text.to_string(),
        });
    }
}
