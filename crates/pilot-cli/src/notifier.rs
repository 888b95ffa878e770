//! Terminal toasts

use crate::render;
use indicatif::ProgressBar;
use pilot_core::{Notice, Notifier};
use std::future::Future;
use std::sync::{Arc, Mutex};

/// Prints notices as colored lines. While a spinner is shown the line is
/// printed above it instead of through it.
#[derive(Default)]
pub struct ConsoleNotifier {
    spinner: Mutex<Option<ProgressBar>>,
}

impl ConsoleNotifier {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Run `fut` with a spinner labelled `message`
    pub async fn busy<F: Future>(&self, message: &str, fut: F) -> F::Output {
        let bar = render::spinner(message);
        self.set_spinner(Some(bar.clone()));
        let output = fut.await;
        self.set_spinner(None);
        bar.finish_and_clear();
        output
    }

    fn set_spinner(&self, bar: Option<ProgressBar>) {
        if let Ok(mut slot) = self.spinner.lock() {
            *slot = bar;
        }
    }

    fn active_spinner(&self) -> Option<ProgressBar> {
        self.spinner.lock().ok().and_then(|slot| slot.clone())
    }
}

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: Notice) {
        let line = render::notice_line(&notice);
        match self.active_spinner() {
            Some(bar) => bar.println(line),
            None => println!("{}", line),
        }
    }
}
