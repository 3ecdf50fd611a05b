use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use loopfetch_lib::download::{ProgressReporter, ProgressUpdate};
use std::sync::{Mutex, PoisonError};
use url::Url;

const SIZED_TEMPLATE: &str =
    "{wide_msg} [{bar:30.cyan/blue}] {percent}% of {total_bytes} ({bytes_per_sec})";
const UNSIZED_TEMPLATE: &str = "{spinner:.green} {wide_msg} {bytes} ({bytes_per_sec})";

/// Draws one progress bar per package transfer on stderr.
#[derive(Default)]
pub struct ConsoleProgress {
    current: Mutex<Option<ProgressBar>>,
}

impl ConsoleProgress {
    pub fn new() -> Self {
        Self::default()
    }

    fn style(template: &str) -> ProgressStyle {
        ProgressStyle::with_template(template)
            .map(|style| style.progress_chars("=>-"))
            .unwrap_or_else(|_| ProgressStyle::default_bar())
    }
}

impl ProgressReporter for ConsoleProgress {
    fn started(&self, url: &Url, total: Option<u64>) {
        let bar = match total {
            Some(total) => {
                ProgressBar::with_draw_target(Some(total), ProgressDrawTarget::stderr())
                    .with_style(Self::style(SIZED_TEMPLATE))
            }
            None => ProgressBar::with_draw_target(None, ProgressDrawTarget::stderr())
                .with_style(Self::style(UNSIZED_TEMPLATE)),
        };
        bar.set_message(url.to_string());

        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = current.replace(bar) {
            previous.abandon();
        }
    }

    fn advanced(&self, update: ProgressUpdate) {
        let current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(bar) = current.as_ref() {
            bar.set_position(update.bytes_so_far);
        }
    }

    fn finished(&self, _url: &Url, _bytes: u64) {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(bar) = current.take() {
            bar.finish_and_clear();
        }
    }
}
