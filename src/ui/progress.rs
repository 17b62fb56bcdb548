use std::borrow::Cow;
use std::future::Future;
use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::ui::icons::{CHECK, CROSS};

/// Spinner on stderr for a single network call. Hidden when stderr is not a
/// terminal, so piped output stays clean.
pub struct Spinner {
    bar: ProgressBar,
}

impl Spinner {
    pub fn start(message: impl Into<Cow<'static, str>>) -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .expect("progress bar template is a valid static string"),
        );
        bar.set_message(message);
        bar.enable_steady_tick(Duration::from_millis(100));
        Self { bar }
    }

    pub fn success(self, message: impl std::fmt::Display) {
        self.bar
            .finish_with_message(format!("{}{}", CHECK, style(message).green()));
    }

    pub fn fail(self, message: impl std::fmt::Display) {
        self.bar
            .finish_with_message(format!("{}{}", CROSS, style(message).red()));
    }

    pub fn clear(self) {
        self.bar.finish_and_clear();
    }
}

/// Run `work` behind a spinner that disappears when it resolves.
pub async fn with_spinner<F, T>(message: impl Into<Cow<'static, str>>, work: F) -> T
where
    F: Future<Output = T>,
{
    let spinner = Spinner::start(message);
    let out = work.await;
    spinner.clear();
    out
}
