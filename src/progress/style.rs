//! Progress bar styling options.
//!
//! A download has a single bar of length 100 whose position is the
//! percentage of the file already on disk.
//!
//! # Examples
//!
//! ```rust
//! use tessera::progress::ProgressBarOpts;
//!
//! let opts = ProgressBarOpts::new(
//!     Some("[{bar:40.cyan/blue}] {pos}% {msg}".to_string()),
//!     Some(ProgressBarOpts::CHARS_ROUGH.to_string()),
//!     true,
//!     false,
//! );
//! assert!(opts.is_enabled());
//! assert!(!ProgressBarOpts::hidden().is_enabled());
//! ```

use indicatif::{ProgressBar, ProgressStyle};
use tracing::warn;

/// Define the options for the progress bar.
#[derive(Debug, Clone)]
pub struct ProgressBarOpts {
    /// Progress bar template string.
    template: Option<String>,
    /// Progression characters set.
    ///
    /// There must be at least 3 characters for the following states:
    /// "filled", "current", and "to do".
    progress_chars: Option<String>,
    /// Enable or disable the progress bar.
    pub(crate) enabled: bool,
    /// Clear the progress bar once completed.
    pub(crate) clear: bool,
}

impl Default for ProgressBarOpts {
    fn default() -> Self {
        Self {
            template: Some(Self::TEMPLATE_PERCENT.into()),
            progress_chars: Some(Self::CHARS_FINE.into()),
            enabled: true,
            clear: false,
        }
    }
}

impl ProgressBarOpts {
    /// The bar, the percentage and the elapsed time.
    ///
    /// `████████████████████▌                    51% [00:00:04]`
    pub const TEMPLATE_PERCENT: &'static str = "{bar:40.blue} {pos:>3}% [{elapsed_precise}] {msg}";
    /// A thin line followed by the percentage.
    pub const TEMPLATE_LINE: &'static str = "{bar:40.green/black} {pos:>3.green}% {msg}";
    /// Use fine blocks as progress characters: `"█▉▊▋▌▍▎▏  "`.
    pub const CHARS_FINE: &'static str = "█▉▊▋▌▍▎▏  ";
    /// Use a line as progress characters: `"━╾─"`.
    pub const CHARS_LINE: &'static str = "━╾╴─";
    /// Use rough blocks as progress characters: `"█  "`.
    pub const CHARS_ROUGH: &'static str = "█  ";

    /// Create a new [`ProgressBarOpts`].
    pub fn new(
        template: Option<String>,
        progress_chars: Option<String>,
        enabled: bool,
        clear: bool,
    ) -> Self {
        Self {
            template,
            progress_chars,
            enabled,
            clear,
        }
    }

    /// A line-style bar that clears itself once done.
    pub fn with_line_style() -> Self {
        Self {
            template: Some(Self::TEMPLATE_LINE.into()),
            progress_chars: Some(Self::CHARS_LINE.into()),
            enabled: true,
            clear: true,
        }
    }

    /// Options that hide the progress bar.
    pub fn hidden() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn clears(&self) -> bool {
        self.clear
    }

    /// Set to `true` to clear the progress bar upon completion.
    pub fn set_clear(&mut self, clear: bool) {
        self.clear = clear;
    }

    /// Create a [`ProgressStyle`] based on the provided options.
    ///
    /// An invalid template falls back to the default bar.
    pub fn to_progress_style(&self) -> ProgressStyle {
        let mut style = ProgressStyle::default_bar();
        if let Some(template) = &self.template {
            match ProgressStyle::default_bar().template(template) {
                Ok(custom) => style = custom,
                Err(e) => warn!(template = %template, error = %e, "Invalid progress template"),
            }
        }
        if let Some(progress_chars) = &self.progress_chars {
            style = style.progress_chars(progress_chars);
        }
        style
    }

    /// Create the percentage [`ProgressBar`] (length 100), hidden when disabled.
    pub fn to_progress_bar(&self) -> ProgressBar {
        if !self.enabled {
            return ProgressBar::hidden();
        }
        ProgressBar::new(100).with_style(self.to_progress_style())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_visible() {
        let opts = ProgressBarOpts::default();
        assert!(opts.is_enabled());
        assert!(!opts.clears());
        assert_eq!(opts.to_progress_bar().length(), Some(100));
    }

    #[test]
    fn test_hidden_bar() {
        let bar = ProgressBarOpts::hidden().to_progress_bar();
        assert!(bar.is_hidden());
    }

    #[test]
    fn test_invalid_template_falls_back() {
        let opts = ProgressBarOpts::new(Some("{bar:40.blue".into()), None, true, true);
        // Must not panic.
        let _ = opts.to_progress_style();
    }
}
