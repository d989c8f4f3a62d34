//! Tests for progress styling and percentage reporting.

use tessera::metadata::percentage;
use tessera::progress::ProgressBarOpts;
use tessera::DownloaderBuilder;

#[test]
fn test_progress_bar_opts() {
    let opts = ProgressBarOpts::new(
        Some(ProgressBarOpts::TEMPLATE_PERCENT.into()),
        Some(ProgressBarOpts::CHARS_ROUGH.into()),
        true,
        true,
    );
    assert!(opts.is_enabled());
    assert!(opts.clears());

    let bar = opts.to_progress_bar();
    assert_eq!(bar.length(), Some(100));
}

#[test]
fn test_line_style_clears() {
    let mut opts = ProgressBarOpts::with_line_style();
    assert!(opts.clears());
    opts.set_clear(false);
    assert!(!opts.clears());
}

#[test]
fn test_hidden_downloader_has_hidden_bar() {
    let downloader = DownloaderBuilder::hidden().build();
    assert!(downloader.progress().to_progress_bar().is_hidden());

    let downloader = DownloaderBuilder::new()
        .progress(ProgressBarOpts::hidden())
        .build();
    assert!(!downloader.progress().is_enabled());
}

#[test]
fn test_percentage_rounding() {
    assert_eq!(percentage(0, 3), 0);
    assert_eq!(percentage(1, 3), 33);
    assert_eq!(percentage(2, 3), 67);
    assert_eq!(percentage(3, 3), 100);
    assert_eq!(percentage(1 << 20, 2 << 20), 50);
    assert_eq!(percentage(0, 0), 100);
}
