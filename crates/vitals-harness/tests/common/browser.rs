//! Browser automation helpers

use anyhow::Result;
use chromiumoxide::browser::{Browser, BrowserConfig};
use futures::StreamExt;
use std::time::Duration;

/// Check if browser tests should be skipped (when Chrome isn't available)
pub fn should_skip() -> bool {
    std::env::var("SKIP_BROWSER_TESTS").is_ok()
}

/// Macro to skip test if Chrome isn't available
#[macro_export]
macro_rules! skip_if_no_chrome {
    () => {
        if browser::should_skip() {
            eprintln!("Skipping test: SKIP_BROWSER_TESTS is set");
            return;
        }
    };
}

/// Find Chrome for Testing installed by Puppeteer
pub fn find_chrome_for_testing() -> Option<std::path::PathBuf> {
    let home = std::env::var("HOME").ok()?;
    let puppeteer_cache = std::path::Path::new(&home).join(".cache/puppeteer/chrome");

    if puppeteer_cache.exists() {
        if let Ok(entries) = std::fs::read_dir(&puppeteer_cache) {
            let mut versions: Vec<_> = entries
                .filter_map(|e| e.ok())
                .filter(|e| e.path().is_dir())
                .collect();
            versions.sort_by_key(|v| std::cmp::Reverse(v.path()));

            for version_dir in versions {
                let candidates = [
                    "chrome-mac-arm64/Google Chrome for Testing.app/Contents/MacOS/Google Chrome for Testing",
                    "chrome-mac-x64/Google Chrome for Testing.app/Contents/MacOS/Google Chrome for Testing",
                    "chrome-linux64/chrome",
                ];
                for candidate in candidates {
                    let chrome = version_dir.path().join(candidate);
                    if chrome.exists() {
                        return Some(chrome);
                    }
                }
            }
        }
    }
    None
}

/// Helper to create a headless browser for testing
pub async fn create_test_browser() -> Result<(Browser, tokio::task::JoinHandle<()>)> {
    use std::sync::atomic::{AtomicU64, Ordering};
    static BROWSER_ID: AtomicU64 = AtomicU64::new(0);

    let mut builder = BrowserConfig::builder();

    if let Some(chrome_path) = find_chrome_for_testing() {
        eprintln!("Using Chrome for Testing: {}", chrome_path.display());
        builder = builder.chrome_executable(chrome_path);
    }

    // Unique user data directory so parallel test binaries don't collide
    let browser_id = BROWSER_ID.fetch_add(1, Ordering::SeqCst);
    let pid = std::process::id();
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let user_data_dir = std::env::temp_dir().join(format!(
        "vitals-harness-{}-{}-{}",
        pid, browser_id, timestamp
    ));
    builder = builder.user_data_dir(user_data_dir);

    let config = builder
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build browser config: {}", e))?;

    let (browser, mut handler) = Browser::launch(config).await?;

    let handle = tokio::spawn(async move {
        while let Some(event) = handler.next().await {
            if let Err(e) = event {
                eprintln!("Browser handler error: {:?}", e);
                break;
            }
        }
    });

    // Give browser a moment to fully initialize
    tokio::time::sleep(Duration::from_millis(500)).await;

    Ok((browser, handle))
}

/// Try to create browser, skip test if Chrome not found
pub async fn require_browser() -> Option<(Browser, tokio::task::JoinHandle<()>)> {
    match create_test_browser().await {
        Ok(browser) => Some(browser),
        Err(e) => {
            if e.to_string().contains("Could not auto detect") {
                eprintln!("Skipping: Chrome not installed ({})", e);
                None
            } else {
                panic!("Unexpected browser error: {}", e);
            }
        }
    }
}
