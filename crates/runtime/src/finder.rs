//! WebDriver executable discovery.

use std::path::{Path, PathBuf};

/// Environment variable that pins the chromedriver binary.
pub const DRIVER_ENV: &str = "CHROMEDRIVER";

/// Locates a chromedriver binary.
///
/// `$CHROMEDRIVER` wins when it points at an existing file; otherwise the
/// usual command names are looked up on `PATH`, then well-known install paths.
pub fn find_chromedriver() -> Option<PathBuf> {
	if let Some(path) = std::env::var_os(DRIVER_ENV).map(PathBuf::from) {
		if path.exists() {
			return Some(path);
		}
	}

	for candidate in driver_candidates() {
		if is_path_like(candidate) {
			if Path::new(candidate).exists() {
				return Some(PathBuf::from(candidate));
			}
		} else if let Ok(found) = which::which(candidate) {
			return Some(found);
		}
	}

	None
}

pub(crate) fn driver_candidates() -> &'static [&'static str] {
	if cfg!(target_os = "windows") {
		&["chromedriver.exe", "chromedriver"]
	} else if cfg!(target_os = "macos") {
		&["chromedriver", "/opt/homebrew/bin/chromedriver", "/usr/local/bin/chromedriver"]
	} else {
		&[
			"chromedriver",
			"chromium.chromedriver",
			"/usr/bin/chromedriver",
			"/usr/lib/chromium/chromedriver",
			"/usr/lib/chromium-browser/chromedriver",
			"/usr/local/bin/chromedriver",
			"/snap/bin/chromium.chromedriver",
		]
	}
}

fn is_path_like(candidate: &str) -> bool {
	candidate.starts_with('/') || candidate.contains('\\') || candidate.contains(':')
}
