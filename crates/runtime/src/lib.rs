//! WebDriver process lifecycle.
//!
//! The scraper talks to the browser through a WebDriver server. This crate
//! finds a `chromedriver` binary, starts it on a free local port, waits until
//! it accepts connections, and guarantees the child is terminated when the
//! handle goes away.

pub mod driver;
pub mod error;
pub mod finder;
pub mod port;

pub use driver::{DriverOptions, WebDriverProcess};
pub use error::{Result, RuntimeError};
