//! Paideia parent-portal directory scraper.
//!
//! Drives a browser through the student directory (class filter, paginated
//! roster, nested student/parent dialogs) and turns what it sees into
//! [`StudentRecord`]s grouped by class, ready for export.
//!
//! All browser access goes through the [`Portal`] trait. The live
//! implementation is [`WebDriverPortal`]; [`FakePortal`] is an in-memory
//! directory used by tests and dry runs. Waiting on asynchronous rendering is
//! done exclusively with [`Wait`], above the adapter.

pub mod auth;
pub mod class_select;
pub mod context;
pub mod dataset;
pub mod error;
pub mod export;
pub mod model;
pub mod navigator;
pub mod paginator;
pub mod passes;
pub mod portal;
pub mod session;
pub mod synthetic;
pub mod wait;

pub use class_select::select_class;
pub use context::{Fidelity, RunContext, Timeouts};
pub use dataset::Dataset;
pub use error::{Error, Result};
pub use export::{ExportSink, SheetLayout, XlsxSink};
pub use model::{ClassGroup, ParentRecord, StudentRecord, StudentRef};
pub use navigator::{DialogState, Navigator};
pub use paginator::Paginator;
pub use passes::{ClassReport, RecordFailure, scrape_class};
pub use portal::fake::{FakeClass, FakeDirectory, FakeParent, FakePortal, FakeStudent};
pub use portal::webdriver::{BrowserOptions, WebDriverPortal};
pub use portal::{ClassOption, Portal};
pub use session::{Credentials, Session};
pub use wait::Wait;

/// Default bounded wait for page-level rendering.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Default bounded wait for a single record's fields to populate.
pub const DEFAULT_FIELD_TIMEOUT_SECS: u64 = 10;
