//! Page contract for the Paideia parent portal.
//!
//! This crate describes what the remote directory looks like from the
//! outside: the selectors that locate its controls, the JSON payloads it
//! embeds in attributes, and the text shapes of the fields we read.
//!
//! # Design Philosophy
//!
//! Types in this crate are:
//! * Pure data: no browser access, no waiting
//! * 1:1 with the live page: a portal redesign only touches this crate
//! * Stable: the rest of the workspace depends on names, not selector strings
//!
//! The browser-facing adapter built on top of these lives in `paideia-core`.

pub mod search_params;
pub mod selectors;
pub mod text;

pub use search_params::*;
pub use selectors::*;
pub use text::*;
