//! Client side of the dot-grid backdrop.
//!
//! Loads path sets cache-aside from the path store, keeps them in a mounted
//! [`Backdrop`] session together with the pointer tracker, and renders frames.

pub mod config;
pub mod prefs;
pub mod session;
pub mod source;
pub mod store;
pub mod trace;

pub use prefs::Preferences;
pub use session::Backdrop;
pub use source::{LoadedPaths, PathOrigin, PathSource};
pub use store::{HttpPathCache, PathCache, StoreError};
