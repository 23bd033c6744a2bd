//! Consent and personalisation.
//!
//! Records which categories of optional data use the user agreed to and
//! gates analytics events and stored preferences on that choice. Everything
//! lives in one small TOML file.

mod manager;
mod store;

pub use manager::*;
pub use store::*;
