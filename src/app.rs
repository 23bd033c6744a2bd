//! Application module: exposes the app model used by the TUI and runtime.
//!
//! The `App` model lives in `app::model` and holds the fetched catalog, the
//! list selection, the filter and the overlay flags.

mod model;

pub use model::*;
