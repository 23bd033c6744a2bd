//! Track catalog: the typed `Track` and `NewsItem` models, the `Catalog`
//! provider seam and its PostgREST implementation.
//!
//! Rows coming from the hosted store are loosely typed; they are validated
//! into `Track` values at this boundary and nowhere else.

mod model;
mod news;
mod provider;
mod supabase;

pub use model::*;
pub use news::*;
pub use provider::*;
pub use supabase::SupabaseCatalog;
