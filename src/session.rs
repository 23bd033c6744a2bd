//! Admin session handling.
//!
//! The admin session is an explicit `SessionContext` value handed to the
//! components that need it (the catalog client uses its bearer token). It is
//! empty until `login`, cleared by `logout`, and drops itself once expired.

mod context;
mod supabase;

pub use context::*;
pub use supabase::SupabaseAuth;
