//! bm-core: shared foundation for boxmodel.
//!
//! Contains:
//! - ids (arena handles, reservoir keys, flux keys)
//! - numeric (Real + tolerances + float helpers)
//! - error (shared error types)

pub mod error;
pub mod ids;
pub mod numeric;

pub use error::{CoreError, CoreResult};
pub use ids::*;
pub use numeric::*;
