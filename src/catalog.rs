//! Catalog module: the ordered list of tracks a session plays from.
//!
//! A catalog is built once at startup, either from a TOML manifest or by
//! scanning a directory, and stays fixed for the lifetime of the session.

mod group;
mod manifest;
mod model;
mod scan;
mod time;

pub use group::*;
pub use manifest::load_manifest;
pub use model::*;
pub use scan::scan;
pub use time::format_time;
