//! The matchmaking engine
//!
//! Pure policy (rating window, compatibility) plus the two matching
//! strategies: on-demand single-player lookup and periodic batch grouping
//! over a whole partition.

pub mod assembly;
pub mod batch;
pub mod compatibility;
pub mod on_demand;
pub mod window;

pub use batch::BatchMatcher;
pub use compatibility::compatible;
pub use on_demand::OnDemandMatcher;
pub use window::rating_window;
