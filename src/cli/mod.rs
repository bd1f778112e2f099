pub mod analyze;
pub mod geocode;

pub use analyze::analyze;
pub use geocode::geocode;
