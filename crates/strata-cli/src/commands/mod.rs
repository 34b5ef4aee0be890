//! Command implementations.

pub mod plugins;
pub mod scan;

pub use self::plugins::execute_plugins;
pub use self::scan::execute_scan;
