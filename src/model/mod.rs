pub mod config;
pub mod records;
pub mod reports;
pub mod table;

pub use config::{Config, ViewConfig};
pub use records::*;
pub use reports::*;
pub use table::{Cell, TabularRow};
