pub mod charts;
pub mod color;
pub mod export;
pub mod geo;
pub mod map;
pub mod names;
pub mod records;

pub use charts::ChartService;
pub use export::{ExportError, ExportFormat};
pub use geo::{GeoError, GeoReference};
pub use map::{MapError, MapService};
pub use records::{RecordError, RecordService};
