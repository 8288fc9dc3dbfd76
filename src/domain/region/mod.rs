// Region domain module
// Static region table and the cross-region resource locator

pub mod locator;
pub mod table;

pub use locator::locate_instance;
pub use table::{display_name, map_region, RegionInfo, DEFAULT_REGION, LOCATION_KEYWORDS, REGIONS};
