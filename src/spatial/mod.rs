//! Region grid and food supplies

pub mod region;
pub mod region_manager;

pub use region::{DefaultRegion, DynamicSupplyRegion, FoodSupply, Region};
pub use region_manager::{MapInfo, RegionData, RegionManager, WorldDims};
