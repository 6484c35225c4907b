//! valla - fair-distribution allocation engine for billboard inventory.
//!
//! Splits a set of billboards across partners so that geographically
//! co-located billboards stay together as sites, every partner receives a
//! near-equal share within each size category, and a stored seed replays
//! the exact assignment. Persistence lives behind the seams in [`store`];
//! the planning step itself is pure and synchronous.

pub mod cluster;
pub mod error;
pub mod geo;
pub mod model;
pub mod ops;
pub mod planner;
pub mod rng;
pub mod store;

pub use cluster::{UnionFind, cluster_billboards};
pub use error::{DistError, Result};
pub use geo::{EARTH_RADIUS_M, GeoPoint, haversine_distance, parse_coordinate};
pub use model::{
    Billboard, Distribution, DistributionFilters, DistributionItem, UNKNOWN_MUNICIPALITY,
    UNKNOWN_SIZE, partner_counts, site_key,
};
pub use ops::{
    GenerateRequest, generate_and_save, redistribute, remove_by_municipality, remove_by_size,
    swap_billboards,
};
pub use planner::{PlanParams, plan};
pub use rng::SeededRng;
pub use store::{BillboardSource, DistributionStore, GroupSelector, MemoryInventory, MemoryStore};
