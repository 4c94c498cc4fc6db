//! Fluxion Dataset
//!
//! The labeled dataset container for plasma-simulation post-processing,
//! with the differentiation primitive and the toroidal region
//! decomposition built on top of it.
//!
//! # Key Types
//!
//! - [`Dataset`] - Named fields and coordinates with run metadata
//! - [`Differentiator`] / [`CentralDifference`] - Derivative along a named
//!   coordinate
//! - [`Region`] / [`Topology`] - Toroidal topology decomposition
//! - [`Error`] - The error taxonomy shared with the accessor layer

pub mod dataset;
pub mod diff;
pub mod error;
pub mod region;

pub use dataset::Dataset;
pub use diff::{CentralDifference, Differentiator};
pub use error::{Error, Result};
pub use region::{
    classify_topology, create_regions_toroidal, get_region, Region, RegionMap, Topology,
};
