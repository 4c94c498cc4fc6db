//! Toroidal topology decomposition.
//!
//! Simulation output on a toroidal grid is logically rectangular only in
//! pieces: the poloidal plane is split by separatrices and divertor legs
//! into topological regions (core, scrape-off layer, private flux regions),
//! each of which is a contiguous block of the global index space.
//!
//! [`classify_topology`] reads the separatrix and branch-cut indices from
//! run metadata to name the overall magnetic topology, and
//! [`create_regions_toroidal`] builds the per-topology map of [`Region`]s
//! with their x/y neighbour connections.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;
use tracing::debug;

use crate::dataset::Dataset;
use crate::error::{Error, Result};

/// The global indices bounding a single topological region, i.e. a region
/// with logically rectangular contiguous data, plus the names of any
/// neighbouring regions.
///
/// `x` is the radial index direction, `y` the poloidal one. A `None`
/// connection means the region ends at a physical boundary (wall or
/// target plate) on that side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    /// Region name (equal to its key in the region map).
    pub name: String,
    /// Lowest global x index of the region.
    pub xinner_ind: i64,
    /// One past the highest global x index.
    pub xouter_ind: i64,
    /// Lowest global y index of the region.
    pub ylower_ind: i64,
    /// One past the highest global y index.
    pub yupper_ind: i64,
    /// Neighbouring region on the inner-x side, if any.
    pub connection_inner: Option<String>,
    /// Neighbouring region on the outer-x side, if any.
    pub connection_outer: Option<String>,
    /// Neighbouring region on the lower-y side, if any.
    pub connection_lower: Option<String>,
    /// Neighbouring region on the upper-y side, if any.
    pub connection_upper: Option<String>,
}

impl Region {
    fn new(name: &str, xinner_ind: i64, xouter_ind: i64, ylower_ind: i64, yupper_ind: i64) -> Self {
        Self {
            name: name.to_owned(),
            xinner_ind,
            xouter_ind,
            ylower_ind,
            yupper_ind,
            connection_inner: None,
            connection_outer: None,
            connection_lower: None,
            connection_upper: None,
        }
    }

    /// x- and y-index ranges selecting this region from the global arrays,
    /// extended by `mxg`/`myg` guard cells on every side that has a
    /// connected neighbour.
    ///
    /// Ranges on connected sides reach into the neighbour's index space;
    /// the caller is responsible for having those cells available (they
    /// may wrap for periodic connections).
    pub fn slices(&self, mxg: i64, myg: i64) -> (Range<i64>, Range<i64>) {
        let mut xi = self.xinner_ind;
        if self.connection_inner.is_some() {
            xi -= mxg;
        }
        let mut xo = self.xouter_ind;
        if self.connection_outer.is_some() {
            xo += mxg;
        }
        let mut yl = self.ylower_ind;
        if self.connection_lower.is_some() {
            yl -= myg;
        }
        let mut yu = self.yupper_ind;
        if self.connection_upper.is_some() {
            yu += myg;
        }
        (xi..xo, yl..yu)
    }

    /// Ranges selecting `mxg` guard cells on the inner-x side of this region.
    pub fn inner_guards_slices(&self, mxg: i64) -> (Range<i64>, Range<i64>) {
        (
            self.xinner_ind - mxg..self.xinner_ind,
            self.ylower_ind..self.yupper_ind,
        )
    }

    /// Ranges selecting `mxg` guard cells on the outer-x side of this region.
    pub fn outer_guards_slices(&self, mxg: i64) -> (Range<i64>, Range<i64>) {
        (
            self.xouter_ind..self.xouter_ind + mxg,
            self.ylower_ind..self.yupper_ind,
        )
    }

    /// Ranges selecting `myg` guard cells on the lower-y side of this region.
    pub fn lower_guards_slices(&self, myg: i64) -> (Range<i64>, Range<i64>) {
        (
            self.xinner_ind..self.xouter_ind,
            self.ylower_ind - myg..self.ylower_ind,
        )
    }

    /// Ranges selecting `myg` guard cells on the upper-y side of this region.
    pub fn upper_guards_slices(&self, myg: i64) -> (Range<i64>, Range<i64>) {
        (
            self.xinner_ind..self.xouter_ind,
            self.yupper_ind..self.yupper_ind + myg,
        )
    }
}

/// Magnetic topology of a toroidal simulation domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Topology {
    /// Closed field lines everywhere; no separatrix inside the domain.
    Core,
    /// Open field lines everywhere.
    Sol,
    /// Closed core plus open scrape-off layer separated by a limiter radius.
    Limiter,
    /// One X-point, one pair of divertor legs.
    SingleNull,
    /// Domain boundary passes through the X-point itself.
    Xpoint,
    /// Two X-points on the same flux surface.
    ConnectedDoubleNull,
    /// Two X-points on different flux surfaces.
    DisconnectedDoubleNull,
}

impl fmt::Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Topology::Core => "core",
            Topology::Sol => "sol",
            Topology::Limiter => "limiter",
            Topology::SingleNull => "single-null",
            Topology::Xpoint => "xpoint",
            Topology::ConnectedDoubleNull => "connected-double-null",
            Topology::DisconnectedDoubleNull => "disconnected-double-null",
        };
        write!(f, "{}", name)
    }
}

fn order(a: i64, b: i64) -> (i64, i64) {
    if b < a {
        (b, a)
    } else {
        (a, b)
    }
}

/// Classify the magnetic topology from the dataset's run metadata.
///
/// Reads the branch-cut indices `jyseps1_1`, `jyseps2_1`, `jyseps1_2`,
/// `jyseps2_2`, the separatrix indices `ixseps1`, `ixseps2`, and the grid
/// sizes `ny`, `nx`.
pub fn classify_topology(ds: &Dataset) -> Result<Topology> {
    let jys11 = ds.meta_int("jyseps1_1")?;
    let jys21 = ds.meta_int("jyseps2_1")?;
    let jys12 = ds.meta_int("jyseps1_2")?;
    let jys22 = ds.meta_int("jyseps2_2")?;
    let ny = ds.meta_int("ny")?;
    let ixs1 = ds.meta_int("ixseps1")?;
    let ixs2 = ds.meta_int("ixseps2")?;
    let nx = ds.meta_int("nx")?;

    if jys21 == jys12 {
        // No upper X-point
        if jys11 <= 0 && jys22 >= ny - 1 {
            let ix = ixs1.min(ixs2);
            if ix >= nx - 1 {
                return Ok(Topology::Core);
            } else if ix <= 0 {
                return Ok(Topology::Sol);
            } else {
                return Ok(Topology::Limiter);
            }
        }
        return Ok(Topology::SingleNull);
    }

    if jys11 == jys21 && jys12 == jys22 {
        return Ok(Topology::Xpoint);
    }

    if ixs1 == ixs2 {
        return Ok(Topology::ConnectedDoubleNull);
    }

    Ok(Topology::DisconnectedDoubleNull)
}

/// Map of region name to region.
pub type RegionMap = IndexMap<String, Region>;

/// Get a region by name, or an error naming it.
pub fn get_region<'a>(regions: &'a RegionMap, name: &str) -> Result<&'a Region> {
    regions.get(name).ok_or_else(|| Error::UnknownRegion {
        name: name.to_owned(),
    })
}

fn add(regions: &mut RegionMap, name: &str, xi: i64, xo: i64, yl: i64, yu: i64) {
    regions.insert(name.to_owned(), Region::new(name, xi, xo, yl, yu));
}

fn connect_x(regions: &mut RegionMap, inner: &str, outer: &str) {
    regions[inner].connection_outer = Some(outer.to_owned());
    regions[outer].connection_inner = Some(inner.to_owned());
}

fn connect_y(regions: &mut RegionMap, lower: &str, upper: &str) {
    regions[lower].connection_upper = Some(upper.to_owned());
    regions[upper].connection_lower = Some(lower.to_owned());
}

/// Build the map of topological regions for a toroidal dataset.
///
/// Separatrix and branch-cut indices are clamped into the grid, ordered,
/// and adjusted for guard cells (`MXG`, `MYG`) depending on whether x/y
/// boundary cells were kept in the output (`keep_xboundaries`,
/// `keep_yboundaries`). The created regions include guard cells; filling
/// them is the caller's concern.
pub fn create_regions_toroidal(ds: &Dataset) -> Result<RegionMap> {
    let topology = classify_topology(ds)?;

    let mut ixs1 = ds.meta_int("ixseps1")?;
    let mut ixs2 = ds.meta_int("ixseps2")?;
    let mut nx = ds.meta_int("nx")?;

    let mut jys11 = ds.meta_int("jyseps1_1")?;
    let mut jys21 = ds.meta_int("jyseps2_1")?;
    let mut nyinner = ds.meta_int("ny_inner")?;
    let mut jys12 = ds.meta_int("jyseps1_2")?;
    let mut jys22 = ds.meta_int("jyseps2_2")?;
    let mut ny = ds.meta_int("ny")?;

    let mxg = ds.meta_int("MXG")?;
    let myg = ds.meta_int("MYG")?;
    // ybndry is myg if there are y-boundary cells in the output, else 0
    let ybndry = if ds.meta_flag("keep_yboundaries")? {
        myg
    } else {
        0
    };

    // Make sure all sizes are sensible
    ixs1 = ixs1.clamp(0, nx);
    ixs2 = ixs2.clamp(0, nx);
    (ixs1, ixs2) = order(ixs1, ixs2);
    jys11 = jys11.clamp(0, ny - 1);
    jys21 = jys21.clamp(0, ny - 1);
    jys12 = jys12.clamp(0, ny - 1);
    (jys21, jys12) = order(jys21, jys12);
    nyinner = nyinner.clamp(jys21 + 1, jys12 + 1);
    jys22 = jys22.clamp(0, ny - 1);

    // Adjust for x-boundary cells if they were dropped from the output
    if !ds.meta_flag("keep_xboundaries")? {
        ixs1 -= mxg;
        ixs2 -= mxg;
        nx -= 2 * mxg;
    }
    jys11 += ybndry;
    jys21 += ybndry;
    nyinner += 2 * ybndry;
    jys12 += 3 * ybndry;
    jys22 += 3 * ybndry;
    ny += 4 * ybndry;

    debug!(%topology, nx, ny, "building toroidal regions");

    // Guard cells are included in the created regions; they are filled later
    let mut regions = RegionMap::new();
    match topology {
        Topology::DisconnectedDoubleNull => {
            add(&mut regions, "lower_inner_PFR", 0, ixs1, 0, jys11 + 1);
            add(&mut regions, "lower_inner_intersep", ixs1, ixs2, 0, jys11 + 1);
            add(&mut regions, "lower_inner_SOL", ixs2, nx, 0, jys11 + 1);
            add(&mut regions, "inner_core", 0, ixs1, jys11 + 1, jys21 + 1);
            add(&mut regions, "inner_intersep", ixs1, ixs2, jys11 + 1, jys21 + 1);
            add(&mut regions, "inner_SOL", ixs2, nx, jys11 + 1, jys21 + 1);
            add(&mut regions, "upper_inner_PFR", 0, ixs1, jys21 + 1, nyinner);
            add(&mut regions, "upper_inner_intersep", ixs1, ixs2, jys21 + 1, nyinner);
            add(&mut regions, "upper_inner_SOL", ixs2, nx, jys21 + 1, nyinner);
            add(&mut regions, "upper_outer_PFR", 0, ixs1, nyinner, jys12 + 1);
            add(&mut regions, "upper_outer_intersep", ixs1, ixs2, nyinner, jys12 + 1);
            add(&mut regions, "upper_outer_SOL", ixs2, nx, nyinner, jys12 + 1);
            add(&mut regions, "outer_core", 0, ixs1, jys12 + 1, jys22 + 1);
            add(&mut regions, "outer_intersep", ixs1, ixs2, jys12 + 1, jys22 + 1);
            add(&mut regions, "outer_SOL", ixs2, nx, jys12 + 1, jys22 + 1);
            add(&mut regions, "lower_outer_PFR", 0, ixs1, jys22 + 1, ny);
            add(&mut regions, "lower_outer_intersep", ixs1, ixs2, jys22 + 1, ny);
            add(&mut regions, "lower_outer_SOL", ixs2, nx, jys22 + 1, ny);
            connect_x(&mut regions, "lower_inner_PFR", "lower_inner_intersep");
            connect_x(&mut regions, "lower_inner_intersep", "lower_inner_SOL");
            connect_x(&mut regions, "inner_core", "inner_intersep");
            connect_x(&mut regions, "inner_intersep", "inner_SOL");
            connect_x(&mut regions, "upper_inner_PFR", "upper_inner_intersep");
            connect_x(&mut regions, "upper_inner_intersep", "upper_inner_SOL");
            connect_x(&mut regions, "upper_outer_PFR", "upper_outer_intersep");
            connect_x(&mut regions, "upper_outer_intersep", "upper_outer_SOL");
            connect_x(&mut regions, "outer_core", "outer_intersep");
            connect_x(&mut regions, "outer_intersep", "outer_SOL");
            connect_x(&mut regions, "lower_outer_PFR", "lower_outer_intersep");
            connect_x(&mut regions, "lower_outer_intersep", "lower_outer_SOL");
            connect_y(&mut regions, "lower_inner_PFR", "lower_outer_PFR");
            connect_y(&mut regions, "lower_inner_intersep", "inner_intersep");
            connect_y(&mut regions, "lower_inner_SOL", "inner_SOL");
            connect_y(&mut regions, "inner_core", "outer_core");
            connect_y(&mut regions, "outer_core", "inner_core");
            connect_y(&mut regions, "inner_intersep", "outer_intersep");
            connect_y(&mut regions, "inner_SOL", "upper_inner_SOL");
            connect_y(&mut regions, "upper_outer_intersep", "upper_inner_intersep");
            connect_y(&mut regions, "upper_outer_PFR", "upper_inner_PFR");
            connect_y(&mut regions, "upper_outer_SOL", "outer_SOL");
            connect_y(&mut regions, "outer_intersep", "lower_outer_intersep");
            connect_y(&mut regions, "outer_SOL", "lower_outer_SOL");
        }
        Topology::ConnectedDoubleNull => {
            add(&mut regions, "lower_inner_PFR", 0, ixs1, 0, jys11 + 1);
            add(&mut regions, "lower_inner_SOL", ixs2, nx, 0, jys11 + 1);
            add(&mut regions, "inner_core", 0, ixs1, jys11 + 1, jys21 + 1);
            add(&mut regions, "inner_SOL", ixs2, nx, jys11 + 1, jys21 + 1);
            add(&mut regions, "upper_inner_PFR", 0, ixs1, jys21 + 1, nyinner);
            add(&mut regions, "upper_inner_SOL", ixs2, nx, jys21 + 1, nyinner);
            add(&mut regions, "upper_outer_PFR", 0, ixs1, nyinner, jys12 + 1);
            add(&mut regions, "upper_outer_SOL", ixs2, nx, nyinner, jys12 + 1);
            add(&mut regions, "outer_core", 0, ixs1, jys12 + 1, jys22 + 1);
            add(&mut regions, "outer_SOL", ixs2, nx, jys12 + 1, jys22 + 1);
            add(&mut regions, "lower_outer_PFR", 0, ixs1, jys22 + 1, ny);
            add(&mut regions, "lower_outer_SOL", ixs2, nx, jys22 + 1, ny);
            connect_x(&mut regions, "lower_inner_PFR", "lower_inner_SOL");
            connect_x(&mut regions, "inner_core", "inner_SOL");
            connect_x(&mut regions, "upper_inner_PFR", "upper_inner_SOL");
            connect_x(&mut regions, "upper_outer_PFR", "upper_outer_SOL");
            connect_x(&mut regions, "outer_core", "outer_SOL");
            connect_x(&mut regions, "lower_outer_PFR", "lower_outer_SOL");
            connect_y(&mut regions, "lower_inner_PFR", "lower_outer_PFR");
            connect_y(&mut regions, "lower_inner_SOL", "inner_SOL");
            connect_y(&mut regions, "inner_core", "outer_core");
            connect_y(&mut regions, "outer_core", "inner_core");
            connect_y(&mut regions, "inner_SOL", "upper_inner_SOL");
            connect_y(&mut regions, "upper_outer_PFR", "upper_inner_PFR");
            connect_y(&mut regions, "upper_outer_SOL", "outer_SOL");
            connect_y(&mut regions, "outer_SOL", "lower_outer_SOL");
        }
        Topology::SingleNull => {
            add(&mut regions, "inner_PFR", 0, ixs1, 0, jys11 + 1);
            add(&mut regions, "inner_SOL", ixs1, nx, 0, jys11 + 1);
            add(&mut regions, "core", 0, ixs1, jys11 + 1, jys22 + 1);
            add(&mut regions, "SOL", ixs2, nx, jys11 + 1, jys22 + 1);
            add(&mut regions, "outer_PFR", 0, ixs1, jys22 + 1, ny);
            add(&mut regions, "outer_SOL", ixs1, nx, jys22 + 1, ny);
            connect_x(&mut regions, "inner_PFR", "inner_SOL");
            connect_x(&mut regions, "core", "SOL");
            connect_x(&mut regions, "outer_PFR", "outer_SOL");
            connect_y(&mut regions, "inner_PFR", "outer_PFR");
            connect_y(&mut regions, "inner_SOL", "SOL");
            connect_y(&mut regions, "core", "core");
            connect_y(&mut regions, "SOL", "outer_SOL");
        }
        Topology::Limiter => {
            add(&mut regions, "core", 0, ixs1, 0, ny);
            add(&mut regions, "SOL", ixs1, nx, 0, ny);
            connect_x(&mut regions, "core", "SOL");
            connect_y(&mut regions, "core", "core");
        }
        Topology::Core => {
            add(&mut regions, "core", 0, nx, 0, ny);
            connect_y(&mut regions, "core", "core");
        }
        Topology::Sol => {
            add(&mut regions, "sol", 0, nx, 0, ny);
        }
        Topology::Xpoint => {
            add(&mut regions, "lower_inner_PFR", 0, ixs1, 0, jys11 + 1);
            add(&mut regions, "lower_inner_SOL", ixs1, nx, 0, jys11 + 1);
            add(&mut regions, "upper_inner_PFR", 0, ixs1, jys11 + 1, nyinner);
            add(&mut regions, "upper_inner_SOL", ixs1, nx, jys11 + 1, nyinner);
            add(&mut regions, "upper_outer_PFR", 0, ixs1, nyinner, jys22 + 1);
            add(&mut regions, "upper_outer_SOL", ixs1, nx, nyinner, jys22 + 1);
            add(&mut regions, "lower_outer_PFR", 0, ixs1, jys22 + 1, ny);
            add(&mut regions, "lower_outer_SOL", ixs1, nx, jys22 + 1, ny);
            connect_x(&mut regions, "lower_inner_PFR", "lower_inner_SOL");
            connect_x(&mut regions, "upper_inner_PFR", "upper_inner_SOL");
            connect_x(&mut regions, "upper_outer_PFR", "upper_outer_SOL");
            connect_x(&mut regions, "lower_outer_PFR", "lower_outer_SOL");
            connect_y(&mut regions, "lower_inner_PFR", "lower_outer_PFR");
            connect_y(&mut regions, "lower_inner_SOL", "upper_inner_SOL");
            connect_y(&mut regions, "upper_outer_PFR", "upper_inner_PFR");
            connect_y(&mut regions, "upper_outer_SOL", "lower_outer_SOL");
        }
    }

    Ok(regions)
}
