//! Compute E×B drift velocities on a synthetic potential snapshot.

use fluxion_accessors::DriftAccessor;
use fluxion_dataset::Dataset;
use fluxion_foundation::DimArray;

fn main() {
    let nx = 8;
    let nz = 16;
    let xvals: Vec<f64> = (0..nx).map(|i| 0.1 * i as f64).collect();
    let zvals: Vec<f64> = (0..nz).map(|k| 0.05 * k as f64).collect();

    // Single poloidal-plane snapshot: a drifting potential blob over a
    // radially decaying magnetic field
    let mut phi_data = Vec::with_capacity(nx * nz);
    for &x in &xvals {
        for &z in &zvals {
            phi_data.push((x - 0.35).powi(2) + 0.5 * (z - 0.4).powi(2));
        }
    }
    let bxy_data: Vec<f64> = xvals.iter().map(|&x| 2.0 / (1.0 + x)).collect();

    let mut ds = Dataset::new();
    ds.set_name("synthetic-blob");
    ds.insert_coord("x", DimArray::from_vec(&["x"], &[nx], xvals))
        .expect("x coordinate");
    ds.insert_coord("z", DimArray::from_vec(&["z"], &[nz], zvals))
        .expect("z coordinate");
    ds.insert_field("phi", DimArray::from_vec(&["x", "z"], &[nx, nz], phi_data))
        .expect("potential field");
    ds.insert_field("Bxy", DimArray::from_vec(&["x"], &[nx], bxy_data))
        .expect("field magnitude");

    let accessor = DriftAccessor::new();
    let v_radial = accessor.radial_velocity(&mut ds).expect("radial velocity");
    let v_binormal = accessor
        .binormal_velocity(&mut ds)
        .expect("binormal velocity");

    println!("{}", ds);
    println!();
    println!(
        "v_radial   {} at blob centre: {:+.4}",
        v_radial,
        v_radial.get(&[nx / 2, nz / 2])
    );
    println!(
        "v_binormal {} at blob centre: {:+.4}",
        v_binormal,
        v_binormal.get(&[nx / 2, nz / 2])
    );
}
