//! Example usage of the tritrack library
//!
//! Runs a synthetic 6-plane telescope with one DUT through the full chain:
//! one `ReconstructionConfig` steers triplet finding in both arms, DUT
//! association, matching with isolation and GBL trajectory assembly.

use tritrack::prelude::*;

fn main() {
    println!("Tritrack: Beam-Telescope Track Reconstruction");
    println!("=============================================\n");

    // Six Mimosa26 planes, 150 mm apart, plus a DUT between the arms.
    let mut planes: Vec<Plane> = (0..3)
        .map(|i| Plane::telescope_default(PlaneId::new(i), 150.0 * f64::from(i)))
        .collect();
    planes.push(
        Plane::telescope_default(PlaneId::new(8), 375.0)
            .with_thickness(0.3, 93.65)
            .with_resolution(0.010, 0.010),
    );
    planes.extend(
        (3..6).map(|i| Plane::telescope_default(PlaneId::new(i), 150.0 * f64::from(i) + 150.0)),
    );

    let ctx = GeometryContext::new(planes).expect("valid demo geometry");
    println!("Geometry: {} planes", ctx.n_planes());

    // One configuration steers the whole chain.
    let mut config = ReconstructionConfig::standard(
        [PlaneId::new(0), PlaneId::new(1), PlaneId::new(2)],
        [PlaneId::new(3), PlaneId::new(4), PlaneId::new(5)],
        375.0,
        4.0,
        ctx.planes().iter().map(|p| p.resolution).collect(),
    );
    config.alignment = Some(AlignmentMode::ShiftsXYRotZ);
    config.plane_under_test = Some(PlaneId::new(8));

    let reconstructor =
        Reconstructor::new(config, &ctx).expect("configuration consistent with geometry");

    // Two particles crossing the telescope, plus one stray hit.
    let mut raw_hits = Vec::new();
    for (x0, slope) in [(0.0, 1.0e-4), (2.0, -2.0e-4)] {
        for plane in ctx.planes() {
            let z = plane.position[2];
            raw_hits.push(Hit::new(plane.id, x0 + slope * z, 0.1, z));
        }
    }
    raw_hits.push(Hit::new(PlaneId::new(1), -3.0, 4.0, 150.0));

    let hits = HitSet::from_hits(&ctx, raw_hits).expect("hits on known planes");
    println!("Event: {} hits\n", hits.len());

    let results = reconstructor
        .process_event(&ctx, &hits)
        .expect("reconstruction over valid geometry");
    println!("Tracks:   {} reconstructed", results.len());

    for (i, rec) in results.iter().enumerate() {
        println!(
            "  Track {}: kink=({:+.2e}, {:+.2e}) rad, DUT hit: {}, {} points ({} measurements, {} scatterers)",
            i,
            rec.track.kink_x(),
            rec.track.kink_y(),
            if rec.track.hit_on(PlaneId::new(8)).is_some() { "yes" } else { "no" },
            rec.trajectory.points().len(),
            rec.trajectory.n_measurements(),
            rec.trajectory.n_scatterers(),
        );
    }

    println!("\nReconstruction complete!");
}
