//! End-to-end trajectory assembly: from raw hits through triplet finding
//! and matching to the full GBL point list.

mod common;

use approx::assert_relative_eq;
use tritrack::gbl::assembler::accept_fit;
use tritrack::prelude::*;

use common::{find_both_arms, six_plane_telescope, straight_track_hits, telescope_with_dut};

fn reconstruct_one_track(ctx: &GeometryContext, sx: f64, sy: f64) -> Track {
    let hits = HitSet::from_hits(ctx, straight_track_hits(ctx, 0.0, 0.0, sx, sy)).unwrap();
    let (up, down) = find_both_arms(ctx, &hits, TripletCuts::new(0.1, 0.01));
    let mut tracks = match_triplets(&up, &down, 375.0, 0.1, isolation_cut_for(0.1));
    assert_eq!(tracks.len(), 1);
    tracks.remove(0)
}

#[test]
fn full_chain_point_layout() {
    let ctx = six_plane_telescope();
    let track = reconstruct_one_track(&ctx, 1.0e-4, -5.0e-5);

    let assembler = TrajectoryAssembler::new(AssemblerConfig::new(4.0));
    let traj = assembler.assemble(&track, &ctx).unwrap();

    // One point per plane plus two air points per gap.
    let n = ctx.n_planes();
    assert_eq!(traj.points().len(), n + 2 * (n - 1));
    assert_eq!(traj.n_measurements(), n);
    assert_eq!(traj.n_scatterers(), n + 2 * (n - 1));

    // z strictly increases along the point list.
    for pair in traj.points().windows(2) {
        assert!(pair[1].z > pair[0].z);
    }

    // Hits lie exactly on the track: residuals vanish on every plane.
    for point in traj.points() {
        if let Some(meas) = &point.measurement {
            assert!(meas.residual.norm() < 1e-9);
        }
    }
}

#[test]
fn dut_measurement_enters_the_point_list() {
    let dut = PlaneId::new(8);
    let ctx = telescope_with_dut(dut, 375.0);

    let hits = HitSet::from_hits(&ctx, straight_track_hits(&ctx, 0.0, 0.0, 0.0, 0.0)).unwrap();
    let (mut up, down) = find_both_arms(&ctx, &hits, TripletCuts::new(0.1, 0.01));
    assert!(attach_dut(&ctx, &mut up[0], &hits, dut, [0.1, 0.1]).unwrap());

    let mut tracks = match_triplets(&up, &down, 375.0, 0.1, isolation_cut_for(0.1));
    let track = tracks.remove(0);

    let assembler = TrajectoryAssembler::new(AssemblerConfig::new(4.0));
    let traj = assembler.assemble(&track, &ctx).unwrap();

    // 7 planes, 6 gaps.
    assert_eq!(traj.points().len(), 7 + 2 * 6);
    assert_eq!(traj.n_measurements(), 7);

    // The DUT point uses the coarser DUT resolution.
    let idx = traj.point_for_plane(dut).unwrap();
    let meas = traj.points()[idx].measurement.as_ref().unwrap();
    assert_relative_eq!(meas.precision.x, 1.0 / (0.010 * 0.010), epsilon = 1e-6);
}

#[test]
fn unbiased_dut_pass_drops_its_scatterer_only() {
    let dut = PlaneId::new(8);
    let ctx = telescope_with_dut(dut, 375.0);
    let hits = HitSet::from_hits(&ctx, straight_track_hits(&ctx, 0.0, 0.0, 0.0, 0.0)).unwrap();
    let (mut up, down) = find_both_arms(&ctx, &hits, TripletCuts::new(0.1, 0.01));
    assert!(attach_dut(&ctx, &mut up[0], &hits, dut, [0.1, 0.1]).unwrap());
    let mut tracks = match_triplets(&up, &down, 375.0, 0.1, isolation_cut_for(0.1));
    let track = tracks.remove(0);

    let config = AssemblerConfig::new(4.0)
        .with_plane_under_test(dut)
        .with_excluded_planes(vec![dut]);
    let traj = TrajectoryAssembler::new(config).assemble(&track, &ctx).unwrap();

    let idx = traj.point_for_plane(dut).unwrap();
    assert!(traj.points()[idx].scatterer.is_none());
    assert!(traj.points()[idx].measurement.is_none());
    // All other planes measure and scatter.
    assert_eq!(traj.n_measurements(), 6);
    assert_eq!(traj.n_scatterers(), 6 + 2 * 6);
}

#[test]
fn alignment_labels_encode_plane_and_parameter() {
    let ctx = six_plane_telescope();
    let track = reconstruct_one_track(&ctx, 0.0, 0.0);

    let config = AssemblerConfig::new(4.0).with_alignment(AlignmentMode::Full);
    let traj = TrajectoryAssembler::new(config).assemble(&track, &ctx).unwrap();

    for i in 0..6u32 {
        let idx = traj.point_for_plane(PlaneId::new(i)).unwrap();
        let globals = traj.points()[idx].globals.as_ref().unwrap();
        let base = (i * 10) as i32;
        assert_eq!(
            globals.labels,
            vec![base + 1, base + 2, base + 3, base + 4, base + 5, base + 6]
        );
        assert_eq!(globals.matrix.shape(), (2, 6));
    }
}

#[test]
fn quality_gate_decides_track_retention() {
    assert!(accept_fit(8.0, 8, 10.0));
    assert!(!accept_fit(120.0, 8, 10.0));
    assert!(!accept_fit(0.0, 0, 10.0));
}
