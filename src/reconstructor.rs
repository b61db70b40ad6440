//! The event-level reconstruction driver
//!
//! Runs the full chain steered by one [`ReconstructionConfig`]: triplet
//! finding in both arms, DUT association, matching with isolation, and
//! trajectory assembly. Construction validates the configuration against
//! the geometry, so per-event processing starts from a consistent state.

use crate::config::ReconstructionConfig;
use crate::finder::dut::attach_dut;
use crate::finder::matcher::match_triplets;
use crate::finder::triplet::find_triplets;
use crate::gbl::assembler::{accept_fit, TrajectoryAssembler};
use crate::gbl::point::Trajectory;
use crate::geometry::context::GeometryContext;
use crate::types::hit::HitSet;
use crate::types::triplet::{Track, TripletDirection};
use crate::Result;

/// One reconstructed track with its assembled fitter input.
#[derive(Debug, Clone)]
pub struct ReconstructedTrack {
    pub track: Track,
    pub trajectory: Trajectory,
}

/// Runs the reconstruction chain with a validated configuration.
#[derive(Debug, Clone)]
pub struct Reconstructor {
    config: ReconstructionConfig,
}

impl Reconstructor {
    /// Validates the configuration against the geometry and builds the
    /// driver. Processing never starts from an inconsistent configuration.
    pub fn new(config: ReconstructionConfig, ctx: &GeometryContext) -> Result<Self> {
        config.validate(ctx)?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ReconstructionConfig {
        &self.config
    }

    /// Reconstructs one event's hits into tracks with assembled
    /// trajectories.
    ///
    /// When a plane under test is configured, its hits are associated to
    /// the upstream triplets before matching, using the match cut as the
    /// per-axis window.
    pub fn process_event(
        &self,
        ctx: &GeometryContext,
        hits: &HitSet,
    ) -> Result<Vec<ReconstructedTrack>> {
        let cuts = self.config.triplet_cuts();
        let mut upstream = find_triplets(
            ctx,
            hits,
            self.config.upstream_planes,
            cuts,
            false,
            TripletDirection::Upstream,
        )?;
        let downstream = find_triplets(
            ctx,
            hits,
            self.config.downstream_planes,
            cuts,
            false,
            TripletDirection::Downstream,
        )?;

        if let Some(dut) = self.config.plane_under_test {
            let window = [self.config.match_cut, self.config.match_cut];
            for triplet in &mut upstream {
                attach_dut(ctx, triplet, hits, dut, window)?;
            }
        }

        let tracks = match_triplets(
            &upstream,
            &downstream,
            self.config.z_match,
            self.config.match_cut,
            self.config.isolation_cut,
        );

        let assembler = TrajectoryAssembler::new(self.config.assembler_config());
        tracks
            .into_iter()
            .map(|track| {
                let trajectory = assembler.assemble(&track, ctx)?;
                Ok(ReconstructedTrack { track, trajectory })
            })
            .collect()
    }

    /// Applies the configured chi²/ndf gate to an external fit result.
    pub fn accepts(&self, chi2: f64, ndf: usize) -> bool {
        accept_fit(chi2, ndf, self.config.max_chi2_ndf)
    }
}
