//! Reconstruction configuration
//!
//! One struct collects every steering parameter of the chain: plane-set
//! assignment, cuts, beam energy, resolutions and the alignment mode.
//! Validation against a geometry context catches mismatches before any
//! event is processed.

use serde::{Deserialize, Serialize};

use crate::finder::triplet::TripletCuts;
use crate::gbl::alignment::AlignmentMode;
use crate::gbl::assembler::AssemblerConfig;
use crate::geometry::context::GeometryContext;
use crate::types::plane_id::PlaneId;
use crate::{RecoError, Result};

/// Steering parameters for the full reconstruction chain.
///
/// Lengths are millimeters, slopes radians, energies GeV.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconstructionConfig {
    /// Planes forming the upstream triplet, in z-order
    pub upstream_planes: [PlaneId; 3],
    /// Planes forming the downstream triplet (driplet), in z-order
    pub downstream_planes: [PlaneId; 3],
    /// Middle-plane residual cut for triplet formation
    pub triplet_residual_cut: f64,
    /// Slope cut for triplet formation
    pub triplet_slope_cut: f64,
    /// Positional agreement cut at the matching plane
    pub match_cut: f64,
    /// Isolation cut applied to each arm during matching
    pub isolation_cut: f64,
    /// z of the common reference plane the arms are extrapolated to
    pub z_match: f64,
    /// Beam energy, sets the multiple-scattering scale
    pub beam_energy_gev: f64,
    /// Per-plane resolutions in z-order, one entry per plane
    pub resolutions: Vec<[f64; 2]>,
    /// Alignment derivative mode, `None` outside alignment passes
    pub alignment: Option<AlignmentMode>,
    /// Tracks above this chi2/ndf are dropped from the output
    pub max_chi2_ndf: f64,
    /// Plane excluded from its own scattering estimate, if any
    pub plane_under_test: Option<PlaneId>,
}

impl ReconstructionConfig {
    /// A configuration with the conventional isolation cut derived from the
    /// match cut.
    pub fn standard(
        upstream_planes: [PlaneId; 3],
        downstream_planes: [PlaneId; 3],
        z_match: f64,
        beam_energy_gev: f64,
        resolutions: Vec<[f64; 2]>,
    ) -> Self {
        let match_cut = 0.1;
        Self {
            upstream_planes,
            downstream_planes,
            triplet_residual_cut: 0.1,
            triplet_slope_cut: 0.01,
            match_cut,
            isolation_cut: crate::finder::matcher::isolation_cut_for(match_cut),
            z_match,
            beam_energy_gev,
            resolutions,
            alignment: None,
            max_chi2_ndf: 10.0,
            plane_under_test: None,
        }
    }

    /// The triplet-formation cuts this configuration steers.
    pub fn triplet_cuts(&self) -> TripletCuts {
        TripletCuts::new(self.triplet_residual_cut, self.triplet_slope_cut)
    }

    /// The assembly settings this configuration steers.
    pub fn assembler_config(&self) -> AssemblerConfig {
        let mut assembler = AssemblerConfig::new(self.beam_energy_gev);
        assembler.alignment = self.alignment;
        assembler.plane_under_test = self.plane_under_test;
        assembler
    }

    /// Checks the configuration against a geometry context.
    ///
    /// Every referenced plane must exist and the resolution vector must
    /// carry exactly one entry per plane, in z-order.
    pub fn validate(&self, ctx: &GeometryContext) -> Result<()> {
        for id in self
            .upstream_planes
            .iter()
            .chain(self.downstream_planes.iter())
        {
            ctx.index_of(*id)?;
        }
        if let Some(put) = self.plane_under_test {
            ctx.index_of(put)?;
        }

        if self.resolutions.len() != ctx.n_planes() {
            return Err(RecoError::InvalidConfig(format!(
                "expected {} resolution entries (one per plane), got {}",
                ctx.n_planes(),
                self.resolutions.len()
            )));
        }

        if self.beam_energy_gev <= 0.0 {
            return Err(RecoError::InvalidConfig(
                "beam energy must be positive".into(),
            ));
        }
        for (name, cut) in [
            ("triplet_residual_cut", self.triplet_residual_cut),
            ("triplet_slope_cut", self.triplet_slope_cut),
            ("match_cut", self.match_cut),
            ("isolation_cut", self.isolation_cut),
        ] {
            if cut <= 0.0 {
                return Err(RecoError::InvalidConfig(format!(
                    "{} must be positive",
                    name
                )));
            }
        }

        Ok(())
    }
}
