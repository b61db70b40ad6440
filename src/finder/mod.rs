//! Track finding: triplet construction, isolation, matching, DUT
//! association and efficiency estimation.

pub mod triplet;
pub mod matcher;
pub mod dut;
pub mod efficiency;

pub use dut::attach_dut;
pub use efficiency::{estimate_efficiency, EfficiencyEstimate};
pub use matcher::{is_triplet_isolated, isolation_cut_for, match_triplets};
pub use triplet::{find_triplets, TripletCuts};
