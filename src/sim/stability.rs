//! Stability checks for a terrain-adjusted position

use serde::{Deserialize, Serialize};

use super::pose::TerrainPose;
use crate::settings::StabilityConfig;

/// Why a position was judged unstable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnstableReason {
    TooSteep,
    Underwater,
    /// A track bridges a crater edge
    ExtremeDeformation,
}

impl UnstableReason {
    pub fn code(&self) -> &'static str {
        match self {
            UnstableReason::TooSteep => "too_steep",
            UnstableReason::Underwater => "underwater",
            UnstableReason::ExtremeDeformation => "extreme_deformation",
        }
    }
}

/// Rejects poses that are too steep, too deep or straddle a crater rim.
///
/// `center_height` is the simple (single-sample) terrain height under the
/// vehicle center.
pub fn evaluate_stability(
    pose: &TerrainPose,
    center_height: f32,
    config: &StabilityConfig,
) -> Option<UnstableReason> {
    if pose.slope > config.max_slope {
        return Some(UnstableReason::TooSteep);
    }
    if center_height < config.underwater_floor {
        return Some(UnstableReason::Underwater);
    }
    if pose.contact_spread > config.max_contact_spread {
        return Some(UnstableReason::ExtremeDeformation);
    }
    None
}
