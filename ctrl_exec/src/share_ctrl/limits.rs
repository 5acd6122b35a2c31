//! Joint limit table

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use util::maths::within_closed;

use super::{JointVector, NUM_JOINTS};
use crate::kinematics::JointLimit;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Closed position bounds of every controlled joint.
///
/// Units: radians (revolute), meters (prismatic)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct JointLimits {
    pub lower: JointVector,
    pub upper: JointVector,
}

/// A joint found outside its limits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Violation {
    pub joint: usize,
    pub value: f64,
    pub lower: f64,
    pub upper: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl JointLimits {
    /// Build the table from per-joint limits, `None` if the number of limits is wrong.
    pub fn from_joint_limits(limits: &[JointLimit]) -> Option<Self> {
        if limits.len() != NUM_JOINTS {
            return None;
        }

        let mut table = Self::default();
        for (i, l) in limits.iter().enumerate() {
            table.lower[i] = l.lower;
            table.upper[i] = l.upper;
        }

        Some(table)
    }

    /// Returns true if every value lies within its closed interval.
    pub fn within_limits(&self, joints: &JointVector) -> bool {
        self.first_violation(joints).is_none()
    }

    /// The first joint, in chain order, outside its limits.
    ///
    /// NaN values are always violations.
    pub fn first_violation(&self, joints: &JointVector) -> Option<Violation> {
        (0..NUM_JOINTS)
            .find(|&i| !within_closed(joints[i], self.lower[i], self.upper[i]))
            .map(|i| Violation {
                joint: i,
                value: joints[i],
                lower: self.lower[i],
                upper: self.upper[i],
            })
    }

    /// Index of the first joint whose lower bound is above its upper bound.
    pub(crate) fn first_unordered(&self) -> Option<usize> {
        (0..NUM_JOINTS).find(|&i| !(self.lower[i] <= self.upper[i]))
    }
}
