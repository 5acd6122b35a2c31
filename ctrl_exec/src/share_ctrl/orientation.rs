//! Frozen target orientation

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use nalgebra::UnitQuaternion;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Orientation of the tool used for every IK target.
///
/// It is captured once, from the first measured configuration, and never changes afterwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TargetOrientation {
    Uninitialized,
    Frozen(UnitQuaternion<f64>),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for TargetOrientation {
    fn default() -> Self {
        TargetOrientation::Uninitialized
    }
}

impl TargetOrientation {
    /// The frozen orientation, if captured.
    pub fn get(&self) -> Option<UnitQuaternion<f64>> {
        match self {
            TargetOrientation::Uninitialized => None,
            TargetOrientation::Frozen(q) => Some(*q),
        }
    }

    pub fn is_frozen(&self) -> bool {
        matches!(self, TargetOrientation::Frozen(_))
    }

    /// Get the frozen orientation, capturing it with `capture` if this is the first call.
    ///
    /// If `capture` fails the orientation stays uninitialised.
    pub fn get_or_try_freeze<F, E>(&mut self, capture: F) -> Result<UnitQuaternion<f64>, E>
    where
        F: FnOnce() -> Result<UnitQuaternion<f64>, E>,
    {
        match *self {
            TargetOrientation::Frozen(q) => Ok(q),
            TargetOrientation::Uninitialized => {
                let q = capture()?;
                *self = TargetOrientation::Frozen(q);
                Ok(q)
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_freeze_once() {
        let mut orient = TargetOrientation::default();
        assert!(orient.get().is_none());

        // A failed capture leaves it uninitialised
        let r: Result<_, ()> = orient.get_or_try_freeze(|| Err(()));
        assert!(r.is_err());
        assert!(!orient.is_frozen());

        let first = UnitQuaternion::from_euler_angles(0.1, 0.2, 0.3);
        let second = UnitQuaternion::from_euler_angles(1.0, 0.0, 0.0);

        let q: Result<_, ()> = orient.get_or_try_freeze(|| Ok(first));
        assert_eq!(q, Ok(first));

        // Later captures are never called
        let q: Result<_, ()> = orient.get_or_try_freeze(|| Ok(second));
        assert_eq!(q, Ok(first));
        assert_eq!(orient.get(), Some(first));
    }
}
