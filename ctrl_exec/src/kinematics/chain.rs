//! Serial kinematic chain

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use nalgebra::{DMatrix, Isometry3, Translation3, Unit, UnitQuaternion, Vector3};
use std::collections::HashMap;

use super::{ChainError, JointLimit, JointSpec, JointType, RobotDescription};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Axes shorter than this are rejected when building a chain.
const MIN_AXIS_NORM: f64 = 1e-9;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// An immutable serial chain of joints from a base link to a tip link.
#[derive(Debug, Clone)]
pub struct Chain {
    base: String,
    tip: String,
    segments: Vec<Segment>,
    joint_names: Vec<String>,
}

/// One joint of the chain and the fixed transform preceding it.
#[derive(Debug, Clone)]
pub struct Segment {
    pub name: String,

    /// Pose of the joint frame in the previous segment's frame.
    pub origin: Isometry3<f64>,

    pub motion: Motion,

    pub limit: Option<JointLimit>,
}

/// Frame of a single moving joint in the base frame.
struct JointFrame {
    position: Vector3<f64>,
    axis: Vector3<f64>,
    prismatic: bool,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// The motion a joint produces.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Motion {
    Fixed,
    Revolute(Unit<Vector3<f64>>),
    Prismatic(Unit<Vector3<f64>>),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Chain {
    /// Extract the chain connecting `base` to `tip` from the robot description.
    ///
    /// The chain is found by walking from the tip towards the root through each link's parent
    /// joint, so branches of the description not on this path are ignored.
    pub fn from_description(
        desc: &RobotDescription,
        base: &str,
        tip: &str,
    ) -> Result<Self, ChainError> {
        let mut parent_joints: HashMap<&str, &JointSpec> = HashMap::new();
        for joint in desc.joints.iter() {
            if parent_joints.insert(joint.child.as_str(), joint).is_some() {
                return Err(ChainError::DuplicateChild(joint.child.clone()));
            }
        }

        let no_chain = || ChainError::NoChain {
            base: base.to_string(),
            tip: tip.to_string(),
        };

        let mut specs = Vec::new();
        let mut link = tip;
        while link != base {
            // A path longer than the number of joints means the description has a loop
            if specs.len() > desc.joints.len() {
                return Err(no_chain());
            }

            let joint = parent_joints.get(link).ok_or_else(no_chain)?;
            specs.push(*joint);
            link = joint.parent.as_str();
        }
        specs.reverse();

        let segments = specs
            .into_iter()
            .map(Segment::from_spec)
            .collect::<Result<Vec<_>, _>>()?;

        let joint_names = segments
            .iter()
            .filter(|s| s.motion != Motion::Fixed)
            .map(|s| s.name.clone())
            .collect();

        Ok(Self {
            base: base.to_string(),
            tip: tip.to_string(),
            segments,
            joint_names,
        })
    }

    /// Name of the base link
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Name of the tip link
    pub fn tip(&self) -> &str {
        &self.tip
    }

    /// Number of moving joints in the chain.
    pub fn num_joints(&self) -> usize {
        self.joint_names.len()
    }

    /// Names of the moving joints, in chain order.
    pub fn joint_names(&self) -> &[String] {
        &self.joint_names
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// The limits of every moving joint, or `None` if any joint is unlimited.
    pub fn joint_limits(&self) -> Option<Vec<JointLimit>> {
        self.segments
            .iter()
            .filter(|s| s.motion != Motion::Fixed)
            .map(|s| s.limit)
            .collect()
    }

    /// Pose of the tip link in the base frame for the given joint positions.
    pub fn forward_kinematics(&self, q: &[f64]) -> Result<Isometry3<f64>, ChainError> {
        self.check_num_joints(q)?;

        Ok(self.walk(q, |_| ()))
    }

    /// The geometric Jacobian of the tip at the given joint positions.
    ///
    /// The result is a `6 x num_joints` matrix expressed in the base frame, with the linear
    /// velocity rows first and the angular velocity rows last.
    pub fn jacobian(&self, q: &[f64]) -> Result<DMatrix<f64>, ChainError> {
        self.check_num_joints(q)?;

        let mut frames = Vec::with_capacity(self.num_joints());
        let tip = self.walk(q, |f| frames.push(f));
        let p_tip = tip.translation.vector;

        let mut jac = DMatrix::zeros(6, self.num_joints());
        for (i, frame) in frames.iter().enumerate() {
            let (linear, angular) = match frame.prismatic {
                true => (frame.axis, Vector3::zeros()),
                false => (frame.axis.cross(&(p_tip - frame.position)), frame.axis),
            };

            for r in 0..3 {
                jac[(r, i)] = linear[r];
                jac[(r + 3, i)] = angular[r];
            }
        }

        Ok(jac)
    }

    pub(crate) fn check_num_joints(&self, q: &[f64]) -> Result<(), ChainError> {
        match q.len() == self.num_joints() {
            true => Ok(()),
            false => Err(ChainError::JointCountMismatch {
                expected: self.num_joints(),
                actual: q.len(),
            }),
        }
    }

    /// Walk the chain accumulating transforms, calling `on_joint` with the base frame pose of
    /// every moving joint. Returns the tip pose.
    ///
    /// `q` must already have been checked against the number of joints.
    fn walk<F: FnMut(JointFrame)>(&self, q: &[f64], mut on_joint: F) -> Isometry3<f64> {
        let mut pose = Isometry3::identity();
        let mut q_iter = q.iter();

        for seg in self.segments.iter() {
            pose *= seg.origin;

            let (axis, prismatic) = match seg.motion {
                Motion::Fixed => continue,
                Motion::Revolute(a) => (a, false),
                Motion::Prismatic(a) => (a, true),
            };

            on_joint(JointFrame {
                position: pose.translation.vector,
                axis: pose.rotation * axis.into_inner(),
                prismatic,
            });

            let qi = q_iter.next().copied().unwrap_or_default();
            pose *= match prismatic {
                true => Isometry3::from_parts(
                    Translation3::from(axis.into_inner() * qi),
                    UnitQuaternion::identity(),
                ),
                false => Isometry3::from_parts(
                    Translation3::identity(),
                    UnitQuaternion::from_axis_angle(&axis, qi),
                ),
            };
        }

        pose
    }
}

impl Segment {
    fn from_spec(spec: &JointSpec) -> Result<Self, ChainError> {
        let [x, y, z] = spec.origin_xyz;
        let [roll, pitch, yaw] = spec.origin_rpy;

        let origin = Isometry3::from_parts(
            Translation3::new(x, y, z),
            UnitQuaternion::from_euler_angles(roll, pitch, yaw),
        );

        let axis = || {
            Unit::try_new(Vector3::from(spec.axis), MIN_AXIS_NORM)
                .ok_or_else(|| ChainError::ZeroAxis(spec.name.clone()))
        };

        let motion = match spec.joint_type {
            JointType::Fixed => Motion::Fixed,
            JointType::Revolute | JointType::Continuous => Motion::Revolute(axis()?),
            JointType::Prismatic => Motion::Prismatic(axis()?),
        };

        let limit = match spec.joint_type {
            JointType::Continuous | JointType::Fixed => None,
            _ => spec.limit,
        };

        Ok(Self {
            name: spec.name.clone(),
            origin,
            motion,
            limit,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::kinematics::test_utils::*;
    use approx::assert_relative_eq;

    /// Two revolute joints about z with 1 m links along x, then a prismatic joint along x.
    fn planar_chain() -> Chain {
        let joint = |name: &str, t, parent: &str, child: &str, xyz| JointSpec {
            name: name.into(),
            joint_type: t,
            parent: parent.into(),
            child: child.into(),
            origin_xyz: xyz,
            origin_rpy: [0.0; 3],
            axis: [0.0, 0.0, 1.0],
            limit: None,
        };

        let mut slide = joint("slide", JointType::Prismatic, "l2", "l3", [1.0, 0.0, 0.0]);
        slide.axis = [1.0, 0.0, 0.0];

        let desc = RobotDescription {
            name: "planar".into(),
            joints: vec![
                joint("j1", JointType::Revolute, "base", "l1", [0.0; 3]),
                slide,
                joint("j2", JointType::Continuous, "l1", "l2", [1.0, 0.0, 0.0]),
                joint("tool", JointType::Fixed, "l3", "tip", [0.5, 0.0, 0.0]),
            ],
        };

        Chain::from_description(&desc, "base", "tip").unwrap()
    }

    #[test]
    fn test_chain_extraction() {
        let chain = planar_chain();

        assert_eq!(chain.num_joints(), 3);
        assert_eq!(chain.joint_names(), &["j1", "j2", "slide"]);
        assert_eq!(chain.segments().len(), 4);
        assert!(chain.joint_limits().is_none());

        let panda = panda_chain();
        assert_eq!(panda.num_joints(), 7);
        assert_eq!(panda.base(), "panda_link0");
        assert_eq!(panda.tip(), "panda_grasptarget");
        assert_eq!(panda.joint_limits().map(|l| l.len()), Some(7));
    }

    #[test]
    fn test_chain_errors() {
        let desc = panda_description();

        assert!(matches!(
            Chain::from_description(&desc, "panda_link0", "not_a_link"),
            Err(ChainError::NoChain { .. })
        ));

        // A tip above the base is not reachable from it
        assert!(matches!(
            Chain::from_description(&desc, "panda_link7", "panda_link3"),
            Err(ChainError::NoChain { .. })
        ));

        let mut bad_axis = desc.clone();
        bad_axis.joints[0].axis = [0.0; 3];
        assert!(matches!(
            Chain::from_description(&bad_axis, "panda_link0", "panda_grasptarget"),
            Err(ChainError::ZeroAxis(_))
        ));

        let mut dup = desc;
        let extra = dup.joints[1].clone();
        dup.joints.push(extra);
        assert!(matches!(
            Chain::from_description(&dup, "panda_link0", "panda_grasptarget"),
            Err(ChainError::DuplicateChild(_))
        ));

        let chain = panda_chain();
        assert!(matches!(
            chain.forward_kinematics(&[0.0; 6]),
            Err(ChainError::JointCountMismatch {
                expected: 7,
                actual: 6
            })
        ));
    }

    #[test]
    fn test_planar_fk() {
        let chain = planar_chain();

        let pose = chain.forward_kinematics(&[0.0, 0.0, 0.0]).unwrap();
        assert_relative_eq!(pose.translation.vector, Vector3::new(2.5, 0.0, 0.0), epsilon = 1e-12);

        let pose = chain
            .forward_kinematics(&[std::f64::consts::FRAC_PI_2, 0.0, 0.25])
            .unwrap();
        assert_relative_eq!(pose.translation.vector, Vector3::new(0.0, 2.75, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn test_panda_home_fk() {
        let pose = panda_chain().forward_kinematics(&PANDA_HOME).unwrap();

        assert_relative_eq!(
            pose.translation.vector,
            Vector3::new(0.30689, 0.0, 0.48528),
            epsilon = 1e-4
        );
    }

    #[test]
    fn test_jacobian_matches_finite_difference() {
        let chain = panda_chain();
        let q = [0.1, -0.6, 0.2, -2.2, 0.1, 1.7, 0.6];
        let jac = chain.jacobian(&q).unwrap();
        let pose = chain.forward_kinematics(&q).unwrap();

        let h = 1e-7;
        for i in 0..chain.num_joints() {
            let mut q_h = q;
            q_h[i] += h;
            let pose_h = chain.forward_kinematics(&q_h).unwrap();

            let dp = (pose_h.translation.vector - pose.translation.vector) / h;
            let dr = (pose_h.rotation * pose.rotation.inverse()).scaled_axis() / h;

            for r in 0..3 {
                assert_relative_eq!(jac[(r, i)], dp[r], epsilon = 1e-5);
                assert_relative_eq!(jac[(r + 3, i)], dr[r], epsilon = 1e-5);
            }
        }
    }

    #[test]
    fn test_prismatic_jacobian_column() {
        let chain = planar_chain();
        let jac = chain.jacobian(&[std::f64::consts::FRAC_PI_2, 0.0, 0.0]).unwrap();

        // The slide axis is rotated onto y and contributes no angular velocity
        assert_relative_eq!(jac[(0, 2)], 0.0, epsilon = 1e-12);
        assert_relative_eq!(jac[(1, 2)], 1.0, epsilon = 1e-12);
        for r in 3..6 {
            assert_relative_eq!(jac[(r, 2)], 0.0, epsilon = 1e-12);
        }
    }
}
