//! Numerical inverse kinematics
//!
//! Position-level Newton-Raphson iterations, each step solving the velocity problem
//! `J(q) dq = e` through the SVD pseudo-inverse of the Jacobian.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::{trace, warn};
use nalgebra::{DVector, Isometry3};
use serde::{Deserialize, Serialize};

use super::{Chain, ChainError};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Parameters of the inverse kinematics solver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IkParams {
    /// Maximum number of position iterations.
    pub max_iterations: usize,

    /// The solve has converged once every component of the pose error is below this value.
    ///
    /// Units: meters and radians
    pub eps: f64,

    /// Singular values of the Jacobian below this value are ignored in the pseudo-inverse.
    pub vel_eps: f64,

    /// Maximum number of iterations of the SVD used in the velocity solve.
    pub vel_max_iterations: usize,
}

/// The result of an inverse kinematics solve.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IkSolution {
    /// The joint positions found. If the solve did not converge these are the last estimate.
    pub joints: Vec<f64>,

    pub converged: bool,

    /// Number of position iterations performed
    pub iterations: usize,

    /// Largest component of the pose error at `joints`.
    pub residual: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for IkParams {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            eps: 1e-6,
            vel_eps: 1e-4,
            vel_max_iterations: 1000,
        }
    }
}

impl Chain {
    /// Find joint positions placing the tip at `target`, starting the search from `seed`.
    ///
    /// The solve is deterministic for a given chain, target and seed. Failing to converge is not
    /// an error, the returned solution carries `converged = false` and the last estimate.
    pub fn solve_ik(
        &self,
        params: &IkParams,
        target: &Isometry3<f64>,
        seed: &[f64],
    ) -> Result<IkSolution, ChainError> {
        self.check_num_joints(seed)?;

        let mut q = DVector::from_column_slice(seed);
        let mut iterations = 0;

        while iterations < params.max_iterations {
            let error = pose_error(target, &self.forward_kinematics(q.as_slice())?);
            let residual = error.amax();

            if residual < params.eps {
                trace!("IK converged in {} iterations", iterations);
                return Ok(IkSolution {
                    joints: q.as_slice().to_vec(),
                    converged: true,
                    iterations,
                    residual,
                });
            }

            let svd = match self.jacobian(q.as_slice())?.try_svd(
                true,
                true,
                f64::EPSILON,
                params.vel_max_iterations,
            ) {
                Some(s) => s,
                None => {
                    warn!("Jacobian SVD did not converge, stopping IK at iteration {}", iterations);
                    break;
                }
            };

            let pinv = svd
                .pseudo_inverse(params.vel_eps)
                .map_err(ChainError::PseudoInverse)?;

            q += pinv * error;
            iterations += 1;
        }

        let residual = pose_error(target, &self.forward_kinematics(q.as_slice())?).amax();

        Ok(IkSolution {
            joints: q.as_slice().to_vec(),
            converged: residual < params.eps,
            iterations,
            residual,
        })
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// The twist taking `current` to `target`, linear part first.
///
/// Both parts are expressed in the base frame, matching the rows of [`Chain::jacobian`].
pub fn pose_error(target: &Isometry3<f64>, current: &Isometry3<f64>) -> DVector<f64> {
    let linear = target.translation.vector - current.translation.vector;
    let angular = (target.rotation * current.rotation.inverse()).scaled_axis();

    DVector::from_iterator(6, linear.iter().chain(angular.iter()).copied())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::kinematics::test_utils::*;
    use approx::assert_relative_eq;
    use nalgebra::{Translation3, Vector3};

    fn target_at(chain: &Chain, position: [f64; 3]) -> Isometry3<f64> {
        let home = chain.forward_kinematics(&PANDA_HOME).unwrap();
        Isometry3::from_parts(Translation3::from(Vector3::from(position)), home.rotation)
    }

    #[test]
    fn test_solve_at_seed() {
        let chain = panda_chain();
        let target = chain.forward_kinematics(&PANDA_HOME).unwrap();

        let sol = chain
            .solve_ik(&IkParams::default(), &target, &PANDA_HOME)
            .unwrap();

        assert!(sol.converged);
        assert_eq!(sol.iterations, 0);
        assert_eq!(sol.joints, PANDA_HOME.to_vec());
    }

    #[test]
    fn test_solve_reachable() {
        let chain = panda_chain();
        let params = IkParams::default();

        for position in [[0.3, 0.0, 0.48], [0.4559, 0.0, 0.3346], [0.35, 0.05, 0.45]] {
            let target = target_at(&chain, position);
            let sol = chain.solve_ik(&params, &target, &PANDA_HOME).unwrap();

            assert!(sol.converged, "no convergence for {:?}", position);
            assert!(sol.iterations < 20);
            assert!(sol.residual < params.eps);

            let pose = chain.forward_kinematics(&sol.joints).unwrap();
            assert_relative_eq!(
                pose.translation.vector,
                Vector3::from(position),
                epsilon = 1e-5
            );
            assert!(pose.rotation.angle_to(&target.rotation) < 1e-5);
        }
    }

    #[test]
    fn test_solution_near_seed() {
        let chain = panda_chain();
        let target = target_at(&chain, [0.3, 0.0, 0.48]);

        let sol = chain
            .solve_ik(&IkParams::default(), &target, &PANDA_HOME)
            .unwrap();

        let expected = [0.0, -0.8108, 0.0, -2.3842, 0.0, 1.5734, 0.7854];
        for (q, e) in sol.joints.iter().zip(expected.iter()) {
            assert_relative_eq!(*q, *e, epsilon = 1e-3);
        }
    }

    #[test]
    fn test_deterministic() {
        let chain = panda_chain();
        let target = target_at(&chain, [0.35, 0.05, 0.45]);
        let seed = [0.1, -0.7, 0.05, -2.3, 0.0, 1.6, 0.8];

        let a = chain.solve_ik(&IkParams::default(), &target, &seed).unwrap();
        let b = chain.solve_ik(&IkParams::default(), &target, &seed).unwrap();

        assert_eq!(a, b);
    }

    #[test]
    fn test_unreachable_not_converged() {
        let chain = panda_chain();
        let target = target_at(&chain, [2.0, 0.0, 0.5]);
        let params = IkParams {
            max_iterations: 25,
            ..Default::default()
        };

        let sol = chain.solve_ik(&params, &target, &PANDA_HOME).unwrap();

        assert!(!sol.converged);
        assert!(sol.iterations <= 25);
        assert_eq!(sol.joints.len(), 7);
    }

    #[test]
    fn test_seed_length_checked() {
        let chain = panda_chain();
        let target = target_at(&chain, [0.3, 0.0, 0.48]);

        assert!(matches!(
            chain.solve_ik(&IkParams::default(), &target, &[0.0; 3]),
            Err(ChainError::JointCountMismatch { .. })
        ));
    }

    #[test]
    fn test_pose_error() {
        let a = Isometry3::translation(1.0, 2.0, 3.0);
        let b = Isometry3::translation(0.5, 2.0, 3.5);

        let e = pose_error(&a, &b);
        assert_eq!(e.len(), 6);
        assert_relative_eq!(e[0], 0.5);
        assert_relative_eq!(e[2], -0.5);
        for i in 3..6 {
            assert_relative_eq!(e[i], 0.0);
        }
    }
}
