use crate::error::TrackError;
use nalgebra::SMatrix;

/* -----------------------------------------------------------------------------
 * Type aliases
 * ----------------------------------------------------------------------------- */
// 1x4: [cx, cy, s, r]
pub(crate) type DetectBox = SMatrix<f32, 1, 4>;
// 1x7: [cx, cy, s, r, vcx, vcy, vs]
pub(crate) type StateMean = SMatrix<f32, 1, 7>;
// 7x7
pub(crate) type StateCov = SMatrix<f32, 7, 7>;
// 1x4
pub(crate) type StateHMean = SMatrix<f32, 1, 4>;
// 4x4
pub(crate) type StateHCov = SMatrix<f32, 4, 4>;

/* -----------------------------------------------------------------------------
 * Covariance policy
 * ----------------------------------------------------------------------------- */
pub(crate) trait CovariancePolicy {
    fn init_state_cov(&self, z: &DetectBox) -> StateCov;
    fn r(&self, x: &StateMean) -> StateHCov;
    fn q(&self, x: &StateMean) -> StateCov;
}

/// Fixed noise of the classic SORT box model: uncertain initial velocities,
/// noisy scale/aspect measurements, near-constant scale velocity.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct ConstantNoise;

impl CovariancePolicy for ConstantNoise {
    fn init_state_cov(&self, _z: &DetectBox) -> StateCov {
        let mut p = StateCov::identity();
        for i in 4..7 {
            p[(i, i)] *= 1000.0;
        }
        p *= 10.0;
        p
    }

    fn r(&self, _x: &StateMean) -> StateHCov {
        StateHCov::from_diagonal(
            &SMatrix::<f32, 1, 4>::from_iterator([1.0, 1.0, 10.0, 10.0])
                .transpose(),
        )
    }

    fn q(&self, _x: &StateMean) -> StateCov {
        let mut q = StateCov::identity();
        for i in 4..7 {
            q[(i, i)] *= 0.01;
        }
        q[(6, 6)] *= 0.01;
        q
    }
}

/* -----------------------------------------------------------------------------
 * Kalman Filter
 * ----------------------------------------------------------------------------- */

/// Constant-velocity filter over center, area and aspect ratio. The aspect
/// ratio has no velocity term.
pub(crate) struct KalmanFilter {
    motion_mat: StateCov,
    update_mat: SMatrix<f32, 4, 7>,
    x: StateMean,
    covariance: StateCov,
    cov_policy: Box<dyn CovariancePolicy>,
}

impl KalmanFilter {
    pub(crate) fn new(z: &DetectBox) -> Self {
        Self::with_policy(z, Box::new(ConstantNoise))
    }

    pub(crate) fn with_policy(
        z: &DetectBox,
        cov_policy: Box<dyn CovariancePolicy>,
    ) -> Self {
        let mut motion_mat = StateCov::identity();
        for i in 0..3 {
            motion_mat[(i, i + 4)] = 1.0;
        }

        let mut update_mat = SMatrix::<f32, 4, 7>::zeros();
        for i in 0..4 {
            update_mat[(i, i)] = 1.0;
        }

        let mut x = StateMean::zeros();
        x.as_mut_slice()[0..4].copy_from_slice(z.as_slice());

        let covariance = cov_policy.init_state_cov(z);

        Self {
            motion_mat,
            update_mat,
            x,
            covariance,
            cov_policy,
        }
    }

    pub(crate) fn predict(&mut self) -> (StateMean, StateCov) {
        // a shrinking box must not be driven through zero area
        if self.x[(0, 6)] + self.x[(0, 2)] <= 0.0 {
            self.x[(0, 6)] = 0.0;
        }
        let motion_cov = self.cov_policy.q(&self.x);
        self.x = (self.motion_mat * self.x.transpose()).transpose();
        self.covariance =
            self.motion_mat * self.covariance * self.motion_mat.transpose()
                + motion_cov;

        (self.x, self.covariance)
    }

    pub(crate) fn project(&self) -> (StateHMean, StateHCov) {
        let innovation_cov = self.cov_policy.r(&self.x);
        let mean = self.x * self.update_mat.transpose();
        let covariance =
            self.update_mat * self.covariance * self.update_mat.transpose();

        (mean, covariance + innovation_cov)
    }

    pub(crate) fn update(
        &mut self,
        measurement: &DetectBox,
    ) -> Result<(StateMean, StateCov), TrackError> {
        let (projected_mean, projected_covariance) = self.project();
        let innovation_cov = self.cov_policy.r(&self.x);

        let b = (self.covariance * self.update_mat.transpose()).transpose();
        let cholesky_factor = projected_covariance
            .cholesky()
            .ok_or(TrackError::SingularCovariance)?;
        // 4x7, i.e. the transposed gain
        let kalman_gain = cholesky_factor.solve(&b);
        let innovation = measurement - projected_mean;
        self.x += innovation * kalman_gain;

        // Joseph form keeps the covariance symmetric in f32.
        let k = kalman_gain.transpose();
        let i_minus_kh = StateCov::identity() - k * self.update_mat;
        self.covariance = i_minus_kh * self.covariance * i_minus_kh.transpose()
            + k * innovation_cov * k.transpose();

        Ok((self.x, self.covariance))
    }

    pub(crate) fn state(&self) -> &StateMean {
        &self.x
    }

    pub(crate) fn covariance(&self) -> &StateCov {
        &self.covariance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nearly_eq::assert_nearly_eq;

    fn z(cx: f32, cy: f32, s: f32, r: f32) -> DetectBox {
        DetectBox::from_iterator([cx, cy, s, r])
    }

    #[test]
    fn test_init_state_cov() {
        let kf = KalmanFilter::new(&z(50.0, 50.0, 10000.0, 1.0));
        let cov = kf.covariance();

        for i in 0..4 {
            assert_nearly_eq!(cov[(i, i)], 10.0, 1e-6);
        }
        for i in 4..7 {
            assert_nearly_eq!(cov[(i, i)], 10000.0, 1e-6);
        }
        assert_eq!(kf.state().as_slice()[0..4], [50.0, 50.0, 10000.0, 1.0]);
        assert_eq!(kf.state().as_slice()[4..7], [0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_predict() {
        let mut kf = KalmanFilter::new(&z(50.0, 50.0, 10000.0, 1.0));
        let (mean, cov) = kf.predict();

        // zero initial velocity: position unchanged
        assert_eq!(mean.as_slice()[0..4], [50.0, 50.0, 10000.0, 1.0]);

        assert_nearly_eq!(cov[(0, 0)], 10011.0, 1e-2);
        assert_nearly_eq!(cov[(2, 2)], 10011.0, 1e-2);
        assert_nearly_eq!(cov[(3, 3)], 11.0, 1e-4);
        assert_nearly_eq!(cov[(0, 4)], 10000.0, 1e-2);
        assert_nearly_eq!(cov[(4, 0)], 10000.0, 1e-2);
        assert_nearly_eq!(cov[(4, 4)], 10000.01, 1e-2);
        assert_nearly_eq!(cov[(6, 6)], 10000.0001, 1e-2);
        assert_nearly_eq!(cov[(3, 4)], 0.0, 1e-6);
    }

    #[test]
    fn test_predict_twice_compounds_uncertainty() {
        let mut kf = KalmanFilter::new(&z(50.0, 50.0, 10000.0, 1.0));
        let (_, first) = kf.predict();
        let (_, second) = kf.predict();
        for i in 0..7 {
            assert!(second[(i, i)] >= first[(i, i)]);
        }
        assert!(second[(0, 0)] > first[(0, 0)]);
    }

    #[test]
    fn test_predict_clamps_negative_scale_velocity() {
        let mut kf = KalmanFilter::new(&z(50.0, 50.0, 100.0, 1.0));
        kf.x[(0, 6)] = -500.0;
        let (mean, _) = kf.predict();
        assert_eq!(mean[(0, 6)], 0.0);
        assert_eq!(mean[(0, 2)], 100.0);
    }

    #[test]
    fn test_project_shapes() {
        let kf = KalmanFilter::new(&z(1.0, 2.0, 3.0, 4.0));
        let (projected_mean, projected_cov) = kf.project();
        assert_eq!(projected_mean.as_slice(), [1.0, 2.0, 3.0, 4.0]);
        assert_nearly_eq!(projected_cov[(0, 0)], 11.0, 1e-5);
        assert_nearly_eq!(projected_cov[(2, 2)], 20.0, 1e-5);
        assert_nearly_eq!(projected_cov[(3, 3)], 20.0, 1e-5);
    }

    #[test]
    fn test_update_with_same_measurement_keeps_mean() {
        let measurement = z(50.0, 50.0, 10000.0, 1.0);
        let mut kf = KalmanFilter::new(&measurement);
        let _ = kf.predict();
        let (mean, cov) = kf.update(&measurement).unwrap();
        for (i, v) in [50.0_f32, 50.0, 10000.0, 1.0].iter().enumerate() {
            assert_nearly_eq!(mean[(0, i)], *v, 1e-2);
        }
        // correction shrinks position uncertainty
        assert!(cov[(0, 0)] < 10011.0);
        assert!(cov[(0, 0)] > 0.0);
    }

    #[test]
    fn test_update_moves_toward_measurement() {
        let mut kf = KalmanFilter::new(&z(50.0, 50.0, 10000.0, 1.0));
        let _ = kf.predict();
        let (mean, _) = kf.update(&z(60.0, 50.0, 10000.0, 1.0)).unwrap();
        assert!(mean[(0, 0)] > 55.0 && mean[(0, 0)] <= 60.0);
        // positive velocity picked up along x
        assert!(mean[(0, 4)] > 0.0);
    }

    #[test]
    fn test_constant_velocity_is_learned() {
        let mut kf = KalmanFilter::new(&z(0.0, 0.0, 400.0, 1.0));
        for step in 1..=20 {
            let _ = kf.predict();
            kf.update(&z(10.0 * step as f32, 0.0, 400.0, 1.0)).unwrap();
        }
        let (mean, _) = kf.predict();
        assert_nearly_eq!(mean[(0, 0)], 210.0, 1.0);
        assert_nearly_eq!(mean[(0, 4)], 10.0, 0.5);
    }
}
