//! 시간-주파수 결합 손실
//!
//! 음의 피어슨 상관에 순방향 정규화 FFT 스펙트럼의 L1 거리를 더한다

use crate::core::error::LossResult;
use crate::core::signal::{negative_pearson, statistics::validate_pair};
use ndarray::{ArrayView2, Axis};
use rustfft::{num_complex::Complex, FftPlanner};

/// `neg_pearson + L1(FFT(pred), FFT(target))`
#[derive(Debug, Clone, Default)]
pub struct FftLoss;

impl FftLoss {
    pub fn new() -> Self {
        Self
    }

    pub fn forward(&self, predictions: ArrayView2<f32>, targets: ArrayView2<f32>) -> LossResult<f32> {
        validate_pair(&predictions, &targets)?;
        let neg = negative_pearson(predictions, targets)?;

        let n = predictions.ncols();
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(n);

        let mut l1_sum = 0.0f32;
        for (p, t) in predictions.axis_iter(Axis(0)).zip(targets.axis_iter(Axis(0))) {
            let mut pb: Vec<Complex<f32>> = p.iter().map(|&x| Complex::new(x, 0.0)).collect();
            let mut tb: Vec<Complex<f32>> = t.iter().map(|&x| Complex::new(x, 0.0)).collect();
            fft.process(&mut pb);
            fft.process(&mut tb);

            // norm="forward": 1/n 스케일
            let scale = 1.0 / n as f32;
            for (pk, tk) in pb.iter().zip(tb.iter()) {
                l1_sum += ((pk - tk) * scale).norm();
            }
        }

        let l1 = l1_sum / (predictions.nrows() * n) as f32;
        Ok(l1 + neg)
    }
}
