//! 시간 MSE + 로그 스펙트럼 하이브리드 손실
//!
//! 행을 L2 정규화한 뒤 시간 손실과 전체 스펙트럼 log-PSD 차이의
//! 스케일 불변 하이브리드 항을 가중 합산한다

use crate::core::error::LossResult;
use crate::core::signal::statistics::validate_pair;
use crate::core::spectral::LOG_FLOOR;
use ndarray::{Array2, ArrayView2, Axis};
use rustfft::{num_complex::Complex, FftPlanner};

/// `α·MSE + β·[(1/n)Σdᵢ² − (λ/n²)(Σdᵢ)²]`, `dᵢ = ln PSD_pred − ln PSD_target`
#[derive(Debug, Clone)]
pub struct LstcRppgLoss {
    pub lambda: f32,
    pub alpha: f32,
    pub beta: f32,
}

impl Default for LstcRppgLoss {
    fn default() -> Self {
        Self {
            lambda: 0.2,
            alpha: 1.0,
            beta: 0.5,
        }
    }
}

impl LstcRppgLoss {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn forward(&self, predictions: ArrayView2<f32>, targets: ArrayView2<f32>) -> LossResult<f32> {
        validate_pair(&predictions, &targets)?;

        let predictions = l2_normalize_rows(&predictions);
        let targets = l2_normalize_rows(&targets);

        let diff = &predictions - &targets;
        let l_time = diff.mapv(|d| d * d).mean().unwrap_or(0.0);
        let l_frequency = self.frequency_loss(&predictions, &targets);

        Ok(self.alpha * l_time + self.beta * l_frequency)
    }

    fn frequency_loss(&self, predictions: &Array2<f32>, targets: &Array2<f32>) -> f32 {
        let (batch, n) = predictions.dim();
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(n);

        let mut total = 0.0f32;
        for (p, t) in predictions.axis_iter(Axis(0)).zip(targets.axis_iter(Axis(0))) {
            let pp = power_spectrum(&fft, &p.to_vec());
            let tt = power_spectrum(&fft, &t.to_vec());

            let mut sum_di = 0.0f32;
            let mut sum_di_sq = 0.0f32;
            for (a, b) in pp.iter().zip(tt.iter()) {
                let di = a.max(LOG_FLOOR).ln() - b.max(LOG_FLOOR).ln();
                sum_di += di;
                sum_di_sq += di * di;
            }

            let nf = n as f32;
            total += sum_di_sq / nf - self.lambda / (nf * nf) * sum_di * sum_di;
        }

        total / batch as f32
    }
}

fn power_spectrum(fft: &std::sync::Arc<dyn rustfft::Fft<f32>>, signal: &[f32]) -> Vec<f32> {
    let mut buffer: Vec<Complex<f32>> = signal.iter().map(|&x| Complex::new(x, 0.0)).collect();
    fft.process(&mut buffer);
    buffer.iter().map(|c| c.norm_sqr()).collect()
}

/// 행별 L2 정규화 (노름 하한 1e-12)
fn l2_normalize_rows(batch: &ArrayView2<f32>) -> Array2<f32> {
    let mut out = batch.to_owned();
    for mut row in out.axis_iter_mut(Axis(0)) {
        let norm = row.iter().map(|x| x * x).sum::<f32>().sqrt().max(1e-12);
        row.mapv_inplace(|x| x / norm);
    }
    out
}
