//! 후보 심박수별 스펙트럼 전력 분포
//!
//! 각 후보 BPM의 주파수에서 `(Σ s·sin)² + (Σ s·cos)²`를 직접 합산한다.
//! 모든 연산이 입력 신호에 대해 매끄러워 그래디언트가 흐를 수 있는 형태.

use crate::core::error::{LossError, LossResult};
use ndarray::parallel::prelude::*;
use ndarray::{Array1, Array2, ArrayView2, Axis};

/// 후보 대역 하한 (BPM)
pub const BPM_LOW: usize = 40;
/// 후보 대역 상한 (BPM, 미포함)
pub const BPM_HIGH: usize = 180;
/// 후보 빈 개수
pub const BPM_BINS: usize = BPM_HIGH - BPM_LOW;

/// 대칭 Hann 창
pub fn hann_window(n: usize) -> Array1<f32> {
    if n == 1 {
        return Array1::ones(1);
    }
    Array1::from_iter((0..n).map(|i| {
        0.5 - 0.5 * (2.0 * std::f32::consts::PI * i as f32 / (n - 1) as f32).cos()
    }))
}

/// 행별 정규화 심박 전력 분포, 형상 (batch, 140)
///
/// Hann 창을 씌운 각 행에 대해 후보 BPM k의 주파수 성분 크기를 구하고
/// 행 합이 1이 되도록 정규화한다. 행 전력 합이 0이면 `NumericalDegeneracy`.
pub fn complex_absolute(batch: ArrayView2<f32>, fs: f32) -> LossResult<Array2<f32>> {
    let (rows, n) = batch.dim();
    if rows == 0 || n < 2 {
        return Err(LossError::InvalidInput("spectral transform needs (batch>=1, time>=2)".into()));
    }
    if fs <= 0.0 {
        return Err(LossError::InvalidInput(format!("sampling rate must be positive, got {fs}")));
    }

    let hann = hann_window(n);
    let unit_per_hz = fs / n as f32;
    let two_pi_over_n = 2.0 * std::f32::consts::PI / n as f32;

    let spectra: Vec<LossResult<Vec<f32>>> = batch
        .axis_iter(Axis(0))
        .into_par_iter()
        .map(|row| {
            let windowed: Vec<f32> = row.iter().zip(hann.iter()).map(|(s, w)| s * w).collect();

            let mut power = vec![0.0f32; BPM_BINS];
            for (bin, p) in power.iter_mut().enumerate() {
                let freq_hz = (BPM_LOW + bin) as f32 / 60.0;
                let k = freq_hz / unit_per_hz;
                let mut sin_sum = 0.0f32;
                let mut cos_sum = 0.0f32;
                for (t, &s) in windowed.iter().enumerate() {
                    let angle = k * two_pi_over_n * t as f32;
                    sin_sum += s * angle.sin();
                    cos_sum += s * angle.cos();
                }
                *p = sin_sum * sin_sum + cos_sum * cos_sum;
            }

            let total: f32 = power.iter().sum();
            if total <= 0.0 || !total.is_finite() {
                return Err(LossError::NumericalDegeneracy(
                    "zero spectral power over the heart-rate band".into(),
                ));
            }
            for p in power.iter_mut() {
                *p /= total;
            }
            Ok(power)
        })
        .collect();

    let mut out = Array2::<f32>::zeros((rows, BPM_BINS));
    for (i, row) in spectra.into_iter().enumerate() {
        let row = row?;
        out.row_mut(i).assign(&Array1::from(row));
    }
    Ok(out)
}
