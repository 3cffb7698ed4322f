//! 속도 복합 손실 (시간 상관 + 피크 구조 + 미분 유사도)
//!
//! 피크 항은 미분 불가능한 검출 결과를 쓰므로 그래디언트 경로 밖의
//! 상수 항으로만 기여한다

use crate::core::error::{LossError, LossResult};
use crate::core::signal::{
    derivative_similarity, estimate_peak_frequency, find_peaks, negative_pearson, peak_values,
    statistics::validate_pair,
};
use ndarray::{ArrayView2, Axis};

/// `neg_pearson + peak_term + derivative_similarity`
#[derive(Debug, Clone)]
pub struct BvpVelocityLoss {
    /// 피크 주파수 추정에 쓰는 샘플링 레이트 (Hz)
    pub fs: f32,
    /// 피크 개수/값 차이 항의 가중치
    pub alpha: f32,
}

impl Default for BvpVelocityLoss {
    fn default() -> Self {
        Self { fs: 30.0, alpha: 0.5 }
    }
}

impl BvpVelocityLoss {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn forward(&self, predictions: ArrayView2<f32>, targets: ArrayView2<f32>) -> LossResult<f32> {
        validate_pair(&predictions, &targets)?;

        let pearson = negative_pearson(predictions, targets)?;
        let peaks = self.peak_term(targets, predictions)?;
        let derivative = derivative_similarity(predictions, targets)?;

        Ok(pearson + peaks + derivative)
    }

    /// 행별 피크 구조 비교
    ///
    /// 양의 피크와 음의 피크 각각에 대해 개수 차이와 예측 피크 값의
    /// `|1 − mean|`을 구하고, 주기도 피크 주파수 차이를 더한다.
    fn peak_term(&self, truth: ArrayView2<f32>, predictions: ArrayView2<f32>) -> LossResult<f32> {
        let batch = truth.nrows();
        let mut total = 0.0f32;

        for (t_row, p_row) in truth.axis_iter(Axis(0)).zip(predictions.axis_iter(Axis(0))) {
            let t: Vec<f32> = t_row.to_vec();
            let p: Vec<f32> = p_row.to_vec();

            let t_peaks = find_peaks(&t, None, None);
            let p_peaks = find_peaks(&p, None, None);
            let p_vals = peak_values(&p, &p_peaks);
            if p_vals.is_empty() {
                return Err(LossError::NumericalDegeneracy(
                    "no positive peaks found in prediction".into(),
                ));
            }
            let count_diff = t_peaks.len().abs_diff(p_peaks.len()) as f32;
            let value_diff = (1.0 - mean(&p_vals)).abs();

            let t_neg: Vec<f32> = t.iter().map(|x| -x).collect();
            let p_neg: Vec<f32> = p.iter().map(|x| -x).collect();
            let t_troughs = find_peaks(&t_neg, None, None);
            let p_troughs = find_peaks(&p_neg, None, None);
            // 골짜기 값은 원 신호에서 읽는다
            let p_trough_vals = peak_values(&p, &p_troughs);
            if p_trough_vals.is_empty() {
                return Err(LossError::NumericalDegeneracy(
                    "no negative peaks found in prediction".into(),
                ));
            }
            let neg_count_diff = t_troughs.len().abs_diff(p_troughs.len()) as f32;
            let neg_value_diff = (1.0 - mean(&p_trough_vals)).abs();

            let t_freq = estimate_peak_frequency(&t, self.fs)?;
            let p_freq = estimate_peak_frequency(&p, self.fs)?;
            let freq_diff = (t_freq - p_freq).abs();

            total += self.alpha * (count_diff + neg_count_diff + value_diff + neg_value_diff) + freq_diff;
        }

        Ok(total / batch as f32)
    }
}

fn mean(values: &[f32]) -> f32 {
    values.iter().sum::<f32>() / values.len() as f32
}
