//! 피크 검출 기반 심박수 오차 손실
//!
//! 신호를 5개 구간으로 나눠 구간별 피크 간격에서 순간 심박수를 구하고
//! 기준 대비 상대 오차의 평균을 손실로 쓴다

use crate::core::error::{LossError, LossResult};
use ndarray::ArrayView2;

/// 고정 구간 수
pub const SEGMENTS: usize = 5;
/// 국소 최대 탐색 창 너비 (샘플)
pub const PEAK_WINDOW: usize = 11;

/// 구간별 상대 심박수 오차의 평균
///
/// 에폭에 따른 피크 개수 항 혼합은 계약에서 제외된 미완성 로직이라
/// 재현하지 않는다; `epoch` 인자는 호출 계약 유지를 위해 남겨 둔다.
#[derive(Debug, Clone, Default)]
pub struct PeakDetectionLoss;

impl PeakDetectionLoss {
    pub fn new() -> Self {
        Self
    }

    pub fn forward(
        &self,
        predictions: ArrayView2<f32>,
        targets: ArrayView2<f32>,
        fs: f32,
        _epoch: usize,
    ) -> LossResult<f32> {
        if fs <= 0.0 {
            return Err(LossError::InvalidInput(format!("sampling rate must be positive, got {fs}")));
        }
        if predictions.len() != targets.len() {
            return Err(LossError::InvalidInput(format!(
                "element count mismatch: predictions {} vs targets {}",
                predictions.len(),
                targets.len()
            )));
        }

        let total = predictions.len();
        if total % SEGMENTS != 0 || total / SEGMENTS < 2 {
            return Err(LossError::InvalidInput(format!(
                "signal of {total} samples cannot be split into {SEGMENTS} equal segments"
            )));
        }
        let seg_len = total / SEGMENTS;

        let pred_flat: Vec<f32> = predictions.iter().copied().collect();
        let targ_flat: Vec<f32> = targets.iter().copied().collect();

        let mut hr_score = 0.0f32;
        for seg in 0..SEGMENTS {
            let range = seg * seg_len..(seg + 1) * seg_len;
            let pred_seg = min_max_normalize(&pred_flat[range.clone()])?;
            let targ_seg = min_max_normalize(&targ_flat[range])?;

            let targ_hr = segment_heart_rate(&targ_seg, fs)?;
            let pred_hr = segment_heart_rate(&pred_seg, fs)?;

            hr_score += (targ_hr - pred_hr).abs() / targ_hr;
        }

        Ok(hr_score / SEGMENTS as f32)
    }
}

/// [0, 1] 구간으로 민-맥스 정규화
fn min_max_normalize(segment: &[f32]) -> LossResult<Vec<f32>> {
    let lo = segment.iter().cloned().fold(f32::INFINITY, f32::min);
    let hi = segment.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
    if hi == lo {
        return Err(LossError::NumericalDegeneracy("constant segment cannot be normalized".into()));
    }
    Ok(segment.iter().map(|&x| (x - lo) / (hi - lo)).collect())
}

/// 창 기반 피크 검출로 구간의 평균 순간 심박수(BPM)를 추정
fn segment_heart_rate(segment: &[f32], fs: f32) -> LossResult<f32> {
    let peaks = window_local_maxima(segment);
    if peaks.len() < 2 {
        return Err(LossError::NumericalDegeneracy(format!(
            "fewer than two accepted peaks in segment ({} found)",
            peaks.len()
        )));
    }

    let mut hr_sum = 0.0f32;
    for pair in peaks.windows(2) {
        let interval = (pair[1] - pair[0]) as f32 / fs;
        hr_sum += 60.0 / interval;
    }
    Ok(hr_sum / (peaks.len() - 1) as f32)
}

/// 너비 11 창의 최대값 자리이면서 수용 피크 평균의 절반을 넘는 샘플들
fn window_local_maxima(segment: &[f32]) -> Vec<usize> {
    let n = segment.len();
    let half = PEAK_WINDOW / 2;

    let mut candidates = Vec::new();
    for c in 0..n {
        let lo = c.saturating_sub(half);
        let hi = (c + half + 1).min(n);
        // 왼쪽 우선 argmax
        let mut best = lo;
        for i in lo + 1..hi {
            if segment[i] > segment[best] {
                best = i;
            }
        }
        if best == c {
            candidates.push(c);
        }
    }

    if candidates.is_empty() {
        return candidates;
    }

    let mean: f32 =
        candidates.iter().map(|&c| segment[c]).sum::<f32>() / candidates.len() as f32;
    let threshold = mean / 2.0;
    candidates.retain(|&c| segment[c] > threshold);
    candidates
}
