//! 분포 매칭 손실: 주파수 교차 엔트로피와 라벨 분포 KL 발산
//!
//! 심박수 라벨은 내림(floor)으로 빈 인덱스화한다

use crate::core::error::{LossError, LossResult};
use ndarray::{ArrayView1, ArrayView2, Axis};

/// log(0) 방지용 하한
pub const LOG_FLOOR: f32 = 1e-15;

/// BPM 라벨 → 빈 인덱스 (내림 후 [0, bins) 클리핑)
pub fn label_to_bin(hr: f32, bins: usize) -> usize {
    let idx = hr.floor();
    if idx <= 0.0 {
        0
    } else {
        (idx as usize).min(bins - 1)
    }
}

/// 수치 안정 log-softmax
fn log_softmax(row: ArrayView1<f32>) -> Vec<f32> {
    let max = row.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
    let log_sum: f32 = row.iter().map(|&x| (x - max).exp()).sum::<f32>().ln();
    row.iter().map(|&x| x - max - log_sum).collect()
}

fn validate_labels(distribution: &ArrayView2<f32>, hr_labels: &ArrayView1<f32>) -> LossResult<()> {
    if distribution.nrows() == 0 || distribution.ncols() == 0 {
        return Err(LossError::InvalidInput("empty distribution".into()));
    }
    if hr_labels.len() != distribution.nrows() {
        return Err(LossError::InvalidInput(format!(
            "{} labels for {} distribution rows",
            hr_labels.len(),
            distribution.nrows()
        )));
    }
    Ok(())
}

/// 주파수 교차 엔트로피
///
/// 정규화 분포를 로짓으로 취급해 행별 `-log_softmax[label]`을 평균한다.
pub fn frequency_cross_entropy(
    distribution: ArrayView2<f32>,
    hr_labels: ArrayView1<f32>,
) -> LossResult<f32> {
    validate_labels(&distribution, &hr_labels)?;

    let bins = distribution.ncols();
    let mut total = 0.0f32;
    for (row, &hr) in distribution.axis_iter(Axis(0)).zip(hr_labels.iter()) {
        if !hr.is_finite() {
            return Err(LossError::InvalidInput(format!("non-finite heart-rate label {hr}")));
        }
        let idx = label_to_bin(hr, bins);
        let ls = log_softmax(row);
        total += -ls[idx];
    }
    Ok(total / distribution.nrows() as f32)
}

/// 라벨 분포 KL 발산 (batchmean)
///
/// 라벨 중심의 가우시안 목표 분포 `t`와 행의 log-softmax `ls`에 대해
/// `Σ t·(ln t − ls)`를 행별로 구해 평균한다. `t`는 ln 앞에서 1e-15로
/// 하한 처리한다.
pub fn label_distribution_kl(
    distribution: ArrayView2<f32>,
    hr_labels: ArrayView1<f32>,
    std: f32,
) -> LossResult<f32> {
    validate_labels(&distribution, &hr_labels)?;
    if std <= 0.0 {
        return Err(LossError::InvalidInput(format!("gaussian std must be positive, got {std}")));
    }

    let bins = distribution.ncols();
    let norm = 1.0 / ((2.0 * std::f32::consts::PI).sqrt() * std);
    let mut total = 0.0f32;

    for (row, &hr) in distribution.axis_iter(Axis(0)).zip(hr_labels.iter()) {
        if !hr.is_finite() {
            return Err(LossError::InvalidInput(format!("non-finite heart-rate label {hr}")));
        }
        let center = hr.floor();
        let ls = log_softmax(row);

        let mut kl = 0.0f32;
        for i in 0..bins {
            let d = i as f32 - center;
            let t = (norm * (-d * d / (2.0 * std * std)).exp()).max(LOG_FLOOR);
            kl += t * (t.ln() - ls[i]);
        }
        total += kl;
    }

    Ok(total / distribution.nrows() as f32)
}
