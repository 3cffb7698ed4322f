//! 파형 배치에 대한 시간 영역 통계
//!
//! 피어슨 상관, 미분 유사도, 자기상관, 상호정보량

use crate::core::error::{LossError, LossResult};
use ndarray::{Array1, Array2, ArrayView2, Axis};

/// 두 배치의 형상이 (batch, time)으로 일치하고 time ≥ 2인지 검증
pub(crate) fn validate_pair(predictions: &ArrayView2<f32>, targets: &ArrayView2<f32>) -> LossResult<()> {
    if predictions.dim() != targets.dim() {
        return Err(LossError::InvalidInput(format!(
            "shape mismatch: predictions {:?} vs targets {:?}",
            predictions.dim(),
            targets.dim()
        )));
    }
    if predictions.nrows() == 0 {
        return Err(LossError::InvalidInput("empty batch".into()));
    }
    if predictions.ncols() < 2 {
        return Err(LossError::InvalidInput(format!(
            "time dimension must be >= 2, got {}",
            predictions.ncols()
        )));
    }
    Ok(())
}

/// 행별 표준화: 평균을 빼고 비편향 표준편차로 나눈다
///
/// 표준편차가 0인 행이 있으면 `NumericalDegeneracy`
pub fn standardize_rows(batch: &ArrayView2<f32>) -> LossResult<Array2<f32>> {
    let means = batch
        .mean_axis(Axis(1))
        .ok_or_else(|| LossError::InvalidInput("empty time dimension".into()))?;
    let stds = batch.std_axis(Axis(1), 1.0);

    for (row, &sd) in stds.iter().enumerate() {
        if sd == 0.0 || !sd.is_finite() {
            return Err(LossError::NumericalDegeneracy(format!(
                "zero standard deviation in row {row}"
            )));
        }
    }

    let centered = batch - &means.insert_axis(Axis(1));
    Ok(centered / &stds.insert_axis(Axis(1)))
}

/// 음의 피어슨 상관 손실
///
/// 행별로 표준화한 뒤 원시 모멘트 공식으로 피어슨 r을 구하고
/// `(1 - r)`의 배치 평균을 돌려준다. 완전 상관이면 0, 완전 역상관이면 2.
pub fn negative_pearson(predictions: ArrayView2<f32>, targets: ArrayView2<f32>) -> LossResult<f32> {
    validate_pair(&predictions, &targets)?;

    let predictions = standardize_rows(&predictions)?;
    let targets = standardize_rows(&targets)?;

    let n = predictions.ncols() as f32;
    let mut rst = 0.0f32;

    for (p, t) in predictions.axis_iter(Axis(0)).zip(targets.axis_iter(Axis(0))) {
        let sum_x: f32 = p.sum();
        let sum_y: f32 = t.sum();
        let sum_xy: f32 = p.iter().zip(t.iter()).map(|(a, b)| a * b).sum();
        let sum_x2: f32 = p.iter().map(|a| a * a).sum();
        let sum_y2: f32 = t.iter().map(|a| a * a).sum();

        let denom = ((n * sum_x2 - sum_x * sum_x) * (n * sum_y2 - sum_y * sum_y)).sqrt();
        if denom == 0.0 || !denom.is_finite() {
            return Err(LossError::NumericalDegeneracy(
                "degenerate variance in pearson denominator".into(),
            ));
        }
        let pearson = (n * sum_xy - sum_x * sum_y) / denom;
        rst += 1.0 - pearson;
    }

    Ok(rst / predictions.nrows() as f32)
}

/// 중앙 차분 기울기 (양 끝은 단방향 차분)
pub(crate) fn discrete_gradient(signal: &[f32]) -> Vec<f32> {
    let n = signal.len();
    debug_assert!(n >= 2);
    let mut grad = vec![0.0f32; n];
    grad[0] = signal[1] - signal[0];
    grad[n - 1] = signal[n - 1] - signal[n - 2];
    for i in 1..n - 1 {
        grad[i] = (signal[i + 1] - signal[i - 1]) / 2.0;
    }
    grad
}

/// 코사인 유사도
///
/// 어느 한쪽이라도 노름이 0이면 정의되지 않으므로 `NumericalDegeneracy`
pub fn cos_sim(a: &[f32], b: &[f32]) -> LossResult<f32> {
    if a.len() != b.len() {
        return Err(LossError::InvalidInput("cosine length mismatch".into()));
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return Err(LossError::NumericalDegeneracy(
            "cosine similarity of zero-norm vector".into(),
        ));
    }
    Ok(dot / (norm_a * norm_b))
}

/// 1·2차 미분 유사도 손실
///
/// 행별 1차/2차 기울기의 코사인 유사도 합을 배치 평균하고 `2 - 평균`을 반환.
/// 두 신호가 같은 궤적이면 0.
pub fn derivative_similarity(predictions: ArrayView2<f32>, targets: ArrayView2<f32>) -> LossResult<f32> {
    validate_pair(&predictions, &targets)?;

    let batch = predictions.nrows() as f32;
    let mut acc = 0.0f32;

    for (p, t) in predictions.axis_iter(Axis(0)).zip(targets.axis_iter(Axis(0))) {
        let p: Vec<f32> = p.to_vec();
        let t: Vec<f32> = t.to_vec();

        let dp = discrete_gradient(&p);
        let dt = discrete_gradient(&t);
        acc += cos_sim(&dp, &dt)?;

        let ddp = discrete_gradient(&dp);
        let ddt = discrete_gradient(&dt);
        acc += cos_sim(&ddp, &ddt)?;
    }

    Ok(2.0 - acc / batch)
}

/// 배치 자기상관 함수
///
/// 전역 평균을 제거한 지연 곱을 겹치는 구간 길이 `n - lag`로 평균낸다.
pub fn autocorrelation(batch: ArrayView2<f32>, max_lag: Option<usize>) -> LossResult<Array1<f32>> {
    let n = batch.ncols();
    if n < 2 || batch.nrows() == 0 {
        return Err(LossError::InvalidInput("autocorrelation needs (batch>=1, time>=2)".into()));
    }
    let max_lag = max_lag.unwrap_or(n / 2);
    if max_lag == 0 || max_lag >= n {
        return Err(LossError::InvalidInput(format!(
            "max_lag must be in [1, {}), got {max_lag}",
            n
        )));
    }

    let mean = batch.mean().unwrap_or(0.0);
    let mut acf = Array1::<f32>::zeros(max_lag);

    for lag in 0..max_lag {
        let mut sum = 0.0f32;
        let mut count = 0usize;
        for row in batch.axis_iter(Axis(0)) {
            for t in 0..n - lag {
                sum += (row[t] - mean) * (row[t + lag] - mean);
                count += 1;
            }
        }
        acf[lag] = sum / count as f32;
    }

    Ok(acf)
}

/// 정규화 상호정보량 (NMI)
///
/// 두 배치를 평탄화해 `num_bins` 단계의 결합 히스토그램을 만들고
/// `MI / (0.5 (H1 + H2))`를 행 수로 나눠 반환한다.
pub fn mutual_information(
    signal_a: ArrayView2<f32>,
    signal_b: ArrayView2<f32>,
    num_bins: usize,
) -> LossResult<f32> {
    validate_pair(&signal_a, &signal_b)?;
    if num_bins < 2 {
        return Err(LossError::InvalidInput("num_bins must be >= 2".into()));
    }

    let a: Vec<f32> = signal_a.iter().copied().collect();
    let b: Vec<f32> = signal_b.iter().copied().collect();

    let bin_index = |x: f32, lo: f32, hi: f32| -> LossResult<usize> {
        if hi == lo {
            return Err(LossError::NumericalDegeneracy(
                "constant signal has no histogram support".into(),
            ));
        }
        let idx = ((x - lo) / (hi - lo) * num_bins as f32) as usize;
        Ok(idx.min(num_bins - 1))
    };

    let (lo_a, hi_a) = min_max(&a);
    let (lo_b, hi_b) = min_max(&b);

    let mut joint = vec![vec![0.0f64; num_bins]; num_bins];
    for (&x, &y) in a.iter().zip(b.iter()) {
        let i = bin_index(x, lo_a, hi_a)?;
        let j = bin_index(y, lo_b, hi_b)?;
        joint[i][j] += 1.0;
    }

    // eps 평활화 후 확률화
    let eps = 1e-8f64;
    let total: f64 = a.len() as f64 + eps * (num_bins * num_bins) as f64;
    let mut p1 = vec![0.0f64; num_bins];
    let mut p2 = vec![0.0f64; num_bins];
    for i in 0..num_bins {
        for j in 0..num_bins {
            joint[i][j] = (joint[i][j] + eps) / total;
            p1[i] += joint[i][j];
            p2[j] += joint[i][j];
        }
    }

    let h1: f64 = -p1.iter().map(|p| p * p.log2()).sum::<f64>();
    let h2: f64 = -p2.iter().map(|p| p * p.log2()).sum::<f64>();

    let mut mi = 0.0f64;
    for i in 0..num_bins {
        for j in 0..num_bins {
            mi += joint[i][j] * (joint[i][j] / (p1[i] * p2[j])).log2();
        }
    }

    let nmi = mi / (0.5 * (h1 + h2));
    Ok((nmi / signal_a.nrows() as f64) as f32)
}

fn min_max(values: &[f32]) -> (f32, f32) {
    let mut lo = f32::INFINITY;
    let mut hi = f32::NEG_INFINITY;
    for &v in values {
        if v < lo {
            lo = v;
        }
        if v > hi {
            hi = v;
        }
    }
    (lo, hi)
}
