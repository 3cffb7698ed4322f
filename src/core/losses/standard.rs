//! 범용 손실 카탈로그
//!
//! 파사드의 고정 이름 집합이 요구하는 표준 손실들을 동일한
//! `(predictions, targets)` 계약 위에 구현한다. 타깃 해석 규약:
//!
//! - 원소별 손실: 타깃은 예측과 같은 형상의 실수 배열
//! - 분류 손실: 행별 클래스 인덱스 = `floor(targets[row, 0])`
//! - ±1 라벨 손실: 타깃 원소의 부호를 라벨로 읽는다 (0은 +1)
//! - 쌍/삼중항 손실: 음성 예제는 타깃 행의 부호 반전 파형
//! - `gaussian_nll`: 단위 분산 가정
//!
//! `ctc`는 클래스별 로그 확률 시퀀스를 요구하므로 파형 쌍 위에서는
//! 계산할 수 없고 호출 시점에 `InvalidInput`으로 실패한다.

use crate::core::error::{LossError, LossResult};
use crate::core::signal::cos_sim;
use ndarray::{ArrayView1, ArrayView2, Axis};

/// 표준 손실 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandardKind {
    Mse,
    L1,
    Huber,
    SmoothL1,
    Bce,
    BceWithLogits,
    CrossEntropy,
    Nll,
    Nll2d,
    KlDiv,
    PoissonNll,
    GaussianNll,
    SoftMargin,
    HingeEmbedding,
    CosineEmbedding,
    MarginRanking,
    Pairwise,
    MultiMargin,
    MultiLabelMargin,
    MultiLabelSoftMargin,
    TripletMargin,
    TripletMarginDistance,
    Ctc,
}

/// 표준 손실 항
#[derive(Debug, Clone, Copy)]
pub struct StandardLoss {
    kind: StandardKind,
}

impl StandardLoss {
    pub fn new(kind: StandardKind) -> Self {
        Self { kind }
    }

    pub fn kind(&self) -> StandardKind {
        self.kind
    }

    pub fn forward(&self, predictions: ArrayView2<f32>, targets: ArrayView2<f32>) -> LossResult<f32> {
        use StandardKind::*;
        match self.kind {
            Mse => elementwise(predictions, targets, |p, t| (p - t) * (p - t)),
            L1 => elementwise(predictions, targets, |p, t| (p - t).abs()),
            Huber | SmoothL1 => elementwise(predictions, targets, |p, t| {
                let d = (p - t).abs();
                if d <= 1.0 {
                    0.5 * d * d
                } else {
                    d - 0.5
                }
            }),
            Bce => bce(predictions, targets),
            BceWithLogits => elementwise(predictions, targets, |x, t| {
                x.max(0.0) - x * t + softplus(-x.abs())
            }),
            CrossEntropy => classification(predictions, targets, |row, idx| {
                log_sum_exp(row) - row[idx]
            }),
            Nll | Nll2d => classification(predictions, targets, |row, idx| -row[idx]),
            KlDiv => elementwise(predictions, targets, |log_p, t| {
                if t > 0.0 {
                    t * (t.ln() - log_p)
                } else {
                    0.0
                }
            }),
            PoissonNll => elementwise(predictions, targets, |log_rate, t| log_rate.exp() - t * log_rate),
            GaussianNll => elementwise(predictions, targets, |p, t| 0.5 * (p - t) * (p - t)),
            SoftMargin => elementwise(predictions, targets, |x, t| softplus(-sign_label(t) * x)),
            HingeEmbedding => elementwise(predictions, targets, |x, t| {
                if sign_label(t) > 0.0 {
                    x
                } else {
                    (1.0 - x).max(0.0)
                }
            }),
            CosineEmbedding => rowwise(predictions, targets, |p, t| {
                Ok(1.0 - cos_sim(&p.to_vec(), &t.to_vec())?)
            }),
            MarginRanking => elementwise(predictions, targets, |p, t| (t - p).max(0.0)),
            Pairwise => rowwise(predictions, targets, |p, t| {
                let d: f32 = p
                    .iter()
                    .zip(t.iter())
                    .map(|(a, b)| (a - b + 1e-6) * (a - b + 1e-6))
                    .sum();
                Ok(d.sqrt())
            }),
            MultiMargin => classification(predictions, targets, |row, idx| {
                let c = row.len() as f32;
                let mut acc = 0.0f32;
                for (j, &x) in row.iter().enumerate() {
                    if j != idx {
                        acc += (1.0 - row[idx] + x).max(0.0);
                    }
                }
                acc / c
            }),
            MultiLabelMargin => multi_label_margin(predictions, targets),
            MultiLabelSoftMargin => rowwise(predictions, targets, |p, t| {
                let c = p.len() as f32;
                let acc: f32 = p
                    .iter()
                    .zip(t.iter())
                    .map(|(&x, &y)| y * softplus(-x) + (1.0 - y) * softplus(x))
                    .sum();
                Ok(acc / c)
            }),
            TripletMargin => rowwise(predictions, targets, |anchor, positive| {
                // 음성 예제는 역위상 파형
                let d_pos = euclidean(&anchor, &positive);
                let d_neg = anchor
                    .iter()
                    .zip(positive.iter())
                    .map(|(a, p)| (a + p) * (a + p))
                    .sum::<f32>()
                    .sqrt();
                Ok((d_pos - d_neg + 1.0).max(0.0))
            }),
            TripletMarginDistance => rowwise(predictions, targets, |anchor, positive| {
                let a: Vec<f32> = anchor.to_vec();
                let p: Vec<f32> = positive.to_vec();
                let n: Vec<f32> = p.iter().map(|x| -x).collect();
                let d_pos = 1.0 - cos_sim(&a, &p)?;
                let d_neg = 1.0 - cos_sim(&a, &n)?;
                Ok((d_pos - d_neg + 1.0).max(0.0))
            }),
            Ctc => Err(LossError::InvalidInput(
                "ctc loss requires per-class log-probability sequences and integer label \
                 sequences; it cannot be computed over a waveform pair"
                    .into(),
            )),
        }
    }
}

fn validate_shapes(predictions: &ArrayView2<f32>, targets: &ArrayView2<f32>) -> LossResult<()> {
    if predictions.nrows() == 0 || predictions.ncols() == 0 {
        return Err(LossError::InvalidInput("empty batch".into()));
    }
    if predictions.dim() != targets.dim() {
        return Err(LossError::InvalidInput(format!(
            "shape mismatch: predictions {:?} vs targets {:?}",
            predictions.dim(),
            targets.dim()
        )));
    }
    Ok(())
}

/// 원소별 손실의 평균
fn elementwise(
    predictions: ArrayView2<f32>,
    targets: ArrayView2<f32>,
    f: impl Fn(f32, f32) -> f32,
) -> LossResult<f32> {
    validate_shapes(&predictions, &targets)?;
    let total: f32 = predictions
        .iter()
        .zip(targets.iter())
        .map(|(&p, &t)| f(p, t))
        .sum();
    Ok(total / predictions.len() as f32)
}

/// 행별 손실의 평균
fn rowwise(
    predictions: ArrayView2<f32>,
    targets: ArrayView2<f32>,
    f: impl Fn(ArrayView1<f32>, ArrayView1<f32>) -> LossResult<f32>,
) -> LossResult<f32> {
    validate_shapes(&predictions, &targets)?;
    let mut total = 0.0f32;
    for (p, t) in predictions.axis_iter(Axis(0)).zip(targets.axis_iter(Axis(0))) {
        total += f(p, t)?;
    }
    Ok(total / predictions.nrows() as f32)
}

/// 행별 클래스 인덱스 손실의 평균 (인덱스 = floor(targets[row, 0]))
fn classification(
    predictions: ArrayView2<f32>,
    targets: ArrayView2<f32>,
    f: impl Fn(&[f32], usize) -> f32,
) -> LossResult<f32> {
    if predictions.nrows() == 0 || predictions.ncols() == 0 {
        return Err(LossError::InvalidInput("empty batch".into()));
    }
    if targets.nrows() != predictions.nrows() || targets.ncols() == 0 {
        return Err(LossError::InvalidInput(format!(
            "class targets need one row per prediction row, got {:?} for {:?}",
            targets.dim(),
            predictions.dim()
        )));
    }

    let classes = predictions.ncols();
    let mut total = 0.0f32;
    for (row, t_row) in predictions.axis_iter(Axis(0)).zip(targets.axis_iter(Axis(0))) {
        let raw = t_row[0];
        if !raw.is_finite() || raw < 0.0 || (raw.floor() as usize) >= classes {
            return Err(LossError::InvalidInput(format!(
                "class index {raw} outside [0, {classes})"
            )));
        }
        let idx = raw.floor() as usize;
        let row_vec: Vec<f32> = row.to_vec();
        total += f(&row_vec, idx);
    }
    Ok(total / predictions.nrows() as f32)
}

fn bce(predictions: ArrayView2<f32>, targets: ArrayView2<f32>) -> LossResult<f32> {
    validate_shapes(&predictions, &targets)?;
    for (&p, &t) in predictions.iter().zip(targets.iter()) {
        if !(0.0..=1.0).contains(&p) || !(0.0..=1.0).contains(&t) {
            return Err(LossError::InvalidInput(
                "bce inputs and targets must lie in [0, 1]".into(),
            ));
        }
    }
    // 로그 항은 -100으로 클램프한다
    elementwise(predictions, targets, |p, t| {
        -(t * p.ln().max(-100.0) + (1.0 - t) * (1.0 - p).ln().max(-100.0))
    })
}

fn multi_label_margin(predictions: ArrayView2<f32>, targets: ArrayView2<f32>) -> LossResult<f32> {
    validate_shapes(&predictions, &targets)?;
    let classes = predictions.ncols();
    let mut total = 0.0f32;

    for (row, t_row) in predictions.axis_iter(Axis(0)).zip(targets.axis_iter(Axis(0))) {
        // 첫 음수 값 전까지가 정답 클래스 목록
        let mut labels = Vec::new();
        for &t in t_row.iter() {
            if t < 0.0 {
                break;
            }
            let idx = t.floor() as usize;
            if idx >= classes {
                return Err(LossError::InvalidInput(format!(
                    "label class {idx} outside [0, {classes})"
                )));
            }
            labels.push(idx);
        }

        let mut acc = 0.0f32;
        for j in 0..classes {
            if labels.contains(&j) {
                continue;
            }
            for &y in &labels {
                acc += (1.0 - (row[y] - row[j])).max(0.0);
            }
        }
        total += acc / classes as f32;
    }

    Ok(total / predictions.nrows() as f32)
}

/// 수치 안정 softplus: `ln(1 + e^x)`
fn softplus(x: f32) -> f32 {
    x.max(0.0) + (-x.abs()).exp().ln_1p()
}

fn log_sum_exp(row: &[f32]) -> f32 {
    let max = row.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
    max + row.iter().map(|&x| (x - max).exp()).sum::<f32>().ln()
}

/// 타깃 부호를 ±1 라벨로 읽는다 (0은 +1)
fn sign_label(t: f32) -> f32 {
    if t < 0.0 {
        -1.0
    } else {
        1.0
    }
}

fn euclidean(a: &ArrayView1<f32>, b: &ArrayView1<f32>) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f32>()
        .sqrt()
}
