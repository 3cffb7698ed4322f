//! L1 + 평균 편차 평활화 복합 손실
//!
//! 구간별 심박 추정치가 배치 평균 주위로 모이도록 하는 정칙화 항을
//! 평균 편차 연산자의 벡터화 형태로 더한다

use crate::core::differential::mean_deviation_smoothness;
use crate::core::error::LossResult;
use crate::core::signal::statistics::validate_pair;
use ndarray::{Array1, ArrayView2};

/// `L1(pred, target) + λ·mean_i |pred_i − mean(pred)|`
#[derive(Debug, Clone)]
pub struct RhythmNetLoss {
    pub lambda: f32,
}

impl Default for RhythmNetLoss {
    fn default() -> Self {
        Self { lambda: 100.0 }
    }
}

impl RhythmNetLoss {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn forward(&self, predictions: ArrayView2<f32>, targets: ArrayView2<f32>) -> LossResult<f32> {
        validate_pair(&predictions, &targets)?;

        let l1 = predictions
            .iter()
            .zip(targets.iter())
            .map(|(p, t)| (p - t).abs())
            .sum::<f32>()
            / predictions.len() as f32;

        let flattened = Array1::from_iter(predictions.iter().copied());
        let smooth = mean_deviation_smoothness(flattened.view())?;

        Ok(l1 + self.lambda * smooth)
    }
}
