//! 음의 피어슨 상관 손실 항

use crate::core::error::LossResult;
use crate::core::signal::negative_pearson;
use ndarray::ArrayView2;

/// 기본 시간 영역 손실: `mean(1 - r)`
#[derive(Debug, Clone, Default)]
pub struct NegPearsonLoss;

impl NegPearsonLoss {
    pub fn new() -> Self {
        Self
    }

    pub fn forward(&self, predictions: ArrayView2<f32>, targets: ArrayView2<f32>) -> LossResult<f32> {
        negative_pearson(predictions, targets)
    }
}
