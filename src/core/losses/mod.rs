//! # 손실 항 레지스트리 (Loss Term Registry)
//!
//! 이름 → 생성자 정적 레지스트리와 손실 객체 호출 계약

pub mod standard;
pub mod neg_pearson;
pub mod fft_loss;
pub mod lstc_rppg;
pub mod rhythmnet;
pub mod bvp_velocity;
pub mod curriculum;
pub mod peak_detection;

// 테스트 모듈
#[cfg(test)]
mod __tests__;

// 재수출
pub use standard::{StandardKind, StandardLoss};
pub use neg_pearson::NegPearsonLoss;
pub use fft_loss::FftLoss;
pub use lstc_rppg::LstcRppgLoss;
pub use rhythmnet::RhythmNetLoss;
pub use bvp_velocity::BvpVelocityLoss;
pub use curriculum::{schedule, ClgdLoss, CURRICULUM_EPOCHS};
pub use peak_detection::PeakDetectionLoss;

use crate::core::error::{LossError, LossResult};
use ndarray::{ArrayView1, ArrayView2};
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// 선택 가능한 손실 객체
///
/// 단순 항은 `forward`, 커리큘럼 손실은 `forward_with_epoch`,
/// 피크 검출 손실은 `forward_with_rate`를 쓴다.
#[derive(Debug, Clone)]
pub enum Loss {
    Standard(StandardLoss),
    NegPearson(NegPearsonLoss),
    Fft(FftLoss),
    LstcRppg(LstcRppgLoss),
    RhythmNet(RhythmNetLoss),
    BvpVelocity(BvpVelocityLoss),
    Clgd(ClgdLoss),
    PeakDetection(PeakDetectionLoss),
}

impl Loss {
    /// 단순 항 계약: `(predictions, targets) -> 스칼라`
    pub fn forward(&self, predictions: ArrayView2<f32>, targets: ArrayView2<f32>) -> LossResult<f32> {
        match self {
            Loss::Standard(l) => l.forward(predictions, targets),
            Loss::NegPearson(l) => l.forward(predictions, targets),
            Loss::Fft(l) => l.forward(predictions, targets),
            Loss::LstcRppg(l) => l.forward(predictions, targets),
            Loss::RhythmNet(l) => l.forward(predictions, targets),
            Loss::BvpVelocity(l) => l.forward(predictions, targets),
            Loss::Clgd(_) => Err(LossError::InvalidInput(
                "CLGDLoss requires epoch and heart-rate labels; use forward_with_epoch".into(),
            )),
            Loss::PeakDetection(_) => Err(LossError::InvalidInput(
                "PDLoss requires a sampling rate; use forward_with_rate".into(),
            )),
        }
    }

    /// 커리큘럼 계약: `(epoch, predictions, targets, hr_labels) -> 스칼라`
    ///
    /// 커리큘럼 손실이 아니면 단순 계약으로 위임한다.
    pub fn forward_with_epoch(
        &self,
        epoch: usize,
        predictions: ArrayView2<f32>,
        targets: ArrayView2<f32>,
        hr_labels: ArrayView1<f32>,
    ) -> LossResult<f32> {
        match self {
            Loss::Clgd(l) => l.forward(epoch, predictions, targets, hr_labels),
            _ => self.forward(predictions, targets),
        }
    }

    /// 피크 검출 계약: `(predictions, targets, fs, epoch) -> 스칼라`
    pub fn forward_with_rate(
        &self,
        predictions: ArrayView2<f32>,
        targets: ArrayView2<f32>,
        fs: f32,
        epoch: usize,
    ) -> LossResult<f32> {
        match self {
            Loss::PeakDetection(l) => l.forward(predictions, targets, fs, epoch),
            _ => self.forward(predictions, targets),
        }
    }
}

/// 설정에서 고를 수 있는 손실 이름 전체
pub const LOSS_NAMES: &[&str] = &[
    "MSE",
    "fft",
    "LSTCrPPG",
    "L1",
    "neg_pearson",
    "multi_margin",
    "bce",
    "huber",
    "cosine_embedding",
    "cross_entropy",
    "ctc",
    "bce_with_logits",
    "gaussian_nll",
    "hinge_embedding",
    "KLDiv",
    "margin_ranking",
    "multi_label_margin",
    "multi_label_soft_margin",
    "nll",
    "nll2d",
    "pairwise",
    "poisson_nll",
    "smooth_l1",
    "soft_margin",
    "triplet_margin",
    "triplet_margin_distance",
    "RhythmNetLoss",
    "BVPVelocityLoss",
    "CLGDLoss",
    "PDLoss",
];

type LossCtor = fn() -> Loss;

static REGISTRY: Lazy<HashMap<&'static str, LossCtor>> = Lazy::new(|| {
    use self::standard::StandardKind::*;
    let mut m: HashMap<&'static str, LossCtor> = HashMap::new();

    m.insert("MSE", || Loss::Standard(StandardLoss::new(Mse)));
    m.insert("L1", || Loss::Standard(StandardLoss::new(L1)));
    m.insert("huber", || Loss::Standard(StandardLoss::new(Huber)));
    m.insert("smooth_l1", || Loss::Standard(StandardLoss::new(SmoothL1)));
    m.insert("bce", || Loss::Standard(StandardLoss::new(Bce)));
    m.insert("bce_with_logits", || Loss::Standard(StandardLoss::new(BceWithLogits)));
    m.insert("cross_entropy", || Loss::Standard(StandardLoss::new(CrossEntropy)));
    m.insert("nll", || Loss::Standard(StandardLoss::new(Nll)));
    m.insert("nll2d", || Loss::Standard(StandardLoss::new(Nll2d)));
    m.insert("KLDiv", || Loss::Standard(StandardLoss::new(KlDiv)));
    m.insert("poisson_nll", || Loss::Standard(StandardLoss::new(PoissonNll)));
    m.insert("gaussian_nll", || Loss::Standard(StandardLoss::new(GaussianNll)));
    m.insert("soft_margin", || Loss::Standard(StandardLoss::new(SoftMargin)));
    m.insert("hinge_embedding", || Loss::Standard(StandardLoss::new(HingeEmbedding)));
    m.insert("cosine_embedding", || Loss::Standard(StandardLoss::new(CosineEmbedding)));
    m.insert("margin_ranking", || Loss::Standard(StandardLoss::new(MarginRanking)));
    m.insert("pairwise", || Loss::Standard(StandardLoss::new(Pairwise)));
    m.insert("multi_margin", || Loss::Standard(StandardLoss::new(MultiMargin)));
    m.insert("multi_label_margin", || Loss::Standard(StandardLoss::new(MultiLabelMargin)));
    m.insert("multi_label_soft_margin", || {
        Loss::Standard(StandardLoss::new(MultiLabelSoftMargin))
    });
    m.insert("triplet_margin", || Loss::Standard(StandardLoss::new(TripletMargin)));
    m.insert("triplet_margin_distance", || {
        Loss::Standard(StandardLoss::new(TripletMarginDistance))
    });
    m.insert("ctc", || Loss::Standard(StandardLoss::new(Ctc)));

    m.insert("neg_pearson", || Loss::NegPearson(NegPearsonLoss::new()));
    m.insert("fft", || Loss::Fft(FftLoss::new()));
    m.insert("LSTCrPPG", || Loss::LstcRppg(LstcRppgLoss::new()));
    m.insert("RhythmNetLoss", || Loss::RhythmNet(RhythmNetLoss::new()));
    m.insert("BVPVelocityLoss", || Loss::BvpVelocity(BvpVelocityLoss::new()));
    m.insert("CLGDLoss", || Loss::Clgd(ClgdLoss::new()));
    m.insert("PDLoss", || Loss::PeakDetection(PeakDetectionLoss::new()));

    m
});

/// 이름으로 손실 객체를 만든다
///
/// 모르는 이름은 경고 로그 후 `ConfigurationError`로 실패한다.
/// 학습 시작 시점에 호출해 잘못된 설정으로 학습이 진행되는 일을 막는다.
pub fn select_loss(name: &str) -> LossResult<Loss> {
    match REGISTRY.get(name) {
        Some(ctor) => Ok(ctor()),
        None => {
            log::warn!("use implemented loss functions");
            Err(LossError::ConfigurationError(name.to_string()))
        }
    }
}
