//! rPPG (remote photoplethysmography) 학습 라이브러리
//!
//! 얼굴 영상에서 혈류량 맥파(BVP)를 추정하는 모델 학습을 위한
//! 생체신호 특화 손실 함수 모음과 학습 오케스트레이션

pub mod core;
pub mod training;

// 핵심 타입들 재수출
pub use crate::core::{
    // 오류 타입
    LossError, LossResult,
    // 손실 선택 파사드
    select_loss, Loss, LOSS_NAMES,
    // 커리큘럼 스케줄
    schedule,
    // 평균 편차 연산자
    MeanDeviationOp, MeanDeviationContext,
};

pub use crate::training::{Optimizer, PhysioDataset, PhysioModel, Trainer, TrainerConfig};
