//! # 학습 오케스트레이션 (Training Orchestration)
//!
//! 데이터셋/모델/옵티마이저 추상화와 에폭 루프, 최고 검증 체크포인트

pub mod dataset;
pub mod model;
pub mod trainer;
pub mod checkpoint;

// 테스트 모듈
#[cfg(test)]
mod __tests__;

// 재수출
pub use dataset::{Batch, PhysioDataset};
pub use model::{AdadeltaOptimizer, LinearBaseline, Optimizer, PhysioModel};
pub use trainer::{TrainReport, Trainer, TrainerConfig};
pub use checkpoint::Checkpoint;
