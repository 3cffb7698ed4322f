//! # 평균 편차 평활화 미분 시스템 (Mean-Deviation Smoothness)
//!
//! 수작업으로 유도한 역전파 공식을 갖는 명시적 forward/backward 연산자

pub mod smoothness;

// 테스트 모듈
#[cfg(test)]
mod __tests__;

// 재수출
pub use smoothness::{
    mean_deviation_smoothness, mean_deviation_smoothness_grad, MeanDeviationContext,
    MeanDeviationOp,
};
