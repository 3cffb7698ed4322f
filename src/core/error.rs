//! 손실 라이브러리 오류 타입
//!
//! 수치적 전제조건 위반을 NaN 전파 대신 명시적 오류로 표면화한다

use thiserror::Error;

/// 손실 계산이 실패하는 세 가지 방식
#[derive(Debug, Error)]
pub enum LossError {
    /// 잘못된 입력 형상 (길이 0, 시간축 1, 행 수 불일치 등)
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// 수치적 퇴화 (표준편차 0, 피크 없음, 영벡터 코사인 등)
    #[error("numerical degeneracy: {0}")]
    NumericalDegeneracy(String),

    /// 알 수 없는 손실 함수 이름
    #[error("unknown loss function `{0}`")]
    ConfigurationError(String),
}

pub type LossResult<T> = Result<T, LossError>;
