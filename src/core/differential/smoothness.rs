//! "배치 평균으로부터의 거리" 평활화 벌점과 수작업 그래디언트
//!
//! 순전파는 `|value − mean(all_values)|`. 역전파는 자동 미분이 아니라
//! 닫힌 형식을 그대로 구현한다:
//!
//! ```text
//! grad = (1/T − 1)·sign(mean − value) + Σ_{h ≠ value} (1/T)·sign(mean − h)
//! ```
//!
//! `mean`이 `value`에 의존하는 교차항이 의도적으로 포함된 공식이며,
//! `all_values`와 `T`에는 그래디언트를 전파하지 않는다.
//! `sign(0) = 0` 규약을 따른다 (평균과 일치하는 값의 기여는 0).

use crate::core::error::{LossError, LossResult};
use ndarray::{Array1, ArrayView1};

/// `sign(0) = 0`인 부호 함수 (`f32::signum`은 0에서 ±1을 반환하므로 쓰지 않는다)
#[inline]
fn sign(x: f32) -> f32 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// 역전파에 필요한 값을 순전파 시점에 붙잡아 두는 짧은 수명의 문맥
///
/// `backward`가 소유권을 소비하므로 한 번의 역전파 후 자동 해제된다.
#[derive(Debug, Clone)]
pub struct MeanDeviationContext {
    value: f32,
    all_values: Array1<f32>,
    mean: f32,
    t: usize,
}

impl MeanDeviationContext {
    /// 붙잡힌 배치 평균
    pub fn mean(&self) -> f32 {
        self.mean
    }

    /// `value`에 대한 닫힌 형식 그래디언트를 계산하고 문맥을 해제한다
    pub fn backward(self) -> f32 {
        let t = self.t as f32;
        let mut cross = 0.0f32;
        for &h in self.all_values.iter() {
            // 원 공식은 value와 같은 값을 갖는 원소를 모두 건너뛴다
            if h != self.value {
                cross += (1.0 / t) * sign(self.mean - h);
            }
        }
        (1.0 / t - 1.0) * sign(self.mean - self.value) + cross
    }
}

/// 평균 편차 연산자
pub struct MeanDeviationOp;

impl MeanDeviationOp {
    /// 순전파: `|value − mean(all_values)|`와 역전파용 문맥을 반환
    pub fn forward(
        value: f32,
        all_values: ArrayView1<f32>,
        t: usize,
    ) -> LossResult<(f32, MeanDeviationContext)> {
        if t == 0 || all_values.is_empty() {
            return Err(LossError::InvalidInput("empty value vector".into()));
        }
        if t != all_values.len() {
            return Err(LossError::InvalidInput(format!(
                "count {t} does not match vector length {}",
                all_values.len()
            )));
        }

        let mean = all_values.sum() / t as f32;
        let loss = (value - mean).abs();
        let ctx = MeanDeviationContext {
            value,
            all_values: all_values.to_owned(),
            mean,
            t,
        };
        Ok((loss, ctx))
    }
}

/// 평탄화된 벡터 전체에 연산자를 적용한 평균 벌점
///
/// `mean_i |v_i − mean(v)|` — 원소별 스칼라 루프 대신 벡터화 형태
pub fn mean_deviation_smoothness(values: ArrayView1<f32>) -> LossResult<f32> {
    if values.is_empty() {
        return Err(LossError::InvalidInput("empty value vector".into()));
    }
    let mean = values.sum() / values.len() as f32;
    Ok(values.mapv(|v| (v - mean).abs()).sum() / values.len() as f32)
}

/// 평균 벌점의 원소별 그래디언트 (벡터화)
///
/// 각 원소 i에 대해 연산자의 닫힌 형식 그래디언트를 1/T로 평균낸 값.
/// `S = Σ_j sign(mean − v_j)`를 한 번 계산하면 원소 i의 교차항은
/// `S − m_i·sign(mean − v_i)`가 된다 (`m_i`는 v_i와 같은 값의 개수).
pub fn mean_deviation_smoothness_grad(values: ArrayView1<f32>) -> LossResult<Array1<f32>> {
    let t = values.len();
    if t == 0 {
        return Err(LossError::InvalidInput("empty value vector".into()));
    }
    let tf = t as f32;
    let mean = values.sum() / tf;

    let total_sign: f32 = values.iter().map(|&v| sign(mean - v)).sum();

    // +0.0과 -0.0이 같은 값으로 묶이도록 키를 정규화한다
    let key = |v: f32| (v + 0.0).to_bits();
    let mut counts: std::collections::HashMap<u32, usize> = std::collections::HashMap::new();
    for &v in values.iter() {
        *counts.entry(key(v)).or_insert(0) += 1;
    }

    let grads = values.mapv(|v| {
        let s = sign(mean - v);
        let dup = counts[&key(v)] as f32;
        let own = (1.0 / tf - 1.0) * s + (total_sign - dup * s) / tf;
        own / tf
    });

    Ok(grads)
}
