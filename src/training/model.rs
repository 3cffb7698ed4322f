//! 모델/옵티마이저 추상화와 참조 구현
//!
//! 실제 두 갈래(외형+움직임) 신경망은 외부 협력자다. 여기서는 학습
//! 루프가 요구하는 최소 계약과, 파이프라인 검증용 선형 기준 모델 및
//! Adadelta 옵티마이저만 둔다.

use ndarray::{Array2, Array4, ArrayView2, Axis};

/// (외형, 움직임) 배치를 파형 배치로 사상하는 모델 계약
pub trait PhysioModel {
    /// (batch, 1) 예측
    fn forward(&self, appearance: &Array4<f32>, motion: &Array4<f32>) -> Array2<f32>;

    /// 예측에 대한 손실 그래디언트를 받아 파라미터 그래디언트를 누적
    fn backward(&mut self, appearance: &Array4<f32>, motion: &Array4<f32>, grad_output: ArrayView2<f32>);

    /// 누적 그래디언트 초기화
    fn zero_grad(&mut self);

    /// 현재 파라미터 그래디언트
    fn gradients(&self) -> Vec<f32>;

    /// 파라미터에 증분을 더한다
    fn apply_update(&mut self, delta: &[f32]);

    /// 체크포인트용 파라미터 스냅샷
    fn state(&self) -> Vec<f32>;

    /// 체크포인트 복원
    fn load_state(&mut self, state: &[f32]) -> anyhow::Result<()>;
}

/// 그래디언트 초기화와 스텝만 노출하는 옵티마이저 계약
pub trait Optimizer {
    fn zero_grad(&mut self, model: &mut dyn PhysioModel);
    fn step(&mut self, model: &mut dyn PhysioModel);
    /// 체크포인트용 내부 상태 스냅샷
    fn state(&self) -> Vec<f32>;
}

/// 움직임 채널 평균에 대한 선형 회귀 기준 모델
///
/// `y = w·mean(motion) + b`
#[derive(Debug, Clone)]
pub struct LinearBaseline {
    pub weight: f32,
    pub bias: f32,
    grad_weight: f32,
    grad_bias: f32,
}

impl Default for LinearBaseline {
    fn default() -> Self {
        Self {
            weight: 0.1,
            bias: 0.0,
            grad_weight: 0.0,
            grad_bias: 0.0,
        }
    }
}

impl LinearBaseline {
    pub fn new() -> Self {
        Self::default()
    }

    fn motion_means(motion: &Array4<f32>) -> Vec<f32> {
        let batch = motion.shape()[0];
        (0..batch)
            .map(|i| {
                let sample = motion.index_axis(Axis(0), i);
                sample.mean().unwrap_or(0.0)
            })
            .collect()
    }
}

impl PhysioModel for LinearBaseline {
    fn forward(&self, _appearance: &Array4<f32>, motion: &Array4<f32>) -> Array2<f32> {
        let means = Self::motion_means(motion);
        let mut out = Array2::<f32>::zeros((means.len(), 1));
        for (i, m) in means.into_iter().enumerate() {
            out[[i, 0]] = self.weight * m + self.bias;
        }
        out
    }

    fn backward(&mut self, _appearance: &Array4<f32>, motion: &Array4<f32>, grad_output: ArrayView2<f32>) {
        let means = Self::motion_means(motion);
        for (i, m) in means.into_iter().enumerate() {
            let g = grad_output[[i, 0]];
            self.grad_weight += g * m;
            self.grad_bias += g;
        }
    }

    fn zero_grad(&mut self) {
        self.grad_weight = 0.0;
        self.grad_bias = 0.0;
    }

    fn gradients(&self) -> Vec<f32> {
        vec![self.grad_weight, self.grad_bias]
    }

    fn apply_update(&mut self, delta: &[f32]) {
        if delta.len() == 2 {
            self.weight += delta[0];
            self.bias += delta[1];
        }
    }

    fn state(&self) -> Vec<f32> {
        vec![self.weight, self.bias]
    }

    fn load_state(&mut self, state: &[f32]) -> anyhow::Result<()> {
        if state.len() != 2 {
            anyhow::bail!("LinearBaseline expects 2 parameters, got {}", state.len());
        }
        self.weight = state[0];
        self.bias = state[1];
        Ok(())
    }
}

/// Adadelta 옵티마이저
#[derive(Debug, Clone)]
pub struct AdadeltaOptimizer {
    pub learning_rate: f32,
    pub rho: f32,
    pub epsilon: f32,
    avg_sq_grad: Vec<f32>,
    avg_sq_delta: Vec<f32>,
}

impl AdadeltaOptimizer {
    pub fn new(learning_rate: f32) -> Self {
        Self {
            learning_rate,
            rho: 0.9,
            epsilon: 1e-6,
            avg_sq_grad: Vec::new(),
            avg_sq_delta: Vec::new(),
        }
    }
}

impl Optimizer for AdadeltaOptimizer {
    fn zero_grad(&mut self, model: &mut dyn PhysioModel) {
        model.zero_grad();
    }

    fn step(&mut self, model: &mut dyn PhysioModel) {
        let grads = model.gradients();
        if self.avg_sq_grad.len() != grads.len() {
            self.avg_sq_grad = vec![0.0; grads.len()];
            self.avg_sq_delta = vec![0.0; grads.len()];
        }

        let mut deltas = vec![0.0f32; grads.len()];
        for (i, &g) in grads.iter().enumerate() {
            self.avg_sq_grad[i] = self.rho * self.avg_sq_grad[i] + (1.0 - self.rho) * g * g;
            let delta = -(self.avg_sq_delta[i] + self.epsilon).sqrt()
                / (self.avg_sq_grad[i] + self.epsilon).sqrt()
                * g;
            self.avg_sq_delta[i] = self.rho * self.avg_sq_delta[i] + (1.0 - self.rho) * delta * delta;
            deltas[i] = self.learning_rate * delta;
        }

        model.apply_update(&deltas);
    }

    fn state(&self) -> Vec<f32> {
        let mut state = self.avg_sq_grad.clone();
        state.extend(&self.avg_sq_delta);
        state
    }
}
