//! 외형/움직임 프레임과 스칼라 라벨을 묶는 데이터셋
//!
//! (N, C, H, W) 외형·움직임 텐서와 길이 N의 라벨을 인덱스로 제공한다

use crate::core::error::{LossError, LossResult};
use ndarray::{Array1, Array2, Array4, ArrayView3, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// 학습용 미니배치
#[derive(Debug, Clone)]
pub struct Batch {
    pub appearance: Array4<f32>,
    pub motion: Array4<f32>,
    /// (batch, 1) 형상의 타깃
    pub targets: Array2<f32>,
}

/// 비디오에서 유도된 외형/움직임 샘플 모음
#[derive(Debug, Clone)]
pub struct PhysioDataset {
    appearance: Array4<f32>,
    motion: Array4<f32>,
    labels: Array1<f32>,
}

impl PhysioDataset {
    pub fn new(appearance: Array4<f32>, motion: Array4<f32>, labels: Array1<f32>) -> LossResult<Self> {
        let n = labels.len();
        if appearance.shape()[0] != n || motion.shape()[0] != n {
            return Err(LossError::InvalidInput(format!(
                "sample count mismatch: appearance {}, motion {}, labels {}",
                appearance.shape()[0],
                motion.shape()[0],
                n
            )));
        }
        if n == 0 {
            return Err(LossError::InvalidInput("empty dataset".into()));
        }
        Ok(Self {
            appearance,
            motion,
            labels,
        })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// 인덱스의 (외형, 움직임, 라벨) 삼중항
    pub fn get(&self, index: usize) -> Option<(ArrayView3<f32>, ArrayView3<f32>, f32)> {
        if index >= self.len() {
            return None;
        }
        Some((
            self.appearance.index_axis(Axis(0), index),
            self.motion.index_axis(Axis(0), index),
            self.labels[index],
        ))
    }

    /// 시드 고정 셔플로 학습/검증 인덱스를 나눈다
    pub fn split_indices(&self, val_ratio: f32, seed: u64) -> (Vec<usize>, Vec<usize>) {
        let mut indices: Vec<usize> = (0..self.len()).collect();
        let mut rng = StdRng::seed_from_u64(seed);
        indices.shuffle(&mut rng);

        let val_count = ((self.len() as f32 * val_ratio) as usize).min(self.len().saturating_sub(1));
        let val = indices.split_off(self.len() - val_count);
        (indices, val)
    }

    /// 주어진 인덱스들을 `batch_size` 단위로 묶은 미니배치 목록
    pub fn batches(&self, indices: &[usize], batch_size: usize) -> Vec<Batch> {
        indices
            .chunks(batch_size.max(1))
            .map(|chunk| {
                let appearance = self.appearance.select(Axis(0), chunk);
                let motion = self.motion.select(Axis(0), chunk);
                let mut targets = Array2::<f32>::zeros((chunk.len(), 1));
                for (row, &idx) in chunk.iter().enumerate() {
                    targets[[row, 0]] = self.labels[idx];
                }
                Batch {
                    appearance,
                    motion,
                    targets,
                }
            })
            .collect()
    }

    /// 합성 맥파 데이터셋 (데모와 테스트용)
    ///
    /// 라벨은 1.5 Hz 사인 맥파의 미분 값, 움직임 채널 평균이 라벨과
    /// 상관되도록 만든다.
    pub fn synthetic(samples: usize, height: usize, width: usize, seed: u64) -> LossResult<Self> {
        if samples == 0 {
            return Err(LossError::InvalidInput("synthetic dataset needs samples >= 1".into()));
        }
        let mut rng = StdRng::seed_from_u64(seed);
        let channels = 3;

        let mut appearance = Array4::<f32>::zeros((samples, channels, height, width));
        let mut motion = Array4::<f32>::zeros((samples, channels, height, width));
        let mut labels = Array1::<f32>::zeros(samples);

        for i in 0..samples {
            let phase = 2.0 * std::f32::consts::PI * 1.5 * i as f32 / 30.0;
            let pulse = phase.cos() * 1.5 * 2.0 * std::f32::consts::PI / 30.0;
            labels[i] = pulse;

            for c in 0..channels {
                for h in 0..height {
                    for w in 0..width {
                        appearance[[i, c, h, w]] = 0.5 + 0.1 * rng.gen::<f32>();
                        motion[[i, c, h, w]] = pulse + 0.01 * (rng.gen::<f32>() - 0.5);
                    }
                }
            }
        }

        Self::new(appearance, motion, labels)
    }
}
