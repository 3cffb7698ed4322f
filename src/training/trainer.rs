//! 에폭 루프와 최고 검증 체크포인트
//!
//! 배치마다 zero-grad → forward → 손실 → backward → step을 수행하고,
//! 에폭이 끝날 때 검증 손실이 개선되면 체크포인트를 남긴다.
//! 손실 항 오류는 해당 스텝을 중단시키고 그대로 전파된다.

use crate::core::error::LossResult;
use crate::core::losses::{select_loss, Loss};
use crate::training::checkpoint::Checkpoint;
use crate::training::dataset::{Batch, PhysioDataset};
use crate::training::model::{Optimizer, PhysioModel};
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 학습 설정 (JSON으로 역직렬화)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainerConfig {
    pub loss_name: String,
    pub epochs: usize,
    pub batch_size: usize,
    pub learning_rate: f32,
    pub sampling_rate: f32,
    pub val_ratio: f32,
    pub split_seed: u64,
    pub checkpoint_path: PathBuf,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            loss_name: "MSE".to_string(),
            epochs: 10,
            batch_size: 128,
            learning_rate: 1.0,
            sampling_rate: 30.0,
            val_ratio: 0.2,
            split_seed: 1,
            checkpoint_path: PathBuf::from("checkpoint.bin"),
        }
    }
}

/// 학습 결과 요약
#[derive(Debug, Clone)]
pub struct TrainReport {
    pub epochs_run: usize,
    pub final_train_loss: f32,
    pub best_val_loss: f32,
    pub checkpoints_written: usize,
}

/// 학습 드라이버
#[derive(Debug)]
pub struct Trainer {
    config: TrainerConfig,
    loss: Loss,
}

impl Trainer {
    /// 손실 이름 해석은 시작 시점에 수행한다
    ///
    /// 모르는 이름이면 학습이 시작되기 전에 `ConfigurationError`로 멈춘다.
    pub fn new(config: TrainerConfig) -> LossResult<Self> {
        let loss = select_loss(&config.loss_name)?;
        Ok(Self { config, loss })
    }

    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    /// 전체 학습 실행
    pub fn run(
        &self,
        model: &mut dyn PhysioModel,
        optimizer: &mut dyn Optimizer,
        dataset: &PhysioDataset,
    ) -> Result<TrainReport> {
        let (train_idx, val_idx) = dataset.split_indices(self.config.val_ratio, self.config.split_seed);
        log::info!(
            "training on {} samples, validating on {} (loss = {})",
            train_idx.len(),
            val_idx.len(),
            self.config.loss_name
        );

        let mut best_val_loss = f32::INFINITY;
        let mut final_train_loss = 0.0f32;
        let mut checkpoints_written = 0usize;

        for epoch in 0..self.config.epochs {
            let train_batches = dataset.batches(&train_idx, self.config.batch_size);
            let bar = ProgressBar::new(train_batches.len() as u64);
            bar.set_style(ProgressStyle::default_bar());

            let mut running_loss = 0.0f32;
            for batch in &train_batches {
                optimizer.zero_grad(model);

                let predictions = model.forward(&batch.appearance, &batch.motion);
                let loss_value = self
                    .compute_loss(epoch, predictions.view(), batch.targets.view())
                    .with_context(|| format!("loss computation failed at epoch {epoch}"))?;

                let grad = self
                    .loss_gradient(epoch, &predictions, batch.targets.view())
                    .with_context(|| format!("loss gradient failed at epoch {epoch}"))?;
                model.backward(&batch.appearance, &batch.motion, grad.view());
                optimizer.step(model);

                running_loss += loss_value;
                bar.inc(1);
            }
            bar.finish_and_clear();

            final_train_loss = running_loss / train_batches.len().max(1) as f32;

            let val_loss = self.evaluate(model, dataset, &val_idx, epoch)?;
            log::info!("epoch {epoch}: train {final_train_loss:.6}, val {val_loss:.6}");

            if val_loss < best_val_loss {
                best_val_loss = val_loss;
                let checkpoint = Checkpoint::new(epoch, model.state(), optimizer.state(), val_loss);
                checkpoint.save(&self.config.checkpoint_path)?;
                checkpoints_written += 1;
                log::info!("validation improved, checkpoint written (epoch {epoch})");
            }
        }

        Ok(TrainReport {
            epochs_run: self.config.epochs,
            final_train_loss,
            best_val_loss,
            checkpoints_written,
        })
    }

    /// 검증 분할에 대한 평균 손실 (그래디언트 없음)
    pub fn evaluate(
        &self,
        model: &mut dyn PhysioModel,
        dataset: &PhysioDataset,
        indices: &[usize],
        epoch: usize,
    ) -> Result<f32> {
        let batches: Vec<Batch> = dataset.batches(indices, self.config.batch_size);
        if batches.is_empty() {
            return Ok(f32::INFINITY);
        }

        let mut total = 0.0f32;
        for batch in &batches {
            let predictions = model.forward(&batch.appearance, &batch.motion);
            total += self
                .compute_loss(epoch, predictions.view(), batch.targets.view())
                .context("validation loss computation failed")?;
        }
        Ok(total / batches.len() as f32)
    }

    /// 선택된 손실의 호출 계약에 맞춰 디스패치
    fn compute_loss(
        &self,
        epoch: usize,
        predictions: ArrayView2<f32>,
        targets: ArrayView2<f32>,
    ) -> LossResult<f32> {
        match &self.loss {
            Loss::Clgd(_) => {
                let hr = targets.column(0).to_owned();
                self.loss.forward_with_epoch(epoch, predictions, targets, hr.view())
            }
            Loss::PeakDetection(_) => {
                self.loss
                    .forward_with_rate(predictions, targets, self.config.sampling_rate, epoch)
            }
            _ => self.loss.forward(predictions, targets),
        }
    }

    /// 예측에 대한 손실 그래디언트 (중앙 차분)
    ///
    /// 손실 항마다 해석적 미분을 두는 대신 참조 구현은 수치 미분으로
    /// 통일한다. 실제 신경망 백엔드는 자체 역전파를 쓰면 된다.
    fn loss_gradient(
        &self,
        epoch: usize,
        predictions: &Array2<f32>,
        targets: ArrayView2<f32>,
    ) -> LossResult<Array2<f32>> {
        let eps = 1e-3f32;
        let mut work = predictions.clone();
        let mut grad = Array2::<f32>::zeros(predictions.raw_dim());

        for idx in 0..predictions.len() {
            let (r, c) = (idx / predictions.ncols(), idx % predictions.ncols());
            let original = work[[r, c]];

            work[[r, c]] = original + eps;
            let up = self.compute_loss(epoch, work.view(), targets)?;
            work[[r, c]] = original - eps;
            let down = self.compute_loss(epoch, work.view(), targets)?;
            work[[r, c]] = original;

            grad[[r, c]] = (up - down) / (2.0 * eps);
        }

        Ok(grad)
    }
}
