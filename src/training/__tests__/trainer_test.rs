use crate::core::error::LossError;
use crate::training::*;
use anyhow::Result;

fn small_config(dir: &std::path::Path) -> TrainerConfig {
    TrainerConfig {
        loss_name: "MSE".to_string(),
        epochs: 3,
        batch_size: 16,
        learning_rate: 1.0,
        sampling_rate: 30.0,
        val_ratio: 0.25,
        split_seed: 1,
        checkpoint_path: dir.join("checkpoint.bin"),
    }
}

#[test]
fn 모르는_손실은_시작_전에_멈춘다() {
    let config = TrainerConfig {
        loss_name: "definitely_not_a_loss".to_string(),
        ..TrainerConfig::default()
    };
    let err = Trainer::new(config).unwrap_err();
    assert!(matches!(err, LossError::ConfigurationError(_)));
}

#[test]
fn 학습_루프와_체크포인트() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let config = small_config(dir.path());

    let dataset = PhysioDataset::synthetic(64, 4, 4, 7)?;
    let mut model = LinearBaseline::new();
    let mut optimizer = AdadeltaOptimizer::new(config.learning_rate);

    let trainer = Trainer::new(config.clone())?;
    let report = trainer.run(&mut model, &mut optimizer, &dataset)?;

    assert_eq!(report.epochs_run, 3);
    assert!(report.final_train_loss.is_finite());
    assert!(report.best_val_loss.is_finite());
    assert!(report.checkpoints_written >= 1, "최소 한 번은 체크포인트가 기록되어야 함");

    // 체크포인트 라운드트립
    let checkpoint = Checkpoint::load(&config.checkpoint_path)?;
    assert!(checkpoint.epoch < 3);
    assert_eq!(checkpoint.model_state.len(), 2);
    assert!(checkpoint.val_loss.is_finite());

    let mut restored = LinearBaseline::new();
    restored.load_state(&checkpoint.model_state)?;
    assert_eq!(restored.state(), checkpoint.model_state);

    Ok(())
}

#[test]
fn 학습은_손실을_줄인다() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let mut config = small_config(dir.path());
    config.epochs = 1;

    let dataset = PhysioDataset::synthetic(128, 4, 4, 3)?;
    let (train_idx, val_idx) = dataset.split_indices(config.val_ratio, config.split_seed);
    assert!(!val_idx.is_empty());
    assert_eq!(train_idx.len() + val_idx.len(), dataset.len());

    let trainer = Trainer::new(config.clone())?;
    let mut model = LinearBaseline::new();
    let mut optimizer = AdadeltaOptimizer::new(config.learning_rate);

    let before = trainer.evaluate(&mut model, &dataset, &val_idx, 0)?;
    trainer.run(&mut model, &mut optimizer, &dataset)?;
    let after = trainer.evaluate(&mut model, &dataset, &val_idx, 0)?;

    assert!(
        after <= before,
        "한 에폭 후 검증 손실 {after}는 초기 {before} 이하여야 함"
    );
    Ok(())
}

#[test]
fn 데이터셋_인덱싱과_배치() -> Result<()> {
    let dataset = PhysioDataset::synthetic(10, 4, 4, 9)?;
    assert_eq!(dataset.len(), 10);

    let (appearance, motion, label) = dataset.get(0).unwrap();
    assert_eq!(appearance.shape(), &[3, 4, 4]);
    assert_eq!(motion.shape(), &[3, 4, 4]);
    assert!(label.is_finite());
    assert!(dataset.get(10).is_none());

    let indices: Vec<usize> = (0..10).collect();
    let batches = dataset.batches(&indices, 4);
    assert_eq!(batches.len(), 3);
    assert_eq!(batches[0].targets.dim(), (4, 1));
    assert_eq!(batches[2].targets.dim(), (2, 1));
    Ok(())
}
