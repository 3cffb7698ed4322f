//! 손실 파사드부터 학습 루프까지의 통합 시나리오

use anyhow::Result;
use approx::assert_abs_diff_eq;
use ndarray::Array2;
use rppg_train::training::{AdadeltaOptimizer, LinearBaseline, PhysioDataset, Trainer, TrainerConfig};
use rppg_train::{select_loss, LossError};

/// 피크 값이 정확히 ±1인 8-샘플 파형 두 행
fn two_row_pulse() -> Array2<f32> {
    ndarray::array![
        [0.0f32, 1.0, 0.0, -1.0, 0.0, 1.0, 0.0, -1.0],
        [0.0f32, 1.0, 0.0, -1.0, 0.0, 1.0, 0.0, -1.0]
    ]
}

#[test]
fn 동일_신호_시나리오() {
    let x = two_row_pulse();

    // 상관 손실은 0
    let correlation = select_loss("neg_pearson").unwrap();
    let value = correlation.forward(x.view(), x.view()).unwrap();
    assert_abs_diff_eq!(value, 0.0, epsilon = 1e-4);

    // 속도 복합 손실은 바닥값(골짜기 값 항)만 남는다
    let velocity = select_loss("BVPVelocityLoss").unwrap();
    let value = velocity.forward(x.view(), x.view()).unwrap();
    assert_abs_diff_eq!(value, 1.0, epsilon = 1e-2);
}

#[test]
fn 사인파_피크_주파수_라운드트립() {
    use rppg_train::core::signal::estimate_peak_frequency;

    let fs = 30.0f32;
    let target = 1.5f32;
    let signal: Vec<f32> = (0..90)
        .map(|t| (2.0 * std::f32::consts::PI * target * t as f32 / fs).sin())
        .collect();

    let estimated = estimate_peak_frequency(&signal, fs).unwrap();
    assert!(
        (estimated - target).abs() <= fs / 256.0,
        "{target} Hz 사인파에서 {estimated} Hz가 추정됨"
    );
}

#[test]
fn 잘못된_설정은_학습_시작_전에_실패() {
    let err = select_loss("not_a_real_loss").unwrap_err();
    assert!(matches!(err, LossError::ConfigurationError(_)));

    let config = TrainerConfig {
        loss_name: "not_a_real_loss".to_string(),
        ..TrainerConfig::default()
    };
    assert!(Trainer::new(config).is_err());
}

#[test]
fn 합성_데이터_학습_파이프라인() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let config = TrainerConfig {
        loss_name: "MSE".to_string(),
        epochs: 2,
        batch_size: 32,
        learning_rate: 1.0,
        sampling_rate: 30.0,
        val_ratio: 0.2,
        split_seed: 1,
        checkpoint_path: dir.path().join("best.bin"),
    };

    let dataset = PhysioDataset::synthetic(96, 4, 4, 11)?;
    let trainer = Trainer::new(config.clone())?;
    let mut model = LinearBaseline::new();
    let mut optimizer = AdadeltaOptimizer::new(config.learning_rate);

    let report = trainer.run(&mut model, &mut optimizer, &dataset)?;
    assert!(report.best_val_loss.is_finite());
    assert!(config.checkpoint_path.exists(), "최고 검증 체크포인트가 남아야 함");
    Ok(())
}

#[test]
fn 커리큘럼_손실_전체_경로() {
    let fs = 30.0f32;
    let bpm = 90.0f32;
    let batch = Array2::from_shape_fn((2, 128), |(r, t)| {
        (2.0 * std::f32::consts::PI * bpm / 60.0 * t as f32 / fs + r as f32 * 0.2).sin()
    });
    let labels = ndarray::Array1::from(vec![bpm, bpm]);

    let loss = select_loss("CLGDLoss").unwrap();
    let value = loss
        .forward_with_epoch(10, batch.view(), batch.view(), labels.view())
        .unwrap();
    assert!(value.is_finite() && value > 0.0);
}
