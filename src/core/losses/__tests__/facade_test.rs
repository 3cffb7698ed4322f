use crate::core::error::LossError;
use crate::core::losses::*;
use approx::assert_abs_diff_eq;
use ndarray::Array2;

fn sin_batch(rows: usize, len: usize) -> Array2<f32> {
    let mut batch = Array2::<f32>::zeros((rows, len));
    for r in 0..rows {
        for t in 0..len {
            batch[[r, t]] = (2.0 * std::f32::consts::PI * 1.5 * t as f32 / 30.0 + r as f32).sin();
        }
    }
    batch
}

#[test]
fn 레지스트리는_모든_이름을_만든다() {
    for name in LOSS_NAMES {
        assert!(
            select_loss(name).is_ok(),
            "등록된 이름 {name}은 생성에 성공해야 함"
        );
    }
    assert_eq!(LOSS_NAMES.len(), 30);
}

#[test]
fn 모르는_이름은_설정_오류() {
    let err = select_loss("not_a_real_loss").unwrap_err();
    match err {
        LossError::ConfigurationError(name) => assert_eq!(name, "not_a_real_loss"),
        other => panic!("ConfigurationError가 아님: {other}"),
    }
}

#[test]
fn 음의_피어슨_계약_확인() {
    let loss = select_loss("neg_pearson").unwrap();
    let x = sin_batch(2, 64);
    let value = loss.forward(x.view(), x.view()).unwrap();
    assert_abs_diff_eq!(value, 0.0, epsilon = 1e-4);

    let neg = x.mapv(|v| -v);
    let value = loss.forward(x.view(), neg.view()).unwrap();
    assert_abs_diff_eq!(value, 2.0, epsilon = 1e-4);
}

#[test]
fn 커리큘럼_손실은_단순_계약으로_부르면_오류() {
    let loss = select_loss("CLGDLoss").unwrap();
    let x = sin_batch(1, 64);
    assert!(matches!(
        loss.forward(x.view(), x.view()).unwrap_err(),
        LossError::InvalidInput(_)
    ));
}

#[test]
fn 피크_손실은_단순_계약으로_부르면_오류() {
    let loss = select_loss("PDLoss").unwrap();
    let x = sin_batch(1, 300);
    assert!(loss.forward(x.view(), x.view()).is_err());
}

#[test]
fn 확장_계약은_단순_손실로_위임() {
    let loss = select_loss("MSE").unwrap();
    let x = sin_batch(2, 32);
    let labels = ndarray::Array1::from(vec![90.0f32, 90.0]);

    let direct = loss.forward(x.view(), x.view()).unwrap();
    let with_epoch = loss
        .forward_with_epoch(3, x.view(), x.view(), labels.view())
        .unwrap();
    let with_rate = loss.forward_with_rate(x.view(), x.view(), 30.0, 3).unwrap();

    assert_abs_diff_eq!(direct, with_epoch, epsilon = 1e-7);
    assert_abs_diff_eq!(direct, with_rate, epsilon = 1e-7);
}
