use crate::core::error::LossError;
use crate::core::losses::peak_detection::*;
use approx::assert_abs_diff_eq;
use ndarray::Array2;

/// 5개 구간으로 나눠도 구간마다 박동이 여럿 들어가는 맥파
fn pulse_signal(len: usize, freq_hz: f32, fs: f32) -> Array2<f32> {
    Array2::from_shape_fn((1, len), |(_, t)| {
        (2.0 * std::f32::consts::PI * freq_hz * t as f32 / fs).sin()
    })
}

#[test]
fn 동일_신호의_심박_오차는_0() {
    let x = pulse_signal(300, 1.5, 30.0);
    let loss = PeakDetectionLoss::new()
        .forward(x.view(), x.view(), 30.0, 15)
        .unwrap();
    assert_abs_diff_eq!(loss, 0.0, epsilon = 1e-6);
}

#[test]
fn 박자가_다르면_오차가_생긴다() {
    let target = pulse_signal(300, 1.5, 30.0);
    let pred = pulse_signal(300, 1.0, 30.0);
    let loss = PeakDetectionLoss::new()
        .forward(pred.view(), target.view(), 30.0, 15)
        .unwrap();
    assert!(loss > 0.1, "다른 박자의 상대 오차는 유의해야 함: {loss}");
}

#[test]
fn 구간_분할_불가능한_길이는_오류() {
    let x = pulse_signal(301, 1.5, 30.0);
    assert!(matches!(
        PeakDetectionLoss::new()
            .forward(x.view(), x.view(), 30.0, 15)
            .unwrap_err(),
        LossError::InvalidInput(_)
    ));
}

#[test]
fn 상수_구간은_정규화_불가() {
    let x = Array2::<f32>::ones((1, 300));
    let y = pulse_signal(300, 1.5, 30.0);
    assert!(matches!(
        PeakDetectionLoss::new()
            .forward(x.view(), y.view(), 30.0, 15)
            .unwrap_err(),
        LossError::NumericalDegeneracy(_)
    ));
}

#[test]
fn 샘플링_레이트_검증() {
    let x = pulse_signal(300, 1.5, 30.0);
    assert!(PeakDetectionLoss::new()
        .forward(x.view(), x.view(), 0.0, 15)
        .is_err());
}

#[test]
fn 원소_수_불일치는_오류() {
    let x = pulse_signal(300, 1.5, 30.0);
    let y = pulse_signal(305, 1.5, 30.0);
    assert!(PeakDetectionLoss::new()
        .forward(x.view(), y.view(), 30.0, 15)
        .is_err());
}

#[test]
fn 에폭_인자는_결과에_영향이_없다() {
    let target = pulse_signal(300, 1.5, 30.0);
    let pred = pulse_signal(300, 1.2, 30.0);
    let a = PeakDetectionLoss::new()
        .forward(pred.view(), target.view(), 30.0, 0)
        .unwrap();
    let b = PeakDetectionLoss::new()
        .forward(pred.view(), target.view(), 30.0, 20)
        .unwrap();
    assert_abs_diff_eq!(a, b, epsilon = 1e-7);
}
