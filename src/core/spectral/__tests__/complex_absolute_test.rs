use crate::core::error::LossError;
use crate::core::spectral::complex_absolute::*;
use approx::assert_abs_diff_eq;
use ndarray::Array2;

fn sin_batch(rows: usize, len: usize, bpm: f32, fs: f32) -> Array2<f32> {
    let freq = bpm / 60.0;
    let mut batch = Array2::<f32>::zeros((rows, len));
    for r in 0..rows {
        for t in 0..len {
            batch[[r, t]] = (2.0 * std::f32::consts::PI * freq * t as f32 / fs).sin();
        }
    }
    batch
}

#[test]
fn 분포_행_합은_1() {
    let batch = sin_batch(3, 100, 90.0, 30.0);
    let dist = complex_absolute(batch.view(), 30.0).unwrap();

    assert_eq!(dist.dim(), (3, BPM_BINS));
    for row in dist.rows() {
        assert_abs_diff_eq!(row.sum(), 1.0, epsilon = 1e-4);
        for &p in row.iter() {
            assert!(p >= 0.0, "분포 값은 비음수여야 함");
        }
    }
}

#[test]
fn 사인파의_최대_빈은_심박수_근처() {
    let bpm = 90.0f32;
    let batch = sin_batch(1, 300, bpm, 30.0);
    let dist = complex_absolute(batch.view(), 30.0).unwrap();

    let row = dist.row(0);
    let argmax = row
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
        .unwrap()
        .0;

    let expected = bpm as usize - BPM_LOW;
    assert!(
        argmax.abs_diff(expected) <= 2,
        "최대 빈 {argmax}는 기대 빈 {expected}에서 2칸 안에 있어야 함"
    );
}

#[test]
fn 영_신호는_오류() {
    let batch = Array2::<f32>::zeros((2, 64));
    let err = complex_absolute(batch.view(), 30.0).unwrap_err();
    assert!(matches!(err, LossError::NumericalDegeneracy(_)));
}

#[test]
fn 잘못된_입력_검증() {
    let batch = sin_batch(1, 64, 90.0, 30.0);
    assert!(complex_absolute(batch.view(), 0.0).is_err());
    let empty = Array2::<f32>::zeros((0, 64));
    assert!(complex_absolute(empty.view(), 30.0).is_err());
}

#[test]
fn 한_윈도우_형태() {
    let w = hann_window(64);
    assert_abs_diff_eq!(w[0], 0.0, epsilon = 1e-6);
    assert_abs_diff_eq!(w[63], 0.0, epsilon = 1e-6);
    assert!(w[32] > 0.9, "창 중앙은 1에 가까워야 함");

    assert_eq!(hann_window(1).len(), 1);
}
