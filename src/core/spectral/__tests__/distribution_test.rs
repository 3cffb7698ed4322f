use crate::core::spectral::distribution::*;
use ndarray::{Array1, Array2};

/// 주어진 빈에 질량이 몰린 140-빈 분포 행
fn peaked_distribution(rows: usize, peak_bin: usize) -> Array2<f32> {
    let mut dist = Array2::<f32>::from_elem((rows, 140), 0.001);
    for r in 0..rows {
        dist[[r, peak_bin]] = 10.0;
    }
    dist
}

#[test]
fn 라벨_빈_변환은_내림과_클리핑() {
    assert_eq!(label_to_bin(75.7, 140), 75);
    assert_eq!(label_to_bin(75.0, 140), 75);
    assert_eq!(label_to_bin(0.4, 140), 0);
    assert_eq!(label_to_bin(-3.0, 140), 0);
    assert_eq!(label_to_bin(200.0, 140), 139);
    assert_eq!(label_to_bin(139.9, 140), 139);
}

#[test]
fn 교차_엔트로피는_정답_빈에서_더_작다() {
    let dist = peaked_distribution(1, 50);
    let right = Array1::from(vec![50.0f32]);
    let wrong = Array1::from(vec![120.0f32]);

    let ce_right = frequency_cross_entropy(dist.view(), right.view()).unwrap();
    let ce_wrong = frequency_cross_entropy(dist.view(), wrong.view()).unwrap();

    assert!(
        ce_right < ce_wrong,
        "정답 빈의 CE({ce_right})가 오답 빈의 CE({ce_wrong})보다 작아야 함"
    );
}

#[test]
fn 교차_엔트로피_라벨_수_불일치는_오류() {
    let dist = peaked_distribution(2, 50);
    let labels = Array1::from(vec![50.0f32]);
    assert!(frequency_cross_entropy(dist.view(), labels.view()).is_err());
}

#[test]
fn 교차_엔트로피_비유한_라벨은_오류() {
    let dist = peaked_distribution(1, 50);
    let labels = Array1::from(vec![f32::NAN]);
    assert!(frequency_cross_entropy(dist.view(), labels.view()).is_err());
}

#[test]
fn 라벨_분포_KL은_정답_중심에서_더_작다() {
    let dist = peaked_distribution(1, 50);
    let right = Array1::from(vec![50.0f32]);
    let wrong = Array1::from(vec![120.0f32]);

    let kl_right = label_distribution_kl(dist.view(), right.view(), 1.0).unwrap();
    let kl_wrong = label_distribution_kl(dist.view(), wrong.view(), 1.0).unwrap();

    assert!(
        kl_right < kl_wrong,
        "정답 중심 KL({kl_right})이 오답 중심 KL({kl_wrong})보다 작아야 함"
    );
}

#[test]
fn 라벨_분포_KL_잘못된_표준편차는_오류() {
    let dist = peaked_distribution(1, 50);
    let labels = Array1::from(vec![50.0f32]);
    assert!(label_distribution_kl(dist.view(), labels.view(), 0.0).is_err());
    assert!(label_distribution_kl(dist.view(), labels.view(), -1.0).is_err());
}

#[test]
fn 라벨_분포_KL은_유한하다() {
    // 대역 밖 라벨도 목표 분포가 하한 처리되어 유한한 값을 낸다
    let dist = peaked_distribution(2, 10);
    let labels = Array1::from(vec![300.0f32, -50.0]);
    let kl = label_distribution_kl(dist.view(), labels.view(), 1.0).unwrap();
    assert!(kl.is_finite());
}
