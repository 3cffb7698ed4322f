use crate::core::differential::*;
use approx::assert_abs_diff_eq;
use ndarray::array;

#[test]
fn 순전파_평균과_같은_값은_0() {
    let all = array![1.0f32, 3.0, 5.0];
    let (loss, ctx) = MeanDeviationOp::forward(3.0, all.view(), 3).unwrap();
    assert_abs_diff_eq!(loss, 0.0, epsilon = 1e-6);
    assert_abs_diff_eq!(ctx.mean(), 3.0, epsilon = 1e-6);
}

#[test]
fn 역전파_평균에서의_그래디언트는_sign0_규약() {
    // mean([1,3,5]) = 3이고 sign(0) = 0, 나머지 교차항도 상쇄된다
    let all = array![1.0f32, 3.0, 5.0];
    let (_, ctx) = MeanDeviationOp::forward(3.0, all.view(), 3).unwrap();
    assert_abs_diff_eq!(ctx.backward(), 0.0, epsilon = 1e-4);
}

#[test]
fn 역전파_닫힌_형식_수계산_일치() {
    // all = [1, 2, 3], mean = 2
    // value=1: (1/3-1)·sign(1) + (1/3)(sign(0) + sign(-1)) = -2/3 - 1/3 = -1
    // value=2: (1/3-1)·sign(0) + (1/3)(sign(1) + sign(-1)) = 0
    // value=3: (1/3-1)·sign(-1) + (1/3)(sign(1) + sign(0)) = 2/3 + 1/3 = 1
    let all = array![1.0f32, 2.0, 3.0];
    let expected = [-1.0f32, 0.0, 1.0];

    for (value, want) in all.iter().zip(expected.iter()) {
        let (_, ctx) = MeanDeviationOp::forward(*value, all.view(), 3).unwrap();
        let grad = ctx.backward();
        assert_abs_diff_eq!(grad, *want, epsilon = 1e-4);
    }
}

#[test]
fn 역전파_중복_값은_모두_건너뛴다() {
    // all = [1, 1, 4], mean = 2; value=1의 교차항은 h=4 하나뿐
    let all = array![1.0f32, 1.0, 4.0];
    let (_, ctx) = MeanDeviationOp::forward(1.0, all.view(), 3).unwrap();
    let grad = ctx.backward();
    // (1/3-1)·sign(1) + (1/3)·sign(-2) = -2/3 - 1/3 = -1
    assert_abs_diff_eq!(grad, -1.0, epsilon = 1e-4);
}

#[test]
fn 순전파_길이_불일치는_오류() {
    let all = array![1.0f32, 2.0];
    assert!(MeanDeviationOp::forward(1.0, all.view(), 3).is_err());

    let empty = ndarray::Array1::<f32>::zeros(0);
    assert!(MeanDeviationOp::forward(1.0, empty.view(), 0).is_err());
}

#[test]
fn 벡터화_벌점_값() {
    let values = array![1.0f32, 2.0, 3.0];
    let smooth = mean_deviation_smoothness(values.view()).unwrap();
    // (|1-2| + |2-2| + |3-2|) / 3 = 2/3
    assert_abs_diff_eq!(smooth, 2.0 / 3.0, epsilon = 1e-6);
}

#[test]
fn 벡터화_그래디언트는_연산자와_일치() {
    let values = array![0.5f32, 1.5, 1.5, 4.0, -2.0];
    let t = values.len();

    let vectorized = mean_deviation_smoothness_grad(values.view()).unwrap();

    for (i, &v) in values.iter().enumerate() {
        let (_, ctx) = MeanDeviationOp::forward(v, values.view(), t).unwrap();
        let per_op = ctx.backward() / t as f32;
        assert_abs_diff_eq!(vectorized[i], per_op, epsilon = 1e-5);
    }
}

#[test]
fn 상수_벡터의_벌점은_0() {
    let values = ndarray::Array1::<f32>::from_elem(8, 2.5);
    assert_abs_diff_eq!(mean_deviation_smoothness(values.view()).unwrap(), 0.0, epsilon = 1e-6);
}
