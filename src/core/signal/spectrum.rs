//! 주기도(periodogram) 기반 피크 주파수 추정
//!
//! 생리적으로 유효한 심박 대역 [0.75, 2.5] Hz 안에서 최대 전력 주파수를 찾는다

use crate::core::error::{LossError, LossResult};
use ndarray::Array1;
use ndarray_stats::QuantileExt;
use rustfft::{num_complex::Complex, FftPlanner};

/// 심박 대역 하한 (Hz)
pub const HR_BAND_LOW_HZ: f32 = 0.75;
/// 심박 대역 상한 (Hz)
pub const HR_BAND_HIGH_HZ: f32 = 2.5;

/// 짧은 창에서도 대역 분해능을 보장하는 최소 FFT 길이
const MIN_NFFT: usize = 256;

/// n 이상의 2의 거듭제곱
pub fn nearest_power_of_2(n: usize) -> usize {
    n.max(1).next_power_of_two()
}

/// 단측 주기도: (주파수 Hz, 전력) 벡터 쌍
///
/// 신호를 2의 거듭제곱 길이(최소 256)로 영 패딩한 뒤 |FFT|²/(fs·N)을
/// 계산하고 내부 빈은 두 배로 접는다.
pub fn periodogram(signal: &[f32], fs: f32) -> LossResult<(Vec<f32>, Vec<f32>)> {
    if signal.is_empty() {
        return Err(LossError::InvalidInput("empty signal".into()));
    }
    if fs <= 0.0 {
        return Err(LossError::InvalidInput(format!("sampling rate must be positive, got {fs}")));
    }

    let nfft = nearest_power_of_2(signal.len()).max(MIN_NFFT);
    let mut buffer: Vec<Complex<f32>> = signal
        .iter()
        .map(|&x| Complex::new(x, 0.0))
        .chain(std::iter::repeat(Complex::new(0.0, 0.0)).take(nfft - signal.len()))
        .collect();

    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(nfft);
    fft.process(&mut buffer);

    let scale = 1.0 / (fs * nfft as f32);
    let half = nfft / 2;
    let mut freqs = Vec::with_capacity(half + 1);
    let mut power = Vec::with_capacity(half + 1);
    for k in 0..=half {
        let mut pxx = buffer[k].norm_sqr() * scale;
        if k != 0 && k != half {
            pxx *= 2.0;
        }
        freqs.push(k as f32 * fs / nfft as f32);
        power.push(pxx);
    }

    Ok((freqs, power))
}

/// 심박 대역 내 최대 전력 주파수 (Hz)
///
/// 대역 안에 주파수 빈이 하나도 없으면 `InvalidInput`
pub fn estimate_peak_frequency(signal: &[f32], fs: f32) -> LossResult<f32> {
    let (freqs, power) = periodogram(signal, fs)?;

    let mut band_freqs = Vec::new();
    let mut band_power = Vec::new();
    for (f, p) in freqs.iter().zip(power.iter()) {
        if *f >= HR_BAND_LOW_HZ && *f <= HR_BAND_HIGH_HZ {
            band_freqs.push(*f);
            band_power.push(*p);
        }
    }

    if band_freqs.is_empty() {
        return Err(LossError::InvalidInput(format!(
            "no frequency bin inside [{HR_BAND_LOW_HZ}, {HR_BAND_HIGH_HZ}] Hz at fs={fs}"
        )));
    }

    let band_power = Array1::from(band_power);
    let argmax = band_power
        .argmax()
        .map_err(|_| LossError::NumericalDegeneracy("non-comparable power spectrum".into()))?;

    Ok(band_freqs[argmax])
}
