//! 영위상 버터워스 대역통과 필터
//!
//! 2차 섹션(SOS) 직렬 연결로 설계하고 순방향-역방향으로 두 번 적용한다.
//! 손실 경로 밖의 전처리 유틸리티.

use crate::core::error::{LossError, LossResult};
use rustfft::num_complex::Complex;

/// 2차 섹션 계수 (a0 = 1 정규화)
#[derive(Debug, Clone, Copy)]
pub struct Sos {
    pub b: [f64; 3],
    pub a: [f64; 3],
}

/// 단위 차단 주파수의 버터워스 아날로그 극점 (좌반평면)
fn butter_prototype_poles(order: usize) -> Vec<Complex<f64>> {
    (0..order)
        .map(|k| {
            let theta = std::f64::consts::PI * (2 * k + order + 1) as f64 / (2 * order) as f64;
            Complex::new(theta.cos(), theta.sin())
        })
        .collect()
}

/// 켤레쌍 아날로그 극점들을 쌍선형 변환해 SOS로 묶는다
///
/// `highpass`가 참이면 영점을 z = +1에, 거짓이면 z = -1에 둔다.
fn poles_to_sos(analog_poles: &[Complex<f64>], highpass: bool) -> Vec<Sos> {
    let order = analog_poles.len();
    let mut sections = Vec::with_capacity((order + 1) / 2);

    // 극점은 k와 order-1-k가 켤레쌍, 홀수 차수면 가운데가 실수 극점
    for k in 0..order / 2 {
        let zp = bilinear(analog_poles[k]);
        let a1 = -2.0 * zp.re;
        let a2 = zp.norm_sqr();
        let (b, gain) = if highpass {
            ([1.0, -2.0, 1.0], (1.0 - a1 + a2) / 4.0)
        } else {
            ([1.0, 2.0, 1.0], (1.0 + a1 + a2) / 4.0)
        };
        sections.push(Sos {
            b: [b[0] * gain, b[1] * gain, b[2] * gain],
            a: [1.0, a1, a2],
        });
    }

    if order % 2 == 1 {
        let zp = bilinear(analog_poles[order / 2]).re;
        let a1 = -zp;
        let (b, gain) = if highpass {
            ([1.0, -1.0, 0.0], (1.0 - a1) / 2.0)
        } else {
            ([1.0, 1.0, 0.0], (1.0 + a1) / 2.0)
        };
        sections.push(Sos {
            b: [b[0] * gain, b[1] * gain, 0.0],
            a: [1.0, a1, 0.0],
        });
    }

    sections
}

fn bilinear(p: Complex<f64>) -> Complex<f64> {
    (Complex::new(1.0, 0.0) + p) / (Complex::new(1.0, 0.0) - p)
}

/// 버터워스 저역통과 SOS 설계
pub fn butter_lowpass_sos(order: usize, cutoff_hz: f32, fs: f32) -> LossResult<Vec<Sos>> {
    validate_cutoff(order, cutoff_hz, fs)?;
    let warped = (std::f64::consts::PI * cutoff_hz as f64 / fs as f64).tan();
    let poles: Vec<Complex<f64>> = butter_prototype_poles(order)
        .into_iter()
        .map(|p| p * warped)
        .collect();
    Ok(poles_to_sos(&poles, false))
}

/// 버터워스 고역통과 SOS 설계
pub fn butter_highpass_sos(order: usize, cutoff_hz: f32, fs: f32) -> LossResult<Vec<Sos>> {
    validate_cutoff(order, cutoff_hz, fs)?;
    let warped = (std::f64::consts::PI * cutoff_hz as f64 / fs as f64).tan();
    // 저역 프로토타입의 고역 변환: p -> ωc / p
    let poles: Vec<Complex<f64>> = butter_prototype_poles(order)
        .into_iter()
        .map(|p| warped / p)
        .collect();
    Ok(poles_to_sos(&poles, true))
}

fn validate_cutoff(order: usize, cutoff_hz: f32, fs: f32) -> LossResult<()> {
    if order == 0 {
        return Err(LossError::InvalidInput("filter order must be >= 1".into()));
    }
    if cutoff_hz <= 0.0 || cutoff_hz >= fs / 2.0 {
        return Err(LossError::InvalidInput(format!(
            "cutoff {cutoff_hz} Hz outside (0, {}) Hz",
            fs / 2.0
        )));
    }
    Ok(())
}

/// SOS 직렬 적용 (transposed direct form II)
pub fn sosfilt(sos: &[Sos], signal: &mut [f64]) {
    for s in sos {
        let mut z0 = 0.0f64;
        let mut z1 = 0.0f64;
        for x in signal.iter_mut() {
            let y = s.b[0] * *x + z0;
            z0 = s.b[1] * *x - s.a[1] * y + z1;
            z1 = s.b[2] * *x - s.a[2] * y;
            *x = y;
        }
    }
}

/// 영위상 버터워스 대역통과
///
/// 고역(lowcut) + 저역(highcut) SOS 직렬로 대역을 만들고, 홀수 반사로
/// 가장자리를 패딩한 뒤 순방향-역방향 필터링한다. 과도 응답은 패딩
/// 구간에서 소멸한다.
pub fn bandpass_filter(
    signal: &[f32],
    lowcut_hz: f32,
    highcut_hz: f32,
    fs: f32,
    order: usize,
) -> LossResult<Vec<f32>> {
    if lowcut_hz >= highcut_hz {
        return Err(LossError::InvalidInput(format!(
            "band edges must satisfy low < high, got [{lowcut_hz}, {highcut_hz}]"
        )));
    }

    let mut sos = butter_highpass_sos(order, lowcut_hz, fs)?;
    sos.extend(butter_lowpass_sos(order, highcut_hz, fs)?);

    let n = signal.len();
    let padlen = 3 * (2 * sos.len() + 1);
    if n <= padlen {
        return Err(LossError::InvalidInput(format!(
            "signal length {n} too short for zero-phase filtering (needs > {padlen})"
        )));
    }

    // 홀수 반사 패딩: 2·x[edge] - x[mirror]
    let first = signal[0] as f64;
    let last = signal[n - 1] as f64;
    let mut ext: Vec<f64> = Vec::with_capacity(n + 2 * padlen);
    for i in 0..padlen {
        ext.push(2.0 * first - signal[padlen - i] as f64);
    }
    ext.extend(signal.iter().map(|&x| x as f64));
    for i in 0..padlen {
        ext.push(2.0 * last - signal[n - 2 - i] as f64);
    }

    sosfilt(&sos, &mut ext);
    ext.reverse();
    sosfilt(&sos, &mut ext);
    ext.reverse();

    Ok(ext[padlen..padlen + n].iter().map(|&x| x as f32).collect())
}
