//! 국소 최대값 기반 피크 검출
//!
//! 최소 높이/최소 간격 필터를 지원하는 결정적 검출기

/// 국소 최대값 인덱스를 오름차순으로 반환
///
/// * `min_height` - 이 값 미만의 피크는 버린다
/// * `min_distance` - 가까운 피크 중 높은 쪽을 남긴다 (동률이면 왼쪽 우선)
///
/// 평탄 구간(plateau) 최대값은 왼쪽 가장자리 샘플로 귀속된다.
pub fn find_peaks(signal: &[f32], min_height: Option<f32>, min_distance: Option<usize>) -> Vec<usize> {
    let n = signal.len();
    if n < 3 {
        return Vec::new();
    }

    let mut candidates: Vec<usize> = Vec::new();
    let mut i = 1;
    while i < n - 1 {
        if signal[i] > signal[i - 1] {
            // 평탄 구간의 끝을 찾는다
            let mut j = i;
            while j + 1 < n && signal[j + 1] == signal[i] {
                j += 1;
            }
            if j + 1 < n && signal[j + 1] < signal[i] {
                candidates.push(i);
            }
            i = j + 1;
        } else {
            i += 1;
        }
    }

    if let Some(height) = min_height {
        candidates.retain(|&p| signal[p] >= height);
    }

    if let Some(distance) = min_distance {
        if distance > 1 {
            candidates = enforce_distance(signal, candidates, distance);
        }
    }

    candidates
}

/// 높이 내림차순(동률은 왼쪽 우선)으로 수용하며 간격 제약을 적용
fn enforce_distance(signal: &[f32], candidates: Vec<usize>, distance: usize) -> Vec<usize> {
    let mut order: Vec<usize> = (0..candidates.len()).collect();
    order.sort_by(|&a, &b| {
        signal[candidates[b]]
            .partial_cmp(&signal[candidates[a]])
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(candidates[a].cmp(&candidates[b]))
    });

    let mut keep = vec![true; candidates.len()];
    for &k in &order {
        if !keep[k] {
            continue;
        }
        let p = candidates[k];
        for (other, &q) in candidates.iter().enumerate() {
            if other != k && keep[other] && q.abs_diff(p) < distance {
                keep[other] = false;
            }
        }
    }

    candidates
        .into_iter()
        .enumerate()
        .filter(|(k, _)| keep[*k])
        .map(|(_, p)| p)
        .collect()
}

/// 피크 인덱스들의 신호 값
pub fn peak_values(signal: &[f32], peaks: &[usize]) -> Vec<f32> {
    peaks.iter().map(|&p| signal[p]).collect()
}
