use vani_core::config::WaveConfig;

/// Map a waveform sample array to chart points.
///
/// Pure function of its input: at most the first `max_points` samples are
/// used; index maps linearly to x across `width`, and each sample maps to
/// y by an inverse linear transform about the vertical midpoint with the
/// configured scale. Returns `None` for an empty input so the panel can
/// render its placeholder instead of a path.
pub fn sample_points(samples: &[f64], cfg: &WaveConfig) -> Option<Vec<(f64, f64)>> {
    if samples.is_empty() {
        return None;
    }

    let used = &samples[..samples.len().min(cfg.max_points)];
    let count = used.len() as f64;
    let mid = cfg.height / 2.0;

    Some(
        used.iter()
            .enumerate()
            .map(|(i, v)| (i as f64 / count * cfg.width, mid - v * cfg.scale))
            .collect(),
    )
}
