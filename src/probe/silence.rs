//! Silence detection over 16-bit PCM
//!
//! A millisecond offset starts a silent stretch when the RMS level of the
//! following `MIN_SILENCE_MS` is at or below the threshold. Overlapping
//! stretches merge; whatever they do not cover is non-silent.

/// Sample rate the decoder is asked to produce.
pub const SAMPLE_RATE: u32 = 16_000;

/// Shortest stretch of quiet that counts as silence.
pub const MIN_SILENCE_MS: usize = 1_000;

const MAX_AMPLITUDE: f64 = 32_768.0;

/// Convert a dBFS level into a linear 16-bit amplitude.
pub fn dbfs_to_amplitude(dbfs: f64) -> f64 {
    10f64.powf(dbfs / 20.0) * MAX_AMPLITUDE
}

/// Silent ranges as `(start_ms, end_ms)` pairs, sorted and disjoint.
pub fn silent_ranges(samples: &[i16], sample_rate: u32, threshold_dbfs: f64) -> Vec<(usize, usize)> {
    let per_ms = (sample_rate / 1000).max(1) as usize;
    let length_ms = samples.len() / per_ms;
    if length_ms < MIN_SILENCE_MS {
        return vec![];
    }

    // prefix sums of squared samples for constant-time window energy
    let mut energy = Vec::with_capacity(samples.len() + 1);
    energy.push(0f64);
    for sample in samples {
        let value = f64::from(*sample);
        energy.push(energy[energy.len() - 1] + value * value);
    }

    let threshold = dbfs_to_amplitude(threshold_dbfs);
    let window = MIN_SILENCE_MS * per_ms;

    let mut ranges: Vec<(usize, usize)> = vec![];
    let mut current: Option<(usize, usize)> = None;

    for start_ms in 0..=(length_ms - MIN_SILENCE_MS) {
        let from = start_ms * per_ms;
        let rms = ((energy[from + window] - energy[from]) / window as f64).sqrt();
        if rms > threshold {
            continue;
        }

        let end_ms = start_ms + MIN_SILENCE_MS;
        current = match current {
            Some((range_start, range_end)) if start_ms <= range_end => Some((range_start, end_ms)),
            Some(range) => {
                ranges.push(range);
                Some((start_ms, end_ms))
            }
            None => Some((start_ms, end_ms)),
        };
    }
    ranges.extend(current);

    ranges
}

/// Share of the sample, in percent, that is not silent.
pub fn non_silent_percent(samples: &[i16], sample_rate: u32, threshold_dbfs: f64) -> f64 {
    let per_ms = (sample_rate / 1000).max(1) as usize;
    let length_ms = samples.len() / per_ms;
    if length_ms == 0 {
        return 0.0;
    }

    let silent: usize = silent_ranges(samples, sample_rate, threshold_dbfs)
        .iter()
        .map(|(start, end)| end - start)
        .sum();

    (length_ms.saturating_sub(silent) as f64 / length_ms as f64) * 100.0
}
