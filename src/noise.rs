/*!
 * The plausibility filter over a field's intensity samples.
 *
 * A cart bouncing over a ditch, an operator zeroing the scale mid-pass, or a dropped GPS fix all
 * produce intensity values no crop could. Those samples are discarded, and because each sample
 * shares a boundary point with its sequence neighbors, the neighbors are discarded with it, one
 * bad endpoint contaminates both windows it participates in.
 */

use crate::segment::YieldSegment;

/**
 * Remove implausible samples and their immediate sequence neighbors.
 *
 * A sample at index i is noise when its intensity is below `min_intensity` or above
 * `max_intensity`. When i is noise, indexes i-1, i, and i+1 are all removed; neighbors falling
 * off either end of the sequence are simply ignored. The output preserves the relative order of
 * the survivors, the inputs are consumed rather than mutated.
 *
 * This is a total function, it never fails. Running it a second time over its own output changes
 * nothing, since every survivor is in range.
 */
pub fn filter_noise(
    segments: Vec<YieldSegment>,
    min_intensity: f64,
    max_intensity: f64,
) -> Vec<YieldSegment> {
    let mut noise = vec![false; segments.len()];

    for (i, segment) in segments.iter().enumerate() {
        if segment.intensity < min_intensity || segment.intensity > max_intensity {
            if i > 0 {
                noise[i - 1] = true;
            }
            noise[i] = true;
            if i + 1 < noise.len() {
                noise[i + 1] = true;
            }
        }
    }

    segments
        .into_iter()
        .zip(noise)
        .filter(|(_, is_noise)| !is_noise)
        .map(|(segment, _)| segment)
        .collect()
}
