use fastrand::Rng;

/// Uniform in-place Fisher-Yates shuffle.
///
/// Walks from the last index down to 1, swapping each element with a
/// uniformly chosen index in `[0, i]`.
pub fn shuffle<T>(items: &mut [T], rng: &mut Rng) {
    for i in (1..items.len()).rev() {
        let j = rng.usize(0..=i);
        items.swap(i, j);
    }
}
