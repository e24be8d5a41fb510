//! Parallel utilities with a size threshold
//!
//! Per-element geometric queries are cheap, so the rayon fan-out only pays
//! off once the input is large enough. Below [`PARALLEL_THRESHOLD`] elements
//! every helper runs sequentially on the calling thread. Results keep the
//! input order in both modes.

use rayon::prelude::*;

/// Element count above which the helpers switch to rayon
pub const PARALLEL_THRESHOLD: usize = 100;

/// Returns `true` if a slice of `len` elements would be processed in parallel
#[inline]
pub fn should_parallelize(len: usize) -> bool {
    len > PARALLEL_THRESHOLD
}

/// Map over a slice
pub fn parallel_map<T, U, F>(data: &[T], f: F) -> Vec<U>
where
    T: Sync,
    U: Send,
    F: Fn(&T) -> U + Sync + Send,
{
    if should_parallelize(data.len()) {
        data.par_iter().map(f).collect()
    } else {
        data.iter().map(f).collect()
    }
}

/// Map with index
pub fn parallel_map_indexed<U, F>(count: usize, f: F) -> Vec<U>
where
    U: Send,
    F: Fn(usize) -> U + Sync + Send,
{
    if should_parallelize(count) {
        (0..count).into_par_iter().map(f).collect()
    } else {
        (0..count).map(f).collect()
    }
}

/// Filter_map over a slice
pub fn parallel_filter_map<T, U, F>(data: &[T], f: F) -> Vec<U>
where
    T: Sync,
    U: Send,
    F: Fn(&T) -> Option<U> + Sync + Send,
{
    if should_parallelize(data.len()) {
        data.par_iter().filter_map(f).collect()
    } else {
        data.iter().filter_map(f).collect()
    }
}

/// Enumerate and filter_map over a slice
pub fn parallel_enumerate_filter_map<T, U, F>(data: &[T], f: F) -> Vec<U>
where
    T: Sync,
    U: Send,
    F: Fn(usize, &T) -> Option<U> + Sync + Send,
{
    if should_parallelize(data.len()) {
        data.par_iter()
            .enumerate()
            .filter_map(|(i, x)| f(i, x))
            .collect()
    } else {
        data.iter()
            .enumerate()
            .filter_map(|(i, x)| f(i, x))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold() {
        assert!(!should_parallelize(PARALLEL_THRESHOLD));
        assert!(should_parallelize(PARALLEL_THRESHOLD + 1));
    }

    #[test]
    fn test_map_keeps_order_both_modes() {
        for n in [10usize, 1000] {
            let data: Vec<usize> = (0..n).collect();
            let squared = parallel_map(&data, |x| x * x);
            assert_eq!(squared.len(), n);
            assert!(squared.iter().enumerate().all(|(i, &v)| v == i * i));
        }
    }

    #[test]
    fn test_filter_map_keeps_order() {
        let data: Vec<i64> = (0..500).collect();
        let evens = parallel_filter_map(&data, |&x| (x % 2 == 0).then_some(x));
        assert_eq!(evens.len(), 250);
        assert!(evens.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_enumerate_filter_map() {
        let data = vec![1.0, -1.0, 2.0, -2.0];
        let idx = parallel_enumerate_filter_map(&data, |i, &x| (x > 0.0).then_some(i));
        assert_eq!(idx, vec![0, 2]);
    }

    #[test]
    fn test_map_indexed() {
        let v = parallel_map_indexed(300, |i| i as f64 * 0.5);
        assert_eq!(v[299], 149.5);
    }
}
