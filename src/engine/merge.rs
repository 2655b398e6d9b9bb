use super::{Interrupted, StepSink};

pub(super) fn merge_sort<T, S>(a: &mut [T], sink: &mut S) -> Result<(), Interrupted>
where
    T: PartialOrd + Clone,
    S: StepSink<T> + ?Sized,
{
    if a.len() > 1 {
        let right = a.len() - 1;
        sort_range(a, 0, right, sink)?;
    }
    Ok(())
}

/// Sorts the inclusive range `left..=right`.
fn sort_range<T, S>(a: &mut [T], left: usize, right: usize, sink: &mut S) -> Result<(), Interrupted>
where
    T: PartialOrd + Clone,
    S: StepSink<T> + ?Sized,
{
    if left < right {
        let mid = left + (right - left) / 2;
        sort_range(a, left, mid, sink)?;
        sort_range(a, mid + 1, right, sink)?;
        merge(a, left, mid, right, sink)?;
    }
    Ok(())
}

/// Merge `left..=mid` with `mid+1..=right`, emitting after every write-back.
/// Ties take from the left run, which keeps the sort stable.
fn merge<T, S>(a: &mut [T], left: usize, mid: usize, right: usize, sink: &mut S) -> Result<(), Interrupted>
where
    T: PartialOrd + Clone,
    S: StepSink<T> + ?Sized,
{
    let lo = a[left..=mid].to_vec();
    let hi = a[mid + 1..=right].to_vec();
    let (mut i, mut j, mut k) = (0, 0, left);

    while i < lo.len() && j < hi.len() {
        if lo[i] <= hi[j] {
            a[k] = lo[i].clone();
            i += 1;
        } else {
            a[k] = hi[j].clone();
            j += 1;
        }
        sink.emit(a, k)?;
        k += 1;
    }
    for v in lo[i..].iter().chain(&hi[j..]) {
        a[k] = v.clone();
        sink.emit(a, k)?;
        k += 1;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testing::Recorder;
    use std::cmp::Ordering;

    /// Compares by `value` only so ties between different origins are observable.
    #[derive(Debug, Clone)]
    struct Tagged {
        value: i64,
        origin: usize,
    }

    impl PartialEq for Tagged {
        fn eq(&self, other: &Self) -> bool {
            self.value == other.value
        }
    }

    impl PartialOrd for Tagged {
        fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
            self.value.partial_cmp(&other.value)
        }
    }

    #[test]
    fn equal_values_keep_input_order() {
        let mut a: Vec<Tagged> = [2, 2, 1]
            .into_iter()
            .enumerate()
            .map(|(origin, value)| Tagged { value, origin })
            .collect();
        let mut rec = Recorder::default();
        merge_sort(&mut a, &mut rec).unwrap();

        let values: Vec<_> = a.iter().map(|t| t.value).collect();
        let origins: Vec<_> = a.iter().map(|t| t.origin).collect();
        assert_eq!(values, vec![1, 2, 2]);
        assert_eq!(origins, vec![2, 0, 1]);
    }

    #[test]
    fn every_write_back_is_a_frame() {
        let mut a = vec![5, 3, 4, 1, 2];
        let mut rec = Recorder::default();
        merge_sort(&mut a, &mut rec).unwrap();
        assert_eq!(a, vec![1, 2, 3, 4, 5]);
        // merges of sizes 2, 3, 2, 5 write back 12 elements in total
        assert_eq!(rec.highlights.len(), 12);
        assert_eq!(&rec.highlights[rec.highlights.len() - 5..], &[0, 1, 2, 3, 4]);
    }
}
