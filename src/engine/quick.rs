use super::{Interrupted, StepSink};

pub(super) fn quick_sort<T, S>(a: &mut [T], sink: &mut S) -> Result<(), Interrupted>
where
    T: PartialOrd + Clone,
    S: StepSink<T> + ?Sized,
{
    if a.len() > 1 {
        let high = a.len() - 1;
        sort_range(a, 0, high, sink)?;
    }
    Ok(())
}

/// Ranges wait on a heap stack instead of the call stack: sorted or all-equal
/// input makes every partition lopsided, so depth would grow with the length.
/// Pushing the right side first keeps the left-then-right order of frames.
fn sort_range<T, S>(a: &mut [T], low: usize, high: usize, sink: &mut S) -> Result<(), Interrupted>
where
    T: PartialOrd + Clone,
    S: StepSink<T> + ?Sized,
{
    let mut pending = vec![(low, high)];
    while let Some((low, high)) = pending.pop() {
        if low >= high {
            continue;
        }
        let p = partition(a, low, high, sink)?;
        pending.push((p + 1, high));
        if p > low {
            pending.push((low, p - 1));
        }
    }
    Ok(())
}

/// Lomuto partition around `a[high]`. Returns the pivot's final index.
fn partition<T, S>(a: &mut [T], low: usize, high: usize, sink: &mut S) -> Result<usize, Interrupted>
where
    T: PartialOrd + Clone,
    S: StepSink<T> + ?Sized,
{
    let pivot = a[high].clone();
    let mut store = low;
    for j in low..high {
        if a[j] < pivot {
            a.swap(store, j);
            store += 1;
        }
        sink.emit(a, j)?;
    }
    a.swap(store, high);
    Ok(store)
}
