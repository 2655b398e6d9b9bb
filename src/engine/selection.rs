use super::{Interrupted, StepSink};

/// Frames track the scan position; the swap into place is silent.
pub(super) fn selection_sort<T, S>(a: &mut [T], sink: &mut S) -> Result<(), Interrupted>
where
    T: PartialOrd,
    S: StepSink<T> + ?Sized,
{
    let n = a.len();
    for i in 0..n.saturating_sub(1) {
        let mut min = i;
        for j in i + 1..n {
            if a[j] < a[min] {
                min = j;
            }
            sink.emit(a, j)?;
        }
        a.swap(i, min);
    }
    Ok(())
}
