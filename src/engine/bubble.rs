use super::{Interrupted, StepSink};

/// Adjacent-pair passes; one frame per comparison, highlighting the lower index.
pub(super) fn bubble_sort<T, S>(a: &mut [T], sink: &mut S) -> Result<(), Interrupted>
where
    T: PartialOrd,
    S: StepSink<T> + ?Sized,
{
    let n = a.len();
    for i in 0..n.saturating_sub(1) {
        for j in 0..n - i - 1 {
            if a[j] > a[j + 1] {
                a.swap(j, j + 1);
            }
            sink.emit(a, j)?;
        }
    }
    Ok(())
}
