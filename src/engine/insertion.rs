use super::{Interrupted, StepSink};

pub(super) fn insertion_sort<T, S>(a: &mut [T], sink: &mut S) -> Result<(), Interrupted>
where
    T: PartialOrd + Clone,
    S: StepSink<T> + ?Sized,
{
    for i in 1..a.len() {
        let key = a[i].clone();
        let mut j = i;
        while j > 0 && a[j - 1] > key {
            a[j] = a[j - 1].clone();
            // highlight the position the element was shifted from
            sink.emit(a, j - 1)?;
            j -= 1;
        }
        a[j] = key;
        sink.emit(a, j)?;
    }
    Ok(())
}
