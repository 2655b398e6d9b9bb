//! Instrumented sorting procedures.
//!
//! Every algorithm mutates its slice in place and hands the current contents
//! to a [`StepSink`] after each primitive comparison or write. The sink may
//! interrupt the sort; the algorithm then returns immediately, leaving the
//! slice in the state produced by the operations applied so far.

mod bubble;
mod insertion;
mod merge;
mod quick;
mod selection;

use crate::model::AlgorithmKind;

/// Returned by a [`StepSink`] to stop the running algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interrupted;

/// Receives one frame per primitive step.
pub trait StepSink<T> {
    /// `values` is the whole array after the step; `highlight` is the index the step touched.
    fn emit(&mut self, values: &[T], highlight: usize) -> Result<(), Interrupted>;
}

/// Run `kind` over `values` to completion, emitting into `sink`.
pub fn sort_steps<T, S>(kind: AlgorithmKind, values: &mut [T], sink: &mut S) -> Result<(), Interrupted>
where
    T: PartialOrd + Clone,
    S: StepSink<T> + ?Sized,
{
    match kind {
        AlgorithmKind::Bubble => bubble::bubble_sort(values, sink),
        AlgorithmKind::Insertion => insertion::insertion_sort(values, sink),
        AlgorithmKind::Selection => selection::selection_sort(values, sink),
        AlgorithmKind::Merge => merge::merge_sort(values, sink),
        AlgorithmKind::Quick => quick::quick_sort(values, sink),
    }
}


#[cfg(test)]
mod tests {
    use super::testing::Recorder;
    use super::*;
    use proptest::prelude::*;

    fn run(kind: AlgorithmKind, input: &[i64]) -> (Vec<i64>, Recorder<i64>) {
        let mut values = input.to_vec();
        let mut rec = Recorder::default();
        sort_steps(kind, &mut values, &mut rec).unwrap();
        (values, rec)
    }

    #[test]
    fn sorts_reference_input() {
        for kind in AlgorithmKind::ALL {
            let (sorted, _) = run(kind, &[5, 3, 4, 1, 2]);
            assert_eq!(sorted, vec![1, 2, 3, 4, 5], "{kind}");
        }
    }

    #[test]
    fn tiny_inputs_emit_no_frames() {
        for kind in AlgorithmKind::ALL {
            let (sorted, rec) = run(kind, &[]);
            assert!(sorted.is_empty());
            assert!(rec.highlights.is_empty(), "{kind} emitted on empty input");

            let (sorted, rec) = run(kind, &[42]);
            assert_eq!(sorted, vec![42]);
            assert!(rec.highlights.is_empty(), "{kind} emitted on single element");
        }
    }

    #[test]
    fn traces_are_deterministic() {
        let input = [9, -4, 7, 7, 0, 3, -4, 12, 1];
        for kind in AlgorithmKind::ALL {
            let (a, ra) = run(kind, &input);
            let (b, rb) = run(kind, &input);
            assert_eq!(a, b);
            assert_eq!(ra.highlights, rb.highlights, "{kind}");
        }
    }

    #[test]
    fn interruption_stops_at_the_requested_step() {
        for kind in AlgorithmKind::ALL {
            let mut values = vec![5, 3, 4, 1, 2, 9, 0];
            let mut rec = Recorder {
                limit: Some(3),
                ..Default::default()
            };
            assert_eq!(sort_steps(kind, &mut values, &mut rec), Err(Interrupted));
            assert_eq!(rec.highlights.len(), 3, "{kind}");
        }
    }

    #[test]
    fn interrupted_array_matches_the_trace_at_that_step() {
        let input = [5, 3, 4, 1, 2, 9, 0, 7, 7, -2];
        for kind in AlgorithmKind::ALL {
            let (_, full) = run(kind, &input);
            for k in 0..full.snapshots.len() {
                let mut values = input.to_vec();
                let mut rec = Recorder {
                    limit: Some(k),
                    ..Default::default()
                };
                // frame k is refused, so the sort stops right after the write it describes
                assert_eq!(sort_steps(kind, &mut values, &mut rec), Err(Interrupted));
                assert_eq!(values, full.snapshots[k], "{kind} interrupted at step {k}");
            }
        }
    }

    proptest! {
        #[test]
        fn every_algorithm_yields_sorted_permutation(
            input in proptest::collection::vec(-1000i64..1000, 0..40),
        ) {
            let mut expected = input.clone();
            expected.sort();
            for kind in AlgorithmKind::ALL {
                let (sorted, rec) = run(kind, &input);
                prop_assert_eq!(&sorted, &expected);
                // swap-only algorithms never show a frame that is not a permutation
                if matches!(kind, AlgorithmKind::Bubble | AlgorithmKind::Selection | AlgorithmKind::Quick) {
                    for snap in &rec.snapshots {
                        let mut s = snap.clone();
                        s.sort();
                        prop_assert_eq!(&s, &expected);
                    }
                }
            }
        }
    }
}
