//! Array input: parsing user-supplied lists and generating random arrays.
//!
//! Everything here runs before the sort core sees the data; malformed input
//! never reaches a run controller.

use crate::model::ArraySource;
use anyhow::{bail, Context, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const DEFAULT_MAX_VALUE: i64 = 100;

/// Parse a comma-separated list such as `"5, 3,4"`.
pub fn parse_array(input: &str) -> Result<Vec<i64>> {
    if input.trim().is_empty() {
        bail!("array is empty; expected comma-separated integers");
    }
    input
        .split(',')
        .enumerate()
        .map(|(i, tok)| {
            let tok = tok.trim();
            if tok.is_empty() {
                bail!("empty value at position {}", i + 1);
            }
            tok.parse::<i64>()
                .with_context(|| format!("'{tok}' at position {} is not an integer", i + 1))
        })
        .collect()
}

/// Values drawn uniformly from `1..=max_value`.
pub fn random_array<R: Rng>(size: usize, max_value: i64, rng: &mut R) -> Result<Vec<i64>> {
    if size == 0 {
        bail!("array size must be at least 1");
    }
    if max_value < 1 {
        bail!("max value must be at least 1 (got {max_value})");
    }
    Ok((0..size).map(|_| rng.gen_range(1..=max_value)).collect())
}

/// Produce a fresh array for a session. Random sources draw new values each call
/// unless seeded.
pub fn materialize(source: &ArraySource) -> Result<Vec<i64>> {
    match source {
        ArraySource::Explicit(values) => Ok(values.clone()),
        ArraySource::Random {
            size,
            max_value,
            seed: Some(seed),
        } => random_array(*size, *max_value, &mut StdRng::seed_from_u64(*seed)),
        ArraySource::Random {
            size,
            max_value,
            seed: None,
        } => random_array(*size, *max_value, &mut rand::thread_rng()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_with_whitespace_and_negatives() {
        assert_eq!(parse_array("5, 3,4 ,-1").unwrap(), vec![5, 3, 4, -1]);
        assert_eq!(parse_array("7").unwrap(), vec![7]);
    }

    #[test]
    fn rejects_malformed_lists() {
        assert!(parse_array("").is_err());
        assert!(parse_array("   ").is_err());
        assert!(parse_array("1,,2").is_err());
        assert!(parse_array("1,2,").is_err());

        let err = parse_array("1,two,3").unwrap_err();
        assert!(format!("{err:#}").contains("'two'"));
    }

    #[test]
    fn random_values_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        let values = random_array(500, 100, &mut rng).unwrap();
        assert_eq!(values.len(), 500);
        assert!(values.iter().all(|v| (1..=100).contains(v)));
    }

    #[test]
    fn random_rejects_degenerate_parameters() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(random_array(0, 100, &mut rng).is_err());
        assert!(random_array(10, 0, &mut rng).is_err());
    }

    #[test]
    fn seeded_sources_repeat() {
        let source = ArraySource::Random {
            size: 20,
            max_value: 50,
            seed: Some(42),
        };
        assert_eq!(materialize(&source).unwrap(), materialize(&source).unwrap());

        let explicit = ArraySource::Explicit(vec![3, 1]);
        assert_eq!(materialize(&explicit).unwrap(), vec![3, 1]);
    }
}
