//! Statistical checks that every ordering of the data rows is equally likely.

use anyhow::Result;
use csvshuf::testing::{TempDirPath, TempFilePath, read_lines};
use csvshuf::{Permutation, ShuffleOptions, shuffle_file};
use mark_flaky_tests::flaky;
use std::collections::{HashMap, HashSet};

/// Chi-square critical value for 23 degrees of freedom at p = 0.00001.
const CHI2_23_CRITICAL: f64 = 63.968;

fn chi_square<K>(counts: &HashMap<K, usize>, categories: usize, samples: usize) -> f64 {
    let expected = samples as f64 / categories as f64;
    let observed: f64 = counts
        .values()
        .map(|&c| {
            let d = c as f64 - expected;
            d * d / expected
        })
        .sum();
    // Categories never observed contribute `expected` each.
    let missing = categories - counts.len();
    observed + missing as f64 * expected
}

#[test]
fn seeded_permutations_are_uniform() {
    const SAMPLES: usize = 24_000;
    let mut counts: HashMap<Vec<usize>, usize> = HashMap::new();
    for seed in 0..SAMPLES as u64 {
        let p = Permutation::generate(5, Some(seed)).into_inner();
        assert_eq!(p[0], 0);
        *counts.entry(p).or_default() += 1;
    }
    assert_eq!(counts.len(), 24, "not every ordering of 4 rows appeared");
    let chi2 = chi_square(&counts, 24, SAMPLES);
    assert!(chi2 < CHI2_23_CRITICAL, "chi-square {chi2:.2} over {SAMPLES} samples");
}

#[flaky]
#[test]
fn unseeded_permutations_are_uniform() {
    const SAMPLES: usize = 24_000;
    let mut counts: HashMap<Vec<usize>, usize> = HashMap::new();
    for _ in 0..SAMPLES {
        *counts
            .entry(Permutation::generate(5, None).into_inner())
            .or_default() += 1;
    }
    let chi2 = chi_square(&counts, 24, SAMPLES);
    assert!(chi2 < CHI2_23_CRITICAL, "chi-square {chi2:.2} over {SAMPLES} samples");
}

#[test]
fn shuffled_files_cover_all_orderings_uniformly() -> Result<()> {
    const SAMPLES: usize = 2_400;
    let input = TempFilePath::with_lines(&["H", "A", "B", "C", "D"])?;
    let dir = TempDirPath::new()?;
    let out = dir.file_path("out.csv");

    let mut counts: HashMap<Vec<String>, usize> = HashMap::new();
    for seed in 0..SAMPLES as u64 {
        shuffle_file(input.path(), &out, &ShuffleOptions::default().with_seed(seed))?;
        let mut lines = read_lines(&out)?;
        assert_eq!(lines.remove(0), "H");
        *counts.entry(lines).or_default() += 1;
    }
    assert_eq!(counts.len(), 24);
    let chi2 = chi_square(&counts, 24, SAMPLES);
    assert!(chi2 < CHI2_23_CRITICAL, "chi-square {chi2:.2} over {SAMPLES} file shuffles");
    Ok(())
}

#[test]
fn every_ordering_of_three_rows_is_reachable() -> Result<()> {
    let input = TempFilePath::with_lines(&["H", "A", "B", "C"])?;
    let dir = TempDirPath::new()?;
    let out = dir.file_path("out.csv");

    let mut seen: HashSet<Vec<String>> = HashSet::new();
    for _ in 0..500 {
        shuffle_file(input.path(), &out, &ShuffleOptions::default())?;
        let lines = read_lines(&out)?;
        assert_eq!(lines[0], "H");
        seen.insert(lines[1..].to_vec());
        if seen.len() == 6 {
            break;
        }
    }
    assert_eq!(seen.len(), 6, "reached only {seen:?}");
    Ok(())
}
