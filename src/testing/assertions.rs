//! Assertions for checking shuffled output against its input.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

/// Assert that two collections contain the same elements with the same
/// multiplicities, ignoring order.
///
/// # Panics
///
/// Panics if the collections differ in length or content.
///
/// # Example
///
/// ```
/// use csvshuf::testing::assert_same_multiset;
///
/// assert_same_multiset(&["b", "a", "a"], &["a", "b", "a"]);
/// ```
pub fn assert_same_multiset<T: Debug + Eq + Hash>(actual: &[T], expected: &[T]) {
    assert_eq!(
        actual.len(),
        expected.len(),
        "Collection length mismatch:\n  Expected length: {}\n  Actual length: {}\n  Expected: {expected:?}\n  Actual: {actual:?}",
        expected.len(),
        actual.len()
    );

    let mut counts: HashMap<&T, i64> = HashMap::new();
    for e in expected {
        *counts.entry(e).or_default() += 1;
    }
    for a in actual {
        *counts.entry(a).or_default() -= 1;
    }

    let mut missing: Vec<&T> = Vec::new();
    let mut extra: Vec<&T> = Vec::new();
    for (item, c) in counts {
        if c > 0 {
            missing.push(item);
        } else if c < 0 {
            extra.push(item);
        }
    }
    assert!(
        missing.is_empty() && extra.is_empty(),
        "Collection content mismatch:\n  Missing elements: {missing:?}\n  Extra elements: {extra:?}\n  Expected: {expected:?}\n  Actual: {actual:?}"
    );
}

/// Assert that `output` is `input` with its header kept first and the data
/// rows reordered.
///
/// # Panics
///
/// Panics if the row counts differ, the header moved or changed, or the data
/// rows are not a permutation of the input's.
///
/// # Example
///
/// ```
/// use csvshuf::testing::assert_header_preserving_shuffle;
///
/// assert_header_preserving_shuffle(&["h", "a", "b"], &["h", "b", "a"]);
/// ```
pub fn assert_header_preserving_shuffle<T: AsRef<str> + Debug>(input: &[T], output: &[T]) {
    assert_eq!(
        output.len(),
        input.len(),
        "Row count changed:\n  Input: {input:?}\n  Output: {output:?}"
    );
    if input.is_empty() {
        return;
    }
    assert_eq!(
        output[0].as_ref(),
        input[0].as_ref(),
        "Header moved or changed:\n  Input: {input:?}\n  Output: {output:?}"
    );
    let expected: Vec<&str> = input[1..].iter().map(AsRef::as_ref).collect();
    let actual: Vec<&str> = output[1..].iter().map(AsRef::as_ref).collect();
    assert_same_multiset(&actual, &expected);
}
