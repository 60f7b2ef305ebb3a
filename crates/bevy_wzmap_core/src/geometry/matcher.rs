//! Exact contiguous-subsequence search (Knuth-Morris-Pratt).

/// Prefix function of `pattern`: entry `i` is the length of the longest proper prefix of
/// `pattern[..=i]` that is also a suffix of it.
pub fn prefix_table<T: PartialEq>(pattern: &[T]) -> Vec<usize> {
    let mut table = vec![0; pattern.len()];
    let mut matched = 0;
    for i in 1..pattern.len() {
        while matched > 0 && pattern[i] != pattern[matched] {
            matched = table[matched - 1];
        }
        if pattern[i] == pattern[matched] {
            matched += 1;
        }
        table[i] = matched;
    }
    table
}

/// Whether `haystack` contains `needle` as a contiguous run.
///
/// Linear in `needle.len() + haystack.len()`; the haystack is scanned once without
/// backtracking. An empty needle is contained in everything.
pub fn contains_sequence<T: PartialEq>(needle: &[T], haystack: &[T]) -> bool {
    if needle.is_empty() {
        return true;
    }
    if needle.len() > haystack.len() {
        return false;
    }

    let table = prefix_table(needle);
    let mut matched = 0;
    for token in haystack {
        while matched > 0 && *token != needle[matched] {
            matched = table[matched - 1];
        }
        if *token == needle[matched] {
            matched += 1;
            if matched == needle.len() {
                return true;
            }
        }
    }
    false
}
