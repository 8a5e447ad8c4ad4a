/// Levenshtein distance over Unicode scalar values
///
/// Unit cost for insert, delete and substitute. Case-sensitive.
pub fn levenshtein(a: &str, b: &str) -> usize {
    strsim::levenshtein(a, b)
}
