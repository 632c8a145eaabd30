/// Split text into words on the space character.
///
/// Runs of spaces never produce empty words. The returned slices borrow from `text`.
pub fn split_into_words(text: &str) -> Vec<&str> {
    text.split(' ').filter(|word| !word.is_empty()).collect()
}

/// A word is valid when it contains no control characters (below U+0020).
pub fn is_valid_word(word: &str) -> bool {
    !word.chars().any(|c| c < ' ')
}
