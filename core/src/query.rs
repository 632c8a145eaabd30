use crate::error::{Error, Result};
use crate::stop_words::StopWords;
use crate::tokenizer::{is_valid_word, split_into_words};

/// Plus and minus words of a parsed query, borrowed from the raw query text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query<'q> {
    pub plus_words: Vec<&'q str>,
    pub minus_words: Vec<&'q str>,
}

struct QueryWord<'q> {
    data: &'q str,
    is_minus: bool,
    is_stop: bool,
}

fn parse_query_word<'q>(word: &'q str, stop_words: &StopWords) -> Result<QueryWord<'q>> {
    if word.is_empty() {
        return Err(Error::QuerySyntax(word.to_string()));
    }
    let (data, is_minus) = match word.strip_prefix('-') {
        Some(rest) => (rest, true),
        None => (word, false),
    };
    if data.is_empty() || data.starts_with('-') || !is_valid_word(data) {
        return Err(Error::QuerySyntax(word.to_string()));
    }
    Ok(QueryWord { data, is_minus, is_stop: stop_words.is_stop_word(data) })
}

impl<'q> Query<'q> {
    /// Parse and normalize: both word lists sorted and deduplicated.
    pub fn parse(text: &'q str, stop_words: &StopWords) -> Result<Self> {
        let mut query = Self::parse_unnormalized(text, stop_words)?;
        for words in [&mut query.plus_words, &mut query.minus_words] {
            words.sort_unstable();
            words.dedup();
        }
        Ok(query)
    }

    /// Parse keeping insertion order and duplicates.
    pub fn parse_unnormalized(text: &'q str, stop_words: &StopWords) -> Result<Self> {
        let mut query = Query::default();
        for word in split_into_words(text) {
            let qw = parse_query_word(word, stop_words)?;
            if qw.is_stop {
                continue;
            }
            if qw.is_minus {
                query.minus_words.push(qw.data);
            } else {
                query.plus_words.push(qw.data);
            }
        }
        Ok(query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stop() -> StopWords {
        StopWords::from_text("and in on")
    }

    #[test]
    fn splits_plus_and_minus() {
        let q = Query::parse("fluffy -collar cat and -in", &stop()).unwrap();
        assert_eq!(q.plus_words, vec!["cat", "fluffy"]);
        assert_eq!(q.minus_words, vec!["collar"]);
    }

    #[test]
    fn normalization_dedups() {
        let q = Query::parse("cat dog cat -rat -rat", &stop()).unwrap();
        assert_eq!(q.plus_words, vec!["cat", "dog"]);
        assert_eq!(q.minus_words, vec!["rat"]);
    }

    #[test]
    fn unnormalized_keeps_order_and_duplicates() {
        let q = Query::parse_unnormalized("dog cat dog -rat", &stop()).unwrap();
        assert_eq!(q.plus_words, vec!["dog", "cat", "dog"]);
        assert_eq!(q.minus_words, vec!["rat"]);
    }

    #[test]
    fn rejects_bad_tokens() {
        for bad in ["--cat", "-", "cat -", "ca\u{1}t", "-\u{2}"] {
            let err = Query::parse(bad, &stop()).unwrap_err();
            assert!(matches!(err, Error::QuerySyntax(_)), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn error_names_the_token() {
        let err = Query::parse("cat --dog", &stop()).unwrap_err();
        assert_eq!(err, Error::QuerySyntax("--dog".to_string()));
    }

    #[test]
    fn hyphen_inside_word_is_fine() {
        let q = Query::parse("well-groomed -semi-wild", &stop()).unwrap();
        assert_eq!(q.plus_words, vec!["well-groomed"]);
        assert_eq!(q.minus_words, vec!["semi-wild"]);
    }

    #[test]
    fn minus_stop_word_is_dropped() {
        let q = Query::parse("-and cat", &stop()).unwrap();
        assert!(q.minus_words.is_empty());
        assert_eq!(q.plus_words, vec!["cat"]);
    }
}
