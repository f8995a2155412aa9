//! Word tokenization and n-gram expansion

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref WORD: Regex = Regex::new(r"\b\w+\b").expect("valid regex");
}

/// Split text into case-folded word tokens.
///
/// Diacritics are left untouched: "Kết" and "Ket" stay distinct tokens.
pub fn tokenize(text: &str, lowercase: bool) -> Vec<String> {
    let folded;
    let text = if lowercase {
        folded = text.to_lowercase();
        folded.as_str()
    } else {
        text
    };
    WORD.find_iter(text).map(|m| m.as_str().to_string()).collect()
}

/// Expand tokens into space-joined n-grams for every `n` in `min_n..=max_n`,
/// shortest n-grams first.
pub fn ngrams(tokens: &[String], min_n: usize, max_n: usize) -> Vec<String> {
    let min_n = min_n.max(1);
    let mut terms = Vec::new();
    for n in min_n..=max_n {
        if n > tokens.len() {
            break;
        }
        if n == 1 {
            terms.extend(tokens.iter().cloned());
        } else {
            terms.extend(tokens.windows(n).map(|w| w.join(" ")));
        }
    }
    terms
}

/// Tokenize and expand in one step.
pub fn analyze(text: &str, lowercase: bool, ngram_range: (usize, usize)) -> Vec<String> {
    let tokens = tokenize(text, lowercase);
    ngrams(&tokens, ngram_range.0, ngram_range.1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_lowercases_and_keeps_diacritics() {
        let tokens = tokenize("Đăng ký KẾT HÔN, tại UBND xã!", true);
        assert_eq!(tokens, vec!["đăng", "ký", "kết", "hôn", "tại", "ubnd", "xã"]);
    }

    #[test]
    fn test_tokenize_keeps_single_chars_and_digits() {
        let tokens = tokenize("Mẫu số 2 (a)", true);
        assert_eq!(tokens, vec!["mẫu", "số", "2", "a"]);
    }

    #[test]
    fn test_tokenize_without_lowercase() {
        let tokens = tokenize("Khai Sinh", false);
        assert_eq!(tokens, vec!["Khai", "Sinh"]);
    }

    #[test]
    fn test_ngrams_unigrams_then_bigrams() {
        let tokens = tokenize("thủ tục đăng ký", true);
        let terms = ngrams(&tokens, 1, 2);
        assert_eq!(
            terms,
            vec!["thủ", "tục", "đăng", "ký", "thủ tục", "tục đăng", "đăng ký"]
        );
    }

    #[test]
    fn test_ngrams_short_input() {
        let tokens = tokenize("xã", true);
        assert_eq!(ngrams(&tokens, 1, 2), vec!["xã"]);
        assert!(ngrams(&[], 1, 2).is_empty());
    }
}
