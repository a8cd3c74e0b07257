//! Sentence boundary detection for English and Bangla text

use once_cell::sync::Lazy;
use regex::Regex;

static BANGLA_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\u{0980}-\u{09FF}]").expect("bangla"));

/// Abbreviations that do not end an English sentence
const ABBREVIATIONS: &[&str] = &[
    "mr", "mrs", "ms", "dr", "prof", "st", "vs", "etc", "e.g", "i.e", "no", "fig",
];

/// Closing punctuation carried along with a sentence terminator
const CLOSERS: &[char] = &['"', '\'', ')', ']', '\u{201d}', '\u{2019}'];

/// Whether text contains any Bangla codepoint
pub fn is_bangla(text: &str) -> bool {
    BANGLA_RE.is_match(text)
}

/// Split English text into sentences
pub fn split_english(text: &str) -> Vec<String> {
    split_on(text, &['.', '!', '?'], true)
}

/// Split Bangla text into sentences
///
/// Bangla prose ends sentences with the danda (U+0964) rather than a full stop.
pub fn split_bangla(text: &str) -> Vec<String> {
    split_on(text, &['\u{0964}', '?', '!'], false)
}

/// Split text after terminator characters followed by whitespace
fn split_on(text: &str, terminators: &[char], check_abbreviations: bool) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        current.push(c);

        if terminators.contains(&c) {
            // Carry trailing quotes and brackets with the sentence
            let mut j = i + 1;
            while j < chars.len() && CLOSERS.contains(&chars[j]) {
                current.push(chars[j]);
                j += 1;
            }

            let at_end = j >= chars.len();
            let boundary = (at_end || chars[j].is_whitespace())
                && !(check_abbreviations && c == '.' && is_abbreviation(&current));

            if boundary {
                push_sentence(&mut sentences, &mut current);
            }

            i = j;
            continue;
        }

        i += 1;
    }

    push_sentence(&mut sentences, &mut current);
    sentences
}

/// Whether the pending sentence ends in an abbreviation rather than a full stop
fn is_abbreviation(current: &str) -> bool {
    let trimmed = current.trim_end_matches(|c: char| CLOSERS.contains(&c));
    let trimmed = trimmed.trim_end_matches('.');

    let word = trimmed
        .rsplit(char::is_whitespace)
        .next()
        .unwrap_or("");
    if word.is_empty() {
        return false;
    }

    // Single-letter initials like "J." in names
    if word.chars().count() == 1 && word.chars().all(|c| c.is_ascii_uppercase()) {
        return true;
    }

    let lower = word.to_lowercase();
    ABBREVIATIONS.iter().any(|a| *a == lower)
}

fn push_sentence(sentences: &mut Vec<String>, current: &mut String) {
    let trimmed = current.trim();
    if !trimmed.is_empty() {
        sentences.push(trimmed.to_string());
    }
    current.clear();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_bangla() {
        assert!(is_bangla("আমি ঠিক আছি"));
        assert!(is_bangla("mixed আছি text"));
        assert!(!is_bangla("Hello world!"));
        assert!(!is_bangla(""));
    }

    #[test]
    fn test_english_basic_split() {
        let sentences = split_english("Hello world! How are you? I am fine.");
        assert_eq!(sentences, vec!["Hello world!", "How are you?", "I am fine."]);
    }

    #[test]
    fn test_english_no_terminator() {
        assert_eq!(split_english("just a fragment"), vec!["just a fragment"]);
    }

    #[test]
    fn test_english_abbreviations_kept_together() {
        let sentences = split_english("Dr. Rahman arrived. He met Mr. J. Khan.");
        assert_eq!(sentences, vec!["Dr. Rahman arrived.", "He met Mr. J. Khan."]);
    }

    #[test]
    fn test_english_decimals_kept_together() {
        let sentences = split_english("Pi is 3.14 exactly. Everyone knows that.");
        assert_eq!(sentences, vec!["Pi is 3.14 exactly.", "Everyone knows that."]);
    }

    #[test]
    fn test_english_quotes_carried() {
        let sentences = split_english("He said \"Go.\" Then he left.");
        assert_eq!(sentences, vec!["He said \"Go.\"", "Then he left."]);
    }

    #[test]
    fn test_bangla_danda_split() {
        let sentences = split_bangla("আমি ভাত খাই। তুমি কি খাও? সে ঠিক আছে।");
        assert_eq!(
            sentences,
            vec!["আমি ভাত খাই।", "তুমি কি খাও?", "সে ঠিক আছে।"]
        );
    }

    #[test]
    fn test_bangla_single_sentence() {
        assert_eq!(split_bangla("আমি ঠিক আছি"), vec!["আমি ঠিক আছি"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(split_english("").is_empty());
        assert!(split_english("   ").is_empty());
        assert!(split_bangla("").is_empty());
    }
}
