use newsradar_core::tokenizer::tokenize;

#[test]
fn it_lowercases_and_splits_on_punctuation() {
    let words = tokenize("Zero-Day EXPLOIT: patch now!");
    assert_eq!(words, vec!["zero", "day", "exploit", "patch"]);
}

#[test]
fn it_filters_stopwords() {
    let words = tokenize("The quick brown fox and the lazy dog");
    assert!(!words.contains(&"the".to_string()));
    assert!(!words.contains(&"and".to_string()));
    assert!(words.contains(&"fox".to_string()));
}

#[test]
fn it_keeps_repeated_terms_for_counting() {
    let words = tokenize("breach breach Breach");
    assert_eq!(words.len(), 3);
}

#[test]
fn it_keeps_digits_and_unicode_words() {
    let words = tokenize("CVE 2024 café");
    assert_eq!(words, vec!["cve", "2024", "café"]);
}
