use newsradar_core::{best_match, Alert, Corpus, Error, PublishedState, RawRecord, RelevanceIndex};
use std::io::Write;

fn two_city_corpus() -> Corpus {
    let data = "Headline,Link,Date\nRansomware hits Mumbai hospital,a,2024-01-01\nPhishing wave in Delhi,b,2024-01-02\n";
    Corpus::load_csv(data.as_bytes()).unwrap().0
}

fn varied_corpus() -> Corpus {
    let headlines = [
        "Ransomware gang leaks hospital records",
        "New phishing kit targets banks in Delhi",
        "Botnet takedown by international police",
        "Critical zero-day patched in browser",
        "Bank phishing scam spreads via SMS",
        "Hospital systems restored after ransomware",
    ];
    let raw = headlines
        .iter()
        .enumerate()
        .map(|(i, h)| RawRecord::new(*h, format!("https://news.example/{i}"), Some("01-01-2024".into())))
        .collect();
    Corpus::from_raw(raw).0
}

#[test]
fn end_to_end_detects_location() {
    let state = PublishedState::from_corpus(two_city_corpus()).unwrap();
    let m = state.query(Some("ransomware"), Some("Mumbai")).unwrap();
    assert_eq!(m.record.link(), "a");
    assert!(m.score > 0.0);
    assert_eq!(m.alert, Some(Alert::Detected { location: "Mumbai".into() }));

    let m = state.query(Some("ransomware"), Some("Delhi")).unwrap();
    assert_eq!(m.record.link(), "a");
    assert_eq!(m.alert, Some(Alert::NotReported { location: "Delhi".into() }));
}

#[test]
fn result_is_from_corpus_and_score_in_range() {
    let corpus = varied_corpus();
    let index = RelevanceIndex::build(&corpus).unwrap();
    for kw in ["ransomware", "phishing bank", "police", "zero day", "nothing matches here", "sms"] {
        let m = best_match(&corpus, &index, kw).unwrap();
        assert!(corpus.records().contains(&m.record), "{kw}");
        assert!((0.0..=1.0).contains(&m.score), "{kw}: {}", m.score);
    }
}

#[test]
fn repeated_queries_are_deterministic() {
    let corpus = varied_corpus();
    let index = RelevanceIndex::build(&corpus).unwrap();
    let first = best_match(&corpus, &index, "hospital ransomware").unwrap();
    for _ in 0..20 {
        assert_eq!(best_match(&corpus, &index, "hospital ransomware").unwrap(), first);
    }
}

#[test]
fn identical_headlines_resolve_to_lower_index() {
    let raw = vec![
        RawRecord::new("Unrelated story", "0", None),
        RawRecord::new("Credential stuffing surge", "1", None),
        RawRecord::new("Credential stuffing surge", "2", None),
    ];
    let corpus = Corpus::from_raw(raw).0;
    let index = RelevanceIndex::build(&corpus).unwrap();
    assert_eq!(best_match(&corpus, &index, "credential").unwrap().record.link(), "1");
}

#[test]
fn rebuilding_is_idempotent() {
    let corpus = varied_corpus();
    let a = RelevanceIndex::build(&corpus).unwrap();
    let b = RelevanceIndex::build(&corpus).unwrap();
    assert_eq!(a.num_terms(), b.num_terms());
    for term in ["ransomware", "phishing", "hospital", "bank"] {
        let tid = a.term_id(term).unwrap();
        assert_eq!(b.term_id(term), Some(tid));
        assert!((a.idf(tid).unwrap() - b.idf(tid).unwrap()).abs() < 1e-12);
    }
    for d in 0..corpus.len() as u32 {
        let (va, vb) = (a.vector(d).unwrap(), b.vector(d).unwrap());
        assert_eq!(va.len(), vb.len());
        for ((ta, wa), (tb, wb)) in va.iter().zip(vb) {
            assert_eq!(ta, tb);
            assert!((wa - wb).abs() < 1e-12);
        }
    }
}

#[test]
fn known_scores_match_reference_weights() {
    // Two docs, query "ransomware" only hits doc 0:
    // doc 0 terms ransomware, hits, mumbai, hospital (all df=1, idf = ln(3/2)+1),
    // so each weight is 1/2 and the cosine with the query is 0.5.
    let corpus = two_city_corpus();
    let index = RelevanceIndex::build(&corpus).unwrap();
    let m = best_match(&corpus, &index, "ransomware").unwrap();
    assert!((m.score - 0.5).abs() < 1e-12);
}

#[test]
fn empty_corpus_query_is_no_data() {
    let corpus = Corpus::empty();
    let index = RelevanceIndex::build(&corpus).unwrap();
    assert_eq!(index.num_docs(), 0);
    assert!(matches!(best_match(&corpus, &index, "ransomware"), Err(Error::NoData)));
}

#[test]
fn loads_corpus_from_csv_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("news.csv");
    let mut f = std::fs::File::create(&path).unwrap();
    writeln!(f, ",Headline,Link,Date").unwrap();
    writeln!(f, "0,\"Spyware found in app, researchers say\",https://x/0,05-01-2024").unwrap();
    writeln!(f, "1,Ransomware hits Mumbai hospital,https://x/1,").unwrap();
    drop(f);

    let (corpus, report) = Corpus::load_path(&path).unwrap();
    assert_eq!(report.loaded, 2);
    assert_eq!(corpus.get(0).unwrap().headline(), "Spyware found in app, researchers say");
    let state = PublishedState::from_corpus(corpus).unwrap();
    assert_eq!(state.query(Some("spyware"), None).unwrap().record.link(), "https://x/0");
}

#[test]
fn ligature_and_fullwidth_keywords_match_normalized_headlines() {
    let raw = vec![
        RawRecord::new("Phishing wave in Delhi", "0", None),
        RawRecord::new("\u{FB01}rewall breach at bank", "1", None),
    ];
    let state = PublishedState::from_corpus(Corpus::from_raw(raw).0).unwrap();
    assert_eq!(state.current().corpus().get(1).unwrap().headline(), "firewall breach at bank");

    for keyword in ["\u{FB01}rewall", "firewall", "\u{FF26}\u{FF29}\u{FF32}\u{FF25}\u{FF37}\u{FF21}\u{FF2C}\u{FF2C}"] {
        let m = state.query(Some(keyword), None).unwrap();
        assert_eq!(m.record.link(), "1", "{keyword}");
        assert!(m.score > 0.0, "{keyword}");
    }
}
