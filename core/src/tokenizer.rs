use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    // Runs of two or more word characters; single letters never become terms.
    static ref RE: Regex = Regex::new(r"(?u)\b\w\w+\b").expect("valid regex");
    static ref STOPWORDS: HashSet<&'static str> = {
        let words: &[&str] = &[
            "a","about","above","across","after","afterwards","again","against","all","almost","alone","along",
            "already","also","although","always","am","among","amongst","amoungst","amount","an","and","another",
            "any","anyhow","anyone","anything","anyway","anywhere","are","around","as","at",
            "back","be","became","because","become","becomes","becoming","been","before","beforehand","behind",
            "being","below","beside","besides","between","beyond","bill","both","bottom","but","by",
            "call","can","cannot","cant","co","con","could","couldnt","cry",
            "de","describe","detail","do","done","down","due","during",
            "each","eg","eight","either","eleven","else","elsewhere","empty","enough","etc","even","ever","every",
            "everyone","everything","everywhere","except",
            "few","fifteen","fifty","fill","find","fire","first","five","for","former","formerly","forty","found",
            "four","from","front","full","further",
            "get","give","go",
            "had","has","hasnt","have","he","hence","her","here","hereafter","hereby","herein","hereupon","hers",
            "herself","him","himself","his","how","however","hundred",
            "i","ie","if","in","inc","indeed","interest","into","is","it","its","itself",
            "keep",
            "last","latter","latterly","least","less","ltd",
            "made","many","may","me","meanwhile","might","mill","mine","more","moreover","most","mostly","move",
            "much","must","my","myself",
            "name","namely","neither","never","nevertheless","next","nine","no","nobody","none","noone","nor",
            "not","nothing","now","nowhere",
            "of","off","often","on","once","one","only","onto","or","other","others","otherwise","our","ours",
            "ourselves","out","over","own",
            "part","per","perhaps","please","put",
            "rather","re",
            "same","see","seem","seemed","seeming","seems","serious","several","she","should","show","side","since",
            "sincere","six","sixty","so","some","somehow","someone","something","sometime","sometimes","somewhere",
            "still","such","system",
            "take","ten","than","that","the","their","them","themselves","then","thence","there","thereafter",
            "thereby","therefore","therein","thereupon","these","they","thick","thin","third","this","those",
            "though","three","through","throughout","thru","thus","to","together","too","top","toward","towards",
            "twelve","twenty","two",
            "un","under","until","up","upon","us",
            "very","via",
            "was","we","well","were","what","whatever","when","whence","whenever","where","whereafter","whereas",
            "whereby","wherein","whereupon","wherever","whether","which","while","whither","who","whoever","whole",
            "whom","whose","why","will","with","within","without","would",
            "yet","you","your","yours","yourself","yourselves"
        ];
        words.iter().copied().collect()
    };
}

pub fn is_stopword(token: &str) -> bool { STOPWORDS.contains(token) }

/// Tokenize text into terms: NFKC-normalize, lowercase, split into word runs of
/// at least two characters, drop English stop words. Order and duplicates are
/// preserved so callers can count term frequencies.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.nfkc().collect::<String>().to_lowercase();
    RE.find_iter(&lowered)
        .map(|m| m.as_str())
        .filter(|t| !t.is_empty() && !is_stopword(t))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_tokenize() {
        let t = tokenize("Ransomware hits Mumbai hospital!");
        assert_eq!(t, vec!["ransomware", "hits", "mumbai", "hospital"]);
    }

    #[test]
    fn drops_single_characters() {
        assert_eq!(tokenize("a b c dd"), vec!["dd"]);
    }

    #[test]
    fn compatibility_forms_fold_to_plain_letters() {
        // U+FB01 ligature and fullwidth letters.
        assert_eq!(tokenize("\u{FB01}rewall"), vec!["firewall"]);
        assert_eq!(tokenize("\u{FF37}\u{FF4F}\u{FF52}\u{FF4D}"), vec!["worm"]);
    }

    #[test]
    fn blank_input_has_no_tokens() {
        assert!(tokenize("   ").is_empty());
        assert!(tokenize("the of and").is_empty());
    }
}
