use crate::matcher::MatchResult;
use serde::{Serialize, Serializer};
use std::fmt;
use unicode_normalization::UnicodeNormalization;

/// Advisory note on whether a location is mentioned by the matched headline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Alert {
    Detected { location: String },
    NotReported { location: String },
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Alert::Detected { location } => write!(f, "⚠️ Cyber incident detected near {location}!"),
            Alert::NotReported { location } => write!(f, "✅ No direct incident reported near {location}."),
        }
    }
}

impl Serialize for Alert {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl Alert {
    pub fn is_detected(&self) -> bool { matches!(self, Alert::Detected { .. }) }
}

/// Attach a location alert to `result`. Score is never touched; a missing or
/// blank location leaves the result as is.
pub fn annotate(mut result: MatchResult, location: Option<&str>) -> MatchResult {
    let Some(location) = location.map(str::trim).filter(|l| !l.is_empty()) else {
        return result;
    };
    let headline = result.record.headline().to_lowercase();
    let needle = location.nfkc().collect::<String>().to_lowercase();
    let location = location.to_string();
    result.alert = Some(if headline.contains(&needle) {
        Alert::Detected { location }
    } else {
        Alert::NotReported { location }
    });
    result
}
