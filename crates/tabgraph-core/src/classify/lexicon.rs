use std::collections::HashMap;

/// Lexical expansion for concept-lookup queries: rule-based lemmas plus a
/// small synonym table. A wordnet-backed implementation can replace the
/// defaults by constructing the table explicitly.
#[derive(Debug, Clone)]
pub struct Lexicon {
    pub use_lemmas: bool,
    pub use_synonyms: bool,
    synonyms: HashMap<String, Vec<String>>,
}

const MAX_EXPANSIONS: usize = 8;

impl Default for Lexicon {
    fn default() -> Self {
        let mut synonyms = HashMap::new();
        for (word, syns) in [
            ("female", vec!["woman"]),
            ("male", vec!["man"]),
            ("weight", vec!["mass"]),
            ("height", vec!["stature"]),
            ("smoking", vec!["tobacco"]),
            ("ethnicity", vec!["race"]),
        ] {
            synonyms.insert(
                word.to_string(),
                syns.into_iter().map(String::from).collect(),
            );
        }
        Self {
            use_lemmas: true,
            use_synonyms: true,
            synonyms,
        }
    }
}

impl Lexicon {
    #[must_use]
    pub fn with_synonyms(synonyms: HashMap<String, Vec<String>>) -> Self {
        Self {
            use_lemmas: true,
            use_synonyms: true,
            synonyms,
        }
    }

    /// Candidate base forms of `token`, lowercased and deduplicated.
    #[must_use]
    pub fn lemmas(&self, token: &str) -> Vec<String> {
        if !self.use_lemmas {
            return Vec::new();
        }
        let word = token.to_lowercase();
        let mut out = Vec::new();
        let mut push = |lemma: String| {
            if !lemma.is_empty() && !out.contains(&lemma) {
                out.push(lemma);
            }
        };

        if let Some(stem) = word.strip_suffix("ies") {
            push(format!("{stem}y"));
        } else if let Some(stem) = word
            .strip_suffix("ches")
            .or_else(|| word.strip_suffix("shes"))
            .map(|s| format!("{s}{}", &word[s.len()..word.len() - 2]))
        {
            push(stem);
        } else if word.ends_with("ses") || word.ends_with("xes") || word.ends_with("zes") {
            push(word[..word.len() - 2].to_string());
        } else if let Some(stem) = word.strip_suffix('s') {
            if !stem.ends_with('s') {
                push(stem.to_string());
            }
        }

        if let Some(stem) = word.strip_suffix("ing") {
            if stem.len() > 2 {
                push(stem.to_string());
                push(format!("{stem}e"));
            }
        } else if let Some(stem) = word.strip_suffix("ed") {
            if stem.len() > 2 {
                push(stem.to_string());
                push(format!("{stem}e"));
            }
        }

        out
    }

    /// Synonym-set members of `token`, lowercased.
    #[must_use]
    pub fn synonyms(&self, token: &str) -> Vec<String> {
        if !self.use_synonyms {
            return Vec::new();
        }
        self.synonyms
            .get(&token.to_lowercase())
            .cloned()
            .unwrap_or_default()
    }

    /// Lemmas followed by synonyms, deduplicated and capped.
    #[must_use]
    pub fn expansions(&self, token: &str) -> Vec<String> {
        let mut out = self.lemmas(token);
        for syn in self.synonyms(token) {
            if out.len() >= MAX_EXPANSIONS {
                break;
            }
            if !out.contains(&syn) {
                out.push(syn);
            }
        }
        out.truncate(MAX_EXPANSIONS);
        out
    }
}
