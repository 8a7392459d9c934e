use std::sync::LazyLock;

use regex::Regex;

// Numbers (possibly split around the decimal point by stray whitespace),
// words, and single punctuation marks.
static TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"-?\s?\d*\s?\.\s?\d+|-?\s?\d*\.?\d+|\w+|[^\w\s]")
        .expect("token pattern is valid")
});

// Idioms merged into a single token before classification, matched
// case-insensitively and joined with underscores.
const IDIOMS: &[&[&str]] = &[
    &["coefficient", "of", "variation"],
    &["s", ".", "d", "."],
    &["s", ".", "e", "."],
    &["st", ".", "dev", "."],
    &["std", ".", "dev", "."],
    &["standard", "deviation"],
    &["standard", "error"],
    &["interquartile", "range"],
    &["confidence", "interval"],
    &["geometric", "mean"],
];

/// Split a cell's text into classification-ready tokens.
///
/// Normalizes the oddities PDF extraction leaves behind (escaped entities,
/// bullet decimals, unicode minus), protects hyphens that directly follow a
/// digit so ranges like `5-10` stay two numbers, merges multi-word idioms,
/// and strips whitespace the number pattern may have swallowed.
#[must_use]
pub fn tokenize(text: &str) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }

    let normalized = normalize(text);
    let raw: Vec<String> = TOKEN_RE
        .find_iter(&normalized)
        .map(|m| m.as_str().replace(' ', ""))
        .collect();
    merge_idioms(&raw)
}

fn normalize(text: &str) -> String {
    let text = text
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
        .replace('·', ".")
        .replace('−', "-");

    let mut chars: Vec<char> = text.chars().collect();
    let mut last_digit: Option<usize> = None;
    for i in 0..chars.len() {
        if chars[i].is_ascii_digit() {
            last_digit = Some(i);
        }
        if chars[i] == '-' && last_digit.is_some_and(|d| i == d + 1) {
            chars[i] = '−';
        }
    }
    chars.into_iter().collect()
}

fn merge_idioms(tokens: &[String]) -> Vec<String> {
    let mut out = Vec::with_capacity(tokens.len());
    let mut i = 0;
    while i < tokens.len() {
        let matched = IDIOMS.iter().find(|idiom| {
            idiom.len() <= tokens.len() - i
                && idiom
                    .iter()
                    .zip(&tokens[i..])
                    .all(|(word, token)| token.eq_ignore_ascii_case(word))
        });
        if let Some(idiom) = matched {
            out.push(tokens[i..i + idiom.len()].join("_"));
            i += idiom.len();
        } else {
            out.push(tokens[i].clone());
            i += 1;
        }
    }
    out
}
