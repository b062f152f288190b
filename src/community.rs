use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};

/// Words softened to a heart before anything is shared with the community.
const FILTERED_WORDS: [&str; 16] = [
    "hate", "worthless", "useless", "stupid", "idiot", "kill", "suicide", "hopeless",
    "depressed", "sad", "die", "fuck", "shit", "bitch", "bastard", "asshole",
];

const REPLACEMENT: &str = "❤️";

static FILTER: Lazy<Regex> = Lazy::new(|| {
    let pattern = format!(r"\b(?:{})\b", FILTERED_WORDS.join("|"));
    RegexBuilder::new(&pattern)
        .case_insensitive(true)
        .build()
        .expect("filter pattern is static")
});

static TAGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("tag pattern is static"));

/// Replaces each whole filtered word, case-insensitively, with a heart.
pub fn sanitize_text(input: &str) -> String {
    FILTER.replace_all(input, REPLACEMENT).into_owned()
}

/// Reduces journal markup to plain text for sharing: tags stripped,
/// surrounding whitespace trimmed.
pub fn plain_text(markup: &str) -> String {
    TAGS.replace_all(markup, "").trim().to_string()
}
