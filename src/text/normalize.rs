use std::sync::LazyLock;

use rust_stemmers::{Algorithm, Stemmer};
use unicode_normalization::UnicodeNormalization;
use unicode_segmentation::UnicodeSegmentation;

static RUSSIAN: LazyLock<Stemmer> = LazyLock::new(|| Stemmer::create(Algorithm::Russian));
static ENGLISH: LazyLock<Stemmer> = LazyLock::new(|| Stemmer::create(Algorithm::English));

/// Upper bound on re-stemming a token while it keeps changing.
const MAX_STEM_PASSES: usize = 4;

/// Returns a space-delimited sequence of word stems.
///
/// NFKC folding, lowercasing and `ё`/`е` unification are applied before the
/// text is split on Unicode word boundaries, so punctuation and repeated
/// whitespace vanish. Cyrillic words are reduced with the Snowball Russian
/// stemmer and purely Latin words with the English one, so inflected forms
/// such as `счёт`, `счета` and `счетов` collapse to one token. Numbers and
/// mixed tokens are kept as they are.
///
/// Each token is stemmed until it stops changing, which makes the output a
/// fixed point: normalizing it again yields the same string.
pub fn normalize_text(value: &str) -> String {
    if value.trim().is_empty() {
        return String::new();
    }

    let folded: String = value
        .nfkc()
        .flat_map(char::to_lowercase)
        .map(|c| if c == 'ё' { 'е' } else { c })
        .collect();

    folded
        .unicode_words()
        .map(stem_token)
        .filter(|token| !token.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn stem_token(token: &str) -> String {
    let stemmer: &Stemmer = if token.chars().any(is_cyrillic) {
        &RUSSIAN
    } else if token.chars().all(|c| c.is_ascii_alphabetic()) {
        &ENGLISH
    } else {
        return token.to_string();
    };

    let mut current = token.to_string();
    for _ in 0..MAX_STEM_PASSES {
        let next = stemmer.stem(&current);
        if next == current {
            break;
        }
        current = next.into_owned();
    }
    current
}

fn is_cyrillic(c: char) -> bool {
    matches!(c, '\u{0400}'..='\u{04FF}')
}
