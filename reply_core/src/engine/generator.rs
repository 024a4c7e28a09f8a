//! Word-substitution generation.
//!
//! A base message is split into literal fragments and adoptable-word
//! fragments (words sit at odd positions), optionally cut before a later
//! word, screened for being "mostly one word", and then has some of its
//! words swapped for the caller's candidates.

use rand::seq::SliceRandom;
use rand::Rng;

use chat_corpus::{Vocabulary, Word};

/// Bracket families repaired after generation, in priority order.
const BRACKET_FAMILIES: [(char, char); 3] = [('「', '」'), ('（', '）'), ('(', ')')];

/// Whether a word is rare enough to be substituted or used as a topic.
pub fn can_adopt(word: &Word, border: usize) -> bool {
    word.occurrence_count() < border
}

/// Chance of keeping a message given how many characters it has besides words.
pub fn acceptance_probability(literal_chars: usize) -> f64 {
    match literal_chars {
        0 => 0.0,
        1 => 0.125,
        2..=3 => 0.25,
        4..=6 => 0.75,
        _ => 1.0,
    }
}

/// Draw whether a message with `literal_chars` non-word characters is kept.
pub fn should_adopt<R: Rng + ?Sized>(literal_chars: usize, rng: &mut R) -> bool {
    let probability = acceptance_probability(literal_chars);
    if probability <= 0.0 {
        false
    } else if probability >= 1.0 {
        true
    } else {
        rng.gen::<f64>() < probability
    }
}

/// Split `base` around every occurrence of the given words.
///
/// The result alternates literal and word fragments and always has odd
/// length; words are matched leftmost first without overlapping, in the
/// order given, and never inside an earlier word.
pub fn split_fragments<'a>(base: &str, words: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut fragments = vec![base.to_string()];
    for word in words {
        if word.is_empty() || !base.contains(word) {
            continue;
        }
        let mut next = Vec::with_capacity(fragments.len());
        for (i, fragment) in fragments.into_iter().enumerate() {
            if i % 2 == 1 {
                next.push(fragment);
                continue;
            }
            let mut rest = fragment.as_str();
            while let Some(pos) = rest.find(word) {
                next.push(rest[..pos].to_string());
                next.push(word.to_string());
                rest = &rest[pos + word.len()..];
            }
            next.push(rest.to_string());
        }
        fragments = next;
    }
    fragments
}

/// Prepend an opener when the first bracket of a family is a closer.
///
/// Only the first family that needs it is repaired.
pub fn repair_brackets(text: &str) -> String {
    for (open, close) in BRACKET_FAMILIES {
        let first = text.chars().find(|&c| c == open || c == close);
        if first == Some(close) {
            return format!("{}{}", open, text);
        }
    }
    text.to_string()
}

/// Cut the trailing part of a message after a late `＜` or `＞`.
pub fn trim_base_text(text: &str) -> &str {
    match text.rfind(|c: char| c == '＜' || c == '＞') {
        Some(pos) if text[..pos].chars().count() >= text.chars().count() / 2 => &text[..pos],
        _ => text,
    }
}

fn word_count(fragments: &[String]) -> usize {
    (fragments.len() - 1) / 2
}

/// Rewrite `base` with some of its adoptable words replaced by `candidates`.
///
/// Returns `None` when the message is rejected for having too little text
/// besides its words; `force` disables that rejection.
pub fn generate<R: Rng + ?Sized>(
    base: &str,
    vocabulary: &Vocabulary,
    border: usize,
    candidates: &[String],
    force: bool,
    rng: &mut R,
) -> Option<String> {
    let adoptable = vocabulary
        .words()
        .iter()
        .filter(|w| can_adopt(w, border) && Vocabulary::occurs_in(base, w))
        .map(|w| w.text.as_str());
    let mut fragments = split_fragments(base, adoptable);

    let words = word_count(&fragments);
    if words > 0 {
        let cut = rng.gen_range(0..words) * 2 + 1;
        if cut > 1 {
            fragments.drain(..cut);
            fragments.insert(0, String::new());
        }
    }

    let words = word_count(&fragments);
    if words == 0 {
        return Some(repair_brackets(&fragments.concat()));
    }

    if !force {
        let literal_chars: usize = fragments
            .iter()
            .step_by(2)
            .map(|f| f.chars().count())
            .sum();
        if !should_adopt(literal_chars, rng) {
            return None;
        }
    }

    let mut shuffled: Vec<&String> = candidates.iter().collect();
    shuffled.shuffle(rng);
    for candidate in shuffled {
        let old = fragments[rng.gen_range(0..words) * 2 + 1].clone();
        for slot in fragments.iter_mut().skip(1).step_by(2) {
            if *slot == old {
                *slot = candidate.clone();
            }
        }
        if rng.gen::<f64>() < 0.5 {
            break;
        }
    }

    Some(repair_brackets(&fragments.concat()))
}
