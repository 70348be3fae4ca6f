//! Language detection, complexity classification, and follow-up detection.
//!
//! Language is decided by script: characters in the Arabic ranges
//! U+0600–U+06FF and U+0750–U+077F count toward Kurdish, Latin alphabetic
//! characters toward English, ties going to English. Complexity and
//! follow-up classification then run against the pattern set of the
//! detected language only.

use regex::Regex;
use std::sync::LazyLock;
use zanko_core::lang::{Complexity, Language};

/// Queries longer than this many words are treated as detailed even
/// without a keyword match.
const DETAILED_WORD_THRESHOLD: usize = 8;

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(p).expect("static pattern compiles"))
        .collect()
}

// ── English pattern sets ──────────────────────────────────────────────────

static EN_SIMPLE: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"\b(hi|hello|hey|thanks|thank you)\b",
        r"\bwhat is your name\b",
        r"\bwho are you\b",
        r"\bhow are you\b",
    ])
});

static EN_DETAILED: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"\b(how to|how do i|what are the steps|procedure|process|requirements)\b",
        r"\b(tell me about|explain|describe|what is|what are)\b",
        r"\b(admission|program|course|degree|faculty|department)\b",
        r"\b(facilities|services|campus|library|dormitory)\b",
        r"\b(fees|tuition|scholarship|financial)\b",
        r"\b(when|where|why|which)\b.*\?",
        r"\b(difference between|compare|versus|vs)\b",
    ])
});

static EN_WH_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(when|where|how|what|why|which)\b").expect("static pattern compiles"));

static EN_FOLLOWUP: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"\b(it|that|this|there|here)\b",
        r"\b(more|tell me more|explain|details)\b",
        r"\b(about it|about that|about this)\b",
        r"^(yes|no|ok|okay)\b",
    ])
});

// ── Kurdish pattern sets ──────────────────────────────────────────────────

static KU_SIMPLE: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"\b(سڵاو|بەخێربێی|سوپاس|زۆر سوپاس)\b", // greetings, thanks
        r"\bناوت چییە\b",                         // what's your name
        r"\bتۆ کێیت\b",                           // who are you
        r"\bچۆنی\b",                              // how are you
    ])
});

static KU_DETAILED: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"\b(چۆن|چۆنیەتی|چ هەنگاوەکان|پێداویستی|پرۆسە)\b", // how, requirements, process
        r"\b(باسی.*بکە|ڕوونی بکەرەوە|بڵێ)\b",               // tell about, explain
        r"\b(وەرگرتن|بەرنامە|کۆرس|پلە|مامۆستا|بەش)\b",       // admission, program, course
        r"\b(ئامرازەکان|خزمەتگوزارییەکان|کەمپەس|کتێبخانە)\b", // facilities, services
        r"\b(کرێ|خەرجی|بورس|دارایی)\b",                      // fees, scholarship
        r"\b(کەی|کوێ|بۆچی|کام)\b.*؟",                        // when, where, why, which
    ])
});

static KU_FOLLOWUP: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"\b(کەی|کوێ|چۆن|چی|چییە)\b",        // when, where, how, what
        r"\b(ئەو|ئەوە|ئەمە|لەوێ|لێرە)\b",     // that, this, there, here
        r"\b(زیاتر|تر|دیکە)\b",               // more, other, another
        r"\b(باسی.*بکە|ڕوونی بکەرەوە)\b",     // tell about, explain
    ])
});

/// English stop words stripped before retrieval.
const EN_STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
];

/// Kurdish particles stripped before retrieval.
const KU_PARTICLES: &[&str] = &["و", "لە", "بە", "لەگەڵ", "بۆ"];

fn is_arabic_script(c: char) -> bool {
    matches!(c, '\u{0600}'..='\u{06FF}' | '\u{0750}'..='\u{077F}')
}

/// Detect the primary language of a query by script character counts.
/// Ties favor English.
pub fn detect_language(text: &str) -> Language {
    let kurdish_chars = text.chars().filter(|c| is_arabic_script(*c)).count();
    let english_chars = text
        .chars()
        .filter(|c| c.is_alphabetic() && (*c as u32) < 256)
        .count();

    if kurdish_chars > english_chars {
        Language::Kurdish
    } else {
        Language::English
    }
}

/// Classify a query into a complexity tier.
///
/// Greeting/identity patterns win over everything else; domain-keyword
/// patterns or a long word count make the query detailed; the rest is
/// medium.
pub fn classify_complexity(text: &str, language: Language) -> Complexity {
    let lower = text.to_lowercase();

    let (simple, detailed) = match language {
        Language::Kurdish => (&*KU_SIMPLE, &*KU_DETAILED),
        Language::English => (&*EN_SIMPLE, &*EN_DETAILED),
    };

    if simple.iter().any(|re| re.is_match(&lower)) {
        Complexity::Simple
    } else if detailed.iter().any(|re| re.is_match(&lower))
        || text.split_whitespace().count() > DETAILED_WORD_THRESHOLD
    {
        Complexity::Detailed
    } else {
        Complexity::Medium
    }
}

/// Whether a query depends on prior conversational turns (anaphora,
/// ellipsis, "tell me more", bare acknowledgements).
pub fn is_followup(text: &str, language: Language) -> bool {
    let lower = text.to_lowercase();

    match language {
        Language::Kurdish => KU_FOLLOWUP.iter().any(|re| re.is_match(&lower)),
        Language::English => {
            // A bare wh-question reads as a follow-up unless it names the
            // university itself ("where is the university of sulaimani?").
            let wh_followup = EN_WH_WORD.is_match(&lower)
                && !lower.contains("university")
                && !lower.contains("sulaimani");

            wh_followup || EN_FOLLOWUP.iter().any(|re| re.is_match(&lower))
        }
    }
}

/// Clean and normalize a query for retrieval.
///
/// Collapses whitespace; English additionally lowercases and drops stop
/// words, Kurdish drops particles. Falls back to the collapsed original
/// when stripping would leave nothing.
pub fn preprocess_query(text: &str, language: Language) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");

    match language {
        Language::English => {
            let lower = collapsed.to_lowercase();
            let kept: Vec<&str> = lower
                .split_whitespace()
                .filter(|w| !EN_STOP_WORDS.contains(w))
                .collect();
            if kept.is_empty() { lower } else { kept.join(" ") }
        }
        Language::Kurdish => {
            let kept: Vec<&str> = collapsed
                .split_whitespace()
                .filter(|w| !KU_PARTICLES.contains(w))
                .collect();
            if kept.is_empty() { collapsed } else { kept.join(" ") }
        }
    }
}
