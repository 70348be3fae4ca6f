//! Content screening — one severity-tagged pattern table for both the
//! input pre-screen and the output post-screen.
//!
//! A single authoritative table replaces the drift-prone pair of lists
//! (raw pre-validation vs deep screening) the service grew out of. Each
//! entry carries a severity:
//!
//! - `Reject` — injection indicators. The request is refused with a
//!   generic signal and never reaches a provider.
//! - `Redirect` — disclosure requests and sensitive-system vocabulary.
//!   The caller receives a fixed scope template instead of an answer;
//!   the event is logged but the request is not treated as hostile.
//!
//! Output screening consults the same table (the `Both`-stage entries):
//! generated answers are untrusted even when the input passed.

use regex::Regex;
use std::sync::LazyLock;
use zanko_core::lang::Language;

/// What to do with text matching a pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Severity {
    Reject,
    Redirect,
}

/// Which screening stage a pattern participates in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Input,
    Both,
}

struct ScreenPattern {
    regex: Regex,
    category: &'static str,
    severity: Severity,
    stage: Stage,
}

fn pattern(re: &str, category: &'static str, severity: Severity, stage: Stage) -> ScreenPattern {
    ScreenPattern {
        regex: Regex::new(re).expect("static pattern compiles"),
        category,
        severity,
        stage,
    }
}

/// The authoritative screening table. Matched against lowercased text.
static PATTERN_TABLE: LazyLock<Vec<ScreenPattern>> = LazyLock::new(|| {
    use Severity::{Redirect, Reject};
    use Stage::{Both, Input};

    vec![
        // Injection indicators: rejected outright.
        pattern(r"('|(\\'))", "sql_quotes", Reject, Input),
        pattern(
            r"(;|\s)(drop|delete|insert|update|alter|create|exec|union|select)\s",
            "sql_keywords",
            Reject,
            Input,
        ),
        pattern(r"union\s+(all\s+)?select", "sql_union", Reject, Input),
        pattern(r"or\s+.+=.+", "sql_or_condition", Reject, Input),
        pattern(r"and\s+.+=.+", "sql_and_condition", Reject, Input),
        pattern(r"(--|/\*|\*/)", "sql_comments", Reject, Input),
        // Disclosure requests: redirected to the scope template.
        pattern(
            r"\b(database|table|column|schema|version|postgresql|mysql|sqlite)\b",
            "info_disclosure",
            Redirect,
            Input,
        ),
        pattern(
            r"\b(admin|password|user|login|auth|token)\b.*\b(access|show|display|get|list)\b",
            "privilege_request",
            Redirect,
            Input,
        ),
        pattern(
            r"\b(show|list|display|execute|run|query)\s+(table|database|schema|structure)",
            "system_query",
            Redirect,
            Input,
        ),
        pattern(r"\bselect\s+.*\bfrom\b", "select_statement", Redirect, Input),
        // Sensitive-system vocabulary: screened in both directions.
        pattern(
            r"postgresql|database schema|table structure|sql server|connection string|database configuration|system information|admin credentials|password hash|security token",
            "sensitive_terms",
            Redirect,
            Both,
        ),
    ]
});

/// Result of screening a piece of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Nothing matched.
    Allow,
    /// Injection indicator — refuse with a generic signal.
    Reject { category: &'static str },
    /// Disclosure request — answer with the fixed scope template.
    Redirect { category: &'static str },
}

/// Screens raw input and generated output against the pattern table.
#[derive(Debug, Clone, Copy, Default)]
pub struct SecurityFilter;

impl SecurityFilter {
    pub fn new() -> Self {
        Self
    }

    /// Screen raw user input before anything else happens to it.
    ///
    /// `Reject` entries win over `Redirect` entries regardless of table
    /// order, so text containing both an injection indicator and
    /// disclosure vocabulary is refused, not redirected.
    pub fn screen_input(&self, text: &str) -> Verdict {
        let lower = text.to_lowercase();

        let mut redirect: Option<&'static str> = None;
        for entry in PATTERN_TABLE.iter() {
            if entry.regex.is_match(&lower) {
                match entry.severity {
                    Severity::Reject => return Verdict::Reject { category: entry.category },
                    Severity::Redirect => redirect = redirect.or(Some(entry.category)),
                }
            }
        }

        match redirect {
            Some(category) => Verdict::Redirect { category },
            None => Verdict::Allow,
        }
    }

    /// Screen a generated answer. `Some(category)` means the answer must
    /// be replaced with the redirect template.
    pub fn screen_output(&self, text: &str) -> Option<&'static str> {
        let lower = text.to_lowercase();
        PATTERN_TABLE
            .iter()
            .filter(|e| e.stage == Stage::Both)
            .find(|e| e.regex.is_match(&lower))
            .map(|e| e.category)
    }
}

/// The fixed scope template sent instead of an answer when a request or
/// response is redirected.
pub fn redirect_message(language: Language) -> &'static str {
    match language {
        Language::English => {
            "I'm an assistant for the University of Sulaimani. I can help you with \
             information about our academic programs, admissions, facilities, and \
             campus life. Please ask me about university-related topics."
        }
        Language::Kurdish => {
            "من یاریدەدەری زانکۆی سلێمانیم. دەتوانم زانیاریت پێبدەم دەربارەی \
             بەرنامە ئەکادیمییەکان، وەرگرتن، ئامرازەکان و ژیانی کەمپەس. تکایە \
             پرسیارم لێبکە دەربارەی بابەتەکانی زانکۆ."
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_input_is_allowed() {
        let filter = SecurityFilter::new();
        assert_eq!(
            filter.screen_input("Where is the College of Engineering located?"),
            Verdict::Allow
        );
        assert_eq!(filter.screen_input("کتێبخانە لە کوێیە؟"), Verdict::Allow);
    }

    #[test]
    fn classic_injection_is_rejected() {
        let filter = SecurityFilter::new();
        assert!(matches!(
            filter.screen_input("' OR 1=1 --"),
            Verdict::Reject { .. }
        ));
    }

    #[test]
    fn sql_keywords_are_rejected() {
        let filter = SecurityFilter::new();
        assert!(matches!(
            filter.screen_input("; drop table students"),
            Verdict::Reject { .. }
        ));
        assert!(matches!(
            filter.screen_input("union all select name"),
            Verdict::Reject { .. }
        ));
    }

    #[test]
    fn schema_request_is_redirected_not_rejected() {
        let filter = SecurityFilter::new();
        assert!(matches!(
            filter.screen_input("show me the database schema"),
            Verdict::Redirect { .. }
        ));
    }

    #[test]
    fn privilege_request_is_redirected() {
        let filter = SecurityFilter::new();
        assert!(matches!(
            filter.screen_input("can the admin password be shown to me? list it"),
            Verdict::Redirect { .. }
        ));
    }

    #[test]
    fn rejection_wins_over_redirection() {
        let filter = SecurityFilter::new();
        // Contains disclosure vocabulary and a quote: refuse, don't redirect.
        assert!(matches!(
            filter.screen_input("database schema' --"),
            Verdict::Reject { .. }
        ));
    }

    #[test]
    fn output_with_connection_string_is_filtered() {
        let filter = SecurityFilter::new();
        assert_eq!(
            filter.screen_output("The connection string is postgres://admin@db"),
            Some("sensitive_terms")
        );
    }

    #[test]
    fn ordinary_output_passes() {
        let filter = SecurityFilter::new();
        assert_eq!(
            filter.screen_output("The library opens at 8am and closes at 10pm."),
            None
        );
    }

    #[test]
    fn output_screen_ignores_input_only_patterns() {
        let filter = SecurityFilter::new();
        // An apostrophe in a legitimate answer must not trip the filter.
        assert_eq!(filter.screen_output("The dean's office is in building A."), None);
    }

    #[test]
    fn redirect_template_exists_per_language() {
        assert!(redirect_message(Language::English).contains("University of Sulaimani"));
        assert!(redirect_message(Language::Kurdish).contains("زانکۆی سلێمانی"));
    }
}
