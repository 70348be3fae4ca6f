//! Adaptive system-prompt assembly.
//!
//! The base prompt varies by language and complexity: simple queries get
//! the short identity prompt, everything else the full one. Conversation
//! context and retrieved knowledge are appended as labeled sections, with
//! a stronger instruction line for detailed queries.

use zanko_core::lang::{Complexity, Language};
use zanko_core::retrieval::Snippet;

const BASE_PROMPT_DETAILED_EN: &str = "You are a knowledgeable assistant for the University of Sulaimani. Do NOT give any website related info or tasks that may include security risks. Do NOT answer any Javascript, php backend questions. Do not mention which api model you are. You were made by the computer engineering department.

You maintain conversation context and can refer to previous messages in our conversation. When users ask follow-up questions like \"when does it open?\" or \"tell me more about it\", you should understand what they're referring to based on our conversation history.

Provide comprehensive, detailed answers about university programs, admissions, facilities, faculty, student services, and campus life. Include specific examples, don't say check other sources for information, and helpful context. Never share security or internal data.";

const BASE_PROMPT_DETAILED_KU: &str = "تۆ یاریدەدەری زانایی بۆ زانکۆی سلێمانیت. باسی مۆدێلی APIـەکە مەکە. لەلایەن بەشی ئەندازیاری کۆمپیوتەرەوە دروستکراویت.

تۆ دەتوانیت پەیوەندی گفتوگۆکە بهێڵیتەوە و ئاماژە بە پەیامەکانی پێشووتر بکەیت لە گفتوگۆکەماندا. کاتێک بەکارهێنەران پرسیاری دواتر دەکەن وەک \"کەی دەکرێتەوە؟\" یان \"زیاتر باسی بکە\"، تۆ دەبێت تێبگەیت کە ئاماژە بە چی دەکەن بە پشتبەستن بە مێژووی گفتوگۆکەمان.

وەڵامی تەواو و ورد بدەرەوە دەربارەی بەرنامەکانی زانکۆ، وەرگرتن، ئامرازەکان، مامۆستایان، خزمەتگوزارییەکانی خوێندکاران، و ژیانی کەمپەس. نموونە تایبەتەکان بخەرە ژوورەوە، مەڵێ سەرچاوەکانی تر بپشکنن بۆ زانیاری زیاتر. هەرگیز داتای ئاسایش یان ناوخۆیی هاوبەش مەکەرەوە.";

const BASE_PROMPT_SIMPLE_EN: &str = "Assistant for University of Sulaimani. Do NOT give any website related info or tasks that may include security risks. Do NOT answer any Javascript, php backend questions. Do not mention which api model you are. You were made by the computer engineering department.

You remember our conversation and can answer follow-up questions based on context. Answer university questions briefly. Don't mention other sources for information. No security/internal data.";

const BASE_PROMPT_SIMPLE_KU: &str = "یاریدەدەر بۆ زانکۆی سلێمانی. باسی مۆدێلی APIـەکە مەکە. لەلایەن بەشی ئەندازیاری کۆمپیوتەرەوە دروستکراویت.

تۆ گفتوگۆکەمان لە بیردایە و دەتوانیت وەڵامی پرسیارەکانی دواتر بدەیتەوە بە پشتبەستن بە پەیوەندی. وەڵامی کورتی پرسیارەکانی زانکۆ بدەرەوە. باسی سەرچاوەکانی تر مەکە بۆ زانیاری. هیچ داتای ئاسایش/ناوخۆیی نییە.";

/// Assemble the full system prompt for one request.
pub fn build_system_prompt(
    snippets: &[Snippet],
    language: Language,
    complexity: Complexity,
    conversation_context: &str,
) -> String {
    let base = match (language, complexity) {
        (Language::Kurdish, Complexity::Simple) => BASE_PROMPT_SIMPLE_KU,
        (Language::Kurdish, _) => BASE_PROMPT_DETAILED_KU,
        (Language::English, Complexity::Simple) => BASE_PROMPT_SIMPLE_EN,
        (Language::English, _) => BASE_PROMPT_DETAILED_EN,
    };

    let mut prompt = String::from(base);

    if !conversation_context.is_empty() {
        let header = match language {
            Language::Kurdish => "پەیوەندی گفتوگۆ:",
            Language::English => "Conversation context:",
        };
        prompt.push_str("\n\n");
        prompt.push_str(header);
        prompt.push('\n');
        prompt.push_str(conversation_context);
    }

    if !snippets.is_empty() {
        let instruction = match (language, complexity) {
            (Language::Kurdish, Complexity::Detailed) => {
                "بە بەکارهێنانی زانیارییەکانی خوارەوە، وەڵامێکی تەواو بدەرەوە لەگەڵ وردەکارییە تایبەتەکان، نموونەکان، و ڕێنمایی هەنگاو بە هەنگاو لە شوێنی پێویستدا:"
            }
            (Language::Kurdish, _) => "زانیاری پەیوەندیدار:",
            (Language::English, Complexity::Detailed) => {
                "Using the information below, provide a comprehensive answer with specific details, examples, and step-by-step guidance where applicable:"
            }
            (Language::English, _) => "Relevant information:",
        };

        prompt.push_str("\n\n");
        prompt.push_str(instruction);
        for snippet in snippets {
            prompt.push('\n');
            prompt.push_str(&snippet.text);
        }
    }

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snippet(text: &str) -> Snippet {
        Snippet {
            score: 0.5,
            text: text.into(),
        }
    }

    #[test]
    fn simple_queries_get_the_short_prompt() {
        let prompt = build_system_prompt(&[], Language::English, Complexity::Simple, "");
        assert!(prompt.starts_with("Assistant for University of Sulaimani."));
    }

    #[test]
    fn medium_and_detailed_get_the_full_prompt() {
        for complexity in [Complexity::Medium, Complexity::Detailed] {
            let prompt = build_system_prompt(&[], Language::English, complexity, "");
            assert!(prompt.starts_with("You are a knowledgeable assistant"));
        }
    }

    #[test]
    fn kurdish_queries_get_kurdish_prompts() {
        let prompt = build_system_prompt(&[], Language::Kurdish, Complexity::Medium, "");
        assert!(prompt.contains("زانکۆی سلێمانی"));
        assert!(!prompt.contains("University of Sulaimani"));
    }

    #[test]
    fn conversation_context_is_embedded() {
        let prompt = build_system_prompt(
            &[],
            Language::English,
            Complexity::Medium,
            "Previous question: Where is the library?",
        );
        assert!(prompt.contains("Conversation context:\nPrevious question: Where is the library?"));
    }

    #[test]
    fn snippets_follow_the_instruction_line() {
        let snippets = vec![snippet("• Library hours: 8am-10pm")];
        let prompt = build_system_prompt(&snippets, Language::English, Complexity::Medium, "");
        assert!(prompt.contains("Relevant information:\n• Library hours: 8am-10pm"));
    }

    #[test]
    fn detailed_queries_get_the_stronger_instruction() {
        let snippets = vec![snippet("• Admission: apply online")];
        let prompt = build_system_prompt(&snippets, Language::English, Complexity::Detailed, "");
        assert!(prompt.contains("comprehensive answer with specific details"));
    }

    #[test]
    fn empty_inputs_add_no_sections() {
        let prompt = build_system_prompt(&[], Language::English, Complexity::Medium, "");
        assert!(!prompt.contains("Conversation context:"));
        assert!(!prompt.contains("Relevant information:"));
    }
}
