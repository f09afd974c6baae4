//! LLM prompt engineering for the three artifacts

use crate::input::{ChatLine, UserSummary};

/// Rules shared by every prompt that asks for a JSON array
const JSON_RULES: &str = r#"Return standard JSON only and follow these rules strictly:
1. Use ASCII double quotes " for every key and string, never smart quotes
2. Escape any double quote inside a string as \"
3. Separate array elements and object fields with commas
4. Do not add any text, explanation or Markdown code fences outside the JSON"#;

const TOPIC_GUIDELINES: &str = r#"For each topic provide:
1. A short, specific topic name
2. The main contributors (at most 5 people)
3. A detailed description with the key information and conclusions

Guidelines:
- Be concrete. Instead of "A and B discussed games", say what was actually
  claimed, decided or learned, so a reader who missed the chat gets the substance.
- Name who did what. Tie statements and actions to the members involved.
- Where the chat gives enough detail, explain the cause, the outcome and the conclusion."#;

const TOPIC_FORMAT: &str = r#"[
  {
    "topic": "topic name",
    "contributors": ["member 1", "member 2"],
    "detail": "what was discussed and concluded"
  }
]"#;

const TITLE_CATALOGUE: &str = r#"Each member gets exactly one title and each title goes to at most one member.

Suggested titles (you may invent others that fit better):
- Dragon King: posts constantly, mostly light-hearted
- Tech Guru: often discusses technical subjects
- Night Owl: frequently active late at night
- Sticker Arsenal: sends lots of emoji and stickers
- Silence Breaker: often starts new conversations
- Critic: writes long messages
- Influencer: what they say shapes the group
- Reply Master: frequently replies to others"#;

const TITLE_FORMAT: &str = r#"[
  {
    "name": "member name",
    "qq": 123456789,
    "title": "title",
    "mbti": "four-letter MBTI type",
    "reason": "why this title fits"
  }
]"#;

const QUOTE_GUIDELINES: &str = r#"A golden quote is an outrageous, unforgettable line: a wild leap of logic,
an absurd analogy, a deadpan claim that upends common sense, or a sharp contrast
that makes people laugh or stop and think. Prefer original lines over recycled
memes and buzzwords.

For each quote provide:
1. The original text, verbatim
2. The sender's name
3. Why it was picked, naming the specific twist that makes it stand out"#;

const QUOTE_FORMAT: &str = r#"[
  {
    "content": "the quote, verbatim",
    "sender": "sender name",
    "reason": "why it stands out"
  }
]"#;

/// Prompt asking for up to `max_topics` discussion topics
pub fn topics_prompt(lines: &[ChatLine], max_topics: usize) -> String {
    let mut prompt = String::new();
    prompt.push_str("You summarize group chats. Read the chat log below and extract at most ");
    prompt.push_str(&format!("{} main discussion topics.\n\n", max_topics));
    prompt.push_str(TOPIC_GUIDELINES);
    prompt.push_str("\n\nChat log:\n---\n");
    push_lines(&mut prompt, lines);
    prompt.push_str("---\n\n");
    prompt.push_str(JSON_RULES);
    prompt.push_str("\n\nRespond with exactly this structure:\n");
    prompt.push_str(TOPIC_FORMAT);
    prompt.push('\n');
    prompt
}

/// Prompt asking for a title and MBTI type per member
pub fn user_titles_prompt(users: &[UserSummary]) -> String {
    let mut prompt = String::new();
    prompt.push_str("Assign fitting titles and MBTI types to the following group members.\n\n");
    prompt.push_str(TITLE_CATALOGUE);
    prompt.push_str("\n\nMember activity:\n");
    for user in users {
        prompt.push_str(&format!(
            "- {} (QQ:{}): {} messages, {} chars on average, emoji ratio {}, night ratio {}, reply ratio {}\n",
            user.name,
            user.qq,
            user.message_count,
            user.avg_chars,
            user.emoji_ratio,
            user.night_ratio,
            user.reply_ratio
        ));
    }
    prompt.push('\n');
    prompt.push_str(JSON_RULES);
    prompt.push_str("\n\nRespond with exactly this structure:\n");
    prompt.push_str(TITLE_FORMAT);
    prompt.push('\n');
    prompt
}

/// Prompt asking for up to `max_quotes` golden quotes
pub fn golden_quotes_prompt(lines: &[ChatLine], max_quotes: usize) -> String {
    let mut prompt = String::new();
    prompt.push_str(&format!(
        "Pick the {} most striking golden quotes from the chat log below.\n\n",
        max_quotes
    ));
    prompt.push_str(QUOTE_GUIDELINES);
    prompt.push_str("\n\nChat log:\n---\n");
    push_lines(&mut prompt, lines);
    prompt.push_str("---\n\n");
    prompt.push_str(JSON_RULES);
    prompt.push_str("\n\nRespond with exactly this structure:\n");
    prompt.push_str(QUOTE_FORMAT);
    prompt.push('\n');
    prompt
}

fn push_lines(prompt: &mut String, lines: &[ChatLine]) {
    for line in lines {
        prompt.push_str(&line.to_string());
        prompt.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(sender: &str, content: &str) -> ChatLine {
        ChatLine {
            time: "10:00".to_string(),
            sender: sender.to_string(),
            content: content.to_string(),
        }
    }

    #[test]
    fn test_topics_prompt_contains_lines_and_limit() {
        let prompt = topics_prompt(&[line("alice", "rust 2024 is out")], 5);

        assert!(prompt.contains("at most 5 main discussion topics"));
        assert!(prompt.contains("[10:00] alice: rust 2024 is out"));
        assert!(prompt.contains("\"contributors\""));
        assert!(prompt.contains("Use ASCII double quotes"));
    }

    #[test]
    fn test_user_titles_prompt_lists_members() {
        let users = vec![UserSummary {
            name: "bob".to_string(),
            qq: 42,
            message_count: 30,
            avg_chars: 12.5,
            emoji_ratio: 0.1,
            night_ratio: 0.25,
            reply_ratio: 0.5,
        }];

        let prompt = user_titles_prompt(&users);

        assert!(prompt.contains("- bob (QQ:42): 30 messages, 12.5 chars on average"));
        assert!(prompt.contains("night ratio 0.25"));
        assert!(prompt.contains("\"mbti\""));
    }

    #[test]
    fn test_golden_quotes_prompt() {
        let prompt = golden_quotes_prompt(&[line("carol", "gravity is a social construct")], 3);

        assert!(prompt.starts_with("Pick the 3 most striking golden quotes"));
        assert!(prompt.contains("[10:00] carol: gravity is a social construct"));
    }
}
