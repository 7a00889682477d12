//! Canned command text and keyword-matched small talk.
//!
//! No state and no branching of consequence: commands return fixed strings,
//! free text falls through a few keyword checks.

pub const START_TEXT: &str = "Hey there! 🎥🔊 Welcome to ClipFetch, your go-to genie for snatching videos and jamming to audio from Twitter, YouTube and Instagram! Send me a URL and let's get started!";

pub const HELP_TEXT: &str = "Need a hand? 🛠️ Here's the scoop on ClipFetch commands:\n\
- /start - Kick off the fun!\n\
- /help - You're here, genius!\n\
- /custom - For those special requests.\n\
- /introduction - Meet the star of the show!\n\
Just drop a Twitter, YouTube or Instagram video/reel URL and choose Video or Audio.";

pub const CUSTOM_TEXT: &str = "Feeling fancy? 🕺 /custom is your backstage pass to special requests. Currently it's chilling, but stay tuned for more tricks up ClipFetch's sleeve!";

pub const INTRODUCTION_TEXT: &str = "Greetings! 🌟 I'm ClipFetch, your trusty sidekick for capturing videos and audio from Twitter, YouTube and Instagram. Think of me as your personal DJ and filmmaker rolled into one! 🎶🎥\nIf you like what I do, check out my repo and leave a star! ⭐";

pub const CHOOSE_PROMPT: &str = "Choose an option:";

pub const INVALID_URL_TEXT: &str =
    "Please send a valid Twitter, YouTube or Instagram video/reel URL, or use a command.";

pub const NO_PENDING_TEXT: &str = "No pending URL. Please send a URL first.";

pub const INVALID_CHOICE_TEXT: &str = "Invalid choice.";

pub const ATTRIBUTION_TEXT: &str = "I was built by my developer. Star the repo if you dig it! ⭐";

pub const CANT_UNDERSTAND_TEXT: &str =
    "Sorry, I can't understand what you wrote (still in development 🛠️)";

/// Keyword small talk for free text that is not a URL.
pub fn small_talk(text: &str, first_name: &str) -> String {
    let processed = text.to_lowercase();

    if processed.contains("hello") {
        return format!("Hey there {first_name} 👋");
    }
    if processed.contains("how are you") {
        return "I am good!".to_string();
    }
    if processed.contains("who created you") || processed.contains("who made you") {
        return ATTRIBUTION_TEXT.to_string();
    }

    CANT_UNDERSTAND_TEXT.to_string()
}

/// Group-chat gate: only messages containing the bot handle are processed,
/// with the handle stripped before matching. Returns `None` when the message
/// should be ignored entirely.
pub fn strip_mention(text: &str, handle: &str) -> Option<String> {
    if handle.is_empty() || !text.contains(handle) {
        return None;
    }
    Some(text.replace(handle, "").trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hello_greets_by_name() {
        let reply = small_talk("well hello there", "Ada");
        assert!(reply.contains("Ada"));
        assert!(reply.starts_with("Hey there"));
    }

    #[test]
    fn hello_matching_is_case_insensitive() {
        assert!(small_talk("HELLO!", "Ada").contains("Ada"));
    }

    #[test]
    fn how_are_you_gets_fixed_reply() {
        assert_eq!(small_talk("how are you today?", "Ada"), "I am good!");
    }

    #[test]
    fn attribution_keywords_return_fixed_string() {
        assert_eq!(small_talk("who made you?", "Ada"), ATTRIBUTION_TEXT);
        assert_eq!(small_talk("so, who created you", "Ada"), ATTRIBUTION_TEXT);
    }

    #[test]
    fn unmatched_input_cant_be_understood() {
        assert_eq!(small_talk("what's the weather", "Ada"), CANT_UNDERSTAND_TEXT);
    }

    #[test]
    fn mention_is_stripped_before_matching() {
        let stripped = strip_mention("@clip_bot hello", "@clip_bot").unwrap();
        assert_eq!(stripped, "hello");
    }

    #[test]
    fn mention_anywhere_in_text_counts() {
        let stripped = strip_mention("hello @clip_bot friend", "@clip_bot").unwrap();
        assert_eq!(stripped, "hello  friend");
    }

    #[test]
    fn message_without_mention_is_ignored() {
        assert_eq!(strip_mention("hello everyone", "@clip_bot"), None);
    }

    #[test]
    fn empty_handle_never_matches() {
        assert_eq!(strip_mention("hello", ""), None);
    }
}
