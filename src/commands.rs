//! Built-in bot commands and their fixed reply texts.

use pictor_core::error::PictorError;

/// Known bot commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    /// `/generate` with its arguments joined by single spaces (may be empty).
    Generate(String),
}

impl Command {
    /// Parse a command from message text. Returns `None` for plain text,
    /// unknown `/` prefixes, and commands addressed to another bot.
    ///
    /// A `@botname` suffix (e.g. "/help@pictor_bot") is accepted only when it
    /// names `bot_username`, compared case-insensitively.
    pub fn parse(text: &str, bot_username: Option<&str>) -> Option<Self> {
        let mut words = text.split_whitespace();
        let first = words.next()?;
        let cmd = match first.split_once('@') {
            Some((cmd, addressee)) => {
                let ours = bot_username.is_some_and(|me| me.eq_ignore_ascii_case(addressee));
                if !ours {
                    return None;
                }
                cmd
            }
            None => first,
        };
        match cmd {
            "/start" => Some(Self::Start),
            "/help" => Some(Self::Help),
            "/generate" => Some(Self::Generate(words.collect::<Vec<_>>().join(" "))),
            _ => None,
        }
    }
}

pub const HELP_TEXT: &str = "*How to use me:*\n\
1. Use the `/generate` command followed by a description of the image you want.\n   \
Example: `/generate A fluffy white cat sleeping on a bookshelf`\n\n\
2. Be descriptive! The more detail you provide, the better the AI can understand your request.\n\n\
*Important Note:* Image generation can take a few moments. Please be patient.";

pub const GENERATE_USAGE: &str = "Please provide a description after the /generate command.\n\
Example: `/generate A serene beach with palm trees`";

pub const PROCESSING: &str = "✨ Generating your image... Please wait.";

/// Greeting for `/start`.
pub fn welcome(first_name: &str) -> String {
    format!(
        "Hi {first_name}! 👋\n\n\
         I can generate images based on your descriptions using Google's AI.\n\n\
         Use the command `/generate <your detailed description>` to create an image.\n\n\
         Example:\n`/generate A futuristic cityscape at sunset, cyberpunk style`"
    )
}

/// Caption attached to a generated image.
pub fn caption(prompt: &str) -> String {
    format!("Here's the image for: \"{prompt}\"\n\nGenerated by Google AI.")
}

/// Text that replaces the processing notice when generation fails.
pub fn apology(err: &PictorError, first_name: &str) -> String {
    match err {
        PictorError::Blocked(_) => format!(
            "Sorry {first_name}, your request was blocked due to safety reasons. \
             Please try a different prompt."
        ),
        PictorError::Stopped(_) => format!(
            "Sorry {first_name}, the generation was stopped. This might be due to safety \
             filters or content policy. Please refine your prompt."
        ),
        PictorError::NoImage => format!(
            "Sorry {first_name}, I couldn't generate an image for that prompt. The AI might \
             not have understood, or there was an internal error."
        ),
        _ => format!(
            "Sorry {first_name}, an unexpected error occurred while trying to generate the \
             image. Please try again later."
        ),
    }
}
