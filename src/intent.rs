/// What an inbound chat message is asking for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Start,
    Enumerate,
    Latest,
    Find(String),
    Uploads,
    /// `download` / `find` without a keyword
    MissingKeyword,
    Unknown,
}

/// Map message text to an intent.
///
/// The command word is matched exactly after trimming, lowercasing and
/// dropping the leading `/` and any `@botname` suffix. Only `download` and
/// `find` take an argument; the keyword is the rest of the text.
pub fn parse_intent(text: &str, latest_aliases: &[String]) -> Intent {
    let text = text.trim();
    let (word, rest) = match text.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (text, ""),
    };
    let command = normalize_command(word);

    match command.as_str() {
        "download" | "find" => {
            if rest.is_empty() {
                Intent::MissingKeyword
            } else {
                Intent::Find(rest.to_string())
            }
        }
        _ if !rest.is_empty() => Intent::Unknown,
        "start" | "help" => Intent::Start,
        "list" => Intent::Enumerate,
        "latest" => Intent::Latest,
        "uploads" => Intent::Uploads,
        other if latest_aliases.iter().any(|a| a.to_lowercase() == other) => Intent::Latest,
        _ => Intent::Unknown,
    }
}

fn normalize_command(word: &str) -> String {
    let word = word.strip_prefix('/').unwrap_or(word);
    let word = word.split('@').next().unwrap_or(word);
    word.to_lowercase()
}
