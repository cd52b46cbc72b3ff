//! Command parser
//!
//! Recognizes the pairing commands at the start of a message. A configured
//! prefix must precede the command name; aliases are matched exactly.

/// Names of the random pairing command
const WAIFU_ALIASES: &[&str] = &["waifu", "marry", "娶群友", "今日老婆"];

/// Names of the forced pairing command
const FORCE_MARRY_ALIASES: &[&str] = &["force-marry", "强娶"];

/// A recognized command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Waifu,
    ForceMarry { target: Option<String> },
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Waifu => "waifu",
            Self::ForceMarry { .. } => "force-marry",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CommandParser {
    prefix: String,
    force_marry: bool,
}

impl CommandParser {
    /// `force_marry` registers the forced pairing command
    pub fn new(prefix: impl Into<String>, force_marry: bool) -> Self {
        Self {
            prefix: prefix.into(),
            force_marry,
        }
    }

    pub fn parse(&self, content: &str) -> Option<Command> {
        let content = content.trim_start();
        let content = content.strip_prefix(self.prefix.as_str())?;
        let (name, rest) = match content.find(char::is_whitespace) {
            Some(at) => (&content[..at], content[at..].trim()),
            None => (content, ""),
        };

        if WAIFU_ALIASES.contains(&name) {
            return Some(Command::Waifu);
        }
        if self.force_marry && FORCE_MARRY_ALIASES.contains(&name) {
            return Some(Command::ForceMarry {
                target: first_argument(rest),
            });
        }
        None
    }
}

/// First argument, keeping an `<at .../>` element whole
fn first_argument(rest: &str) -> Option<String> {
    if rest.is_empty() {
        return None;
    }
    let arg = if rest.starts_with('<') {
        rest.find("/>").map_or(rest, |end| &rest[..end + 2])
    } else {
        rest.split_whitespace().next().unwrap_or(rest)
    };
    Some(arg.to_string())
}
