//! Inbound command parsing.
//!
//! Clients mutate their own record with short `prefix:payload` text frames.
//! Parsing is total: anything that does not match the grammar becomes
//! [`Command::Unrecognized`] and is dropped by the hub without a reply.

/// A decoded client command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `move:<x>,<y>`
    Move { x: i32, y: i32 },
    /// `name:<text>`
    SetName(String),
    /// `avatar:<text>`
    SetAvatar(String),
    /// `role:<text>`
    SetRole(String),
    /// `say:<text>`
    SetMessage(String),
    /// Unknown prefix or malformed payload
    Unrecognized,
}

impl Command {
    /// Decodes a raw text frame.
    ///
    /// The prefix runs up to and including the first colon; the remainder is
    /// the payload. Text payloads are trimmed, `move` payloads must be exactly
    /// two integers separated by a single comma.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lobby_server::Command;
    ///
    /// assert_eq!(Command::parse("move:3,-4"), Command::Move { x: 3, y: -4 });
    /// assert_eq!(Command::parse("name:  Alice "), Command::SetName("Alice".into()));
    /// assert_eq!(Command::parse("move:abc,4"), Command::Unrecognized);
    /// ```
    pub fn parse(text: &str) -> Self {
        let Some((prefix, payload)) = text.split_once(':') else {
            return Command::Unrecognized;
        };

        match prefix {
            "move" => parse_move(payload).unwrap_or(Command::Unrecognized),
            "name" => Command::SetName(payload.trim().to_string()),
            "avatar" => Command::SetAvatar(payload.trim().to_string()),
            "role" => Command::SetRole(payload.trim().to_string()),
            "say" => Command::SetMessage(payload.trim().to_string()),
            _ => Command::Unrecognized,
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, Command::Unrecognized)
    }

    /// Short label used in logs; never includes the payload.
    pub fn kind(&self) -> &'static str {
        match self {
            Command::Move { .. } => "move",
            Command::SetName(_) => "name",
            Command::SetAvatar(_) => "avatar",
            Command::SetRole(_) => "role",
            Command::SetMessage(_) => "say",
            Command::Unrecognized => "unrecognized",
        }
    }
}

fn parse_move(payload: &str) -> Option<Command> {
    let (x, y) = payload.split_once(',')?;
    // a second comma would land in `y` and fail the integer parse
    let x = x.parse::<i32>().ok()?;
    let y = y.parse::<i32>().ok()?;
    Some(Command::Move { x, y })
}
