use teloxide::types::BotCommand;

/// A recognised slash command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    /// Raw text after `/broadcast`, untrimmed.
    Broadcast(String),
}

/// Commands registered with Telegram for client autocomplete.
pub fn bot_commands() -> Vec<BotCommand> {
    vec![
        BotCommand::new("start", "Join the channels and unlock access"),
        BotCommand::new("broadcast", "Message every user (operators only)"),
    ]
}

/// Parse `/name[@bot] [args]`.
///
/// A mention suffix addressed to a different bot makes the command not ours.
pub fn parse_command(text: &str, bot_username: Option<&str>) -> Option<Command> {
    let body = text.strip_prefix('/')?;
    let (head, args) = body.split_once(char::is_whitespace).unwrap_or((body, ""));
    let name = match head.split_once('@') {
        Some((name, mention)) => {
            if bot_username.is_some_and(|me| !me.eq_ignore_ascii_case(mention)) {
                return None;
            }
            name
        },
        None => head,
    };

    match name {
        "start" => Some(Command::Start),
        "broadcast" => Some(Command::Broadcast(args.to_string())),
        _ => None,
    }
}
