/// A line of user input, decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    NextPage,
    PreviousPage,
    Redraw,
    Export,
    Restart,
    Help,
    Quit,
}

pub fn parse_command(line: &str) -> Option<Command> {
    match line.trim().to_ascii_lowercase().as_str() {
        "n" | "next" | "]" => Some(Command::NextPage),
        "p" | "prev" | "previous" | "[" => Some(Command::PreviousPage),
        "r" | "refresh" | "" => Some(Command::Redraw),
        "e" | "export" => Some(Command::Export),
        "s" | "start" | "restart" => Some(Command::Restart),
        "h" | "help" | "?" => Some(Command::Help),
        "q" | "quit" | "exit" => Some(Command::Quit),
        _ => None,
    }
}
