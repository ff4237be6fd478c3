//! IRC mode parsing.

use crate::error::ModeParseError;
use crate::isupport::{ModeClass, ServerSupport};

use super::{ChannelMode, Mode, ModeType, UserMode};

/// Decode a channel mode string and its arguments.
///
/// Letters the server lists in `PREFIX` are membership modes. Other known
/// letters take arguments by their own class, and anything else falls back
/// to the server's `CHANMODES` grammar. A list mode with no argument left
/// is a list query. Letters nobody classifies take no argument.
pub fn parse_channel_modes<S: AsRef<str>>(
    modes: &str,
    args: &[S],
    support: &ServerSupport,
) -> Result<Vec<Mode<ChannelMode>>, ModeParseError> {
    parse_modes(modes, args, |letter, plus| {
        let advertised = support.mode_class(letter);
        let mode = match advertised {
            Some(ModeClass::Prefix) => ChannelMode::prefix(letter),
            _ => ChannelMode::from_char(letter),
        };
        let class = match mode {
            ChannelMode::Unknown(_) => advertised,
            _ => mode.class(),
        };
        let arity = match class {
            Some(ModeClass::Prefix) | Some(ModeClass::Parameter) => Arity::Required,
            Some(ModeClass::List) => Arity::Optional,
            Some(ModeClass::ParameterWhenSet) if plus => Arity::Required,
            Some(ModeClass::ParameterWhenSet) | Some(ModeClass::NoParameter) | None => Arity::None,
        };
        (mode, arity)
    })
}

/// Decode a user mode string. User modes take no arguments.
pub fn parse_user_modes<S: AsRef<str>>(modes: &str, args: &[S]) -> Result<Vec<Mode<UserMode>>, ModeParseError> {
    parse_modes(modes, args, |letter, _| (UserMode::from_char(letter), Arity::None))
}

enum Arity {
    None,
    Optional,
    Required,
}

fn parse_modes<T, S, F>(modes: &str, args: &[S], classify: F) -> Result<Vec<Mode<T>>, ModeParseError>
where
    T: ModeType,
    S: AsRef<str>,
    F: Fn(char, bool) -> (T, Arity),
{
    let mut res = vec![];
    let mut args = args.iter().map(AsRef::as_ref);
    // A string without a leading sign adds.
    let mut plus = true;

    for c in modes.chars() {
        match c {
            '+' => plus = true,
            '-' => plus = false,
            _ => {
                let (mode, arity) = classify(c, plus);
                let arg = match arity {
                    Arity::None => None,
                    Arity::Optional => args.next(),
                    Arity::Required => Some(args.next().ok_or(ModeParseError::MissingArgument { mode: c })?),
                };
                res.push(if plus {
                    Mode::plus(mode, arg)
                } else {
                    Mode::minus(mode, arg)
                });
            }
        }
    }

    let count = args.count();
    if count > 0 {
        return Err(ModeParseError::UnusedArguments { count });
    }

    Ok(res)
}
