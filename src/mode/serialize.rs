//! Writing mode changes back into MODE parameters.

use super::{ChannelMode, Mode, ModeType};
use crate::command::ChannelModeChange;

/// Encode modes as a mode string plus arguments, emitting a sign only when
/// the direction changes: `[+o bob, +v carol, -b mask]` becomes
/// `("+ov-b", ["bob", "carol", "mask"])`.
pub fn serialize_modes<T: ModeType>(modes: &[Mode<T>]) -> (String, Vec<String>) {
    let mut letters = String::new();
    let mut args = Vec::new();
    let mut current: Option<bool> = None;

    for mode in modes {
        let plus = mode.is_plus();
        if current != Some(plus) {
            letters.push(if plus { '+' } else { '-' });
            current = Some(plus);
        }
        letters.push(mode.mode().as_char());
        if let Some(arg) = mode.arg() {
            args.push(arg.to_string());
        }
    }

    (letters, args)
}

/// Build a channel MODE command applying `modes`. No modes makes a query.
pub fn apply_to(channel: &str, modes: &[Mode<ChannelMode>]) -> ChannelModeChange {
    if modes.is_empty() {
        return ChannelModeChange::query(channel);
    }
    let (letters, args) = serialize_modes(modes);
    ChannelModeChange {
        channel: channel.to_string(),
        modes: Some(letters),
        args,
    }
}

/// Split modes into groups that each carry at most `max_modes` arguments,
/// the server's `MODES` limit. `None` means no limit.
pub fn chunk_modes<T: ModeType>(modes: &[Mode<T>], max_modes: Option<usize>) -> Vec<Vec<Mode<T>>> {
    let Some(max) = max_modes else {
        return if modes.is_empty() {
            Vec::new()
        } else {
            vec![modes.to_vec()]
        };
    };
    let max = max.max(1);

    let mut chunks = Vec::new();
    let mut chunk: Vec<Mode<T>> = Vec::new();
    let mut with_args = 0;

    for mode in modes {
        let takes = mode.arg().is_some() as usize;
        if with_args + takes > max {
            chunks.push(std::mem::take(&mut chunk));
            with_args = 0;
        }
        with_args += takes;
        chunk.push(mode.clone());
    }
    if !chunk.is_empty() {
        chunks.push(chunk);
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mode::UserMode;

    #[test]
    fn signs_collapse() {
        let modes = vec![
            Mode::plus(ChannelMode::Oper, Some("bob")),
            Mode::plus(ChannelMode::Voice, Some("carol")),
            Mode::minus(ChannelMode::Ban, Some("*!*@x")),
            Mode::minus(ChannelMode::Moderated, None),
        ];
        let (letters, args) = serialize_modes(&modes);
        assert_eq!(letters, "+ov-bm");
        assert_eq!(args, vec!["bob", "carol", "*!*@x"]);
    }

    #[test]
    fn apply_builds_command() {
        let change = apply_to("#rust", &[Mode::plus(ChannelMode::Key, Some("secret"))]);
        assert_eq!(change.modes.as_deref(), Some("+k"));
        assert_eq!(change.args, vec!["secret"]);
        assert_eq!(apply_to("#rust", &[]).modes, None);
    }

    #[test]
    fn chunks_respect_argument_limit() {
        let modes: Vec<_> = ["a", "b", "c", "d"]
            .iter()
            .map(|n| Mode::plus(ChannelMode::Oper, Some(*n)))
            .chain(std::iter::once(Mode::plus(ChannelMode::Moderated, None)))
            .collect();
        let chunks = chunk_modes(&modes, Some(3));
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].len(), 3);
        assert_eq!(chunks[1].len(), 2);
        assert_eq!(chunk_modes(&modes, None).len(), 1);
    }

    #[test]
    fn user_modes_serialize() {
        let (letters, args) = serialize_modes(&[Mode::minus(UserMode::Invisible, None)]);
        assert_eq!(letters, "-i");
        assert!(args.is_empty());
    }
}
