//! Utility functions for IRC protocol handling.
//!
//! Line-length limits and the batching helper used when a list of targets
//! has to be spread over several lines.

/// Maximum length of one wire line, including the CRLF terminator.
pub const MAX_LINE_LENGTH: usize = 512;

/// Maximum length of a line's content (CRLF excluded) accepted by the parser.
pub const MAX_PARSE_LENGTH: usize = 512;

/// The line terminator appended to every outgoing line.
pub const LINE_TERMINATOR: &str = "\r\n";

/// Checks if a line would exceed the wire ceiling once terminated.
///
/// Returns `Some(len)` with the terminated length if it exceeds
/// [`MAX_LINE_LENGTH`], or `None` if it fits.
#[inline]
pub fn check_line_length(line: &str) -> Option<usize> {
    let len = if line.ends_with('\n') {
        line.len()
    } else {
        line.len() + LINE_TERMINATOR.len()
    };
    if len > MAX_LINE_LENGTH {
        Some(len)
    } else {
        None
    }
}

/// Groups items so that each group, joined with `separator`, fits in `budget`
/// bytes and holds at most `max_items` entries.
///
/// An item longer than the budget on its own still gets a group of its own;
/// the caller's line-length check rejects it later.
///
/// # Examples
///
/// ```
/// use nebo_irc::util::pack_items;
///
/// let nicks = ["alice", "bob", "carol"];
/// let groups = pack_items(nicks.iter().copied(), 1, 9, usize::MAX);
/// assert_eq!(groups, vec![vec!["alice", "bob"], vec!["carol"]]);
/// ```
pub fn pack_items<'a, I>(
    items: I,
    separator_len: usize,
    budget: usize,
    max_items: usize,
) -> Vec<Vec<&'a str>>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut groups: Vec<Vec<&'a str>> = Vec::new();
    let mut current: Vec<&'a str> = Vec::new();
    let mut used = 0;

    for item in items {
        let extra = if current.is_empty() {
            item.len()
        } else {
            separator_len + item.len()
        };
        if !current.is_empty() && (used + extra > budget || current.len() >= max_items.max(1)) {
            groups.push(std::mem::take(&mut current));
            used = 0;
        }
        used += if current.is_empty() {
            item.len()
        } else {
            separator_len + item.len()
        };
        current.push(item);
    }

    if !current.is_empty() {
        groups.push(current);
    }
    groups
}
