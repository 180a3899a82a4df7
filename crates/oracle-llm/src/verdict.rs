//! Reply parsing.
//!
//! Backends are asked to answer with a single line of the form
//! `APPROVED: <reason>` or `DENIED: <reason>`. Anything else is
//! `Inconclusive`, never `Approved`.
//!
//! A keyword only counts when it opens the line and is followed by the end
//! of the line or a `:`/`-` separator. The answer line must not mention
//! either keyword again; `APPROVED or DENIED? DENIED` is a question echoed
//! back, not an approval.

use oracle_core::Verdict;

const APPROVED: &str = "APPROVED";
const DENIED: &str = "DENIED";

/// Turns backend reply text into a verdict and its reason.
pub trait ReplyParser: Send + Sync {
    /// Parse `reply`. Unparseable text yields `Inconclusive` with an empty reason.
    fn parse(&self, reply: &str) -> (Verdict, String);
}

/// Keyword parser for the `VERDICT: reason` answer format.
///
/// Strict mode only reads the first non-empty line. Lenient mode takes the
/// first line anywhere in the reply that opens with a keyword, which suits
/// local models that think out loud before answering. A malformed keyword
/// line ends the search as `Inconclusive`; later lines are not consulted.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordParser {
    lenient: bool,
}

impl KeywordParser {
    /// First non-empty line only
    pub fn strict() -> Self {
        Self { lenient: false }
    }

    /// First keyword line anywhere
    pub fn lenient() -> Self {
        Self { lenient: true }
    }
}

impl ReplyParser for KeywordParser {
    fn parse(&self, reply: &str) -> (Verdict, String) {
        let mut lines = reply.lines().filter(|line| !line.trim().is_empty());
        let found = if self.lenient {
            lines.find_map(parse_line)
        } else {
            lines.next().and_then(parse_line)
        };
        found.unwrap_or_else(inconclusive)
    }
}

fn is_decoration(c: char) -> bool {
    c.is_whitespace() || matches!(c, '*' | '#' | '`' | '>' | '_' | '"' | '\'')
}

fn is_separator(c: char) -> bool {
    matches!(c, ':' | '-' | '–' | '—')
}

fn mentions_keyword(text: &str) -> bool {
    let upper = text.to_ascii_uppercase();
    upper.contains(APPROVED) || upper.contains(DENIED)
}

fn inconclusive() -> (Verdict, String) {
    (Verdict::Inconclusive, String::new())
}

/// `None` when the line does not open with a keyword at all
fn parse_line(line: &str) -> Option<(Verdict, String)> {
    let line = line.trim_start_matches(is_decoration);
    let (verdict, rest) = strip_keyword(line, APPROVED)
        .map(|rest| (Verdict::Approved, rest))
        .or_else(|| strip_keyword(line, DENIED).map(|rest| (Verdict::Denied, rest)))?;

    let rest = rest.trim_start_matches(is_decoration);
    let mut chars = rest.chars();
    let reason = match chars.next() {
        None => "",
        Some(c) if is_separator(c) => chars.as_str(),
        Some(_) => return Some(inconclusive()),
    };
    if mentions_keyword(reason) {
        return Some(inconclusive());
    }

    let reason = reason
        .trim_start_matches(|c: char| is_decoration(c) || is_separator(c) || matches!(c, '.' | ','))
        .trim_end_matches(is_decoration)
        .to_string();
    Some((verdict, reason))
}

/// Case-insensitive keyword prefix that ends on a word boundary
fn strip_keyword<'a>(line: &'a str, keyword: &str) -> Option<&'a str> {
    let head = line.get(..keyword.len())?;
    if !head.eq_ignore_ascii_case(keyword) {
        return None;
    }
    let rest = &line[keyword.len()..];
    match rest.chars().next() {
        Some(c) if c.is_alphanumeric() => None,
        _ => Some(rest),
    }
}
