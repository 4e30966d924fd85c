//! Inline paragraph markup.
//!
//! Supports `<b>`/`<strong>`, `<i>`/`<em>`, `<br/>`, a leading `<bullet>...</bullet>`
//! and HTML entities such as `&bull;` or `&amp;`. Anything else in angle brackets
//! is dropped with a warning. A `<` not followed by a letter or `/` is plain text.

use log::warn;

#[derive(Clone, Debug, PartialEq)]
pub struct Run {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Span {
    Text(Run),
    LineBreak,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Markup {
    pub spans: Vec<Span>,
    pub bullet: Option<String>,
}

#[derive(Default)]
struct State {
    bold: usize,
    italic: usize,
    in_bullet: bool,
    bullet: Option<String>,
    spans: Vec<Span>,
}

impl State {
    fn push_text(&mut self, raw: &str) {
        if raw.is_empty() {
            return;
        }
        let text = html_escape::decode_html_entities(raw).to_string();
        if self.in_bullet {
            self.bullet.get_or_insert_with(String::new).push_str(&text);
            return;
        }
        let bold = self.bold > 0;
        let italic = self.italic > 0;
        if let Some(Span::Text(last)) = self.spans.last_mut() {
            if last.bold == bold && last.italic == italic {
                last.text.push_str(&text);
                return;
            }
        }
        self.spans.push(Span::Text(Run { text, bold, italic }));
    }

    fn apply_tag(&mut self, tag: &str) {
        let tag = tag.trim();
        let closing = tag.starts_with('/');
        let name = tag
            .trim_start_matches('/')
            .trim_end_matches('/')
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();

        match (name.as_str(), closing) {
            ("b" | "strong", false) => self.bold += 1,
            ("b" | "strong", true) => self.bold = self.bold.saturating_sub(1),
            ("i" | "em", false) => self.italic += 1,
            ("i" | "em", true) => self.italic = self.italic.saturating_sub(1),
            ("br", _) => self.spans.push(Span::LineBreak),
            ("bullet", false) => self.in_bullet = true,
            ("bullet", true) => self.in_bullet = false,
            _ => warn!("Dropping unsupported markup tag <{tag}>"),
        }
    }
}

pub fn parse(text: &str) -> Markup {
    let mut state = State::default();
    let mut rest = text;

    while let Some(open) = rest.find('<') {
        let opens_tag = rest[open + 1..]
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '/');
        let close = rest[open..].find('>');
        match close {
            Some(close) if opens_tag => {
                state.push_text(&rest[..open]);
                state.apply_tag(&rest[open + 1..open + close]);
                rest = &rest[open + close + 1..];
            }
            Some(_) => {
                // a bare comparison, not a tag
                state.push_text(&rest[..=open]);
                rest = &rest[open + 1..];
            }
            None => break,
        }
    }
    state.push_text(rest);

    Markup {
        spans: state.spans,
        bullet: state.bullet,
    }
}

/// The visible text of a marked-up string with line breaks flattened to spaces
pub fn plain_text(text: &str) -> String {
    parse(text)
        .spans
        .iter()
        .map(|span| match span {
            Span::Text(run) => run.text.as_str(),
            Span::LineBreak => " ",
        })
        .collect::<String>()
}
