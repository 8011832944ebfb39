//! The `--query` language.
//!
//! ```text
//! title:/^pay/ AND (tag:bills OR project:Home) -notes:draft
//! ```
//!
//! Terms are `field:value`, `field:/regex/`, `field:"quoted value"` or bare
//! words, which match the title or notes. Adjacent terms are joined with an
//! implicit `AND`. `NOT term` and `-term` negate. Text matches are
//! case-insensitive substrings; regexes are case-insensitive too.

use anyhow::Result;
use anyhow::anyhow;
use anyhow::bail;
use chrono::NaiveDate;
use regex_lite::Regex;
use regex_lite::RegexBuilder;
use things_core::when::parse_day;
use things_store::Status;
use things_store::Task;

use crate::query::urls_in;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Notes,
    Tag,
    Project,
    Area,
    Heading,
    Status,
    Uuid,
    Start,
    Deadline,
    Url,
}

impl Field {
    const NAMES: &'static str =
        "title, notes, tag, project, area, heading, status, uuid, start, deadline, url";

    fn parse(name: &str) -> Option<Self> {
        let field = match name.to_ascii_lowercase().as_str() {
            "title" => Field::Title,
            "notes" => Field::Notes,
            "tag" | "tags" => Field::Tag,
            "project" => Field::Project,
            "area" => Field::Area,
            "heading" => Field::Heading,
            "status" => Field::Status,
            "uuid" | "id" => Field::Uuid,
            "start" => Field::Start,
            "deadline" => Field::Deadline,
            "url" => Field::Url,
            _ => return None,
        };
        Some(field)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    LParen,
    RParen,
    And,
    Or,
    Not,
    Term {
        field: Option<String>,
        value: RawValue,
    },
}

#[derive(Debug, Clone, PartialEq)]
enum RawValue {
    Text(String),
    Regex(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DateOp {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
}

#[derive(Debug, Clone)]
enum Matcher {
    /// Lowercased needle.
    Text(String),
    Regex(Regex),
    Date(DateOp, NaiveDate),
    /// `deadline:none` / `url:false` when false, `deadline:any` / `url:true` when true.
    Present(bool),
}

impl Matcher {
    fn text(&self, haystack: &str) -> bool {
        match self {
            Matcher::Text(needle) => haystack.to_lowercase().contains(needle.as_str()),
            Matcher::Regex(re) => re.is_match(haystack),
            Matcher::Date(..) => false,
            Matcher::Present(want) => !haystack.is_empty() == *want,
        }
    }

    fn exact(&self, value: &str) -> bool {
        match self {
            Matcher::Text(needle) => value.to_lowercase() == *needle,
            _ => self.text(value),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Term {
    field: Option<Field>,
    matcher: Matcher,
}

impl Term {
    fn matches(&self, task: &Task) -> bool {
        let m = &self.matcher;
        let Some(field) = self.field else {
            return m.text(&task.title) || m.text(&task.notes);
        };
        match field {
            Field::Title => m.text(&task.title),
            Field::Notes => m.text(&task.notes),
            Field::Heading => m.text(&task.heading_title),
            Field::Project => m.text(&task.project_title) || m.exact(&task.project_id),
            Field::Area => m.text(&task.area_title) || m.exact(&task.area_id),
            Field::Tag => match m {
                Matcher::Present(want) => !task.tags.is_empty() == *want,
                _ => task.tags.iter().any(|tag| m.exact(tag)),
            },
            Field::Status => match m {
                Matcher::Text(needle) => {
                    needle == "any"
                        || Status::parse(needle).is_some_and(|status| status == task.status)
                }
                _ => m.text(task.status.label()),
            },
            Field::Uuid => match m {
                Matcher::Text(needle) => task.uuid.to_lowercase().starts_with(needle.as_str()),
                _ => m.text(&task.uuid),
            },
            Field::Start => m.exact(task.start.label()),
            Field::Deadline => match m {
                Matcher::Date(op, date) => {
                    match NaiveDate::parse_from_str(&task.deadline, "%Y-%m-%d") {
                        Ok(deadline) => match op {
                            DateOp::Lt => deadline < *date,
                            DateOp::Le => deadline <= *date,
                            DateOp::Gt => deadline > *date,
                            DateOp::Ge => deadline >= *date,
                            DateOp::Eq => deadline == *date,
                        },
                        Err(_) => false,
                    }
                }
                _ => m.text(&task.deadline),
            },
            Field::Url => {
                let urls = urls_in(&task.notes);
                match m {
                    Matcher::Present(want) => !urls.is_empty() == *want,
                    _ => urls.iter().any(|url| m.text(url)),
                }
            }
        }
    }
}

/// A parsed `--query` expression.
#[derive(Debug, Clone)]
pub enum Expr {
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Not(Box<Expr>),
    Term(Term),
}

impl Expr {
    pub fn parse(input: &str) -> Result<Self> {
        let tokens = tokenize(input)?;
        if tokens.is_empty() {
            bail!("empty query");
        }
        let mut parser = Parser { tokens, pos: 0 };
        let expr = parser.or()?;
        match parser.peek() {
            None => Ok(expr),
            Some(Token::RParen) => bail!("unbalanced ')' in query"),
            Some(token) => bail!("unexpected {token:?} in query"),
        }
    }

    pub fn matches(&self, task: &Task) -> bool {
        match self {
            Expr::And(left, right) => left.matches(task) && right.matches(task),
            Expr::Or(left, right) => left.matches(task) || right.matches(task),
            Expr::Not(inner) => !inner.matches(task),
            Expr::Term(term) => term.matches(task),
        }
    }
}

fn tokenize(input: &str) -> Result<Vec<Token>> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            i += 1;
            continue;
        }
        match c {
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
                continue;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
                continue;
            }
            '-' if chars.get(i + 1).is_some_and(|n| !n.is_whitespace()) => {
                tokens.push(Token::Not);
                i += 1;
                continue;
            }
            _ => {}
        }

        if c == '"' {
            let (text, next) = read_quoted(&chars, i)?;
            tokens.push(Token::Term {
                field: None,
                value: RawValue::Text(text),
            });
            i = next;
            continue;
        }

        let start = i;
        while i < chars.len() && is_word_char(chars[i]) && chars[i] != ':' {
            i += 1;
        }
        let word: String = chars[start..i].iter().collect();
        let is_field = i < chars.len()
            && chars[i] == ':'
            && !word.is_empty()
            && !chars[i + 1..].starts_with(&['/', '/']);
        if is_field {
            i += 1;
            let (value, next) = match chars.get(i) {
                Some('"') => {
                    let (text, next) = read_quoted(&chars, i)?;
                    (RawValue::Text(text), next)
                }
                Some('/') => {
                    let (pattern, next) = read_regex(&chars, i)?;
                    (RawValue::Regex(pattern), next)
                }
                _ => {
                    let (text, next) = read_word(&chars, i);
                    (RawValue::Text(text), next)
                }
            };
            tokens.push(Token::Term {
                field: Some(word),
                value,
            });
            i = next;
            continue;
        }

        let (rest, next) = read_word(&chars, i);
        let word = format!("{word}{rest}");
        i = next;
        let token = match word.as_str() {
            "AND" | "&&" => Token::And,
            "OR" | "||" => Token::Or,
            "NOT" | "!" => Token::Not,
            _ => Token::Term {
                field: None,
                value: RawValue::Text(word),
            },
        };
        tokens.push(token);
    }
    Ok(tokens)
}

fn is_word_char(c: char) -> bool {
    !c.is_whitespace() && c != '(' && c != ')'
}

fn read_word(chars: &[char], start: usize) -> (String, usize) {
    let mut i = start;
    while i < chars.len() && is_word_char(chars[i]) {
        i += 1;
    }
    (chars[start..i].iter().collect(), i)
}

/// `start` points at the opening quote. `\"` escapes a quote.
fn read_quoted(chars: &[char], start: usize) -> Result<(String, usize)> {
    let mut out = String::new();
    let mut i = start + 1;
    while i < chars.len() {
        match chars[i] {
            '\\' if chars.get(i + 1) == Some(&'"') => {
                out.push('"');
                i += 2;
            }
            '"' => return Ok((out, i + 1)),
            c => {
                out.push(c);
                i += 1;
            }
        }
    }
    bail!("unterminated quote in query")
}

/// `start` points at the opening slash. `\/` escapes a slash.
fn read_regex(chars: &[char], start: usize) -> Result<(String, usize)> {
    let mut out = String::new();
    let mut i = start + 1;
    while i < chars.len() {
        match chars[i] {
            '\\' if chars.get(i + 1) == Some(&'/') => {
                out.push('/');
                i += 2;
            }
            '/' => return Ok((out, i + 1)),
            c => {
                out.push(c);
                i += 1;
            }
        }
    }
    bail!("unterminated regex in query")
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn or(&mut self) -> Result<Expr> {
        let mut expr = self.and()?;
        while self.peek() == Some(&Token::Or) {
            self.pos += 1;
            let right = self.and()?;
            expr = Expr::Or(Box::new(expr), Box::new(right));
        }
        Ok(expr)
    }

    fn and(&mut self) -> Result<Expr> {
        let mut expr = self.unary()?;
        loop {
            match self.peek() {
                Some(Token::And) => {
                    self.pos += 1;
                }
                Some(Token::Not | Token::LParen | Token::Term { .. }) => {}
                _ => return Ok(expr),
            }
            let right = self.unary()?;
            expr = Expr::And(Box::new(expr), Box::new(right));
        }
    }

    fn unary(&mut self) -> Result<Expr> {
        match self.next() {
            Some(Token::Not) => Ok(Expr::Not(Box::new(self.unary()?))),
            Some(Token::LParen) => {
                let expr = self.or()?;
                match self.next() {
                    Some(Token::RParen) => Ok(expr),
                    _ => bail!("missing ')' in query"),
                }
            }
            Some(Token::Term { field, value }) => Ok(Expr::Term(build_term(field, value)?)),
            Some(token) => bail!("unexpected {token:?} in query"),
            None => bail!("query ended unexpectedly"),
        }
    }
}

fn build_term(field: Option<String>, value: RawValue) -> Result<Term> {
    let field = match field {
        None => None,
        Some(name) => Some(Field::parse(&name).ok_or_else(|| {
            anyhow!("unknown query field {name:?} (valid: {})", Field::NAMES)
        })?),
    };
    let matcher = match value {
        RawValue::Regex(pattern) => Matcher::Regex(
            RegexBuilder::new(&pattern)
                .case_insensitive(true)
                .build()
                .map_err(|err| anyhow!("invalid regex /{pattern}/ in query: {err}"))?,
        ),
        RawValue::Text(text) => text_matcher(field, &text)?,
    };
    Ok(Term { field, matcher })
}

fn text_matcher(field: Option<Field>, text: &str) -> Result<Matcher> {
    let lower = text.trim().to_lowercase();
    match field {
        Some(Field::Deadline) => {
            if lower == "none" {
                return Ok(Matcher::Present(false));
            }
            if lower == "any" {
                return Ok(Matcher::Present(true));
            }
            let (op, date) = if let Some(rest) = lower.strip_prefix("<=") {
                (DateOp::Le, rest)
            } else if let Some(rest) = lower.strip_prefix(">=") {
                (DateOp::Ge, rest)
            } else if let Some(rest) = lower.strip_prefix('<') {
                (DateOp::Lt, rest)
            } else if let Some(rest) = lower.strip_prefix('>') {
                (DateOp::Gt, rest)
            } else {
                (DateOp::Eq, lower.as_str())
            };
            Ok(Matcher::Date(op, parse_day(date)?))
        }
        Some(Field::Url) | Some(Field::Tag) if matches!(lower.as_str(), "true" | "yes") => {
            Ok(Matcher::Present(true))
        }
        Some(Field::Url) | Some(Field::Tag)
            if matches!(lower.as_str(), "false" | "no" | "none") =>
        {
            Ok(Matcher::Present(false))
        }
        Some(Field::Status) if Status::parse(&lower).is_none() && lower != "any" => {
            bail!("unknown status {text:?} in query (incomplete, completed, canceled)")
        }
        _ if lower.is_empty() => bail!("empty value in query"),
        _ => Ok(Matcher::Text(lower)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> Task {
        let mut task = Task::new("ABC123", "Pay rent");
        task.notes = "see https://bank.example/pay".to_string();
        task.tags = vec!["Bills".to_string(), "home".to_string()];
        task.project_id = "P1".to_string();
        task.project_title = "Household".to_string();
        task.deadline = "2026-02-01".to_string();
        task
    }

    fn check(query: &str) -> bool {
        Expr::parse(query).unwrap().matches(&sample())
    }

    #[test]
    fn bare_words_search_title_and_notes() {
        assert!(check("rent"));
        assert!(check("BANK"));
        assert!(!check("groceries"));
        assert!(check("\"pay rent\""));
    }

    #[test]
    fn fields_and_regex() {
        assert!(check("title:/^pay\\s/"));
        assert!(!check("title:/^rent/"));
        assert!(check("tag:bills"));
        assert!(!check("tag:bill"));
        assert!(check("project:house"));
        assert!(check("project:p1"));
        assert!(check("status:open"));
        assert!(check("uuid:abc"));
        assert!(check("start:inbox"));
        assert!(check("url:true"));
        assert!(check("url:bank.example"));
        assert!(check("notes:\"see https\""));
    }

    #[test]
    fn boolean_operators() {
        assert!(check("rent AND tag:home"));
        assert!(check("rent tag:home"));
        assert!(check("groceries OR tag:home"));
        assert!(!check("rent -tag:home"));
        assert!(check("NOT groceries"));
        assert!(check("(groceries OR rent) AND NOT tag:work"));
        assert!(!check("groceries OR (rent AND tag:work)"));
    }

    #[test]
    fn deadline_comparisons() {
        assert!(check("deadline:<2026-03-01"));
        assert!(check("deadline:<=2026-02-01"));
        assert!(!check("deadline:>2026-02-01"));
        assert!(check("deadline:2026-02-01"));
        assert!(check("deadline:any"));
        assert!(!check("deadline:none"));
    }

    #[test]
    fn urls_in_bare_words_are_text() {
        let tokens = tokenize("https://bank.example").unwrap();
        assert_eq!(
            tokens,
            vec![Token::Term {
                field: None,
                value: RawValue::Text("https://bank.example".to_string())
            }]
        );
        assert!(check("https://bank.example"));
    }

    #[test]
    fn reports_syntax_errors() {
        for (query, needle) in [
            ("", "empty query"),
            ("(rent", "missing ')'"),
            ("rent)", "unbalanced"),
            ("title:\"open", "unterminated quote"),
            ("title:/open", "unterminated regex"),
            ("colour:red", "unknown query field"),
            ("status:later", "unknown status"),
            ("title:/(/", "invalid regex"),
            ("rent AND", "ended unexpectedly"),
        ] {
            let err = Expr::parse(query).unwrap_err().to_string();
            assert!(err.contains(needle), "{query}: {err}");
        }
    }
}
