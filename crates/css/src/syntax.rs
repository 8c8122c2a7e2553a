// A simple selector: "div", "#id", ".class", "[attr=value]", "*"
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Selector {
    Universal,
    Type(String),  // element/tag selector
    Id(String),    // #id selector
    Class(String), // .class selector
    Attribute { name: String, value: Option<String> },
}

// Simple selectors that must all match the same element: "div.item#main"
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Compound {
    pub parts: Vec<Selector>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Combinator {
    Descendant, // "a b"
    Child,      // "a > b"
}

// "ul > li .label" is stored right-to-left: subject = ".label",
// ancestors = [(Descendant, "li"), (Child, "ul")]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComplexSelector {
    pub subject: Compound,
    pub ancestors: Vec<(Combinator, Compound)>,
}

// Comma separated alternatives: "li.done, li.skipped"
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectorList {
    pub selectors: Vec<ComplexSelector>,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SelectorError {
    #[error("empty selector")]
    Empty,
    #[error("unexpected character {found:?} at byte {at}")]
    Unexpected { found: char, at: usize },
    #[error("combinator without a selector on both sides")]
    DanglingCombinator,
    #[error("unterminated attribute selector")]
    UnterminatedAttribute,
}

// input: "div.item, #main > span"
// output: SelectorList with two complex selectors
pub fn parse_selector_list(input: &str) -> Result<SelectorList, SelectorError> {
    let selectors = input
        .split(',')
        .map(parse_complex)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(SelectorList { selectors })
}

fn parse_complex(input: &str) -> Result<ComplexSelector, SelectorError> {
    let mut compounds: Vec<Compound> = Vec::new();
    let mut combinators: Vec<Combinator> = Vec::new();
    let mut pending: Option<Combinator> = None;

    let mut pos = skip_whitespace(input, 0);
    if pos == input.len() {
        return Err(SelectorError::Empty);
    }
    while pos < input.len() {
        if input[pos..].starts_with('>') {
            if compounds.is_empty() || pending.is_some() {
                return Err(SelectorError::DanglingCombinator);
            }
            pending = Some(Combinator::Child);
            pos = skip_whitespace(input, pos + 1);
            continue;
        }
        let end = compound_end(input, pos)?;
        let compound = parse_compound(input, pos, end)?;
        if !compounds.is_empty() {
            combinators.push(pending.take().unwrap_or(Combinator::Descendant));
        }
        compounds.push(compound);
        pos = skip_whitespace(input, end);
    }
    if pending.is_some() {
        return Err(SelectorError::DanglingCombinator);
    }

    let Some(subject) = compounds.pop() else {
        return Err(SelectorError::Empty);
    };
    let ancestors = combinators
        .into_iter()
        .rev()
        .zip(compounds.into_iter().rev())
        .collect();
    Ok(ComplexSelector { subject, ancestors })
}

fn skip_whitespace(input: &str, mut pos: usize) -> usize {
    while let Some(c) = input[pos..].chars().next() {
        if !c.is_whitespace() {
            break;
        }
        pos += c.len_utf8();
    }
    pos
}

// End of the compound starting at `start`: the next whitespace or '>' outside brackets.
fn compound_end(input: &str, start: usize) -> Result<usize, SelectorError> {
    let mut in_brackets = false;
    for (offset, c) in input[start..].char_indices() {
        match c {
            '[' => in_brackets = true,
            ']' => in_brackets = false,
            c if !in_brackets && (c.is_whitespace() || c == '>') => return Ok(start + offset),
            _ => {}
        }
    }
    if in_brackets {
        return Err(SelectorError::UnterminatedAttribute);
    }
    Ok(input.len())
}

fn parse_compound(input: &str, start: usize, end: usize) -> Result<Compound, SelectorError> {
    let mut parts = Vec::new();
    let mut pos = start;

    if input[pos..end].starts_with('*') {
        parts.push(Selector::Universal);
        pos += 1;
    } else {
        let name = read_ident(input, pos, end);
        if !name.is_empty() {
            parts.push(Selector::Type(name.to_ascii_lowercase()));
            pos += name.len();
        }
    }

    while pos < end {
        let Some(c) = input[pos..end].chars().next() else {
            break;
        };
        match c {
            '#' | '.' => {
                let ident = read_ident(input, pos + 1, end);
                if ident.is_empty() {
                    return Err(unexpected(input, pos + 1, c));
                }
                parts.push(if c == '#' {
                    Selector::Id(ident.to_string())
                } else {
                    Selector::Class(ident.to_string())
                });
                pos += 1 + ident.len();
            }
            '[' => {
                let close = input[pos..end]
                    .find(']')
                    .map(|i| pos + i)
                    .ok_or(SelectorError::UnterminatedAttribute)?;
                parts.push(parse_attribute(input, pos + 1, close)?);
                pos = close + 1;
            }
            other => return Err(SelectorError::Unexpected { found: other, at: pos }),
        }
    }

    if parts.is_empty() {
        return Err(SelectorError::Empty);
    }
    Ok(Compound { parts })
}

// input: `data-role`, `type=checkbox`, `title="a b"`
fn parse_attribute(input: &str, start: usize, end: usize) -> Result<Selector, SelectorError> {
    let body = &input[start..end];
    let (name, value) = match body.split_once('=') {
        Some((n, v)) => {
            let v = v.trim();
            let v = v
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .or_else(|| v.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
                .unwrap_or(v);
            (n.trim(), Some(v.to_string()))
        }
        None => (body.trim(), None),
    };
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !valid {
        return Err(unexpected(input, start, '['));
    }
    Ok(Selector::Attribute {
        name: name.to_ascii_lowercase(),
        value,
    })
}

fn read_ident(input: &str, start: usize, end: usize) -> &str {
    let len = input[start..end]
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
        .unwrap_or(end - start);
    &input[start..start + len]
}

fn unexpected(input: &str, at: usize, fallback: char) -> SelectorError {
    let found = input[at..].chars().next().unwrap_or(fallback);
    SelectorError::Unexpected { found, at }
}
