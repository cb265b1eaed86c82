//! Inline SVG preparation.
//!
//! Exported vectors are pasted into one document, so every internal
//! `id="…"` and the `url(#…)` / `href="#…"` references pointing at it get
//! a per-node suffix. Scanning is built on `winnow` 0.7.

use winnow::ascii::{multispace0, multispace1};
use winnow::combinator::{alt, delimited, opt};
use winnow::prelude::*;
use winnow::token::{one_of, take, take_till, take_until};

/// One scanned piece of SVG text.
#[derive(Debug, PartialEq)]
enum Token<'a> {
    /// ` id="name"`
    Id {
        lead: &'a str,
        quote: char,
        name: &'a str,
    },
    /// ` href="#name"` or ` xlink:href="#name"`
    Href {
        lead: &'a str,
        attr: &'a str,
        quote: char,
        name: &'a str,
    },
    /// `url(#name)`
    Url(&'a str),
    /// Anything else, copied through.
    Text(&'a str),
}

impl Token<'_> {
    fn write(&self, out: &mut String, suffix: &str) {
        match self {
            Token::Id { lead, quote, name } => {
                out.push_str(lead);
                out.push_str(&format!("id={quote}{name}-{suffix}{quote}"));
            }
            Token::Href {
                lead,
                attr,
                quote,
                name,
            } => {
                out.push_str(lead);
                out.push_str(&format!("{attr}={quote}#{name}-{suffix}{quote}"));
            }
            Token::Url(name) => out.push_str(&format!("url(#{name}-{suffix})")),
            Token::Text(text) => out.push_str(text),
        }
    }
}

fn id_attr<'a>(input: &mut &'a str) -> ModalResult<Token<'a>> {
    let lead = multispace1.parse_next(input)?;
    "id=".parse_next(input)?;
    let mut quote = one_of(['"', '\'']).parse_next(input)?;
    let name = take_till(0.., move |c: char| c == quote).parse_next(input)?;
    quote.parse_next(input)?;
    Ok(Token::Id { lead, quote, name })
}

fn href_attr<'a>(input: &mut &'a str) -> ModalResult<Token<'a>> {
    let lead = multispace1.parse_next(input)?;
    let attr = alt(("xlink:href", "href")).parse_next(input)?;
    '='.parse_next(input)?;
    let mut quote = one_of(['"', '\'']).parse_next(input)?;
    '#'.parse_next(input)?;
    let name = take_till(0.., move |c: char| c == quote).parse_next(input)?;
    quote.parse_next(input)?;
    Ok(Token::Href {
        lead,
        attr,
        quote,
        name,
    })
}

fn url_ref<'a>(input: &mut &'a str) -> ModalResult<Token<'a>> {
    delimited("url(#", take_till(0.., ')'), ')')
        .map(Token::Url)
        .parse_next(input)
}

fn passthrough<'a>(input: &mut &'a str) -> ModalResult<Token<'a>> {
    alt((
        take_till(1.., |c: char| c.is_whitespace() || c == 'u'),
        take(1usize),
    ))
    .map(Token::Text)
    .parse_next(input)
}

/// Skip an XML declaration and doctype ahead of the root element.
fn prolog(input: &mut &str) -> ModalResult<()> {
    multispace0.parse_next(input)?;
    opt(("<?xml", take_until(0.., "?>"), "?>")).parse_next(input)?;
    multispace0.parse_next(input)?;
    opt(("<!DOCTYPE", take_until(0.., ">"), '>')).parse_next(input)?;
    multispace0.parse_next(input)?;
    Ok(())
}

/// Strip the prolog and suffix every internal id and reference.
#[must_use]
pub fn inline_svg(svg: &str, suffix: &str) -> String {
    let mut input = svg;
    if prolog.parse_next(&mut input).is_err() {
        input = svg;
    }
    let input_len = input.trim_end().len();
    let mut input = &input[..input_len];

    let mut out = String::with_capacity(input.len() + 64);
    while !input.is_empty() {
        match alt((id_attr, href_attr, url_ref, passthrough)).parse_next(&mut input) {
            Ok(token) => token.write(&mut out, suffix),
            Err(_) => {
                out.push_str(input);
                break;
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn ids_and_references_are_suffixed() {
        let svg = r##"<svg viewBox="0 0 10 10"><defs><linearGradient id="paint0"/><clipPath id='clip0'/></defs><g clip-path="url(#clip0)"><rect fill="url(#paint0)"/><use xlink:href="#paint0" href="#clip0"/></g></svg>"##;
        assert_eq!(
            inline_svg(svg, "1-2"),
            r##"<svg viewBox="0 0 10 10"><defs><linearGradient id="paint0-1-2"/><clipPath id='clip0-1-2'/></defs><g clip-path="url(#clip0-1-2)"><rect fill="url(#paint0-1-2)"/><use xlink:href="#paint0-1-2" href="#clip0-1-2"/></g></svg>"##
        );
    }

    #[test]
    fn lookalike_attributes_are_untouched() {
        let svg = r#"<svg data-id="x" grid="y"><a href="https://example.com"/></svg>"#;
        assert_eq!(inline_svg(svg, "s"), svg);
    }

    #[test]
    fn prolog_is_stripped() {
        let svg = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<!DOCTYPE svg>\n<svg/>\n";
        assert_eq!(inline_svg(svg, "s"), "<svg/>");
    }

    #[test]
    fn unterminated_reference_is_copied_through() {
        let svg = "<svg><rect fill=\"url(#broken";
        assert_eq!(inline_svg(svg, "s"), svg);
    }
}
