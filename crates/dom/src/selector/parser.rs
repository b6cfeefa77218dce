//! A `nom`-based parser for the supported CSS selector subset.

use super::{AttrOp, Combinator, ComplexSelector, Compound, SelectorList, SimpleSelector};
use crate::error::DomError;
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag, tag_no_case, take_while, take_while1},
    character::complete::{char, multispace0, multispace1},
    combinator::{map, opt, value},
    multi::{many0, separated_list1},
    sequence::{delimited, pair, preceded},
};

pub fn parse_selector(input: &str) -> Result<SelectorList, DomError> {
    match selector_list(input.trim()) {
        Ok(("", selectors)) => Ok(SelectorList::new(input, selectors)),
        Ok((rem, _)) => Err(DomError::InvalidSelector {
            selector: input.to_string(),
            reason: format!("Parser did not consume all input. Remainder: '{}'", rem),
        }),
        Err(e) => Err(DomError::InvalidSelector {
            selector: input.to_string(),
            reason: e.to_string(),
        }),
    }
}

// --- Combinators & Helpers ---

fn ws<'a, F, O, E>(inner: F) -> impl Parser<&'a str, Output = O, Error = E>
where
    F: Parser<&'a str, Output = O, Error = E>,
    E: nom::error::ParseError<&'a str>,
{
    delimited(multispace0, inner, multispace0)
}

fn ident(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_alphanumeric() || c == '-' || c == '_').parse(input)
}

fn quoted(input: &str) -> IResult<&str, &str> {
    alt((
        delimited(char('\''), take_while(|c: char| c != '\''), char('\'')),
        delimited(char('"'), take_while(|c: char| c != '"'), char('"')),
    ))
    .parse(input)
}

// --- Selector Parsers ---

fn selector_list(input: &str) -> IResult<&str, Vec<ComplexSelector>> {
    separated_list1(ws(char(',')), complex_selector).parse(input)
}

fn complex_selector(input: &str) -> IResult<&str, ComplexSelector> {
    let (i, head) = compound(input)?;
    let (i, tail) = many0(pair(combinator, compound)).parse(i)?;
    Ok((i, ComplexSelector { head, tail }))
}

fn combinator(input: &str) -> IResult<&str, Combinator> {
    alt((
        value(Combinator::Child, ws(char('>'))),
        value(Combinator::Descendant, multispace1),
    ))
    .parse(input)
}

fn compound(input: &str) -> IResult<&str, Compound> {
    let (i, type_part) = opt(alt((
        value(SimpleSelector::Universal, char('*')),
        map(ident, |name| SimpleSelector::Type(name.to_ascii_lowercase())),
    )))
    .parse(input)?;
    let (i, rest) = many0(alt((class, attribute, pseudo))).parse(i)?;

    if type_part.is_none() && rest.is_empty() {
        return Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Verify,
        )));
    }

    let mut parts = Vec::with_capacity(rest.len() + 1);
    parts.extend(type_part);
    parts.extend(rest);
    Ok((i, Compound { parts }))
}

fn class(input: &str) -> IResult<&str, SimpleSelector> {
    map(preceded(char('.'), ident), |name| {
        SimpleSelector::Class(name.to_string())
    })
    .parse(input)
}

fn pseudo(input: &str) -> IResult<&str, SimpleSelector> {
    value(SimpleSelector::FirstChild, tag_no_case(":first-child")).parse(input)
}

fn attr_operator(input: &str) -> IResult<&str, &str> {
    alt((tag("*="), tag("^="), tag("~="), tag("="))).parse(input)
}

fn attribute(input: &str) -> IResult<&str, SimpleSelector> {
    let (i, _) = char('[').parse(input)?;
    let (i, name) = ws(ident).parse(i)?;
    let (i, operand) = opt(pair(attr_operator, ws(alt((quoted, ident))))).parse(i)?;
    let (i, _) = char(']').parse(i)?;

    let op = match operand {
        None => AttrOp::Exists,
        Some(("*=", v)) => AttrOp::Contains(v.to_string()),
        Some(("^=", v)) => AttrOp::Prefix(v.to_string()),
        Some(("~=", v)) => AttrOp::Word(v.to_string()),
        Some((_, v)) => AttrOp::Equals(v.to_string()),
    };
    Ok((
        i,
        SimpleSelector::Attribute {
            name: name.to_ascii_lowercase(),
            op,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_attribute_presence() {
        let list = parse_selector("[data-message-author-role]").unwrap();
        assert_eq!(
            list.selectors()[0].head.parts,
            vec![SimpleSelector::Attribute {
                name: "data-message-author-role".to_string(),
                op: AttrOp::Exists,
            }]
        );
    }

    #[test]
    fn parses_quoted_and_bare_values() {
        let list = parse_selector("[data-testid='conversation'], [class*=overflow-y-auto]").unwrap();
        assert_eq!(list.selectors().len(), 2);
        assert_eq!(
            list.selectors()[1].head.parts[0],
            SimpleSelector::Attribute {
                name: "class".to_string(),
                op: AttrOp::Contains("overflow-y-auto".to_string()),
            }
        );
    }

    #[test]
    fn parses_child_and_descendant_chains() {
        let list = parse_selector("div > div:first-child").unwrap();
        let complex = &list.selectors()[0];
        assert_eq!(complex.head.parts, vec![SimpleSelector::Type("div".to_string())]);
        assert_eq!(complex.tail.len(), 1);
        assert_eq!(complex.tail[0].0, Combinator::Child);
        assert_eq!(
            complex.tail[0].1.parts,
            vec![SimpleSelector::Type("div".to_string()), SimpleSelector::FirstChild]
        );

        let list = parse_selector("thead tr").unwrap();
        assert_eq!(list.selectors()[0].tail[0].0, Combinator::Descendant);
    }

    #[test]
    fn keeps_source_text() {
        let list = parse_selector("  h1, h2, h3 ").unwrap();
        assert_eq!(list.source(), "h1, h2, h3");
        assert_eq!(list.selectors().len(), 3);
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_selector("").is_err());
        assert!(parse_selector("div >").is_err());
        assert!(parse_selector("[unterminated").is_err());
        assert!(parse_selector("a ~ b").is_err());
    }
}
