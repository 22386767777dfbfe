//! parse document with structure like " title1 key1: value1, value2 key2: value2 title2 key3:value3, value4" which has titles and
//! pairs key-vector of values. Generation settings are written this way, e.g.
//! ```text
//! image
//!  width: 360
//!  height: 640
//! formula
//!  dimensions: 4, 15
//!  minimal_depth: 8, 13
//! operators
//!  sum: 0, 1
//!  sin: 0, 1
//! ```
//! Lines starting with //, #, % or ; are comments.
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::{alpha1, alphanumeric1, multispace0, space0},
    combinator::{map, map_res, recognize},
    multi::{many0, many1, separated_list0},
    sequence::{delimited, pair, separated_pair, terminated},
};
use std::collections::HashMap;
use std::fmt::Display;

pub type DocumentMap = HashMap<String, SectionMap>;
pub type SectionMap = HashMap<String, Vec<Value>>;

/// enum to represent different value types:
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Float(f64),
    Integer(i64),
    Boolean(bool),
}

impl Value {
    /// numeric view of integers and floats
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        if let Value::Integer(i) = self {
            Some(*i)
        } else {
            None
        }
    }

    pub fn as_string(&self) -> Option<&String> {
        if let Value::String(s) = self {
            Some(s)
        } else {
            None
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::String(s) => write!(f, "{}", s),
            Value::Float(val) => write!(f, "{}", val),
            Value::Integer(val) => write!(f, "{}", val),
            Value::Boolean(val) => write!(f, "{}", val),
        }
    }
}

fn parse_identifier(input: &str) -> IResult<&str, String> {
    let parser = recognize(pair(
        alt((alpha1, tag("_"))),
        many0(alt((alphanumeric1, tag("_")))),
    ));
    map(parser, String::from).parse(input)
}

/// Parses a title (word characters without spaces)
fn parse_title(input: &str) -> IResult<&str, String> {
    let (input, result) = parse_identifier(input)?;
    Ok((input.trim(), result))
}

fn parse_value(input: &str) -> IResult<&str, Value> {
    // a single value ends at commas, whitespace and semicolons
    let value_parser = take_while1(|c: char| !matches!(c, ',' | ' ' | '\t' | '\r' | '\n' | ';'));
    let mut value_parser = map_res(value_parser, |s: &str| -> Result<Value, String> {
        if let Ok(val) = s.parse::<i64>() {
            Ok(Value::Integer(val))
        } else if let Ok(val) = s.parse::<f64>() {
            Ok(Value::Float(val))
        } else if let Ok(val) = s.parse::<bool>() {
            Ok(Value::Boolean(val))
        } else {
            Ok(Value::String(s.to_string()))
        }
    });
    value_parser.parse(input)
}

fn parse_value_list(input: &str) -> IResult<&str, Vec<Value>> {
    let (input, _) = space0(input)?;
    let separator_coma = delimited(space0, tag(","), space0);
    separated_list0(separator_coma, parse_value).parse(input)
}

/// Parses a key-value pair where value is a list
fn parse_key_value_pair(input: &str) -> IResult<&str, (String, Vec<Value>)> {
    let colon_separator = delimited(space0, tag(":"), space0);
    let mut parser = separated_pair(parse_identifier, colon_separator, parse_value_list);
    let (input, result) = parser.parse(input)?;
    Ok((input.trim(), result))
}

/// Parses a section with a title and multiple key-value pairs
fn parse_section(input: &str) -> IResult<&str, (String, SectionMap)> {
    let (input, _) = space0(input)?;
    let (input, title) = parse_title(input)?;
    let (input, _) = multispace0(input)?;
    let (input, pairs) = many1(terminated(parse_key_value_pair, space0)).parse(input)?;
    Ok((input, (title, pairs.into_iter().collect())))
}

/// Filters out comment lines (starting with //, #, %, or ;)
fn filter_comments(input: &str) -> String {
    input
        .lines()
        .filter(|line| {
            let trimmed = line.trim();
            !trimmed.starts_with("//")
                && !trimmed.starts_with('#')
                && !trimmed.starts_with('%')
                && !trimmed.starts_with(';')
                && !trimmed.is_empty()
        })
        .collect::<Vec<&str>>()
        .join("\n")
}

/// Parses the entire document into a HashMap; later sections with the same title extend earlier ones
pub fn parse_document(input: &str) -> Result<DocumentMap, String> {
    let filtered = filter_comments(input);
    let mut parser = many1(delimited(space0, parse_section, multispace0));
    match parser.parse(filtered.trim_start()) {
        Ok((remaining, sections)) => {
            if !remaining.trim().is_empty() {
                return Err(format!(
                    "Failed to parse entire document. Remaining: '{}'",
                    remaining
                ));
            }
            let mut result: DocumentMap = HashMap::new();
            for (title, section_map) in sections {
                result.entry(title).or_default().extend(section_map);
            }
            Ok(result)
        }
        Err(e) => Err(format!("Parsing error: {:?}", e)),
    }
}

/// values of `section.key` as numbers, None if the key is absent
pub fn get_floats(
    document: &DocumentMap,
    section: &str,
    key: &str,
) -> Result<Option<Vec<f64>>, String> {
    let Some(values) = document.get(section).and_then(|s| s.get(key)) else {
        return Ok(None);
    };
    values
        .iter()
        .map(|v| {
            v.as_float()
                .ok_or_else(|| format!("{}.{}: '{}' is not a number", section, key, v))
        })
        .collect::<Result<Vec<f64>, String>>()
        .map(Some)
}

/// single number at `section.key`
pub fn get_float(document: &DocumentMap, section: &str, key: &str) -> Result<Option<f64>, String> {
    match get_floats(document, section, key)? {
        None => Ok(None),
        Some(values) if values.len() == 1 => Ok(Some(values[0])),
        Some(values) => Err(format!(
            "{}.{} expects one value, found {}",
            section,
            key,
            values.len()
        )),
    }
}

/// `low, high` pair at `section.key`
pub fn get_bounds(
    document: &DocumentMap,
    section: &str,
    key: &str,
) -> Result<Option<(f64, f64)>, String> {
    match get_floats(document, section, key)? {
        None => Ok(None),
        Some(values) if values.len() == 2 => Ok(Some((values[0], values[1]))),
        Some(values) => Err(format!(
            "{}.{} expects 'low, high', found {} values",
            section,
            key,
            values.len()
        )),
    }
}
