//! Field normalizers
//!
//! Normalizers turn the loosely-typed values a language model produces into
//! canonical JSON values before type and range checks run. They are declared
//! per field on the schema and applied in declaration order. Every
//! normalizer maps its own output to itself, so normalizing twice is the
//! same as normalizing once.

use chrono::{Datelike, Days, Months, NaiveDate, Weekday};
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{json, Map, Value};
use unicode_normalization::UnicodeNormalization;

use crate::errors::{ValidationError, ValidationResult};

lazy_static! {
    static ref NUMBER_REGEX: Regex = Regex::new(r"-?\d(?:[\d,.]*\d)?").unwrap();
    static ref DOTTED_THOUSANDS_REGEX: Regex = Regex::new(r"^\d{1,3}(?:\.\d{3})+$").unwrap();
    static ref DECIMAL_COMMA_REGEX: Regex = Regex::new(r"^\d+,\d{1,2}$").unwrap();
    static ref DURATION_REGEX: Regex = Regex::new(
        r"\b(\d+(?:\.\d+)?|an?|one|two|three|four|five|six|seven|eight|nine|ten)\s*-?\s*(days?|nights?|weeks?|wks?|fortnights?)?\b"
    )
    .unwrap();
    static ref LIST_SEPARATOR_REGEX: Regex = Regex::new(r"\s*(?:,|/|;|\||&|\+|\band\b)\s*").unwrap();
    static ref ISO_DATE_REGEX: Regex = Regex::new(r"^(\d{4}-\d{2}-\d{2})").unwrap();
    static ref IN_PERIOD_REGEX: Regex =
        Regex::new(r"^in\s+(\d+|an?|one|two|three|four|five|six|seven|eight|nine|ten)\s+(days?|weeks?|months?)$").unwrap();
    static ref MONTH_REGEX: Regex = Regex::new(
        r"^(?:(?:in|next|this|coming|early|mid|late|beginning of|start of)\s+)*(?:(\d{1,2})(?:st|nd|rd|th)?\s+(?:of\s+)?)?([a-z]+)\.?(?:\s+(\d{1,2})(?:st|nd|rd|th)?)?(?:,?\s+(\d{4}))?$"
    )
    .unwrap();
}

/// Words a model uses for "no value"
const BLANK_WORDS: &[&str] = &["", "null", "none", "n/a", "na", "unknown", "not specified", "unspecified", "-"];

/// Anchor for relative dates: the day the request was received
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizeContext {
    pub anchor: NaiveDate,
}

impl NormalizeContext {
    pub fn new(anchor: NaiveDate) -> Self {
        Self { anchor }
    }
}

/// Declarative normalization rule
#[derive(Debug, Clone, PartialEq)]
pub enum Normalizer {
    /// Trim surrounding whitespace and NFC-normalize
    Trim,
    /// Lower-case strings (and string items of arrays)
    Lowercase,
    /// Map blank strings and "null"-like words to null
    NullIfBlank,
    /// "4", "4.0", "about 4" -> 4
    CoerceNumeric,
    /// "4 days", "a week", "2 weeks", "weekend" -> day count
    DurationDays,
    /// "€800", "800 EUR", "$1,200", 800 -> {"amount": .., "currency": ..}
    StripCurrency { default_currency: String },
    /// "culture/food", "culture, food and art" -> ["culture", "food", "art"]
    SplitList,
    /// A string, or objects with a text field, -> array of strings
    TextItems,
    /// "next May", "tomorrow", "in 3 weeks", "2026-05-01" -> ISO date
    RelativeDate,
}

impl Normalizer {
    pub fn apply(&self, value: Value, ctx: &NormalizeContext, field: &str) -> ValidationResult<Value> {
        match self {
            Normalizer::Trim => Ok(map_strings(value, |s| s.trim().nfc().collect())),
            Normalizer::Lowercase => Ok(map_strings(value, |s| s.to_lowercase())),
            Normalizer::NullIfBlank => Ok(null_if_blank(value)),
            Normalizer::CoerceNumeric => Ok(coerce_numeric(value)),
            Normalizer::DurationDays => Ok(duration_days(value)),
            Normalizer::StripCurrency { default_currency } => strip_currency(value, default_currency, field),
            Normalizer::SplitList => Ok(split_list(value)),
            Normalizer::TextItems => Ok(text_items(value)),
            Normalizer::RelativeDate => relative_date(value, ctx, field),
        }
    }
}

fn map_strings<F>(value: Value, f: F) -> Value
where
    F: Fn(&str) -> String,
{
    match value {
        Value::String(s) => Value::String(f(&s)),
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| match item {
                    Value::String(s) => Value::String(f(&s)),
                    other => other,
                })
                .collect(),
        ),
        other => other,
    }
}

fn is_blank_word(s: &str) -> bool {
    let lowered = s.trim().to_lowercase();
    BLANK_WORDS.contains(&lowered.as_str())
}

fn null_if_blank(value: Value) -> Value {
    match value {
        Value::String(s) if is_blank_word(&s) => Value::Null,
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .filter(|item| !matches!(item, Value::String(s) if is_blank_word(s)))
                .collect(),
        ),
        other => other,
    }
}

/// Parse the first number in `text`, accepting `1,200` and `1.200`
/// thousands and the decimal comma of `1.200,50` and `80,5`
pub fn parse_number(text: &str) -> Option<f64> {
    let token = NUMBER_REGEX.find(text)?.as_str();
    let unsigned = token.trim_start_matches('-');
    if DOTTED_THOUSANDS_REGEX.is_match(unsigned) {
        return token.replace('.', "").parse().ok();
    }
    let decimal_comma = match (token.rfind('.'), token.rfind(',')) {
        (Some(dot), Some(comma)) => comma > dot,
        (None, Some(_)) => DECIMAL_COMMA_REGEX.is_match(unsigned),
        _ => false,
    };
    if decimal_comma {
        return token.replace('.', "").replace(',', ".").parse().ok();
    }
    token.replace(',', "").parse().ok()
}

fn number_value(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        json!(n as i64)
    } else {
        json!(n)
    }
}

fn coerce_numeric(value: Value) -> Value {
    match value {
        Value::String(s) => parse_number(&s).map(number_value).unwrap_or(Value::String(s)),
        Value::Number(n) => match n.as_f64() {
            Some(f) => number_value(f),
            None => Value::Number(n),
        },
        other => other,
    }
}

fn word_number(word: &str) -> Option<f64> {
    let n = match word {
        "a" | "an" | "one" => 1,
        "two" => 2,
        "three" => 3,
        "four" => 4,
        "five" => 5,
        "six" => 6,
        "seven" => 7,
        "eight" => 8,
        "nine" => 9,
        "ten" => 10,
        other => return other.parse().ok(),
    };
    Some(f64::from(n))
}

fn duration_days(value: Value) -> Value {
    let text = match value {
        Value::String(s) => s,
        other => return coerce_numeric(other),
    };

    let lowered = text.trim().to_lowercase();
    if lowered == "weekend" || lowered == "a weekend" || lowered == "long weekend" {
        return json!(if lowered.starts_with("long") { 3 } else { 2 });
    }

    // A count with a unit wins over a bare one, so "a 4-day trip" is 4.
    // A bare article is never a count on its own.
    let all: Vec<_> = DURATION_REGEX.captures_iter(&lowered).collect();
    let Some(caps) = all
        .iter()
        .find(|caps| caps.get(2).is_some())
        .or_else(|| all.iter().find(|caps| !matches!(&caps[1], "a" | "an")))
    else {
        return Value::String(text);
    };
    let Some(count) = caps.get(1).and_then(|m| word_number(m.as_str())) else {
        return Value::String(text);
    };

    let unit = caps.get(2).map(|m| m.as_str()).unwrap_or("days");
    let days = if unit.starts_with("fortnight") {
        count * 14.0
    } else if unit.starts_with('w') {
        count * 7.0
    } else {
        count
    };

    number_value(days)
}

fn detect_currency(text: &str) -> Option<&'static str> {
    let lowered = text.to_lowercase();
    if text.contains('€') || lowered.contains("eur") {
        Some("EUR")
    } else if text.contains('£') || lowered.contains("gbp") || lowered.contains("pound") {
        Some("GBP")
    } else if text.contains('¥') || lowered.contains("jpy") || lowered.contains("yen") {
        Some("JPY")
    } else if lowered.contains("chf") || lowered.contains("franc") {
        Some("CHF")
    } else if text.contains('$') || lowered.contains("usd") || lowered.contains("dollar") {
        Some("USD")
    } else {
        None
    }
}

fn strip_currency(value: Value, default_currency: &str, field: &str) -> ValidationResult<Value> {
    let (amount, currency) = match value {
        Value::Null => return Ok(Value::Null),
        Value::Number(n) => (n.as_f64(), default_currency.to_string()),
        Value::String(s) => {
            let amount = parse_number(&s)
                .ok_or_else(|| ValidationError::invalid_format(field, format!("no amount in '{}'", s)))?;
            let currency = detect_currency(&s).unwrap_or(default_currency).to_string();
            (Some(amount), currency)
        }
        Value::Object(obj) => {
            let amount = match obj.get("amount") {
                Some(Value::Number(n)) => n.as_f64(),
                Some(Value::String(s)) => parse_number(s),
                _ => None,
            };
            let currency = obj
                .get("currency")
                .and_then(Value::as_str)
                .map(|c| detect_currency(c).map(str::to_string).unwrap_or_else(|| c.trim().to_uppercase()))
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| default_currency.to_string());
            (amount, currency)
        }
        other => {
            return Err(ValidationError::invalid_type(
                field,
                format!("expected an amount, got {}", other),
            ))
        }
    };

    let amount = amount.ok_or_else(|| ValidationError::invalid_format(field, "amount is not a number"))?;

    let mut money = Map::new();
    money.insert("amount".to_string(), json!(amount));
    money.insert("currency".to_string(), Value::String(currency));
    Ok(Value::Object(money))
}

fn split_list(value: Value) -> Value {
    let split = |s: &str| -> Vec<Value> {
        LIST_SEPARATOR_REGEX
            .split(s)
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| Value::String(part.to_string()))
            .collect()
    };

    match value {
        Value::String(s) => Value::Array(split(&s)),
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .flat_map(|item| match item {
                    Value::String(s) => split(&s),
                    other => vec![other],
                })
                .collect(),
        ),
        other => other,
    }
}

/// Keys a model uses for the text of a list item
const TEXT_KEYS: &[&str] = &["activity", "name", "title", "description", "text"];

fn text_items(value: Value) -> Value {
    let text_of = |item: Value| -> Option<Value> {
        match item {
            Value::String(s) if !s.trim().is_empty() => Some(Value::String(s.trim().to_string())),
            Value::String(_) => None,
            Value::Object(obj) => TEXT_KEYS
                .iter()
                .find_map(|key| obj.get(*key).and_then(Value::as_str))
                .filter(|s| !s.trim().is_empty())
                .map(|s| Value::String(s.trim().to_string())),
            other => Some(other),
        }
    };

    match value {
        Value::Array(items) => Value::Array(items.into_iter().filter_map(text_of).collect()),
        Value::String(s) if s.trim().is_empty() => Value::Array(vec![]),
        Value::String(s) => Value::Array(vec![Value::String(s.trim().to_string())]),
        other => other,
    }
}

fn relative_date(value: Value, ctx: &NormalizeContext, field: &str) -> ValidationResult<Value> {
    match value {
        Value::String(s) => parse_relative_date(&s, ctx.anchor)
            .map(|date| Value::String(date.to_string()))
            .ok_or_else(|| ValidationError::invalid_format(field, format!("unrecognised date '{}'", s))),
        Value::Null => Ok(Value::Null),
        other => Err(ValidationError::invalid_type(field, format!("expected a date, got {}", other))),
    }
}

fn month_number(name: &str) -> Option<u32> {
    let month = match name {
        "january" | "jan" => 1,
        "february" | "feb" => 2,
        "march" | "mar" => 3,
        "april" | "apr" => 4,
        "may" => 5,
        "june" | "jun" => 6,
        "july" | "jul" => 7,
        "august" | "aug" => 8,
        "september" | "sep" | "sept" => 9,
        "october" | "oct" => 10,
        "november" | "nov" => 11,
        "december" | "dec" => 12,
        // Seasons start on the first day of their first month
        "spring" => 3,
        "summer" => 6,
        "autumn" | "fall" => 9,
        "winter" => 12,
        _ => return None,
    };
    Some(month)
}

/// Resolve a date expression against `anchor`.
///
/// A month without a year resolves to that month in the anchor's year when
/// the date is not before the anchor, otherwise to the following year.
pub fn parse_relative_date(text: &str, anchor: NaiveDate) -> Option<NaiveDate> {
    let lowered = text.trim().trim_end_matches(['.', '!', '?']).to_lowercase();

    if let Some(caps) = ISO_DATE_REGEX.captures(&lowered) {
        return NaiveDate::parse_from_str(&caps[1], "%Y-%m-%d").ok();
    }

    match lowered.as_str() {
        "today" | "now" => return Some(anchor),
        "tomorrow" => return anchor.checked_add_days(Days::new(1)),
        "next week" => return anchor.checked_add_days(Days::new(7)),
        "this weekend" | "next weekend" => {
            let this_weekend = if anchor.weekday() == Weekday::Sun {
                anchor
            } else {
                let until_saturday = (5 + 7 - anchor.weekday().num_days_from_monday()) % 7;
                anchor.checked_add_days(Days::new(u64::from(until_saturday)))?
            };
            return if lowered == "next weekend" {
                let saturday = if this_weekend.weekday() == Weekday::Sun {
                    this_weekend.checked_add_days(Days::new(6))?
                } else {
                    this_weekend.checked_add_days(Days::new(7))?
                };
                Some(saturday)
            } else {
                Some(this_weekend)
            };
        }
        "next month" => {
            let next = anchor.checked_add_months(Months::new(1))?;
            return NaiveDate::from_ymd_opt(next.year(), next.month(), 1);
        }
        "next year" => return NaiveDate::from_ymd_opt(anchor.year() + 1, anchor.month(), 1),
        _ => {}
    }

    if let Some(caps) = IN_PERIOD_REGEX.captures(&lowered) {
        let count = word_number(&caps[1])? as u32;
        return match &caps[2] {
            unit if unit.starts_with("day") => anchor.checked_add_days(Days::new(u64::from(count))),
            unit if unit.starts_with("week") => anchor.checked_add_days(Days::new(u64::from(count) * 7)),
            _ => anchor.checked_add_months(Months::new(count)),
        };
    }

    let caps = MONTH_REGEX.captures(&lowered)?;
    let month = month_number(caps.get(2)?.as_str())?;

    let explicit_day = caps
        .get(1)
        .or_else(|| caps.get(3))
        .and_then(|m| m.as_str().parse::<u32>().ok());
    let day = explicit_day.unwrap_or_else(|| {
        if lowered.contains("mid") {
            15
        } else if lowered.contains("late") {
            20
        } else {
            1
        }
    });

    if let Some(year) = caps.get(4).and_then(|m| m.as_str().parse::<i32>().ok()) {
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    let this_year = NaiveDate::from_ymd_opt(anchor.year(), month, day);
    match this_year {
        Some(date) if date >= anchor => Some(date),
        _ => NaiveDate::from_ymd_opt(anchor.year() + 1, month, day),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn ctx() -> NormalizeContext {
        NormalizeContext::new(NaiveDate::from_ymd_opt(2026, 10, 17).unwrap())
    }

    fn apply(normalizer: Normalizer, value: Value) -> Value {
        normalizer.apply(value, &ctx(), "field").unwrap()
    }

    #[test_case("May", "2027-05-01" ; "month before anchor rolls to next year")]
    #[test_case("next May", "2027-05-01" ; "next month name")]
    #[test_case("in December", "2026-12-01" ; "month later this year")]
    #[test_case("October", "2027-10-01" ; "anchor month already started")]
    #[test_case("October 20", "2026-10-20" ; "day later this month")]
    #[test_case("3rd of june", "2027-06-03" ; "ordinal day first")]
    #[test_case("mid July 2027", "2027-07-15" ; "explicit year")]
    #[test_case("summer", "2027-06-01" ; "season")]
    #[test_case("tomorrow", "2026-10-18" ; "tomorrow")]
    #[test_case("next week", "2026-10-24" ; "next week")]
    #[test_case("in 3 weeks", "2026-11-07" ; "in n weeks")]
    #[test_case("in two days", "2026-10-19" ; "word count")]
    #[test_case("this weekend", "2026-10-17" ; "anchor is a saturday")]
    #[test_case("next weekend", "2026-10-24" ; "weekend after the anchor")]
    #[test_case("2026-11-02T00:00:00Z", "2026-11-02" ; "iso timestamp")]
    fn test_relative_dates(input: &str, expected: &str) {
        let expected = NaiveDate::parse_from_str(expected, "%Y-%m-%d").unwrap();
        assert_eq!(parse_relative_date(input, ctx().anchor), Some(expected));
    }

    #[test_case("someday" ; "vague")]
    #[test_case("February 30" ; "impossible day")]
    fn test_unrecognised_dates(input: &str) {
        assert_eq!(parse_relative_date(input, ctx().anchor), None);
        assert!(Normalizer::RelativeDate.apply(json!(input), &ctx(), "start_date").is_err());
    }

    #[test_case(json!("4"), json!(4) ; "numeric string")]
    #[test_case(json!("4 days"), json!(4) ; "with unit")]
    #[test_case(json!(4.0), json!(4) ; "whole float")]
    #[test_case(json!("a week"), json!(7) ; "a week")]
    #[test_case(json!("2 weeks"), json!(14) ; "weeks")]
    #[test_case(json!("weekend"), json!(2) ; "weekend")]
    #[test_case(json!("five nights"), json!(5) ; "nights")]
    #[test_case(json!("Barcelona 4 days"), json!(4) ; "word ending in a before count")]
    #[test_case(json!("Sofia 3 nights"), json!(3) ; "nights after a place name")]
    #[test_case(json!("extra 2 days"), json!(2) ; "extra days")]
    #[test_case(json!("a 4-day trip"), json!(4) ; "article before hyphenated count")]
    #[test_case(json!("about 6"), json!(6) ; "bare count after a word")]
    fn test_duration(input: Value, expected: Value) {
        assert_eq!(apply(Normalizer::DurationDays, input), expected);
    }

    #[test_case(json!("€800"), json!({"amount": 800.0, "currency": "EUR"}) ; "euro symbol")]
    #[test_case(json!("800 EUR"), json!({"amount": 800.0, "currency": "EUR"}) ; "euro code")]
    #[test_case(json!("$1,200"), json!({"amount": 1200.0, "currency": "USD"}) ; "dollar thousands")]
    #[test_case(json!("1.500 euros"), json!({"amount": 1500.0, "currency": "EUR"}) ; "dotted thousands")]
    #[test_case(json!(650), json!({"amount": 650.0, "currency": "EUR"}) ; "bare number")]
    #[test_case(json!({"amount": "300", "currency": "gbp"}), json!({"amount": 300.0, "currency": "GBP"}) ; "object")]
    fn test_currency(input: Value, expected: Value) {
        let normalizer = Normalizer::StripCurrency {
            default_currency: "EUR".to_string(),
        };
        assert_eq!(apply(normalizer, input), expected);
    }

    #[test_case("1.200,50", 1200.5 ; "dotted thousands with decimal comma")]
    #[test_case("1,200.50", 1200.5 ; "comma thousands with decimal point")]
    #[test_case("80,5 EUR", 80.5 ; "decimal comma")]
    #[test_case("1,200", 1200.0 ; "comma thousands")]
    #[test_case("-12.5", -12.5 ; "negative")]
    fn test_parse_number(input: &str, expected: f64) {
        assert_eq!(parse_number(input), Some(expected));
    }

    #[test]
    fn test_article_alone_is_not_a_duration() {
        assert_eq!(apply(Normalizer::DurationDays, json!("a trip")), json!("a trip"));
    }

    #[test]
    fn test_currency_without_amount_is_rejected() {
        let normalizer = Normalizer::StripCurrency {
            default_currency: "EUR".to_string(),
        };
        let err = normalizer.apply(json!("cheap"), &ctx(), "budget").unwrap_err();
        assert_eq!(err.field, "budget");
    }

    #[test]
    fn test_lists() {
        assert_eq!(
            apply(Normalizer::SplitList, json!("culture/food")),
            json!(["culture", "food"])
        );
        assert_eq!(
            apply(Normalizer::SplitList, json!(["Culture, Food and art", "nightlife"])),
            json!(["Culture", "Food", "art", "nightlife"])
        );
        assert_eq!(
            apply(Normalizer::TextItems, json!([{"time": "09:00", "activity": "Sagrada Familia"}, " ", "Tapas"])),
            json!(["Sagrada Familia", "Tapas"])
        );
    }

    #[test]
    fn test_blank_words_become_null() {
        assert_eq!(apply(Normalizer::NullIfBlank, json!("  N/A ")), Value::Null);
        assert_eq!(apply(Normalizer::NullIfBlank, json!("Berlin")), json!("Berlin"));
        assert_eq!(apply(Normalizer::NullIfBlank, json!(["food", "unknown"])), json!(["food"]));
    }

    #[test]
    fn test_trim_and_lowercase_arrays() {
        let trimmed = apply(Normalizer::Trim, json!(["  Culture ", 3]));
        assert_eq!(apply(Normalizer::Lowercase, trimmed), json!(["culture", 3]));
    }
}
