// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use time::Date;
use time::macros::format_description;

pub const DATE_LAYOUT: &str = "YYYY-MM-DD";
pub const WON_SUFFIX: &str = "원";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    InvalidAmount,
    NegativeAmount,
    InvalidDate,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidAmount => f.write_str("invalid amount value"),
            Self::NegativeAmount => f.write_str("negative amount value"),
            Self::InvalidDate => f.write_str("invalid date value"),
        }
    }
}

impl std::error::Error for ValidationError {}

pub type ValidationResult<T> = std::result::Result<T, ValidationError>;

/// Parses a won amount as typed into a form: `12000`, `12,000`, `12,000원`.
pub fn parse_won(input: &str) -> ValidationResult<i64> {
    let trimmed = input.trim();
    let clean = trimmed
        .strip_suffix(WON_SUFFIX)
        .unwrap_or(trimmed)
        .trim_end()
        .replace(',', "");
    if clean.starts_with('-') {
        return Err(ValidationError::NegativeAmount);
    }
    if clean.is_empty() || !clean.bytes().all(|byte| byte.is_ascii_digit()) {
        return Err(ValidationError::InvalidAmount);
    }
    clean
        .parse::<i64>()
        .map_err(|_| ValidationError::InvalidAmount)
}

pub fn parse_optional_won(input: &str) -> ValidationResult<Option<i64>> {
    if input.trim().is_empty() {
        return Ok(None);
    }
    parse_won(input).map(Some)
}

pub fn format_number(value: i64) -> String {
    let sign = if value < 0 { "-" } else { "" };
    format!("{sign}{}", comma_format(value.unsigned_abs()))
}

pub fn format_won(amount: i64) -> String {
    format!("{}{WON_SUFFIX}", format_number(amount))
}

/// Rounds an average before display, the way the stats panels show them.
pub fn format_average_won(amount: f64) -> String {
    if !amount.is_finite() {
        return "-".to_owned();
    }
    format_won(amount.round() as i64)
}

pub fn parse_order_date(input: &str) -> ValidationResult<Date> {
    let trimmed = input.trim();
    let day_part = trimmed.get(..10).unwrap_or(trimmed);
    Date::parse(day_part, &format_description!("[year]-[month]-[day]"))
        .map_err(|_| ValidationError::InvalidDate)
}

/// `2024-07-01` renders as `2024년 07월 01일`; anything unparsable is shown as-is.
pub fn format_order_date(raw: &str) -> String {
    match parse_order_date(raw) {
        Ok(date) => format!(
            "{}년 {:02}월 {:02}일",
            date.year(),
            u8::from(date.month()),
            date.day()
        ),
        Err(_) => raw.to_owned(),
    }
}

fn comma_format(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    let mut chars = digits.chars().collect::<Vec<_>>();
    let mut count = 0usize;
    while let Some(ch) = chars.pop() {
        if count == 3 {
            out.push(',');
            count = 0;
        }
        out.push(ch);
        count += 1;
    }
    out.chars().rev().collect()
}
