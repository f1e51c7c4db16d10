use std::{fmt::Display, str::FromStr, sync::Arc};

use thiserror::Error;
use time::{Date, OffsetDateTime};

pub mod read;
pub mod write;

pub type TransactionId = i64;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("invalid kind '{0}': use 'receita' or 'despesa'")]
    InvalidKind(String),
    #[error("invalid amount '{0}': must be a number")]
    InvalidAmount(String),
    #[error("negative amounts are not allowed: {0}")]
    NegativeAmount(f64),
    #[error("invalid date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("description must not be empty")]
    EmptyDescription,
    #[error("field '{0}' cannot be updated")]
    UnknownField(String),
    #[error("invalid id '{0}': must be an integer")]
    InvalidId(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Kind {
    Income,
    Expense,
}

impl Kind {
    /// Value written to the `tipo` column.
    pub fn as_db_str(&self) -> &'static str {
        match self {
            Kind::Income => "receita",
            Kind::Expense => "despesa",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Kind::Income => "Receita",
            Kind::Expense => "Despesa",
        }
    }
}

impl FromStr for Kind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "receita" | "income" => Ok(Kind::Income),
            "despesa" | "expense" => Ok(Kind::Expense),
            _ => Err(ValidationError::InvalidKind(s.to_string())),
        }
    }
}

impl Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_db_str())
    }
}

/// A calendar date kept in its sortable `YYYY-MM-DD` text form.
///
/// Only the shape is checked; `2024-02-30` is accepted. Ordering is plain string
/// ordering, which matches chronological ordering for well-formed values.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IsoDate(Arc<str>);

impl IsoDate {
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        let s = s.trim();
        let well_formed = s.len() == 10
            && s.bytes().enumerate().all(|(i, b)| match i {
                4 | 7 => b == b'-',
                _ => b.is_ascii_digit(),
            });

        if !well_formed {
            return Err(ValidationError::InvalidDate(s.to_string()));
        }
        Ok(IsoDate(Arc::from(s)))
    }

    /// Wraps a value read back from a store without re-validating it.
    pub fn from_stored(s: impl Into<Arc<str>>) -> Self {
        IsoDate(s.into())
    }

    pub fn from_date(d: Date) -> Self {
        IsoDate(Arc::from(format!("{:04}-{:02}-{:02}", d.year(), d.month() as u8, d.day())))
    }

    /// Today's date in the local timezone, falling back to UTC when the offset is unknown.
    pub fn today() -> Self {
        let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
        Self::from_date(now.date())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for IsoDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for IsoDate {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        IsoDate::parse(s)
    }
}

/// Inclusive date range `[start, end]`. An inverted range is allowed and matches nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Period {
    pub start: IsoDate,
    pub end: IsoDate,
}

impl Period {
    pub fn new(start: IsoDate, end: IsoDate) -> Self {
        Self { start, end }
    }

    pub fn parse(start: &str, end: &str) -> Result<Self, ValidationError> {
        Ok(Self::new(IsoDate::parse(start)?, IsoDate::parse(end)?))
    }

    pub fn contains(&self, date: &IsoDate) -> bool {
        self.start <= *date && *date <= self.end
    }
}

/// Parses a user-typed amount. Accepts `,` as decimal separator; rejects NaN and infinities.
pub fn parse_amount(s: &str) -> Result<f64, ValidationError> {
    let trimmed = s.trim();
    let normalized = trimmed.replacen(',', ".", 1);
    match normalized.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(ValidationError::InvalidAmount(trimmed.to_string())),
    }
}

pub fn parse_id(s: &str) -> Result<TransactionId, ValidationError> {
    s.trim()
        .parse::<TransactionId>()
        .map_err(|_| ValidationError::InvalidId(s.trim().to_string()))
}

/// Whether amounts below zero are accepted on insert and update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmountPolicy {
    pub allow_negative: bool,
}

impl Default for AmountPolicy {
    fn default() -> Self {
        Self { allow_negative: true }
    }
}

impl AmountPolicy {
    pub fn check(&self, amount: f64) -> Result<f64, ValidationError> {
        if !self.allow_negative && amount < 0.0 {
            return Err(ValidationError::NegativeAmount(amount));
        }
        Ok(amount)
    }
}
