use std::{fmt::Display, str::FromStr, sync::Arc};

use super::{parse_amount, AmountPolicy, IsoDate, Kind, ValidationError};

#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub kind: Kind,
    pub description: Arc<str>,
    pub amount: f64,
    pub date: IsoDate,
}

impl NewTransaction {
    pub fn new(kind: Kind, description: &str, amount: f64, date: IsoDate) -> Result<Self, ValidationError> {
        if !amount.is_finite() {
            return Err(ValidationError::InvalidAmount(amount.to_string()));
        }
        Ok(Self {
            kind,
            description: non_empty(description)?,
            amount,
            date,
        })
    }

    pub fn with_policy(self, policy: AmountPolicy) -> Result<Self, ValidationError> {
        policy.check(self.amount)?;
        Ok(self)
    }
}

fn non_empty(description: &str) -> Result<Arc<str>, ValidationError> {
    let description = description.trim();
    if description.is_empty() {
        return Err(ValidationError::EmptyDescription);
    }
    Ok(Arc::from(description))
}

/// The columns a transaction may have rewritten after insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionField {
    Description,
    Amount,
    Date,
    Kind,
}

impl TransactionField {
    pub fn column(&self) -> &'static str {
        match self {
            TransactionField::Description => "descricao",
            TransactionField::Amount => "valor",
            TransactionField::Date => "data",
            TransactionField::Kind => "tipo",
        }
    }

    /// Builds the typed update for this field from raw user text.
    pub fn parse_value(self, raw: &str) -> Result<FieldUpdate, ValidationError> {
        match self {
            TransactionField::Description => Ok(FieldUpdate::Description(non_empty(raw)?)),
            TransactionField::Amount => Ok(FieldUpdate::Amount(parse_amount(raw)?)),
            TransactionField::Date => Ok(FieldUpdate::Date(IsoDate::parse(raw)?)),
            TransactionField::Kind => Ok(FieldUpdate::Kind(raw.parse()?)),
        }
    }
}

impl FromStr for TransactionField {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "descricao" | "description" => Ok(TransactionField::Description),
            "valor" | "amount" => Ok(TransactionField::Amount),
            "data" | "date" => Ok(TransactionField::Date),
            "tipo" | "kind" => Ok(TransactionField::Kind),
            _ => Err(ValidationError::UnknownField(s.to_string())),
        }
    }
}

impl Display for TransactionField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.column())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldUpdate {
    Description(Arc<str>),
    Amount(f64),
    Date(IsoDate),
    Kind(Kind),
}

impl FieldUpdate {
    /// Validates a field name and its new value together, e.g. `("valor", "75.5")`.
    pub fn parse(field: &str, raw: &str) -> Result<Self, ValidationError> {
        field.parse::<TransactionField>()?.parse_value(raw)
    }

    pub fn field(&self) -> TransactionField {
        match self {
            FieldUpdate::Description(_) => TransactionField::Description,
            FieldUpdate::Amount(_) => TransactionField::Amount,
            FieldUpdate::Date(_) => TransactionField::Date,
            FieldUpdate::Kind(_) => TransactionField::Kind,
        }
    }

    pub fn with_policy(self, policy: AmountPolicy) -> Result<Self, ValidationError> {
        if let FieldUpdate::Amount(amount) = self {
            policy.check(amount)?;
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> IsoDate {
        IsoDate::parse(s).unwrap()
    }

    #[test]
    fn test_new_transaction_trims_and_rejects_empty_description() {
        let txn = NewTransaction::new(Kind::Expense, "  mercado ", 50.0, date("2024-01-10")).unwrap();
        assert_eq!(txn.description.as_ref(), "mercado");

        let err = NewTransaction::new(Kind::Expense, "   ", 50.0, date("2024-01-10")).unwrap_err();
        assert_eq!(err, ValidationError::EmptyDescription);
    }

    #[test]
    fn test_policy_applies_to_new_transaction() {
        let txn = NewTransaction::new(Kind::Income, "estorno", -20.0, date("2024-01-10")).unwrap();
        let strict = AmountPolicy { allow_negative: false };
        assert_eq!(txn.with_policy(strict), Err(ValidationError::NegativeAmount(-20.0)));
    }

    #[test]
    fn test_field_names_in_both_languages() {
        assert_eq!("valor".parse::<TransactionField>().unwrap(), TransactionField::Amount);
        assert_eq!("amount".parse::<TransactionField>().unwrap(), TransactionField::Amount);
        assert_eq!("descricao".parse::<TransactionField>().unwrap(), TransactionField::Description);
        assert_eq!("data".parse::<TransactionField>().unwrap(), TransactionField::Date);
        assert_eq!("tipo".parse::<TransactionField>().unwrap(), TransactionField::Kind);
        assert_eq!(
            "id".parse::<TransactionField>(),
            Err(ValidationError::UnknownField("id".to_string()))
        );
    }

    #[test]
    fn test_field_update_parse() {
        assert_eq!(FieldUpdate::parse("valor", "75.5").unwrap(), FieldUpdate::Amount(75.5));
        assert_eq!(FieldUpdate::parse("tipo", "despesa").unwrap(), FieldUpdate::Kind(Kind::Expense));
        assert_eq!(
            FieldUpdate::parse("data", "2024-03-01").unwrap(),
            FieldUpdate::Date(date("2024-03-01"))
        );
        assert!(matches!(FieldUpdate::parse("unknown_field", "x"), Err(ValidationError::UnknownField(_))));
        assert!(matches!(FieldUpdate::parse("valor", "muito"), Err(ValidationError::InvalidAmount(_))));
        assert!(matches!(FieldUpdate::parse("data", "ontem"), Err(ValidationError::InvalidDate(_))));
        assert_eq!(FieldUpdate::parse("descricao", ""), Err(ValidationError::EmptyDescription));
    }

    #[test]
    fn test_field_update_reports_its_field() {
        assert_eq!(FieldUpdate::Amount(1.0).field(), TransactionField::Amount);
        assert_eq!(FieldUpdate::Kind(Kind::Income).field().column(), "tipo");
    }
}
