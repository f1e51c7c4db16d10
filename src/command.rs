use std::sync::Arc;

use finanza_core::{parse_amount, parse_id, Kind, Period, TransactionId};
use thiserror::Error;

use crate::parser::{self, RawCommand};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommandError {
    #[error("expected /add [tipo] [valor] [descrição]")]
    AddUsage,
    #[error("expected /del [ID]")]
    DeleteUsage,
    #[error("expected /periodo [início] [fim]")]
    PeriodUsage,
    #[error("invalid kind '{0}'")]
    InvalidKind(String),
}

/// A chat message after parsing and validation, ready to execute.
#[derive(Debug, Clone, PartialEq)]
pub enum BotCommand {
    Help,
    List { kind: Option<Kind> },
    Balance,
    PeriodBalance(Period),
    Add { kind: Kind, amount: f64, description: Arc<str> },
    Delete { id: TransactionId },
    Invalid(CommandError),
    Unrecognized,
}

impl BotCommand {
    /// Stable label for metrics and logs.
    pub fn name(&self) -> &'static str {
        match self {
            BotCommand::Help => "help",
            BotCommand::List { .. } => "list",
            BotCommand::Balance => "balance",
            BotCommand::PeriodBalance(_) => "period_balance",
            BotCommand::Add { .. } => "add",
            BotCommand::Delete { .. } => "delete",
            BotCommand::Invalid(_) => "invalid",
            BotCommand::Unrecognized => "unrecognized",
        }
    }
}

/// Drops a `@botname` suffix from the command word, as sent in group chats.
fn strip_mention(text: &str) -> String {
    if !text.starts_with('/') {
        return text.to_string();
    }
    let (head, tail) = text.split_at(text.find(char::is_whitespace).unwrap_or(text.len()));
    match head.find('@') {
        Some(at) => format!("{}{}", &head[..at], tail),
        None => text.to_string(),
    }
}

pub fn parse(text: &str) -> BotCommand {
    let text = strip_mention(text.trim());
    match parser::parse(&text) {
        Ok(raw) => resolve(raw),
        Err(_) => BotCommand::Unrecognized,
    }
}

fn resolve(raw: RawCommand<'_>) -> BotCommand {
    match raw {
        RawCommand::Help => BotCommand::Help,
        RawCommand::List(None) => BotCommand::List { kind: None },
        RawCommand::List(Some(kind)) => match kind.parse::<Kind>() {
            Ok(kind) => BotCommand::List { kind: Some(kind) },
            Err(_) => BotCommand::Invalid(CommandError::InvalidKind(kind.to_string())),
        },
        RawCommand::Balance => BotCommand::Balance,
        RawCommand::Period(start, end) => match Period::parse(start, end) {
            Ok(period) => BotCommand::PeriodBalance(period),
            Err(_) => BotCommand::Invalid(CommandError::PeriodUsage),
        },
        RawCommand::PeriodUsage => BotCommand::Invalid(CommandError::PeriodUsage),
        RawCommand::Add { kind, amount, description } => {
            // a bad amount is a format error even when the kind is also wrong
            let amount = match parse_amount(amount) {
                Ok(amount) => amount,
                Err(_) => return BotCommand::Invalid(CommandError::AddUsage),
            };
            let description = description.trim();
            if description.is_empty() {
                return BotCommand::Invalid(CommandError::AddUsage);
            }
            match kind.parse::<Kind>() {
                Ok(kind) => BotCommand::Add { kind, amount, description: Arc::from(description) },
                Err(_) => BotCommand::Invalid(CommandError::InvalidKind(kind.to_string())),
            }
        }
        RawCommand::AddUsage => BotCommand::Invalid(CommandError::AddUsage),
        RawCommand::Delete(id) => match parse_id(id) {
            Ok(id) => BotCommand::Delete { id },
            Err(_) => BotCommand::Invalid(CommandError::DeleteUsage),
        },
        RawCommand::DeleteUsage => BotCommand::Invalid(CommandError::DeleteUsage),
        RawCommand::Unrecognized => BotCommand::Unrecognized,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_add() {
        assert_eq!(
            parse("  /add Despesa 50 mercado  "),
            BotCommand::Add { kind: Kind::Expense, amount: 50.0, description: Arc::from("mercado") }
        );
        assert_eq!(
            parse("/add receita 1200,5 salario de janeiro"),
            BotCommand::Add { kind: Kind::Income, amount: 1200.5, description: Arc::from("salario de janeiro") }
        );
    }

    #[test]
    fn test_add_errors() {
        assert_eq!(parse("/add despesa cinquenta mercado"), BotCommand::Invalid(CommandError::AddUsage));
        assert_eq!(parse("/add despesa"), BotCommand::Invalid(CommandError::AddUsage));
        assert_eq!(
            parse("/add presente 50 bicicleta"),
            BotCommand::Invalid(CommandError::InvalidKind("presente".to_string()))
        );
        assert_eq!(parse("/add presente abc bicicleta"), BotCommand::Invalid(CommandError::AddUsage));
    }

    #[test]
    fn test_parse_delete() {
        assert_eq!(parse("/del 7"), BotCommand::Delete { id: 7 });
        assert_eq!(parse("/del sete"), BotCommand::Invalid(CommandError::DeleteUsage));
        assert_eq!(parse("/del"), BotCommand::Invalid(CommandError::DeleteUsage));
    }

    #[test]
    fn test_parse_list_and_balance() {
        assert_eq!(parse("/listar"), BotCommand::List { kind: None });
        assert_eq!(parse("/listar despesa"), BotCommand::List { kind: Some(Kind::Expense) });
        assert_eq!(
            parse("/listar tudo"),
            BotCommand::Invalid(CommandError::InvalidKind("tudo".to_string()))
        );
        assert_eq!(parse("/saldo"), BotCommand::Balance);
        assert_eq!(
            parse("/periodo 2024-01-01 2024-01-31"),
            BotCommand::PeriodBalance(Period::parse("2024-01-01", "2024-01-31").unwrap())
        );
        assert_eq!(parse("/periodo janeiro fevereiro"), BotCommand::Invalid(CommandError::PeriodUsage));
    }

    #[test]
    fn test_mentions_are_ignored() {
        assert_eq!(parse("/saldo@FinanzaBot"), BotCommand::Balance);
        assert_eq!(parse("/del@FinanzaBot 2"), BotCommand::Delete { id: 2 });
        assert_eq!(parse("me manda @alguem"), BotCommand::Unrecognized);
    }

    #[test]
    fn test_everything_else_is_unrecognized() {
        assert_eq!(parse("bom dia"), BotCommand::Unrecognized);
        assert_eq!(parse("/comprar pao"), BotCommand::Unrecognized);
        assert_eq!(parse(""), BotCommand::Unrecognized);
        assert_eq!(parse("/start"), BotCommand::Help);
    }
}
