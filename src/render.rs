//! Text shown to people: chat replies and console output.

use finanza_core::{BalanceSummary, Transaction, ValidationError};
use prettytable::{row, Table};

pub fn money(amount: f64) -> String {
    format!("R$ {:.2}", amount)
}

pub fn help_text() -> String {
    [
        "Olá! 👋 Bem-vindo ao seu Bot de Finanças.",
        "Aqui estão os comandos:",
        "/listar - Lista todas as transações",
        "/listar [tipo] - Lista só receitas ou só despesas",
        "/saldo - Mostra o saldo total",
        "/periodo [início] [fim] - Saldo entre duas datas (AAAA-MM-DD)",
        "/add [tipo] [valor] [desc] (ex: /add despesa 50 mercado)",
        "/del [ID] - Deleta a transação pelo ID",
    ]
    .join("\n")
}

pub fn chat_transaction_list(transactions: &[Transaction]) -> String {
    if transactions.is_empty() {
        return "Nenhuma transação encontrada.".to_string();
    }

    let mut text = String::from("--- Suas Transações ---\n");
    for t in transactions {
        text.push_str(&format!(
            "ID {}: {} | {} | {} ({})\n",
            t.id, t.date, t.description, money(t.amount), t.kind
        ));
    }
    text
}

pub fn chat_balance(title: &str, summary: &BalanceSummary) -> String {
    format!(
        "--- {} ---\n✅ Receitas: {}\n❌ Despesas: {}\n-----------------------\n💰 Saldo: {}",
        title,
        money(summary.income),
        money(summary.expense),
        money(summary.net)
    )
}

pub fn console_table(transactions: &[Transaction]) -> String {
    let mut table = Table::new();
    table.add_row(row!["ID", "Tipo", "Data", "Descrição", "Valor"]);
    table.add_empty_row();

    for t in transactions {
        table.add_row(row![t.id, t.kind, t.date, t.description, money(t.amount)]);
    }

    table.to_string()
}

pub fn console_balance(summary: &BalanceSummary, suffix: &str) -> String {
    format!(
        "Total de Receitas{suffix}: {}\nTotal de Despesas{suffix}: {}\n-------------------------------------\nSaldo Líquido{suffix}: {}",
        money(summary.income),
        money(summary.expense),
        money(summary.net),
        suffix = suffix
    )
}

/// Portuguese wording for a rejected input, without trailing punctuation.
pub fn validation_error(err: &ValidationError) -> String {
    match err {
        ValidationError::InvalidKind(kind) => format!("tipo inválido '{}', use 'receita' ou 'despesa'", kind),
        ValidationError::InvalidAmount(raw) => format!("valor inválido '{}', deve ser um número", raw),
        ValidationError::NegativeAmount(_) => "valores negativos não são permitidos".to_string(),
        ValidationError::InvalidDate(raw) => format!("data inválida '{}', use o formato AAAA-MM-DD", raw),
        ValidationError::EmptyDescription => "a descrição não pode ficar vazia".to_string(),
        ValidationError::UnknownField(field) => format!("o campo '{}' não pode ser atualizado", field),
        ValidationError::InvalidId(raw) => format!("ID inválido '{}', deve ser um número inteiro", raw),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use finanza_core::{IsoDate, Kind};

    use super::*;

    fn txn(id: i64, kind: Kind, description: &str, amount: f64, date: &str) -> Transaction {
        Transaction {
            id,
            kind,
            description: Arc::from(description),
            amount,
            date: IsoDate::parse(date).unwrap(),
        }
    }

    #[test]
    fn test_money_has_two_decimals() {
        assert_eq!(money(50.0), "R$ 50.00");
        assert_eq!(money(75.556), "R$ 75.56");
        assert_eq!(money(-3.5), "R$ -3.50");
    }

    #[test]
    fn test_chat_list() {
        assert_eq!(chat_transaction_list(&[]), "Nenhuma transação encontrada.");

        let text = chat_transaction_list(&[
            txn(1, Kind::Income, "salario", 100.0, "2024-01-05"),
            txn(2, Kind::Expense, "mercado", 30.0, "2024-01-10"),
        ]);
        assert_eq!(
            text,
            "--- Suas Transações ---\n\
             ID 1: 2024-01-05 | salario | R$ 100.00 (receita)\n\
             ID 2: 2024-01-10 | mercado | R$ 30.00 (despesa)\n"
        );
    }

    #[test]
    fn test_chat_balance() {
        let text = chat_balance("Balanço Total", &BalanceSummary { income: 150.0, expense: 30.0, net: 120.0 });
        assert!(text.starts_with("--- Balanço Total ---"));
        assert!(text.contains("Receitas: R$ 150.00"));
        assert!(text.contains("Despesas: R$ 30.00"));
        assert!(text.ends_with("Saldo: R$ 120.00"));
    }

    #[test]
    fn test_console_table_contains_rows() {
        let text = console_table(&[txn(4, Kind::Expense, "aluguel", 900.0, "2024-03-01")]);
        assert!(text.contains("Descrição"));
        assert!(text.contains("aluguel"));
        assert!(text.contains("R$ 900.00"));
        assert!(text.contains("despesa"));
    }

    #[test]
    fn test_validation_errors_in_portuguese() {
        assert_eq!(
            validation_error(&ValidationError::NegativeAmount(-1.0)),
            "valores negativos não são permitidos"
        );
        assert_eq!(
            validation_error(&ValidationError::InvalidDate("31/01/2024".to_string())),
            "data inválida '31/01/2024', use o formato AAAA-MM-DD"
        );
    }

    #[test]
    fn test_console_balance_suffix() {
        let text = console_balance(&BalanceSummary { income: 100.0, expense: 30.0, net: 70.0 }, " no Período");
        assert!(text.contains("Total de Receitas no Período: R$ 100.00"));
        assert!(text.contains("Saldo Líquido no Período: R$ 70.00"));
    }
}
