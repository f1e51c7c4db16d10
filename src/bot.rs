use std::sync::Arc;

use finanza_core::{
    AmountPolicy, BalanceCalculator, BalanceSummary, IsoDate, Kind, NewTransaction, Period, StorageBackend,
    StorageError, TransactionId, ValidationError,
};

use crate::{
    command::{BotCommand, CommandError},
    render,
};

pub const UNRECOGNIZED_REPLY: &str = "Desculpe, não entendi. Envie /ajuda para ver os comandos.";

const ADD_USAGE_REPLY: &str =
    "Erro ao adicionar. 😥\nVerifique o formato: /add [tipo] [valor] [descrição]\nExemplo: /add despesa 50 mercado";
const DELETE_USAGE_REPLY: &str = "Erro ao deletar. 😥\nVerifique o formato: /del [ID]\nExemplo: /del 1";
const PERIOD_USAGE_REPLY: &str =
    "Erro no período. 😥\nVerifique o formato: /periodo [início] [fim]\nExemplo: /periodo 2024-01-01 2024-01-31";
const INVALID_KIND_REPLY: &str = "Erro: tipo inválido. Use 'receita' ou 'despesa'.";

/// Executes chat commands against the store and renders the reply text.
///
/// Every call is blocking; the webhook runs it on the blocking pool.
pub struct Bot {
    storage: Arc<dyn StorageBackend>,
    calculator: BalanceCalculator,
    policy: AmountPolicy,
    today: fn() -> IsoDate,
}

impl Bot {
    pub fn new(storage: Arc<dyn StorageBackend>, policy: AmountPolicy) -> Self {
        Self::with_clock(storage, policy, IsoDate::today)
    }

    pub fn with_clock(storage: Arc<dyn StorageBackend>, policy: AmountPolicy, today: fn() -> IsoDate) -> Self {
        Self {
            calculator: BalanceCalculator::new(storage.clone()),
            storage,
            policy,
            today,
        }
    }

    pub fn reply(&self, command: &BotCommand) -> String {
        match command {
            BotCommand::Help => render::help_text(),
            BotCommand::List { kind } => self.list(*kind),
            BotCommand::Balance => self.balance("Balanço Total", self.calculator.total_balance()),
            BotCommand::PeriodBalance(period) => self.period_balance(period),
            BotCommand::Add { kind, amount, description } => self.add(*kind, *amount, description),
            BotCommand::Delete { id } => self.delete(*id),
            BotCommand::Invalid(err) => usage_reply(err).to_string(),
            BotCommand::Unrecognized => UNRECOGNIZED_REPLY.to_string(),
        }
    }

    fn list(&self, kind: Option<Kind>) -> String {
        let result = match kind {
            Some(kind) => self.storage.list_by_kind(kind),
            None => self.storage.list_all(),
        };
        match result {
            Ok(transactions) => render::chat_transaction_list(&transactions),
            Err(e) => {
                tracing::error!("Failed to list transactions: {}", e);
                format!("Erro ao buscar transações: {}", e)
            }
        }
    }

    fn period_balance(&self, period: &Period) -> String {
        let title = format!("Balanço de {} a {}", period.start, period.end);
        self.balance(&title, self.calculator.period_balance(period))
    }

    fn balance(&self, title: &str, result: Result<BalanceSummary, StorageError>) -> String {
        match result {
            Ok(summary) => render::chat_balance(title, &summary),
            Err(e) => {
                tracing::error!("Failed to compute balance: {}", e);
                format!("Erro ao calcular saldo: {}", e)
            }
        }
    }

    fn add(&self, kind: Kind, amount: f64, description: &str) -> String {
        let txn = match NewTransaction::new(kind, description, amount, (self.today)())
            .and_then(|txn| txn.with_policy(self.policy))
        {
            Ok(txn) => txn,
            Err(e @ ValidationError::NegativeAmount(_)) => {
                return format!("Erro: {}.", render::validation_error(&e));
            }
            Err(_) => return ADD_USAGE_REPLY.to_string(),
        };

        match self.storage.insert(&txn) {
            Ok(id) => format!(
                "✅ Sucesso! {}: {} ({}). Adicionado com ID {}!",
                txn.kind.label(),
                txn.description,
                render::money(txn.amount),
                id
            ),
            Err(e) => {
                tracing::error!("Failed to add transaction: {}", e);
                format!("Erro ao adicionar transação: {}", e)
            }
        }
    }

    fn delete(&self, id: TransactionId) -> String {
        match self.storage.delete_by_id(id) {
            Ok(0) => format!("⚠️ Erro: Nenhuma transação encontrada com o ID {}.", id),
            Ok(_) => format!("🗑️ Sucesso! Transação ID {} foi deletada.", id),
            Err(e) => {
                tracing::error!("Failed to delete transaction {}: {}", id, e);
                format!("Erro ao deletar transação: {}", e)
            }
        }
    }
}

fn usage_reply(err: &CommandError) -> &'static str {
    match err {
        CommandError::AddUsage => ADD_USAGE_REPLY,
        CommandError::DeleteUsage => DELETE_USAGE_REPLY,
        CommandError::PeriodUsage => PERIOD_USAGE_REPLY,
        CommandError::InvalidKind(_) => INVALID_KIND_REPLY,
    }
}
