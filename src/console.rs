use std::{
    io::{self, BufRead, Write},
    sync::Arc,
};

use finanza_core::{
    parse_amount, parse_id, AmountPolicy, BalanceCalculator, IsoDate, Kind, NewTransaction, Period,
    StorageBackend, TransactionField, UpdateOutcome,
};

use crate::{error::AppError, render};

/// The numbered menu, driven by any line-oriented reader and writer.
pub struct Console<R, W> {
    input: R,
    output: W,
    storage: Arc<dyn StorageBackend>,
    calculator: BalanceCalculator,
    policy: AmountPolicy,
    today: fn() -> IsoDate,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W, storage: Arc<dyn StorageBackend>, policy: AmountPolicy) -> Self {
        Self::with_clock(input, output, storage, policy, IsoDate::today)
    }

    pub fn with_clock(
        input: R,
        output: W,
        storage: Arc<dyn StorageBackend>,
        policy: AmountPolicy,
        today: fn() -> IsoDate,
    ) -> Self {
        Self {
            input,
            output,
            calculator: BalanceCalculator::new(storage.clone()),
            storage,
            policy,
            today,
        }
    }

    /// Runs until the user picks 0 or input ends.
    pub fn run(&mut self) -> Result<(), AppError> {
        match self.menu_loop() {
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                tracing::debug!("Console input closed");
                Ok(())
            }
            other => other.map_err(AppError::from),
        }
    }

    fn menu_loop(&mut self) -> io::Result<()> {
        loop {
            writeln!(self.output, "\n--- Menu Principal Finanza ---")?;
            writeln!(self.output, "1. Adicionar Transação")?;
            writeln!(self.output, "2. Listar Transações")?;
            writeln!(self.output, "3. Atualizar Transação (por ID)")?;
            writeln!(self.output, "4. Deletar Transação (por ID)")?;
            writeln!(self.output, "5. Ver saldo total")?;
            writeln!(self.output, "6. Calcular saldo por período")?;
            writeln!(self.output, "7. Limpar todas as transações")?;
            writeln!(self.output, "0. Sair")?;

            let choice = self.prompt("Digite sua escolha: ")?;
            match choice.as_str() {
                "0" => {
                    writeln!(self.output, "\nSaindo... Até mais!")?;
                    return Ok(());
                }
                "1" => self.add()?,
                "2" => self.list()?,
                "3" => self.update()?,
                "4" => self.delete()?,
                "5" => self.total_balance()?,
                "6" => self.period_balance()?,
                "7" => self.clear()?,
                _ => {
                    writeln!(self.output, "\nOpção inválida. Tente novamente.")?;
                    continue;
                }
            }
            self.prompt("\nPressione Enter para voltar ao menu...")?;
        }
    }

    /// Writes `label`, then reads one line with surrounding whitespace removed.
    fn prompt(&mut self, label: &str) -> io::Result<String> {
        write!(self.output, "{}", label)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "console input closed"));
        }
        Ok(line.trim().to_string())
    }

    fn prompt_kind(&mut self) -> io::Result<Option<Kind>> {
        writeln!(self.output, "1. Receita")?;
        writeln!(self.output, "2. Despesa")?;
        Ok(match self.prompt("Digite 1 ou 2: ")?.as_str() {
            "1" => Some(Kind::Income),
            "2" => Some(Kind::Expense),
            _ => None,
        })
    }

    fn add(&mut self) -> io::Result<()> {
        writeln!(self.output, "\n--- Adicionar Nova Transação ---")?;
        writeln!(self.output, "Selecione o tipo da transação:")?;
        let Some(kind) = self.prompt_kind()? else {
            writeln!(self.output, "Erro: Opção de tipo inválida. Transação cancelada.")?;
            return Ok(());
        };

        let description = self.prompt(&format!("Descrição da {}: ", kind))?;
        let date = (self.today)();
        writeln!(self.output, "Data registrada automaticamente: {}", date)?;

        let amount = match parse_amount(&self.prompt(&format!("Valor da {}: R$ ", kind))?) {
            Ok(amount) => amount,
            Err(_) => {
                writeln!(self.output, "Erro: Valor inválido. Deve ser um número. Transação cancelada.")?;
                return Ok(());
            }
        };

        let txn = match NewTransaction::new(kind, &description, amount, date)
            .and_then(|txn| txn.with_policy(self.policy))
        {
            Ok(txn) => txn,
            Err(e) => {
                writeln!(self.output, "Erro: {}. Transação cancelada.", render::validation_error(&e))?;
                return Ok(());
            }
        };

        match self.storage.insert(&txn) {
            Ok(id) => writeln!(self.output, "\nSucesso! Transação adicionada com ID {}.", id),
            Err(e) => writeln!(self.output, "\nErro ao adicionar transação: {}", e),
        }
    }

    fn list(&mut self) -> io::Result<()> {
        writeln!(self.output, "\n--- Listar Transações ---")?;
        writeln!(self.output, "Filtrar por tipo? (Enter para todas)")?;
        let kind = match self.prompt_filter()? {
            Ok(kind) => kind,
            Err(()) => {
                writeln!(self.output, "Opção inválida. Operação cancelada.")?;
                return Ok(());
            }
        };

        let result = match kind {
            Some(kind) => self.storage.list_by_kind(kind),
            None => self.storage.list_all(),
        };
        match result {
            Ok(transactions) if transactions.is_empty() => {
                writeln!(self.output, "Nenhuma transação encontrada.")
            }
            Ok(transactions) => write!(self.output, "{}", render::console_table(&transactions)),
            Err(e) => writeln!(self.output, "\nErro ao listar transações: {}", e),
        }
    }

    // Ok(None) means no filter; Err(()) an unknown option.
    fn prompt_filter(&mut self) -> io::Result<Result<Option<Kind>, ()>> {
        writeln!(self.output, "1. Receita")?;
        writeln!(self.output, "2. Despesa")?;
        Ok(match self.prompt("Digite 1, 2 ou Enter: ")?.as_str() {
            "" => Ok(None),
            "1" => Ok(Some(Kind::Income)),
            "2" => Ok(Some(Kind::Expense)),
            _ => Err(()),
        })
    }

    fn update(&mut self) -> io::Result<()> {
        writeln!(self.output, "\n--- Atualizar Transação ---")?;
        let id = match parse_id(&self.prompt("Digite o ID da transação que deseja atualizar: ")?) {
            Ok(id) => id,
            Err(_) => {
                writeln!(self.output, "Erro: ID inválido. Deve ser um número. Operação cancelada.")?;
                return Ok(());
            }
        };

        writeln!(self.output, "\nO que você deseja atualizar nesta transação?")?;
        writeln!(self.output, "1. Descrição")?;
        writeln!(self.output, "2. Valor")?;
        writeln!(self.output, "3. Data")?;
        writeln!(self.output, "4. Tipo (receita/despesa)")?;
        writeln!(self.output, "0. Cancelar")?;

        let field = match self.prompt("Digite sua escolha: ")?.as_str() {
            "0" => {
                writeln!(self.output, "Operação cancelada.")?;
                return Ok(());
            }
            "1" => TransactionField::Description,
            "2" => TransactionField::Amount,
            "3" => TransactionField::Date,
            "4" => TransactionField::Kind,
            _ => {
                writeln!(self.output, "Opção inválida. Operação cancelada.")?;
                return Ok(());
            }
        };

        let raw = match field {
            TransactionField::Description => self.prompt("Digite a NOVA descrição: ")?,
            TransactionField::Amount => self.prompt("Digite o NOVO valor: R$ ")?,
            TransactionField::Date => self.prompt("Digite a NOVA data (AAAA-MM-DD): ")?,
            TransactionField::Kind => {
                writeln!(self.output, "Selecione o NOVO tipo:")?;
                match self.prompt_kind()? {
                    Some(kind) => kind.as_db_str().to_string(),
                    None => {
                        writeln!(self.output, "Erro: Opção de tipo inválida. Operação cancelada.")?;
                        return Ok(());
                    }
                }
            }
        };

        let update = match field.parse_value(&raw).and_then(|u| u.with_policy(self.policy)) {
            Ok(update) => update,
            Err(e) => {
                writeln!(self.output, "Erro: {}. Operação cancelada.", render::validation_error(&e))?;
                return Ok(());
            }
        };

        match self.storage.update_field(id, &update) {
            Ok(UpdateOutcome::Updated) => writeln!(
                self.output,
                "Sucesso: Campo '{}' da transação ID {} atualizado.",
                field, id
            ),
            Ok(UpdateOutcome::NotFound) => {
                writeln!(self.output, "Aviso: Nenhuma transação encontrada com o ID {}.", id)
            }
            Err(e) => writeln!(self.output, "\nErro ao atualizar transação: {}", e),
        }
    }

    fn delete(&mut self) -> io::Result<()> {
        writeln!(self.output, "\n--- Deletar Transação ---")?;
        let id = match parse_id(&self.prompt("ID da transação a ser deletada: ")?) {
            Ok(id) => id,
            Err(_) => {
                writeln!(self.output, "Erro: ID inválido. Deve ser um número inteiro.")?;
                return Ok(());
            }
        };

        match self.storage.delete_by_id(id) {
            Ok(0) => writeln!(self.output, "Nenhuma transação encontrada com ID {}.", id),
            Ok(_) => writeln!(self.output, "Transação com ID {} deletada com sucesso.", id),
            Err(e) => writeln!(self.output, "\nErro ao deletar transação: {}", e),
        }
    }

    fn total_balance(&mut self) -> io::Result<()> {
        writeln!(self.output, "\n--- Saldo Total ---")?;
        match self.calculator.total_balance() {
            Ok(summary) => writeln!(self.output, "{}", render::console_balance(&summary, "")),
            Err(e) => writeln!(self.output, "\nErro ao calcular saldo: {}", e),
        }
    }

    fn period_balance(&mut self) -> io::Result<()> {
        writeln!(self.output, "\n--- Calcular Saldo em Período ---")?;
        let start = self.prompt("Data de Início (AAAA-MM-DD): ")?;
        let end = self.prompt("Data de Fim (AAAA-MM-DD): ")?;

        let period = match Period::parse(&start, &end) {
            Ok(period) => period,
            Err(e) => {
                writeln!(self.output, "Erro: {}.", render::validation_error(&e))?;
                return Ok(());
            }
        };

        match self.calculator.period_balance(&period) {
            Ok(summary) => writeln!(self.output, "{}", render::console_balance(&summary, " no Período")),
            Err(e) => writeln!(self.output, "\nErro ao calcular saldo no período: {}", e),
        }
    }

    fn clear(&mut self) -> io::Result<()> {
        writeln!(self.output, "\n--- Limpar Todas as Transações ---")?;
        let answer = self.prompt("Tem certeza que deseja deletar todas as transações? (s/n): ")?;
        if answer.to_lowercase() != "s" {
            return writeln!(self.output, "Operação cancelada.");
        }

        match self.storage.clear_all() {
            Ok(()) => writeln!(self.output, "Todas as transações foram deletadas e o ID resetado."),
            Err(e) => writeln!(self.output, "\nErro ao limpar transações: {}", e),
        }
    }
}
