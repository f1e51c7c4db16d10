use peg::{error::ParseError, str::LineCol};

/// Chat text split into its command and argument slices, before any value is validated.
#[derive(Debug, Clone, PartialEq)]
pub enum RawCommand<'a> {
    Help,
    List(Option<&'a str>),
    Balance,
    Period(&'a str, &'a str),
    PeriodUsage,
    Add { kind: &'a str, amount: &'a str, description: &'a str },
    AddUsage,
    Delete(&'a str),
    DeleteUsage,
    Unrecognized,
}

peg::parser! {
    grammar chat() for str {

        rule _()
            = [' ' | '\t']

        // trailing blanks, then nothing
        rule eoi()
            = _* ![_]

        rule word() -> &'input str
            = w:$([^ ' ' | '\t']+) { w }

        rule rest() -> &'input str
            = r:$([_]+) { r }

        // anything after the command name, as long as it starts with a blank
        rule tail()
            = _ [_]*

        rule help() -> RawCommand<'input>
            = ("/start" / "/ajuda" / "/help") eoi() { RawCommand::Help }

        rule list() -> RawCommand<'input>
            = "/listar" kind:(_+ k:word() { k })? eoi() { RawCommand::List(kind) }

        rule balance() -> RawCommand<'input>
            = "/saldo" eoi() { RawCommand::Balance }

        rule period() -> RawCommand<'input>
            = "/periodo" _+ start:word() _+ end:word() eoi() { RawCommand::Period(start, end) }
            / "/periodo" tail()? ![_] { RawCommand::PeriodUsage }

        // e.g. '/add despesa 50 mercado da esquina'
        rule add() -> RawCommand<'input>
            = "/add" _+ kind:word() _+ amount:word() _+ description:rest() {
                RawCommand::Add { kind, amount, description }
            }
            / "/add" tail()? ![_] { RawCommand::AddUsage }

        rule delete() -> RawCommand<'input>
            = "/del" _+ id:word() eoi() { RawCommand::Delete(id) }
            / "/del" tail()? ![_] { RawCommand::DeleteUsage }

        rule other() -> RawCommand<'input>
            = [_]* { RawCommand::Unrecognized }

        pub rule command() -> RawCommand<'input>
            = help() / list() / balance() / period() / add() / delete() / other()
    }
}

pub fn parse(input: &str) -> Result<RawCommand<'_>, ParseError<LineCol>> {
    chat::command(input)
}
