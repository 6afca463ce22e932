//! Command handlers for the shell.

use chrono::{Local, NaiveDate};

use crate::cli::context::ShellContext;
use crate::cli::output;
use crate::cli::{CommandError, LoopControl};
use crate::domain::{
    parse_calendar_date, Displayable, FilterMode, Transaction, TransactionDraft, TransactionId,
};
use crate::errors::LedgerError;
use crate::utils::format::format_currency;

pub(crate) const COMMAND_NAMES: &[&str] = &[
    "add", "update", "remove", "list", "filter", "view", "summary", "theme", "help", "exit",
];

const ADD_USAGE: &str = "add <description> <amount> <date> <expense|income>";
const UPDATE_USAGE: &str = "update <id> <description> <amount> <date> <expense|income>";
const REMOVE_USAGE: &str = "remove <id> --yes";
const FILTER_USAGE: &str = "filter <all|income|expense>";
const THEME_USAGE: &str = "theme [on|off]";

type CommandResult = Result<LoopControl, CommandError>;

pub(crate) fn dispatch(context: &mut ShellContext, command: &str, args: &[&str]) -> CommandResult {
    match command {
        "add" => add(context, args),
        "update" | "edit" => update(context, args),
        "remove" | "rm" => remove(context, args),
        "list" | "ls" => list(context),
        "filter" => filter(context, args),
        "view" => view(context),
        "summary" | "totals" => summary(context),
        "theme" => theme(context, args),
        "help" => help(),
        "exit" | "quit" => Ok(LoopControl::Exit),
        other => Err(CommandError::Unknown(other.to_string())),
    }
}

fn add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [description, amount, date, kind] = args else {
        return Err(CommandError::Usage(ADD_USAGE));
    };
    let draft = parse_draft(description, amount, date, kind)?;
    let mutation = context.tracker.add(draft)?;
    context.warn_if_volatile(&mutation);
    output::success(format!("Added {}", mutation.value.id));
    Ok(LoopControl::Continue)
}

fn update(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [id, description, amount, date, kind] = args else {
        return Err(CommandError::Usage(UPDATE_USAGE));
    };
    let draft = parse_draft(description, amount, date, kind)?;
    let mutation = context.tracker.update(&TransactionId::from(*id), draft)?;
    context.warn_if_volatile(&mutation);
    output::success(format!("Updated {}", mutation.value.id));
    Ok(LoopControl::Continue)
}

fn remove(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (id, confirmed) = match args {
        [id] => (*id, false),
        [id, flag] if *flag == "--yes" || *flag == "-y" => (*id, true),
        _ => return Err(CommandError::Usage(REMOVE_USAGE)),
    };
    let id = TransactionId::from(id);
    if !confirmed {
        let existing = context
            .tracker
            .get(&id)
            .ok_or_else(|| LedgerError::NotFound(id.clone()))?;
        output::warning(format!(
            "`{}` will be deleted permanently; repeat with --yes to confirm",
            existing.description
        ));
        return Ok(LoopControl::Continue);
    }
    let mutation = context.tracker.remove(&id)?;
    context.warn_if_volatile(&mutation);
    output::success(format!("Removed {}", mutation.value.id));
    Ok(LoopControl::Continue)
}

fn list(context: &mut ShellContext) -> CommandResult {
    print_rows("Transactions", &context.tracker.list());
    Ok(LoopControl::Continue)
}

fn filter(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [mode] = args else {
        return Err(CommandError::Usage(FILTER_USAGE));
    };
    let mode: FilterMode = mode.parse()?;
    context.tracker.set_filter_mode(mode);
    output::success(format!("Filter set to {mode}"));
    Ok(LoopControl::Continue)
}

fn view(context: &mut ShellContext) -> CommandResult {
    let title = format!("Transactions ({})", context.tracker.filter_mode());
    print_rows(&title, &context.tracker.filtered_view());
    Ok(LoopControl::Continue)
}

fn summary(context: &mut ShellContext) -> CommandResult {
    let totals = context.tracker.aggregates();
    output::section("Summary");
    output::info(format!("Income:  {}", format_currency(totals.total_income)));
    output::info(format!("Expense: {}", format_currency(totals.total_expense)));
    output::info(format!("Balance: {}", format_currency(totals.balance)));
    Ok(LoopControl::Continue)
}

fn theme(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let enabled = match args {
        [] => {
            let label = if context.tracker.theme_preference() { "on" } else { "off" };
            output::info(format!("Dark theme: {label}"));
            return Ok(LoopControl::Continue);
        }
        ["on"] => true,
        ["off"] => false,
        _ => return Err(CommandError::Usage(THEME_USAGE)),
    };
    if let Err(err) = context.tracker.set_theme_preference(enabled) {
        output::warning(format!("theme preference not saved: {err}"));
    } else {
        output::success(format!("Dark theme {}", if enabled { "on" } else { "off" }));
    }
    Ok(LoopControl::Continue)
}

fn help() -> CommandResult {
    output::section("Commands");
    for line in [
        ADD_USAGE,
        UPDATE_USAGE,
        REMOVE_USAGE,
        "list",
        FILTER_USAGE,
        "view",
        "summary",
        THEME_USAGE,
        "exit",
    ] {
        output::info(format!("  {line}"));
    }
    Ok(LoopControl::Continue)
}

fn parse_draft(
    description: &str,
    amount: &str,
    date: &str,
    kind: &str,
) -> Result<TransactionDraft, CommandError> {
    let amount = TransactionDraft::parse_amount(amount)?;
    let date = parse_date(date)?;
    let is_expense = match kind.to_ascii_lowercase().as_str() {
        "expense" | "out" => true,
        "income" | "in" => false,
        other => {
            return Err(LedgerError::Validation(format!(
                "`{other}` is neither expense nor income"
            ))
            .into())
        }
    };
    Ok(TransactionDraft::new(description, amount, date, is_expense))
}

fn parse_date(raw: &str) -> Result<NaiveDate, LedgerError> {
    if raw.eq_ignore_ascii_case("today") {
        return Ok(Local::now().date_naive());
    }
    parse_calendar_date(raw)
        .ok_or_else(|| LedgerError::Validation(format!("`{raw}` is not a date (YYYY-MM-DD)")))
}

fn print_rows(title: &str, rows: &[Transaction]) {
    output::section(title);
    if rows.is_empty() {
        output::info("(no transactions)");
        return;
    }
    for txn in rows {
        output::info(render_row(txn));
    }
}

fn render_row(txn: &Transaction) -> String {
    format!(
        "{}  {:<40} {:>12}",
        txn.id,
        txn.display_label(),
        format_currency(txn.signed_amount())
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_draft_maps_kind_words() {
        let draft = parse_draft("Coffee", "4.50", "2024-01-01", "expense").unwrap();
        assert!(draft.is_expense);
        assert_eq!(draft.amount, 4.5);
        let draft = parse_draft("Salary", "2000", "2024-01-02", "INCOME").unwrap();
        assert!(!draft.is_expense);
    }

    #[test]
    fn rows_show_label_and_signed_amount() {
        let txn = Transaction {
            id: TransactionId::from("t-1"),
            description: "Coffee".into(),
            amount: 4.5,
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            is_expense: true,
        };
        let row = render_row(&txn);
        assert!(row.starts_with("t-1  2024-01-01 Coffee [expense]"));
        assert!(row.ends_with("-$4.50"));
    }

    #[test]
    fn parse_draft_rejects_bad_fields() {
        assert!(parse_draft("Coffee", "abc", "2024-01-01", "expense").is_err());
        assert!(parse_draft("Coffee", "4.50", "01/01/2024", "expense").is_err());
        assert!(parse_draft("Coffee", "4.50", "2024-01-01", "gift").is_err());
    }
}
