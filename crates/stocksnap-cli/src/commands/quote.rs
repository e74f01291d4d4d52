use serde::Serialize;

use stocksnap_core::{StockRecord, StockService};

use crate::cli::QuoteArgs;
use crate::error::CliError;

use super::CommandResult;

#[derive(Debug, Serialize)]
struct QuoteResponseData {
    symbol: String,
    stock: Option<StockRecord>,
}

pub async fn run(args: &QuoteArgs, service: &StockService) -> Result<CommandResult, CliError> {
    let symbol = args.symbol.trim();
    if symbol.is_empty() {
        return Err(CliError::Command(String::from("symbol must not be empty")));
    }

    let stock = service.lookup(symbol).await?;
    let found = stock.is_some();
    let data = serde_json::to_value(QuoteResponseData {
        symbol: symbol.to_owned(),
        stock,
    })?;

    let result = CommandResult::ok(data);
    if found {
        Ok(result)
    } else {
        Ok(result.with_error(format!("symbol '{symbol}' not found in snapshot")))
    }
}
