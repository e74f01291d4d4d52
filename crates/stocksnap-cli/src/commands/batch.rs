use serde::Serialize;

use stocksnap_core::{StockRecord, StockService};

use crate::cli::BatchArgs;
use crate::error::CliError;

use super::CommandResult;

#[derive(Debug, Serialize)]
struct BatchResponseData {
    requested: usize,
    stocks: Vec<StockRecord>,
}

pub async fn run(args: &BatchArgs, service: &StockService) -> Result<CommandResult, CliError> {
    let stocks = service.batch(args.symbols.as_slice()).await?;

    let missing = args
        .symbols
        .iter()
        .filter(|symbol| !stocks.iter().any(|stock| stock.symbol.matches(symbol)))
        .map(|symbol| format!("symbol '{symbol}' not found in snapshot"))
        .collect::<Vec<_>>();

    let data = serde_json::to_value(BatchResponseData {
        requested: args.symbols.len(),
        stocks,
    })?;

    Ok(CommandResult::ok(data).with_warnings(missing))
}
