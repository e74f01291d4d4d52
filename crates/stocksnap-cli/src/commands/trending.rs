use serde::Serialize;

use stocksnap_core::{StockRecord, StockService};

use crate::cli::TrendingArgs;
use crate::error::CliError;

use super::CommandResult;

#[derive(Debug, Serialize)]
struct TrendingResponseData {
    limit: usize,
    stocks: Vec<StockRecord>,
}

pub async fn run(args: &TrendingArgs, service: &StockService) -> Result<CommandResult, CliError> {
    let stocks = service.top_by_market_cap(args.limit).await?;
    let data = serde_json::to_value(TrendingResponseData {
        limit: args.limit,
        stocks,
    })?;

    Ok(CommandResult::ok(data))
}
