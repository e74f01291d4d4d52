use serde::Serialize;

use stocksnap_core::{StockRecord, StockService};

use crate::cli::SearchArgs;
use crate::error::CliError;

use super::CommandResult;

#[derive(Debug, Serialize)]
struct SearchResponseData {
    query: String,
    results: Vec<StockRecord>,
}

pub async fn run(args: &SearchArgs, service: &StockService) -> Result<CommandResult, CliError> {
    if args.limit == 0 {
        return Err(CliError::Command(String::from(
            "--limit must be greater than zero",
        )));
    }

    let query = args.query.trim();
    if query.is_empty() {
        return Err(CliError::Command(String::from("query must not be empty")));
    }

    let results = service.search(query, args.limit).await?;
    let data = serde_json::to_value(SearchResponseData {
        query: query.to_owned(),
        results,
    })?;

    Ok(CommandResult::ok(data))
}
