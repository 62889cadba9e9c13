use pivotfx_core::RateResolver;
use serde_json::json;

use crate::cli::HistoryArgs;

use super::CommandResult;

pub async fn run(args: &HistoryArgs, resolver: &RateResolver) -> CommandResult {
    let result = resolver
        .history(&args.base, &args.target, &args.from, &args.to)
        .await;

    CommandResult::from_result(result, |rates| {
        json!({
            "base": args.base.trim().to_ascii_uppercase(),
            "target": args.target.trim().to_ascii_uppercase(),
            "from": args.from,
            "to": args.to,
            "rates": rates,
        })
    })
}
