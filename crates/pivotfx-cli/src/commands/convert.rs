use pivotfx_core::RateResolver;
use serde_json::json;

use crate::cli::ConvertArgs;

use super::{resolved_date, CommandResult};

pub async fn run(args: &ConvertArgs, resolver: &RateResolver) -> CommandResult {
    let result = resolver
        .convert(args.amount, &args.base, &args.target, args.date.as_deref())
        .await;

    CommandResult::from_result(result, |converted| {
        json!({
            "base": args.base.trim().to_ascii_uppercase(),
            "target": args.target.trim().to_ascii_uppercase(),
            "date": resolved_date(args.date.as_deref()),
            "amount": args.amount,
            "converted_amount": converted,
        })
    })
}
