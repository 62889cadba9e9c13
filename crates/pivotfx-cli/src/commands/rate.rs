use pivotfx_core::RateResolver;
use serde_json::json;

use crate::cli::RateArgs;

use super::{resolved_date, CommandResult};

pub async fn run(args: &RateArgs, resolver: &RateResolver) -> CommandResult {
    let result = resolver
        .resolve(&args.base, &args.target, args.date.as_deref())
        .await;

    CommandResult::from_result(result, |rate| {
        json!({
            "base": args.base.trim().to_ascii_uppercase(),
            "target": args.target.trim().to_ascii_uppercase(),
            "date": resolved_date(args.date.as_deref()),
            "rate": rate,
        })
    })
}
