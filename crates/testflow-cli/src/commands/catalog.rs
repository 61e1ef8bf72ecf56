use testflow_core::TestService;

use super::{CliResult, Context};

pub async fn run(ctx: &Context, json: bool) -> CliResult {
    let tests = ctx.service()?.list_tests().await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&tests)?);
        return Ok(());
    }
    if tests.is_empty() {
        println!("no tests available");
    }
    for test in &tests {
        println!("{:>4}  {}  ({} questions)", test.id, test.title, test.questions.len());
    }
    Ok(())
}
