use testflow_core::Step;

use super::{CliResult, Context};

pub async fn run(ctx: &Context, json: bool) -> CliResult {
    let mut wizard = ctx.wizard()?;
    wizard.initialize().await?;
    if wizard.current_step() != Step::Results {
        println!(
            "results are available once every test is submitted (step {} of {})",
            wizard.active_step(),
            wizard.tests().len() + 1
        );
        return Ok(());
    }

    wizard.load_results().await?;
    let outcomes = wizard.results().unwrap_or_default();
    if json {
        println!("{}", serde_json::to_string_pretty(outcomes)?);
    } else {
        println!("Results for {}", wizard.user_data().display_name());
        for outcome in outcomes {
            println!("{:>5.0}%  {}", outcome.percentage.floor(), outcome.title);
        }
    }
    Ok(())
}
