use testflow_core::{StatePersistence, WizardState};

use super::{CliResult, Context};

pub fn run(ctx: &Context) -> CliResult {
    let store = ctx.store()?;
    let Some(blob) = store.load_state()? else {
        println!("no saved progress");
        return Ok(());
    };
    match WizardState::from_json(&blob) {
        Ok(state) => println!("{}", serde_json::to_string_pretty(&state)?),
        Err(e) => {
            tracing::warn!(error = %e, "saved progress is corrupt");
            println!("saved progress is corrupt and will be discarded on the next run");
        }
    }
    Ok(())
}
