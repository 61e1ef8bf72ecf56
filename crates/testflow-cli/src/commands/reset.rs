use testflow_core::{WizardController, WizardError};

use super::{CliResult, Context};
use crate::prompt::Terminal;

pub fn run(ctx: &Context, yes: bool) -> CliResult {
    if !yes {
        let mut term = Terminal::stdio();
        if !term.confirm("Finish testing? All unsaved results will be lost.", false)? {
            println!("cancelled");
            return Ok(());
        }
    }
    let mut wizard = WizardController::new(ctx.service()?, ctx.store()?);
    wizard.reset();
    if wizard.error().is_some() {
        return Err(WizardError::Persistence.into());
    }
    println!("progress cleared");
    Ok(())
}
