use std::path::PathBuf;

use testflow_core::TestId;

use super::{CliResult, Context};

pub async fn run(ctx: &Context, test_id: TestId, out: Option<PathBuf>) -> CliResult {
    let mut wizard = ctx.wizard()?;
    wizard.initialize().await?;
    let bytes = wizard.download_pdf(test_id).await?;
    let path = out.unwrap_or_else(|| {
        PathBuf::from(format!(
            "test_result_{}_{test_id}.pdf",
            wizard.user_data().user_id
        ))
    });
    std::fs::write(&path, &bytes)?;
    println!("saved {} ({} bytes)", path.display(), bytes.len());
    Ok(())
}
