use anyhow::Result;
use s3pub::cli::{actions, start};

#[tokio::main]
async fn main() -> Result<()> {
    let (s3, action, config) = start()?;

    actions::handle(s3, config, action).await
}
