use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    geovote::eval::main().await
}
