use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    handnote::run().await
}
