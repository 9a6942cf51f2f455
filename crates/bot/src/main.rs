#[tokio::main]
async fn main() -> anyhow::Result<()> {
    adwise_bot::start().await
}
