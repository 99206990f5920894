#[tokio::main]
async fn main() -> anyhow::Result<()> {
    studyquiz_backend::run().await
}
