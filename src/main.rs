#[tokio::main]
async fn main() -> anyhow::Result<()> {
    product_dashboard_lib::run().await
}
