use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = serial_demo::DemoConfig::from_env()?;

    println!("[serial-demo] pushing {} tasks to queue {}", config.tasks, config.queue);

    for line in serial_demo::run(&config).await? {
        println!("{line}");
    }

    Ok(())
}
