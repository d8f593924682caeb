use hiring_backend::{
    config::{get_config, init_config},
    database::pool::create_pool,
    AppState,
};
use std::time::Duration;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    init_config()?;
    let config = get_config();

    let pool = create_pool().await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let app_state = AppState::new(pool);

    {
        let offers = app_state.offer_service.clone();
        let interval = Duration::from_secs(config.offer_sweep_interval_secs);
        tokio::spawn(async move {
            loop {
                match offers.sweep_expired().await {
                    Ok(0) => {}
                    Ok(n) => info!(expired = n, "Offer expiry sweep"),
                    Err(e) => tracing::error!(error = ?e, "Offer expiry sweep failed"),
                }
                tokio::time::sleep(interval).await;
            }
        });
    }

    {
        let interviews = app_state.interview_service.clone();
        let lead = chrono::Duration::minutes(config.reminder_lead_minutes);
        tokio::spawn(async move {
            loop {
                match interviews.send_reminders(lead).await {
                    Ok(0) => {}
                    Ok(n) => info!(sent = n, "Interview reminder sweep"),
                    Err(e) => tracing::error!(error = ?e, "Interview reminder sweep failed"),
                }
                tokio::time::sleep(Duration::from_secs(60)).await;
            }
        });
    }

    info!("Sweep workers started; waiting for shutdown signal");
    tokio::signal::ctrl_c().await?;
    info!("Shutting down");

    Ok(())
}
