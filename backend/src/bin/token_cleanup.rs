use staffhub_backend::{
    config::Config, db::connection::create_pool, handlers::auth_repo, utils::time,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = Config::load()?;
    let pool = create_pool(&config.database_url).await?;

    let now = time::now_utc(&config.time_zone);
    let deleted = auth_repo::delete_dead_refresh_tokens(&pool, now)
        .await
        .expect("cleanup refresh tokens");
    if deleted > 0 {
        tracing::info!("Deleted {} expired or revoked refresh tokens", deleted);
    }

    sqlx::query("VACUUM (ANALYZE) refresh_tokens")
        .execute(&pool)
        .await
        .expect("vacuum refresh_tokens table");

    Ok(())
}
