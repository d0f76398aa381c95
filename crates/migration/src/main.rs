use config::Config;
use sea_orm_migration::prelude::*;
use std::env;

#[tokio::main]
async fn main() {
    // DATABASE_URL from the environment wins over config.yaml
    if env::var("DATABASE_URL").is_err() {
        let settings = Config::builder()
            .add_source(config::File::with_name("config.yaml").required(false))
            .build();
        if let Ok(url) = settings.and_then(|s| s.get_string("database_url")) {
            // SAFETY: nothing else reads the environment before the CLI starts.
            unsafe { env::set_var("DATABASE_URL", url) };
        }
    }
    cli::run_cli(migration::Migrator).await;
}
