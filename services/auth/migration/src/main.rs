use sea_orm_migration::prelude::*;

use datn_auth_migration::Migrator;

/// Migration CLI (`up`, `down`, `status`, `fresh`, ...). Reads `DATABASE_URL`.
#[tokio::main]
async fn main() {
    cli::run_cli(Migrator).await;
}
