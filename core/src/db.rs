use crate::config::DatabaseConfig;
use crate::models::{CRC32_TABLE, SNOWFLAKE_TABLE, UUID_TABLE};
use anyhow::{Context, Result, bail};
use log::{debug, info};
use mysql_async::prelude::Queryable;
use mysql_async::{OptsBuilder, PoolConstraints, PoolOpts};
use std::time::Duration;

pub use mysql_async::Pool;

/// pool sizing the benchmarks were tuned against
pub const POOL_MAX_OPEN: usize = 100;
pub const POOL_MAX_IDLE: usize = 10;
/// connections are recycled after an hour
pub const POOL_CONN_LIFETIME: Duration = Duration::from_secs(60 * 60);

/// opens a connection pool for the configured database and checks that it is
/// actually reachable before handing it out
pub async fn connect(config: &DatabaseConfig) -> Result<Pool> {
    if config.kind != "mysql" {
        bail!(
            "unsupported database type {:?}, only \"mysql\" is wired up",
            config.kind
        );
    }

    let constraints = PoolConstraints::new(POOL_MAX_IDLE, POOL_MAX_OPEN)
        .context("invalid pool constraints")?;
    let pool_opts = PoolOpts::default()
        .with_constraints(constraints)
        .with_abs_conn_ttl(Some(POOL_CONN_LIFETIME));
    let opts = OptsBuilder::default()
        .ip_or_hostname(config.host.as_str())
        .tcp_port(config.port)
        .user(Some(config.user.as_str()))
        .pass(Some(config.password.as_str()))
        .db_name(Some(config.database.as_str()))
        .pool_opts(pool_opts);

    let pool = Pool::new(opts);
    let mut conn = pool
        .get_conn()
        .await
        .with_context(|| format!("connecting to mysql at {}:{}", config.host, config.port))?;
    conn.ping().await?;
    debug!(
        "connected to {}:{}/{}",
        config.host, config.port, config.database
    );
    Ok(pool)
}

/// creates the three benchmark tables if they do not exist
pub async fn create_tables(pool: &Pool) -> Result<()> {
    let mut conn = pool.get_conn().await?;
    for ddl in table_ddl() {
        conn.query_drop(ddl).await?;
    }
    info!("benchmark tables ready");
    Ok(())
}

/// truncates the benchmark tables for a clean slate between runs
pub async fn truncate_tables(pool: &Pool) -> Result<()> {
    let mut conn = pool.get_conn().await?;
    for table in [UUID_TABLE, CRC32_TABLE, SNOWFLAKE_TABLE] {
        conn.query_drop(format!("TRUNCATE TABLE {table}")).await?;
        debug!("truncated {table}");
    }
    Ok(())
}

fn table_ddl() -> [String; 3] {
    [
        format!(
            "CREATE TABLE IF NOT EXISTS {UUID_TABLE} (
                uuid VARCHAR(36) NOT NULL,
                name VARCHAR(50) NOT NULL,
                email VARCHAR(50) NOT NULL,
                nickname VARCHAR(50) NOT NULL,
                PRIMARY KEY (uuid)
            ) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4"
        ),
        format!(
            "CREATE TABLE IF NOT EXISTS {CRC32_TABLE} (
                uuid_crc32 INT UNSIGNED NOT NULL,
                uuid VARCHAR(36) NOT NULL,
                name VARCHAR(50) NOT NULL,
                email VARCHAR(50) NOT NULL,
                nickname VARCHAR(50) NOT NULL,
                PRIMARY KEY (uuid_crc32, uuid)
            ) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4"
        ),
        format!(
            "CREATE TABLE IF NOT EXISTS {SNOWFLAKE_TABLE} (
                id BIGINT UNSIGNED NOT NULL,
                name VARCHAR(50) NOT NULL,
                email VARCHAR(50) NOT NULL,
                nickname VARCHAR(50) NOT NULL,
                PRIMARY KEY (id)
            ) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4"
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[tokio::test]
    async fn connect_rejects_non_mysql_types() {
        let mut config = Config::default().database;
        config.kind = "postgres".to_string();
        let err = connect(&config).await.unwrap_err();
        assert!(err.to_string().contains("unsupported database type"));
    }

    #[test]
    fn every_table_has_its_pk_in_the_ddl() {
        let ddl = table_ddl();
        assert!(ddl[0].contains("PRIMARY KEY (uuid)"));
        assert!(ddl[1].contains("PRIMARY KEY (uuid_crc32, uuid)"));
        assert!(ddl[2].contains("PRIMARY KEY (id)"));
    }
}
