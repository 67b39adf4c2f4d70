use crate::config::DatabaseConfig;
use crate::database::models::{BucketCounts, NewSignalRecord, SignalRecord};
use crate::database::schema;
use crate::database::store::{SearchPage, SignalStore};
use crate::error::ServiceResult;
use crate::query::{SearchQuery, SignalFilter, SummaryQuery, TimeRange};
use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool, Postgres, QueryBuilder, Row};
use tracing::{debug, info};

const SIGNAL_COLUMNS: &str = "id, symbol, model_name, asset_type, signal, price, confidence, ts";

pub struct PostgresManager {
    pool: PgPool,
}

impl PostgresManager {
    pub async fn new(config: &DatabaseConfig) -> ServiceResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.connection_string())
            .await?;

        info!(
            "Connected to PostgreSQL at {}:{}/{} (max {} connections)",
            config.host, config.port, config.name, config.max_connections
        );

        Ok(Self { pool })
    }

    // Create tables and indices if they don't exist
    pub async fn init_tables(&self) -> ServiceResult<()> {
        for statement in schema::ALL_STATEMENTS {
            sqlx::query(statement).execute(&self.pool).await?;
        }

        info!("Database tables initialized successfully");
        Ok(())
    }
}

/// Append the WHERE clause shared by search and summary: the time window plus
/// whichever of symbol/model the filter carries.
pub fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &SignalFilter, range: &TimeRange) {
    qb.push(" WHERE ts >= ");
    qb.push_bind(range.from);
    qb.push(" AND ts <= ");
    qb.push_bind(range.to);

    match filter {
        SignalFilter::SymbolAndModel { symbol, model_name } => {
            qb.push(" AND lower(symbol) = ");
            qb.push_bind(symbol.clone());
            qb.push(" AND lower(model_name) = ");
            qb.push_bind(model_name.clone());
        }
        SignalFilter::Symbol(symbol) => {
            qb.push(" AND lower(symbol) = ");
            qb.push_bind(symbol.clone());
        }
        SignalFilter::Model(model_name) => {
            qb.push(" AND lower(model_name) = ");
            qb.push_bind(model_name.clone());
        }
        SignalFilter::All => {}
    }
}

/// Per-bucket BUY/SELL/HOLD counts. Buckets are labelled in UTC with the
/// `to_char` pattern of the requested grouping; groups only exist for rows that
/// matched, so empty buckets never appear.
pub fn summary_query(query: &SummaryQuery) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::<Postgres>::new("SELECT to_char(ts AT TIME ZONE 'UTC', ");
    qb.push_bind(query.group_by.pg_format());
    qb.push(
        ") AS bucket, \
         COUNT(*) FILTER (WHERE signal = 'BUY') AS buy, \
         COUNT(*) FILTER (WHERE signal = 'SELL') AS sell, \
         COUNT(*) FILTER (WHERE signal = 'HOLD') AS hold \
         FROM signals",
    );
    push_filters(&mut qb, &query.filter, &query.range);
    qb.push(" GROUP BY bucket ORDER BY bucket ASC");
    qb
}

#[async_trait]
impl SignalStore for PostgresManager {
    async fn search(&self, query: &SearchQuery) -> ServiceResult<SearchPage> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM signals");
        push_filters(&mut count, &query.filter, &query.range);
        let total: i64 = count.build().fetch_one(&self.pool).await?.get(0);

        let mut select = QueryBuilder::<Postgres>::new(format!("SELECT {} FROM signals", SIGNAL_COLUMNS));
        push_filters(&mut select, &query.filter, &query.range);
        select.push(" ORDER BY ts DESC, id DESC LIMIT ");
        select.push_bind(i64::from(query.pagination.size));
        select.push(" OFFSET ");
        select.push_bind(i64::try_from(query.pagination.offset()).unwrap_or(i64::MAX));

        let records = select
            .build_query_as::<SignalRecord>()
            .fetch_all(&self.pool)
            .await?;

        debug!("Search matched {} records, returning {}", total, records.len());

        Ok(SearchPage {
            records,
            total: total.max(0) as u64,
        })
    }

    async fn distinct_symbols(&self) -> ServiceResult<Vec<String>> {
        let rows = sqlx::query("SELECT DISTINCT symbol FROM signals")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(|row| row.get(0)).collect())
    }

    async fn distinct_models(&self) -> ServiceResult<Vec<String>> {
        let rows = sqlx::query("SELECT DISTINCT model_name FROM signals")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(|row| row.get(0)).collect())
    }

    async fn summary(&self, query: &SummaryQuery) -> ServiceResult<Vec<BucketCounts>> {
        let mut qb = summary_query(query);
        let rows = qb.build().fetch_all(&self.pool).await?;

        let buckets = rows
            .into_iter()
            .map(|row| {
                Ok(BucketCounts {
                    bucket: row.try_get("bucket")?,
                    buy: row.try_get("buy")?,
                    sell: row.try_get("sell")?,
                    hold: row.try_get("hold")?,
                })
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()?;

        Ok(buckets)
    }

    async fn insert_batch(&self, records: &[NewSignalRecord]) -> ServiceResult<Vec<SignalRecord>> {
        if records.is_empty() {
            return Ok(Vec::new());
        }
        for record in records {
            record.validate()?;
        }

        let stored: Vec<SignalRecord> = records.iter().cloned().map(NewSignalRecord::into_record).collect();

        // Use a transaction so a failing row leaves nothing behind
        let mut tx = self.pool.begin().await?;

        for record in &stored {
            sqlx::query(
                "INSERT INTO signals
                (id, symbol, model_name, asset_type, signal, price, confidence, ts)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
            )
            .bind(record.id)
            .bind(&record.symbol)
            .bind(&record.model_name)
            .bind(record.asset_type.as_str())
            .bind(record.signal.as_str())
            .bind(record.price)
            .bind(record.confidence)
            .bind(record.ts)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!("Inserted {} signal records", stored.len());
        Ok(stored)
    }
}
