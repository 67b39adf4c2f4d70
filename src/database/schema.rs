// src/database/schema.rs
// SQL used by `PostgresManager::init_tables`. Kept as plain statements so the
// same text can be fed to psql when provisioning by hand.

pub const CREATE_SIGNALS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS signals (
    id UUID PRIMARY KEY,
    symbol VARCHAR NOT NULL,
    model_name VARCHAR NOT NULL,
    asset_type VARCHAR NOT NULL,
    signal VARCHAR NOT NULL CHECK (signal IN ('BUY', 'SELL', 'HOLD')),
    price NUMERIC,
    confidence DOUBLE PRECISION CHECK (confidence IS NULL OR (confidence >= 0 AND confidence <= 1)),
    ts TIMESTAMPTZ NOT NULL
);
"#;

pub const CREATE_SYMBOL_MODEL_TS_INDEX: &str = r#"
CREATE INDEX IF NOT EXISTS sym_model_ts_idx ON signals(symbol, model_name, ts DESC);
"#;

// Filters compare lower-cased values, so they need their own index to stay cheap
pub const CREATE_NORMALIZED_INDEX: &str = r#"
CREATE INDEX IF NOT EXISTS sym_model_ts_lower_idx ON signals(lower(symbol), lower(model_name), ts DESC);
"#;

pub const CREATE_TS_INDEX: &str = r#"
CREATE INDEX IF NOT EXISTS signals_ts_idx ON signals(ts DESC);
"#;

pub const ALL_STATEMENTS: [&str; 4] = [
    CREATE_SIGNALS_TABLE,
    CREATE_SYMBOL_MODEL_TS_INDEX,
    CREATE_NORMALIZED_INDEX,
    CREATE_TS_INDEX,
];
