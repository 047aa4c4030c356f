use anyhow::Result;
use sqlx::PgPool;

pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    // Create dockets table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS dockets (
            docket_id TEXT PRIMARY KEY,
            docket_title TEXT,
            modify_date TIMESTAMPTZ,
            docket_type TEXT,
            agency_id TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Create agencies table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS agencies (
            agency_id TEXT PRIMARY KEY,
            agency_name TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Create documents table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS documents (
            document_id TEXT PRIMARY KEY,
            docket_id TEXT NOT NULL,
            is_open_for_comment BOOLEAN,
            posted_date TIMESTAMPTZ,
            comment_start_date TIMESTAMPTZ,
            comment_end_date TIMESTAMPTZ,
            effective_date TIMESTAMPTZ
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Create abstracts table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS abstracts (
            docket_id TEXT PRIMARY KEY,
            abstract TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Create htm_summaries table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS htm_summaries (
            docket_id TEXT NOT NULL,
            summary_id BIGINT NOT NULL,
            summary TEXT,
            PRIMARY KEY (docket_id, summary_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Create stored_results table; one row per fingerprint and rank
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS stored_results (
            search_term TEXT NOT NULL,
            session_id TEXT NOT NULL,
            sort_desc BOOLEAN NOT NULL,
            sort_type TEXT NOT NULL,
            filter_agencies TEXT NOT NULL,
            filter_date_start TEXT NOT NULL,
            filter_date_end TEXT NOT NULL,
            filter_docket_type TEXT NOT NULL,
            search_rank INTEGER NOT NULL,
            docket_id TEXT NOT NULL,
            total_comments BIGINT NOT NULL,
            matching_comments BIGINT NOT NULL,
            relevance_score DOUBLE PRECISION NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Create indexes
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_documents_docket_id ON documents(docket_id)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_dockets_agency_id ON dockets(agency_id)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_htm_summaries_docket_id ON htm_summaries(docket_id)")
        .execute(pool)
        .await?;
    // Unique so replace-on-refresh can never leave two rows at the same rank
    sqlx::query(
        r#"
        CREATE UNIQUE INDEX IF NOT EXISTS idx_stored_results_fingerprint ON stored_results(
            search_term, session_id, sort_desc, sort_type,
            filter_agencies, filter_date_start, filter_date_end, filter_docket_type,
            search_rank
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
