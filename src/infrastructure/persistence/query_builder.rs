/// SQL for the image metadata table
pub struct QueryBuilder;

impl QueryBuilder {
    /// Unconditional single-row insert
    pub const INSERT: &'static str = r#"
        INSERT INTO "ImageMetadata" ("FileName", "FileSizeKB", "Width", "Height", "Format")
        VALUES ($1, $2::numeric, $3, $4, $5)
    "#;

    /// Insert unless an identical row is already present
    pub const INSERT_IF_ABSENT: &'static str = r#"
        INSERT INTO "ImageMetadata" ("FileName", "FileSizeKB", "Width", "Height", "Format")
        SELECT $1, $2::numeric, $3, $4, $5
        WHERE NOT EXISTS (
            SELECT 1 FROM "ImageMetadata"
            WHERE "FileName" = $1
              AND "FileSizeKB" = $2::numeric
              AND "Width" = $3
              AND "Height" = $4
              AND "Format" IS NOT DISTINCT FROM $5
        )
    "#;

    /// Base SELECT clause, columns aliased to the record's field names
    pub const METADATA_SELECT: &'static str = r#"
        SELECT "FileName" AS file_name,
               "FileSizeKB"::float8 AS size_kb,
               "Width" AS width,
               "Height" AS height,
               "Format" AS format
        FROM "ImageMetadata"
    "#;

    /// Bound the current transaction's statements on the server side
    pub const SET_STATEMENT_TIMEOUT: &'static str =
        "SELECT set_config('statement_timeout', $1, true)";

    pub fn select_by_file_name() -> String {
        format!(
            "{} WHERE \"FileName\" = $1",
            Self::METADATA_SELECT
        )
    }
}
