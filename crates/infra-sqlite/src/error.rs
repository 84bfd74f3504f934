// sqlx::Error -> AppError mapping

use recall_core::error::AppError;

// SQLite error codes: https://www.sqlite.org/rescode.html
const SQLITE_CONSTRAINT_UNIQUE: &str = "2067";
const SQLITE_CONSTRAINT_PRIMARYKEY: &str = "1555";

/// Convert sqlx::Error to AppError with structured information
///
/// Unique violations become `AppError::Conflict` so callers can re-fetch.
pub(crate) fn map_sqlx_error(err: sqlx::Error) -> AppError {
    match &err {
        sqlx::Error::Database(db_err) => {
            if let Some(code) = db_err.code() {
                let code_str = code.as_ref();

                match code_str {
                    SQLITE_CONSTRAINT_UNIQUE | SQLITE_CONSTRAINT_PRIMARYKEY => {
                        AppError::Conflict(format!(
                            "Unique constraint violation: {} ({})",
                            db_err.message(),
                            code_str
                        ))
                    }
                    "787" | "3850" => {
                        // FOREIGN KEY constraint failed
                        AppError::Database(format!(
                            "Foreign key constraint violation: {} ({})",
                            db_err.message(),
                            code_str
                        ))
                    }
                    "5" => {
                        // SQLITE_BUSY - database is locked
                        AppError::Database(format!(
                            "Database locked (SQLITE_BUSY): {}",
                            db_err.message()
                        ))
                    }
                    "13" => {
                        // SQLITE_FULL - database or disk is full
                        AppError::Database(format!("Database full: {}", db_err.message()))
                    }
                    _ => AppError::Database(format!(
                        "Database error [{}]: {}",
                        code_str,
                        db_err.message()
                    )),
                }
            } else {
                AppError::Database(format!("Database error: {}", db_err.message()))
            }
        }
        sqlx::Error::RowNotFound => AppError::Database("Row not found".to_string()),
        sqlx::Error::ColumnNotFound(col) => {
            AppError::Database(format!("Column not found: {}", col))
        }
        // Connection, pool, protocol errors
        _ => AppError::Database(err.to_string()),
    }
}
