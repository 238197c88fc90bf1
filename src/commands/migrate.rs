//! Migrate command - schema management for the users, menu and orders tables.

use crate::cli::args::{MigrateAction, MigrateArgs};
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::infra::{Database, MigrationState};

/// Execute the migrate command
pub async fn execute(args: MigrateArgs, config: Config) -> AppResult<()> {
    // Migrations are applied here explicitly, never as a side effect of connecting
    let db = Database::connect_without_migrations(&config)
        .await
        .map_err(|e| AppError::internal(format!("Database connection failed: {}", e)))?;

    let before = db.migration_status().await?;

    match args.action {
        MigrateAction::Up => {
            let pending = pending_names(&before);
            if pending.is_empty() {
                tracing::info!("Schema is up to date, nothing to apply");
                return Ok(());
            }
            tracing::info!(count = pending.len(), "Applying pending migrations");
            db.run_migrations().await?;
            for name in pending {
                tracing::info!(migration = %name, table = created_table(&name), "Applied");
            }
        }
        MigrateAction::Down => {
            let Some(last) = before.iter().rev().find(|m| m.applied) else {
                tracing::info!("No applied migrations to roll back");
                return Ok(());
            };
            tracing::info!(
                migration = %last.name,
                table = created_table(&last.name),
                "Rolling back last migration"
            );
            db.rollback_migration().await?;
        }
        MigrateAction::Status => {}
        MigrateAction::Fresh => {
            let tables: Vec<&str> = before.iter().map(|m| created_table(&m.name)).collect();
            tracing::warn!(tables = ?tables, "Dropping all tables and re-running every migration");
            db.fresh_migrations().await?;
        }
    }

    let after = db.migration_status().await?;
    println!("{}", render_status(&after));

    Ok(())
}

/// Names of migrations not yet applied, in run order
fn pending_names(status: &[MigrationState]) -> Vec<String> {
    status
        .iter()
        .filter(|m| !m.applied)
        .map(|m| m.name.clone())
        .collect()
}

/// Table a `m{date}_{seq}_create_{table}_table` migration creates.
fn created_table(name: &str) -> &str {
    name.split_once("_create_")
        .map(|(_, rest)| rest.trim_end_matches("_table"))
        .unwrap_or(name)
}

/// One line per migration plus a summary line.
fn render_status(status: &[MigrationState]) -> String {
    let mut lines: Vec<String> = status
        .iter()
        .map(|m| {
            format!(
                "[{}] {:<12} {}",
                if m.applied { "x" } else { " " },
                created_table(&m.name),
                m.name
            )
        })
        .collect();

    let applied = status.iter().filter(|m| m.applied).count();
    lines.push(format!("{} of {} migrations applied", applied, status.len()));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(name: &str, applied: bool) -> MigrationState {
        MigrationState {
            name: name.to_string(),
            applied,
        }
    }

    #[test]
    fn test_created_table_from_migration_name() {
        assert_eq!(created_table("m20240101_000001_create_users_table"), "users");
        assert_eq!(
            created_table("m20240101_000002_create_menu_items_table"),
            "menu_items"
        );
        assert_eq!(created_table("m20240301_000001_misc"), "m20240301_000001_misc");
    }

    #[test]
    fn test_render_status_marks_applied_tables() {
        let status = vec![
            state("m20240101_000001_create_users_table", true),
            state("m20240101_000002_create_menu_items_table", true),
            state("m20240101_000003_create_orders_table", false),
        ];

        let rendered = render_status(&status);
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("[x] users"));
        assert!(lines[2].starts_with("[ ] orders"));
        assert_eq!(lines[3], "2 of 3 migrations applied");
    }

    #[test]
    fn test_pending_names_keep_run_order() {
        let status = vec![
            state("m20240101_000001_create_users_table", true),
            state("m20240101_000002_create_menu_items_table", false),
            state("m20240101_000003_create_orders_table", false),
        ];

        assert_eq!(
            pending_names(&status),
            vec![
                "m20240101_000002_create_menu_items_table".to_string(),
                "m20240101_000003_create_orders_table".to_string(),
            ]
        );
    }
}
