//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `notevault_core` linkage, configuration and storage bootstrap.
//! - Keep output deterministic (`key=value` lines) for quick local checks.

use notevault_core::db::migrations::current_version;
use notevault_core::db::{open_db, open_db_in_memory};
use notevault_core::{
    init_logging, ActorId, BroadcastRegistry, CoreConfig, NoteInput, NoteService, NoteStore,
    SqliteNoteStore, Visibility,
};
use rusqlite::Connection;
use std::error::Error;
use std::process::ExitCode;
use std::sync::Arc;

fn main() -> ExitCode {
    let outcome = CoreConfig::from_env()
        .map_err(Box::<dyn Error>::from)
        .and_then(|config| run(&config));
    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("notevault status=error error={err}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &CoreConfig) -> Result<(), Box<dyn Error>> {
    println!("notevault_core ping={}", notevault_core::ping());
    println!("notevault_core version={}", notevault_core::core_version());

    if let Some(log_dir) = config.log_dir.as_deref() {
        init_logging(&config.log_level, log_dir)?;
        println!("notevault logging=file level={}", config.log_level);
    }

    if let Some(path) = config.db_path.as_deref() {
        let conn = open_db(path)?;
        println!("notevault db=file schema_version={}", current_version(&conn)?);
    }

    // The create/delete round trip never touches a configured database.
    let scratch = open_db_in_memory()?;
    println!("notevault db=memory schema_version={}", current_version(&scratch)?);
    smoke_round_trip(&scratch, config.channel_capacity)
}

fn smoke_round_trip(conn: &Connection, channel_capacity: usize) -> Result<(), Box<dyn Error>> {
    let registry = Arc::new(BroadcastRegistry::new(channel_capacity));
    let service = NoteService::new(SqliteNoteStore::new(conn), Arc::clone(&registry));
    let actor = ActorId::new("notevault-cli-smoke")?;
    let mut feed = registry.connect(&actor);

    let note = service.create_note(
        &actor,
        &NoteInput::new("smoke").with_visibility(Visibility::Public),
    )?;
    let received = feed.drain().len();
    service.delete_note(&actor, note.id)?;
    registry.disconnect(feed);

    let leftover = service.store().list_by_owner(&actor)?.len();
    println!("notevault smoke_events={received} smoke_leftover={leftover}");
    log::info!("event=cli_smoke module=cli status=ok events={received}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::run;
    use notevault_core::db::open_db;
    use notevault_core::CoreConfig;
    use std::time::{SystemTime, UNIX_EPOCH};

    #[test]
    fn configured_database_is_never_written() {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time should be after unix epoch")
            .as_nanos();
        let path = std::env::temp_dir().join(format!(
            "notevault-cli-{}-{nanos}.db",
            std::process::id()
        ));
        let config = CoreConfig {
            db_path: Some(path.clone()),
            ..CoreConfig::default()
        };

        run(&config).expect("smoke run should succeed");

        let conn = open_db(&path).expect("configured database should open");
        let inserted: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_sequence WHERE name = 'notes';",
                [],
                |row| row.get(0),
            )
            .expect("sequence table should be readable");
        assert_eq!(inserted, 0);

        drop(conn);
        let _ = std::fs::remove_file(&path);
    }
}
