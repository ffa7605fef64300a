//! Walk a SQLite connection through its lifecycle
//!
//! Run with: RUST_LOG=db_adapter=debug cargo run --example sqlite_lifecycle [connection-string]

use db_adapter::client::ConnectionInfo;
use db_adapter::connection::Connection;
use db_adapter::driver::sqlite::SqliteDriver;
use db_adapter::profiler::MemoryProfiler;
use tracing_subscriber::EnvFilter;

fn main() -> db_adapter::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "sqlite::memory:".to_string());
    let config = ConnectionInfo::parse(&url)?.to_config()?;

    let mut conn = Connection::new(SqliteDriver::new(), config);
    let profiler = MemoryProfiler::new();
    conn.set_profiler(profiler.clone());

    conn.connect()?;
    println!("connected, schema = {}", conn.current_schema()?);

    conn.execute("CREATE TABLE IF NOT EXISTS notes (id INTEGER PRIMARY KEY AUTOINCREMENT, body TEXT)")?;

    conn.begin_transaction()?;
    conn.execute("INSERT INTO notes (body) VALUES ('kept')")?;
    conn.commit()?;
    println!("committed, last id = {:?}", conn.last_generated_value(None)?);

    conn.begin_transaction()?;
    conn.execute("INSERT INTO notes (body) VALUES ('discarded')")?;
    conn.rollback()?;

    let notes = conn.execute("SELECT id, body FROM notes ORDER BY id")?;
    println!("{}", serde_json::to_string_pretty(&notes).unwrap_or_default());

    conn.disconnect()?;

    for entry in profiler.entries() {
        println!("{:>8.3?}  {}", entry.elapsed, entry.sql);
    }
    Ok(())
}
