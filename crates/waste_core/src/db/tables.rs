//! redb table definitions shared by storage modules.

use redb::TableDefinition;

/// Paste rows keyed by id (`Paste`, JSON-encoded without the id).
pub const PASTES: TableDefinition<&str, &[u8]> = TableDefinition::new("pastes");
