use redb::TableDefinition;

/// Version history: page -> msgpack Vec<VersionEntry>, oldest first
pub const HISTORY: TableDefinition<&str, &[u8]> = TableDefinition::new("history");

/// Curated lists: id -> Curated (msgpack)
pub const CURATED: TableDefinition<&str, &[u8]> = TableDefinition::new("curated");
