/// Returns the cache key for a single record.
///
/// The entity name keeps identifiers from different collections apart even
/// though object ids are globally unique in practice.
pub fn record_key(entity: &str, id: &str) -> String {
    format!("{entity}:{id}")
}
