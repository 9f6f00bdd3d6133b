//! Deterministic point ids.

use uuid::Uuid;

/// Deterministic UUIDv5 from an arbitrary string id.
pub fn stable_uuid(id: &str) -> Uuid {
    Uuid::new_v5(&Uuid::NAMESPACE_URL, id.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_input_same_uuid() {
        assert_eq!(stable_uuid("ds1:rows:0-49"), stable_uuid("ds1:rows:0-49"));
        assert_ne!(stable_uuid("ds1:rows:0-49"), stable_uuid("ds1:rows:50-99"));
    }
}
