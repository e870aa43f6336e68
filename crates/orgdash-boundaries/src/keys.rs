//! Deterministic cache key construction.
//!
//! One top-level cache entry per org; inside its snapshot, one inner
//! key for the level-1 collection and one per parent state for the
//! level-2 collections.

use uuid::Uuid;

/// Cache key of an org's boundary snapshot.
pub fn org_boundaries(org_id: Uuid) -> String {
    format!("org:{org_id}:boundaries")
}

/// Inner key of the level-1 (states) collection.
pub fn top_level(org_id: Uuid) -> String {
    format!("geojson:{org_id}")
}

/// Inner key of the level-2 (districts) collection under one state.
pub fn second_level(org_id: Uuid, parent_id: &str) -> String {
    format!("geojson:{org_id}:{parent_id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_shapes() {
        let org = Uuid::nil();
        assert_eq!(
            org_boundaries(org),
            "org:00000000-0000-0000-0000-000000000000:boundaries"
        );
        assert_eq!(
            top_level(org),
            "geojson:00000000-0000-0000-0000-000000000000"
        );
        assert_eq!(
            second_level(org, "S1"),
            "geojson:00000000-0000-0000-0000-000000000000:S1"
        );
    }
}
