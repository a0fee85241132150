//! Opaque ID newtypes for library entities.
//!
//! Each ID is a thin `u32` wrapper ordered by registration order, so maps keyed
//! by library IDs iterate deterministically.

use strata_common::define_id;

define_id!(
    /// Opaque, copyable ID for a library cell (a cell-type template).
    LibraryCellId
);

define_id!(
    /// Opaque, copyable ID for a pin of a library cell.
    LibraryPinId
);

define_id!(
    /// Opaque, copyable ID for a timing arc of a library cell.
    LibraryArcId
);

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn id_roundtrip() {
        let id = LibraryCellId::from_raw(42);
        assert_eq!(id.as_raw(), 42);
    }

    #[test]
    fn ids_order_by_index() {
        let set: BTreeSet<_> = [LibraryPinId::from_raw(3), LibraryPinId::from_raw(1)]
            .into_iter()
            .collect();
        let order: Vec<u32> = set.into_iter().map(LibraryPinId::as_raw).collect();
        assert_eq!(order, vec![1, 3]);
    }

    #[test]
    fn id_serde_roundtrip() {
        let id = LibraryArcId::from_raw(9);
        let json = serde_json::to_string(&id).unwrap();
        let restored: LibraryArcId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, restored);
    }
}
