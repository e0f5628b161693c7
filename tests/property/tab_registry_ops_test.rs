//! Property-based tests for tab registry operations.
//!
//! These verify the active-index invariant: for any sequence of create,
//! close, activate, and reorder operations, the registry is either empty
//! with the "no tab" sentinel active index, or the active index is a valid
//! position in the sequence.

use osrbrowser::managers::tab_registry::TabRegistry;
use osrbrowser::types::tab::SurfaceId;
use proptest::prelude::*;

/// Operations that can be performed on the registry.
#[derive(Debug, Clone)]
enum RegistryOp {
    Create,
    Close(usize),
    Activate(usize),
    Reorder(usize, usize),
}

/// Strategy for generating a sequence of registry operations, biased toward
/// creates so the interesting multi-tab states are reached.
fn arb_registry_ops() -> impl Strategy<Value = Vec<RegistryOp>> {
    prop::collection::vec(
        prop_oneof![
            3 => Just(RegistryOp::Create),
            2 => (0..20usize).prop_map(RegistryOp::Close),
            2 => (0..20usize).prop_map(RegistryOp::Activate),
            1 => (0..20usize, 0..20usize).prop_map(|(a, b)| RegistryOp::Reorder(a, b)),
        ],
        1..80,
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    // After every operation: the registry is empty and the active index is
    // the sentinel, or the active index addresses an existing tab.
    #[test]
    fn active_index_always_valid(ops in arb_registry_ops()) {
        let registry = TabRegistry::new();
        let mut surface = 0u32;

        for op in &ops {
            match op {
                RegistryOp::Create => {
                    surface += 1;
                    registry.create_tab("about:blank", SurfaceId(surface));
                }
                RegistryOp::Close(index) => {
                    let len = registry.len();
                    let result = registry.close_tab(*index);
                    // Valid indices close; invalid ones fail cleanly.
                    prop_assert_eq!(result.is_ok(), *index < len);
                }
                RegistryOp::Activate(index) => {
                    let len = registry.len();
                    let result = registry.set_active(*index);
                    prop_assert_eq!(result.is_ok(), *index < len);
                }
                RegistryOp::Reorder(from, to) => {
                    let len = registry.len();
                    let result = registry.reorder_tab(*from, *to);
                    prop_assert_eq!(result.is_ok(), *from < len && *to < len);
                }
            }

            // The invariant itself.
            match registry.active_index() {
                None => prop_assert!(registry.is_empty(), "sentinel only when empty"),
                Some(active) => prop_assert!(
                    active < registry.len(),
                    "active {} out of range for {} tabs",
                    active,
                    registry.len()
                ),
            }

            // The active index and the reported summaries agree.
            let (summaries, active) = registry.summaries();
            prop_assert_eq!(summaries.len(), registry.len());
            prop_assert_eq!(active, registry.active_index());
            prop_assert_eq!(
                summaries.iter().filter(|t| t.active).count(),
                usize::from(active.is_some()),
                "exactly one active summary while tabs exist"
            );
        }
    }

    // Tab ids are never reused across a create/close sequence, so late
    // engine callbacks can never be misdelivered to a newer tab.
    #[test]
    fn tab_ids_are_never_reused(creates in 1..30usize) {
        let registry = TabRegistry::new();
        let mut seen = std::collections::HashSet::new();

        for i in 0..creates {
            let (id, _) = registry.create_tab("about:blank", SurfaceId(i as u32));
            prop_assert!(seen.insert(id), "id {} reused", id);
            // Close every other tab to interleave removals with creates.
            if i % 2 == 0 {
                let _ = registry.close_tab(0);
            }
        }
    }
}
