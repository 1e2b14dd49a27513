//! Display-side model of a smart fridge's interface.
//!
//! The view only ever consumes published states. The only thing it sends
//! back is a [`DispenseRequest`], which the fridge validates against its own
//! contents.

use super::dispense::DispenseRequest;
use super::inventory::{InventoryEntry, InventoryGroup};
use crate::ui::BoundUiState;

/// What a user sees when looking at a smart fridge.
#[derive(Debug, Clone, Default)]
pub struct SmartFridgeView {
    groups: Vec<InventoryGroup>,
}

impl SmartFridgeView {
    /// Creates an empty view.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies a published state. Returns false for states of other interfaces.
    pub fn update_state(&mut self, state: &BoundUiState) -> bool {
        let BoundUiState::SmartFridge(state) = state else {
            return false;
        };
        self.groups.clone_from(&state.inventory);
        true
    }

    /// The listed groups.
    #[must_use]
    pub fn groups(&self) -> &[InventoryGroup] {
        &self.groups
    }

    /// Looks up the entry at `group`/`entry` in the listing.
    #[must_use]
    pub fn entry(&self, group: usize, entry: usize) -> Option<&InventoryEntry> {
        self.groups.get(group)?.items.get(entry)
    }

    /// Builds a request for `amount` of the listed entry, clamped to what is listed.
    #[must_use]
    pub fn build_dispense(&self, group: usize, entry: usize, amount: u32) -> Option<DispenseRequest> {
        let item = self.entry(group, entry)?;
        let amount = amount.min(item.amount);
        if amount == 0 {
            return None;
        }
        Some(DispenseRequest {
            item: item.clone(),
            amount: i32::try_from(amount).unwrap_or(i32::MAX),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smart_fridge::SmartFridgeState;
    use depot_utils::FixedPoint2;
    use uuid::Uuid;

    fn state() -> BoundUiState {
        BoundUiState::SmartFridge(SmartFridgeState {
            inventory: vec![InventoryGroup {
                name: "drinks".to_string(),
                items: vec![InventoryEntry {
                    group: "drinks".to_string(),
                    visual_reference: Uuid::nil(),
                    item_name: "Cola".to_string(),
                    unit_count: FixedPoint2::new(30),
                    amount: 3,
                }],
            }],
        })
    }

    #[test]
    fn test_view_follows_state() {
        let mut view = SmartFridgeView::new();
        assert!(view.update_state(&state()));
        assert_eq!(view.groups().len(), 1);

        let request = view.build_dispense(0, 0, 10).expect("entry is listed");
        assert_eq!(request.amount, 3);
        assert_eq!(request.item.item_name, "Cola");

        assert!(view.build_dispense(0, 0, 0).is_none());
        assert!(view.build_dispense(1, 0, 1).is_none());
    }
}
