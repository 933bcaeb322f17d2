use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::holding::Holding;

/// One (id, new sort key) pair from a reorder, persisted as a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortOrderUpdate {
    pub id: Uuid,
    pub sort_order: u32,
}

/// Maintains the user-defined display order over holdings.
///
/// The order is an explicit per-holding integer, separate from insertion
/// order. Holdings that were never reordered have no key and sort last.
pub struct OrderService;

impl OrderService {
    pub fn new() -> Self {
        Self
    }

    /// Display order: ascending effective sort key, ties kept in list
    /// (insertion) order. Stable by construction.
    #[must_use]
    pub fn sorted<'a>(
        &self,
        holdings: impl IntoIterator<Item = &'a Holding>,
    ) -> Vec<&'a Holding> {
        let mut out: Vec<&Holding> = holdings.into_iter().collect();
        out.sort_by_key(|h| h.effective_sort_key());
        out
    }

    /// Compute the new sort keys after dragging `dragged` onto `target`
    /// within the *visible, already-filtered* subset (one broker tab, say).
    ///
    /// The dragged holding is removed and spliced back in at the target's
    /// pre-removal index — dragging down lands after the target, dragging
    /// up lands before it. Every holding in the subset is then renumbered
    /// contiguously from 0, and the full batch is returned for persistence.
    ///
    /// Dragging a holding onto itself is a no-op (empty batch). An id not
    /// present in the subset — including drags that crossed tab boundaries —
    /// is rejected.
    pub fn reorder(
        &self,
        visible: &[Holding],
        dragged: Uuid,
        target: Uuid,
    ) -> Result<Vec<SortOrderUpdate>, CoreError> {
        let dragged_idx = visible
            .iter()
            .position(|h| h.id == dragged)
            .ok_or_else(|| CoreError::NotFound(format!("holding {dragged} not in visible list")))?;
        let target_idx = visible
            .iter()
            .position(|h| h.id == target)
            .ok_or_else(|| CoreError::NotFound(format!("holding {target} not in visible list")))?;

        if dragged_idx == target_idx {
            return Ok(Vec::new());
        }

        let mut ids: Vec<Uuid> = visible.iter().map(|h| h.id).collect();
        let moved = ids.remove(dragged_idx);
        let insert_at = target_idx.min(ids.len());
        ids.insert(insert_at, moved);

        Ok(ids
            .into_iter()
            .enumerate()
            .map(|(i, id)| SortOrderUpdate {
                id,
                sort_order: i as u32,
            })
            .collect())
    }
}

impl Default for OrderService {
    fn default() -> Self {
        Self::new()
    }
}
