use crate::error::SyncError;
use crate::state::PatchList;

/// Remove the element at `from` and insert it at `to`. Elements in between
/// shift by one; this is a move, not a swap.
pub fn move_item<T>(items: &mut Vec<T>, from: usize, to: usize) {
    if from == to || from >= items.len() || to >= items.len() {
        return;
    }
    let item = items.remove(from);
    items.insert(to, item);
}

/// A move in raw (device) positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawMove {
    pub from: usize,
    pub to: usize,
}

/// Translates a drop in view positions into raw positions. Returns `None`
/// for a drop onto the source.
pub fn plan_move(list: &PatchList, from: usize, to: usize) -> Result<Option<RawMove>, SyncError> {
    let len = list.view_len();
    let raw_from = list
        .raw_index(from)
        .ok_or(SyncError::IndexOutOfRange { index: from, len })?;
    let raw_to = list
        .raw_index(to)
        .ok_or(SyncError::IndexOutOfRange { index: to, len })?;
    if raw_from == raw_to {
        return Ok(None);
    }
    Ok(Some(RawMove {
        from: raw_from,
        to: raw_to,
    }))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging { source: usize },
    Committing { from: usize, to: usize },
    Reloading,
}

/// One drag gesture at a time. Starting a new drag discards whatever was
/// being dragged before.
#[derive(Debug, Default)]
pub struct DragSession {
    state: DragState,
}

impl DragSession {
    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn start(&mut self, source: usize) {
        if let DragState::Dragging { source: prev } = self.state {
            tracing::debug!(prev, source, "replacing in-flight drag");
        }
        self.state = DragState::Dragging { source };
    }

    pub fn cancel(&mut self) {
        if matches!(self.state, DragState::Dragging { .. }) {
            self.state = DragState::Idle;
        }
    }

    /// Returns the `(from, to)` pair to commit, or `None` when there is no
    /// active drag or the drop landed on the source.
    pub fn drop_on(&mut self, target: usize) -> Option<(usize, usize)> {
        let DragState::Dragging { source } = self.state else {
            return None;
        };
        if source == target {
            self.state = DragState::Idle;
            return None;
        }
        self.state = DragState::Committing {
            from: source,
            to: target,
        };
        Some((source, target))
    }

    pub fn begin_commit(&mut self, from: usize, to: usize) {
        self.state = DragState::Committing { from, to };
    }

    pub fn reloading(&mut self) {
        self.state = DragState::Reloading;
    }

    pub fn finish(&mut self) {
        self.state = DragState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::Patch;

    fn moved(from: usize, to: usize) -> Vec<char> {
        let mut v = vec!['A', 'B', 'C', 'D'];
        move_item(&mut v, from, to);
        v
    }

    #[test]
    fn move_forward_and_backward() {
        assert_eq!(moved(0, 2), vec!['B', 'C', 'A', 'D']);
        assert_eq!(moved(3, 0), vec!['D', 'A', 'B', 'C']);
        assert_eq!(moved(1, 1), vec!['A', 'B', 'C', 'D']);
    }

    #[test]
    fn move_ignores_out_of_range() {
        assert_eq!(moved(0, 9), vec!['A', 'B', 'C', 'D']);
    }

    #[test]
    fn plan_skips_blank_slots() {
        let mut list = PatchList::new();
        list.reconcile(vec![
            Patch::new("A", 100),
            Patch::new("", 120),
            Patch::new("B", 110),
            Patch::new("C", 90),
        ]);
        assert_eq!(
            plan_move(&list, 0, 1).unwrap(),
            Some(RawMove { from: 0, to: 2 })
        );
        assert_eq!(plan_move(&list, 2, 2).unwrap(), None);
        assert!(matches!(
            plan_move(&list, 0, 3),
            Err(SyncError::IndexOutOfRange { index: 3, len: 3 })
        ));
    }

    #[test]
    fn drag_session_transitions() {
        let mut s = DragSession::default();
        assert_eq!(s.drop_on(1), None);

        s.start(0);
        s.start(2);
        assert_eq!(s.state(), DragState::Dragging { source: 2 });
        assert_eq!(s.drop_on(0), Some((2, 0)));
        assert_eq!(s.state(), DragState::Committing { from: 2, to: 0 });
        s.reloading();
        s.finish();
        assert_eq!(s.state(), DragState::Idle);

        s.start(1);
        assert_eq!(s.drop_on(1), None);
        assert_eq!(s.state(), DragState::Idle);
    }
}
