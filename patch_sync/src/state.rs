//! The single owned copy of the patch sequence.
//!
//! Entries carry a process-local [`PatchId`] so that an optimistic edit or
//! move can be followed through the list; the device itself only knows
//! positions, so ids are dropped again whenever the list crosses the wire.

use crate::protocol::Patch;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PatchId(u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub id: PatchId,
    pub patch: Patch,
}

/// Snapshot taken before an optimistic mutation.
#[derive(Debug, Clone)]
pub struct Checkpoint {
    entries: Vec<Entry>,
    confirmed: bool,
}

/// Read-only copy of the list handed out to callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub generation: u64,
    pub confirmed: bool,
    pub entries: Vec<Entry>,
}

impl Snapshot {
    pub fn patches(&self) -> Vec<Patch> {
        self.entries.iter().map(|e| e.patch.clone()).collect()
    }

    pub fn view(&self) -> Vec<&Entry> {
        self.entries.iter().filter(|e| !e.patch.is_blank()).collect()
    }
}

#[derive(Debug, Default)]
pub struct PatchList {
    entries: Vec<Entry>,
    next_id: u64,
    generation: u64,
    confirmed: bool,
}

impl PatchList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, raw_index: usize) -> Option<&Entry> {
        self.entries.get(raw_index)
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn patches(&self) -> Vec<Patch> {
        self.entries.iter().map(|e| e.patch.clone()).collect()
    }

    /// Bumped every time the list is replaced by remote truth or restored.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// `false` while an optimistic mutation is waiting for the device.
    pub fn is_confirmed(&self) -> bool {
        self.confirmed
    }

    /// Entries that are rendered: everything with a non-empty name.
    pub fn view(&self) -> Vec<&Entry> {
        self.entries.iter().filter(|e| !e.patch.is_blank()).collect()
    }

    pub fn view_len(&self) -> usize {
        self.entries.iter().filter(|e| !e.patch.is_blank()).count()
    }

    pub fn raw_index(&self, view_index: usize) -> Option<usize> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, e)| !e.patch.is_blank())
            .nth(view_index)
            .map(|(i, _)| i)
    }

    pub fn position_of(&self, id: PatchId) -> Option<usize> {
        self.entries.iter().position(|e| e.id == id)
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            generation: self.generation,
            confirmed: self.confirmed,
            entries: self.entries.clone(),
        }
    }

    pub fn apply_optimistic<F>(&mut self, mutate: F) -> Checkpoint
    where
        F: FnOnce(&mut Vec<Entry>),
    {
        let checkpoint = Checkpoint {
            entries: self.entries.clone(),
            confirmed: self.confirmed,
        };
        mutate(&mut self.entries);
        self.confirmed = false;
        checkpoint
    }

    /// Marks the current (optimistic) contents as acknowledged by the device.
    pub fn confirm(&mut self) {
        self.confirmed = true;
    }

    pub fn reconcile(&mut self, remote: Vec<Patch>) {
        self.entries = remote
            .into_iter()
            .map(|patch| {
                let id = PatchId(self.next_id);
                self.next_id += 1;
                Entry { id, patch }
            })
            .collect();
        self.generation += 1;
        self.confirmed = true;
    }

    pub fn rollback(&mut self, checkpoint: Checkpoint) {
        self.entries = checkpoint.entries;
        self.confirmed = checkpoint.confirmed;
        self.generation += 1;
    }
}
