//! Soft-deletable entry lists with generation-checked cursors.
//!
//! Token attribute lists, CSS property lists and selector lists are all an
//! [`EntryList`]. Filtering marks entries deleted instead of removing them, so
//! positions stay stable while a token is being rewritten.
//!
//! Contract:
//! - A cursor is valid only for the list generation it was issued under.
//!   `clear()` starts a new generation; dereferencing an older cursor panics.
//! - `valid_count()` always equals the number of entries not marked deleted.

/// An entry that can be hidden from iteration without being removed.
pub trait SoftDelete {
    fn is_deleted(&self) -> bool;
    fn set_deleted(&mut self, deleted: bool);
}

/// Position of one entry, bound to the list generation that issued it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EntryCursor {
    index: u16,
    generation: u32,
}

impl EntryCursor {
    pub fn index(self) -> usize {
        self.index as usize
    }
}

#[derive(Debug)]
pub struct EntryList<E> {
    entries: Vec<E>,
    valid: usize,
    generation: u32,
}

impl<E> Default for EntryList<E> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            valid: 0,
            generation: 0,
        }
    }
}

/// Upper bound on entries per list; cursors address entries with `u16`.
pub const MAX_ENTRIES: usize = u16::MAX as usize;

impl<E: SoftDelete> EntryList<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.valid = 0;
        self.generation = self.generation.wrapping_add(1);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.entries.len() >= MAX_ENTRIES
    }

    pub fn valid_count(&self) -> usize {
        self.valid
    }

    /// Append an entry. Callers check `is_full()` first.
    pub fn push(&mut self, entry: E) -> EntryCursor {
        assert!(
            !self.is_full(),
            "entry list overflow: at most {MAX_ENTRIES} entries per token"
        );
        if !entry.is_deleted() {
            self.valid += 1;
        }
        let index = self.entries.len() as u16;
        self.entries.push(entry);
        EntryCursor {
            index,
            generation: self.generation,
        }
    }

    pub fn cursor_at(&self, index: usize) -> EntryCursor {
        assert!(index < self.entries.len(), "entry index out of range");
        EntryCursor {
            index: index as u16,
            generation: self.generation,
        }
    }

    fn check(&self, cursor: EntryCursor) -> usize {
        assert_eq!(
            cursor.generation, self.generation,
            "stale entry cursor: list was cleared after the cursor was issued"
        );
        cursor.index as usize
    }

    pub fn get(&self, cursor: EntryCursor) -> &E {
        let index = self.check(cursor);
        &self.entries[index]
    }

    /// Mutable access. Deletion state must change through `set_deleted` on
    /// the list, not on the returned entry.
    pub fn get_mut(&mut self, cursor: EntryCursor) -> &mut E {
        let index = self.check(cursor);
        &mut self.entries[index]
    }

    pub fn last_mut(&mut self) -> Option<&mut E> {
        self.entries.last_mut()
    }

    pub fn set_deleted(&mut self, cursor: EntryCursor, deleted: bool) {
        let index = self.check(cursor);
        let entry = &mut self.entries[index];
        match (entry.is_deleted(), deleted) {
            (false, true) => self.valid -= 1,
            (true, false) => self.valid += 1,
            _ => {}
        }
        entry.set_deleted(deleted);
    }

    /// All entries, deleted ones included.
    pub fn iter_all(&self) -> impl Iterator<Item = &E> + '_ {
        self.entries.iter()
    }

    /// Entries not marked deleted, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &E> + '_ {
        self.entries.iter().filter(|entry| !entry.is_deleted())
    }

    /// Cursors of entries not marked deleted.
    pub fn cursors(&self) -> impl Iterator<Item = EntryCursor> + '_ {
        let generation = self.generation;
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| !entry.is_deleted())
            .map(move |(index, _)| EntryCursor {
                index: index as u16,
                generation,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Item {
        value: u32,
        deleted: bool,
    }

    impl SoftDelete for Item {
        fn is_deleted(&self) -> bool {
            self.deleted
        }
        fn set_deleted(&mut self, deleted: bool) {
            self.deleted = deleted;
        }
    }

    fn item(value: u32) -> Item {
        Item {
            value,
            deleted: false,
        }
    }

    #[test]
    fn soft_delete_keeps_positions_and_count() {
        let mut list = EntryList::new();
        let a = list.push(item(1));
        let b = list.push(item(2));
        list.push(item(3));
        assert_eq!(list.valid_count(), 3);

        list.set_deleted(b, true);
        list.set_deleted(b, true);
        assert_eq!(list.valid_count(), 2);
        assert_eq!(list.len(), 3);
        let values: Vec<u32> = list.iter().map(|i| i.value).collect();
        assert_eq!(values, vec![1, 3]);

        list.set_deleted(b, false);
        assert_eq!(list.valid_count(), 3);
        assert_eq!(list.get(a).value, 1);
    }

    #[test]
    fn cursors_skip_deleted_entries() {
        let mut list = EntryList::new();
        list.push(item(1));
        let b = list.push(item(2));
        list.set_deleted(b, true);
        let indices: Vec<usize> = list.cursors().map(EntryCursor::index).collect();
        assert_eq!(indices, vec![0]);
    }

    #[test]
    #[should_panic(expected = "stale entry cursor")]
    fn cursor_from_previous_generation_panics() {
        let mut list = EntryList::new();
        let a = list.push(item(1));
        list.clear();
        list.push(item(2));
        let _ = list.get(a);
    }
}
