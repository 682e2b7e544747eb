use std::ops::Deref;

/// A record together with the last state known to the server.
///
/// A record that has never been saved is always dirty. A loaded record is
/// dirty once its current value differs from the saved snapshot, so writing a
/// field back to its original value makes it clean again.
#[derive(Debug, Clone, PartialEq)]
pub struct Record<T> {
    saved: Option<T>,
    current: T,
}

impl<T: Clone + PartialEq> Record<T> {
    /// A record created locally and not yet persisted.
    pub fn new(value: T) -> Self {
        Self {
            saved: None,
            current: value,
        }
    }

    /// A record as it was returned by the server.
    pub fn loaded(value: T) -> Self {
        Self {
            saved: Some(value.clone()),
            current: value,
        }
    }

    pub fn get(&self) -> &T {
        &self.current
    }

    pub fn get_mut(&mut self) -> &mut T {
        &mut self.current
    }

    pub fn is_new(&self) -> bool {
        self.saved.is_none()
    }

    pub fn is_dirty(&self) -> bool {
        match &self.saved {
            None => true,
            Some(saved) => saved != &self.current,
        }
    }

    /// Discard local modifications. A new record has nothing to revert to and
    /// is left untouched.
    pub fn rollback(&mut self) {
        if let Some(saved) = &self.saved {
            self.current = saved.clone();
        }
    }

    /// Replace the record with the server's answer after a create or update.
    pub fn mark_saved(&mut self, value: T) {
        self.saved = Some(value.clone());
        self.current = value;
    }

    /// Treat the current value as synced without changing it.
    pub fn mark_clean(&mut self) {
        self.saved = Some(self.current.clone());
    }
}

impl<T> Deref for Record<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_record_is_dirty_until_saved() {
        let mut record = Record::new(String::from("draft"));
        assert!(record.is_new());
        assert!(record.is_dirty());

        record.mark_saved(String::from("draft"));
        assert!(!record.is_new());
        assert!(!record.is_dirty());
    }

    #[test]
    fn loaded_record_tracks_changes_by_value() {
        let mut record = Record::loaded(vec![1, 2, 3]);
        assert!(!record.is_dirty());

        record.get_mut().push(4);
        assert!(record.is_dirty());

        record.get_mut().pop();
        assert!(!record.is_dirty());
    }

    #[test]
    fn rollback_restores_saved_state() {
        let mut record = Record::loaded(String::from("saved"));
        record.get_mut().push_str(" and edited");
        record.rollback();

        assert_eq!(record.get(), "saved");
        assert!(!record.is_dirty());
    }

    #[test]
    fn rollback_on_new_record_keeps_value() {
        let mut record = Record::new(7);
        *record.get_mut() = 8;
        record.rollback();
        assert_eq!(*record, 8);
    }

    #[test]
    fn mark_clean_snapshots_current_value() {
        let mut record = Record::new(1);
        record.mark_clean();
        assert!(!record.is_dirty());

        *record.get_mut() = 2;
        assert!(record.is_dirty());
    }
}
