use crate::models::ProfileDocument;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Shared handle to the one local copy of the profile document.
///
/// Every component reads and writes through clones of this handle, so a redraw
/// always sees the latest mutation no matter who made it. The browser runs one
/// callback at a time; borrows are never held across an `.await`.
#[derive(Clone, Debug, Default)]
pub struct DocumentStore {
    doc: Rc<RefCell<ProfileDocument>>,
    revision: Rc<Cell<u64>>,
}

impl DocumentStore {
    pub fn new(doc: ProfileDocument) -> Self {
        Self {
            doc: Rc::new(RefCell::new(doc)),
            revision: Rc::new(Cell::new(0)),
        }
    }

    /// Bumped on every mutation and swap.
    pub fn revision(&self) -> u64 {
        self.revision.get()
    }

    pub fn read<R>(&self, f: impl FnOnce(&ProfileDocument) -> R) -> R {
        f(&self.doc.borrow())
    }

    pub fn update<R>(&self, f: impl FnOnce(&mut ProfileDocument) -> R) -> R {
        let out = f(&mut self.doc.borrow_mut());
        self.bump();
        out
    }

    /// Owned copy, e.g. the body of a push.
    pub fn snapshot(&self) -> ProfileDocument {
        self.doc.borrow().clone()
    }

    /// Swaps in a freshly pulled document in one step.
    pub fn replace(&self, doc: ProfileDocument) {
        *self.doc.borrow_mut() = doc;
        self.bump();
    }

    fn bump(&self) {
        self.revision.set(self.revision.get().wrapping_add(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ListItem;

    #[test]
    fn test_clones_share_one_document() {
        let store = DocumentStore::default();
        let other = store.clone();
        other.update(|d| d.skills.push(ListItem::from("go")));
        assert_eq!(store.read(|d| d.skills.len()), 1);
        assert_eq!(store.revision(), 1);
    }

    #[test]
    fn test_replace_swaps_whole_document() {
        let store = DocumentStore::new(ProfileDocument {
            name: "old".to_string(),
            skills: vec![ListItem::from("a")],
            ..Default::default()
        });
        store.replace(ProfileDocument {
            name: "new".to_string(),
            ..Default::default()
        });
        let snap = store.snapshot();
        assert_eq!(snap.name, "new");
        assert!(snap.skills.is_empty());
        assert_eq!(store.revision(), 1);
    }

    #[test]
    fn test_snapshot_is_detached() {
        let store = DocumentStore::default();
        let mut snap = store.snapshot();
        snap.name = "changed".to_string();
        assert_eq!(store.read(|d| d.name.clone()), "");
    }
}
