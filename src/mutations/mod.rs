//! Index-based edits on one named list.
//!
//! These are the only ways the admin panel changes list content. They never
//! touch the network; the engine wraps each one with a redraw and a save
//! schedule. Invalid input (blank append, stale index) is a silent no-op and
//! reported only through the return value.

use crate::models::{ItemRecord, ListItem, ListKey};

/// Editable fields of a list item.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ItemField {
    /// The primary display field (`name`, or the bare string itself).
    Name,
    Description,
    Lottie,
}

/// Appends `item` unless its display value is blank. Text items and record
/// names are stored trimmed. Returns the index of the new element.
pub fn append(list: &mut Vec<ListItem>, item: ListItem) -> Option<usize> {
    let item = match item {
        ListItem::Text(s) => ListItem::Text(s.trim().to_string()),
        ListItem::Record(mut r) => {
            r.name = r.name.trim().to_string();
            ListItem::Record(r)
        }
    };
    if item.display_value().trim().is_empty() {
        return None;
    }
    list.push(item);
    Some(list.len() - 1)
}

/// Builds the element the add control of `list` appends. Media lists hold
/// records with an optional description; the others hold bare strings.
pub fn new_entry(list: ListKey, name: &str, description: &str) -> ListItem {
    if !list.is_media() {
        return ListItem::Text(name.to_string());
    }
    let description = description.trim();
    ListItem::Record(ItemRecord {
        description: (!description.is_empty()).then(|| description.to_string()),
        ..ItemRecord::named(name)
    })
}

pub fn remove(list: &mut Vec<ListItem>, index: usize) -> Option<ListItem> {
    if index >= list.len() {
        return None;
    }
    Some(list.remove(index))
}

pub fn move_up(list: &mut [ListItem], index: usize) -> bool {
    if index == 0 || index >= list.len() {
        return false;
    }
    list.swap(index - 1, index);
    true
}

pub fn move_down(list: &mut [ListItem], index: usize) -> bool {
    if index + 1 >= list.len() {
        return false;
    }
    list.swap(index, index + 1);
    true
}

/// Sets one field of the item at `index`.
///
/// A bare string only has a name; setting any other field promotes it in
/// place to `{name: <old string>, <field>: value}`.
pub fn edit_field(list: &mut [ListItem], index: usize, field: ItemField, value: &str) -> bool {
    let Some(item) = list.get_mut(index) else {
        return false;
    };

    if let (ListItem::Text(s), ItemField::Name) = (&mut *item, field) {
        *s = value.to_string();
        return true;
    }

    if let ListItem::Text(s) = item {
        let name = std::mem::take(s);
        *item = ListItem::Record(ItemRecord::named(name));
    }

    let Some(record) = item.as_record_mut() else {
        return false;
    };
    match field {
        ItemField::Name => record.name = value.to_string(),
        ItemField::Description => record.description = Some(value.to_string()),
        ItemField::Lottie => record.lottie = Some(value.to_string()),
    }
    true
}
