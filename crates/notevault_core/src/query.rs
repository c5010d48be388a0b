//! Visibility-scoped read composition.
//!
//! # Invariants
//! - The actor's own notes come first, newest update first.
//! - Public notes owned by others follow in the store's stable order.
//! - A note appears at most once, even when the actor's own note is public.

use crate::model::note::{ActorId, Note, CATEGORY_ALL};
use crate::store::{NoteStore, StoreResult};

/// Lists every note `actor` may read: own notes plus others' public notes.
pub fn list_visible_to<S>(store: &S, actor: &ActorId) -> StoreResult<Vec<Note>>
where
    S: NoteStore + ?Sized,
{
    let mut notes = store.list_by_owner(actor)?;
    notes.extend(
        store
            .list_public()?
            .into_iter()
            .filter(|note| !note.is_owned_by(actor)),
    );
    Ok(notes)
}

/// Same as [`list_visible_to`], narrowed to one exact category.
///
/// `None`, blank, or `"All"` applies no category filter.
pub fn list_visible_in_category<S>(
    store: &S,
    actor: &ActorId,
    category: Option<&str>,
) -> StoreResult<Vec<Note>>
where
    S: NoteStore + ?Sized,
{
    let notes = list_visible_to(store, actor)?;
    match category.map(str::trim) {
        Some(category) if !category.is_empty() && category != CATEGORY_ALL => Ok(notes
            .into_iter()
            .filter(|note| note.category == category)
            .collect()),
        _ => Ok(notes),
    }
}
