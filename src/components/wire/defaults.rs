//! Item handling shared by every result list: selection, preview, new
//! items pushed by the server, and the search sub-state.

use super::reducer::{Action, State};
use super::search;

pub fn reduce(action: Action, state: &mut State) {
    match action {
        Action::SetActive(id) => state.active_item = id,
        Action::PreviewItem(id) => {
            if let Some(id) = &id {
                state.read_items.insert(id.clone());
            }
            state.active_item = id.clone();
            state.preview_item = id;
        }
        Action::OpenItem(id) => {
            if let Some(id) = &id {
                state.read_items.insert(id.clone());
            }
            state.open_item = id;
        }
        Action::ToggleSelected(id) => {
            if state.selected_items.contains(&id) {
                state.selected_items.retain(|s| s != &id);
            } else if state.items.contains(&id) {
                state.selected_items.push(id);
            }
        }
        Action::SelectAll => state.selected_items = state.items.ids().cloned().collect(),
        Action::SelectNone => state.selected_items.clear(),
        Action::SetNewItems(ids) => {
            state.new_items = ids
                .into_iter()
                .filter(|id| !state.items.contains(id))
                .collect();
        }
        Action::SetNewItemsByTopic(by_topic) => state.new_items_by_topic = by_topic,
        Action::MarkDeleted(ids) => {
            for id in ids.iter() {
                state.items.mutate(id, |item| item.deleted = true);
            }
            state.selected_items.retain(|s| !ids.contains(s));
        }
        Action::SetBookmarks(on) => state.bookmarks = on,
        Action::Search(action) => search::reduce(action, &mut state.search),
        other => log::trace!("Unhandled {other:?}"),
    }
}
