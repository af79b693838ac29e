use std::collections::{BTreeMap, BTreeSet};

use itertools::Itertools;
use serde_json::{Map, Value};

use super::defaults;
use super::search::{SearchAction, SearchState};
use crate::environment::storage::Normalized;
use crate::environment::types::{
    read_item_ids, Article, CompanyId, Context, Format, ItemId, Notification, Page, Topic,
    TopicId, User, WireData,
};
use crate::environment::{decode, Environment};
use crate::error::HttpError;
use crate::helper::query_string;
use crate::store::Effect;

/// The `wire` sub-object, reduced by [`reduce_wire`]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WireFlags {
    pub news_only: bool,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct State {
    pub items: Normalized<Article>,
    pub aggregations: Option<Value>,
    pub active_item: Option<ItemId>,
    pub preview_item: Option<ItemId>,
    pub open_item: Option<ItemId>,
    pub is_loading: bool,
    pub total_items: Option<u64>,
    /// The query the current result list was fetched with
    pub active_query: Option<String>,
    pub user: Option<User>,
    pub company: Option<CompanyId>,
    pub topics: Vec<Topic>,
    pub selected_items: Vec<ItemId>,
    pub bookmarks: bool,
    pub formats: Vec<Format>,
    pub new_items: Vec<ItemId>,
    pub new_items_by_topic: BTreeMap<TopicId, Vec<ItemId>>,
    pub read_items: BTreeSet<ItemId>,
    pub wire: WireFlags,
    pub search: SearchState,
    pub context: Context,
    pub saved_items_count: Option<u64>,
    pub user_sections: Map<String, Value>,
    pub ui_config: Map<String, Value>,
    pub groups: Vec<Value>,
    pub search_initiated: bool,
    pub error: Option<String>,
    /// Stamped on every fetch, responses of older fetches are dropped
    pub request_generation: u64,
}

#[allow(clippy::large_enum_variant)]
#[derive(Clone, Debug)]
pub enum Action {
    ReceiveItems(Page<Article>),
    InitData {
        wire_data: WireData,
        read_data: Option<Map<String, Value>>,
        news_only: bool,
    },
    ToggleNews,
    FetchItems,
    ReceivedPage {
        generation: u64,
        result: Result<Page<Article>, HttpError>,
    },
    /// Drop the cached items, e.g. before a full reload
    ClearItems,

    // Handled by the shared default reducer
    SetActive(Option<ItemId>),
    PreviewItem(Option<ItemId>),
    OpenItem(Option<ItemId>),
    ToggleSelected(ItemId),
    SelectAll,
    SelectNone,
    SetNewItems(Vec<ItemId>),
    SetNewItemsByTopic(BTreeMap<TopicId, Vec<ItemId>>),
    MarkDeleted(Vec<ItemId>),
    SetBookmarks(bool),
    Search(SearchAction),
}

pub fn reduce(action: Action, state: &mut State, _environment: &Environment) -> Effect<Action> {
    log::trace!("{action:?}");
    match action {
        Action::ReceiveItems(page) => receive_items(state, page),
        Action::InitData {
            wire_data,
            read_data,
            news_only,
        } => init_data(state, wire_data, read_data, news_only),
        Action::ToggleNews => state.wire = reduce_wire(&state.wire, &Action::ToggleNews),
        Action::FetchItems => {
            state.is_loading = true;
            state.search_initiated = true;
            state.request_generation += 1;
            state.active_query = state.search.active_query.clone();
            let generation = state.request_generation;
            return Effect::get(search_path(state), move |result| Action::ReceivedPage {
                generation,
                result: result.and_then(decode),
            });
        }
        Action::ReceivedPage { generation, result } => {
            if generation != state.request_generation {
                log::debug!(
                    "Dropping stale page {generation}, current is {}",
                    state.request_generation
                );
                return Effect::NONE;
            }
            match result {
                Ok(page) => receive_items(state, page),
                Err(e) => {
                    state.is_loading = false;
                    state.search_initiated = false;
                    state.error = Some(format!("{e}"));
                    return Effect::notify(Notification::error(e.status_text()));
                }
            }
        }
        Action::ClearItems => {
            state.items.clear();
            state.selected_items.clear();
            state.active_item = None;
            state.preview_item = None;
            state.open_item = None;
            state.total_items = None;
            state.aggregations = None;
        }
        other => defaults::reduce(other, state),
    }
    Effect::NONE
}

/// Nested reducer for the `wire` sub-object, keyed by the same actions
pub fn reduce_wire(wire: &WireFlags, action: &Action) -> WireFlags {
    match action {
        Action::ToggleNews => WireFlags {
            news_only: !wire.news_only,
        },
        _ => wire.clone(),
    }
}

fn receive_items(state: &mut State, page: Page<Article>) {
    state.items.merge_page(page.items);
    state.total_items = Some(page.meta.total);
    state.aggregations = page.aggregations;
    state.is_loading = false;
    state.search_initiated = false;
    state.new_items.clear();
    state.error = None;
}

fn init_data(
    state: &mut State,
    wire_data: WireData,
    read_data: Option<Map<String, Value>>,
    news_only: bool,
) {
    state.read_items = read_data.as_ref().map(read_item_ids).unwrap_or_default();
    state.user = wire_data.user;
    state.topics = wire_data.topics;
    state.company = wire_data.company;
    state.bookmarks = wire_data.bookmarks;
    state.formats = wire_data.formats;
    state.wire = WireFlags { news_only };
    state.search.navigations = wire_data.navigations;
    state.context = wire_data.context.unwrap_or_default();
    state.saved_items_count = wire_data.saved_items;
    state.user_sections = wire_data.user_sections;
    state.ui_config = wire_data.ui_config;
    state.groups = wire_data.groups;
}

fn news_only_param(news_only: bool) -> String {
    if news_only {
        "1".to_string()
    } else {
        String::new()
    }
}

fn search_path(state: &State) -> String {
    let search = &state.search;
    let filter = if search.active_filter.is_empty() {
        String::new()
    } else {
        serde_json::to_string(&search.active_filter).unwrap_or_default()
    };
    let params = query_string([
        ("q", search.active_query.clone().unwrap_or_default()),
        ("navigation", search.active_navigation.iter().join(",")),
        ("filter", filter),
        ("newsOnly", news_only_param(state.wire.news_only)),
    ]);
    if params.is_empty() {
        format!("/{}/search", state.context)
    } else {
        format!("/{}/search?{params}", state.context)
    }
}

impl State {
    fn item(&self, id: Option<&ItemId>) -> Option<&Article> {
        id.and_then(|id| self.items.get(id))
    }

    pub fn active_item(&self) -> Option<&Article> {
        self.item(self.active_item.as_ref())
    }

    pub fn preview_item(&self) -> Option<&Article> {
        self.item(self.preview_item.as_ref())
    }

    pub fn open_item(&self) -> Option<&Article> {
        self.item(self.open_item.as_ref())
    }

    pub fn selected_items(&self) -> Vec<&Article> {
        self.selected_items
            .iter()
            .filter_map(|id| self.items.get(id))
            .collect()
    }

    /// The current result list without the locally deleted items
    pub fn visible_items(&self) -> Vec<&Article> {
        self.items.iter().filter(|a| !a.deleted).collect()
    }

    pub fn is_read(&self, id: &ItemId) -> bool {
        self.read_items.contains(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::model::mock::{self, MockServer};
    use crate::environment::types::Meta;
    use crate::store::{Method, Store};
    use serde_json::json;

    fn environment() -> Environment {
        mock::environment(MockServer::new(), true).0
    }

    fn article(id: &str) -> Article {
        Article {
            id: ItemId::from(id),
            headline: format!("Headline {id}"),
            ..Default::default()
        }
    }

    fn page(ids: &[&str], total: u64) -> Page<Article> {
        Page {
            items: ids.iter().map(|id| article(id)).collect(),
            meta: Meta { total },
            aggregations: None,
        }
    }

    #[test]
    fn listed_ids_always_resolve() {
        let environment = environment();
        let mut state = State::default();
        let pages: Vec<Vec<&str>> = vec![vec!["a", "b", "c"], vec!["c", "d"], vec![], vec!["a", "e", "a"]];
        for ids in pages {
            reduce(Action::ReceiveItems(page(&ids, 10)), &mut state, &environment);
            for id in state.items.ids() {
                assert!(state.items.get(id).is_some(), "{id} is not in the map");
            }
        }
        assert_eq!(state.items.len(), 2);
        assert!(state.items.contains(&ItemId::from("b")));
    }

    #[test]
    fn receive_items_resets_flags() {
        let environment = environment();
        let mut state = State {
            is_loading: true,
            search_initiated: true,
            new_items: vec![ItemId::from("x")],
            ..Default::default()
        };
        let mut data = page(&["a"], 42);
        data.aggregations = Some(json!({"genre": {"buckets": []}}));
        reduce(Action::ReceiveItems(data), &mut state, &environment);
        assert!(!state.is_loading);
        assert!(!state.search_initiated);
        assert!(state.new_items.is_empty());
        assert_eq!(state.total_items, Some(42));
        assert!(state.aggregations.is_some());
    }

    #[test]
    fn init_data_defaults() {
        let environment = environment();
        let mut state = State::default();
        let wire_data: WireData = serde_json::from_value(json!({"user": null})).unwrap();
        reduce(
            Action::InitData {
                wire_data,
                read_data: None,
                news_only: true,
            },
            &mut state,
            &environment,
        );
        assert!(state.topics.is_empty());
        assert!(state.formats.is_empty());
        assert!(state.groups.is_empty());
        assert!(state.user_sections.is_empty());
        assert!(state.ui_config.is_empty());
        assert!(state.read_items.is_empty());
        assert_eq!(state.context, Context::Wire);
        assert!(state.wire.news_only);
    }

    #[test]
    fn init_data_hydrates() {
        let environment = environment();
        let mut state = State::default();
        let wire_data: WireData = serde_json::from_value(json!({
            "user": {"_id": "u1", "first_name": "Jo"},
            "topics": [{"_id": "t1", "label": "Floods"}],
            "context": "agenda",
            "navigations": [{"_id": "n1", "name": "Sport"}],
            "saved_items": 3
        }))
        .unwrap();
        let read_data = json!({"a": true, "b": false}).as_object().cloned();
        reduce(
            Action::InitData {
                wire_data,
                read_data,
                news_only: false,
            },
            &mut state,
            &environment,
        );
        assert_eq!(state.user.as_ref().map(|u| u.id.0.as_str()), Some("u1"));
        assert_eq!(state.topics.len(), 1);
        assert_eq!(state.context, Context::Agenda);
        assert_eq!(state.search.navigations.len(), 1);
        assert_eq!(state.saved_items_count, Some(3));
        assert!(state.is_read(&ItemId::from("a")));
        assert!(!state.is_read(&ItemId::from("b")));
    }

    #[test]
    fn toggle_news_twice_restores() {
        let environment = environment();
        let mut state = State::default();
        reduce(Action::ToggleNews, &mut state, &environment);
        assert!(state.wire.news_only);
        reduce(Action::ToggleNews, &mut state, &environment);
        assert!(!state.wire.news_only);
    }

    #[test]
    fn reduce_wire_ignores_other_actions() {
        let flags = WireFlags { news_only: true };
        assert_eq!(reduce_wire(&flags, &Action::SelectAll), flags);
    }

    #[test]
    fn fetch_builds_search_request() {
        let environment = environment();
        let mut state = State::default();
        reduce(
            Action::Search(SearchAction::SetQuery("bush fire".to_string())),
            &mut state,
            &environment,
        );
        reduce(Action::ToggleNews, &mut state, &environment);
        let effect = reduce(Action::FetchItems, &mut state, &environment);
        let requests = effect.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, Method::Get);
        assert_eq!(requests[0].path, "/wire/search?q=bush%20fire&newsOnly=1");
        assert!(state.is_loading);
        assert!(state.search_initiated);
        assert_eq!(state.active_query.as_deref(), Some("bush fire"));
    }

    #[test]
    fn stale_pages_are_dropped() {
        let environment = environment();
        let mut state = State::default();
        reduce(Action::FetchItems, &mut state, &environment);
        let stale = state.request_generation;
        reduce(Action::FetchItems, &mut state, &environment);
        reduce(
            Action::ReceivedPage {
                generation: stale,
                result: Ok(page(&["old"], 1)),
            },
            &mut state,
            &environment,
        );
        assert!(state.items.is_empty());
        assert!(state.is_loading);

        reduce(
            Action::ReceivedPage {
                generation: state.request_generation,
                result: Ok(page(&["new"], 1)),
            },
            &mut state,
            &environment,
        );
        assert!(state.items.contains(&ItemId::from("new")));
        assert!(!state.is_loading);
    }

    #[tokio::test]
    async fn failed_fetch_clears_loading() {
        let server = MockServer::new();
        server.respond(
            Method::Get,
            "/wire/search",
            Err(mock::status(502, "BAD GATEWAY")),
        );
        let (environment, notifier) = mock::environment(server, true);
        let mut store = Store::<super::super::WireReducer>::new(State::default(), environment);
        store.dispatch(Action::FetchItems);
        assert!(store.state().is_loading);
        store.settle().await;
        assert!(!store.state().is_loading);
        assert!(!store.state().search_initiated);
        assert_eq!(
            notifier.notifications(),
            vec![Notification::error("BAD GATEWAY")]
        );
    }

    #[tokio::test]
    async fn fetch_round_trip() {
        let server = MockServer::new();
        server.respond(
            Method::Get,
            "/wire/search",
            Ok(json!({
                "_items": [{"_id": "a", "headline": "A"}, {"_id": "b", "headline": "B"}],
                "_meta": {"total": 2}
            })),
        );
        let (environment, _) = mock::environment(server, true);
        let mut store = Store::<super::super::WireReducer>::new(State::default(), environment);
        store.dispatch(Action::FetchItems);
        store.settle().await;
        let headlines: Vec<_> = store
            .state()
            .visible_items()
            .iter()
            .map(|a| a.headline.clone())
            .collect();
        assert_eq!(headlines, vec!["A", "B"]);
        assert_eq!(store.state().total_items, Some(2));
    }
}
