use serde_json::json;

use super::topic_form::TopicChange;
use crate::environment::types::{
    CompanyId, Context, FieldErrors, Listing, Menu, Notification, ProfileData, Topic, TopicId,
    TopicType, User, UserId,
};
use crate::environment::{decode, Environment};
use crate::error::HttpError;
use crate::loc;
use crate::store::Effect;

#[derive(Clone, Debug, Default, PartialEq)]
pub enum EditorState {
    #[default]
    Closed,
    Open(Topic),
}

impl EditorState {
    pub fn is_open(&self) -> bool {
        matches!(self, EditorState::Open(_))
    }

    pub fn topic(&self) -> Option<&Topic> {
        match self {
            EditorState::Open(topic) => Some(topic),
            EditorState::Closed => None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct State {
    pub user: Option<User>,
    pub company: Option<CompanyId>,
    pub topics: Vec<Topic>,
    /// Monitoring profiles come from the server as their own list
    pub monitoring_list: Vec<Topic>,
    pub monitoring_administrator: Option<UserId>,
    pub selected_menu: Menu,
    pub topic_type: TopicType,
    pub show_global: bool,
    pub global_topics_enabled: bool,
    pub editor: EditorState,
    pub editor_fullscreen: bool,
    pub context: Context,
    /// The topic in the share dialog
    pub sharing: Option<Topic>,
    pub errors: Option<FieldErrors>,
    pub is_loading: bool,
    pub request_generation: u64,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TopicAction {
    Edit,
    Share,
    Delete,
}

#[derive(Clone, Debug)]
pub enum Action {
    InitData(ProfileData),
    SelectMenu(Menu),
    /// The `manage_topics` document event
    ManageTopics,
    FetchTopics,
    ReceivedTopics {
        generation: u64,
        result: Result<Vec<Topic>, HttpError>,
    },
    SetTopics(Vec<Topic>),
    EditTopic(Topic),
    SetFullscreen(bool),
    CloseEditor,
    Unmount,
    ChangeTopic(TopicChange),
    SaveTopic,
    TopicSaved(String),
    SetError(FieldErrors),
    ToggleGlobal,
    SetTopicType(TopicType),
    ShareTopic(Topic),
    SubmitShare {
        users: Vec<UserId>,
        message: String,
    },
    CloseShare,
    Shared,
    DeleteTopic(Topic),
    ConfirmedDeleteTopic(TopicId),
    TopicDeleted,
    RequestFailed(HttpError),
}

pub fn reduce(action: Action, state: &mut State, _environment: &Environment) -> Effect<Action> {
    log::trace!("{action:?}");
    match action {
        Action::InitData(data) => {
            state.user = data.user;
            state.company = data.company;
            state.topics = data.topics;
            state.monitoring_list = data.monitoring_list;
            state.monitoring_administrator = data.monitoring_administrator;
            state.global_topics_enabled = data.global_topics_enabled;
            state.context = data.context.unwrap_or_default();
        }
        Action::SelectMenu(menu) => {
            if menu != state.selected_menu {
                close_editor(state);
            }
            state.selected_menu = menu;
            if let Some(topic_type) = menu.topic_type() {
                state.topic_type = topic_type;
                return Effect::action(Action::FetchTopics);
            }
        }
        Action::ManageTopics => {
            let menu = match state.context {
                Context::Wire => Menu::Topics,
                Context::Agenda => Menu::Events,
            };
            return Effect::action(Action::SelectMenu(menu));
        }
        Action::FetchTopics => {
            let Some(user) = state.user.as_ref() else {
                log::debug!("No user, not fetching topics");
                return Effect::NONE;
            };
            state.is_loading = true;
            state.request_generation += 1;
            let generation = state.request_generation;
            return Effect::get(format!("/users/{}/topics", user.id), move |result| {
                Action::ReceivedTopics {
                    generation,
                    result: result
                        .and_then(decode::<Listing<Topic>>)
                        .map(Listing::into_items),
                }
            });
        }
        Action::ReceivedTopics { generation, result } => {
            if generation != state.request_generation {
                log::debug!("Dropping stale topics {generation}");
                return Effect::NONE;
            }
            return match result {
                Ok(topics) => Effect::action(Action::SetTopics(topics)),
                Err(e) => {
                    state.is_loading = false;
                    handle_error(e)
                }
            };
        }
        Action::SetTopics(topics) => {
            state.topics = topics;
            state.is_loading = false;
        }
        Action::EditTopic(topic) => {
            state.editor = EditorState::Open(topic);
            state.errors = None;
        }
        Action::SetFullscreen(on) => state.editor_fullscreen = on,
        Action::CloseEditor | Action::Unmount => close_editor(state),
        Action::ChangeTopic(change) => {
            if let EditorState::Open(topic) = &mut state.editor {
                change.apply(topic, state.global_topics_enabled);
            }
        }
        Action::SaveTopic => {
            let Some(topic) = state.editor.topic() else {
                return Effect::NONE;
            };
            let (path, message) = match (&topic.id, &state.user) {
                (Some(id), _) => (format!("/topics/{id}"), loc!("Topic updated successfully")),
                (None, Some(user)) => (
                    format!("/users/{}/topics", user.id),
                    loc!("Topic created successfully"),
                ),
                (None, None) => {
                    log::warn!("Can't create a topic without a user");
                    return Effect::NONE;
                }
            };
            let body = match serde_json::to_value(topic) {
                Ok(body) => body,
                Err(e) => {
                    log::error!("Could not serialize topic: {e:?}");
                    return Effect::notify(Notification::error(e.to_string()));
                }
            };
            return Effect::post(path, body, move |result| match result {
                Ok(_) => Action::TopicSaved(message.to_string()),
                Err(e) => Action::RequestFailed(e),
            });
        }
        Action::TopicSaved(message) => {
            close_editor(state);
            return Effect::merge2(
                Effect::notify(Notification::success(message)),
                Effect::action(Action::FetchTopics),
            );
        }
        Action::SetError(errors) => state.errors = Some(errors),
        Action::ToggleGlobal => state.show_global = !state.show_global,
        Action::SetTopicType(topic_type) => state.topic_type = topic_type,
        Action::ShareTopic(topic) => state.sharing = Some(topic),
        Action::SubmitShare { users, message } => {
            let Some(topic) = state.sharing.as_ref() else {
                return Effect::NONE;
            };
            let body = json!({
                "items": [topic],
                "users": users,
                "message": message,
            });
            return Effect::post("/topic_share", body, |result| match result {
                Ok(_) => Action::Shared,
                Err(e) => Action::RequestFailed(e),
            });
        }
        Action::CloseShare => state.sharing = None,
        Action::Shared => {
            state.sharing = None;
            return Effect::notify(Notification::success(loc!(
                "Topic was shared successfully."
            )));
        }
        Action::DeleteTopic(topic) => {
            let Some(id) = topic.id else {
                return Effect::NONE;
            };
            return Effect::confirm(
                loc!(format!("Would you like to delete topic {}?", topic.label)),
                Action::ConfirmedDeleteTopic(id),
            );
        }
        Action::ConfirmedDeleteTopic(id) => {
            return Effect::delete(format!("/topics/{id}"), |result| match result {
                Ok(_) => Action::TopicDeleted,
                Err(e) => Action::RequestFailed(e),
            });
        }
        Action::TopicDeleted => {
            return Effect::merge2(
                Effect::notify(Notification::success(loc!("Topic deleted successfully"))),
                Effect::action(Action::FetchTopics),
            );
        }
        Action::RequestFailed(e) => return handle_error(e),
    }
    Effect::NONE
}

fn close_editor(state: &mut State) {
    state.editor = EditorState::Closed;
    state.editor_fullscreen = false;
    state.errors = None;
}

fn handle_error(error: HttpError) -> Effect<Action> {
    log::error!("error {error:?}");
    match error.field_errors() {
        Some(errors) => Effect::action(Action::SetError(errors)),
        None => Effect::notify(Notification::error(error.status_text())),
    }
}

impl State {
    /// Topics of the active tab and scope. The monitoring tab lists the
    /// server provided monitoring profiles instead.
    pub fn visible_topics(&self) -> Vec<&Topic> {
        if self.topic_type == TopicType::Monitoring {
            return self.monitoring_list.iter().collect();
        }
        self.topics
            .iter()
            .filter(|t| t.topic_type == self.topic_type && t.is_global == self.show_global)
            .collect()
    }

    /// What each topic of the active tab offers
    pub fn topic_actions(&self) -> Vec<TopicAction> {
        match self.topic_type {
            TopicType::Monitoring => vec![TopicAction::Edit],
            _ => vec![TopicAction::Edit, TopicAction::Share, TopicAction::Delete],
        }
    }

    pub fn is_monitoring_admin(&self) -> bool {
        match (&self.user, &self.monitoring_administrator) {
            (Some(user), Some(admin)) => &user.id == admin,
            _ => false,
        }
    }
}
