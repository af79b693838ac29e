//! Followed topics: the user profile pane with its topic lists, the topic
//! editor and the share dialog
mod reducer;
mod topic_form;

pub use reducer::{reduce, Action, EditorState, State, TopicAction};
pub use topic_form::{TopicChange, TOPIC_NAME_MAXLENGTH};

pub struct ProfileReducer;
use crate::store::{Effect, Reducer};

impl Reducer for ProfileReducer {
    type Action = reducer::Action;

    type State = reducer::State;

    fn reduce(
        action: Self::Action,
        state: &mut Self::State,
        environment: &crate::environment::Environment,
    ) -> Effect<Self::Action> {
        reducer::reduce(action, state, environment)
    }
}
