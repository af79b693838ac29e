mod defaults;
mod reducer;
pub mod search;

pub use reducer::{reduce, reduce_wire, Action, State, WireFlags};
pub use search::{SearchAction, SearchState};

pub struct WireReducer;
use crate::store::{Effect, Reducer};

impl Reducer for WireReducer {
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
