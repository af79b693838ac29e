//! Composes the wire, companies and profile slices into one state tree and
//! routes app events to the slice that owns them
mod reducer;

pub use reducer::{reduce, Action as RootAction, State as RootState};

pub struct RootReducer;
use crate::store::{Effect, Reducer};

impl Reducer for RootReducer {
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
