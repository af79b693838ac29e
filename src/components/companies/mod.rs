mod reducer;

pub use reducer::{reduce, Action, CompanyChange, CompanyViewData, State};

pub struct CompaniesReducer;
use crate::store::{Effect, Reducer};

impl Reducer for CompaniesReducer {
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
