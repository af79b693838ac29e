use crate::components::{companies, profile, wire};
use crate::environment::types::AppEvent;
use crate::environment::Environment;
use crate::store::Effect;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct State {
    pub wire: wire::State,
    pub companies: companies::State,
    pub profile: profile::State,
}

#[derive(Clone, Debug)]
pub enum Action {
    Wire(wire::Action),
    Companies(companies::Action),
    Profile(profile::Action),
    AppEvent(AppEvent),
}

pub fn reduce(action: Action, state: &mut State, environment: &Environment) -> Effect<Action> {
    log::trace!("{action:?}");
    match action {
        Action::Wire(action) => {
            wire::reduce(action, &mut state.wire, environment).map(Action::Wire)
        }
        Action::Companies(action) => {
            companies::reduce(action, &mut state.companies, environment).map(Action::Companies)
        }
        Action::Profile(action) => {
            profile::reduce(action, &mut state.profile, environment).map(Action::Profile)
        }
        Action::AppEvent(event) => handle_app_event(event),
    }
}

fn handle_app_event(event: AppEvent) -> Effect<Action> {
    match event {
        AppEvent::ManageTopics => Effect::action(Action::Profile(profile::Action::ManageTopics)),
        AppEvent::MenuChanged(menu) => {
            Effect::action(Action::Profile(profile::Action::SelectMenu(menu)))
        }
        AppEvent::Reload => Effect::merge(vec![
            Effect::action(Action::Wire(wire::Action::ClearItems)),
            Effect::action(Action::Wire(wire::Action::FetchItems)),
            Effect::action(Action::Companies(companies::Action::FetchCompanies)),
            Effect::action(Action::Profile(profile::Action::FetchTopics)),
        ]),
    }
}
