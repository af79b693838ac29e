use std::collections::BTreeMap;

use serde_json::json;

use crate::environment::storage::Normalized;
use crate::environment::types::{
    Company, CompanyId, FieldErrors, Listing, Notification, Product, Service, User,
};
use crate::environment::{decode, Environment};
use crate::error::HttpError;
use crate::loc;
use crate::store::Effect;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct State {
    pub companies: Normalized<Company>,
    pub active_company_id: Option<CompanyId>,
    /// The draft being edited, `id` is `None` for a new company
    pub company_to_edit: Option<Company>,
    pub query: Option<String>,
    pub errors: Option<FieldErrors>,
    pub is_loading: bool,
    pub company_users: Vec<User>,
    pub products: Vec<Product>,
    pub services: Vec<Service>,
    /// Stamped on every search, responses of older searches are dropped
    pub request_generation: u64,
    /// After a save the next list replaces the draft with the stored record
    resync_draft: bool,
}

/// One edit in the company form
#[derive(Clone, Debug, PartialEq)]
pub enum CompanyChange {
    Name(String),
    Url(String),
    SubscriberId(String),
    ContactName(String),
    ContactEmail(String),
    Phone(String),
    Country(String),
    CompanyType(String),
    Enabled(bool),
    Section(String, bool),
    AllowedIps(Vec<String>),
}

impl CompanyChange {
    fn apply(self, company: &mut Company) {
        fn text(value: String) -> Option<String> {
            (!value.is_empty()).then_some(value)
        }
        match self {
            CompanyChange::Name(v) => company.name = text(v),
            CompanyChange::Url(v) => company.url = text(v),
            CompanyChange::SubscriberId(v) => company.sd_subscriber_id = text(v),
            CompanyChange::ContactName(v) => company.contact_name = text(v),
            CompanyChange::ContactEmail(v) => company.contact_email = text(v),
            CompanyChange::Phone(v) => company.phone = text(v),
            CompanyChange::Country(v) => company.country = text(v),
            CompanyChange::CompanyType(v) => company.company_type = text(v),
            CompanyChange::Enabled(on) => company.is_enabled = on,
            CompanyChange::Section(section, on) => {
                company.sections.insert(section, on);
            }
            CompanyChange::AllowedIps(ips) => company.allowed_ip_list = ips,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CompanyViewData {
    pub companies: Vec<Company>,
    pub products: Vec<Product>,
    pub services: Vec<Service>,
}

#[derive(Clone, Debug)]
pub enum Action {
    /// Select and load the users of a company
    SelectCompany(CompanyId),
    Select(CompanyId),
    EditCompany(CompanyChange),
    NewCompany(Company),
    CancelEdit,
    SetQuery(String),
    FetchCompanies,
    QueryCompanies,
    ReceivedCompanies {
        generation: u64,
        result: Result<Vec<Company>, HttpError>,
    },
    GetCompanies(Vec<Company>),
    FetchCompanyUsers(CompanyId),
    /// Users of `company`. Dropped unless it's still the active one.
    GetCompanyUsers {
        company: CompanyId,
        users: Vec<User>,
    },
    GetProducts(Vec<Product>),
    SetError(FieldErrors),
    PostCompany,
    DeleteCompany,
    ConfirmedDelete(CompanyId),
    Deleted(CompanyId),
    SaveServices(BTreeMap<String, bool>),
    /// A mutation went through, notify and reload the list
    Saved(String),
    RequestFailed(HttpError),
    InitViewData(CompanyViewData),
}

pub fn reduce(action: Action, state: &mut State, _environment: &Environment) -> Effect<Action> {
    log::trace!("{action:?}");
    match action {
        Action::SelectCompany(id) => {
            return Effect::merge2(
                Effect::action(Action::Select(id.clone())),
                Effect::action(Action::FetchCompanyUsers(id)),
            );
        }
        Action::Select(id) => {
            state.company_to_edit = state.companies.get(&id).cloned();
            state.active_company_id = Some(id);
            state.company_users.clear();
            state.errors = None;
        }
        Action::EditCompany(change) => {
            if let Some(company) = state.company_to_edit.as_mut() {
                change.apply(company);
            }
        }
        Action::NewCompany(data) => {
            state.company_to_edit = Some(data);
            state.active_company_id = None;
            state.errors = None;
        }
        Action::CancelEdit => {
            state.company_to_edit = None;
            state.active_company_id = None;
            state.errors = None;
        }
        Action::SetQuery(query) => {
            let query = query.trim().to_string();
            state.query = (!query.is_empty()).then_some(query);
        }
        Action::FetchCompanies => {
            // the query state is set before the request goes out
            reduce_query(state);
            let generation = state.request_generation;
            let query = state.query.clone().unwrap_or_default();
            let path = format!("/companies/search?q={}", urlencoding::encode(&query));
            return Effect::get(path, move |result| Action::ReceivedCompanies {
                generation,
                result: result
                    .and_then(decode::<Listing<Company>>)
                    .map(Listing::into_items),
            });
        }
        Action::QueryCompanies => reduce_query(state),
        Action::ReceivedCompanies { generation, result } => {
            if generation != state.request_generation {
                log::debug!(
                    "Dropping stale company list {generation}, current is {}",
                    state.request_generation
                );
                return Effect::NONE;
            }
            return match result {
                Ok(companies) => Effect::action(Action::GetCompanies(companies)),
                Err(e) => {
                    state.is_loading = false;
                    handle_error(e)
                }
            };
        }
        Action::GetCompanies(companies) => {
            state.companies.replace_all(companies);
            state.is_loading = false;
            if std::mem::take(&mut state.resync_draft) {
                let stored = state
                    .company_to_edit
                    .as_ref()
                    .and_then(|draft| draft.id.as_ref())
                    .and_then(|id| state.companies.get(id))
                    .cloned();
                if stored.is_some() {
                    state.company_to_edit = stored;
                }
            }
        }
        Action::FetchCompanyUsers(id) => {
            let has_name = state.companies.get(&id).is_some_and(Company::has_name);
            if !has_name {
                log::debug!("Company {id} isn't loaded yet, not fetching its users");
                return Effect::NONE;
            }
            let path = format!("/companies/{id}/users");
            return Effect::get(path, move |result| {
                match result.and_then(decode::<Vec<User>>) {
                    Ok(users) => Action::GetCompanyUsers { company: id, users },
                    Err(e) => Action::RequestFailed(e),
                }
            });
        }
        Action::GetCompanyUsers { company, users } => {
            if state.active_company_id.as_ref() != Some(&company) {
                log::debug!("Dropping users of {company}, no longer selected");
                return Effect::NONE;
            }
            state.company_users = users;
        }
        Action::GetProducts(products) => state.products = products,
        Action::SetError(errors) => state.errors = Some(errors),
        Action::PostCompany => {
            let Some(company) = state.company_to_edit.as_ref() else {
                return Effect::NONE;
            };
            let (path, message) = match &company.id {
                Some(id) => (
                    format!("/company/{id}"),
                    loc!("Company updated successfully"),
                ),
                None => (
                    "/company/new".to_string(),
                    loc!("Company created successfully"),
                ),
            };
            let body = match serde_json::to_value(company) {
                Ok(body) => body,
                Err(e) => {
                    log::error!("Could not serialize company: {e:?}");
                    return Effect::notify(Notification::error(e.to_string()));
                }
            };
            return Effect::post(path, body, move |result| match result {
                Ok(_) => Action::Saved(message.to_string()),
                Err(e) => Action::RequestFailed(e),
            });
        }
        Action::DeleteCompany => {
            let Some(company) = state.company_to_edit.as_ref() else {
                return Effect::NONE;
            };
            let Some(id) = company.id.clone() else {
                return Effect::NONE;
            };
            let name = company.name.clone().unwrap_or_default();
            return Effect::confirm(
                loc!(format!("Would you like to delete company {name}?")),
                Action::ConfirmedDelete(id),
            );
        }
        Action::ConfirmedDelete(id) => {
            let path = format!("/companies/{id}");
            return Effect::delete(path, move |result| match result {
                Ok(_) => Action::Deleted(id),
                Err(e) => Action::RequestFailed(e),
            });
        }
        Action::Deleted(id) => {
            if state.active_company_id.as_ref() == Some(&id) {
                state.active_company_id = None;
            }
            if state.company_to_edit.as_ref().and_then(|c| c.id.as_ref()) == Some(&id) {
                state.company_to_edit = None;
            }
            return Effect::merge2(
                Effect::notify(Notification::success(loc!("Company deleted successfully"))),
                Effect::action(Action::FetchCompanies),
            );
        }
        Action::SaveServices(services) => {
            let Some(id) = state.company_to_edit.as_ref().and_then(|c| c.id.clone()) else {
                return Effect::NONE;
            };
            let path = format!("/companies/{id}/services");
            return Effect::post(path, json!({ "services": services }), |result| {
                match result {
                    Ok(_) => Action::Saved(loc!("Services updated successfully").to_string()),
                    Err(e) => Action::RequestFailed(e),
                }
            });
        }
        Action::Saved(message) => {
            state.errors = None;
            state.resync_draft = true;
            return Effect::merge2(
                Effect::notify(Notification::success(message)),
                Effect::action(Action::FetchCompanies),
            );
        }
        Action::RequestFailed(e) => return handle_error(e),
        Action::InitViewData(data) => {
            state.services = data.services;
            return Effect::merge2(
                Effect::action(Action::GetCompanies(data.companies)),
                Effect::action(Action::GetProducts(data.products)),
            );
        }
    }
    Effect::NONE
}

fn reduce_query(state: &mut State) {
    state.is_loading = true;
    state.request_generation += 1;
}

/// A `400` carries field errors for the form. Everything else only
/// produces a notification. Loading state belongs to the search and is
/// left to its caller.
fn handle_error(error: HttpError) -> Effect<Action> {
    log::error!("error {error:?}");
    match error.field_errors() {
        Some(errors) => Effect::action(Action::SetError(errors)),
        None => Effect::notify(Notification::error(error.status_text())),
    }
}

impl State {
    pub fn active_company(&self) -> Option<&Company> {
        self.active_company_id
            .as_ref()
            .and_then(|id| self.companies.get(id))
    }

    /// The current list, in server order
    pub fn companies(&self) -> Vec<&Company> {
        self.companies.iter().collect()
    }

    pub fn is_new_draft(&self) -> bool {
        self.company_to_edit
            .as_ref()
            .is_some_and(|company| company.id.is_none())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::companies::CompaniesReducer;
    use crate::environment::model::mock::{self, MockServer};
    use crate::environment::types::{FieldError, NotificationKind, UserId};
    use crate::store::{Method, Request, Store};
    use serde_json::json;

    fn company(id: &str, name: Option<&str>) -> Company {
        Company {
            id: Some(CompanyId::from(id)),
            name: name.map(str::to_string),
            ..Default::default()
        }
    }

    fn store_with(
        server: std::sync::Arc<MockServer>,
        companies: Vec<Company>,
    ) -> (Store<CompaniesReducer>, std::sync::Arc<mock::RecordingNotifier>) {
        let (environment, notifier) = mock::environment(server, true);
        let mut store = Store::new(State::default(), environment);
        store.dispatch(Action::GetCompanies(companies));
        (store, notifier)
    }

    #[tokio::test]
    async fn select_without_name_skips_user_fetch() {
        let server = MockServer::new();
        let (mut store, _) = store_with(server.clone(), vec![company("X", None)]);
        store.dispatch(Action::SelectCompany(CompanyId::from("X")));
        assert_eq!(store.in_flight(), 0);
        store.settle().await;
        assert!(server.requests().is_empty());
        assert_eq!(
            store.state().active_company_id,
            Some(CompanyId::from("X"))
        );
    }

    #[tokio::test]
    async fn select_with_name_fetches_users() {
        let server = MockServer::new();
        server.respond(
            Method::Get,
            "/companies/X/users",
            Ok(json!([{"_id": "u1", "first_name": "Ana", "last_name": "Ruiz"}])),
        );
        let (mut store, _) = store_with(server.clone(), vec![company("X", Some("Example"))]);
        store.dispatch(Action::SelectCompany(CompanyId::from("X")));
        store.settle().await;
        assert_eq!(server.requests(), vec![Request::get("/companies/X/users")]);
        assert_eq!(store.state().company_users[0].full_name(), "Ana Ruiz");
        assert_eq!(
            store.state().active_company().and_then(|c| c.name.as_deref()),
            Some("Example")
        );
        assert_eq!(store.state().company_to_edit, Some(company("X", Some("Example"))));
    }

    #[test]
    fn post_path_depends_on_draft_id() {
        let environment = mock::environment(MockServer::new(), true).0;
        let mut state = State::default();

        reduce(Action::NewCompany(Company::default()), &mut state, &environment);
        assert!(state.is_new_draft());
        let effect = reduce(Action::PostCompany, &mut state, &environment);
        assert!(effect.requests()[0].path.ends_with("/new"));

        reduce(
            Action::NewCompany(company("42", Some("Answer"))),
            &mut state,
            &environment,
        );
        let effect = reduce(Action::PostCompany, &mut state, &environment);
        let request = effect.requests()[0];
        assert_eq!(request.method, Method::Post);
        assert!(request.path.contains("/42"));
        assert_eq!(request.body.as_ref().unwrap()["name"], "Answer");
    }

    #[tokio::test]
    async fn post_notifies_and_reloads() {
        let server = MockServer::new();
        server.respond(
            Method::Get,
            "/companies/search",
            Ok(json!([{"_id": "1", "name": "Created"}])),
        );
        let (mut store, notifier) = store_with(server.clone(), vec![]);
        store.dispatch(Action::NewCompany(Company::default()));
        store.dispatch(Action::EditCompany(CompanyChange::Name("Created".to_string())));
        store.dispatch(Action::PostCompany);
        store.settle().await;

        let requests = server.requests();
        assert_eq!(requests[0].path, "/company/new");
        assert_eq!(requests[1], Request::get("/companies/search?q="));
        assert_eq!(
            notifier.notifications(),
            vec![Notification::success("Company created successfully")]
        );
        assert_eq!(store.state().companies().len(), 1);
        assert!(!store.state().is_loading);
    }

    #[tokio::test]
    async fn server_error_notifies_without_field_errors() {
        let server = MockServer::new();
        server.respond(
            Method::Get,
            "/companies/search",
            Err(mock::status(500, "INTERNAL SERVER ERROR")),
        );
        let (mut store, notifier) = store_with(server, vec![]);
        store.dispatch(Action::FetchCompanies);
        assert!(store.state().is_loading);
        store.settle().await;
        assert!(store.state().errors.is_none());
        assert!(!store.state().is_loading);
        let notifications = notifier.notifications();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].kind, NotificationKind::Error);
        assert_eq!(notifications[0].message, "INTERNAL SERVER ERROR");
    }

    #[tokio::test]
    async fn bad_request_sets_field_errors() {
        let server = MockServer::new();
        server.respond(
            Method::Get,
            "/companies/search",
            Err(HttpError::Status {
                status: 400,
                status_text: "BAD REQUEST".to_string(),
                body: json!({"name": ["required"]}),
            }),
        );
        let (mut store, notifier) = store_with(server, vec![]);
        store.dispatch(Action::FetchCompanies);
        store.settle().await;

        let mut expected = FieldErrors::new();
        expected.insert(
            "name".to_string(),
            FieldError::Messages(vec!["required".to_string()]),
        );
        assert_eq!(store.state().errors, Some(expected));
        assert!(notifier.notifications().is_empty());
        assert!(!store.state().is_loading);
    }

    #[tokio::test]
    async fn search_encodes_query() {
        let server = MockServer::new();
        let (mut store, _) = store_with(server.clone(), vec![]);
        store.dispatch(Action::SetQuery("AAP & co".to_string()));
        store.dispatch(Action::FetchCompanies);
        store.settle().await;
        assert_eq!(
            server.requests()[0].path,
            "/companies/search?q=AAP%20%26%20co"
        );
    }

    #[test]
    fn stale_company_list_is_dropped() {
        let environment = mock::environment(MockServer::new(), true).0;
        let mut state = State::default();
        reduce(Action::FetchCompanies, &mut state, &environment);
        let stale = state.request_generation;
        reduce(Action::FetchCompanies, &mut state, &environment);
        let effect = reduce(
            Action::ReceivedCompanies {
                generation: stale,
                result: Ok(vec![company("old", Some("Old"))]),
            },
            &mut state,
            &environment,
        );
        assert!(effect.is_none());
        assert!(state.is_loading);
    }

    #[tokio::test]
    async fn delete_asks_first() {
        let server = MockServer::new();
        let (environment, _) = mock::environment(server.clone(), false);
        let mut store = Store::<CompaniesReducer>::new(State::default(), environment);
        store.dispatch(Action::GetCompanies(vec![company("7", Some("Seven"))]));
        store.dispatch(Action::Select(CompanyId::from("7")));
        store.dispatch(Action::DeleteCompany);
        store.settle().await;
        assert!(server.requests().is_empty());
        assert!(store.state().company_to_edit.is_some());
    }

    #[tokio::test]
    async fn delete_removes_and_reloads() {
        let server = MockServer::new();
        server.respond(Method::Get, "/companies/search", Ok(json!([])));
        let (mut store, notifier) = store_with(server.clone(), vec![company("7", Some("Seven"))]);
        store.dispatch(Action::Select(CompanyId::from("7")));
        store.dispatch(Action::DeleteCompany);
        store.settle().await;
        let requests = server.requests();
        assert_eq!(requests[0], Request::delete("/companies/7"));
        assert_eq!(requests[1].path, "/companies/search?q=");
        assert!(store.state().company_to_edit.is_none());
        assert!(store.state().companies().is_empty());
        assert_eq!(
            notifier.notifications(),
            vec![Notification::success("Company deleted successfully")]
        );
    }

    #[tokio::test]
    async fn saving_services_reloads_and_resyncs_draft() {
        let server = MockServer::new();
        server.respond(
            Method::Get,
            "/companies/search",
            Ok(json!([{"_id": "7", "name": "Seven", "services": {"wire": true}}])),
        );
        let (mut store, _) = store_with(server.clone(), vec![company("7", Some("Seven"))]);
        store.dispatch(Action::Select(CompanyId::from("7")));
        let services = BTreeMap::from([("wire".to_string(), true)]);
        store.dispatch(Action::SaveServices(services.clone()));
        store.settle().await;
        let requests = server.requests();
        assert_eq!(
            requests[0],
            Request::post("/companies/7/services", json!({"services": {"wire": true}}))
        );
        assert_eq!(requests[1].path, "/companies/search?q=");
        assert_eq!(
            store.state().company_to_edit.as_ref().map(|c| &c.services),
            Some(&services)
        );
    }

    #[test]
    fn users_of_a_previous_selection_are_dropped() {
        let environment = mock::environment(MockServer::new(), true).0;
        let mut state = State::default();
        reduce(
            Action::GetCompanies(vec![company("A", Some("Alpha")), company("B", Some("Beta"))]),
            &mut state,
            &environment,
        );
        let user = |id: &str| User {
            id: UserId::from(id),
            ..Default::default()
        };
        reduce(Action::Select(CompanyId::from("A")), &mut state, &environment);
        reduce(Action::Select(CompanyId::from("B")), &mut state, &environment);

        reduce(
            Action::GetCompanyUsers {
                company: CompanyId::from("B"),
                users: vec![user("b-user")],
            },
            &mut state,
            &environment,
        );
        reduce(
            Action::GetCompanyUsers {
                company: CompanyId::from("A"),
                users: vec![user("a-user")],
            },
            &mut state,
            &environment,
        );
        assert_eq!(state.active_company_id, Some(CompanyId::from("B")));
        assert_eq!(state.company_users, vec![user("b-user")]);
    }

    #[tokio::test]
    async fn users_response_carries_its_company() {
        let server = MockServer::new();
        server.respond(Method::Get, "/companies/A/users", Ok(json!([{"_id": "a-user"}])));
        let (mut store, _) = store_with(server, vec![company("A", Some("Alpha"))]);
        store.dispatch(Action::SelectCompany(CompanyId::from("A")));
        store.dispatch(Action::Select(CompanyId::from("B")));
        store.settle().await;
        assert!(store.state().company_users.is_empty());
    }

    #[test]
    fn failed_mutation_keeps_search_loading() {
        let environment = mock::environment(MockServer::new(), true).0;
        let mut state = State::default();
        reduce(Action::FetchCompanies, &mut state, &environment);
        let generation = state.request_generation;

        let effect = reduce(
            Action::RequestFailed(mock::status(500, "INTERNAL SERVER ERROR")),
            &mut state,
            &environment,
        );
        assert_eq!(effect.notifications().len(), 1);
        assert!(state.is_loading);

        reduce(
            Action::ReceivedCompanies {
                generation,
                result: Err(mock::status(502, "BAD GATEWAY")),
            },
            &mut state,
            &environment,
        );
        assert!(!state.is_loading);
    }

    #[test]
    fn init_view_data_hydrates() {
        let environment = mock::environment(MockServer::new(), true).0;
        let mut state = State::default();
        let effect = reduce(
            Action::InitViewData(CompanyViewData {
                companies: vec![company("1", Some("One"))],
                products: vec![Product {
                    name: "Wire".to_string(),
                    ..Default::default()
                }],
                services: vec![Service {
                    name: "Wire".to_string(),
                    code: "wire".to_string(),
                }],
            }),
            &mut state,
            &environment,
        );
        assert_eq!(effect.actions().len(), 2);
        assert_eq!(state.services.len(), 1);
    }

    #[test]
    fn cancel_clears_draft_and_errors() {
        let environment = mock::environment(MockServer::new(), true).0;
        let mut state = State {
            errors: Some(FieldErrors::new()),
            ..Default::default()
        };
        reduce(Action::NewCompany(Company::default()), &mut state, &environment);
        reduce(
            Action::EditCompany(CompanyChange::Section("wire".to_string(), true)),
            &mut state,
            &environment,
        );
        assert_eq!(
            state.company_to_edit.as_ref().map(|c| c.sections.len()),
            Some(1)
        );
        reduce(Action::CancelEdit, &mut state, &environment);
        assert!(state.company_to_edit.is_none());
        assert!(state.errors.is_none());
    }
}
