use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

// Identifiers

macro_rules! identifier {
    ($name:ident) => {
        #[derive(
            Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

identifier!(ItemId);
identifier!(CompanyId);
identifier!(TopicId);
identifier!(UserId);
identifier!(ProductId);

/// Treat an explicit `null` the same as a missing field
fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + DeserializeOwned,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// Content

#[derive(
    Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize, Display, IntoStaticStr,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ContentType {
    #[default]
    Text,
    Picture,
    Video,
    Audio,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rendition {
    pub href: String,
    pub mimetype: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Version {
    Number(i64),
    Text(String),
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Article {
    #[serde(rename = "_id")]
    pub id: ItemId,
    #[serde(default)]
    pub guid: String,
    #[serde(rename = "type", default)]
    pub content_type: ContentType,
    #[serde(default)]
    pub slugline: String,
    #[serde(default)]
    pub headline: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub versioncreated: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<Version>,
    #[serde(default, deserialize_with = "null_default")]
    pub ancestors: Vec<ItemId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nextversion: Option<ItemId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anpa_take_key: Option<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub associations: BTreeMap<String, Article>,
    #[serde(default, deserialize_with = "null_default")]
    pub renditions: BTreeMap<String, Rendition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<Map<String, Value>>,
    #[serde(default, deserialize_with = "null_default")]
    pub es_highlight: BTreeMap<String, Vec<String>>,
    /// Local display flag, never sent to or received from the backend
    #[serde(skip)]
    pub deleted: bool,
}

impl Article {
    pub fn rendition(&self, name: &str) -> Option<&Rendition> {
        self.renditions.get(name)
    }

    pub fn association(&self, key: &str) -> Option<&Article> {
        self.associations.get(key)
    }

    /// The first search highlight fragment for `field`, if the search
    /// returned one
    pub fn highlighted(&self, field: &str) -> Option<&str> {
        self.es_highlight
            .get(field)
            .and_then(|fragments| fragments.first())
            .map(String::as_str)
    }

    pub fn headline_html(&self) -> &str {
        self.highlighted("headline").unwrap_or(&self.headline)
    }

    /// The backend sends either RFC 3339 or `2023-01-01T10:00:00+0000`
    pub fn version_created(&self) -> Option<DateTime<Utc>> {
        let raw = self.versioncreated.as_str();
        DateTime::parse_from_rfc3339(raw)
            .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%z"))
            .map(|d| d.with_timezone(&Utc))
            .ok()
            .or_else(|| {
                NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
                    .ok()
                    .map(|n| n.and_utc())
            })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Meta {
    #[serde(default)]
    pub total: u64,
}

/// One page of search results
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    #[serde(rename = "_items", default = "Vec::new")]
    pub items: Vec<T>,
    #[serde(rename = "_meta", default)]
    pub meta: Meta,
    #[serde(
        rename = "_aggregations",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub aggregations: Option<Value>,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            meta: Meta::default(),
            aggregations: None,
        }
    }
}

/// Some endpoints answer with a page, some with a bare list
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum Listing<T> {
    Page(Page<T>),
    Items(Vec<T>),
}

impl<T> Listing<T> {
    pub fn into_items(self) -> Vec<T> {
        match self {
            Listing::Page(page) => page.items,
            Listing::Items(items) => items,
        }
    }
}

// Topics

#[derive(
    Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize, Display,
    IntoStaticStr, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TopicType {
    #[default]
    Wire,
    Agenda,
    Monitoring,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Topic {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<TopicId>,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub topic_type: TopicType,
    #[serde(default)]
    pub is_global: bool,
    #[serde(default)]
    pub notifications: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<Value>,
    #[serde(default, deserialize_with = "null_default")]
    pub navigation: Vec<String>,
    #[serde(rename = "_created", default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<CompanyId>,
    #[serde(default, deserialize_with = "null_default")]
    pub subscribers: Vec<UserId>,
}

// Companies and users

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyProduct {
    #[serde(rename = "_id")]
    pub id: ProductId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    #[serde(default)]
    pub seats: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Company {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<CompanyId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sd_subscriber_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default)]
    pub is_enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_type: Option<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub sections: BTreeMap<String, bool>,
    #[serde(default, deserialize_with = "null_default")]
    pub services: BTreeMap<String, bool>,
    #[serde(default, deserialize_with = "null_default")]
    pub products: Vec<CompanyProduct>,
    #[serde(default, deserialize_with = "null_default")]
    pub allowed_ip_list: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monitoring_administrator: Option<UserId>,
}

impl Company {
    /// Records listed before their details arrive carry no name yet
    pub fn has_name(&self) -> bool {
        self.name.as_deref().is_some_and(|n| !n.is_empty())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: UserId,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<CompanyId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_type: Option<String>,
    #[serde(default)]
    pub is_enabled: bool,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: ProductId,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_type: Option<String>,
    #[serde(default)]
    pub is_enabled: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub name: String,
    pub code: String,
}

// Session payloads

#[derive(
    Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize, Display, IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Context {
    #[default]
    Wire,
    Agenda,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Format {
    pub format: String,
    pub name: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Navigation {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_type: Option<String>,
}

/// The server rendered payload a wire or agenda page starts with.
/// Every field may be missing or `null`.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct WireData {
    pub user: Option<User>,
    pub company: Option<CompanyId>,
    #[serde(deserialize_with = "null_default")]
    pub topics: Vec<Topic>,
    #[serde(deserialize_with = "null_default")]
    pub bookmarks: bool,
    #[serde(deserialize_with = "null_default")]
    pub formats: Vec<Format>,
    #[serde(deserialize_with = "null_default")]
    pub navigations: Vec<Navigation>,
    pub context: Option<Context>,
    pub saved_items: Option<u64>,
    #[serde(rename = "userSections", deserialize_with = "null_default")]
    pub user_sections: Map<String, Value>,
    #[serde(deserialize_with = "null_default")]
    pub ui_config: Map<String, Value>,
    #[serde(deserialize_with = "null_default")]
    pub groups: Vec<Value>,
}

/// The server rendered payload of the user profile pane
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ProfileData {
    pub user: Option<User>,
    pub company: Option<CompanyId>,
    #[serde(deserialize_with = "null_default")]
    pub topics: Vec<Topic>,
    #[serde(deserialize_with = "null_default")]
    pub monitoring_list: Vec<Topic>,
    pub monitoring_administrator: Option<UserId>,
    #[serde(deserialize_with = "null_default")]
    pub global_topics_enabled: bool,
    pub context: Option<Context>,
}

/// Ids of items the user has already read, keyed by item id
pub fn read_item_ids(read_data: &Map<String, Value>) -> BTreeSet<ItemId> {
    read_data
        .iter()
        .filter(|(_, v)| !matches!(v, Value::Null | Value::Bool(false)))
        .map(|(k, _)| ItemId(k.clone()))
        .collect()
}

// Filters

#[derive(
    Copy,
    Clone,
    Debug,
    Eq,
    PartialEq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    IntoStaticStr,
    EnumIter,
)]
pub enum CoverageStatus {
    #[serde(rename = "planned")]
    #[strum(serialize = "planned")]
    Planned,
    #[serde(rename = "may be")]
    #[strum(serialize = "may be")]
    MayBe,
    #[serde(rename = "not intended")]
    #[strum(serialize = "not intended")]
    NotIntended,
    #[serde(rename = "not planned")]
    #[strum(serialize = "not planned")]
    NotPlanned,
    #[serde(rename = "completed")]
    #[strum(serialize = "completed")]
    Completed,
}

// Validation

/// Either one message or a list of messages for a form field
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldError {
    Message(String),
    Messages(Vec<String>),
}

impl FieldError {
    pub fn messages(&self) -> impl Iterator<Item = &str> {
        let slice: &[String] = match self {
            FieldError::Message(m) => std::slice::from_ref(m),
            FieldError::Messages(m) => m,
        };
        slice.iter().map(String::as_str)
    }
}

pub type FieldErrors = BTreeMap<String, FieldError>;

// Notifications

#[derive(Copy, Clone, Debug, Eq, PartialEq, Display)]
pub enum NotificationKind {
    Success,
    Error,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Error,
            message: message.into(),
        }
    }
}

// Menu

#[derive(
    Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize, Display, IntoStaticStr,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Menu {
    #[default]
    Profile,
    Topics,
    Events,
    Monitoring,
}

impl Menu {
    /// The kind of topic listed under this menu
    pub fn topic_type(&self) -> Option<TopicType> {
        match self {
            Menu::Topics => Some(TopicType::Wire),
            Menu::Events => Some(TopicType::Agenda),
            Menu::Monitoring => Some(TopicType::Monitoring),
            Menu::Profile => None,
        }
    }
}

/// Events that originate outside of the reducers: the document, the
/// platform menu, a reload request
#[derive(Clone, Debug, PartialEq)]
pub enum AppEvent {
    /// The `manage_topics` document event
    ManageTopics,
    MenuChanged(Menu),
    Reload,
}
