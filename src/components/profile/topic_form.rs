use crate::environment::types::Topic;
use crate::helper::truncate_chars;

pub const TOPIC_NAME_MAXLENGTH: usize = 30;

#[derive(Clone, Debug, PartialEq)]
pub enum TopicChange {
    Label(String),
    Notifications(bool),
    /// Share with the company. Only offered when global topics are enabled.
    IsGlobal(bool),
}

impl TopicChange {
    pub fn apply(self, topic: &mut Topic, global_topics_enabled: bool) {
        match self {
            TopicChange::Label(label) => {
                topic.label = truncate_chars(&label, TOPIC_NAME_MAXLENGTH)
            }
            TopicChange::Notifications(on) => topic.notifications = on,
            TopicChange::IsGlobal(on) if global_topics_enabled => topic.is_global = on,
            TopicChange::IsGlobal(_) => {
                log::debug!("Global topics are disabled, keeping the topic private")
            }
        }
    }
}
