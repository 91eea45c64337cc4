use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum QuestionType {
    #[default]
    Text,
    Email,
    Textarea,
    Radio,
    Checkbox,
    Select,
}

impl QuestionType {
    /// Radio, checkbox and select questions carry an option list.
    pub fn has_options(&self) -> bool {
        matches!(self, QuestionType::Radio | QuestionType::Checkbox | QuestionType::Select)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    #[serde(rename = "type")]
    pub type_: QuestionType,
    pub name: String,
    pub label: String,
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}
