use serde::{Deserialize, Serialize};

/// Body of `POST /alert`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AlertRequest {
    pub to_phone: String,
    pub message: String,
}

/// Body of `POST /feedback`. Every field is optional, blank strings are sent as absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FeedbackRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub predicted_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
}

impl FeedbackRecord {
    pub fn new(
        image_id: Option<String>,
        predicted_label: Option<String>,
        correct_label: Option<String>,
        comments: Option<String>,
    ) -> Self {
        Self {
            image_id: non_blank(image_id),
            predicted_label: non_blank(predicted_label),
            correct_label: non_blank(correct_label),
            comments: non_blank(comments),
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &FeedbackRecord::default()
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Acknowledgement body. Only `status` and `message` are looked at.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Ack {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl Ack {
    pub fn is_rejection(&self) -> bool {
        self.status.as_deref() == Some("error")
    }
}
