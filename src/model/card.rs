use serde::{Deserialize, Serialize};

/// A board card that has not been mirrored into the tracker yet, normalized
/// into the shape the tracker side needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingCard {
    pub id: String,
    pub summary: String,
    pub description: String,
    pub url: String,
    /// Login of the card's first member, empty when nobody is assigned.
    pub assignee: String,
}

/// A card outside the complete list; the universe for time write-back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenCard {
    pub id: String,
    pub url: String,
}

/// Declared value kind of a board custom field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Number,
    Date,
    Checkbox,
    List,
    #[serde(other)]
    Unknown,
}

impl FieldKind {
    /// Key used inside `{"value": {...}}` when writing a time value into an
    /// item of this kind. Dates, checkboxes and drop-downs cannot hold "2d".
    pub fn value_key(self) -> Option<&'static str> {
        match self {
            FieldKind::Text => Some("text"),
            FieldKind::Number => Some("number"),
            FieldKind::Date | FieldKind::Checkbox | FieldKind::List | FieldKind::Unknown => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Number => "number",
            FieldKind::Date => "date",
            FieldKind::Checkbox => "checkbox",
            FieldKind::List => "list",
            FieldKind::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDescriptor {
    pub id: String,
    pub kind: FieldKind,
}

/// Board fields receiving tracker time values. A slot is `None` when the
/// board has no field with the configured label.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TimeFieldDescriptors {
    pub estimate: Option<FieldDescriptor>,
    pub fact: Option<FieldDescriptor>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_kind_reads_trello_type_names() {
        let kinds: Vec<FieldKind> =
            serde_json::from_str(r#"["text","number","date","checkbox","list","rating"]"#)
                .unwrap();
        assert_eq!(
            kinds,
            vec![
                FieldKind::Text,
                FieldKind::Number,
                FieldKind::Date,
                FieldKind::Checkbox,
                FieldKind::List,
                FieldKind::Unknown,
            ]
        );
    }

    #[test]
    fn only_text_and_number_take_time_values() {
        assert_eq!(FieldKind::Text.value_key(), Some("text"));
        assert_eq!(FieldKind::Number.value_key(), Some("number"));
        assert_eq!(FieldKind::Date.value_key(), None);
        assert_eq!(FieldKind::Checkbox.value_key(), None);
        assert_eq!(FieldKind::List.value_key(), None);
    }
}
