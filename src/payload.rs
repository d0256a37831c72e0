use crate::kifu::{export_jkf, JsonKifu, MetadataKey, Record};
use serde::{Deserialize, Serialize};

/// Body of `POST /api/tsumes`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TsumeSubmission {
    pub data: TsumePayload,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TsumePayload {
    pub uid: String,
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    pub source: Option<String>,
    pub length: usize,
    pub game_id: i64,
    pub data: JsonKifu,
}

impl TsumePayload {
    pub fn from_record(record: &Record, uid: impl Into<String>) -> Self {
        let metadata = &record.metadata;
        let owned = |key: MetadataKey| metadata.get_standard(key).map(str::to_string);
        let data = export_jkf(record);
        Self {
            uid: uid.into(),
            title: owned(MetadataKey::Title),
            author: owned(MetadataKey::Author),
            source: owned(MetadataKey::Source),
            // Counts the leading start-position entry, like the exported `moves` array
            length: data.moves.len(),
            game_id: parse_game_id(metadata.get_standard(MetadataKey::OpusNo)),
            data,
        }
    }

    pub fn into_submission(self) -> TsumeSubmission {
        TsumeSubmission { data: self }
    }
}

/// Leading base-10 integer of the opus number; 0 when absent or not numeric.
///
/// Parsing stops at the first non-digit, so `"2024-01-01"` yields 2024.
pub fn parse_game_id(opus_no: Option<&str>) -> i64 {
    let Some(text) = opus_no else {
        return 0;
    };
    let text = text.trim_start();
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let digits: &str = digits
        .find(|c: char| !c.is_ascii_digit())
        .map(|end| &digits[..end])
        .unwrap_or(digits);
    match digits.parse::<i64>() {
        Ok(value) if negative => -value,
        Ok(value) => value,
        Err(_) => 0,
    }
}
