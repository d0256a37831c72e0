//! JSON Kifu Format export.
//!
//! The serialized form is the canonical export: struct fields serialize in
//! declaration order and every map is a `BTreeMap`, so equal records always
//! produce byte-identical JSON.

use super::piece::{Color, HAND_KINDS};
use super::position::{Position, Square};
use super::record::{InitialPosition, MoveKind, Record};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonKifu {
    pub header: BTreeMap<String, String>,
    pub initial: JkfInitial,
    pub moves: Vec<JkfMoveEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JkfInitial {
    pub preset: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<JkfState>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JkfState {
    pub color: u8,
    /// `board[file - 1][rank - 1]`
    pub board: Vec<Vec<JkfCell>>,
    pub hands: Vec<BTreeMap<String, u8>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JkfCell {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JkfMoveEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<Vec<String>>,
    #[serde(rename = "move", default, skip_serializing_if = "Option::is_none")]
    pub mv: Option<JkfMove>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<JkfTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JkfMove {
    pub color: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<JkfPlace>,
    pub to: JkfPlace,
    pub piece: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub same: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promote: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capture: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JkfPlace {
    pub x: u8,
    pub y: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JkfTime {
    pub now: JkfTimeNow,
    pub total: JkfTimeTotal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JkfTimeNow {
    pub m: u64,
    pub s: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JkfTimeTotal {
    pub h: u64,
    pub m: u64,
    pub s: u64,
}

fn color_code(color: Color) -> u8 {
    color.index() as u8
}

fn comments(list: &[String]) -> Option<Vec<String>> {
    if list.is_empty() {
        None
    } else {
        Some(list.to_vec())
    }
}

fn export_state(position: &Position) -> JkfState {
    let mut board = vec![vec![JkfCell::default(); 9]; 9];
    for (x, column) in board.iter_mut().enumerate() {
        for (y, cell) in column.iter_mut().enumerate() {
            let square = Square::new(x as u8 + 1, y as u8 + 1);
            if let Some(piece) = square.and_then(|sq| position.piece_at(sq)) {
                *cell = JkfCell {
                    color: Some(color_code(piece.color)),
                    kind: Some(piece.kind.code().to_string()),
                };
            }
        }
    }

    let hands: Vec<BTreeMap<String, u8>> = [Color::Black, Color::White]
        .iter()
        .map(|color| {
            HAND_KINDS
                .iter()
                .map(|kind| (kind.code().to_string(), position.hand(*color).count(*kind)))
                .collect::<BTreeMap<String, u8>>()
        })
        .collect();

    JkfState {
        color: color_code(position.turn()),
        board,
        hands,
    }
}

fn export_time(elapsed_ms: u64, total_ms: u64) -> JkfTime {
    let now = elapsed_ms / 1000;
    let total = total_ms / 1000;
    JkfTime {
        now: JkfTimeNow {
            m: now / 60,
            s: now % 60,
        },
        total: JkfTimeTotal {
            h: total / 3600,
            m: (total % 3600) / 60,
            s: total % 60,
        },
    }
}

/// Converts a record to its JKF structure.
pub fn export_jkf(record: &Record) -> JsonKifu {
    let initial = match &record.initial {
        InitialPosition::Preset(preset) => JkfInitial {
            preset: preset.code().to_string(),
            data: None,
        },
        InitialPosition::Custom(position) => JkfInitial {
            preset: "OTHER".to_string(),
            data: Some(export_state(position)),
        },
    };

    let mut moves = Vec::with_capacity(record.moves.len() + 1);
    moves.push(JkfMoveEntry {
        comments: comments(&record.initial_comments),
        ..JkfMoveEntry::default()
    });

    let mut totals = [0u64; 2];
    for mv in &record.moves {
        let entry = match &mv.kind {
            MoveKind::Played(played) => {
                let total = &mut totals[played.color.index()];
                *total = total.saturating_add(mv.elapsed_ms);
                JkfMoveEntry {
                    comments: comments(&mv.comments),
                    mv: Some(JkfMove {
                        color: color_code(played.color),
                        from: played.from.map(|sq| JkfPlace {
                            x: sq.file,
                            y: sq.rank,
                        }),
                        to: JkfPlace {
                            x: played.to.file,
                            y: played.to.rank,
                        },
                        piece: played.piece.code().to_string(),
                        same: played.same.then_some(true),
                        promote: played.promote,
                        capture: played.capture.map(|kind| kind.code().to_string()),
                    }),
                    time: Some(export_time(mv.elapsed_ms, *total)),
                    special: None,
                }
            }
            MoveKind::Special(special) => JkfMoveEntry {
                comments: comments(&mv.comments),
                special: Some(special.code().to_string()),
                ..JkfMoveEntry::default()
            },
        };
        moves.push(entry);
    }

    JsonKifu {
        header: record.metadata.labelled(),
        initial,
        moves,
    }
}

/// Canonical JSON text of a record.
pub fn export_jkf_string(record: &Record) -> serde_json::Result<String> {
    serde_json::to_string(&export_jkf(record))
}
