//! KIF (Kifu for Windows) importer.
//!
//! Reads the header block, an optional BOD board diagram with hands, and the
//! mainline. Variations (`変化：`) are not imported; parsing stops at the first one.

use super::piece::{Color, Piece, PieceKind};
use super::position::{Hand, Position, Preset, Square};
use super::record::{
    InitialPosition, MetadataKey, Move, MoveKind, PlayedMove, Record, SpecialMove,
};
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

static MOVE_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\s*(\d+)\s+(\S.*?)\s*(?:\(\s*(\d+):(\d+)\s*/\s*(\d+):(\d+):(\d+)\s*\))?\s*\+?$",
    )
    .expect("move line pattern is valid")
});

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KifError {
    #[error("line {line}: unrecognised line `{text}`")]
    UnrecognisedLine { line: usize, text: String },

    #[error("line {line}: invalid board row: {reason}")]
    InvalidBoard { line: usize, reason: String },

    #[error("line {line}: board diagram is incomplete")]
    IncompleteBoard { line: usize },

    #[error("line {line}: invalid hand `{text}`")]
    InvalidHand { line: usize, text: String },

    #[error("line {line}: unknown handicap `{label}`")]
    UnknownHandicap { line: usize, label: String },

    #[error("line {line}: invalid move `{text}`: {reason}")]
    InvalidMove {
        line: usize,
        text: String,
        reason: String,
    },

    #[error("no header, board or moves found")]
    Empty,
}

/// Parses KIF text into a [`Record`].
pub fn import_kif(text: &str) -> Result<Record, KifError> {
    let mut parser = KifParser::default();
    let text = text.trim_start_matches('\u{feff}');
    for (index, line) in text.lines().enumerate() {
        if !parser.feed(index + 1, line)? {
            break;
        }
    }
    parser.finish()
}

#[derive(Default)]
struct KifParser {
    record: Record,
    saw_content: bool,
    preset: Option<Preset>,
    unknown_handicap: Option<(usize, String)>,
    board: Option<Position>,
    board_line: usize,
    board_rows: u8,
    in_board: bool,
    hands: [Option<Hand>; 2],
    turn: Option<Color>,
    replay: Option<Position>,
    last_to: Option<Square>,
    finished: bool,
}

impl KifParser {
    /// Returns false once the mainline is over.
    fn feed(&mut self, line_no: usize, line: &str) -> Result<bool, KifError> {
        let trimmed = line.trim();

        if self.in_board {
            if is_ruler(trimmed) {
                self.close_board(line_no)?;
            } else {
                self.push_row(line_no, trimmed)?;
            }
            return Ok(true);
        }

        if trimmed.is_empty()
            || trimmed.starts_with('#')
            || trimmed.starts_with('&')
            || trimmed.starts_with("まで")
            || trimmed.starts_with("手数--")
        {
            return Ok(true);
        }
        if trimmed.starts_with("変化") {
            return Ok(false);
        }
        if let Some(comment) = trimmed.strip_prefix('*') {
            self.push_comment(comment);
            return Ok(true);
        }
        if is_ruler(trimmed) {
            self.open_board(line_no)?;
            return Ok(true);
        }
        if is_file_labels(trimmed) {
            return Ok(true);
        }
        match trimmed {
            "先手番" | "下手番" => {
                self.turn = Some(Color::Black);
                return Ok(true);
            }
            "後手番" | "上手番" => {
                self.turn = Some(Color::White);
                return Ok(true);
            }
            _ => {}
        }
        if let Some(caps) = MOVE_LINE.captures(trimmed) {
            let text = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
            let elapsed_ms = match (caps.get(3), caps.get(4)) {
                (Some(m), Some(s)) => elapsed_millis(m.as_str(), s.as_str()).ok_or_else(|| {
                    KifError::InvalidMove {
                        line: line_no,
                        text: text.to_string(),
                        reason: "elapsed time out of range".to_string(),
                    }
                })?,
                _ => 0,
            };
            self.push_move(line_no, text, elapsed_ms)?;
            return Ok(true);
        }
        if let Some((key, value)) = split_header(trimmed) {
            self.push_header(line_no, key, value)?;
            return Ok(true);
        }

        Err(KifError::UnrecognisedLine {
            line: line_no,
            text: trimmed.to_string(),
        })
    }

    fn push_header(&mut self, line_no: usize, key: &str, value: &str) -> Result<(), KifError> {
        self.saw_content = true;
        let hand_slot = match key {
            "先手の持駒" | "下手の持駒" => Some(Color::Black),
            "後手の持駒" | "上手の持駒" => Some(Color::White),
            _ => None,
        };
        if let Some(color) = hand_slot {
            if self.replay.is_some() {
                return Err(KifError::InvalidHand {
                    line: line_no,
                    text: format!("{} after moves", key),
                });
            }
            let hand = parse_hand(value).ok_or_else(|| KifError::InvalidHand {
                line: line_no,
                text: value.to_string(),
            })?;
            self.hands[color.index()] = Some(hand);
            return Ok(());
        }

        if key == "手合割" {
            self.preset = Preset::from_kif(value);
            if self.preset.is_none() && value != "その他" {
                self.unknown_handicap = Some((line_no, value.to_string()));
            }
            return Ok(());
        }

        match MetadataKey::from_kif(key) {
            Some(standard) => self.record.metadata.set_standard(standard, value),
            None => self.record.metadata.set_custom(key, value),
        }
        Ok(())
    }

    fn open_board(&mut self, line_no: usize) -> Result<(), KifError> {
        if self.board.is_some() || self.replay.is_some() {
            return Err(KifError::InvalidBoard {
                line: line_no,
                reason: "unexpected second board diagram".to_string(),
            });
        }
        self.saw_content = true;
        self.in_board = true;
        self.board_line = line_no;
        self.board_rows = 0;
        self.board = Some(Position::empty());
        Ok(())
    }

    fn push_row(&mut self, line_no: usize, line: &str) -> Result<(), KifError> {
        let invalid = |reason: String| KifError::InvalidBoard {
            line: line_no,
            reason,
        };
        let row = parse_board_row(line).map_err(invalid)?;
        self.board_rows += 1;
        if self.board_rows > 9 {
            return Err(invalid("more than nine ranks".to_string()));
        }
        let rank = self.board_rows;
        if let Some(board) = self.board.as_mut() {
            for (file_index, piece) in row.iter().enumerate() {
                if let Some(sq) = Square::new(file_index as u8 + 1, rank) {
                    board.set(sq, *piece);
                }
            }
        }
        Ok(())
    }

    fn close_board(&mut self, line_no: usize) -> Result<(), KifError> {
        if self.board_rows != 9 {
            return Err(KifError::IncompleteBoard { line: line_no });
        }
        self.in_board = false;
        Ok(())
    }

    fn push_comment(&mut self, comment: &str) {
        match self.record.moves.last_mut() {
            Some(last) => last.comments.push(comment.to_string()),
            None => self.record.initial_comments.push(comment.to_string()),
        }
    }

    fn initial(&self) -> Result<InitialPosition, KifError> {
        if let Some(board) = &self.board {
            let mut position = board.clone();
            for color in [Color::Black, Color::White] {
                if let Some(hand) = &self.hands[color.index()] {
                    *position.hand_mut(color) = hand.clone();
                }
            }
            position.set_turn(self.turn.unwrap_or(Color::Black));
            return Ok(InitialPosition::Custom(position));
        }
        if let Some((line, label)) = &self.unknown_handicap {
            return Err(KifError::UnknownHandicap {
                line: *line,
                label: label.clone(),
            });
        }
        Ok(InitialPosition::Preset(self.preset.unwrap_or(Preset::Even)))
    }

    fn push_move(&mut self, line_no: usize, text: &str, elapsed_ms: u64) -> Result<(), KifError> {
        let invalid = |reason: String| KifError::InvalidMove {
            line: line_no,
            text: text.to_string(),
            reason,
        };
        if self.finished {
            return Err(invalid("move after end of game".to_string()));
        }
        self.saw_content = true;

        if self.replay.is_none() {
            let initial = self.initial()?;
            self.replay = Some(initial.to_position());
            self.record.initial = initial;
        }

        if let Some(special) = SpecialMove::from_kif(text) {
            self.record
                .moves
                .push(Move::new(MoveKind::Special(special), elapsed_ms));
            self.finished = true;
            return Ok(());
        }

        let parsed = parse_move_text(text, self.last_to).map_err(invalid)?;
        let replay = match self.replay.as_mut() {
            Some(replay) => replay,
            None => return Err(invalid("no starting position".to_string())),
        };
        let color = replay.turn();

        let from = match (parsed.drop, parsed.from) {
            (true, _) => None,
            (false, Some(origin)) => Some(origin),
            (false, None) => {
                // Some writers omit 打 when the only way to reach the square is a drop.
                if replay.hand(color).count(parsed.piece) > 0 && replay.piece_at(parsed.to).is_none() {
                    None
                } else {
                    return Err(invalid("missing origin square".to_string()));
                }
            }
        };

        let capture = replay
            .apply(from, parsed.to, parsed.piece, parsed.promote == Some(true))
            .map_err(invalid)?;

        self.record.moves.push(Move::new(
            MoveKind::Played(PlayedMove {
                color,
                from,
                to: parsed.to,
                piece: parsed.piece,
                same: parsed.same,
                promote: if from.is_some() { parsed.promote } else { None },
                capture,
            }),
            elapsed_ms,
        ));
        self.last_to = Some(parsed.to);
        Ok(())
    }

    fn finish(self) -> Result<Record, KifError> {
        if self.in_board {
            return Err(KifError::IncompleteBoard {
                line: self.board_line,
            });
        }
        if !self.saw_content {
            return Err(KifError::Empty);
        }
        let initial = if self.replay.is_none() {
            Some(self.initial()?)
        } else {
            None
        };
        let mut record = self.record;
        if let Some(initial) = initial {
            record.initial = initial;
        }
        Ok(record)
    }
}

#[derive(Debug, PartialEq, Eq)]
struct ParsedMove {
    to: Square,
    same: bool,
    piece: PieceKind,
    promote: Option<bool>,
    drop: bool,
    from: Option<Square>,
}

fn parse_move_text(text: &str, last_to: Option<Square>) -> Result<ParsedMove, String> {
    let (to, same, rest) = if let Some(rest) = text.strip_prefix('同') {
        let to = last_to.ok_or_else(|| "同 with no previous move".to_string())?;
        (to, true, rest.trim_start())
    } else {
        let mut chars = text.chars();
        let file = chars
            .next()
            .and_then(file_digit)
            .ok_or_else(|| "missing destination file".to_string())?;
        let rank = chars
            .next()
            .and_then(rank_digit)
            .ok_or_else(|| "missing destination rank".to_string())?;
        let to = Square::new(file, rank).ok_or_else(|| "destination off board".to_string())?;
        (to, false, chars.as_str())
    };

    let (piece, mut rest) =
        PieceKind::strip_kif_prefix(rest).ok_or_else(|| "unknown piece".to_string())?;

    let mut promote = None;
    let mut drop = false;
    if let Some(r) = rest.strip_prefix("不成").or_else(|| rest.strip_prefix('生')) {
        promote = Some(false);
        rest = r;
    } else if let Some(r) = rest.strip_prefix('成') {
        promote = Some(true);
        rest = r;
    } else if let Some(r) = rest.strip_prefix('打') {
        drop = true;
        rest = r;
    }

    let mut from = None;
    if let Some(r) = rest.strip_prefix('(') {
        let (inside, after) = r
            .split_once(')')
            .ok_or_else(|| "unclosed origin".to_string())?;
        let mut digits = inside.chars();
        let origin = match (
            digits.next().and_then(|c| c.to_digit(10)),
            digits.next().and_then(|c| c.to_digit(10)),
            digits.next(),
        ) {
            (Some(file), Some(rank), None) => Square::new(file as u8, rank as u8),
            _ => None,
        };
        from = Some(origin.ok_or_else(|| format!("invalid origin `{}`", inside))?);
        rest = after;
    }

    if !rest.trim().is_empty() {
        return Err(format!("unexpected trailing text `{}`", rest.trim()));
    }
    if drop && from.is_some() {
        return Err("drop with an origin square".to_string());
    }

    Ok(ParsedMove {
        to,
        same,
        piece,
        promote,
        drop,
        from,
    })
}

fn file_digit(c: char) -> Option<u8> {
    match c {
        '１'..='９' => Some((c as u32 - '１' as u32 + 1) as u8),
        '1'..='9' => c.to_digit(10).map(|d| d as u8),
        _ => None,
    }
}

fn rank_digit(c: char) -> Option<u8> {
    kanji_digit(c).or_else(|| file_digit(c))
}

fn kanji_digit(c: char) -> Option<u8> {
    "一二三四五六七八九"
        .chars()
        .position(|d| d == c)
        .map(|i| i as u8 + 1)
}

fn single_kanji_digit(s: &str) -> Option<u8> {
    let mut chars = s.chars();
    let digit = kanji_digit(chars.next()?)?;
    match chars.next() {
        None => Some(digit),
        Some(_) => None,
    }
}

/// Kanji counts up to 99, e.g. `三`, `十`, `十七`.
fn parse_kanji_number(s: &str) -> Option<u8> {
    match s.split_once('十') {
        None => single_kanji_digit(s),
        Some((tens, ones)) => {
            let tens = if tens.is_empty() { 1 } else { single_kanji_digit(tens)? };
            let ones = if ones.is_empty() { 0 } else { single_kanji_digit(ones)? };
            Some(tens * 10 + ones)
        }
    }
}

fn parse_hand(value: &str) -> Option<Hand> {
    let mut hand = Hand::default();
    let value = value.trim();
    if value.is_empty() || value == "なし" {
        return Some(hand);
    }
    for token in value.split(char::is_whitespace).filter(|t| !t.is_empty()) {
        let (kind, count) = PieceKind::strip_kif_prefix(token)?;
        kind.hand_index()?;
        let count = if count.is_empty() {
            1
        } else {
            parse_kanji_number(count)?
        };
        hand.add(kind, count);
    }
    Some(hand)
}

/// One BOD rank; the result is indexed by file - 1.
fn parse_board_row(line: &str) -> Result<[Option<Piece>; 9], String> {
    let inner = line
        .strip_prefix('|')
        .ok_or_else(|| "row must start with |".to_string())?;
    let end = inner
        .find('|')
        .ok_or_else(|| "row must end with |".to_string())?;
    let cells: Vec<char> = inner[..end].chars().collect();
    if cells.len() != 18 {
        return Err(format!("expected 9 cells, found {} characters", cells.len()));
    }

    let mut row = [None; 9];
    for (column, cell) in cells.chunks(2).enumerate() {
        if cell[1] == '・' {
            continue;
        }
        let color = match cell[0] {
            ' ' | '^' => Color::Black,
            'v' | 'V' => Color::White,
            other => return Err(format!("unknown side marker `{}`", other)),
        };
        let kind = PieceKind::from_kif(cell[1].encode_utf8(&mut [0; 4]))
            .ok_or_else(|| format!("unknown piece `{}`", cell[1]))?;
        // The leftmost column is file 9.
        row[8 - column] = Some(Piece::new(color, kind));
    }
    Ok(row)
}

fn is_ruler(line: &str) -> bool {
    line.len() > 2 && line.starts_with('+') && line.ends_with('+') && line.contains('-')
}

fn is_file_labels(line: &str) -> bool {
    line.chars().any(|c| file_digit(c).is_some())
        && line.chars().all(|c| c.is_whitespace() || file_digit(c).is_some())
}

/// `m:ss` to milliseconds; None when a field does not fit.
fn elapsed_millis(minutes: &str, seconds: &str) -> Option<u64> {
    let minutes: u64 = minutes.parse().ok()?;
    let seconds: u64 = seconds.parse().ok()?;
    minutes.checked_mul(60)?.checked_add(seconds)?.checked_mul(1000)
}

fn split_header(line: &str) -> Option<(&str, &str)> {
    let index = line.find(|c| c == '：' || c == ':')?;
    let key = line[..index].trim();
    if key.is_empty() {
        return None;
    }
    let separator_len = line[index..].chars().next().map(char::len_utf8).unwrap_or(1);
    Some((key, line[index + separator_len..].trim()))
}
