use super::piece::{Color, PieceKind};
use super::position::{Position, Preset, Square};
use std::collections::BTreeMap;

/// Metadata keys with a fixed meaning; everything else is kept as a custom key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MetadataKey {
    Title,
    Author,
    Source,
    OpusName,
    OpusNo,
    BlackName,
    WhiteName,
    StartDatetime,
    EndDatetime,
    Tournament,
    Place,
    TimeLimit,
    Length,
}

impl MetadataKey {
    /// Label used in KIF headers and the JKF `header` object.
    pub fn label(self) -> &'static str {
        match self {
            MetadataKey::Title => "表題",
            MetadataKey::Author => "作者",
            MetadataKey::Source => "出典",
            MetadataKey::OpusName => "作品名",
            MetadataKey::OpusNo => "作品番号",
            MetadataKey::BlackName => "先手",
            MetadataKey::WhiteName => "後手",
            MetadataKey::StartDatetime => "開始日時",
            MetadataKey::EndDatetime => "終了日時",
            MetadataKey::Tournament => "棋戦",
            MetadataKey::Place => "場所",
            MetadataKey::TimeLimit => "持ち時間",
            MetadataKey::Length => "手数",
        }
    }

    pub fn from_kif(label: &str) -> Option<MetadataKey> {
        match label {
            "表題" => Some(MetadataKey::Title),
            "作者" => Some(MetadataKey::Author),
            "出典" => Some(MetadataKey::Source),
            "作品名" => Some(MetadataKey::OpusName),
            "作品番号" => Some(MetadataKey::OpusNo),
            "先手" | "下手" => Some(MetadataKey::BlackName),
            "後手" | "上手" => Some(MetadataKey::WhiteName),
            "開始日時" => Some(MetadataKey::StartDatetime),
            "終了日時" => Some(MetadataKey::EndDatetime),
            "棋戦" => Some(MetadataKey::Tournament),
            "場所" => Some(MetadataKey::Place),
            "持ち時間" => Some(MetadataKey::TimeLimit),
            "手数" => Some(MetadataKey::Length),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    standard: BTreeMap<MetadataKey, String>,
    custom: BTreeMap<String, String>,
}

impl Metadata {
    pub fn get_standard(&self, key: MetadataKey) -> Option<&str> {
        self.standard.get(&key).map(String::as_str)
    }

    pub fn set_standard(&mut self, key: MetadataKey, value: impl Into<String>) {
        self.standard.insert(key, value.into());
    }

    pub fn get_custom(&self, key: &str) -> Option<&str> {
        self.custom.get(key).map(String::as_str)
    }

    pub fn set_custom(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.custom.insert(key.into(), value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.standard.is_empty() && self.custom.is_empty()
    }

    /// All entries keyed by their header label.
    pub fn labelled(&self) -> BTreeMap<String, String> {
        let mut out: BTreeMap<String, String> = self.custom.clone();
        for (key, value) in &self.standard {
            out.insert(key.label().to_string(), value.clone());
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitialPosition {
    Preset(Preset),
    Custom(Position),
}

impl InitialPosition {
    pub fn to_position(&self) -> Position {
        match self {
            InitialPosition::Preset(preset) => Position::from_preset(*preset),
            InitialPosition::Custom(position) => position.clone(),
        }
    }
}

/// Terminal entries that end a game record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialMove {
    Resign,
    Interrupt,
    Mate,
    NoMate,
    Repetition,
    Impasse,
    Timeout,
    IllegalWin,
    IllegalLoss,
    EnteringKing,
    Draw,
}

impl SpecialMove {
    pub fn from_kif(text: &str) -> Option<SpecialMove> {
        match text {
            "投了" => Some(SpecialMove::Resign),
            "中断" => Some(SpecialMove::Interrupt),
            "詰み" => Some(SpecialMove::Mate),
            "不詰" => Some(SpecialMove::NoMate),
            "千日手" => Some(SpecialMove::Repetition),
            "持将棋" => Some(SpecialMove::Impasse),
            "切れ負け" => Some(SpecialMove::Timeout),
            "反則勝ち" => Some(SpecialMove::IllegalWin),
            "反則負け" => Some(SpecialMove::IllegalLoss),
            "入玉勝ち" => Some(SpecialMove::EnteringKing),
            "引き分け" => Some(SpecialMove::Draw),
            _ => None,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            SpecialMove::Resign => "TORYO",
            SpecialMove::Interrupt => "CHUDAN",
            SpecialMove::Mate => "TSUMI",
            SpecialMove::NoMate => "FUZUMI",
            SpecialMove::Repetition => "SENNICHITE",
            SpecialMove::Impasse => "JISHOGI",
            SpecialMove::Timeout => "TIME_UP",
            SpecialMove::IllegalWin => "ILLEGAL_ACTION",
            SpecialMove::IllegalLoss => "ILLEGAL_MOVE",
            SpecialMove::EnteringKing => "KACHI",
            SpecialMove::Draw => "HIKIWAKE",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayedMove {
    pub color: Color,
    /// None for a drop.
    pub from: Option<Square>,
    pub to: Square,
    /// Kind before promotion.
    pub piece: PieceKind,
    pub same: bool,
    /// Some(true) for 成, Some(false) for 不成, None when the notation says neither.
    pub promote: Option<bool>,
    pub capture: Option<PieceKind>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveKind {
    Played(PlayedMove),
    Special(SpecialMove),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Move {
    pub kind: MoveKind,
    pub elapsed_ms: u64,
    pub comments: Vec<String>,
}

impl Move {
    pub fn new(kind: MoveKind, elapsed_ms: u64) -> Self {
        Self {
            kind,
            elapsed_ms,
            comments: Vec::new(),
        }
    }

    pub fn set_elapsed_ms(&mut self, elapsed_ms: u64) {
        self.elapsed_ms = elapsed_ms;
    }
}

/// One imported game or puzzle: metadata, starting position and the mainline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub metadata: Metadata,
    pub initial: InitialPosition,
    pub initial_comments: Vec<String>,
    pub moves: Vec<Move>,
}

impl Default for Record {
    fn default() -> Self {
        Self {
            metadata: Metadata::default(),
            initial: InitialPosition::Preset(Preset::Even),
            initial_comments: Vec::new(),
            moves: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labelled_prefers_standard_keys() {
        let mut metadata = Metadata::default();
        metadata.set_custom("表題", "custom");
        metadata.set_custom("備考", "note");
        metadata.set_standard(MetadataKey::Title, "standard");

        let labelled = metadata.labelled();
        assert_eq!(labelled.get("表題").map(String::as_str), Some("standard"));
        assert_eq!(labelled.get("備考").map(String::as_str), Some("note"));
    }

    #[test]
    fn test_sente_aliases() {
        assert_eq!(MetadataKey::from_kif("下手"), Some(MetadataKey::BlackName));
        assert_eq!(MetadataKey::from_kif("上手"), Some(MetadataKey::WhiteName));
        assert_eq!(MetadataKey::from_kif("備考"), None);
    }
}
