/// Side to move. Black (sente) always has JKF color 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Color {
    Black,
    White,
}

impl Color {
    pub fn opposite(self) -> Self {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Color::Black => 0,
            Color::White => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PieceKind {
    Pawn,
    Lance,
    Knight,
    Silver,
    Gold,
    Bishop,
    Rook,
    King,
    PromPawn,
    PromLance,
    PromKnight,
    PromSilver,
    Horse,
    Dragon,
}

/// Kinds that can sit in a hand, in JKF order.
pub const HAND_KINDS: [PieceKind; 7] = [
    PieceKind::Pawn,
    PieceKind::Lance,
    PieceKind::Knight,
    PieceKind::Silver,
    PieceKind::Gold,
    PieceKind::Bishop,
    PieceKind::Rook,
];

// Longest names first so that 成香 wins over 香.
const KIF_NAMES: [(&str, PieceKind); 19] = [
    ("成香", PieceKind::PromLance),
    ("成桂", PieceKind::PromKnight),
    ("成銀", PieceKind::PromSilver),
    ("歩", PieceKind::Pawn),
    ("香", PieceKind::Lance),
    ("桂", PieceKind::Knight),
    ("銀", PieceKind::Silver),
    ("金", PieceKind::Gold),
    ("角", PieceKind::Bishop),
    ("飛", PieceKind::Rook),
    ("玉", PieceKind::King),
    ("王", PieceKind::King),
    ("と", PieceKind::PromPawn),
    ("杏", PieceKind::PromLance),
    ("圭", PieceKind::PromKnight),
    ("全", PieceKind::PromSilver),
    ("馬", PieceKind::Horse),
    ("龍", PieceKind::Dragon),
    ("竜", PieceKind::Dragon),
];

impl PieceKind {
    /// CSA/JKF two-letter code.
    pub fn code(self) -> &'static str {
        match self {
            PieceKind::Pawn => "FU",
            PieceKind::Lance => "KY",
            PieceKind::Knight => "KE",
            PieceKind::Silver => "GI",
            PieceKind::Gold => "KI",
            PieceKind::Bishop => "KA",
            PieceKind::Rook => "HI",
            PieceKind::King => "OU",
            PieceKind::PromPawn => "TO",
            PieceKind::PromLance => "NY",
            PieceKind::PromKnight => "NK",
            PieceKind::PromSilver => "NG",
            PieceKind::Horse => "UM",
            PieceKind::Dragon => "RY",
        }
    }

    /// Strips a KIF piece name off the front of `text`, returning the kind and the rest.
    pub fn strip_kif_prefix(text: &str) -> Option<(PieceKind, &str)> {
        KIF_NAMES
            .iter()
            .find_map(|(name, kind)| text.strip_prefix(name).map(|rest| (*kind, rest)))
    }

    /// Parses a complete KIF piece name, e.g. `銀` or `成桂`.
    pub fn from_kif(name: &str) -> Option<PieceKind> {
        match Self::strip_kif_prefix(name) {
            Some((kind, "")) => Some(kind),
            _ => None,
        }
    }

    pub fn promoted(self) -> Option<PieceKind> {
        match self {
            PieceKind::Pawn => Some(PieceKind::PromPawn),
            PieceKind::Lance => Some(PieceKind::PromLance),
            PieceKind::Knight => Some(PieceKind::PromKnight),
            PieceKind::Silver => Some(PieceKind::PromSilver),
            PieceKind::Bishop => Some(PieceKind::Horse),
            PieceKind::Rook => Some(PieceKind::Dragon),
            _ => None,
        }
    }

    pub fn unpromoted(self) -> PieceKind {
        match self {
            PieceKind::PromPawn => PieceKind::Pawn,
            PieceKind::PromLance => PieceKind::Lance,
            PieceKind::PromKnight => PieceKind::Knight,
            PieceKind::PromSilver => PieceKind::Silver,
            PieceKind::Horse => PieceKind::Bishop,
            PieceKind::Dragon => PieceKind::Rook,
            other => other,
        }
    }

    pub fn hand_index(self) -> Option<usize> {
        HAND_KINDS.iter().position(|k| *k == self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    pub color: Color,
    pub kind: PieceKind,
}

impl Piece {
    pub fn new(color: Color, kind: PieceKind) -> Self {
        Self { color, kind }
    }
}
