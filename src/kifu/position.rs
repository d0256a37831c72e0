use super::piece::{Color, Piece, PieceKind, HAND_KINDS};

/// A board square in shogi coordinates: file 1..=9 right to left, rank 1..=9 top to bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Square {
    pub file: u8,
    pub rank: u8,
}

impl Square {
    pub fn new(file: u8, rank: u8) -> Option<Self> {
        if (1..=9).contains(&file) && (1..=9).contains(&rank) {
            Some(Self { file, rank })
        } else {
            None
        }
    }

    fn index(self) -> (usize, usize) {
        (usize::from(self.file - 1), usize::from(self.rank - 1))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hand {
    counts: [u8; 7],
}

impl Hand {
    pub fn count(&self, kind: PieceKind) -> u8 {
        kind.hand_index().map(|i| self.counts[i]).unwrap_or(0)
    }

    pub fn add(&mut self, kind: PieceKind, n: u8) {
        if let Some(i) = kind.unpromoted().hand_index() {
            self.counts[i] = self.counts[i].saturating_add(n);
        }
    }

    /// Takes one piece of `kind` out of the hand; false if none is held.
    pub fn take(&mut self, kind: PieceKind) -> bool {
        match kind.hand_index() {
            Some(i) if self.counts[i] > 0 => {
                self.counts[i] -= 1;
                true
            }
            _ => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (PieceKind, u8)> + '_ {
        HAND_KINDS.iter().map(move |k| (*k, self.count(*k)))
    }
}

/// Named starting positions understood by the `手合割` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    Even,
    Lance,
    Bishop,
    Rook,
    RookLance,
    TwoPiece,
    FourPiece,
    SixPiece,
}

impl Preset {
    pub fn from_kif(label: &str) -> Option<Preset> {
        match label {
            "平手" => Some(Preset::Even),
            "香落ち" => Some(Preset::Lance),
            "角落ち" => Some(Preset::Bishop),
            "飛車落ち" => Some(Preset::Rook),
            "飛香落ち" => Some(Preset::RookLance),
            "二枚落ち" => Some(Preset::TwoPiece),
            "四枚落ち" => Some(Preset::FourPiece),
            "六枚落ち" => Some(Preset::SixPiece),
            _ => None,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Preset::Even => "HIRATE",
            Preset::Lance => "KY",
            Preset::Bishop => "KA",
            Preset::Rook => "HI",
            Preset::RookLance => "HIKY",
            Preset::TwoPiece => "2",
            Preset::FourPiece => "4",
            Preset::SixPiece => "6",
        }
    }

    /// Gote pieces removed from the even position.
    fn removed(self) -> &'static [(u8, u8)] {
        match self {
            Preset::Even => &[],
            Preset::Lance => &[(1, 1)],
            Preset::Bishop => &[(2, 2)],
            Preset::Rook => &[(8, 2)],
            Preset::RookLance => &[(8, 2), (1, 1)],
            Preset::TwoPiece => &[(8, 2), (2, 2)],
            Preset::FourPiece => &[(8, 2), (2, 2), (1, 1), (9, 1)],
            Preset::SixPiece => &[(8, 2), (2, 2), (1, 1), (9, 1), (2, 1), (8, 1)],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    board: [[Option<Piece>; 9]; 9],
    hands: [Hand; 2],
    turn: Color,
}

impl Default for Position {
    fn default() -> Self {
        Self::empty()
    }
}

impl Position {
    pub fn empty() -> Self {
        Self {
            board: [[None; 9]; 9],
            hands: [Hand::default(), Hand::default()],
            turn: Color::Black,
        }
    }

    pub fn from_preset(preset: Preset) -> Self {
        use PieceKind::*;
        const BACK_RANK: [PieceKind; 9] =
            [Lance, Knight, Silver, Gold, King, Gold, Silver, Knight, Lance];

        let mut pos = Self::empty();
        for file in 1..=9u8 {
            let back = BACK_RANK[usize::from(file - 1)];
            pos.place(file, 1, Color::White, back);
            pos.place(file, 3, Color::White, Pawn);
            pos.place(file, 7, Color::Black, Pawn);
            pos.place(file, 9, Color::Black, back);
        }
        pos.place(8, 2, Color::White, Rook);
        pos.place(2, 2, Color::White, Bishop);
        pos.place(8, 8, Color::Black, Bishop);
        pos.place(2, 8, Color::Black, Rook);

        for (file, rank) in preset.removed() {
            pos.place_none(*file, *rank);
        }
        if preset != Preset::Even {
            pos.turn = Color::White;
        }
        pos
    }

    fn place(&mut self, file: u8, rank: u8, color: Color, kind: PieceKind) {
        if let Some(sq) = Square::new(file, rank) {
            self.set(sq, Some(Piece::new(color, kind)));
        }
    }

    fn place_none(&mut self, file: u8, rank: u8) {
        if let Some(sq) = Square::new(file, rank) {
            self.set(sq, None);
        }
    }

    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        let (x, y) = sq.index();
        self.board[x][y]
    }

    pub fn set(&mut self, sq: Square, piece: Option<Piece>) {
        let (x, y) = sq.index();
        self.board[x][y] = piece;
    }

    pub fn hand(&self, color: Color) -> &Hand {
        &self.hands[color.index()]
    }

    pub fn hand_mut(&mut self, color: Color) -> &mut Hand {
        &mut self.hands[color.index()]
    }

    pub fn turn(&self) -> Color {
        self.turn
    }

    pub fn set_turn(&mut self, color: Color) {
        self.turn = color;
    }

    /// Plays a move for the side to move and returns the captured kind, if any.
    ///
    /// `piece` is the kind before promotion. `from == None` means a drop from hand.
    /// Only piece ownership and occupancy are checked, not piece movement geometry.
    pub fn apply(
        &mut self,
        from: Option<Square>,
        to: Square,
        piece: PieceKind,
        promote: bool,
    ) -> Result<Option<PieceKind>, String> {
        let color = self.turn;
        let target = self.piece_at(to);
        if let Some(occupant) = target {
            if occupant.color == color {
                return Err("destination holds own piece".to_string());
            }
        }

        let placed = match from {
            None => {
                if target.is_some() {
                    return Err("drop onto occupied square".to_string());
                }
                if promote {
                    return Err("dropped piece cannot promote".to_string());
                }
                if !self.hand_mut(color).take(piece) {
                    return Err(format!("no {} in hand", piece.code()));
                }
                piece
            }
            Some(origin) => {
                match self.piece_at(origin) {
                    Some(p) if p.color == color && p.kind == piece => {}
                    Some(p) if p.color == color => {
                        return Err(format!(
                            "origin holds {} not {}",
                            p.kind.code(),
                            piece.code()
                        ))
                    }
                    _ => return Err("origin has no piece to move".to_string()),
                }
                self.set(origin, None);
                if promote {
                    piece
                        .promoted()
                        .ok_or_else(|| format!("{} cannot promote", piece.code()))?
                } else {
                    piece
                }
            }
        };

        let captured = target.map(|p| p.kind);
        if let Some(kind) = captured {
            self.hand_mut(color).add(kind.unpromoted(), 1);
        }
        self.set(to, Some(Piece::new(color, placed)));
        self.turn = color.opposite();
        Ok(captured)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(file: u8, rank: u8) -> Square {
        Square::new(file, rank).unwrap()
    }

    #[test]
    fn test_even_position_layout() {
        let pos = Position::from_preset(Preset::Even);
        assert_eq!(
            pos.piece_at(sq(5, 9)),
            Some(Piece::new(Color::Black, PieceKind::King))
        );
        assert_eq!(
            pos.piece_at(sq(8, 2)),
            Some(Piece::new(Color::White, PieceKind::Rook))
        );
        assert_eq!(
            pos.piece_at(sq(2, 8)),
            Some(Piece::new(Color::Black, PieceKind::Rook))
        );
        assert_eq!(pos.turn(), Color::Black);
    }

    #[test]
    fn test_handicap_removes_gote_pieces_and_gote_moves_first() {
        let pos = Position::from_preset(Preset::TwoPiece);
        assert_eq!(pos.piece_at(sq(8, 2)), None);
        assert_eq!(pos.piece_at(sq(2, 2)), None);
        assert_eq!(pos.turn(), Color::White);
    }

    #[test]
    fn test_capture_goes_to_hand_unpromoted() {
        let mut pos = Position::empty();
        pos.set(sq(2, 3), Some(Piece::new(Color::Black, PieceKind::Silver)));
        pos.set(sq(2, 2), Some(Piece::new(Color::White, PieceKind::Horse)));

        let captured = pos
            .apply(Some(sq(2, 3)), sq(2, 2), PieceKind::Silver, true)
            .unwrap();

        assert_eq!(captured, Some(PieceKind::Horse));
        assert_eq!(pos.hand(Color::Black).count(PieceKind::Bishop), 1);
        assert_eq!(
            pos.piece_at(sq(2, 2)),
            Some(Piece::new(Color::Black, PieceKind::PromSilver))
        );
        assert_eq!(pos.turn(), Color::White);
    }

    #[test]
    fn test_drop_requires_piece_in_hand() {
        let mut pos = Position::empty();
        assert!(pos.apply(None, sq(5, 5), PieceKind::Gold, false).is_err());

        pos.hand_mut(Color::Black).add(PieceKind::Gold, 1);
        assert_eq!(pos.apply(None, sq(5, 5), PieceKind::Gold, false), Ok(None));
        assert_eq!(pos.hand(Color::Black).count(PieceKind::Gold), 0);
    }

    #[test]
    fn test_rejects_moving_opponent_piece() {
        let mut pos = Position::empty();
        pos.set(sq(1, 1), Some(Piece::new(Color::White, PieceKind::Lance)));
        assert!(pos.apply(Some(sq(1, 1)), sq(1, 2), PieceKind::Lance, false).is_err());
    }
}
