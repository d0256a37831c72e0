//! Shogi record model with KIF import and JKF export.

pub mod jkf;
pub mod kif;
pub mod piece;
pub mod position;
pub mod record;

pub use jkf::{export_jkf, export_jkf_string, JsonKifu};
pub use kif::{import_kif, KifError};
pub use piece::{Color, Piece, PieceKind};
pub use position::{Hand, Position, Preset, Square};
pub use record::{
    InitialPosition, Metadata, MetadataKey, Move, MoveKind, PlayedMove, Record, SpecialMove,
};
