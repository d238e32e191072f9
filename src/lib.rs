//! # Kanban Order Core
//!
//! Ordering engine for kanban boards.
//!
//! Cards and columns are kept in order through a sparse map of successor
//! pointers. Moving an item produces a minimal patch (at most three keys)
//! that is applied locally right away and handed to a persistence backend
//! without waiting for it. A small state machine turns drag gestures into
//! moves, including the timed decay of the drop-target highlight.

pub mod config;
pub mod domain;
pub mod error;
pub mod session;
pub mod storage;

// Re-export commonly used types
pub use config::BoardConfig;
pub use domain::{
    board::{reduce, Action, BoardState},
    drag::{DragEvent, DragState},
    id::{CardId, ColumnId, Identifier},
    order::{OrderMap, OrderPatch},
    reorder::MoveTarget,
};
pub use error::{KanbanError, Result};
pub use session::BoardSession;
pub use storage::Storage;
