pub mod board;
pub mod card;
pub mod column;
pub mod drag;
pub mod filter;
pub mod id;
pub mod order;
pub mod reorder;

pub use board::{reduce, Action, BoardState, Effect, PersistRequest};
pub use card::Card;
pub use column::{Column, ColumnView};
pub use drag::{DragEvent, DragPhase, DragState, DragTransition, MoveRequest, TimerCommand};
pub use filter::CardFilter;
pub use id::{CardId, ColumnId, Identifier};
pub use order::{OrderMap, OrderPatch};
pub use reorder::{
    apply_patch, compute_append_patch, compute_insert_patch, compute_move_patch,
    compute_remove_patch, materialize, plan_move, MoveTarget,
};
