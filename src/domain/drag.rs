//! Drag gesture state machine.
//!
//! The machine is a pure transition function. Timer work is returned as a
//! [`TimerCommand`] for the owner to carry out, and each armed timer is
//! tagged with a pulse number so a late expiry from a superseded timer is
//! ignored.

use crate::domain::id::CardId;
use crate::domain::order::OrderMap;
use crate::domain::reorder::{self, MoveTarget};
use serde::{Deserialize, Serialize};

/// Where the gesture currently is
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DragPhase {
    #[default]
    Idle,
    Dragging {
        card: CardId,
    },
    /// `alive` drops to false when no hover pulse arrived within the
    /// timeout. Only the drop indicator reacts to it; the target is kept.
    Hovering {
        card: CardId,
        target: MoveTarget,
        alive: bool,
    },
}

/// Gesture events raised by the presentation layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DragEvent {
    StartDrag { card: CardId },
    EnterTarget { target: MoveTarget },
    OverTarget,
    HoverExpired { pulse: u64 },
    Drop,
    EndDrag,
}

/// Request to relocate `card`, emitted on a drop
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRequest {
    pub card: CardId,
    pub target: MoveTarget,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerCommand {
    /// Cancel any pending decay and schedule a new one tagged `pulse`
    Arm { pulse: u64 },
    Cancel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragTransition {
    pub state: DragState,
    pub timer: Option<TimerCommand>,
    pub request: Option<MoveRequest>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DragState {
    phase: DragPhase,
    pulse: u64,
}

impl DragState {
    pub fn phase(&self) -> &DragPhase {
        &self.phase
    }

    pub fn is_idle(&self) -> bool {
        self.phase == DragPhase::Idle
    }

    /// Card being dragged, if any
    pub fn dragging_card(&self) -> Option<&CardId> {
        match &self.phase {
            DragPhase::Idle => None,
            DragPhase::Dragging { card } | DragPhase::Hovering { card, .. } => Some(card),
        }
    }

    pub fn target(&self) -> Option<&MoveTarget> {
        match &self.phase {
            DragPhase::Hovering { target, .. } => Some(target),
            _ => None,
        }
    }

    /// Current pulse number; matches the most recently armed timer
    pub fn pulse(&self) -> u64 {
        self.pulse
    }

    pub fn is_hover_alive(&self) -> bool {
        matches!(self.phase, DragPhase::Hovering { alive: true, .. })
    }

    /// Whether the drop indicator should be drawn.
    ///
    /// Hidden once the hover decays, and for drop zones where dropping would
    /// not change the order (onto the card itself or the slot it already fills).
    pub fn indicator_visible(&self, order: &OrderMap) -> bool {
        match &self.phase {
            DragPhase::Hovering {
                card,
                target,
                alive: true,
            } => reorder::plan_move(order, card, target)
                .map(|patch| !patch.is_empty())
                .unwrap_or(false),
            _ => false,
        }
    }

    /// Applies one gesture event
    pub fn transition(&self, event: DragEvent) -> DragTransition {
        let mut next = self.clone();
        let mut timer = None;
        let mut request = None;

        match (event, &self.phase) {
            (DragEvent::StartDrag { card }, phase) => {
                if matches!(phase, DragPhase::Hovering { .. }) {
                    timer = Some(TimerCommand::Cancel);
                }
                next.phase = DragPhase::Dragging { card };
            }
            (
                DragEvent::EnterTarget { target },
                DragPhase::Dragging { card } | DragPhase::Hovering { card, .. },
            ) => {
                next.pulse += 1;
                timer = Some(TimerCommand::Arm { pulse: next.pulse });
                next.phase = DragPhase::Hovering {
                    card: card.clone(),
                    target,
                    alive: true,
                };
            }
            (DragEvent::OverTarget, DragPhase::Hovering { alive: true, .. }) => {
                next.pulse += 1;
                timer = Some(TimerCommand::Arm { pulse: next.pulse });
            }
            (
                DragEvent::HoverExpired { pulse },
                DragPhase::Hovering {
                    card,
                    target,
                    alive: true,
                },
            ) if pulse == self.pulse => {
                next.phase = DragPhase::Hovering {
                    card: card.clone(),
                    target: target.clone(),
                    alive: false,
                };
            }
            (DragEvent::Drop, DragPhase::Hovering { card, target, .. }) => {
                timer = Some(TimerCommand::Cancel);
                if target.id() != card {
                    request = Some(MoveRequest {
                        card: card.clone(),
                        target: target.clone(),
                    });
                }
                next.phase = DragPhase::Idle;
            }
            (DragEvent::Drop, DragPhase::Dragging { .. }) => {
                next.phase = DragPhase::Idle;
            }
            (DragEvent::EndDrag, DragPhase::Hovering { .. }) => {
                timer = Some(TimerCommand::Cancel);
                next.phase = DragPhase::Idle;
            }
            (DragEvent::EndDrag, _) => {
                next.phase = DragPhase::Idle;
            }
            (event, phase) => {
                tracing::trace!(?event, ?phase, "drag event ignored");
            }
        }

        if next.phase != self.phase {
            tracing::debug!(from = ?self.phase, to = ?next.phase, "drag transition");
        }

        DragTransition {
            state: next,
            timer,
            request,
        }
    }
}
