//! Selection and drag-fill state tracking.
//!
//! The tracker is an explicit state machine owned by the grid view:
//! `begin`/`update`/`finish`/`reset` mirror mouse down/move/up/Escape,
//! and renderers read immutable [`Rect`] snapshots. Input arrives as a
//! typed [`GridTarget`] payload from the rendering layer; the tracker
//! never inspects input devices or widget internals.

use crate::geometry::{CellPos, Rect};

/// What the pointer went down on. The rendering layer performs the
/// hit-test (cell vs. fill-handle marker) and only reports cells in
/// selectable columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridTarget {
    Cell { row: usize, column: usize },
    FillHandle { row: usize, column: usize },
}

/// Axis a spread drag is committed to. Spreading is never diagonal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillAxis {
    Rows,
    Columns,
}

/// In-progress drag-fill handle.
///
/// `start` is fixed at press time; only `current` advances with the
/// pointer. A committed `axis` means the drag has moved far enough to
/// apply on release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpreadHandle {
    pub start: CellPos,
    pub current: CellPos,
    pub axis: Option<FillAxis>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum DragState {
    #[default]
    Idle,
    Selecting,
    Spreading,
}

/// Frozen result of a completed spread drag, input to the fill planner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpreadOutcome {
    pub source: Rect,
    pub target: Rect,
    pub axis: FillAxis,
}

/// Tracks the rectangular cell selection and the optional spread handle.
#[derive(Debug, Default)]
pub struct SelectionTracker {
    state: DragState,
    /// Anchor cell of the in-progress selection; never moves once set.
    anchor: Option<CellPos>,
    selection: Option<Rect>,
    handle: Option<SpreadHandle>,
    /// Spread target frozen at the end of the last spread drag; stays
    /// visible until Escape or a new selection.
    spread: Option<Rect>,
}

impl SelectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selection(&self) -> Option<Rect> {
        self.selection
    }

    /// Spread rectangle to highlight: the live one while dragging, the
    /// frozen one after release.
    pub fn spread_rect(&self) -> Option<Rect> {
        self.live_spread_rect().or(self.spread)
    }

    pub fn is_selecting(&self) -> bool {
        self.state == DragState::Selecting
    }

    pub fn is_spreading(&self) -> bool {
        self.state == DragState::Spreading
    }

    /// Pointer press. A press on a cell always starts a fresh selection,
    /// discarding any previous one. A press on the fill handle with an
    /// existing selection starts a spread drag: the handle anchors at
    /// the selection's bottom-right corner, unless the press lands
    /// outside both the selection and the previous spread rectangle, in
    /// which case it anchors fresh at the pressed cell.
    pub fn begin(&mut self, target: GridTarget) {
        match target {
            GridTarget::Cell { row, column } => {
                let pos = CellPos::new(row, column);
                self.state = DragState::Selecting;
                self.anchor = Some(pos);
                self.selection = Some(Rect::cell(pos));
                self.handle = None;
                self.spread = None;
            }
            GridTarget::FillHandle { row, column } => {
                let Some(selection) = self.selection else {
                    return;
                };
                let pos = CellPos::new(row, column);
                let inside = selection.contains(column, row)
                    || self.spread.is_some_and(|s| s.contains(column, row));
                let start = if inside { selection.end } else { pos };
                self.state = DragState::Spreading;
                self.handle = Some(SpreadHandle {
                    start,
                    current: pos,
                    axis: None,
                });
                self.spread = None;
            }
        }
    }

    /// Pointer move. While selecting, only the selection's far corner
    /// follows the pointer. While spreading, the handle advances and
    /// the axis follows the dominant delta: rows iff |drow| > |dcol|,
    /// columns otherwise — equal deltas spread column-wise.
    pub fn update(&mut self, row: usize, column: usize) {
        match self.state {
            DragState::Idle => {}
            DragState::Selecting => {
                if let Some(anchor) = self.anchor {
                    self.selection =
                        Some(Rect::from_corners(anchor, CellPos::new(row, column)));
                }
            }
            DragState::Spreading => {
                if let Some(handle) = &mut self.handle {
                    handle.current = CellPos::new(row, column);
                    let drow = row.abs_diff(handle.start.row);
                    let dcol = column.abs_diff(handle.start.column);
                    handle.axis = if drow == 0 && dcol == 0 {
                        None
                    } else if drow > dcol {
                        Some(FillAxis::Rows)
                    } else {
                        Some(FillAxis::Columns)
                    };
                }
            }
        }
    }

    /// Pointer release. Finishing a plain selection freezes the
    /// rectangle and produces no outcome (no write). Finishing a spread
    /// with a committed axis produces the source and target rectangles
    /// for the fill planner: growth along the axis takes the union
    /// bound, while a drag that pulled the handle back inside the
    /// selection shrinks the target on that axis.
    pub fn finish(&mut self) -> Option<SpreadOutcome> {
        match self.state {
            DragState::Idle => None,
            DragState::Selecting => {
                self.state = DragState::Idle;
                None
            }
            DragState::Spreading => {
                self.state = DragState::Idle;
                let handle = self.handle.take()?;
                let source = self.selection?;
                let axis = handle.axis?;
                let target = Self::target_rect(&source, &handle, axis);
                self.spread = Some(target);
                Some(SpreadOutcome {
                    source,
                    target,
                    axis,
                })
            }
        }
    }

    /// Escape: drop selection, spread, and any in-progress drag.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn target_rect(source: &Rect, handle: &SpreadHandle, axis: FillAxis) -> Rect {
        let current = handle.current;
        match axis {
            FillAxis::Rows => {
                if current.row < source.end.row && current.row >= source.start.row {
                    // Handle pulled back inside the selection: shrink.
                    Rect {
                        start: source.start,
                        end: CellPos::new(current.row, source.end.column),
                    }
                } else {
                    let spread = Rect::from_corners(
                        CellPos::new(handle.start.row, source.start.column),
                        CellPos::new(current.row, source.end.column),
                    );
                    source.union(&spread)
                }
            }
            FillAxis::Columns => {
                if current.column < source.end.column && current.column >= source.start.column {
                    Rect {
                        start: source.start,
                        end: CellPos::new(source.end.row, current.column),
                    }
                } else {
                    let spread = Rect::from_corners(
                        CellPos::new(source.start.row, handle.start.column),
                        CellPos::new(source.end.row, current.column),
                    );
                    source.union(&spread)
                }
            }
        }
    }

    fn live_spread_rect(&self) -> Option<Rect> {
        let handle = self.handle?;
        let axis = handle.axis?;
        let source = self.selection?;
        Some(Self::target_rect(&source, &handle, axis))
    }
}
