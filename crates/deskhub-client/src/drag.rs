//! Drag session lifecycle.
//!
//! At most one [`DragSession`] exists at a time and it is owned by the
//! [`DragController`]. A press creates a pressed session; once the pointer
//! travels past the threshold the session becomes active and raises the
//! shared [`DragIndicator`]. The indicator is held through a guard stored
//! in the session, so every path that discards the session (release,
//! cancel, controller drop) also lowers it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use deskhub_core::types::ItemId;
use deskhub_entity::{Item, Position};
use tracing::debug;

use crate::error::DragError;
use crate::target::{DropTarget, DropTargetResolver, Resolution};

/// Where a dragged item came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragSource {
    Desktop,
    Folder(ItemId),
}

impl DragSource {
    fn of(item: &Item) -> Self {
        match item.parent_id {
            Some(folder_id) => Self::Folder(folder_id),
            None => Self::Desktop,
        }
    }
}

/// Externally visible phase of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragPhase {
    Idle,
    /// Pointer is down but has not yet moved past the threshold.
    Pressed,
    Active,
}

/// What a completed gesture asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragOutcome {
    /// A click: the pointer never left the threshold.
    Select(ItemId),
    MovedToFolder { item_id: ItemId, folder_id: ItemId },
    MovedToDesktop { item_id: ItemId, position: Position },
    NoOp,
}

/// Shared "something is being dragged" flag for renderers and targets.
#[derive(Debug, Clone, Default)]
pub struct DragIndicator {
    raised: Arc<AtomicBool>,
}

impl DragIndicator {
    pub fn is_dragging(&self) -> bool {
        self.raised.load(Ordering::Acquire)
    }

    fn raise(&self) -> DraggingGuard {
        self.raised.store(true, Ordering::Release);
        DraggingGuard {
            raised: self.raised.clone(),
        }
    }
}

/// Lowers the indicator when dropped.
#[derive(Debug)]
struct DraggingGuard {
    raised: Arc<AtomicBool>,
}

impl Drop for DraggingGuard {
    fn drop(&mut self) {
        self.raised.store(false, Ordering::Release);
    }
}

/// One in-progress gesture.
#[derive(Debug)]
pub struct DragSession {
    item_id: ItemId,
    source: DragSource,
    /// Item position at press time, used for desktop repositioning.
    item_origin: Position,
    origin_pointer: Position,
    current_pointer: Position,
    candidate: Option<DropTarget>,
    dragging: Option<DraggingGuard>,
}

impl DragSession {
    pub fn item_id(&self) -> ItemId {
        self.item_id
    }

    pub fn source(&self) -> DragSource {
        self.source
    }

    pub fn candidate(&self) -> Option<DropTarget> {
        self.candidate
    }

    pub fn current_pointer(&self) -> Position {
        self.current_pointer
    }

    fn is_active(&self) -> bool {
        self.dragging.is_some()
    }

    /// Where the item lands on the desktop if released at `pointer`.
    fn desktop_position(&self, pointer: Position) -> Position {
        match self.source {
            // Keep the grab offset so the icon moves with the pointer.
            DragSource::Desktop => self
                .item_origin
                .translate(pointer.offset_from(self.origin_pointer)),
            DragSource::Folder(_) => pointer,
        }
    }
}

/// Owner of the single drag session.
#[derive(Debug)]
pub struct DragController {
    threshold: i32,
    resolver: DropTargetResolver,
    indicator: DragIndicator,
    session: Mutex<Option<DragSession>>,
}

impl DragController {
    /// A controller that treats displacements above `threshold_px` as drags.
    pub fn new(threshold_px: i32, resolver: DropTargetResolver) -> Self {
        Self {
            threshold: threshold_px.max(0),
            resolver,
            indicator: DragIndicator::default(),
            session: Mutex::new(None),
        }
    }

    pub fn indicator(&self) -> DragIndicator {
        self.indicator.clone()
    }

    pub fn phase(&self) -> DragPhase {
        match self.lock().as_ref() {
            None => DragPhase::Idle,
            Some(session) if session.is_active() => DragPhase::Active,
            Some(_) => DragPhase::Pressed,
        }
    }

    /// The hovered target of the active session.
    pub fn candidate(&self) -> Option<DropTarget> {
        self.lock().as_ref().and_then(DragSession::candidate)
    }

    pub fn dragged_item(&self) -> Option<ItemId> {
        self.lock().as_ref().map(DragSession::item_id)
    }

    /// Press on `item` at `pointer`. Refused while another session exists.
    pub fn begin_drag(&self, item: &Item, pointer: Position) -> Result<(), DragError> {
        let mut slot = self.lock();
        if let Some(existing) = slot.as_ref() {
            return Err(DragError::AlreadyActive(existing.item_id));
        }

        *slot = Some(DragSession {
            item_id: item.id,
            source: DragSource::of(item),
            item_origin: item.position,
            origin_pointer: pointer,
            current_pointer: pointer,
            candidate: None,
            dragging: None,
        });
        debug!(item_id = %item.id, x = pointer.x, y = pointer.y, "Drag pressed");
        Ok(())
    }

    /// Record pointer movement and return the hovered target.
    pub fn update_pointer(&self, pointer: Position) -> Option<DropTarget> {
        let mut slot = self.lock();
        let session = slot.as_mut()?;
        self.advance(session, pointer);
        session.candidate
    }

    /// Release at `pointer`. Always leaves the controller idle.
    pub fn end_drag(&self, pointer: Position) -> DragOutcome {
        let Some(mut session) = self.lock().take() else {
            return DragOutcome::NoOp;
        };
        self.advance(&mut session, pointer);

        if !session.is_active() {
            return DragOutcome::Select(session.item_id);
        }

        let outcome = match self.resolver.resolve_for(pointer, session.item_id) {
            Resolution::SelfDrop => DragOutcome::NoOp,
            Resolution::Target(DropTarget::Folder(folder_id)) => {
                if session.source == DragSource::Folder(folder_id) {
                    DragOutcome::NoOp
                } else {
                    DragOutcome::MovedToFolder {
                        item_id: session.item_id,
                        folder_id,
                    }
                }
            }
            Resolution::Target(DropTarget::Desktop) | Resolution::Nothing => {
                let position = session.desktop_position(pointer);
                if session.source == DragSource::Desktop && position == session.item_origin {
                    DragOutcome::NoOp
                } else {
                    DragOutcome::MovedToDesktop {
                        item_id: session.item_id,
                        position,
                    }
                }
            }
        };

        debug!(item_id = %session.item_id, ?outcome, "Drag released");
        outcome
    }

    /// Discard any session without producing an outcome.
    pub fn cancel(&self) {
        if let Some(session) = self.lock().take() {
            debug!(item_id = %session.item_id, "Drag cancelled");
        }
    }

    fn advance(&self, session: &mut DragSession, pointer: Position) {
        session.current_pointer = pointer;
        if !session.is_active() {
            let moved = pointer.offset_from(session.origin_pointer).max_abs();
            if moved <= self.threshold {
                return;
            }
            session.dragging = Some(self.indicator.raise());
            debug!(item_id = %session.item_id, "Drag started");
        }
        session.candidate = match self.resolver.resolve_for(pointer, session.item_id) {
            Resolution::Target(target) => Some(target),
            Resolution::SelfDrop | Resolution::Nothing => None,
        };
    }

    fn lock(&self) -> MutexGuard<'_, Option<DragSession>> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;
    use crate::target::TargetPriority;
    use deskhub_entity::NewItem;
    use pretty_assertions::assert_eq;

    fn file_at(id: i64, x: i32, y: i32) -> Item {
        NewItem::file(format!("file-{id}"), Position::new(x, y)).into_item(ItemId(id))
    }

    fn folder_at(id: i64, x: i32, y: i32) -> Item {
        NewItem::folder(format!("folder-{id}"), Position::new(x, y)).into_item(ItemId(id))
    }

    fn desktop_with_icon(
        resolver: &DropTargetResolver,
        folder: i64,
        rect: Rect,
    ) -> Vec<crate::target::TargetRegistration> {
        vec![
            resolver.register_target(
                DropTarget::Desktop,
                || Some(Rect::canvas()),
                TargetPriority::DesktopBackground,
            ),
            resolver.register_target(
                DropTarget::Folder(ItemId(folder)),
                move || Some(rect),
                TargetPriority::FolderIcon,
            ),
        ]
    }

    #[test]
    fn test_small_movement_is_a_click() {
        let controller = DragController::new(2, DropTargetResolver::new());
        let item = file_at(1, 50, 50);

        controller.begin_drag(&item, Position::new(60, 60)).unwrap();
        controller.update_pointer(Position::new(61, 62));
        assert_eq!(controller.phase(), DragPhase::Pressed);
        assert!(!controller.indicator().is_dragging());

        assert_eq!(
            controller.end_drag(Position::new(62, 61)),
            DragOutcome::Select(ItemId(1))
        );
        assert_eq!(controller.phase(), DragPhase::Idle);
    }

    #[test]
    fn test_threshold_starts_drag_and_raises_indicator() {
        let resolver = DropTargetResolver::new();
        let _targets = desktop_with_icon(&resolver, 2, Rect::new(200, 40, 72, 72));
        let controller = DragController::new(2, resolver);
        let indicator = controller.indicator();

        controller.begin_drag(&file_at(1, 50, 50), Position::new(60, 60)).unwrap();
        assert_eq!(
            controller.update_pointer(Position::new(63, 60)),
            Some(DropTarget::Desktop)
        );
        assert_eq!(controller.phase(), DragPhase::Active);
        assert!(indicator.is_dragging());

        assert_eq!(
            controller.update_pointer(Position::new(210, 60)),
            Some(DropTarget::Folder(ItemId(2)))
        );
        assert_eq!(
            controller.end_drag(Position::new(210, 60)),
            DragOutcome::MovedToFolder {
                item_id: ItemId(1),
                folder_id: ItemId(2)
            }
        );
        assert!(!indicator.is_dragging());
    }

    #[test]
    fn test_desktop_drop_keeps_grab_offset() {
        let controller = DragController::new(2, DropTargetResolver::new());
        controller.begin_drag(&file_at(1, 50, 50), Position::new(60, 60)).unwrap();
        controller.update_pointer(Position::new(100, 90));
        assert_eq!(
            controller.end_drag(Position::new(110, 100)),
            DragOutcome::MovedToDesktop {
                item_id: ItemId(1),
                position: Position::new(100, 90)
            }
        );
    }

    #[test]
    fn test_drag_out_of_folder_lands_at_pointer() {
        let controller = DragController::new(2, DropTargetResolver::new());
        let mut item = file_at(3, 0, 0);
        item.parent_id = Some(ItemId(2));

        controller.begin_drag(&item, Position::new(20, 20)).unwrap();
        assert_eq!(
            controller.end_drag(Position::new(120, 80)),
            DragOutcome::MovedToDesktop {
                item_id: ItemId(3),
                position: Position::new(120, 80)
            }
        );
    }

    #[test]
    fn test_folder_dropped_on_itself_is_noop() {
        let resolver = DropTargetResolver::new();
        let _targets = desktop_with_icon(&resolver, 4, Rect::new(0, 0, 72, 72));
        let controller = DragController::new(2, resolver);

        controller.begin_drag(&folder_at(4, 0, 0), Position::new(10, 10)).unwrap();
        controller.update_pointer(Position::new(20, 20));
        assert_eq!(controller.candidate(), None);
        assert_eq!(controller.end_drag(Position::new(30, 30)), DragOutcome::NoOp);
    }

    #[test]
    fn test_drop_back_into_source_folder_is_noop() {
        let resolver = DropTargetResolver::new();
        let _window = resolver.register_target(
            DropTarget::Folder(ItemId(2)),
            || Some(Rect::new(0, 0, 300, 200)),
            TargetPriority::FolderWindow,
        );
        let controller = DragController::new(2, resolver);
        let mut item = file_at(3, 0, 0);
        item.parent_id = Some(ItemId(2));

        controller.begin_drag(&item, Position::new(20, 20)).unwrap();
        assert_eq!(controller.end_drag(Position::new(80, 80)), DragOutcome::NoOp);
    }

    #[test]
    fn test_second_begin_is_refused() {
        let controller = DragController::new(2, DropTargetResolver::new());
        controller.begin_drag(&file_at(1, 0, 0), Position::new(0, 0)).unwrap();
        assert_eq!(
            controller.begin_drag(&file_at(2, 0, 0), Position::new(0, 0)),
            Err(DragError::AlreadyActive(ItemId(1)))
        );
        assert_eq!(controller.dragged_item(), Some(ItemId(1)));
    }

    #[test]
    fn test_cancel_is_idempotent_and_clears_indicator() {
        let controller = DragController::new(2, DropTargetResolver::new());
        let indicator = controller.indicator();
        controller.begin_drag(&file_at(1, 0, 0), Position::new(0, 0)).unwrap();
        controller.update_pointer(Position::new(40, 40));
        assert!(indicator.is_dragging());

        controller.cancel();
        controller.cancel();
        assert!(!indicator.is_dragging());
        assert_eq!(controller.phase(), DragPhase::Idle);
        assert_eq!(controller.end_drag(Position::new(40, 40)), DragOutcome::NoOp);
    }

    #[test]
    fn test_dropping_controller_clears_indicator() {
        let controller = DragController::new(2, DropTargetResolver::new());
        let indicator = controller.indicator();
        controller.begin_drag(&file_at(1, 0, 0), Position::new(0, 0)).unwrap();
        controller.update_pointer(Position::new(40, 40));
        drop(controller);
        assert!(!indicator.is_dragging());
    }
}
