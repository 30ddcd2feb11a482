//! Scene: ordered objects plus the active selection.

use crate::shapes::{ObjectId, SceneObject, TextBox};
use kurbo::Point;
use std::collections::HashMap;

/// The ordered set of objects on the canvas.
///
/// Paint order is insertion order (back to front); the last inserted object
/// is on top. Selection is held by id, so removing the selected object
/// clears it.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    /// All objects, keyed by ID.
    objects: HashMap<ObjectId, SceneObject>,
    /// Z-order of objects (back to front).
    z_order: Vec<ObjectId>,
    /// The active selection, if any.
    selection: Option<ObjectId>,
}

impl Scene {
    /// Create a new empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an object on top of the z-order. Returns its id.
    pub fn add(&mut self, object: SceneObject) -> ObjectId {
        let id = object.id();
        if self.objects.insert(id, object).is_none() {
            self.z_order.push(id);
        }
        id
    }

    /// Remove an object. Clears the selection if it pointed at it.
    pub fn remove(&mut self, id: ObjectId) -> Option<SceneObject> {
        let removed = self.objects.remove(&id)?;
        self.z_order.retain(|&object_id| object_id != id);
        if self.selection == Some(id) {
            self.selection = None;
        }
        Some(removed)
    }

    /// Get an object by ID.
    pub fn get(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.get(&id)
    }

    /// Get a mutable reference to an object by ID.
    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut SceneObject> {
        self.objects.get_mut(&id)
    }

    /// Objects in paint order (back to front).
    pub fn objects_ordered(&self) -> impl Iterator<Item = &SceneObject> {
        self.z_order.iter().filter_map(|id| self.objects.get(id))
    }

    /// Object ids in paint order (back to front).
    pub fn z_order(&self) -> &[ObjectId] {
        &self.z_order
    }

    /// Apply `f` to every object, in paint order.
    pub fn for_each_mut(&mut self, mut f: impl FnMut(&mut SceneObject)) {
        for id in &self.z_order {
            if let Some(object) = self.objects.get_mut(id) {
                f(object);
            }
        }
    }

    /// The active selection id.
    pub fn selection(&self) -> Option<ObjectId> {
        self.selection
    }

    /// The selected object, if any.
    pub fn selected(&self) -> Option<&SceneObject> {
        self.selection.and_then(|id| self.objects.get(&id))
    }

    /// The selected object, if any.
    pub fn selected_mut(&mut self) -> Option<&mut SceneObject> {
        let id = self.selection?;
        self.objects.get_mut(&id)
    }

    /// The selected text box, if the selection is one.
    pub fn selected_text(&self) -> Option<&TextBox> {
        self.selected().and_then(SceneObject::as_text)
    }

    /// The selected text box, if the selection is one.
    pub fn selected_text_mut(&mut self) -> Option<&mut TextBox> {
        self.selected_mut().and_then(SceneObject::as_text_mut)
    }

    /// Select an object. Returns false (and leaves the selection alone) if
    /// the id is unknown or the object is not selectable.
    pub fn select(&mut self, id: ObjectId) -> bool {
        match self.objects.get(&id) {
            Some(object) if object.is_selectable() => {
                self.selection = Some(id);
                true
            }
            _ => false,
        }
    }

    /// Clear selection.
    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    /// Remove the selected object, if any, and clear the selection.
    pub fn delete_selected(&mut self) -> Option<SceneObject> {
        let id = self.selection.take()?;
        self.remove(id)
    }

    /// The topmost evented object under `point`.
    pub fn topmost_at(&self, point: Point, tolerance: f64) -> Option<ObjectId> {
        self.z_order.iter().rev().copied().find(|id| {
            self.objects
                .get(id)
                .is_some_and(|o| o.is_evented() && o.hit_test(point, tolerance))
        })
    }

    /// Check if the scene is empty.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Get the number of objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }
}
