use std::collections::HashMap;

use glam::{Mat4, Quat, Vec3};
use log::warn;

use crate::animation::Animation;

/// Playback capability of an animated scene item.
///
/// Items either carry animation state or they do not; code branches on the
/// presence of this field rather than on a runtime type hierarchy.
#[derive(Debug, Clone)]
pub struct AnimationState {
    animations: HashMap<String, Animation>,
    current: String,
}

impl AnimationState {
    /// Builds playback state over a set of clips. The first clip by map
    /// iteration becomes current; `None` if the set is empty.
    #[must_use]
    pub fn new(animations: HashMap<String, Animation>) -> Option<Self> {
        let current = animations.keys().next()?.clone();
        Some(Self {
            animations,
            current,
        })
    }

    #[inline]
    #[must_use]
    pub fn current_animation(&self) -> &Animation {
        &self.animations[&self.current]
    }

    #[inline]
    #[must_use]
    pub fn current_animation_mut(&mut self) -> &mut Animation {
        // `current` always names an existing clip; `play` rejects unknown names
        self.animations
            .get_mut(&self.current)
            .expect("current clip present")
    }

    /// Switches playback to the named clip. Unknown names leave the current
    /// clip playing.
    pub fn play(&mut self, name: &str) -> bool {
        if self.animations.contains_key(name) {
            self.current = name.to_string();
            true
        } else {
            warn!("unknown animation clip '{name}', keeping '{}'", self.current);
            false
        }
    }

    #[must_use]
    pub fn clip_names(&self) -> impl Iterator<Item = &str> {
        self.animations.keys().map(String::as_str)
    }
}

/// An instance of a mesh placed in the scene.
///
/// `inside_frustum` is transient visibility state recomputed every frame by
/// the culling filter; it starts `true` so never-culled items draw.
#[derive(Debug, Clone)]
pub struct SceneItem {
    pub position: Vec3,
    pub rotation: Quat,
    /// Uniform scale; also scales the mesh bounding radius for culling.
    pub scale: f32,
    pub selected: bool,
    /// Skip this item in the culling filter, leaving it always visible.
    /// Used for stationary world geometry cheaper to draw than to cull.
    pub disable_culling: bool,
    pub inside_frustum: bool,
    pub animation: Option<AnimationState>,
}

impl Default for SceneItem {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneItem {
    #[must_use]
    pub fn new() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: 1.0,
            selected: false,
            disable_culling: false,
            inside_frustum: true,
            animation: None,
        }
    }

    #[must_use]
    pub fn animated(animations: HashMap<String, Animation>) -> Self {
        Self {
            animation: AnimationState::new(animations),
            ..Self::new()
        }
    }

    #[inline]
    #[must_use]
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            Vec3::splat(self.scale),
            self.rotation,
            self.position,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::AnimatedFrame;

    fn one_clip() -> HashMap<String, Animation> {
        let mut map = HashMap::new();
        map.insert(
            "idle".to_string(),
            Animation::new("idle", vec![AnimatedFrame::new()], 1.0),
        );
        map
    }

    #[test]
    fn animated_item_picks_first_clip() {
        let item = SceneItem::animated(one_clip());
        let state = item.animation.expect("animation state");
        assert_eq!(state.current_animation().name(), "idle");
    }

    #[test]
    fn play_unknown_clip_keeps_current() {
        let mut state = AnimationState::new(one_clip()).unwrap();
        assert!(!state.play("sprint"));
        assert_eq!(state.current_animation().name(), "idle");
    }

    #[test]
    fn empty_clip_set_yields_no_state() {
        assert!(AnimationState::new(HashMap::new()).is_none());
    }
}
