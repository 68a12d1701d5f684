//! Depth manager: bring-forward / send-backward.

use serde::{Deserialize, Serialize};

use crate::{LayerId, Scene};

/// Reorder direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Bring forward (towards the top).
    Up,
    /// Send backward (towards the bottom).
    Down,
}

impl<I> Scene<I> {
    /// Move a layer one step up or down the paint order.
    ///
    /// Swaps it with its neighbour and then renumbers every layer from its
    /// position. Moving past either end, or an absent id, changes nothing.
    /// Returns whether the order changed.
    pub fn reorder(&mut self, id: LayerId, direction: Direction) -> bool {
        let Some(current) = self.depth_order().iter().position(|&lid| lid == id) else {
            return false;
        };
        let target = match direction {
            Direction::Up => current + 1,
            Direction::Down => match current.checked_sub(1) {
                Some(target) => target,
                None => return false,
            },
        };
        if target >= self.len() {
            return false;
        }

        self.order_mut().swap(current, target);
        self.renumber();
        tracing::debug!("Reordered layer {id} {direction:?}: depth {current} -> {target}");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Layer, NaturalSize};

    fn scene_with(count: usize) -> (Scene<()>, Vec<LayerId>) {
        let mut scene = Scene::default();
        let size = NaturalSize::new(10, 10).expect("valid size");
        let ids = (0..count).map(|_| scene.add_layer((), size)).collect();
        (scene, ids)
    }

    fn depths(scene: &Scene<()>, ids: &[LayerId]) -> Vec<usize> {
        ids.iter()
            .map(|&id| scene.get(id).map_or(usize::MAX, Layer::depth))
            .collect()
    }

    #[test]
    fn test_bring_forward_swaps() {
        let (mut scene, ids) = scene_with(2);
        assert!(scene.reorder(ids[0], Direction::Up));
        assert_eq!(depths(&scene, &ids), vec![1, 0]);
        assert_eq!(scene.depth_order(), &[ids[1], ids[0]]);
    }

    #[test]
    fn test_send_backward_swaps() {
        let (mut scene, ids) = scene_with(3);
        assert!(scene.reorder(ids[2], Direction::Down));
        assert_eq!(depths(&scene, &ids), vec![0, 2, 1]);
        assert!(scene.depths_are_contiguous());
    }

    #[test]
    fn test_out_of_bounds_is_noop() {
        let (mut scene, ids) = scene_with(3);
        assert!(!scene.reorder(ids[2], Direction::Up));
        assert!(!scene.reorder(ids[0], Direction::Down));
        assert_eq!(depths(&scene, &ids), vec![0, 1, 2]);
    }

    #[test]
    fn test_absent_id_is_noop() {
        let (mut scene, ids) = scene_with(2);
        assert!(!scene.reorder(LayerId::new(42), Direction::Up));
        assert_eq!(depths(&scene, &ids), vec![0, 1]);
    }

    #[test]
    fn test_single_layer_cannot_move() {
        let (mut scene, ids) = scene_with(1);
        assert!(!scene.reorder(ids[0], Direction::Up));
        assert!(!scene.reorder(ids[0], Direction::Down));
        assert_eq!(depths(&scene, &ids), vec![0]);
    }
}
