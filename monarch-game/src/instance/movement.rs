//! Ruler travel along the roads.

use log::trace;

use super::GameInstance;
use crate::map::{Direction, MapEdge};
use crate::state::RulerPosition;

impl GameInstance {
    /// Start pushing the ruler in `direction`.
    pub fn start_movement(&mut self, direction: Direction) {
        if self.state.is_over() {
            return;
        }
        self.state.ruler.heading = self.state.ruler.heading.press(direction);
    }

    pub fn stop_movement(&mut self, direction: Direction) {
        self.state.ruler.heading = self.state.ruler.heading.release(direction);
    }

    pub(super) fn update_movement(&mut self, dt: f64) {
        let heading = self.state.ruler.heading;
        let mut step = dt * self.state.ruler_speed();

        let (mut edge, mut traveled) = match self.state.ruler.position {
            RulerPosition::AtNode(node) => {
                if heading.is_idle() {
                    return;
                }
                let Some(next) = self.state.map.neighbor_in_direction(node, heading) else {
                    return;
                };
                trace!("ruler sets out from {node} towards {next}");
                (MapEdge::new(node, next), 0.0)
            }
            RulerPosition::InTransit { edge, traveled } => (edge, traveled),
        };

        let length = edge.length(&self.state.map);
        match self.state.map.destination_along(edge, heading) {
            // No key held along this road: stay put mid-road.
            None => return,
            Some(to) if to == edge.from => {
                edge = edge.reversed();
                traveled = length - traveled;
            }
            Some(_) => {}
        }

        step = step.max(0.0);
        if traveled + step >= length {
            self.arrive(edge);
        } else {
            self.state.ruler.position = RulerPosition::InTransit {
                edge,
                traveled: traveled + step,
            };
        }
    }

    fn arrive(&mut self, edge: MapEdge) {
        let node = edge.to;
        self.state.ruler.position = RulerPosition::AtNode(node);
        self.state.ruler.heading = Default::default();
        if self.state.explored.insert(node) {
            trace!("ruler explored {node}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::seeded;
    use crate::map::{Direction, Heading, NodeId};
    use crate::state::RulerPosition;

    fn direction_to(game: &super::GameInstance, from: NodeId, to: NodeId) -> Direction {
        let a = game.map().position(from);
        let b = game.map().position(to);
        Direction::between(a, b).expect("adjacent")
    }

    #[test]
    fn ruler_walks_a_road_and_explores_the_far_end() {
        let mut game = seeded(6);
        let root = game.map().root();
        let lane = game.map().children(root)[0];
        assert!(!game.state().is_explored(lane));
        game.start_movement(direction_to(&game, root, lane));

        // 60 units per day over a 1-unit road.
        assert!(game.advance(0.01).is_ok());
        assert!(matches!(
            game.state().ruler.position,
            RulerPosition::InTransit { .. }
        ));
        let midway = game.ruler_point();
        let start = game.map().point(root);
        assert!((midway.distance_to(start) - 0.6).abs() < 1e-9);

        assert!(game.advance(0.01).is_ok());
        assert_eq!(game.ruler_node(), Some(lane));
        assert!(game.state().is_explored(lane));
        assert_eq!(game.state().ruler.heading, Heading::default());
    }

    #[test]
    fn reversing_mid_road_heads_back() {
        let mut game = seeded(6);
        let root = game.map().root();
        let lane = game.map().children(root)[0];
        let out = direction_to(&game, root, lane);
        game.start_movement(out);
        assert!(game.advance(0.01).is_ok());
        game.stop_movement(out);
        game.start_movement(out.opposite());
        assert!(game.advance(0.01).is_ok());
        assert_eq!(game.ruler_node(), Some(root));
    }

    #[test]
    fn releasing_the_key_mid_road_halts_the_ruler() {
        let mut game = seeded(6);
        let root = game.map().root();
        let lane = game.map().children(root)[0];
        let out = direction_to(&game, root, lane);
        game.start_movement(out);
        assert!(game.advance(0.01).is_ok());
        game.stop_movement(out);
        assert_eq!(game.state().ruler.heading, Heading::default());
        let halted = game.state().ruler.position;

        assert!(game.advance(0.01).is_ok());
        assert_eq!(game.state().ruler.position, halted);
        assert!(!game.state().is_explored(lane));

        // A key across the road does not move the ruler either.
        let (dx, dy) = out.delta();
        let across = Direction::ALL
            .into_iter()
            .find(|dir| dir.delta().0 * dx + dir.delta().1 * dy == 0)
            .expect("a perpendicular direction");
        game.start_movement(across);
        assert!(game.advance(0.01).is_ok());
        assert_eq!(game.state().ruler.position, halted);

        game.stop_movement(across);
        game.start_movement(out);
        assert!(game.advance(0.01).is_ok());
        assert_eq!(game.ruler_node(), Some(lane));
    }

    #[test]
    fn no_road_in_that_direction_means_no_movement() {
        let mut game = seeded(6);
        let root = game.map().root();
        let lanes = game.map().children(root).to_vec();
        let blocked = Direction::ALL.into_iter().find(|dir| {
            lanes
                .iter()
                .all(|lane| game.map().position(*lane) != game.map().position(root).step(*dir))
        });
        if let Some(dir) = blocked {
            game.start_movement(dir);
            assert!(game.advance(0.01).is_ok());
            assert_eq!(game.ruler_node(), Some(root));
        }
    }
}
