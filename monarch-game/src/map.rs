//! Map topology: an arena-backed tree of nodes on an integer grid.
//!
//! Nodes are addressed by stable [`NodeId`] indices. Every node other than the
//! root has exactly one parent, and a child is always created after its
//! parent, so `parent.index() < child.index()` holds for every edge.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::BTreeSet;
use std::fmt;

/// Stable index of a node inside a [`Map`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(u32);

impl NodeId {
    /// The root node of every map.
    pub const ROOT: Self = Self(0);

    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Integer grid coordinate of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
}

impl GridPos {
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The neighbouring grid cell in the given cardinal direction.
    #[must_use]
    pub const fn step(self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    #[must_use]
    pub fn to_point(self) -> Point {
        Point::new(f64::from(self.x), f64::from(self.y))
    }
}

/// Continuous map-space coordinate, used while the ruler is between nodes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn distance_to(self, other: Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Linear interpolation towards `other`; `t` is clamped to `[0, 1]`.
    #[must_use]
    pub fn lerp(self, other: Self, t: f64) -> Self {
        let t = t.clamp(0.0, 1.0);
        Self::new(
            (other.x - self.x).mul_add(t, self.x),
            (other.y - self.y).mul_add(t, self.y),
        )
    }
}

/// Cardinal directions on the grid. North is negative `y` (screen up).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    pub const ALL: [Self; 4] = [Self::East, Self::West, Self::South, Self::North];

    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::North => (0, -1),
            Self::South => (0, 1),
            Self::East => (1, 0),
            Self::West => (-1, 0),
        }
    }

    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::South => Self::North,
            Self::East => Self::West,
            Self::West => Self::East,
        }
    }

    /// The direction pointing from `from` to an orthogonally adjacent `to`.
    #[must_use]
    pub fn between(from: GridPos, to: GridPos) -> Option<Self> {
        Self::ALL.into_iter().find(|dir| from.step(*dir) == to)
    }
}

/// Movement intent: a vector whose components are each -1, 0 or 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Heading {
    pub dx: i8,
    pub dy: i8,
}

impl Heading {
    #[must_use]
    pub const fn new(dx: i8, dy: i8) -> Self {
        Self {
            dx: clamp_unit(dx),
            dy: clamp_unit(dy),
        }
    }

    #[must_use]
    pub const fn is_idle(self) -> bool {
        self.dx == 0 && self.dy == 0
    }

    /// Add a direction key press. Pressing the direction already held is a no-op;
    /// pressing the opposite one cancels that axis.
    #[must_use]
    pub const fn press(self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        let mut next = self;
        if dx != 0 && self.dx != dx as i8 {
            next.dx = clamp_unit(self.dx + dx as i8);
        }
        if dy != 0 && self.dy != dy as i8 {
            next.dy = clamp_unit(self.dy + dy as i8);
        }
        next
    }

    /// Release a direction key: zero the axis it belongs to.
    #[must_use]
    pub const fn release(self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        let mut next = self;
        if dx != 0 {
            next.dx = 0;
        }
        if dy != 0 {
            next.dy = 0;
        }
        next
    }

    #[must_use]
    pub fn as_point(self) -> Point {
        Point::new(f64::from(self.dx), f64::from(self.dy))
    }
}

impl From<Direction> for Heading {
    fn from(direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        Self::new(i8::try_from(dx).unwrap_or(0), i8::try_from(dy).unwrap_or(0))
    }
}

const fn clamp_unit(value: i8) -> i8 {
    if value > 1 {
        1
    } else if value < -1 {
        -1
    } else {
        value
    }
}

/// An undirected road between two adjacent nodes, stored with an orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapEdge {
    pub from: NodeId,
    pub to: NodeId,
}

impl MapEdge {
    #[must_use]
    pub const fn new(from: NodeId, to: NodeId) -> Self {
        Self { from, to }
    }

    #[must_use]
    pub const fn reversed(self) -> Self {
        Self {
            from: self.to,
            to: self.from,
        }
    }

    #[must_use]
    pub fn length(self, map: &Map) -> f64 {
        map.point(self.from).distance_to(map.point(self.to))
    }
}

/// A single node on the map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapNode {
    pub id: NodeId,
    pub pos: GridPos,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub depth: u32,
}

impl MapNode {
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// The full map: tree topology plus the special-purpose node annotations the
/// generator places.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Map {
    nodes: Vec<MapNode>,
    #[serde(default)]
    intermediate_strongholds: BTreeSet<NodeId>,
    #[serde(default)]
    peddlers: BTreeSet<NodeId>,
    #[serde(default)]
    arable_land: BTreeSet<NodeId>,
    #[serde(default)]
    gold_veins: BTreeSet<NodeId>,
}

impl Map {
    /// Create a map containing only a root node.
    #[must_use]
    pub fn with_root(pos: GridPos) -> Self {
        Self {
            nodes: vec![MapNode {
                id: NodeId::ROOT,
                pos,
                parent: None,
                children: Vec::new(),
                depth: 0,
            }],
            intermediate_strongholds: BTreeSet::new(),
            peddlers: BTreeSet::new(),
            arable_land: BTreeSet::new(),
            gold_veins: BTreeSet::new(),
        }
    }

    /// Attach a new child under `parent` at `pos` and return its id.
    pub fn add_child(&mut self, parent: NodeId, pos: GridPos) -> NodeId {
        let id = NodeId(u32::try_from(self.nodes.len()).unwrap_or(u32::MAX));
        let depth = self.nodes[parent.index()].depth + 1;
        self.nodes.push(MapNode {
            id,
            pos,
            parent: Some(parent),
            children: Vec::new(),
            depth,
        });
        self.nodes[parent.index()].children.push(id);
        id
    }

    #[must_use]
    pub const fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        id.index() < self.nodes.len()
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> &MapNode {
        &self.nodes[id.index()]
    }

    #[must_use]
    pub fn nodes(&self) -> &[MapNode] {
        &self.nodes
    }

    /// All node ids in creation order (parents before children).
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.iter().map(|node| node.id)
    }

    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index()].parent
    }

    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.index()].children
    }

    /// Children in creation order, followed by the parent.
    #[must_use]
    pub fn neighbors(&self, id: NodeId) -> SmallVec<[NodeId; 4]> {
        let node = &self.nodes[id.index()];
        let mut list: SmallVec<[NodeId; 4]> = node.children.iter().copied().collect();
        if let Some(parent) = node.parent {
            list.push(parent);
        }
        list
    }

    #[must_use]
    pub fn are_adjacent(&self, a: NodeId, b: NodeId) -> bool {
        self.parent(a) == Some(b) || self.parent(b) == Some(a)
    }

    #[must_use]
    pub fn is_leaf(&self, id: NodeId) -> bool {
        self.nodes[id.index()].is_leaf()
    }

    #[must_use]
    pub fn depth(&self, id: NodeId) -> u32 {
        self.nodes[id.index()].depth
    }

    #[must_use]
    pub fn position(&self, id: NodeId) -> GridPos {
        self.nodes[id.index()].pos
    }

    #[must_use]
    pub fn point(&self, id: NodeId) -> Point {
        self.position(id).to_point()
    }

    #[must_use]
    pub fn leaves(&self) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|node| node.is_leaf())
            .map(|node| node.id)
            .collect()
    }

    /// Hop count between two nodes through their lowest common ancestor.
    #[must_use]
    pub fn distance(&self, a: NodeId, b: NodeId) -> u32 {
        let (mut x, mut y) = (a, b);
        let mut hops = 0;
        while self.depth(x) > self.depth(y) {
            x = self.parent(x).unwrap_or(x);
            hops += 1;
        }
        while self.depth(y) > self.depth(x) {
            y = self.parent(y).unwrap_or(y);
            hops += 1;
        }
        while x != y {
            match (self.parent(x), self.parent(y)) {
                (Some(px), Some(py)) => {
                    x = px;
                    y = py;
                    hops += 2;
                }
                _ => break,
            }
        }
        hops
    }

    /// True when `ancestor` lies on the path from `node` to the root (inclusive).
    #[must_use]
    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            if self.depth(id) <= self.depth(ancestor) {
                return false;
            }
            current = self.parent(id);
        }
        false
    }

    /// Nodes visited walking from `from` to `to`, excluding `from` and
    /// including `to`.
    #[must_use]
    pub fn path(&self, from: NodeId, to: NodeId) -> Vec<NodeId> {
        let mut route = Vec::new();
        let mut meet = from;
        while !self.is_ancestor(meet, to) {
            let Some(parent) = self.parent(meet) else {
                break;
            };
            meet = parent;
            route.push(meet);
        }
        let mut descent = Vec::new();
        let mut current = to;
        while current != meet {
            descent.push(current);
            match self.parent(current) {
                Some(parent) => current = parent,
                None => break,
            }
        }
        route.extend(descent.into_iter().rev());
        route
    }

    /// Every node strictly below `id`, in breadth-first order.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut cursor = 0;
        out.extend_from_slice(self.children(id));
        while cursor < out.len() {
            let next = out[cursor];
            out.extend_from_slice(self.children(next));
            cursor += 1;
        }
        out
    }

    /// Nodes within `radius` hops of `id`, including `id` itself.
    #[must_use]
    pub fn within_hops(&self, id: NodeId, radius: u32) -> Vec<NodeId> {
        let mut found = vec![id];
        let mut frontier = vec![id];
        for _ in 0..radius {
            let mut next = Vec::new();
            for node in frontier {
                for neighbor in self.neighbors(node) {
                    if !found.contains(&neighbor) {
                        found.push(neighbor);
                        next.push(neighbor);
                    }
                }
            }
            frontier = next;
        }
        found
    }

    #[must_use]
    pub fn node_at(&self, pos: GridPos) -> Option<NodeId> {
        self.nodes.iter().find(|node| node.pos == pos).map(|node| node.id)
    }

    /// Neighbor of `source` whose bearing is closest to `heading`, provided it
    /// lies strictly within 90 degrees. Ties keep the first neighbor in
    /// [`Map::neighbors`] order.
    #[must_use]
    pub fn neighbor_in_direction(&self, source: NodeId, heading: Heading) -> Option<NodeId> {
        if heading.is_idle() {
            return None;
        }
        let wanted = bearing(Point::default(), heading.as_point());
        let origin = self.point(source);
        let mut best: Option<(NodeId, f64)> = None;
        for neighbor in self.neighbors(source) {
            let diff = angle_difference(bearing(origin, self.point(neighbor)), wanted);
            if diff >= 90.0 {
                continue;
            }
            if best.is_none_or(|(_, best_diff)| diff < best_diff) {
                best = Some((neighbor, diff));
            }
        }
        best.map(|(id, _)| id)
    }

    /// Which end of `edge` the heading points towards, if either.
    #[must_use]
    pub fn destination_along(&self, edge: MapEdge, heading: Heading) -> Option<NodeId> {
        let from = self.point(edge.from);
        let to = self.point(edge.to);
        let dir = heading.as_point();
        let dot = (to.x - from.x).mul_add(dir.x, (to.y - from.y) * dir.y);
        if dot > 0.0 {
            Some(edge.to)
        } else if dot < 0.0 {
            Some(edge.from)
        } else {
            None
        }
    }

    // Annotations ------------------------------------------------------------

    pub fn mark_peddler_site(&mut self, id: NodeId) {
        self.peddlers.insert(id);
    }

    pub fn mark_intermediate_stronghold(&mut self, id: NodeId) {
        self.intermediate_strongholds.insert(id);
    }

    pub fn mark_arable(&mut self, id: NodeId) {
        self.arable_land.insert(id);
    }

    pub fn mark_gold_vein(&mut self, id: NodeId) {
        self.gold_veins.insert(id);
    }

    #[must_use]
    pub fn is_peddler_site(&self, id: NodeId) -> bool {
        self.peddlers.contains(&id)
    }

    #[must_use]
    pub fn is_intermediate_stronghold_site(&self, id: NodeId) -> bool {
        self.intermediate_strongholds.contains(&id)
    }

    #[must_use]
    pub fn is_arable(&self, id: NodeId) -> bool {
        self.arable_land.contains(&id)
    }

    #[must_use]
    pub fn is_gold_vein(&self, id: NodeId) -> bool {
        self.gold_veins.contains(&id)
    }

    #[must_use]
    pub fn is_economic_site(&self, id: NodeId) -> bool {
        self.is_arable(id) || self.is_gold_vein(id)
    }

    #[must_use]
    pub const fn peddler_sites(&self) -> &BTreeSet<NodeId> {
        &self.peddlers
    }

    #[must_use]
    pub const fn intermediate_stronghold_sites(&self) -> &BTreeSet<NodeId> {
        &self.intermediate_strongholds
    }

    #[must_use]
    pub const fn arable_land(&self) -> &BTreeSet<NodeId> {
        &self.arable_land
    }

    #[must_use]
    pub const fn gold_veins(&self) -> &BTreeSet<NodeId> {
        &self.gold_veins
    }

    /// Structural check: single root, parent links agree with child lists,
    /// depths are consistent and no two nodes share a grid cell.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        let Some(root) = self.nodes.first() else {
            return false;
        };
        if root.parent.is_some() || root.depth != 0 {
            return false;
        }
        let mut cells = std::collections::HashSet::new();
        for node in &self.nodes {
            if !cells.insert(node.pos) {
                return false;
            }
            if node.id != NodeId::ROOT {
                let Some(parent) = node.parent else {
                    return false;
                };
                if parent >= node.id || !self.contains(parent) {
                    return false;
                }
                let parent_node = self.node(parent);
                if parent_node.depth + 1 != node.depth
                    || parent_node.children.iter().filter(|c| **c == node.id).count() != 1
                {
                    return false;
                }
            }
            if node
                .children
                .iter()
                .any(|child| !self.contains(*child) || self.parent(*child) != Some(node.id))
            {
                return false;
            }
        }
        true
    }
}

/// Bearing in degrees from `from` to `to`, measured from the positive y axis
/// towards the positive x axis, normalised to `[0, 360)`.
#[must_use]
pub fn bearing(from: Point, to: Point) -> f64 {
    let angle = (to.x - from.x).atan2(to.y - from.y).to_degrees();
    if angle < 0.0 { angle + 360.0 } else { angle }
}

/// Smallest absolute difference between two bearings, in `[0, 180]`.
#[must_use]
pub fn angle_difference(a: f64, b: f64) -> f64 {
    let diff = (a - b).abs() % 360.0;
    if diff > 180.0 { 360.0 - diff } else { diff }
}
