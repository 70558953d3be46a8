#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Trailgrid engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative session, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the session executes those commands via its
//! `apply` entry point, and then reports [`Event`] values that renderers
//! replay onto their surfaces. Grid geometry lives here as well so every crate
//! maps node indices to rows, columns and pixels the same way.

use std::{fmt, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Score assigned to a fresh session when the configuration does not override it.
pub const DEFAULT_STARTING_SCORE: i64 = 300;

/// Index of a single grid node, 1-based and laid out row-major.
///
/// Node 1 is the top-left cell. Indices outside `[1, rows × columns]` are
/// representable; they simply map to positions outside the drawn grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeIndex(u32);

impl NodeIndex {
    /// Creates a new node index wrapper.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the index.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for NodeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Grid coordinates of a node, both 1-based.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeLocation {
    row: u32,
    column: u32,
}

impl NodeLocation {
    /// Creates a new grid location.
    #[must_use]
    pub const fn new(row: u32, column: u32) -> Self {
        Self { row, column }
    }

    /// 1-based row containing the node.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// 1-based column containing the node.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }
}

/// Point on the drawing surface measured in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PixelPoint {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl PixelPoint {
    /// Creates a new pixel point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Extent of a rectangle measured in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PixelSize {
    /// Horizontal extent.
    pub width: f64,
    /// Vertical extent.
    pub height: f64,
}

impl PixelSize {
    /// Creates a new pixel size.
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Node annotated with its derived grid location and top-left pixel corner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodePosition {
    /// Node the position was derived from.
    pub node: NodeIndex,
    /// 1-based row containing the node.
    pub row: u32,
    /// 1-based column containing the node.
    pub column: u32,
    /// Horizontal pixel coordinate of the node's top-left corner.
    pub x: f64,
    /// Vertical pixel coordinate of the node's top-left corner.
    pub y: f64,
}

impl NodePosition {
    /// Grid location of the node.
    #[must_use]
    pub const fn location(&self) -> NodeLocation {
        NodeLocation::new(self.row, self.column)
    }

    /// Top-left pixel corner of the node.
    #[must_use]
    pub const fn pixel(&self) -> PixelPoint {
        PixelPoint::new(self.x, self.y)
    }
}

/// Maps node indices to grid locations and pixel positions.
///
/// Node dimensions are derived once from the pixel size and grid shape.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridLayout {
    rows: u32,
    columns: u32,
    width: f64,
    height: f64,
    node_width: f64,
    node_height: f64,
}

impl GridLayout {
    /// Creates a layout for a `rows × columns` grid drawn over `width × height` pixels.
    ///
    /// Callers are expected to pass non-zero dimensions; [`GameConfig::layout`]
    /// enforces this for configured sessions.
    #[must_use]
    pub fn new(width: f64, height: f64, rows: u32, columns: u32) -> Self {
        Self {
            rows,
            columns,
            width,
            height,
            node_width: width / f64::from(columns),
            node_height: height / f64::from(rows),
        }
    }

    /// Number of grid rows.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Number of grid columns.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Total number of nodes contained in the grid.
    #[must_use]
    pub const fn node_count(&self) -> u32 {
        self.rows.saturating_mul(self.columns)
    }

    /// Whether the index addresses a node inside the grid.
    #[must_use]
    pub const fn contains(&self, node: NodeIndex) -> bool {
        node.get() >= 1 && node.get() <= self.node_count()
    }

    /// Pixel size of the whole grid.
    #[must_use]
    pub const fn size(&self) -> PixelSize {
        PixelSize::new(self.width, self.height)
    }

    /// Pixel size of a single node.
    #[must_use]
    pub const fn node_size(&self) -> PixelSize {
        PixelSize::new(self.node_width, self.node_height)
    }

    /// Converts a node index into its 1-based row and column.
    ///
    /// A zero remainder denotes the last column rather than column zero.
    #[must_use]
    pub fn locate(&self, node: NodeIndex) -> NodeLocation {
        let n = node.get();
        let row = n.div_ceil(self.columns);
        let column = match n % self.columns {
            0 => self.columns,
            remainder => remainder,
        };
        NodeLocation::new(row, column)
    }

    /// Derives the full position of a node, including its pixel corner.
    #[must_use]
    pub fn position(&self, node: NodeIndex) -> NodePosition {
        let location = self.locate(node);
        NodePosition {
            node,
            row: location.row(),
            column: location.column(),
            x: (f64::from(location.column()) - 1.0) * self.node_width,
            y: (f64::from(location.row()) - 1.0) * self.node_height,
        }
    }

    /// First and last node of the row containing `node`, inclusive.
    ///
    /// Rows at or above the top edge yield `None`.
    #[must_use]
    pub fn row_span(&self, node: NodeIndex) -> Option<(NodeIndex, NodeIndex)> {
        let row = self.locate(node).row();
        if row == 0 {
            return None;
        }
        let start = (row - 1).checked_mul(self.columns)?.checked_add(1)?;
        let end = row.checked_mul(self.columns)?;
        Some((NodeIndex::new(start), NodeIndex::new(end)))
    }
}

/// Node sets that define the playable map.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodesData {
    /// Nodes the player may occupy.
    pub paths: Vec<NodeIndex>,
    /// Nodes that end the session when reached.
    pub exits: Vec<NodeIndex>,
}

impl NodesData {
    /// Nodes registered under the provided label, in declaration order.
    #[must_use]
    pub fn labelled(&self, label: NodeLabel) -> &[NodeIndex] {
        match label {
            NodeLabel::Paths => &self.paths,
            NodeLabel::Exits => &self.exits,
        }
    }
}

/// Selects one of the node sets in [`NodesData`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeLabel {
    /// Walkable path nodes.
    Paths,
    /// Exit nodes.
    Exits,
}

/// Half-extents of the rectangular field of view, in grid cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FovExtent {
    /// Rows visible above and below the player.
    pub rows: u32,
    /// Columns visible left and right of the player.
    pub cols: u32,
}

/// Visible window in grid-cell coordinates, clipped to the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FovBounds {
    /// Topmost visible row, inclusive.
    pub top: u32,
    /// Bottommost visible row, inclusive.
    pub bottom: u32,
    /// Leftmost visible column, inclusive.
    pub left: u32,
    /// Rightmost visible column, inclusive.
    pub right: u32,
}

impl FovBounds {
    /// Reports whether the location lies within the inclusive bounds.
    #[must_use]
    pub const fn contains(&self, location: NodeLocation) -> bool {
        location.column() >= self.left
            && location.column() <= self.right
            && location.row() >= self.top
            && location.row() <= self.bottom
    }
}

/// Effect applied when a marker is consumed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarkerKind {
    /// Adds to the score.
    Reward,
    /// Subtracts from the score.
    Penalty,
}

/// Reward or penalty bound to a path node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Marker {
    /// Node carrying the marker.
    pub node: NodeIndex,
    /// Effect of the marker.
    pub kind: MarkerKind,
}

impl Marker {
    /// Creates a new marker.
    #[must_use]
    pub const fn new(node: NodeIndex, kind: MarkerKind) -> Self {
        Self { node, kind }
    }
}

/// Final counters captured when the player reaches an exit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CompletedGame {
    /// Score the session started with.
    pub starting_score: i64,
    /// Score when the exit was reached.
    pub score: i64,
    /// Reward markers consumed.
    pub rewards: u32,
    /// Penalty markers consumed.
    pub penalties: u32,
    /// Player-initiated moves.
    pub moves: u32,
    /// Seed the session was started with.
    pub seed: u64,
}

/// Pacing of the optional exit tour shown before play begins.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IntroConfig {
    /// Pause between consecutive exits, in milliseconds.
    pub pause_ms: u64,
}

impl IntroConfig {
    /// Pause between consecutive exits.
    #[must_use]
    pub const fn pause(&self) -> Duration {
        Duration::from_millis(self.pause_ms)
    }
}

fn default_starting_score() -> i64 {
    DEFAULT_STARTING_SCORE
}

/// Immutable session configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Pixel width of the drawn grid.
    pub width: f64,
    /// Pixel height of the drawn grid.
    pub height: f64,
    /// Number of grid rows.
    pub rows: u32,
    /// Number of grid columns.
    pub cols: u32,
    /// Node the player is placed on when play begins.
    pub start_node: NodeIndex,
    /// Walkable and exit nodes.
    pub nodes: NodesData,
    /// Field-of-view half-extents; absent means everything is visible.
    #[serde(default)]
    pub fov: Option<FovExtent>,
    /// Exit tour pacing; absent means the tour is skipped.
    #[serde(default)]
    pub intro: Option<IntroConfig>,
    /// Baseline score for new sessions.
    #[serde(default = "default_starting_score")]
    pub starting_score: i64,
    /// Optional background image drawn beneath the grid.
    #[serde(default)]
    pub map_image: Option<String>,
}

impl GameConfig {
    /// Validates the configuration and derives its grid layout.
    pub fn layout(&self) -> Result<GridLayout, ConfigError> {
        if self.rows == 0 || self.cols == 0 {
            return Err(ConfigError::EmptyGrid {
                rows: self.rows,
                cols: self.cols,
            });
        }
        if !(self.width > 0.0 && self.height > 0.0) {
            return Err(ConfigError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }

        let layout = GridLayout::new(self.width, self.height, self.rows, self.cols);
        if !layout.contains(self.start_node) {
            return Err(ConfigError::NodeOutOfBounds {
                role: "start",
                node: self.start_node,
                count: layout.node_count(),
            });
        }
        for &(role, nodes) in &[("exit", &self.nodes.exits), ("path", &self.nodes.paths)] {
            if let Some(&node) = nodes.iter().find(|node| !layout.contains(**node)) {
                return Err(ConfigError::NodeOutOfBounds {
                    role,
                    node,
                    count: layout.node_count(),
                });
            }
        }
        Ok(layout)
    }
}

/// Reasons a [`GameConfig`] may be rejected.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// The grid has no rows or no columns.
    #[error("grid must have at least one row and column (got {rows}x{cols})")]
    EmptyGrid {
        /// Configured rows.
        rows: u32,
        /// Configured columns.
        cols: u32,
    },
    /// The pixel dimensions are not strictly positive.
    #[error("pixel dimensions must be positive (got {width}x{height})")]
    InvalidDimensions {
        /// Configured width.
        width: f64,
        /// Configured height.
        height: f64,
    },
    /// A configured node lies outside the grid.
    #[error("{role} node {node} lies outside the grid of {count} nodes")]
    NodeOutOfBounds {
        /// Which part of the configuration referenced the node.
        role: &'static str,
        /// Offending node.
        node: NodeIndex,
        /// Number of nodes in the grid.
        count: u32,
    },
}

/// Normalised pointer input used for drag panning.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerEvent {
    /// A pointer was pressed at the page coordinate.
    Down {
        /// Page coordinate of the pointer.
        position: PixelPoint,
    },
    /// A pressed pointer moved to the page coordinate.
    Move {
        /// Page coordinate of the pointer.
        position: PixelPoint,
    },
    /// The pointer was released.
    Up,
    /// The gesture was cancelled by the platform.
    Cancel,
}

/// Commands that express all permissible session mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Registers the size of the visible wrapper around the grid viewport.
    Place {
        /// Visible wrapper size in pixels.
        wrapper: PixelSize,
    },
    /// Starts a new session, superseding any active or finished one.
    Start {
        /// Seed for marker placement.
        seed: u64,
    },
    /// Reports elapsed time; drives the exit tour.
    Tick {
        /// Duration that elapsed since the previous tick.
        dt: Duration,
    },
    /// Moves the player to the provided node.
    Move {
        /// Destination node.
        node: NodeIndex,
    },
    /// Abandons the active session.
    Forfeit,
    /// Discards the retained result of the last completed game.
    ClearPastGame,
    /// Centers the viewport on a node, the player, or the whole grid.
    CenterCamera {
        /// Node to center on; `None` falls back to the player, then the grid.
        node: Option<NodeIndex>,
    },
    /// Feeds a pointer event into the drag panning gesture.
    Pointer {
        /// Normalised pointer event.
        event: PointerEvent,
    },
}

/// Events reported by the session after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// A new session was initialised.
    SessionStarted {
        /// Seed driving marker placement.
        seed: u64,
        /// Score the session begins with.
        starting_score: i64,
    },
    /// The exit tour focused the viewport on an exit.
    IntroFocused {
        /// Exit shown to the player.
        node: NodeIndex,
    },
    /// The exit tour completed and play is about to begin.
    IntroFinished,
    /// Markers were scattered over the path nodes.
    MarkersPlaced {
        /// Markers in placement order.
        markers: Vec<Marker>,
    },
    /// The player occupies a new node.
    PlayerMoved {
        /// Node occupied before the move, if any.
        from: Option<NodeIndex>,
        /// Position occupied after the move.
        to: NodePosition,
        /// Whether the move was the hidden initial placement.
        hidden: bool,
    },
    /// The set of nodes reachable in one step changed.
    WalkableChanged {
        /// Reachable nodes in ascending order.
        nodes: Vec<NodeIndex>,
    },
    /// The visible window changed; `None` means everything is visible.
    VisibilityChanged {
        /// New visible window.
        bounds: Option<FovBounds>,
    },
    /// The player consumed a marker.
    MarkerReached {
        /// Marker that was consumed.
        marker: Marker,
    },
    /// Score bookkeeping changed.
    ScoreChanged {
        /// Running score.
        score: i64,
        /// Player-initiated moves so far.
        moves: u32,
        /// Reward markers consumed so far.
        rewards: u32,
        /// Penalty markers consumed so far.
        penalties: u32,
    },
    /// The viewport container moved to a new offset.
    ViewportMoved {
        /// Offset of the grid container relative to its wrapper.
        offset: PixelPoint,
    },
    /// Animated viewport transitions were enabled or disabled.
    ViewportTransitionChanged {
        /// Whether offset changes should animate.
        enabled: bool,
    },
    /// Drag panning began listening to pointer input.
    DragAttached,
    /// Drag panning stopped listening to pointer input.
    DragDetached,
    /// The player reached an exit.
    GameCompleted {
        /// Snapshot of the final counters.
        game: CompletedGame,
    },
    /// The active session state was discarded.
    SessionCleared,
    /// The retained completed game was discarded.
    PastGameCleared,
}
