#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative session state management for Trailgrid.
//!
//! A [`Session`] owns the per-game [`GameState`], the viewport camera, and the
//! result of the last completed game. Every mutation flows through [`apply`],
//! which appends the resulting [`Event`] values for renderers to replay. Reads
//! go through the [`query`] module.

mod intro;
mod navigation;
mod visibility;

use std::{collections::BTreeSet, time::Duration};

use thiserror::Error;
use tracing::{debug, info};
use trailgrid_core::{
    Command, CompletedGame, ConfigError, Event, FovBounds, GameConfig, GridLayout, Marker,
    NodeIndex, NodePosition, PixelPoint, PixelSize,
};
use trailgrid_system_camera::{CameraController, PointerSource};
use trailgrid_system_marks::{place_markers, SeededRandom};
use trailgrid_system_scoring::ScoreTracker;

use crate::intro::{IntroStep, IntroTour};

/// Errors reported by the session.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum SessionError {
    /// The configuration could not be turned into a playable grid.
    #[error("invalid game configuration: {0}")]
    Config(#[from] ConfigError),
    /// Field-of-view bounds were missing for an active session that requires them.
    #[error("field of view queried for node {node} before bounds were computed")]
    MissingFovBounds {
        /// Node whose visibility was requested.
        node: NodeIndex,
    },
}

/// Lifecycle stage of a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// No game has been started, or the last one was forfeited.
    NotStarted,
    /// The exit tour is running.
    Intro,
    /// The player is on the grid.
    Active,
    /// The player reached an exit and the result is retained.
    Finished,
}

/// Mutable state of one game, replaced wholesale on every start.
#[derive(Clone, Debug, PartialEq)]
pub struct GameState {
    seed: u64,
    rng: SeededRandom,
    player: Option<NodePosition>,
    walkable: BTreeSet<NodeIndex>,
    fov: Option<FovBounds>,
    markers: Vec<Marker>,
    score: ScoreTracker,
    intro: Option<IntroTour>,
}

impl GameState {
    fn new(seed: u64, starting_score: i64) -> Self {
        Self {
            seed,
            rng: SeededRandom::new(seed),
            player: None,
            walkable: BTreeSet::new(),
            fov: None,
            markers: Vec::new(),
            score: ScoreTracker::new(starting_score),
            intro: None,
        }
    }

    /// Seed the game was started with.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Player position; absent until the exit tour has finished.
    #[must_use]
    pub const fn player(&self) -> Option<NodePosition> {
        self.player
    }

    /// Path nodes reachable in one step from the player.
    #[must_use]
    pub fn walkable(&self) -> &BTreeSet<NodeIndex> {
        &self.walkable
    }

    /// Visible window, when a field of view is configured.
    #[must_use]
    pub const fn fov_bounds(&self) -> Option<FovBounds> {
        self.fov
    }

    /// Markers placed at the start of play, including consumed ones.
    #[must_use]
    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    /// Nodes whose markers have been consumed.
    pub fn reached_markers(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.score.reached()
    }

    /// Score the game started with.
    #[must_use]
    pub const fn starting_score(&self) -> i64 {
        self.score.starting_score()
    }

    /// Running score.
    #[must_use]
    pub const fn score(&self) -> i64 {
        self.score.score()
    }

    /// Player-initiated moves so far.
    #[must_use]
    pub const fn moves(&self) -> u32 {
        self.score.moves()
    }

    /// Reward markers consumed so far.
    #[must_use]
    pub const fn rewards(&self) -> u32 {
        self.score.rewards()
    }

    /// Penalty markers consumed so far.
    #[must_use]
    pub const fn penalties(&self) -> u32 {
        self.score.penalties()
    }

    /// Whether the exit tour is still running.
    #[must_use]
    pub const fn in_intro(&self) -> bool {
        self.intro.is_some()
    }

    fn score_event(&self) -> Event {
        Event::ScoreChanged {
            score: self.score.score(),
            moves: self.score.moves(),
            rewards: self.score.rewards(),
            penalties: self.score.penalties(),
        }
    }
}

/// Represents one player's game session over a fixed map.
#[derive(Debug)]
pub struct Session {
    config: GameConfig,
    layout: GridLayout,
    paths: BTreeSet<NodeIndex>,
    exits: BTreeSet<NodeIndex>,
    camera: CameraController,
    current: Option<GameState>,
    past: Option<CompletedGame>,
}

impl Session {
    /// Creates a session for the provided map, validating it first.
    pub fn new(config: GameConfig) -> Result<Self, SessionError> {
        let layout = config.layout()?;
        Ok(Self {
            paths: config.nodes.paths.iter().copied().collect(),
            exits: config.nodes.exits.iter().copied().collect(),
            camera: CameraController::new(&layout),
            layout,
            config,
            current: None,
            past: None,
        })
    }

    /// Registers the visible wrapper size and centers the viewport.
    pub fn place(&mut self, wrapper: PixelSize) -> Vec<Event> {
        self.submit(Command::Place { wrapper })
    }

    /// Starts a new game with the provided seed.
    pub fn start(&mut self, seed: u64) -> Vec<Event> {
        self.submit(Command::Start { seed })
    }

    /// Reports elapsed time to the exit tour.
    pub fn tick(&mut self, dt: Duration) -> Vec<Event> {
        self.submit(Command::Tick { dt })
    }

    /// Moves the player to `node`.
    pub fn move_to(&mut self, node: NodeIndex) -> Vec<Event> {
        self.submit(Command::Move { node })
    }

    /// Abandons the current game.
    pub fn forfeit(&mut self) -> Vec<Event> {
        self.submit(Command::Forfeit)
    }

    /// Discards the retained result of the last completed game.
    pub fn clear_past_game(&mut self) -> Vec<Event> {
        self.submit(Command::ClearPastGame)
    }

    /// Drains pending pointer input into the drag gesture.
    pub fn pump_pointer<S>(&mut self, source: &mut S) -> Vec<Event>
    where
        S: PointerSource + ?Sized,
    {
        let mut events = Vec::new();
        self.camera.pump(source, &mut events);
        events
    }

    fn submit(&mut self, command: Command) -> Vec<Event> {
        let mut events = Vec::new();
        apply(self, command, &mut events);
        events
    }

    fn player_corner(&self) -> Option<PixelPoint> {
        self.current
            .as_ref()
            .and_then(|state| state.player)
            .map(|player| player.pixel())
    }

    fn start_game(&mut self, seed: u64, out_events: &mut Vec<Event>) {
        if self.current.is_some() {
            self.camera.detach(out_events);
        }
        if self.past.take().is_some() {
            out_events.push(Event::PastGameCleared);
        }

        let starting_score = self.config.starting_score;
        self.current = Some(GameState::new(seed, starting_score));
        out_events.push(Event::SessionStarted {
            seed,
            starting_score,
        });
        info!(seed, starting_score, "session_started");

        let Some(tour) = self
            .config
            .intro
            .map(|intro| IntroTour::new(self.config.nodes.exits.clone(), intro.pause()))
        else {
            self.begin_play(out_events);
            return;
        };
        let Some(first) = tour.first() else {
            // nothing to tour
            out_events.push(Event::IntroFinished);
            info!("intro_finished");
            self.begin_play(out_events);
            return;
        };

        out_events.push(Event::VisibilityChanged { bounds: None });
        self.focus_exit(first, out_events);
        if let Some(state) = self.current.as_mut() {
            state.intro = Some(tour);
        }
        self.advance_intro(Duration::ZERO, out_events);
    }

    fn focus_exit(&mut self, node: NodeIndex, out_events: &mut Vec<Event>) {
        out_events.push(Event::IntroFocused { node });
        let corner = self.layout.position(node).pixel();
        self.camera.center(Some(corner), out_events);
    }

    fn advance_intro(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        let Some(tour) = self.current.as_mut().and_then(|state| state.intro.as_mut()) else {
            return;
        };

        for step in tour.advance(dt) {
            match step {
                IntroStep::Focus(node) => self.focus_exit(node, out_events),
                IntroStep::Finished => {
                    if let Some(state) = self.current.as_mut() {
                        state.intro = None;
                    }
                    out_events.push(Event::IntroFinished);
                    info!("intro_finished");
                    self.begin_play(out_events);
                }
            }
        }
    }

    fn begin_play(&mut self, out_events: &mut Vec<Event>) {
        let start = self.config.start_node;
        let Some(state) = self.current.as_mut() else {
            return;
        };

        state.markers = place_markers(
            &mut state.rng,
            &self.config.nodes.paths,
            start,
            &self.config.nodes.exits,
        );
        out_events.push(Event::MarkersPlaced {
            markers: state.markers.clone(),
        });
        debug!(count = state.markers.len(), "markers_placed");

        self.move_player(start, true, out_events);
        self.camera.attach(out_events);
    }

    fn move_player(&mut self, node: NodeIndex, hidden: bool, out_events: &mut Vec<Event>) {
        let active = self
            .current
            .as_ref()
            .is_some_and(|state| !state.in_intro());
        if !active {
            return;
        }

        if self.exits.contains(&node) {
            self.complete_game(out_events);
            return;
        }

        let position = self.layout.position(node);
        let walkable = navigation::walkable(&self.layout, &self.paths, node);
        let fov = self
            .config
            .fov
            .map(|extent| visibility::bounds(&self.layout, extent, position.location()));

        let Some(state) = self.current.as_mut() else {
            return;
        };
        let from = state.player.map(|player| player.node);
        state.player = Some(position);
        state.walkable = walkable;
        state.fov = fov;

        out_events.push(Event::PlayerMoved {
            from,
            to: position,
            hidden,
        });
        out_events.push(Event::WalkableChanged {
            nodes: state.walkable.iter().copied().collect(),
        });
        out_events.push(Event::VisibilityChanged { bounds: fov });
        self.camera.center(Some(position.pixel()), out_events);

        let marker = state.markers.iter().copied().find(|marker| marker.node == node);
        if let Some(marker) = marker {
            if state.score.consume(marker) {
                debug!(node = node.get(), kind = ?marker.kind, "marker_reached");
                out_events.push(Event::MarkerReached { marker });
            }
        }
        if !hidden {
            state.score.charge_move();
        }
        out_events.push(state.score_event());
        debug!(node = node.get(), hidden, score = state.score(), "player_moved");
    }

    fn complete_game(&mut self, out_events: &mut Vec<Event>) {
        let Some(state) = self.current.as_ref() else {
            return;
        };

        let game = state.score.complete(state.seed);
        self.past = Some(game);
        out_events.push(Event::GameCompleted { game });
        info!(
            seed = game.seed,
            score = game.score,
            moves = game.moves,
            rewards = game.rewards,
            penalties = game.penalties,
            "exit_reached"
        );
        self.clear_current(out_events);
    }

    fn forfeit_game(&mut self, out_events: &mut Vec<Event>) {
        if self.current.is_none() {
            return;
        }
        info!("session_forfeited");
        self.clear_current(out_events);
    }

    fn clear_current(&mut self, out_events: &mut Vec<Event>) {
        self.camera.detach(out_events);
        if self.current.take().is_some() {
            out_events.push(Event::SessionCleared);
        }
        out_events.push(Event::VisibilityChanged { bounds: None });
        self.camera.center(None, out_events);
    }
}

/// Applies the provided command to the session, mutating state deterministically.
pub fn apply(session: &mut Session, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Place { wrapper } => {
            session.camera.place(wrapper);
            let target = session.player_corner();
            session.camera.center(target, out_events);
        }
        Command::Start { seed } => session.start_game(seed, out_events),
        Command::Tick { dt } => session.advance_intro(dt, out_events),
        Command::Move { node } => session.move_player(node, false, out_events),
        Command::Forfeit => session.forfeit_game(out_events),
        Command::ClearPastGame => {
            if session.past.take().is_some() {
                out_events.push(Event::PastGameCleared);
            }
        }
        Command::CenterCamera { node } => {
            let target = node
                .map(|node| session.layout.position(node).pixel())
                .or_else(|| session.player_corner());
            session.camera.center(target, out_events);
        }
        Command::Pointer { event } => session.camera.handle_pointer(event, out_events),
    }
}

/// Query functions that provide read-only access to the session state.
pub mod query {
    use trailgrid_core::{
        CompletedGame, GameConfig, GridLayout, Marker, NodeIndex, NodeLabel, NodePosition,
        PixelPoint,
    };

    use super::{navigation, GameState, Phase, Session, SessionError};

    /// Configuration the session was created with.
    #[must_use]
    pub fn config(session: &Session) -> &GameConfig {
        &session.config
    }

    /// Grid geometry derived from the configuration.
    #[must_use]
    pub fn layout(session: &Session) -> &GridLayout {
        &session.layout
    }

    /// Current lifecycle stage.
    #[must_use]
    pub fn phase(session: &Session) -> Phase {
        match (&session.current, &session.past) {
            (Some(state), _) if state.in_intro() => Phase::Intro,
            (Some(_), _) => Phase::Active,
            (None, Some(_)) => Phase::Finished,
            (None, None) => Phase::NotStarted,
        }
    }

    /// State of the game in progress, if any.
    #[must_use]
    pub fn current(session: &Session) -> Option<&GameState> {
        session.current.as_ref()
    }

    /// Result of the last completed game, until cleared or superseded.
    #[must_use]
    pub fn past(session: &Session) -> Option<&CompletedGame> {
        session.past.as_ref()
    }

    /// Offset of the grid container inside its wrapper.
    #[must_use]
    pub fn camera_offset(session: &Session) -> PixelPoint {
        session.camera.offset()
    }

    /// Whether drag panning is listening to pointer input.
    #[must_use]
    pub fn is_drag_attached(session: &Session) -> bool {
        session.camera.is_attached()
    }

    /// Whether the node ends the game when reached.
    #[must_use]
    pub fn is_exit_node(session: &Session, node: NodeIndex) -> bool {
        session.exits.contains(&node)
    }

    /// Whether the node is reachable in one step from the player.
    #[must_use]
    pub fn is_walkable_path(session: &Session, node: NodeIndex) -> bool {
        session
            .current
            .as_ref()
            .is_some_and(|state| state.walkable.contains(&node))
    }

    /// Exits within one step of the player.
    #[must_use]
    pub fn reachable_exits(session: &Session) -> Vec<NodeIndex> {
        let Some(player) = session.current.as_ref().and_then(|state| state.player) else {
            return Vec::new();
        };
        let mut exits: Vec<NodeIndex> = navigation::neighbours(&session.layout, player.node)
            .into_iter()
            .filter(|node| session.exits.contains(node))
            .collect();
        exits.sort_unstable();
        exits.dedup();
        exits
    }

    /// Unconsumed marker on the node, if any.
    #[must_use]
    pub fn node_mark(session: &Session, node: NodeIndex) -> Option<Marker> {
        let state = session.current.as_ref()?;
        if state.score.has_reached(node) {
            return None;
        }
        state.markers.iter().copied().find(|marker| marker.node == node)
    }

    /// Whether the node lies inside the player's field of view.
    ///
    /// Everything is visible when no field of view is configured, before the
    /// player is placed, and during the exit tour.
    pub fn is_in_fov(session: &Session, node: NodeIndex) -> Result<bool, SessionError> {
        let Some(state) = session.current.as_ref() else {
            return Ok(true);
        };
        if session.config.fov.is_none() || state.in_intro() || state.player.is_none() {
            return Ok(true);
        }

        let bounds = state.fov.ok_or(SessionError::MissingFovBounds { node })?;
        Ok(bounds.contains(session.layout.locate(node)))
    }

    /// Positions of every node registered under `label`, in declaration order.
    #[must_use]
    pub fn nodes_by_label(session: &Session, label: NodeLabel) -> Vec<NodePosition> {
        session
            .config
            .nodes
            .labelled(label)
            .iter()
            .map(|node| session.layout.position(*node))
            .collect()
    }

    /// Whether a path node should be drawn; exits and the player's node are not.
    #[must_use]
    pub fn is_drawable_path(session: &Session, node: NodeIndex) -> bool {
        let occupied = session
            .current
            .as_ref()
            .and_then(|state| state.player)
            .is_some_and(|player| player.node == node);
        !session.exits.contains(&node) && !occupied
    }
}
