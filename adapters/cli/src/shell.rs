//! Line-oriented game loop over stdin.

use std::{
    collections::VecDeque,
    io::{BufRead, Write},
    time::Duration,
};

use anyhow::{bail, Context, Result};
use rand::Rng;
use tracing::{debug, warn};
use trailgrid_core::{
    Command, CompletedGame, Event, GameConfig, MarkerKind, NodeIndex, PixelPoint, PixelSize,
    PointerEvent,
};
use trailgrid_rendering::{FrameRenderer, ImageLoader, Painter, Palette};
use trailgrid_system_camera::PointerSource;
use trailgrid_world::{apply, query, Phase, Session};

use crate::{canvas::TextLayers, clock::Clock};

const HELP: &str = "\
commands:
  move N | m N      step to node N
  pan DX DY         drag the grid by DX, DY pixels
  center [N]        center the viewport on node N or the player
  start [SEED]      start a new game
  forfeit           abandon the current game
  clear             forget the last result
  show              redraw the grid
  help              show this help
  quit              leave";

/// One parsed line of player input.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Input {
    Move(NodeIndex),
    Pan { dx: f64, dy: f64 },
    Center(Option<NodeIndex>),
    Start(Option<u64>),
    Forfeit,
    Clear,
    Show,
    Help,
    Quit,
}

impl Input {
    /// Parses a line; blank lines yield `None`.
    pub(crate) fn parse(line: &str) -> Result<Option<Self>> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Ok(None);
        };
        let mut argument = || words.next().map(str::to_owned);

        let input = match verb {
            "move" | "m" => {
                let node = argument().context("usage: move N")?;
                Self::Move(NodeIndex::new(
                    node.parse().with_context(|| format!("invalid node {node:?}"))?,
                ))
            }
            "pan" => {
                let dx = argument().context("usage: pan DX DY")?;
                let dy = argument().context("usage: pan DX DY")?;
                Self::Pan {
                    dx: dx.parse().with_context(|| format!("invalid offset {dx:?}"))?,
                    dy: dy.parse().with_context(|| format!("invalid offset {dy:?}"))?,
                }
            }
            "center" => match argument() {
                Some(node) => Self::Center(Some(NodeIndex::new(
                    node.parse().with_context(|| format!("invalid node {node:?}"))?,
                ))),
                None => Self::Center(None),
            },
            "start" => match argument() {
                Some(seed) => Self::Start(Some(
                    seed.parse().with_context(|| format!("invalid seed {seed:?}"))?,
                )),
                None => Self::Start(None),
            },
            "forfeit" => Self::Forfeit,
            "clear" => Self::Clear,
            "show" => Self::Show,
            "help" | "?" => Self::Help,
            "quit" | "exit" | "q" => Self::Quit,
            other => bail!("unknown command {other:?}, try `help`"),
        };
        Ok(Some(input))
    }
}

/// Replays a fixed pointer gesture into the camera.
#[derive(Clone, Debug, Default)]
struct ScriptedPointer {
    pending: VecDeque<PointerEvent>,
}

impl ScriptedPointer {
    fn drag(dx: f64, dy: f64) -> Self {
        Self {
            pending: VecDeque::from([
                PointerEvent::Down {
                    position: PixelPoint::new(0.0, 0.0),
                },
                PointerEvent::Move {
                    position: PixelPoint::new(dx, dy),
                },
                PointerEvent::Up,
            ]),
        }
    }
}

impl PointerSource for ScriptedPointer {
    fn next_event(&mut self) -> Option<PointerEvent> {
        self.pending.pop_front()
    }
}

/// Session, renderer and terminal output wired together.
pub(crate) struct App<C, W> {
    session: Session,
    renderer: FrameRenderer,
    layers: TextLayers,
    wrapper: PixelSize,
    clock: C,
    out: W,
}

impl<C: Clock, W: Write> App<C, W> {
    pub(crate) fn new(config: GameConfig, wrapper: PixelSize, clock: C, out: W) -> Result<Self> {
        let session = Session::new(config).context("map is not playable")?;
        let layout = *query::layout(&session);
        let palette = Palette::default();
        Ok(Self {
            layers: TextLayers::new(&layout, &palette),
            renderer: FrameRenderer::new(Painter::new(layout, palette)),
            session,
            wrapper,
            clock,
            out,
        })
    }

    /// Loads the map background, continuing without it when unavailable.
    pub(crate) fn load_map<L: ImageLoader>(&mut self, loader: &L, location: &str) {
        if let Err(error) = self.renderer.load_map(loader, location) {
            warn!(%error, "map_image_skipped");
        }
    }

    /// Starts a game with `seed` and processes commands until input ends.
    pub(crate) fn run<R: BufRead>(&mut self, seed: u64, input: R) -> Result<()> {
        let events = self.session.place(self.wrapper);
        self.dispatch(&events)?;
        let events = self.session.start(seed);
        self.dispatch(&events)?;

        for line in input.lines() {
            let line = line.context("failed to read input")?;
            match Input::parse(&line) {
                Ok(Some(Input::Quit)) => break,
                Ok(Some(command)) => self.execute(command)?,
                Ok(None) => {}
                Err(error) => writeln!(self.out, "error: {error:#}")?,
            }
        }
        Ok(())
    }

    pub(crate) fn execute(&mut self, input: Input) -> Result<()> {
        debug!(?input, "command");
        let events = match input {
            Input::Move(node) => {
                if query::phase(&self.session) != Phase::Active {
                    writeln!(self.out, "no game in progress, use `start`")?;
                    return Ok(());
                }
                let reachable = query::is_walkable_path(&self.session, node)
                    || query::reachable_exits(&self.session).contains(&node);
                if !reachable {
                    writeln!(self.out, "node {node} is not reachable from here")?;
                    return Ok(());
                }
                self.session.move_to(node)
            }
            Input::Pan { dx, dy } => self
                .session
                .pump_pointer(&mut ScriptedPointer::drag(dx, dy)),
            Input::Center(node) => {
                let mut events = Vec::new();
                apply(&mut self.session, Command::CenterCamera { node }, &mut events);
                events
            }
            Input::Start(seed) => {
                let seed = seed.unwrap_or_else(|| rand::thread_rng().gen());
                self.session.start(seed)
            }
            Input::Forfeit => self.session.forfeit(),
            Input::Clear => self.session.clear_past_game(),
            Input::Show => Vec::new(),
            Input::Help => {
                writeln!(self.out, "{HELP}")?;
                return Ok(());
            }
            Input::Quit => return Ok(()),
        };
        self.dispatch(&events)
    }

    fn dispatch(&mut self, events: &[Event]) -> Result<()> {
        self.renderer.observe(events);
        for event in events {
            self.report(event)?;
        }
        self.draw()?;
        self.drive_intro()
    }

    fn drive_intro(&mut self) -> Result<()> {
        let pause = query::config(&self.session)
            .intro
            .map_or(Duration::ZERO, |intro| intro.pause());
        while query::phase(&self.session) == Phase::Intro {
            let elapsed = self.clock.pause(pause);
            let events = self.session.tick(elapsed);
            self.renderer.observe(&events);
            for event in &events {
                self.report(event)?;
            }
            self.draw()?;
        }
        Ok(())
    }

    fn report(&mut self, event: &Event) -> Result<()> {
        match event {
            Event::SessionStarted {
                seed,
                starting_score,
            } => writeln!(
                self.out,
                "new game with seed {seed}, starting score {starting_score}"
            )?,
            Event::IntroFocused { node } => writeln!(self.out, "exit at node {node}")?,
            Event::MarkerReached { marker } => match marker.kind {
                MarkerKind::Reward => writeln!(self.out, "reward at node {}!", marker.node)?,
                MarkerKind::Penalty => writeln!(self.out, "penalty at node {}.", marker.node)?,
            },
            Event::GameCompleted { game } => self.summarize(game)?,
            _ => {}
        }
        Ok(())
    }

    fn summarize(&mut self, game: &CompletedGame) -> Result<()> {
        writeln!(self.out, "exit reached!")?;
        writeln!(self.out, "  seed       {}", game.seed)?;
        writeln!(self.out, "  score      {} (from {})", game.score, game.starting_score)?;
        writeln!(self.out, "  moves      {}", game.moves)?;
        writeln!(self.out, "  rewards    {}", game.rewards)?;
        writeln!(self.out, "  penalties  {}", game.penalties)?;
        Ok(())
    }

    fn draw(&mut self) -> Result<()> {
        self.renderer
            .render(&mut self.layers, &self.session)
            .context("failed to draw frame")?;
        let frame = self.layers.compose(self.renderer.viewport(), self.wrapper);
        write!(self.out, "{frame}")?;

        if let Some(state) = query::current(&self.session) {
            if !state.in_intro() {
                let walkable: Vec<String> = state
                    .walkable()
                    .iter()
                    .copied()
                    .chain(query::reachable_exits(&self.session))
                    .map(|node| node.to_string())
                    .collect();
                writeln!(
                    self.out,
                    "score {} | moves {} | rewards {} | penalties {} | next: {}",
                    state.score(),
                    state.moves(),
                    state.rewards(),
                    state.penalties(),
                    walkable.join(" ")
                )?;
            }
        }
        self.out.flush()?;
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn session(&self) -> &Session {
        &self.session
    }

    #[cfg(test)]
    pub(crate) fn clock(&self) -> &C {
        &self.clock
    }

    #[cfg(test)]
    pub(crate) fn output(&self) -> &W {
        &self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use trailgrid_core::{FovExtent, IntroConfig, NodesData, DEFAULT_STARTING_SCORE};

    fn node(value: u32) -> NodeIndex {
        NodeIndex::new(value)
    }

    /// 4x3 grid of 100px nodes with a single exit in the bottom-right corner.
    fn config() -> GameConfig {
        GameConfig {
            width: 400.0,
            height: 300.0,
            rows: 3,
            cols: 4,
            start_node: node(1),
            nodes: NodesData {
                paths: [1, 2, 3, 5, 6, 7, 10, 11].into_iter().map(node).collect(),
                exits: vec![node(12)],
            },
            fov: Some(FovExtent { rows: 1, cols: 1 }),
            intro: Some(IntroConfig { pause_ms: 300 }),
            starting_score: DEFAULT_STARTING_SCORE,
            map_image: None,
        }
    }

    fn app() -> App<ManualClock, Vec<u8>> {
        App::new(
            config(),
            PixelSize::new(400.0, 300.0),
            ManualClock::default(),
            Vec::new(),
        )
        .expect("valid config")
    }

    fn output(app: &App<ManualClock, Vec<u8>>) -> String {
        String::from_utf8_lossy(app.output()).into_owned()
    }

    #[test]
    fn parses_commands() {
        assert_eq!(Input::parse("  ").expect("blank"), None);
        assert_eq!(Input::parse("m 7").expect("move"), Some(Input::Move(node(7))));
        assert_eq!(
            Input::parse("pan -120 40.5").expect("pan"),
            Some(Input::Pan { dx: -120.0, dy: 40.5 })
        );
        assert_eq!(Input::parse("center").expect("center"), Some(Input::Center(None)));
        assert_eq!(Input::parse("start 9").expect("start"), Some(Input::Start(Some(9))));
        assert_eq!(Input::parse("quit").expect("quit"), Some(Input::Quit));
        assert!(Input::parse("move").is_err());
        assert!(Input::parse("move x").is_err());
        assert!(Input::parse("dance").is_err());
    }

    #[test]
    fn intro_is_paced_by_the_clock() {
        let mut app = app();
        app.run(4, "".as_bytes()).expect("session runs");

        assert_eq!(app.clock().pauses, vec![Duration::from_millis(300)]);
        assert_eq!(query::phase(app.session()), Phase::Active);
        let text = output(&app);
        assert!(text.contains("new game with seed 4, starting score 300"));
        assert!(text.contains("exit at node 12"));
        assert!(text.contains("score 300 | moves 0"));
    }

    #[test]
    fn unreachable_moves_are_refused() {
        let mut app = app();
        app.run(4, "move 11\n".as_bytes()).expect("session runs");
        assert!(output(&app).contains("node 11 is not reachable from here"));
        assert_eq!(query::current(app.session()).map(|state| state.moves()), Some(0));
    }

    #[test]
    fn walking_to_the_exit_prints_a_summary() {
        let mut app = app();
        let script = "move 6\nmove 11\nmove 12\nmove 11\n";
        app.run(4, script.as_bytes()).expect("session runs");

        let text = output(&app);
        assert!(text.contains("exit reached!"));
        assert!(text.contains("  moves      2"));
        assert!(text.contains("no game in progress"));
        assert_eq!(query::phase(app.session()), Phase::Finished);
    }

    #[test]
    fn bad_input_reports_and_continues() {
        let mut app = app();
        app.run(4, "jump\nforfeit\n".as_bytes()).expect("session runs");
        assert!(output(&app).contains("error: unknown command \"jump\""));
        assert_eq!(query::phase(app.session()), Phase::NotStarted);
    }

    #[test]
    fn pan_moves_the_viewport_by_whole_cells() {
        let mut app = App::new(
            config(),
            PixelSize::new(200.0, 200.0),
            ManualClock::default(),
            Vec::new(),
        )
        .expect("valid config");
        app.run(4, "".as_bytes()).expect("session runs");
        assert_eq!(query::camera_offset(app.session()), PixelPoint::new(0.0, 0.0));

        app.execute(Input::Pan {
            dx: -150.0,
            dy: -20.0,
        })
        .expect("pan");
        assert_eq!(
            query::camera_offset(app.session()),
            PixelPoint::new(-100.0, 0.0)
        );
    }
}
