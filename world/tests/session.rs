use std::time::Duration;

use trailgrid_core::{
    CompletedGame, Event, FovExtent, GameConfig, IntroConfig, MarkerKind, NodeIndex, NodeLabel,
    NodesData, PixelPoint, PixelSize, PointerEvent, DEFAULT_STARTING_SCORE,
};
use trailgrid_world::{query, Phase, Session, SessionError};

const START: NodeIndex = NodeIndex::new(1);
const EXIT: NodeIndex = NodeIndex::new(100);

fn node(value: u32) -> NodeIndex {
    NodeIndex::new(value)
}

/// 10x10 grid with a wall down column 5 that leaves the top and bottom rows open.
fn config_with_exits(exits: &[u32]) -> GameConfig {
    let paths = (1..=100)
        .filter(|n| !exits.contains(n))
        .filter(|n| {
            let row = (n - 1) / 10 + 1;
            let column = (n - 1) % 10 + 1;
            !(column == 5 && (2..=9).contains(&row))
        })
        .map(NodeIndex::new)
        .collect();

    GameConfig {
        width: 500.0,
        height: 500.0,
        rows: 10,
        cols: 10,
        start_node: START,
        nodes: NodesData {
            paths,
            exits: exits.iter().copied().map(NodeIndex::new).collect(),
        },
        fov: Some(FovExtent { rows: 4, cols: 4 }),
        intro: None,
        starting_score: DEFAULT_STARTING_SCORE,
        map_image: None,
    }
}

fn config() -> GameConfig {
    config_with_exits(&[100])
}

fn started(seed: u64) -> Session {
    let mut session = Session::new(config()).expect("valid config");
    let _ = session.place(PixelSize::new(200.0, 200.0));
    let _ = session.start(seed);
    session
}

fn state(session: &Session) -> &trailgrid_world::GameState {
    query::current(session).expect("game in progress")
}

#[test]
fn start_places_player_and_markers_without_charging() {
    let mut session = Session::new(config()).expect("valid config");
    let events = session.start(1);

    assert!(matches!(
        events.first(),
        Some(Event::SessionStarted {
            seed: 1,
            starting_score: 300
        })
    ));
    assert!(events.iter().any(|event| matches!(
        event,
        Event::PlayerMoved {
            from: None,
            hidden: true,
            ..
        }
    )));
    assert!(events.contains(&Event::DragAttached));

    let state = state(&session);
    assert_eq!(query::phase(&session), Phase::Active);
    assert_eq!(state.player().map(|player| player.node), Some(START));
    assert_eq!(state.score(), 300);
    assert_eq!(state.moves(), 0);
    assert_eq!(state.markers().len(), 20);
    assert!(query::is_drag_attached(&session));
}

#[test]
fn markers_are_reproduced_after_forfeit() {
    let mut session = started(1);
    let first = state(&session).markers().to_vec();
    assert_eq!(first[0].node, node(26));
    assert_eq!(first[0].kind, MarkerKind::Penalty);

    let _ = session.forfeit();
    let _ = session.start(1);
    assert_eq!(state(&session).markers(), first.as_slice());

    let _ = session.start(123_456_789);
    assert_eq!(state(&session).markers().len(), 51);
}

#[test]
fn walkable_set_follows_the_player() {
    let mut session = started(1);
    let walkable: Vec<u32> = state(&session).walkable().iter().map(|n| n.get()).collect();
    assert_eq!(walkable, vec![2, 11, 12]);
    assert!(query::is_walkable_path(&session, node(12)));
    assert!(!query::is_walkable_path(&session, node(13)));

    let _ = session.move_to(node(14));
    // column 5 below row 1 is wall, so only the row above and the left side open up
    let walkable: Vec<u32> = state(&session).walkable().iter().map(|n| n.get()).collect();
    assert_eq!(walkable, vec![3, 4, 5, 13, 23, 24]);
}

#[test]
fn move_costs_and_marker_rewards_are_applied_once() {
    let mut session = started(1);

    let plain = state(&session)
        .walkable()
        .iter()
        .copied()
        .find(|candidate| query::node_mark(&session, *candidate).is_none())
        .expect("an unmarked neighbour");
    let _ = session.move_to(plain);
    assert_eq!(state(&session).score(), 290);
    assert_eq!(state(&session).moves(), 1);

    let reward = state(&session)
        .markers()
        .iter()
        .find(|marker| marker.kind == MarkerKind::Reward)
        .copied()
        .expect("a reward marker");
    let events = session.move_to(reward.node);
    assert!(events.contains(&Event::MarkerReached { marker: reward }));
    assert_eq!(state(&session).score(), 380);
    assert_eq!(state(&session).rewards(), 1);
    assert_eq!(query::node_mark(&session, reward.node), None);

    let _ = session.move_to(plain);
    let events = session.move_to(reward.node);
    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::MarkerReached { .. })));
    assert_eq!(state(&session).score(), 360);
    assert_eq!(state(&session).rewards(), 1);
    assert_eq!(state(&session).moves(), 4);
    assert_eq!(
        state(&session).reached_markers().collect::<Vec<_>>(),
        vec![reward.node]
    );
}

#[test]
fn penalty_marker_subtracts_points() {
    let mut session = started(1);
    let penalty = state(&session).markers()[0];
    assert_eq!(penalty.kind, MarkerKind::Penalty);

    let _ = session.move_to(penalty.node);
    assert_eq!(state(&session).score(), 240);
    assert_eq!(state(&session).penalties(), 1);
}

#[test]
fn fov_window_is_clipped_to_grid() {
    let mut session = started(1);
    let bounds = state(&session).fov_bounds().expect("fov configured");
    assert_eq!((bounds.top, bounds.bottom, bounds.left, bounds.right), (0, 5, 0, 5));

    assert_eq!(query::is_in_fov(&session, node(5)), Ok(true));
    assert_eq!(query::is_in_fov(&session, node(6)), Ok(false));
    assert_eq!(query::is_in_fov(&session, node(51)), Ok(false));

    let _ = session.move_to(node(99));
    let bounds = state(&session).fov_bounds().expect("fov configured");
    assert_eq!(bounds.bottom, 10);
    assert_eq!(bounds.right, 10);
    assert_eq!(query::is_in_fov(&session, node(1)), Ok(false));
    assert_eq!(query::is_in_fov(&session, node(100)), Ok(true));
}

#[test]
fn everything_is_visible_without_fov() {
    let mut config = config();
    config.fov = None;
    let mut session = Session::new(config).expect("valid config");
    assert_eq!(query::is_in_fov(&session, node(77)), Ok(true));

    let events = session.start(3);
    assert!(events.contains(&Event::VisibilityChanged { bounds: None }));
    assert_eq!(query::is_in_fov(&session, node(77)), Ok(true));
    assert_eq!(state(&session).fov_bounds(), None);
}

#[test]
fn reaching_an_exit_snapshots_prior_counters() {
    let mut session = started(1);
    let _ = session.move_to(node(2));
    let _ = session.move_to(node(3));
    let _ = session.move_to(node(90));

    let before = state(&session);
    let expected = CompletedGame {
        starting_score: 300,
        score: before.score(),
        rewards: before.rewards(),
        penalties: before.penalties(),
        moves: before.moves(),
        seed: 1,
    };
    assert_eq!(query::reachable_exits(&session), vec![EXIT]);

    let events = session.move_to(EXIT);
    assert!(events.contains(&Event::GameCompleted { game: expected }));
    assert!(events.contains(&Event::SessionCleared));
    assert!(events.contains(&Event::DragDetached));
    assert_eq!(query::past(&session), Some(&expected));
    assert!(query::current(&session).is_none());
    assert_eq!(query::phase(&session), Phase::Finished);
    assert!(!query::is_drag_attached(&session));
}

#[test]
fn idle_session_ignores_move_and_forfeit() {
    let mut session = Session::new(config()).expect("valid config");
    assert!(session.move_to(node(2)).is_empty());
    assert!(session.forfeit().is_empty());
    assert!(session.clear_past_game().is_empty());
    assert_eq!(query::phase(&session), Phase::NotStarted);
}

#[test]
fn forfeit_clears_state_and_recenters_grid() {
    let mut session = started(9);
    let _ = session.move_to(node(12));
    let events = session.forfeit();

    assert_eq!(
        events,
        vec![
            Event::DragDetached,
            Event::SessionCleared,
            Event::VisibilityChanged { bounds: None },
            Event::ViewportMoved {
                offset: PixelPoint::new(-150.0, -150.0),
            },
        ]
    );
    assert!(query::current(&session).is_none());
    assert!(query::past(&session).is_none());
    assert_eq!(query::phase(&session), Phase::NotStarted);
}

#[test]
fn past_game_is_cleared_explicitly_or_by_new_start() {
    let mut session = started(1);
    let _ = session.move_to(EXIT);
    assert!(query::past(&session).is_some());
    assert_eq!(session.clear_past_game(), vec![Event::PastGameCleared]);
    assert!(query::past(&session).is_none());

    let _ = session.start(2);
    let _ = session.move_to(EXIT);
    let events = session.start(3);
    assert_eq!(events[0], Event::PastGameCleared);
    assert!(query::past(&session).is_none());
    assert_eq!(query::phase(&session), Phase::Active);
}

#[test]
fn intro_tours_exits_before_play() {
    let mut config = config_with_exits(&[100, 10]);
    config.intro = Some(IntroConfig { pause_ms: 500 });
    let mut session = Session::new(config).expect("valid config");
    let _ = session.place(PixelSize::new(200.0, 200.0));

    let events = session.start(5);
    assert!(events.contains(&Event::IntroFocused { node: EXIT }));
    assert_eq!(query::phase(&session), Phase::Intro);
    assert!(state(&session).player().is_none());
    assert_eq!(query::is_in_fov(&session, node(55)), Ok(true));
    assert!(session.move_to(node(2)).is_empty());
    assert!(!query::is_drag_attached(&session));

    assert!(session.tick(Duration::from_millis(499)).is_empty());
    let events = session.tick(Duration::from_millis(1));
    assert_eq!(events[0], Event::IntroFocused { node: node(10) });
    assert_eq!(query::phase(&session), Phase::Intro);

    let events = session.tick(Duration::from_millis(500));
    assert_eq!(events[0], Event::IntroFinished);
    assert!(events
        .iter()
        .any(|event| matches!(event, Event::MarkersPlaced { .. })));
    assert_eq!(query::phase(&session), Phase::Active);
    assert_eq!(state(&session).player().map(|player| player.node), Some(START));
    assert_eq!(state(&session).moves(), 0);
    assert!(query::is_drag_attached(&session));
}

#[test]
fn forfeit_mid_intro_cancels_remaining_steps() {
    let mut config = config();
    config.intro = Some(IntroConfig { pause_ms: 250 });
    let mut session = Session::new(config).expect("valid config");

    let _ = session.start(5);
    let events = session.forfeit();
    assert!(events.contains(&Event::SessionCleared));
    assert!(!events.contains(&Event::DragDetached));

    assert!(session.tick(Duration::from_secs(5)).is_empty());
    assert_eq!(query::phase(&session), Phase::NotStarted);
}

#[test]
fn zero_pause_intro_completes_immediately() {
    let mut config = config();
    config.intro = Some(IntroConfig { pause_ms: 0 });
    let mut session = Session::new(config).expect("valid config");

    let events = session.start(5);
    assert!(events.contains(&Event::IntroFinished));
    assert_eq!(query::phase(&session), Phase::Active);
}

#[test]
fn intro_without_exits_still_reports_finished() {
    let mut config = config_with_exits(&[]);
    config.intro = Some(IntroConfig { pause_ms: 500 });
    let mut session = Session::new(config).expect("valid config");

    let events = session.start(5);
    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::IntroFocused { .. })));
    let finished = events
        .iter()
        .position(|event| *event == Event::IntroFinished)
        .expect("intro finished");
    assert!(events[finished..]
        .iter()
        .any(|event| matches!(event, Event::MarkersPlaced { .. })));
    assert_eq!(query::phase(&session), Phase::Active);
}

#[test]
fn nodes_by_label_resolves_positions() {
    let session = Session::new(config_with_exits(&[100, 10])).expect("valid config");
    let exits = query::nodes_by_label(&session, NodeLabel::Exits);
    assert_eq!(exits.len(), 2);
    assert_eq!((exits[0].row, exits[0].column), (10, 10));
    assert_eq!((exits[0].x, exits[0].y), (450.0, 450.0));
    assert_eq!((exits[1].row, exits[1].column), (1, 10));

    let paths = query::nodes_by_label(&session, NodeLabel::Paths);
    assert_eq!(paths.len(), config_with_exits(&[100, 10]).nodes.paths.len());
}

#[test]
fn drawable_paths_exclude_exits_and_player() {
    let session = started(1);
    assert!(!query::is_drawable_path(&session, START));
    assert!(!query::is_drawable_path(&session, EXIT));
    assert!(query::is_drawable_path(&session, node(2)));
}

#[test]
fn drag_pans_only_while_active() {
    let mut session = Session::new(config()).expect("valid config");
    let _ = session.place(PixelSize::new(200.0, 200.0));
    let mut source = vec![
        PointerEvent::Down {
            position: PixelPoint::new(100.0, 100.0),
        },
        PointerEvent::Move {
            position: PixelPoint::new(0.0, 0.0),
        },
        PointerEvent::Up,
    ]
    .into_iter();
    let mut pointer = Scripted(&mut source);
    assert!(session.pump_pointer(&mut pointer).is_empty());

    let _ = session.start(1);
    let before = query::camera_offset(&session);
    let _ = session.pump_pointer(&mut Scripted(
        &mut vec![
            PointerEvent::Down {
                position: PixelPoint::new(300.0, 300.0),
            },
            PointerEvent::Move {
                position: PixelPoint::new(190.0, 240.0),
            },
            PointerEvent::Cancel,
        ]
        .into_iter(),
    ));
    let after = query::camera_offset(&session);
    assert_eq!(after.x, before.x - 100.0);
    assert_eq!(after.y, before.y - 50.0);
}

struct Scripted<'a>(&'a mut std::vec::IntoIter<PointerEvent>);

impl trailgrid_system_camera::PointerSource for Scripted<'_> {
    fn next_event(&mut self) -> Option<PointerEvent> {
        self.0.next()
    }
}

#[test]
fn starting_score_is_configurable() {
    let mut config = config();
    config.starting_score = 1_000;
    let mut session = Session::new(config).expect("valid config");
    let _ = session.start(1);
    assert_eq!(state(&session).starting_score(), 1_000);
    assert_eq!(state(&session).score(), 1_000);
}

#[test]
fn invalid_config_is_rejected() {
    let mut config = config();
    config.start_node = node(101);
    assert!(matches!(
        Session::new(config),
        Err(SessionError::Config(_))
    ));
}
