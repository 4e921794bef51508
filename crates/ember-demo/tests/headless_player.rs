use ember_demo::canvas::Tone;
use ember_demo::player::{FRAME, Mode, Player, run_headless};
use ember_gate::{GateConfig, GateState, RevealOrder};

fn config() -> GateConfig {
    let mut config = GateConfig::with_phrases("OLD STONE", "OPEN").seeded(21);
    config.scramble.order = RevealOrder::Center;
    config
}

#[test]
fn text_rests_on_its_lines_before_the_ember() {
    let mut player = Player::new(config(), Mode::Play { repeat: false }, 60, 16).unwrap();
    player.start().unwrap();
    while player.state() != GateState::PausedAfterScramble {
        player.tick(FRAME).unwrap();
    }
    let lines: Vec<String> = player
        .paint()
        .lines()
        .iter()
        .map(|l| l.replace('\u{a0}', " "))
        .collect();
    // Panel is 15 rows: scatter line centered in row 4, scramble line in row 10.
    assert!(lines[4].contains("OLD STONE"), "{lines:#?}");
    assert!(lines[10].contains("OPEN"), "{lines:#?}");
}

#[test]
fn ember_is_painted_while_burning() {
    let mut player = Player::new(config(), Mode::Play { repeat: false }, 60, 16).unwrap();
    player.start().unwrap();
    while player.state() != GateState::EmitterActive {
        player.tick(FRAME).unwrap();
    }
    let mut seen = false;
    for _ in 0..200 {
        player.tick(FRAME).unwrap();
        let canvas = player.paint();
        let (cols, rows) = canvas.size();
        seen |= (0..rows).any(|r| (0..cols).any(|c| canvas.tone_at(c, r) == Some(Tone::Ember)));
        if seen {
            break;
        }
    }
    assert!(seen);
}

#[test]
fn headless_run_ends_blank_but_for_the_status() {
    let mut player = Player::new(config(), Mode::Play { repeat: false }, 60, 16).unwrap();
    let report = run_headless(&mut player, 10_000).unwrap();
    assert_eq!(report.completions, 1);
    let (status, panel) = report.last_frame.split_last().unwrap();
    assert!(status.starts_with(" ash"));
    assert!(panel.iter().all(|l| l.trim().is_empty()), "{panel:#?}");
}

#[test]
fn phrase_longer_than_the_terminal_still_finishes() {
    let config = GateConfig::with_phrases("THE GATE REMEMBERS EVERY NAME", "OPEN").seeded(4);
    let mut player = Player::new(config, Mode::Play { repeat: false }, 24, 12).unwrap();
    let report = run_headless(&mut player, 10_000).unwrap();
    assert_eq!(report.completions, 1);
}
