/// Entry point and session loop.

mod config;
mod domain;
mod sim;
mod ui;

use std::time::{Duration, Instant};

use config::GameConfig;
use domain::entity::Damageable;
use sim::action::ActionSnapshot;
use sim::level;
use sim::step;
use sim::world::{Phase, WorldState};
use ui::gamepad::GamepadState;
use ui::input::InputState;
use ui::renderer::Renderer;

const FRAME_SLEEP: Duration = Duration::from_millis(5);

fn main() {
    let config = GameConfig::load();
    let mut world = level::new_game(&config);

    let mut renderer = Renderer::new();
    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let result = game_loop(&mut world, &mut renderer, &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }
    if let Err(e) = result {
        eprintln!("Game error: {e}");
    }

    let slain = world.monsters.iter().filter(|m| m.is_dead()).count();
    println!();
    println!("Thanks for playing Labyrinth!");
    println!("Monsters slain: {slain}/6   Gems collected: {}", world.gems_collected());
}

/// What the session loop does after reading this frame's input.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Session {
    Continue,
    Restart,
    Quit,
}

/// Quit and restart sit outside the simulation.
fn session_command(world: &WorldState, input: &ActionSnapshot) -> Session {
    match world.phase {
        Phase::Lost if input.confirm => Session::Restart,
        Phase::Won if input.confirm || input.quit => Session::Quit,
        // Esc closes the menu instead of quitting.
        Phase::Menu => Session::Continue,
        _ if input.quit => Session::Quit,
        _ => Session::Continue,
    }
}

fn game_loop(
    world: &mut WorldState,
    renderer: &mut Renderer,
    config: &GameConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    let mut gp = GamepadState::new();
    gp.load_button_config(&config.gamepad);
    let mut last_tick = Instant::now();
    let tick_rate = Duration::from_millis(config.timing.tick_rate_ms);

    // Edges seen between ticks are kept until a tick consumes them.
    let mut pending = ActionSnapshot::default();

    loop {
        kb.drain_events();
        gp.update();

        if kb.ctrl_c_pressed() {
            break;
        }

        let mut frame = kb.snapshot();
        frame.merge(&gp.snapshot());
        frame.click = kb
            .clicks
            .first()
            .and_then(|&(col, row)| renderer.screen_to_world(col, row, world));
        pending.merge(&frame);

        match session_command(world, &pending) {
            Session::Quit => break,
            Session::Restart => {
                *world = level::new_game(config);
                pending = ActionSnapshot::default();
                continue;
            }
            Session::Continue => {}
        }

        if last_tick.elapsed() >= tick_rate {
            let events = step::step(world, &pending);
            renderer.absorb(&events);
            pending = frame;
            pending.clear_edges();
            last_tick = Instant::now();
        }

        renderer.render(world)?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world() -> WorldState {
        let mut cfg = GameConfig::default();
        cfg.quest.seed = Some(1);
        level::new_game(&cfg)
    }

    #[test]
    fn esc_quits_while_playing_but_closes_menu() {
        let mut w = world();
        let esc = ActionSnapshot { quit: true, ..Default::default() };
        assert_eq!(session_command(&w, &esc), Session::Quit);
        w.phase = Phase::Menu;
        assert_eq!(session_command(&w, &esc), Session::Continue);
    }

    #[test]
    fn confirm_restarts_after_loss_and_quits_after_win() {
        let mut w = world();
        let enter = ActionSnapshot { confirm: true, ..Default::default() };
        w.phase = Phase::Lost;
        assert_eq!(session_command(&w, &enter), Session::Restart);
        w.phase = Phase::Won;
        assert_eq!(session_command(&w, &enter), Session::Quit);
    }
}
