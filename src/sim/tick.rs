//! Fixed-order simulation tick
//!
//! Each tick runs, in order: camera, streamers (walls, flyers, hazards),
//! wall contact sensor, launch controller, body integration, hit checks,
//! score. Every phase reads the camera state written by the first.

use super::flyer::FlyerMotion;
use super::input::ActionSignals;
use super::state::{GameEvent, GamePhase, GameState, first_overlap};
use super::stream::StreamContext;
use crate::consts::GRAVITY;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Launch action edges and level
    pub action: ActionSignals,
    /// Throw the run away (seed for the new one)
    pub restart: Option<u64>,
}

/// Advance the session by one timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    if let Some(seed) = input.restart {
        state.restart(seed);
        return;
    }

    // Game over freezes time
    if state.phase == GamePhase::GameOver || dt <= 0.0 {
        return;
    }

    state.requests.clear();
    state.events.clear();
    state.time_ticks += 1;

    // 1. Camera
    state.camera.advance(dt);

    // 2. Streaming
    stream_content(state, dt);

    // 3. Wall contact
    if let (Some(sensor), Some(body)) = (state.sensor.as_mut(), state.body.as_ref()) {
        state.contact = sensor.sense(body.pos, &state.geometry);
    }

    // 4. Launch controller
    if let (Some(launcher), Some(body)) = (state.launcher.as_mut(), state.body.as_mut()) {
        if let Some(launch) = launcher.update(dt, state.contact, input.action, body) {
            state.events.push(GameEvent::Launched(launch));
        }
    }

    // 5. Physics step for the player
    if let Some(body) = state.body.as_mut() {
        body.integrate(dt, GRAVITY);
        if state.sensor.is_some() {
            body.confine(state.geometry.left_face_x, state.geometry.right_face_x, state.geometry.floor_y);
        }
    }

    // 6. Hazard and flyer hits
    check_hits(state);

    // 7. Score
    state.score.update(state.camera.state().y);
}

/// Fill/cull every enabled streamer against the new camera position
fn stream_content(state: &mut GameState, dt: f32) {
    let camera = *state.camera.state();
    let mut ctx = StreamContext {
        camera: &camera,
        rng: &mut state.rng,
        ids: &mut state.ids,
        bounds: &state.bindings.prefabs,
        requests: &mut state.requests,
    };

    if let Some(walls) = state.walls.as_mut() {
        walls.simulate(&mut ctx);
    }

    if let Some(flyers) = state.flyers.as_mut() {
        let motion = flyers.policy().tuning().motion;
        for flyer in flyers.entities_mut() {
            let origin = flyer.pos;
            let sway = flyer.motion.get_or_insert_with(|| FlyerMotion::new(origin, &motion));
            flyer.pos = sway.advance(dt, &camera, &motion);
        }
        flyers.simulate(&mut ctx);
    }

    if let Some(hazards) = state.hazards.as_mut() {
        hazards.simulate(&mut ctx);
    }

    state.sync_geometry();
}

fn check_hits(state: &mut GameState) {
    let Some(body) = state.body.as_ref() else {
        return;
    };

    let hit = first_overlap(state.hazards.as_ref(), body).or_else(|| first_overlap(state.flyers.as_ref(), body));
    if let Some((kind, id)) = hit {
        let score = state.score.display();
        log::info!("Player hit {:?} #{} - game over at {}", kind, id, score);
        state.events.push(GameEvent::PlayerHit { kind, id });
        state.events.push(GameEvent::GameOver { score });
        state.phase = GamePhase::GameOver;
    }
}
