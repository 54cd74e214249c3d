//! SLICECAM demo: slice falling food with your pointer
//!
//! A self-contained playable build of the interaction core. The mouse
//! stands in for the webcam hand detector (one synthetic hand, index
//! fingertip under the cursor), food falls from the top of the window, and
//! fast swipes cut it. Useful for tuning thresholds and margins without a
//! camera rig.
//!
//! Keys: R restarts the session, P pauses, D toggles contact logging.

use macroquad::prelude::*;
use macroquad::rand::gen_range;
use std::collections::HashMap;

use slicecam::config::ViewMapping;
use slicecam::game::{FoodCategory, FoodKind, GameSession, TargetId};
use slicecam::hand::landmarks::{
    landmark_ids, HandDetection, Handedness, Landmark, LandmarkSource, SourceError, LANDMARK_COUNT,
};
use slicecam::math::Vec3;
use slicecam::{Tuning, VERSION};

fn window_conf() -> Conf {
    Conf {
        window_title: format!("SLICECAM v{}", VERSION),
        window_width: 1280,
        window_height: 720,
        window_resizable: true,
        high_dpi: true,
        ..Default::default()
    }
}

/// Synthetic one-hand landmark source driven by the mouse.
///
/// The session mirrors x like a selfie camera, so the reported normalized
/// x is pre-flipped to land the fingertip under the cursor.
struct PointerSource;

impl LandmarkSource for PointerSource {
    fn poll(&mut self) -> Result<Vec<HandDetection>, SourceError> {
        let (mx, my) = mouse_position();
        let fx = (mx / screen_width()).clamp(0.0, 1.0);
        let fy = (my / screen_height()).clamp(0.0, 1.0);

        let mut landmarks = [Landmark::default(); LANDMARK_COUNT];
        landmarks[landmark_ids::INDEX_FINGER_TIP] = Landmark::new(1.0 - fx, fy, 0.0);
        Ok(vec![HandDetection::new(landmarks, Handedness::Right, 1.0)])
    }
}

/// Drops food from the top edge and expires whatever falls out the bottom.
/// Owns the per-target fall velocities; the session owns the targets.
struct FallingSpawner {
    next_spawn: f64,
    velocities: HashMap<TargetId, Vec3>,
}

impl FallingSpawner {
    fn new() -> Self {
        Self { next_spawn: 0.0, velocities: HashMap::new() }
    }

    fn update(&mut self, session: &mut GameSession, now: f64, dt: f32) {
        let view = session.tuning.view;
        let level = session.level();

        if now >= self.next_spawn {
            let kind = FoodKind::ALL[gen_range(0u32, FoodKind::ALL.len() as u32) as usize];
            let x = gen_range(-view.half_width * 0.8, view.half_width * 0.8);
            let id = session.spawn(kind, Vec3::new(x, view.half_height + 1.0, 0.0));

            let fall = gen_range(1.5, 3.0) * (1.0 + 0.15 * (level - 1) as f32);
            let drift = gen_range(-0.5, 0.5);
            self.velocities.insert(id, Vec3::new(drift, -fall, 0.0));

            // Higher levels spawn faster, down to a floor
            let interval = (1.6 / (1.0 + 0.2 * (level - 1) as f64)).max(0.4);
            self.next_spawn = now + interval;
        }

        let floor = -view.half_height - 1.0;
        let mut expired: Vec<TargetId> = Vec::new();
        for target in session.targets.iter_mut() {
            if let Some(vel) = self.velocities.get(&target.id) {
                target.position = target.position + vel.scale(dt);
                if target.position.y < floor {
                    expired.push(target.id);
                }
            }
        }
        for id in expired {
            session.targets.remove(id);
        }
        // Also drops entries for targets the session sliced away
        self.velocities.retain(|id, _| session.targets.get(*id).is_some());
    }

    fn clear(&mut self) {
        self.velocities.clear();
        self.next_spawn = 0.0;
    }
}

/// One spark of slice feedback, in screen space
struct Spark {
    x: f32,
    y: f32,
    vx: f32,
    vy: f32,
    life: f32,
    color: Color,
}

/// Floating score/level text
struct Popup {
    text: String,
    x: f32,
    y: f32,
    life: f32,
}

const SPARK_LIFE: f32 = 0.6;
const POPUP_LIFE: f32 = 1.2;

fn spawn_burst(sparks: &mut Vec<Spark>, x: f32, y: f32, color: Color) {
    for _ in 0..14 {
        let angle = gen_range(0.0, std::f32::consts::TAU);
        let speed = gen_range(120.0, 420.0);
        sparks.push(Spark {
            x,
            y,
            vx: angle.cos() * speed,
            vy: angle.sin() * speed,
            life: SPARK_LIFE,
            color,
        });
    }
}

fn world_to_screen(view: &ViewMapping, world: Vec3) -> (f32, f32) {
    let sx = (world.x / (2.0 * view.half_width) + 0.5) * screen_width();
    let sy = (0.5 - world.y / (2.0 * view.half_height)) * screen_height();
    (sx, sy)
}

fn kind_color(kind: FoodKind) -> Color {
    match kind {
        FoodKind::Watermelon => GREEN,
        FoodKind::Banana => YELLOW,
        FoodKind::IceCream => SKYBLUE,
        other => match other.category() {
            FoodCategory::Fruit => RED,
            FoodCategory::MainDish => ORANGE,
            FoodCategory::Dessert => PINK,
            FoodCategory::Tableware => GRAY,
        },
    }
}

fn load_demo_tuning() -> Tuning {
    #[cfg(not(target_arch = "wasm32"))]
    {
        match slicecam::config::load_tuning("assets/tuning.ron") {
            Ok(tuning) => return tuning,
            Err(e) => println!("TUNING | fallback to defaults | {}", e),
        }
    }
    Tuning::default()
}

#[macroquad::main(window_conf)]
async fn main() {
    // Initialize crash logging FIRST (before any other code)
    #[cfg(not(target_arch = "wasm32"))]
    crashlog::setup!(crashlog::cargo_metadata!().capitalized(), false);

    let mut session = GameSession::new(load_demo_tuning());
    let mut source = PointerSource;
    let mut spawner = FallingSpawner::new();
    let mut sparks: Vec<Spark> = Vec::new();
    let mut popups: Vec<Popup> = Vec::new();
    let mut paused = false;
    let mut debug_log = false;

    loop {
        let now = get_time();
        let dt = get_frame_time();

        if is_key_pressed(KeyCode::R) {
            session.reset();
            spawner.clear();
            sparks.clear();
            popups.clear();
        }
        if is_key_pressed(KeyCode::P) {
            paused = !paused;
        }
        if is_key_pressed(KeyCode::D) {
            debug_log = !debug_log;
            session.set_debug_log(debug_log);
        }

        if !paused {
            spawner.update(&mut session, now, dt);
            session.update(&mut source, now, dt);

            let view = session.tuning.view;
            for slice in session.events.slices.iter() {
                let (x, y) = world_to_screen(&view, slice.position);
                spawn_burst(&mut sparks, x, y, kind_color(slice.kind));
            }
            for award in session.events.awards.iter() {
                let (x, y) = world_to_screen(&view, award.position);
                let text = if award.combo > 1 {
                    format!("+{} x{} combo", award.points, award.combo)
                } else {
                    format!("+{}", award.points)
                };
                popups.push(Popup { text, x, y, life: POPUP_LIFE });
            }
            for level_up in session.events.level_ups.iter() {
                popups.push(Popup {
                    text: format!("LEVEL {}", level_up.level),
                    x: screen_width() * 0.5 - 60.0,
                    y: screen_height() * 0.3,
                    life: POPUP_LIFE * 1.5,
                });
            }
        }

        for spark in sparks.iter_mut() {
            spark.x += spark.vx * dt;
            spark.y += spark.vy * dt;
            spark.vy += 900.0 * dt;
            spark.life -= dt;
        }
        sparks.retain(|s| s.life > 0.0);

        for popup in popups.iter_mut() {
            popup.y -= 40.0 * dt;
            popup.life -= dt;
        }
        popups.retain(|p| p.life > 0.0);

        // ---- draw ----
        clear_background(Color::new(0.08, 0.08, 0.11, 1.0));

        let view = session.tuning.view;
        for target in session.targets.iter() {
            let (cx, cy) = world_to_screen(&view, target.position);
            let w = target.half_extents.x / view.half_width * screen_width() * 0.5;
            let h = target.half_extents.y / view.half_height * screen_height() * 0.5;
            let color = kind_color(target.kind);
            draw_rectangle(cx - w, cy - h, w * 2.0, h * 2.0, color);
            draw_rectangle_lines(cx - w, cy - h, w * 2.0, h * 2.0, 2.0, WHITE);
            draw_text(target.kind.label(), cx - w, cy - h - 4.0, 18.0, LIGHTGRAY);
        }

        let gate = session.tuning.slicing.slice_velocity;
        for tip in session.fingertips() {
            let (x, y) = world_to_screen(&view, tip.world);
            let hot = tip.smoothed_velocity >= gate;
            let color = if hot { RED } else { WHITE };
            draw_circle_lines(x, y, 14.0, 2.0, color);
            draw_circle(x, y, 3.0, color);
            draw_text(
                &format!("{:.1} u/s", tip.smoothed_velocity),
                x + 18.0,
                y - 10.0,
                18.0,
                color,
            );
        }

        for spark in &sparks {
            let mut color = spark.color;
            color.a = spark.life / SPARK_LIFE;
            draw_circle(spark.x, spark.y, 3.0, color);
        }
        for popup in &popups {
            let mut color = WHITE;
            color.a = (popup.life / POPUP_LIFE).min(1.0);
            draw_text(&popup.text, popup.x, popup.y, 28.0, color);
        }

        draw_text(&format!("SCORE {}", session.score()), 16.0, 28.0, 28.0, WHITE);
        draw_text(&format!("LEVEL {}", session.level()), 16.0, 56.0, 24.0, LIGHTGRAY);
        draw_text(&format!("COMBO x{}", session.combo()), 16.0, 80.0, 24.0, LIGHTGRAY);
        draw_text(
            &format!("hands {} | {}", session.hand_count(), session.contact_status()),
            16.0,
            104.0,
            20.0,
            DARKGRAY,
        );
        if paused {
            draw_text("PAUSED", screen_width() * 0.5 - 50.0, screen_height() * 0.5, 40.0, YELLOW);
        }
        draw_text(
            "swipe fast to slice | R restart | P pause | D debug",
            16.0,
            screen_height() - 16.0,
            18.0,
            DARKGRAY,
        );

        next_frame().await
    }
}
