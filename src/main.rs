//! Color Ring entry point
//!
//! Native builds run a headless autoplay pass over the level catalog, logging
//! every hit and result (`RUST_LOG=info`).
//!
//! Usage: `color-ring [--save FILE] [--speed relaxed|normal|frantic] [LOCATION]`,
//! e.g. `color-ring --save progress.json --speed fast level/3`

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    if let Err(e) = native::run(std::env::args().skip(1)) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The web build is driven by the host page through the library API
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use color_ring::persistence::{JsonFileStore, KeyValueStore, MemoryStore};
    use color_ring::sim::{GameLoop, GameSession, LevelCatalog, LevelPhase, SessionEvent};
    use color_ring::settings::SpeedPreset;
    use color_ring::{GameResult, Progression, Route, Settings};

    /// Give up on a level after this much game time (seconds)
    const LEVEL_TIME_LIMIT: f32 = 120.0;

    pub fn run(args: impl Iterator<Item = String>) -> GameResult<()> {
        let mut save_path = None;
        let mut speed = None;
        let mut requested = String::from("level/1");

        let mut args = args;
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--save" => save_path = args.next(),
                "--speed" => match args.next().as_deref().and_then(SpeedPreset::parse) {
                    Some(preset) => speed = Some(preset),
                    None => log::warn!("Unknown speed, keeping the saved one"),
                },
                _ => requested = arg,
            }
        }

        match save_path {
            Some(path) => play(JsonFileStore::open(path)?, speed, &requested),
            None => play(MemoryStore::new(), speed, &requested),
        }
    }

    fn play<S: KeyValueStore>(
        mut store: S,
        speed: Option<SpeedPreset>,
        requested: &str,
    ) -> GameResult<()> {
        let mut settings = Settings::load(&store);
        if let Some(preset) = speed {
            settings.apply_preset(preset);
            if let Err(e) = settings.save(&mut store) {
                log::warn!("Could not save settings: {}", e);
            }
        }
        let seed = settings.seed.unwrap_or_else(rand::random);
        log::info!(
            "Color Ring (native) starting, speed {}, seed {}",
            settings.speed.as_str(),
            seed
        );

        let catalog = LevelCatalog::builtin(seed)?;
        let (mut progression, load_error) = Progression::open(&mut store);
        if let Some(e) = load_error {
            log::warn!("Playing without saved progress: {}", e);
        }

        let mut next = match progression.resolve_requested_level(requested) {
            Route::Level(id) => Some(catalog.level(id)?),
            Route::StartScreen => {
                log::info!("{:?} is not playable, starting from the first level", requested);
                catalog.iter().next()
            }
        };

        let mut game = GameLoop::new(GameSession::new(settings.ring_config()), &settings);
        let mut won = 0;

        while let Some(level) = next {
            let id = level.id;
            if let Err(e) = game.restart(level.clone()) {
                log::warn!("Skipping level {}: {}", id, e);
                next = catalog.next_after(id);
                continue;
            }

            match autoplay(&mut game) {
                Some(SessionEvent::Won { .. }) => {
                    won += 1;
                    if let Err(e) = progression.record_win(id) {
                        log::warn!("Could not save progress: {}", e);
                    }
                    next = catalog.next_after(id);
                }
                Some(SessionEvent::Lost { miss, .. }) => {
                    log::info!("Lost level {}: {:?}", id, miss);
                    break;
                }
                _ => {
                    log::info!("Level {} timed out", id);
                    break;
                }
            }
        }

        log::info!(
            "Finished: {} levels won, unlocked up to level {}",
            won,
            progression.unlocked_up_to()
        );
        Ok(())
    }

    /// Fire whatever color will be under the collision point on arrival
    fn autoplay(game: &mut GameLoop) -> Option<SessionEvent> {
        let dt = game.dt();
        let max_ticks = (LEVEL_TIME_LIMIT / dt) as u64;
        let start = game.ticks();

        while game.is_running() && game.ticks() - start < max_ticks {
            let aim = game
                .session()
                .level_state()
                .filter(|l| l.phase() == LevelPhase::Idle)
                .and_then(|l| l.predict_color_on_arrival(dt));
            if let Some(color) = aim {
                game.fire(color);
            }

            match game.step() {
                Some(SessionEvent::Hit { sector, remaining }) => {
                    log::info!("Hit sector {} ({} left)", sector, remaining)
                }
                Some(event) => return Some(event),
                None => {}
            }
        }
        None
    }
}
