//! Viewport input mapped onto world operations.

use lifesim_core::{World, WorldError};
use tracing::info;

/// One input event from a front end's viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewportEvent {
    /// Cursor moved to a point in world coordinates.
    CursorMoved { x: f64, y: f64 },
    /// Primary button released over the viewport.
    Click,
    Key(char),
}

/// Apply `event` to `world`. Only `r` (reset) can fail.
pub fn apply_event(world: &mut World, event: ViewportEvent) -> Result<(), WorldError> {
    match event {
        ViewportEvent::CursorMoved { x, y } => world.set_cursor(x, y),
        ViewportEvent::Click => world.toggle_selection(),
        ViewportEvent::Key('d' | 'D') => {
            let enabled = !world.config().debug;
            world.set_debug(enabled);
            info!(debug = enabled, "toggled debug overlay");
        }
        ViewportEvent::Key('r' | 'R') => world.reset()?,
        ViewportEvent::Key(_) => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lifesim_core::SimulationConfig;

    fn world() -> World {
        let config = SimulationConfig {
            initial_lifelets: 1,
            initial_food: 0,
            rng_seed: Some(3),
            ..SimulationConfig::default()
        };
        let registry = lifesim_races::default_registry().retain(|name| name == "Random");
        World::new(config, registry).expect("world")
    }

    #[test]
    fn click_selects_the_lifelet_under_the_cursor() {
        let mut world = world();
        let spot = world.lifelets().iter().next().map(|l| l.position()).expect("lifelet");
        apply_event(&mut world, ViewportEvent::CursorMoved { x: spot.x, y: spot.y })
            .expect("cursor");
        world.simulate().expect("tick");
        let highlighted = world.highlighted_lifelet();
        assert!(highlighted.is_some());

        apply_event(&mut world, ViewportEvent::Click).expect("click");
        assert_eq!(world.selected_lifelet(), highlighted);

        // Clicking empty space clears the selection.
        apply_event(&mut world, ViewportEvent::CursorMoved { x: 5000.0, y: 5000.0 })
            .expect("cursor");
        world.simulate().expect("tick");
        apply_event(&mut world, ViewportEvent::Click).expect("click");
        assert_eq!(world.selected_lifelet(), None);
    }

    #[test]
    fn keys_toggle_debug_and_reset() {
        let mut world = world();
        let before: Vec<_> = world.lifelets().iter().map(|l| l.id()).collect();
        apply_event(&mut world, ViewportEvent::Key('d')).expect("debug");
        assert!(world.config().debug);
        apply_event(&mut world, ViewportEvent::Key('x')).expect("ignored");
        assert!(world.config().debug);

        apply_event(&mut world, ViewportEvent::Key('r')).expect("reset");
        let after: Vec<_> = world.lifelets().iter().map(|l| l.id()).collect();
        assert_eq!(after.len(), before.len());
        assert_ne!(after, before);
    }
}
