use rand::rngs::StdRng;
use rand::seq::IteratorRandom;
use rand::{Rng, SeedableRng};

use crate::palette::{self, PALETTE_SIZE};
use crate::terminal::Viewport;

/// Life lost by every particle on each tick unless configured otherwise.
pub const DEFAULT_LIFE_DECAY: f32 = 0.02;

const MIN_VELOCITY: f32 = 0.5;
const MAX_VELOCITY: f32 = 2.0;

/// Absorbs accumulated f32 rounding so a particle lasts at most
/// `1.0 / life_decay` ticks.
const LIFE_EPSILON: f32 = 1e-4;

/// An ephemeral glyph falling down the screen.
///
/// Coordinates are advisory: the overlay clamps them against the geometry of
/// the frame being drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub glyph: char,
    pub color: u8,
    pub velocity_y: f32,
    pub life: f32,
}

impl Particle {
    /// Palette index tracking remaining life: 7 when fresh, down to 1 as
    /// the particle fades. The spawn colour is not used for drawing.
    pub fn display_color(&self) -> u8 {
        ((self.life * PALETTE_SIZE as f32) as u8).clamp(1, PALETTE_SIZE)
    }
}

/// Owns every live [`Particle`]; nothing else holds a reference to one.
#[derive(Debug, Clone)]
pub struct ParticleSystem {
    particles: Vec<Particle>,
    rng: StdRng,
}

impl ParticleSystem {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Deterministic system for tests and replays.
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            particles: Vec::new(),
            rng,
        }
    }

    /// Adds one particle somewhere in the upper half of `bounds`.
    pub fn spawn(&mut self, bounds: Viewport) {
        let max_x = (bounds.cols as i32 - 2).max(1);
        let max_y = (bounds.rows as i32 / 2).max(1);

        let x = self.rng.gen_range(1..=max_x) as f32;
        let y = self.rng.gen_range(1..=max_y) as f32;
        let glyph = palette::spark_glyphs()
            .choose(&mut self.rng)
            .unwrap_or(palette::GLYPHS_MID[0]);
        let color = self.rng.gen_range(1..=PALETTE_SIZE);
        let velocity_y = self.rng.gen_range(MIN_VELOCITY..=MAX_VELOCITY);

        self.particles.push(Particle {
            x,
            y,
            glyph,
            color,
            velocity_y,
            life: 1.0,
        });
    }

    /// Advances every particle by one step, then drops the ones that expired
    /// or fell past `vertical_bound`.
    pub fn tick(&mut self, life_decay: f32, vertical_bound: f32) {
        self.particles.retain_mut(|particle| {
            particle.y += particle.velocity_y;
            particle.life -= life_decay;
            particle.life > LIFE_EPSILON && particle.y < vertical_bound
        });
    }

    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter()
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }
}

impl Default for ParticleSystem {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCREEN: Viewport = Viewport { cols: 80, rows: 24 };

    #[test]
    fn spawns_inside_upper_region() {
        let mut system = ParticleSystem::seeded(7);
        for _ in 0..500 {
            system.spawn(SCREEN);
        }

        for particle in system.iter() {
            assert!((1.0..=78.0).contains(&particle.x));
            assert!((1.0..=12.0).contains(&particle.y));
            assert!((MIN_VELOCITY..=MAX_VELOCITY).contains(&particle.velocity_y));
            assert!((1..=PALETTE_SIZE).contains(&particle.color));
            assert!(palette::spark_glyphs().any(|g| g == particle.glyph));
            assert_eq!(particle.life, 1.0);
        }
    }

    #[test]
    fn spawn_tolerates_tiny_screens() {
        let mut system = ParticleSystem::seeded(1);
        system.spawn(Viewport { cols: 1, rows: 1 });

        let particle = system.iter().next().unwrap();
        assert_eq!((particle.x, particle.y), (1.0, 1.0));
    }

    #[test]
    fn tick_decays_life_linearly() {
        let mut system = ParticleSystem::seeded(3);
        for _ in 0..10 {
            system.spawn(SCREEN);
        }

        for _ in 0..5 {
            system.tick(DEFAULT_LIFE_DECAY, f32::INFINITY);
        }

        assert_eq!(system.len(), 10);
        for particle in system.iter() {
            assert!((particle.life - (1.0 - 5.0 * DEFAULT_LIFE_DECAY)).abs() < 1e-5);
        }
    }

    #[test]
    fn particles_expire_within_fifty_ticks() {
        let mut system = ParticleSystem::seeded(11);
        system.spawn(SCREEN);

        let mut ticks = 0;
        while !system.is_empty() {
            system.tick(DEFAULT_LIFE_DECAY, f32::INFINITY);
            ticks += 1;
            assert!(ticks <= 50, "particle outlived its life budget");
        }
    }

    #[test]
    fn expired_particles_never_come_back() {
        let mut system = ParticleSystem::seeded(5);
        system.spawn(SCREEN);
        for _ in 0..60 {
            system.tick(DEFAULT_LIFE_DECAY, f32::INFINITY);
        }
        assert!(system.is_empty());

        system.tick(DEFAULT_LIFE_DECAY, f32::INFINITY);
        assert!(system.is_empty());
    }

    #[test]
    fn falling_past_bound_removes_only_that_particle() {
        let mut system = ParticleSystem::seeded(9);
        system.particles = vec![
            Particle {
                x: 2.0,
                y: 21.5,
                glyph: '●',
                color: 1,
                velocity_y: 2.0,
                life: 1.0,
            },
            Particle {
                x: 3.0,
                y: 1.0,
                glyph: '▲',
                color: 2,
                velocity_y: 0.5,
                life: 1.0,
            },
            Particle {
                x: 4.0,
                y: 22.5,
                glyph: '◆',
                color: 3,
                velocity_y: 0.5,
                life: 1.0,
            },
        ];

        system.tick(DEFAULT_LIFE_DECAY, 23.0);

        let survivors: Vec<char> = system.iter().map(|p| p.glyph).collect();
        assert_eq!(survivors, vec!['▲']);
    }

    #[test]
    fn display_colour_follows_life_not_spawn_colour() {
        let mut particle = Particle {
            x: 1.0,
            y: 1.0,
            glyph: '●',
            color: 3,
            velocity_y: 1.0,
            life: 1.0,
        };
        assert_eq!(particle.display_color(), 7);

        particle.life = 0.9;
        assert_eq!(particle.display_color(), 6);

        particle.life = 0.3;
        assert_eq!(particle.display_color(), 2);

        particle.life = 0.01;
        assert_eq!(particle.display_color(), 1);
    }
}
