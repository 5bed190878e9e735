use rand::{seq::SliceRandom, Rng};

const GRAVITY: f64 = 12.0;
const TIMESTEP: f64 = 0.1;
const PARTICLE_COUNT: usize = 150;
const SYMBOLS: [char; 6] = ['*', '+', '•', '✦', '✧', '·'];

/// Confetti palette: yellow and white
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tint {
    Yellow,
    White,
}

#[derive(Debug, Clone)]
pub struct Particle {
    pub x: f64,
    pub y: f64,
    pub vel_x: f64,
    pub vel_y: f64,
    pub symbol: char,
    pub tint: Tint,
    pub age: f64,
    pub max_age: f64,
}

impl Particle {
    fn launch<R: Rng + ?Sized>(x: f64, y: f64, spread: f64, rng: &mut R) -> Self {
        // Upward cone, `spread` degrees wide
        let half = spread.to_radians() / 2.0;
        let angle = rng.gen_range(-half..half);
        let speed = rng.gen_range(6.0..14.0);

        Self {
            x,
            y,
            // Terminal cells are about twice as tall as wide
            vel_x: angle.sin() * speed * 2.0,
            vel_y: -angle.cos() * speed,
            symbol: *SYMBOLS.choose(rng).unwrap_or(&'*'),
            tint: if rng.gen_bool(0.5) { Tint::Yellow } else { Tint::White },
            age: 0.0,
            max_age: rng.gen_range(1.5..3.0),
        }
    }

    fn update(&mut self, dt: f64) -> bool {
        self.x += self.vel_x * dt;
        self.y += self.vel_y * dt;
        self.vel_y += GRAVITY * dt;
        self.vel_x *= 0.96;
        self.age += dt;
        self.age < self.max_age
    }

    /// 1.0 when fresh, 0.0 at end of life
    pub fn life(&self) -> f64 {
        (1.0 - self.age / self.max_age).clamp(0.0, 1.0)
    }
}

/// Burst shown when a trial completes
#[derive(Debug)]
pub struct Confetti {
    pub particles: Vec<Particle>,
    pub is_active: bool,
    elapsed: f64,
    duration: f64,
    width: f64,
    height: f64,
}

impl Confetti {
    pub fn new() -> Self {
        Self {
            particles: Vec::new(),
            is_active: false,
            elapsed: 0.0,
            duration: 3.0,
            width: 80.0,
            height: 24.0,
        }
    }

    pub fn start(&mut self, width: u16, height: u16) {
        self.start_with_rng(width, height, &mut rand::thread_rng());
    }

    pub fn start_with_rng<R: Rng + ?Sized>(&mut self, width: u16, height: u16, rng: &mut R) {
        self.width = f64::from(width);
        self.height = f64::from(height);
        self.elapsed = 0.0;
        self.is_active = true;

        let origin_x = self.width / 2.0;
        let origin_y = self.height * 0.6;
        self.particles = (0..PARTICLE_COUNT)
            .map(|_| Particle::launch(origin_x, origin_y, 70.0, rng))
            .collect();
    }

    pub fn stop(&mut self) {
        self.is_active = false;
        self.particles.clear();
    }

    /// Advance one fixed timestep; deactivates after the duration
    pub fn update(&mut self) {
        if !self.is_active {
            return;
        }

        self.elapsed += TIMESTEP;
        if self.elapsed >= self.duration {
            self.stop();
            return;
        }

        let (width, height) = (self.width, self.height);
        self.particles.retain_mut(|p| {
            let alive = p.update(TIMESTEP);
            let margin = 5.0;
            let off_screen = p.y > height + margin || p.x < -margin || p.x > width + margin;
            alive && !off_screen
        });
    }
}

impl Default for Confetti {
    fn default() -> Self {
        Self::new()
    }
}
