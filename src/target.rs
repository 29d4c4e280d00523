use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// The four answer keys, each tied to a fixed circle color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum_macros::Display)]
pub enum Direction {
    Up,
    Down,
    Right,
    Left,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Right,
        Direction::Left,
    ];

    pub fn color(self) -> Rgb {
        match self {
            Direction::Up => Rgb(0x78, 0x5e, 0xf0),
            Direction::Down => Rgb(0xdc, 0x26, 0x7f),
            Direction::Right => Rgb(0xfe, 0x61, 0x00),
            Direction::Left => Rgb(0xfe, 0xfe, 0x62),
        }
    }

    pub fn arrow(self) -> char {
        match self {
            Direction::Up => '↑',
            Direction::Down => '↓',
            Direction::Right => '→',
            Direction::Left => '←',
        }
    }
}

/// The rectangle a target circle may occupy, inset by the circle radius so
/// the circle never clips the playfield edge.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Playfield {
    pub width: f64,
    pub height: f64,
    pub radius: f64,
}

impl Playfield {
    pub fn contains(&self, target: &Target) -> bool {
        target.x >= self.radius
            && target.x <= self.width - self.radius
            && target.y >= self.radius
            && target.y <= self.height - self.radius
    }
}

/// One round's goal: a colored circle at a position, answered by its direction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Target {
    pub direction: Direction,
    pub x: f64,
    pub y: f64,
}

/// Produces targets from an owned random source so sessions can be replayed
/// with a fixed seed.
#[derive(Debug)]
pub struct TargetGenerator {
    rng: StdRng,
    field: Playfield,
}

impl TargetGenerator {
    pub fn new(field: Playfield) -> Self {
        Self {
            rng: StdRng::from_entropy(),
            field,
        }
    }

    pub fn seeded(seed: u64, field: Playfield) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            field,
        }
    }

    pub fn generate(&mut self) -> Target {
        let direction = match self.rng.gen_range(0..4) {
            0 => Direction::Up,
            1 => Direction::Down,
            2 => Direction::Right,
            _ => Direction::Left,
        };

        let x = self
            .rng
            .gen_range(self.field.radius..=self.field.width - self.field.radius);
        let y = self
            .rng
            .gen_range(self.field.radius..=self.field.height - self.field.radius);

        Target { direction, x, y }
    }
}
