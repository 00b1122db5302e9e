use num_traits::{Float, Num, Signed};


/// Manhattan distance
pub fn manhattan_distance<T>(x1: T, y1: T, x2: T, y2: T) -> T
where
    T: Num + Copy + Signed,
    {
    (x1 - x2).abs() + (y1 - y2).abs()
}

/// Euclidean distance
pub fn euclidean<T>(x1: T, y1: T, x2: T, y2: T) -> T
where
    T: Float,
    {
    ((x1 - x2).powi(2) + (y1 - y2).powi(2)).sqrt()
}


/// Integer cell on an unbounded 2D grid
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridPoint {
    pub x: i32,
    pub y: i32,
}

impl GridPoint {

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn manhattan(&self, other: &GridPoint) -> f64 {
        manhattan_distance(self.x as i64, self.y as i64, other.x as i64, other.y as i64) as f64
    }

    pub fn euclidean(&self, other: &GridPoint) -> f64 {
        euclidean(self.x as f64, self.y as f64, other.x as f64, other.y as f64)
    }

    /// Left, right, down, up
    pub fn four_neighbors(&self) -> [GridPoint; 4] {
        let GridPoint { x, y } = *self;
        [
            GridPoint::new(x - 1, y),
            GridPoint::new(x + 1, y),
            GridPoint::new(x, y - 1),
            GridPoint::new(x, y + 1),
        ]
    }

    /// The four above plus the diagonals
    pub fn eight_neighbors(&self) -> [GridPoint; 8] {
        let GridPoint { x, y } = *self;
        [
            GridPoint::new(x - 1, y),
            GridPoint::new(x + 1, y),
            GridPoint::new(x, y - 1),
            GridPoint::new(x, y + 1),
            GridPoint::new(x - 1, y + 1),
            GridPoint::new(x + 1, y + 1),
            GridPoint::new(x - 1, y - 1),
            GridPoint::new(x + 1, y - 1),
        ]
    }
}
