//! Cell/wall grid shared by the generator, the pathfinder and the game.

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Dir {
    Up,
    Right,
    Down,
    Left,
}

impl Dir {
    /// Expansion order used everywhere a fixed order matters.
    pub const ALL: [Dir; 4] = [Dir::Up, Dir::Right, Dir::Down, Dir::Left];

    pub fn delta(self) -> (isize, isize) {
        match self {
            Dir::Up => (0, -1),
            Dir::Right => (1, 0),
            Dir::Down => (0, 1),
            Dir::Left => (-1, 0),
        }
    }

    /// Index into `Cell::walls`.
    pub fn index(self) -> usize {
        match self {
            Dir::Up => 0,
            Dir::Right => 1,
            Dir::Down => 2,
            Dir::Left => 3,
        }
    }

    pub fn opposite(self) -> Dir {
        match self {
            Dir::Up => Dir::Down,
            Dir::Right => Dir::Left,
            Dir::Down => Dir::Up,
            Dir::Left => Dir::Right,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pos {
    pub x: usize,
    pub y: usize,
}

impl Pos {
    pub const fn new(x: usize, y: usize) -> Self {
        Pos { x, y }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    /// Indexed by `Dir::index`; `true` blocks movement through that side.
    pub walls: [bool; 4],
    /// Only meaningful while the generator is carving.
    pub visited: bool,
}

impl Cell {
    fn closed() -> Self {
        Cell {
            walls: [true; 4],
            visited: false,
        }
    }

    pub fn has_wall(&self, dir: Dir) -> bool {
        self.walls[dir.index()]
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// A grid with every wall standing and no cell visited.
    pub fn new(width: usize, height: usize) -> Self {
        Grid {
            width,
            height,
            cells: vec![Cell::closed(); width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn in_bounds(&self, pos: Pos) -> bool {
        pos.x < self.width && pos.y < self.height
    }

    /// Panics if `pos` is outside the grid.
    pub fn cell(&self, pos: Pos) -> &Cell {
        &self.cells[pos.y * self.width + pos.x]
    }

    pub(crate) fn cell_mut(&mut self, pos: Pos) -> &mut Cell {
        &mut self.cells[pos.y * self.width + pos.x]
    }

    /// The cell one step away in `dir`, if it lies inside the grid.
    pub fn step(&self, pos: Pos, dir: Dir) -> Option<Pos> {
        let (dx, dy) = dir.delta();
        let nx = pos.x as isize + dx;
        let ny = pos.y as isize + dy;
        if nx < 0 || ny < 0 {
            return None;
        }
        let next = Pos::new(nx as usize, ny as usize);
        self.in_bounds(next).then_some(next)
    }

    /// Up to four grid-adjacent positions, in `Dir::ALL` order.
    pub fn neighbors_in_bounds(&self, pos: Pos) -> Vec<(Pos, Dir)> {
        Dir::ALL
            .iter()
            .filter_map(|&dir| self.step(pos, dir).map(|next| (next, dir)))
            .collect()
    }

    pub fn is_open(&self, pos: Pos, dir: Dir) -> bool {
        !self.cell(pos).has_wall(dir)
    }

    /// Single authority for whether one step from `from` to `to` is legal.
    pub fn can_move(&self, from: Pos, to: Pos) -> bool {
        if !self.in_bounds(from) || !self.in_bounds(to) {
            return false;
        }
        match direction_between(from, to) {
            Some(dir) => self.is_open(from, dir),
            None => false,
        }
    }

    /// Removes the wall on `dir` side of `pos` and the matching wall of the
    /// neighbour. Returns `false` and leaves the grid alone if the neighbour
    /// is out of bounds.
    pub fn open(&mut self, pos: Pos, dir: Dir) -> bool {
        let Some(next) = self.step(pos, dir) else {
            return false;
        };
        self.cell_mut(pos).walls[dir.index()] = false;
        self.cell_mut(next).walls[dir.opposite().index()] = false;
        true
    }

    pub fn positions(&self) -> impl Iterator<Item = Pos> + '_ {
        (0..self.height).flat_map(move |y| (0..self.width).map(move |x| Pos::new(x, y)))
    }

    /// Every open edge between two in-bounds cells, listed once from the
    /// cell on its upper/left side.
    pub fn open_edges(&self) -> Vec<(Pos, Pos)> {
        let mut edges = Vec::new();
        for pos in self.positions() {
            for dir in [Dir::Right, Dir::Down] {
                if let Some(next) = self.step(pos, dir) {
                    if self.is_open(pos, dir) {
                        edges.push((pos, next));
                    }
                }
            }
        }
        edges
    }

    /// True when every interior edge is walled identically from both sides.
    pub fn walls_symmetric(&self) -> bool {
        self.positions().all(|pos| {
            self.neighbors_in_bounds(pos).into_iter().all(|(next, dir)| {
                self.cell(pos).has_wall(dir) == self.cell(next).has_wall(dir.opposite())
            })
        })
    }
}

/// The direction leading from `from` to a grid-adjacent `to`.
pub fn direction_between(from: Pos, to: Pos) -> Option<Dir> {
    let dx = to.x as isize - from.x as isize;
    let dy = to.y as isize - from.y as isize;
    match (dx, dy) {
        (0, -1) => Some(Dir::Up),
        (1, 0) => Some(Dir::Right),
        (0, 1) => Some(Dir::Down),
        (-1, 0) => Some(Dir::Left),
        _ => None,
    }
}
