use crossterm::event::KeyEvent;
use rand::rngs::StdRng;
use rand::Rng;
use ratatui::style::Color;

use crate::config::Game2048Config;
use crate::games::grid::Direction;
use crate::games::{Game, GameKind};
use crate::host::Host;
use crate::scheduler::{Input, ListenerId};

const CELL: f32 = 110.0;
const GAP: f32 = 12.0;
const BORDER: f32 = 14.0;
const FOUR_CHANCE: f64 = 0.1;

const BACKPLATE_COLOR: Color = Color::Rgb(242, 243, 255);
const EMPTY_COLOR: Color = Color::Rgb(255, 255, 255);
const TILE_COLOR: Color = Color::Rgb(255, 226, 240);
const TEXT_COLOR: Color = Color::Rgb(34, 34, 34);

/// What a single move did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The game is not running.
    Ignored,
    /// No cell changed, nothing spawned.
    Unchanged,
    Moved,
    /// The move locked the board and ended the game.
    GameOver,
}

/// Remove gaps and merge equal neighbours toward index 0.
///
/// Each tile merges at most once per call. Returns the new row, padded with
/// zeros to the input length, and the sum of all merged values.
pub fn compact_left(row: &[u32]) -> (Vec<u32>, u32) {
    let tiles: Vec<u32> = row.iter().copied().filter(|v| *v != 0).collect();
    let mut out = Vec::with_capacity(row.len());
    let mut gained = 0;

    let mut i = 0;
    while i < tiles.len() {
        if i + 1 < tiles.len() && tiles[i] == tiles[i + 1] {
            let merged = tiles[i] * 2;
            gained += merged;
            out.push(merged);
            i += 2;
        } else {
            out.push(tiles[i]);
            i += 1;
        }
    }

    out.resize(row.len(), 0);
    (out, gained)
}

/// Coordinate change that turns a move direction into a move to the left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Transform {
    Identity,
    Mirror,
    Transpose,
    TransposeMirror,
}

impl Transform {
    fn for_direction(dir: Direction) -> Self {
        match dir {
            Direction::Left => Transform::Identity,
            Direction::Right => Transform::Mirror,
            Direction::Up => Transform::Transpose,
            Direction::Down => Transform::TransposeMirror,
        }
    }

    fn apply(self, board: &Board) -> Board {
        match self {
            Transform::Identity => board.clone(),
            Transform::Mirror => board.mirrored(),
            Transform::Transpose => board.transposed(),
            Transform::TransposeMirror => board.transposed().mirrored(),
        }
    }

    fn invert(self, board: &Board) -> Board {
        match self {
            Transform::Identity => board.clone(),
            Transform::Mirror => board.mirrored(),
            Transform::Transpose => board.transposed(),
            Transform::TransposeMirror => board.mirrored().transposed(),
        }
    }
}

/// Square grid of tile values, 0 meaning empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    cells: Vec<Vec<u32>>,
}

impl Board {
    pub fn new(size: usize) -> Self {
        Self {
            cells: vec![vec![0; size]; size],
        }
    }

    #[cfg(test)]
    pub fn from_rows(rows: Vec<Vec<u32>>) -> Self {
        debug_assert!(rows.iter().all(|r| r.len() == rows.len()));
        Self { cells: rows }
    }

    pub fn size(&self) -> usize {
        self.cells.len()
    }

    pub fn get(&self, row: usize, col: usize) -> u32 {
        self.cells[row][col]
    }

    fn mirrored(&self) -> Board {
        let cells = self
            .cells
            .iter()
            .map(|row| row.iter().rev().copied().collect())
            .collect();
        Board { cells }
    }

    fn transposed(&self) -> Board {
        let n = self.size();
        let cells = (0..n)
            .map(|c| (0..n).map(|r| self.cells[r][c]).collect())
            .collect();
        Board { cells }
    }

    /// The board after sliding every tile toward `dir`, plus points gained.
    pub fn slide(&self, dir: Direction) -> (Board, u32) {
        let transform = Transform::for_direction(dir);
        let mut gained = 0;
        let cells = transform
            .apply(self)
            .cells
            .iter()
            .map(|row| {
                let (row, points) = compact_left(row);
                gained += points;
                row
            })
            .collect();
        (transform.invert(&Board { cells }), gained)
    }

    fn empty_cells(&self) -> Vec<(usize, usize)> {
        let mut empties = Vec::new();
        for (r, row) in self.cells.iter().enumerate() {
            for (c, v) in row.iter().enumerate() {
                if *v == 0 {
                    empties.push((r, c));
                }
            }
        }
        empties
    }

    /// Place a 2 (or, one time in ten, a 4) on a random empty cell.
    pub fn spawn(&mut self, rng: &mut StdRng) -> bool {
        let empties = self.empty_cells();
        if empties.is_empty() {
            return false;
        }
        let (r, c) = empties[rng.gen_range(0..empties.len())];
        self.cells[r][c] = if rng.gen_bool(FOUR_CHANCE) { 4 } else { 2 };
        true
    }

    /// Full, and no two neighbours share a value.
    pub fn is_locked(&self) -> bool {
        let n = self.size();
        if !self.empty_cells().is_empty() {
            return false;
        }
        for r in 0..n {
            for c in 0..n {
                let v = self.cells[r][c];
                if r + 1 < n && self.cells[r + 1][c] == v {
                    return false;
                }
                if c + 1 < n && self.cells[r][c + 1] == v {
                    return false;
                }
            }
        }
        true
    }
}

pub struct Game2048 {
    size: usize,
    rng: StdRng,
    board: Option<Board>,
    score: u32,
    keys: Option<ListenerId>,
}

impl Game2048 {
    pub fn new(config: &Game2048Config, rng: StdRng) -> Self {
        Self {
            size: config.size,
            rng,
            board: None,
            score: 0,
            keys: None,
        }
    }

    #[cfg(test)]
    pub fn board(&self) -> Option<&Board> {
        self.board.as_ref()
    }

    /// Slide the tiles toward `dir`.
    pub fn move_tiles(&mut self, dir: Direction, host: &mut Host) -> MoveOutcome {
        let Some(board) = self.board.as_mut() else {
            return MoveOutcome::Ignored;
        };

        let (next, gained) = board.slide(dir);
        if next == *board {
            return MoveOutcome::Unchanged;
        }

        *board = next;
        self.score += gained;
        board.spawn(&mut self.rng);
        let locked = board.is_locked();
        self.draw(host);

        if locked {
            log::info!("2048 locked with score {}", self.score);
            host.set_status(format!(
                "Game over! Score: {} (pick a game to play again)",
                self.score
            ));
            self.stop(host);
            return MoveOutcome::GameOver;
        }

        host.set_status(format!("2048: arrow keys / WASD. Score: {}", self.score));
        MoveOutcome::Moved
    }

    fn draw(&self, host: &mut Host) {
        let Some(board) = self.board.as_ref() else {
            return;
        };
        let canvas = &mut host.canvas;
        canvas.clear();

        let n = board.size() as f32;
        let room = canvas.width().min(canvas.height()) - 2.0 * BORDER;
        let cell = CELL.min((room - (n - 1.0) * GAP) / n);
        let side = n * cell + (n - 1.0) * GAP;
        let x0 = (canvas.width() - side) / 2.0;
        let y0 = (canvas.height() - side) / 2.0;

        canvas.fill_rect(
            x0 - BORDER,
            y0 - BORDER,
            side + 2.0 * BORDER,
            side + 2.0 * BORDER,
            BACKPLATE_COLOR,
        );

        for r in 0..board.size() {
            for c in 0..board.size() {
                let x = x0 + c as f32 * (cell + GAP);
                let y = y0 + r as f32 * (cell + GAP);
                let v = board.get(r, c);
                let color = if v == 0 { EMPTY_COLOR } else { TILE_COLOR };
                canvas.fill_rect(x, y, cell, cell, color);
                if v != 0 {
                    canvas.text(x + cell / 2.0, y + cell / 2.0, v.to_string(), TEXT_COLOR);
                }
            }
        }
    }
}

impl Game for Game2048 {
    fn kind(&self) -> GameKind {
        GameKind::Game2048
    }

    fn start(&mut self, host: &mut Host) {
        self.stop(host);

        let mut board = Board::new(self.size);
        board.spawn(&mut self.rng);
        board.spawn(&mut self.rng);
        self.board = Some(board);
        self.score = 0;

        self.keys = Some(host.scheduler.listen(Input::Key));
        log::debug!("2048 started on a {0}x{0} board", self.size);

        self.draw(host);
        host.set_status("2048: arrow keys / WASD.");
    }

    fn stop(&mut self, host: &mut Host) {
        if let Some(keys) = self.keys.take() {
            host.scheduler.unlisten(keys);
        }
        self.board = None;
        host.canvas.clear();
    }

    fn handle_input(&mut self, key: KeyEvent, host: &mut Host) {
        if let Some(dir) = Direction::from_key(&key) {
            self.move_tiles(dir, host);
        }
    }

    fn get_score(&self) -> u32 {
        self.score
    }

    fn is_running(&self) -> bool {
        self.board.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::seeded_rng;

    fn board(rows: &[&[u32]]) -> Board {
        Board::from_rows(rows.iter().map(|r| r.to_vec()).collect())
    }

    fn game_with(rows: &[&[u32]], host: &mut Host) -> Game2048 {
        let config = Game2048Config { size: rows.len() };
        let mut game = Game2048::new(&config, seeded_rng(Some(42)));
        game.start(host);
        game.board = Some(board(rows));
        game
    }

    #[test]
    fn compact_examples() {
        assert_eq!(compact_left(&[2, 2, 0, 4]), (vec![4, 4, 0, 0], 4));
        assert_eq!(compact_left(&[2, 2, 2, 2]), (vec![4, 4, 0, 0], 8));
        assert_eq!(compact_left(&[0, 0, 0, 2]), (vec![2, 0, 0, 0], 0));
        assert_eq!(compact_left(&[4, 4, 8, 0]), (vec![8, 8, 0, 0], 8));
        assert_eq!(compact_left(&[2, 4, 8, 16]), (vec![2, 4, 8, 16], 0));
        assert_eq!(compact_left(&[2, 0, 2, 2]), (vec![4, 2, 0, 0], 4));
        assert_eq!(compact_left(&[0, 0, 0, 0]), (vec![0, 0, 0, 0], 0));
    }

    #[test]
    fn settled_rows_are_fixed_points() {
        for row in [[2, 0, 4, 0], [0, 2, 2, 8], [2, 4, 8, 16], [0, 0, 0, 0], [0, 16, 0, 2]] {
            let (once, _) = compact_left(&row);
            let (twice, gained) = compact_left(&once);
            assert_eq!(twice, once, "{row:?}");
            assert_eq!(gained, 0);
        }
    }

    #[test]
    fn each_tile_merges_once_per_pass() {
        // A merged 4 is not merged again with its new neighbour in the same pass.
        let (once, gained) = compact_left(&[2, 2, 0, 4]);
        assert_eq!((once.clone(), gained), (vec![4, 4, 0, 0], 4));
        // The next pass is a new move, so the pair may merge then.
        assert_eq!(compact_left(&once), (vec![8, 0, 0, 0], 8));
    }

    #[test]
    fn slide_in_every_direction() {
        let b = board(&[
            &[2, 0, 0, 2],
            &[0, 4, 0, 0],
            &[0, 4, 0, 0],
            &[2, 0, 0, 0],
        ]);

        let (left, gained) = b.slide(Direction::Left);
        assert_eq!(left, board(&[&[4, 0, 0, 0], &[4, 0, 0, 0], &[4, 0, 0, 0], &[2, 0, 0, 0]]));
        assert_eq!(gained, 4);

        let (right, _) = b.slide(Direction::Right);
        assert_eq!(right, board(&[&[0, 0, 0, 4], &[0, 0, 0, 4], &[0, 0, 0, 4], &[0, 0, 0, 2]]));

        let (up, gained) = b.slide(Direction::Up);
        assert_eq!(up, board(&[&[4, 8, 0, 2], &[0, 0, 0, 0], &[0, 0, 0, 0], &[0, 0, 0, 0]]));
        assert_eq!(gained, 12);

        let (down, _) = b.slide(Direction::Down);
        assert_eq!(down, board(&[&[0, 0, 0, 0], &[0, 0, 0, 0], &[0, 0, 0, 0], &[4, 8, 0, 2]]));
    }

    #[test]
    fn merges_toward_the_move() {
        // Three in a column: the pair nearest the destination merges.
        let b = board(&[&[2, 0, 0], &[2, 0, 0], &[2, 0, 0]]);
        assert_eq!(b.slide(Direction::Up).0, board(&[&[4, 0, 0], &[2, 0, 0], &[0, 0, 0]]));
        assert_eq!(b.slide(Direction::Down).0, board(&[&[0, 0, 0], &[2, 0, 0], &[4, 0, 0]]));
    }

    #[test]
    fn locked_board() {
        let checker = board(&[
            &[2, 4, 2, 4],
            &[4, 2, 4, 2],
            &[2, 4, 2, 4],
            &[4, 2, 4, 2],
        ]);
        assert!(checker.is_locked());

        let with_gap = board(&[
            &[2, 4, 2, 4],
            &[4, 2, 4, 2],
            &[2, 4, 0, 4],
            &[4, 2, 4, 2],
        ]);
        assert!(!with_gap.is_locked());

        let vertical_pair = board(&[
            &[2, 4, 2, 4],
            &[4, 2, 4, 2],
            &[2, 4, 2, 4],
            &[2, 8, 16, 32],
        ]);
        assert!(!vertical_pair.is_locked());
    }

    #[test]
    fn spawn_fills_an_empty_cell_with_2_or_4() {
        let mut rng = seeded_rng(Some(1));
        let mut fours = 0;
        for _ in 0..200 {
            let mut b = board(&[&[2, 4], &[8, 0]]);
            assert!(b.spawn(&mut rng));
            let v = b.get(1, 1);
            assert!(v == 2 || v == 4);
            if v == 4 {
                fours += 1;
            }
        }
        assert!(fours > 0 && fours < 60);

        let mut full = board(&[&[2, 4], &[8, 16]]);
        assert!(!full.spawn(&mut rng));
    }

    #[test]
    fn unchanged_move_does_not_spawn() {
        let mut host = Host::new(960.0, 540.0);
        let rows: &[&[u32]] = &[&[2, 4, 8, 16], &[0, 0, 0, 0], &[0, 0, 0, 0], &[0, 0, 0, 0]];
        let mut game = game_with(rows, &mut host);

        assert_eq!(game.move_tiles(Direction::Left, &mut host), MoveOutcome::Unchanged);
        assert_eq!(game.board().unwrap(), &board(rows));
        assert_eq!(game.get_score(), 0);
    }

    #[test]
    fn changed_move_spawns_exactly_one_tile() {
        let mut host = Host::new(960.0, 540.0);
        let rows: &[&[u32]] = &[&[2, 2, 2, 2], &[0, 0, 0, 0], &[0, 0, 0, 0], &[0, 0, 0, 0]];
        let mut game = game_with(rows, &mut host);

        assert_eq!(game.move_tiles(Direction::Left, &mut host), MoveOutcome::Moved);
        let b = game.board().unwrap();
        assert_eq!((b.get(0, 0), b.get(0, 1)), (4, 4));
        let tiles = (0..4)
            .flat_map(|r| (0..4).map(move |c| (r, c)))
            .filter(|&(r, c)| b.get(r, c) != 0)
            .count();
        assert_eq!(tiles, 3);
        assert_eq!(game.get_score(), 8);
        assert!(host.status.contains("Score: 8"));
    }

    #[test]
    fn locking_move_ends_the_game() {
        let mut host = Host::new(960.0, 540.0);
        // Sliding left opens the top-right corner; whatever spawns there
        // (2 or 4) sits next to 32 and 128, so the board locks.
        let rows: &[&[u32]] = &[&[0, 8, 16, 32], &[16, 32, 64, 128], &[8, 16, 32, 64], &[16, 32, 64, 128]];
        let mut game = game_with(rows, &mut host);

        assert_eq!(game.move_tiles(Direction::Right, &mut host), MoveOutcome::Unchanged);
        assert_eq!(game.move_tiles(Direction::Left, &mut host), MoveOutcome::GameOver);
        assert!(!game.is_running());
        assert!(host.status.starts_with("Game over!"));
        assert_eq!(host.scheduler.listener_count(), 0);
        assert!(host.canvas.is_blank());
        assert_eq!(game.move_tiles(Direction::Up, &mut host), MoveOutcome::Ignored);
    }

    #[test]
    fn start_places_two_tiles() {
        let mut host = Host::new(960.0, 540.0);
        let mut game = Game2048::new(&Game2048Config::default(), seeded_rng(Some(3)));
        game.start(&mut host);
        let b = game.board().unwrap();
        assert_eq!(b.empty_cells().len(), 14);
        assert!(host.scheduler.is_listening(Input::Key));
        assert_eq!(host.scheduler.task_count(), 0);
        assert!(!host.canvas.is_blank());
    }
}
