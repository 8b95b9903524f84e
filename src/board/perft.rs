use super::{Board, Move, MoveFilter, MoveList};

impl Board {
    /// Count leaf nodes of the legal move tree to `depth` plies.
    pub fn perft(&mut self, depth: u32) -> u64 {
        if depth == 0 {
            return 1;
        }

        let mut moves = MoveList::new();
        self.generate_moves(&mut moves);

        let mut nodes = 0;
        for &mv in moves.iter() {
            let snapshot = self.snapshot();
            if !self.make_move(mv, MoveFilter::AllMoves) {
                continue;
            }
            nodes += if depth == 1 { 1 } else { self.perft(depth - 1) };
            self.restore(snapshot);
        }

        nodes
    }

    /// Per-root-move perft counts, in generation order.
    pub fn perft_divide(&mut self, depth: u32) -> Vec<(Move, u64)> {
        let mut moves = MoveList::new();
        self.generate_moves(&mut moves);

        let mut counts = Vec::with_capacity(moves.len());
        for &mv in moves.iter() {
            let snapshot = self.snapshot();
            if !self.make_move(mv, MoveFilter::AllMoves) {
                continue;
            }
            let nodes = self.perft(depth.saturating_sub(1));
            self.restore(snapshot);
            counts.push((mv, nodes));
        }
        counts
    }
}
