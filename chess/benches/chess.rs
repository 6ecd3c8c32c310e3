use criterion::{black_box, criterion_group, criterion_main, Criterion};
use gambit::{movegen, Board, Color, Layout, Make, Square};

const BOARDS: [(&str, &str); 6] = [
    (
        "initial",
        "RNBQKBNR\nPPPPPPPP\n\n\n\n\npppppppp\nrnbqkbnr",
    ),
    (
        "sicilian",
        "R.B.K..R\n..QNBPPP\nP..PPN..\n.P....b.\n...nppp.\n..n..q..\nppp....p\n..kr.b.r",
    ),
    ("queen", "......k.\n\n\n.K...Q..\n...q....\n\n\n"),
    ("pawn_move", "....K...\nPPPPPPPP\n\n\n\n\npppppppp\n....k..."),
    ("pawn_attack", "....K...\n\n\nPPPPPPPP\npppppppp\n\n\n....k..."),
    ("pawn_promote", "\npppppppp\n\n..K.k...\n\n\nPPPPPPPP\n"),
];

fn boards() -> impl Iterator<Item = (&'static str, Board)> {
    BOARDS.iter().map(|&(name, layout)| {
        let layout: Layout = layout.parse().unwrap();
        (name, Board::try_from(layout).unwrap())
    })
}

fn bench_legal_moves(c: &mut Criterion) {
    let mut group = c.benchmark_group("legal_moves");
    for (name, mut board) in boards() {
        group.bench_function(name, |b| {
            b.iter(|| black_box(movegen::legal_moves(&mut board, None, Color::White).len()))
        });
    }
}

fn bench_make_move(c: &mut Criterion) {
    let mut group = c.benchmark_group("make_move");
    for (name, mut board) in boards() {
        let moves = movegen::legal_moves(&mut board, None, Color::White);
        group.bench_function(name, |b| {
            b.iter(|| {
                for mv in &moves {
                    let mut mv = *mv;
                    if mv.is_promotion() {
                        mv.set_promotion(gambit::PieceKind::Queen).unwrap();
                    }
                    mv.make_raw(&mut board).unwrap();
                    mv.unmake(&mut board);
                }
            })
        });
    }
}

fn bench_is_attacked(c: &mut Criterion) {
    let mut group = c.benchmark_group("is_attacked");
    for (name, board) in boards() {
        group.bench_function(name, |b| {
            b.iter(|| {
                for color in [Color::White, Color::Black] {
                    for sq in Square::iter() {
                        black_box(board.is_attacked(sq, color));
                    }
                }
            })
        });
    }
}

fn bench_has_legal_moves(c: &mut Criterion) {
    let mut group = c.benchmark_group("has_legal_moves");
    for (name, mut board) in boards() {
        group.bench_function(name, |b| {
            b.iter(|| black_box(movegen::has_legal_moves(&mut board, None, Color::Black)))
        });
    }
}

criterion_group!(
    chess,
    bench_legal_moves,
    bench_make_move,
    bench_is_attacked,
    bench_has_legal_moves,
);

criterion_main!(chess);
