use criterion::{black_box, criterion_group, criterion_main, Criterion};
use slidesnap::emit::emit_document;
use slidesnap::render_tree::{Rect, RenderTree};
use slidesnap::snapshot;

/// A dense slide: a grid of cards, each with a heading, a paragraph and a list
fn synthetic_tree(cards: usize) -> RenderTree {
    let mut b = RenderTree::builder(Rect::new(0.0, 0.0, 1920.0, 1080.0));
    let root = b.root();
    let slide = b.element(root, "div", Rect::new(0.0, 0.0, 1920.0, 1080.0));
    b.style(slide, "background-color", "rgb(10, 10, 10)");

    for i in 0..cards {
        let x = (i % 8) as f64 * 230.0 + 20.0;
        let y = (i / 8) as f64 * 260.0 + 20.0;
        let card = b.element(slide, "div", Rect::new(x, y, 220.0, 250.0));
        b.style(card, "border-top-width", "1px")
            .style(card, "border-top-style", "solid")
            .style(card, "border-top-color", "rgb(80, 80, 80)");
        let h2 = b.element(card, "h2", Rect::new(x + 10.0, y + 10.0, 200.0, 30.0));
        b.text(h2, "Card title");
        let p = b.element(card, "p", Rect::new(x + 10.0, y + 50.0, 200.0, 60.0));
        b.text(p, "Some body text with ");
        let strong = b.element(p, "strong", Rect::new(x + 10.0, y + 50.0, 40.0, 20.0));
        b.text(strong, "emphasis");
        let ul = b.element(card, "ul", Rect::new(x + 10.0, y + 120.0, 200.0, 120.0));
        for j in 0..4 {
            let li = b.element(ul, "li", Rect::new(x + 10.0, y + 120.0 + j as f64 * 30.0, 200.0, 28.0));
            b.text(li, "item");
        }
    }
    b.build()
}

fn bench_capture(c: &mut Criterion) {
    let tree = synthetic_tree(32);
    c.bench_function("snapshot_capture_32_cards", |b| {
        b.iter(|| snapshot::capture(black_box(&tree)).unwrap())
    });
}

fn bench_emit(c: &mut Criterion) {
    let page = snapshot::capture(&synthetic_tree(32)).unwrap();
    c.bench_function("emit_document_32_cards", |b| {
        b.iter(|| emit_document(black_box(&page)))
    });
}

criterion_group!(benches, bench_capture, bench_emit);
criterion_main!(benches);
