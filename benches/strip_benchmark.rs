// Strip benchmarks over users with growing post arrays
use bson::{DateTime, doc};
use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use docstrip::{Document, Model, Models, PathType, Schema, StripOptions, install};

fn user_model() -> Model {
    let mut post = Schema::new("Post")
        .with_path("title", PathType::Scalar)
        .with_path("body", PathType::Scalar)
        .with_path("internal", PathType::Scalar);
    post.plugin(install, Some(StripOptions::new(["internal"])));

    let mut user = Schema::new("User")
        .with_path("username", PathType::Scalar)
        .with_path("createdAt", PathType::Scalar)
        .with_path("posts", PathType::document_array(&post.into_shared()));
    user.plugin(install, Some(StripOptions::new(["createdAt"])));

    let mut models = Models::new();
    models.model("User", user.into_shared()).unwrap()
}

fn generate_user(model: &Model, posts: usize) -> Document {
    let mut user = model
        .create(doc! {"username": "bench", "createdAt": DateTime::now()})
        .unwrap();
    for i in 0..posts {
        user.push(
            "posts",
            doc! {"title": format!("post {i}"), "body": "lorem ipsum", "internal": "secret"},
        )
        .unwrap();
    }
    user
}

fn bench_strip(c: &mut Criterion) {
    let model = user_model();
    let mut group = c.benchmark_group("strip_paths");

    for posts in [0usize, 10, 100, 1000] {
        let user = generate_user(&model, posts);
        group.bench_with_input(BenchmarkId::from_parameter(posts), &user, |b, user| {
            b.iter_batched(
                || user.clone(),
                |mut doc| {
                    doc.strip_paths().unwrap();
                    black_box(doc)
                },
                criterion::BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

criterion_group!(benches, bench_strip);
criterion_main!(benches);
