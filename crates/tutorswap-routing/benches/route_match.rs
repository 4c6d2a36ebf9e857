use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tutorswap_routing::{parse_query, Query, Route, RouteArgs, RouteTable};

fn app_table() -> RouteTable {
    RouteTable::new(
        vec![
            Route::new("home", "/", "home").expect("route"),
            Route::new("dashboard", "/dashboard", "dashboard").expect("route"),
            Route::new("browse", "/browse", "browse").expect("route"),
            Route::new("messages", "/messages", "messages").expect("route"),
            Route::new("conversation", "/messages/:id", "messages").expect("route"),
            Route::new("profile", "/profile", "profile").expect("route"),
            Route::new("user", "/profile/:id", "profile").expect("route"),
            Route::new("login", "/login", "login").expect("route"),
            Route::new("signup", "/signup", "signup").expect("route"),
            Route::new("logout", "/logout", "logout").expect("route"),
            Route::hidden("not_found", "404"),
        ],
        "not_found",
    )
    .expect("table")
}

fn bench_resolve(c: &mut Criterion) {
    let table = app_table();
    let paths = [
        "/",
        "/dashboard",
        "/messages/9f31a0",
        "/profile/@ada",
        "/nowhere/at/all",
    ];
    c.bench_function("resolve_typical_paths", |b| {
        b.iter(|| {
            for path in &paths {
                black_box(table.resolve(black_box(path)));
            }
        });
    });
}

fn bench_build(c: &mut Criterion) {
    let table = app_table();
    let args = RouteArgs::new().with("id", "9f31a0");
    let mut query = Query::new();
    query.insert("page".to_string(), "2".to_string());
    query.insert("known".to_string(), "rust,piano".to_string());
    c.bench_function("build_path_with_query", |b| {
        b.iter(|| {
            black_box(
                table
                    .build_path(black_box("user"), &args, &query)
                    .expect("path"),
            );
        });
    });
}

fn bench_parse_query(c: &mut Criterion) {
    c.bench_function("parse_query_skill_filters", |b| {
        b.iter(|| {
            black_box(parse_query(black_box(
                "interests=go%2Cchess&known=rust%2Cpiano&page=3",
            )));
        });
    });
}

criterion_group!(benches, bench_resolve, bench_build, bench_parse_query);
criterion_main!(benches);
