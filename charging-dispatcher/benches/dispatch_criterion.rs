use charging_dispatcher::{
    ApiKeyAuthority, ApiKeyProfile, DispatchRequest, Dispatcher, DispatcherConfig, HostEntry,
    ProfileStore, ProfileTables, RoutingProfile,
};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use integration_test_utils::{AttributeEngine, MemoryConnector, MemoryReplica};
use serde_json::json;
use std::sync::Arc;
use tokio::runtime::Builder;

const API_KEY_ROWS: usize = 1024;
const TENANT: &str = "cgrates.org";

fn tables(primary: &str, secondary: &str) -> ProfileTables {
    let api_keys = (0..API_KEY_ROWS)
        .map(|i| ApiKeyProfile::new(&format!("key-{i}"), TENANT, &["AttributeSv1"], "DSP1"))
        .collect();
    ProfileTables::build(
        api_keys,
        vec![RoutingProfile::new(
            "DSP1",
            TENANT,
            "AttributeSv1",
            vec![
                HostEntry::new("ENGINE1", primary, 20.0),
                HostEntry::new("ENGINE2", secondary, 10.0),
            ],
        )],
    )
    .expect("benchmark tables should build")
}

fn dispatch_criterion(c: &mut Criterion) {
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("benchmark runtime should build");

    let authority = ApiKeyAuthority::new(ProfileStore::new(tables("a:1", "b:1")));
    let mut authorization_group = c.benchmark_group("authorization");
    authorization_group.bench_function("authorize_method", |b| {
        b.iter(|| {
            let profile = authority
                .authorize_method(black_box("key-512"), TENANT, "AttributeSv1", "Ping")
                .expect("key should be authorized");
            black_box(profile);
        });
    });
    authorization_group.bench_function("unknown_key", |b| {
        b.iter(|| {
            let err =
                authority.authorize_method(black_box("missing"), TENANT, "AttributeSv1", "Ping");
            black_box(err.is_err());
        });
    });
    authorization_group.finish();

    let engine1 = MemoryReplica::new("engine1.local:2012", AttributeEngine::new("ENGINE1", &[]));
    let engine2 = MemoryReplica::new("engine2.local:2012", AttributeEngine::new("ENGINE2", &[]));
    let connector = Arc::new(MemoryConnector::new());
    connector.register(engine1.clone());
    connector.register(engine2.clone());
    let dispatcher = runtime
        .block_on(Dispatcher::new(
            "bench",
            DispatcherConfig::default(),
            connector,
            Arc::new(tables(engine1.address(), engine2.address())),
        ))
        .expect("benchmark dispatcher should build");
    let request = DispatchRequest::new("key-512", TENANT, "AttributeSv1", "Ping", json!({}));

    let mut dispatch_group = c.benchmark_group("dispatch");
    dispatch_group.bench_function("primary_live", |b| {
        b.iter(|| {
            let reply = runtime.block_on(dispatcher.dispatch(request.clone()));
            black_box(reply.expect("ping should succeed"));
        });
    });

    engine1.stop();
    dispatch_group.bench_function("primary_down", |b| {
        b.iter(|| {
            let reply = runtime.block_on(dispatcher.dispatch(request.clone()));
            black_box(reply.expect("secondary should answer"));
        });
    });
    dispatch_group.finish();
}

criterion_group!(benches, dispatch_criterion);
criterion_main!(benches);
