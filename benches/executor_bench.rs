use async_trait::async_trait;
use criterion::{Criterion, criterion_group, criterion_main};
use lazy_static::lazy_static;
use serde_json::{Value, json};
use std::sync::Arc;
use tx_pipeline::resolver::{CachedObjectResolver, GasDefaultsPlugin, NormalizePureInputs};
use tx_pipeline::{
    AsyncSubmitClient, BlockingExecutor, CachingExecutor, Executor, ObjectCache, ObjectSnapshot, Resolver, SubmitClient,
    SubmitError, Transaction,
};

lazy_static! {
    static ref OBJECT_CACHE: Arc<ObjectCache> = {
        let cache = ObjectCache::new();
        for i in 0..64 {
            cache.set_owned_object(ObjectSnapshot::new(format!("0x{:x}", i), 1, "Digest"));
        }
        Arc::new(cache)
    };
}

struct StaticNode;

impl StaticNode {
    fn response() -> Value {
        json!({ "digest": "0xtx", "effects": { "status": { "status": "success" }, "changedObjects": [] } })
    }
}

impl SubmitClient for StaticNode {
    fn call(&self, _method: &str, _params: Vec<Value>) -> Result<Value, SubmitError> {
        Ok(Self::response())
    }
}

#[async_trait]
impl AsyncSubmitClient for StaticNode {
    async fn call(&self, _method: &str, _params: Vec<Value>) -> Result<Value, SubmitError> {
        Ok(Self::response())
    }
}

fn build_transaction(inputs: usize) -> Transaction {
    let mut tx = Transaction::new();
    tx.set_sender("0xsender");
    let mut args = Vec::with_capacity(inputs * 2);
    for i in 0..inputs {
        args.push(tx.object(format!("0x{:x}", i)).unwrap());
        args.push(tx.pure_value(json!({ "amount": i })).unwrap());
    }
    tx.move_call("0x2::pay::join_all", args, vec![]).unwrap();
    tx
}

fn resolver() -> Resolver {
    let mut resolver = Resolver::new();
    resolver
        .add_plugin(NormalizePureInputs)
        .add_plugin(CachedObjectResolver::new(Arc::clone(&OBJECT_CACHE)))
        .add_plugin(GasDefaultsPlugin::default());
    resolver
}

fn benchmark_resolver(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolver");
    let resolver = resolver();
    let tx = build_transaction(32);

    group.bench_function("resolve_32_objects", |b| b.iter(|| resolver.resolve(tx.clone())));
    group.finish();
}

fn benchmark_executor(c: &mut Criterion) {
    let mut group = c.benchmark_group("executor");
    let executor = CachingExecutor::new(Arc::new(StaticNode), Arc::new(ObjectCache::new()));
    let tx = build_transaction(8);
    let _ = executor.execute_blocking(&tx);

    group.bench_function("cache_hit_blocking", |b| b.iter(|| executor.execute_blocking(&tx)));

    let runtime = tokio::runtime::Runtime::new().unwrap();
    group.bench_function("cache_hit_async", |b| b.to_async(&runtime).iter(|| executor.execute(&tx)));
    group.finish();
}

criterion_group!(benches, benchmark_resolver, benchmark_executor);
criterion_main!(benches);
