use super::context::ResolutionContext;
use async_trait::async_trait;
use futures::future::BoxFuture;

/// One step of a resolve pass. Plugins run in registration order on the same context.
pub trait ResolvePlugin: Send + Sync {
    fn name(&self) -> &str;

    fn resolve(&self, ctx: &mut ResolutionContext) -> eyre::Result<()>;
}

#[async_trait]
pub trait AsyncResolvePlugin: Send + Sync {
    fn name(&self) -> &str;

    async fn resolve(&self, ctx: &mut ResolutionContext) -> eyre::Result<()>;
}

/// Plugin backed by a closure.
pub struct FnPlugin<F> {
    name: String,
    f: F,
}

impl<F> FnPlugin<F>
where
    F: Fn(&mut ResolutionContext) -> eyre::Result<()> + Send + Sync,
{
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self { name: name.into(), f }
    }
}

impl<F> ResolvePlugin for FnPlugin<F>
where
    F: Fn(&mut ResolutionContext) -> eyre::Result<()> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn resolve(&self, ctx: &mut ResolutionContext) -> eyre::Result<()> {
        (self.f)(ctx)
    }
}

/// Async plugin backed by a closure returning a boxed future, e.g.
/// `|ctx| Box::pin(async move { ... })`.
pub struct AsyncFnPlugin<F> {
    name: String,
    f: F,
}

impl<F> AsyncFnPlugin<F>
where
    F: for<'a> Fn(&'a mut ResolutionContext) -> BoxFuture<'a, eyre::Result<()>> + Send + Sync,
{
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self { name: name.into(), f }
    }
}

#[async_trait]
impl<F> AsyncResolvePlugin for AsyncFnPlugin<F>
where
    F: for<'a> Fn(&'a mut ResolutionContext) -> BoxFuture<'a, eyre::Result<()>> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn resolve(&self, ctx: &mut ResolutionContext) -> eyre::Result<()> {
        (self.f)(ctx).await
    }
}

/// Runs a synchronous plugin inline in an async chain.
pub struct SyncPlugin<P>(pub P);

#[async_trait]
impl<P: ResolvePlugin> AsyncResolvePlugin for SyncPlugin<P> {
    fn name(&self) -> &str {
        self.0.name()
    }

    async fn resolve(&self, ctx: &mut ResolutionContext) -> eyre::Result<()> {
        self.0.resolve(ctx)
    }
}
