use super::context::RequestContext;

/// A request handler for one path family.
///
/// A handler that does not recognise the request must leave the context
/// untouched. Endpoint failures are answered by the handler itself; an `Err`
/// returned from `handle` is treated as unexpected and becomes a 500.
pub trait Handler: Send + Sync {
    fn name(&self) -> &'static str;

    fn handle(&self, ctx: &mut RequestContext) -> anyhow::Result<()>;
}

/// Ordered handlers; the first one to respond ends dispatch.
pub struct HandlerChain {
    handlers: Vec<Box<dyn Handler>>,
}

impl HandlerChain {
    pub fn new(handlers: Vec<Box<dyn Handler>>) -> Self {
        Self { handlers }
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.handlers.iter().map(|h| h.name()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub fn dispatch(&self, ctx: &mut RequestContext) -> anyhow::Result<()> {
        for handler in &self.handlers {
            handler.handle(ctx)?;
            if ctx.responded() {
                log::debug!(
                    "{} handled {} {}",
                    handler.name(),
                    ctx.method(),
                    ctx.path()
                );
                break;
            }
        }
        Ok(())
    }
}
