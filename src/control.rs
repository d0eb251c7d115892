use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::path::Path;
use std::rc::Rc;

use crate::config::StreamConfig;
use crate::errors::{Result, StreamError};
use crate::provider::{
    BufferedProvider, ContentProvider, GeneratorProvider,
};
use crate::session::{ProgressFn, StreamSession};

/// Request methods a route can be installed for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Head,
    Post,
}

/// Shared, reentrant progress hook attached to a route; each session
/// gets its own adapter over it.
pub type ProgressHook = Rc<dyn Fn(u64, u64)>;

/// Per-route registration options.
pub struct RouteOptions {
    /// Chunk capacity for the route; `0` uses the configured default.
    pub chunk_size: usize,
    /// Invoked after every delivered chunk with
    /// `(cumulative bytes, total)`.
    pub progress: Option<ProgressHook>,
}

impl Default for RouteOptions {
    fn default() -> Self {
        Self {
            chunk_size: 0,
            progress: None,
        }
    }
}

type ProviderFactory = Box<dyn Fn() -> Result<Box<dyn ContentProvider>>>;

enum RouteSource {
    /// Builds a fresh provider per delivery.
    Factory(ProviderFactory),
    /// Pre-built provider handed to the first session and gone after.
    OneShot(Option<Box<dyn ContentProvider>>),
}

struct Route {
    chunk_capacity: usize,
    progress: Option<ProgressHook>,
    source: RouteSource,
}

/// Registration surface the host transport consumes.
///
/// Routes are keyed by method and path. The transport resolves a
/// request to a route, opens a session, declares
/// [`StreamSession::total_size`] and [`StreamSession::mime_type`],
/// then pulls chunks until the session returns `0`.
///
/// Registration fails fast: every parameter is validated before a
/// handler is installed, and a failed call leaves the route table
/// untouched.
pub struct StreamControl {
    config: StreamConfig,
    routes: HashMap<(Method, String), Route>,
}

impl StreamControl {
    /// Control surface over an explicit configuration.
    pub fn new(config: StreamConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            routes: HashMap::new(),
        })
    }

    /// The configuration this control was built with.
    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    fn validate_route_path(path: &str) -> Result<()> {
        if path.is_empty() || !path.starts_with('/') {
            return Err(StreamError::InvalidParameter(format!(
                "route path must start with '/', got {:?}",
                path
            )));
        }
        Ok(())
    }

    fn install(
        &mut self,
        method: Method,
        path: &str,
        route: Route,
    ) -> Result<()> {
        match self.routes.entry((method, path.to_string())) {
            Entry::Occupied(_) => Err(StreamError::Transport(format!(
                "handler already installed for {:?} {}",
                method, path
            ))),
            Entry::Vacant(slot) => {
                slot.insert(route);
                log::info!(
                    "control: installed handler for {:?} {}",
                    method,
                    path
                );
                Ok(())
            }
        }
    }

    /// Serve a file, opening a fresh buffered provider per delivery.
    ///
    /// The file must exist and be openable at registration time;
    /// nothing is installed on failure.
    pub fn register_file<P: AsRef<Path>>(
        &mut self,
        method: Method,
        path: &str,
        file_path: P,
        opts: RouteOptions,
    ) -> Result<()> {
        Self::validate_route_path(path)?;
        let chunk_capacity =
            self.config.resolve_chunk_size(opts.chunk_size)?;

        let file_path = file_path.as_ref().to_path_buf();
        // probe the construction once so a missing or unreadable file
        // is reported here instead of at the first request
        BufferedProvider::from_path(&file_path, chunk_capacity)?;

        let factory = move || -> Result<Box<dyn ContentProvider>> {
            let provider =
                BufferedProvider::from_path(&file_path, chunk_capacity)?;
            Ok(Box::new(provider))
        };
        self.install(
            method,
            path,
            Route {
                chunk_capacity,
                progress: opts.progress,
                source: RouteSource::Factory(Box::new(factory)),
            },
        )
    }

    /// Serve procedurally generated content of `total_size` bytes.
    pub fn register_generator(
        &mut self,
        method: Method,
        path: &str,
        generator: impl Fn(&mut [u8], u64) -> usize + 'static,
        total_size: u64,
        mime: &str,
        opts: RouteOptions,
    ) -> Result<()> {
        Self::validate_route_path(path)?;
        let chunk_capacity =
            self.config.resolve_chunk_size(opts.chunk_size)?;

        let generator = Rc::new(generator);
        let mime = mime.to_string();
        let factory = move || -> Result<Box<dyn ContentProvider>> {
            let generator = generator.clone();
            Ok(Box::new(GeneratorProvider::new(
                move |buf, offset| generator(buf, offset),
                total_size,
                &mime,
            )))
        };
        self.install(
            method,
            path,
            Route {
                chunk_capacity,
                progress: opts.progress,
                source: RouteSource::Factory(Box::new(factory)),
            },
        )
    }

    /// Install an already-built provider.
    ///
    /// The provider is handed to the first session opened on the
    /// route — a single-owner transfer, not a shared handle — so the
    /// route serves exactly one delivery.
    pub fn register_provider(
        &mut self,
        method: Method,
        path: &str,
        provider: Box<dyn ContentProvider>,
        opts: RouteOptions,
    ) -> Result<()> {
        Self::validate_route_path(path)?;
        let chunk_capacity =
            self.config.resolve_chunk_size(opts.chunk_size)?;
        if !provider.is_ready() {
            return Err(StreamError::Provider(
                path.to_owned(),
                "provider is not ready".to_owned(),
            ));
        }

        self.install(
            method,
            path,
            Route {
                chunk_capacity,
                progress: opts.progress,
                source: RouteSource::OneShot(Some(provider)),
            },
        )
    }

    /// Install a provider-construction closure invoked per delivery.
    pub fn register_factory(
        &mut self,
        method: Method,
        path: &str,
        factory: impl Fn() -> Result<Box<dyn ContentProvider>> + 'static,
        opts: RouteOptions,
    ) -> Result<()> {
        Self::validate_route_path(path)?;
        let chunk_capacity =
            self.config.resolve_chunk_size(opts.chunk_size)?;

        self.install(
            method,
            path,
            Route {
                chunk_capacity,
                progress: opts.progress,
                source: RouteSource::Factory(Box::new(factory)),
            },
        )
    }

    /// Remove a handler. Returns whether one was installed.
    pub fn unregister(&mut self, method: Method, path: &str) -> bool {
        let removed = self
            .routes
            .remove(&(method, path.to_string()))
            .is_some();
        if removed {
            log::info!(
                "control: removed handler for {:?} {}",
                method,
                path
            );
        }
        removed
    }

    /// Open a delivery session for a request.
    ///
    /// Constructs (or takes) the route's provider, checks readiness,
    /// and moves it into the session — the single owner for the rest
    /// of the delivery.
    pub fn open_session(
        &mut self,
        method: Method,
        path: &str,
    ) -> Result<StreamSession> {
        let route = self
            .routes
            .get_mut(&(method, path.to_string()))
            .ok_or_else(|| StreamError::NotFound(path.to_string()))?;

        let provider = match &mut route.source {
            RouteSource::Factory(factory) => factory()?,
            RouteSource::OneShot(slot) => slot.take().ok_or_else(|| {
                StreamError::Provider(
                    path.to_owned(),
                    "one-shot provider already consumed".to_owned(),
                )
            })?,
        };
        if !provider.is_ready() {
            return Err(StreamError::Provider(
                path.to_owned(),
                "provider is not ready".to_owned(),
            ));
        }

        let progress = route.progress.clone().map(|hook| {
            Box::new(move |sent: u64, total: u64| hook(sent, total))
                as ProgressFn
        });

        Ok(StreamSession::new(
            path,
            provider,
            route.chunk_capacity,
            self.config.timeout(),
            progress,
        ))
    }
}
