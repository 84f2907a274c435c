//! Wires configuration, routes and processors into a running instance.
//!
//! ```text
//! DaedalusConfig ──┬─► BackgroundConfig ─► ProcessorRegistry ─► Local | Remote QueueManager
//!                  └─► DispatchConfig ───► Dispatcher (user + background routes)
//! ```

use crate::background::{self, RouteSpec};
use crate::error::{BootstrapError, BootstrapResult};
use daedalus_config::{BackgroundMode, BackgroundSection, DaedalusConfig, HttpConfig};
use daedalus_core::{InboundRequest, ModelValidator, Response, TokenManipulator};
use daedalus_middleware::{CorsPolicy, DispatchConfig, Dispatcher, RequestIdPolicy, Route};
use daedalus_tasks::{
    id_to_path, BackgroundConfig, BackgroundHandler, LocalQueueManager, NotificationClient,
    Processor, ProcessorRegistry, QueueClient, QueueManager, QueueMode, RemoteQueueManager,
    RemoteQueueSettings, TaskError, TaskResult,
};
use http::Method;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// Collects everything an [`Instance`] needs.
///
/// # Example
///
/// ```
/// use daedalus::{Instance, Route};
/// use daedalus::tasks::builtin::EchoProcessor;
/// use http::Method;
///
/// let instance = Instance::builder()
///     .route(Method::GET, "/meta/server", Route::new(|_| async { Ok("up") }))
///     .processor(EchoProcessor)
///     .build()
///     .unwrap();
///
/// assert!(instance.queue_manager().is_local());
/// ```
#[derive(Default)]
pub struct InstanceBuilder {
    config: DaedalusConfig,
    routes: Vec<RouteSpec>,
    processors: Vec<Arc<dyn Processor>>,
    validator: Option<Arc<dyn ModelValidator>>,
    token_manipulator: Option<Arc<dyn TokenManipulator>>,
    queue_client: Option<Arc<dyn QueueClient>>,
    notification_client: Option<Arc<dyn NotificationClient>>,
}

impl InstanceBuilder {
    /// Sets the configuration.
    #[must_use]
    pub fn config(mut self, config: DaedalusConfig) -> Self {
        self.config = config;
        self
    }

    /// Registers a route. Earlier routes take priority.
    #[must_use]
    pub fn route(mut self, method: Method, pattern: impl Into<String>, route: Route) -> Self {
        self.routes.push((method, pattern.into(), route));
        self
    }

    /// Registers several routes in order.
    #[must_use]
    pub fn routes(mut self, routes: impl IntoIterator<Item = RouteSpec>) -> Self {
        self.routes.extend(routes);
        self
    }

    /// Registers a processor.
    #[must_use]
    pub fn processor(mut self, processor: impl Processor) -> Self {
        self.processors.push(Arc::new(processor));
        self
    }

    /// Registers several shared processors in order.
    #[must_use]
    pub fn processors(mut self, processors: impl IntoIterator<Item = Arc<dyn Processor>>) -> Self {
        self.processors.extend(processors);
        self
    }

    /// Sets the model validator used by routes and processors.
    #[must_use]
    pub fn validator(mut self, validator: Arc<dyn ModelValidator>) -> Self {
        self.validator = Some(validator);
        self
    }

    /// Sets the token manipulator used by authorized routes.
    #[must_use]
    pub fn token_manipulator(mut self, manipulator: Arc<dyn TokenManipulator>) -> Self {
        self.token_manipulator = Some(manipulator);
        self
    }

    /// Sets the transport clients used in remote mode.
    #[must_use]
    pub fn remote_clients(
        mut self,
        queue: Arc<dyn QueueClient>,
        notifications: Arc<dyn NotificationClient>,
    ) -> Self {
        self.queue_client = Some(queue);
        self.notification_client = Some(notifications);
        self
    }

    /// Validates the configuration and builds the instance.
    ///
    /// # Errors
    ///
    /// - `Config` if the configuration is invalid.
    /// - `Task` if the background setup is unusable: every problem found by
    ///   [`BackgroundConfig::validate`] is reported together. The check is
    ///   skipped for an HTTP-only instance, one with no processors, no
    ///   background paths and local mode.
    /// - `InvalidHeader` for unusable CORS or request ID settings.
    /// - `Dispatch` if a route is malformed or lacks a collaborator.
    pub fn build(self) -> BootstrapResult<Instance> {
        self.config.validate()?;

        let background = background_config(&self.config.background);
        if background_requested(&self.config, &background, &self.processors) {
            let names: Vec<String> = self
                .processors
                .iter()
                .map(|p| p.type_name().to_string())
                .collect();
            let problems = background.validate(&names);
            if !problems.is_empty() {
                return Err(TaskError::invalid_config(problems.join("; ")).into());
            }
        } else {
            tracing::debug!("no background work configured");
        }

        let registry = Arc::new(ProcessorRegistry::new(
            self.processors,
            self.validator.clone(),
        )?);
        let handler = BackgroundHandler::new(Arc::clone(&registry));

        let manager: Arc<dyn QueueManager> = match (&background.mode, &background.remote) {
            (QueueMode::Local, _) => Arc::new(LocalQueueManager::new(handler.clone())),
            (QueueMode::Remote, Some(settings)) => {
                let (queue, notifications) = self
                    .queue_client
                    .zip(self.notification_client)
                    .ok_or_else(|| {
                        TaskError::invalid_config(
                            "Remote mode requires a queue client and a notification client",
                        )
                    })?;
                Arc::new(RemoteQueueManager::new(
                    settings.clone(),
                    registry.process_names(),
                    queue,
                    notifications,
                ))
            }
            (QueueMode::Remote, None) => {
                return Err(TaskError::invalid_config("Remote queue config not defined").into())
            }
        };

        let mut dispatcher = Dispatcher::builder().config(dispatch_config(&self.config.http)?);

        if let Some(path) = &self.config.http.background_submission_path {
            for (method, pattern, route) in
                background::submission_routes(path, Arc::clone(&manager))
            {
                dispatcher = dispatcher.route(method, pattern, route);
            }
        }
        if let Some(path) = &self.config.http.background_meta_path {
            let (method, pattern, route) =
                background::meta_route(path, Arc::clone(&manager), registry.process_names());
            dispatcher = dispatcher.route(method, pattern, route);
        }
        for (method, pattern, route) in self.routes {
            dispatcher = dispatcher.route(method, pattern, route);
        }
        if let Some(manipulator) = self.token_manipulator {
            dispatcher = dispatcher.token_manipulator(manipulator);
        }
        if let Some(validator) = self.validator {
            dispatcher = dispatcher.validator(validator);
        }
        let dispatcher = dispatcher.build()?;

        tracing::info!(
            routes = dispatcher.routes().len(),
            processors = registry.len(),
            local = manager.is_local(),
            "instance ready"
        );

        Ok(Instance {
            config: self.config,
            dispatcher,
            registry,
            handler,
            manager,
        })
    }
}

/// A configured dispatcher plus the background queue behind it.
pub struct Instance {
    config: DaedalusConfig,
    dispatcher: Dispatcher,
    registry: Arc<ProcessorRegistry>,
    handler: BackgroundHandler,
    manager: Arc<dyn QueueManager>,
}

impl Instance {
    /// Starts building an instance.
    #[must_use]
    pub fn builder() -> InstanceBuilder {
        InstanceBuilder::default()
    }

    /// Returns the configuration the instance was built from.
    pub fn config(&self) -> &DaedalusConfig {
        &self.config
    }

    /// Returns the dispatcher.
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Returns the processor registry.
    pub fn registry(&self) -> &Arc<ProcessorRegistry> {
        &self.registry
    }

    /// Returns the queue manager used for submissions.
    pub fn queue_manager(&self) -> &Arc<dyn QueueManager> {
        &self.manager
    }

    /// Returns the consumer-side handler.
    pub fn background_handler(&self) -> &BackgroundHandler {
        &self.handler
    }

    /// Dispatches one HTTP request.
    pub async fn dispatch(&self, request: InboundRequest) -> Response {
        self.dispatcher.dispatch(request).await
    }

    /// Handles one message taken from the remote queue.
    ///
    /// Start-processing notifications carry no work and yield `Ok(None)`.
    pub async fn handle_queue_message(&self, message: &str) -> TaskResult<Option<Value>> {
        if BackgroundHandler::is_start_processing_notification(message) {
            tracing::debug!("start-processing notification received");
            return Ok(None);
        }
        self.handler.process_serialized(message).await.map(Some)
    }

    /// Returns the storage path of a job entry under the configured prefix.
    pub fn entry_path(&self, id: &str) -> String {
        id_to_path(self.config.background.path_prefix.as_deref(), id)
    }
}

/// Installs logging as configured.
///
/// # Errors
///
/// Returns `Telemetry` if a global subscriber is already set or the level
/// is not a valid filter.
pub fn init_logging(config: &DaedalusConfig) -> BootstrapResult<()> {
    daedalus_telemetry::init_logging(&config.logging.to_log_config())?;
    Ok(())
}

fn background_config(section: &BackgroundSection) -> BackgroundConfig {
    let remote = if section.queue_url.is_none() && section.notification_address.is_none() {
        None
    } else {
        Some(RemoteQueueSettings {
            queue_url: section.queue_url.clone().unwrap_or_default(),
            notification_address: section.notification_address.clone().unwrap_or_default(),
        })
    };

    BackgroundConfig {
        mode: match section.mode {
            BackgroundMode::Local => QueueMode::Local,
            BackgroundMode::Remote => QueueMode::Remote,
        },
        path_prefix: section.path_prefix.clone(),
        remote,
    }
}

fn background_requested(
    config: &DaedalusConfig,
    background: &BackgroundConfig,
    processors: &[Arc<dyn Processor>],
) -> bool {
    !processors.is_empty()
        || background.mode == QueueMode::Remote
        || config.http.background_submission_path.is_some()
        || config.http.background_meta_path.is_some()
}

fn dispatch_config(http: &HttpConfig) -> BootstrapResult<DispatchConfig> {
    let mut config = DispatchConfig::default()
        .with_request_id(
            RequestIdPolicy::new(&http.request_id_header)
                .map_err(|e| BootstrapError::invalid_header("http.request_id_header", e))?,
        )
        .with_default_error_message(http.default_error_message.clone())
        .with_default_timeout(Duration::from_millis(http.default_timeout_ms));

    config = if http.disable_cors {
        config.without_cors()
    } else {
        config.with_cors(
            CorsPolicy::from_settings(
                &http.cors_allow_origin,
                &http.cors_allow_headers,
                http.cors_allow_methods.as_deref(),
            )
            .map_err(|e| BootstrapError::invalid_header("http.cors", e))?,
        )
    };

    if let Some(stage) = &http.custom_stage {
        config = config.with_custom_stage(stage.clone());
    }

    Ok(config)
}
