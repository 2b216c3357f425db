// The sync facade: single public entry point the persistence layer calls.
// Wires verb selection, request composition, the transport and multi-status
// parsing together and normalizes results.

use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;

use super::config::SyncConfig;
use super::request::{compose, merge_headers, RequestDescriptor};
use super::transport::{Transport, TransportResponse};
use super::verbs::{default_read_depth, plan, RequestPlan, Verb};
use crate::error::SyncError;
use crate::models::{Attributes, Depth, Model, Operation, SyncOutcome};
use crate::multistatus_parser::{parse_id_from_href, parse_multistatus};
use crate::property_map::PropertyMap;

/// Per-call options, all optional: URL override, explicit read depth, extra
/// headers (merged over the configured baseline, later wins) and a property
/// map override for callers that compute mappings at call time.
#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    pub url: Option<String>,
    pub depth: Option<Depth>,
    pub headers: Vec<(String, String)>,
    pub properties: Option<PropertyMap>,
}

/// Stateless adapter between the abstract persistence vocabulary and the
/// property-based wire protocol. Holds no per-call state and no cache; safe
/// for concurrent independent calls when the transport is.
pub struct SyncService<T: Transport> {
    transport: T,
    config: SyncConfig,
}

impl<T: Transport> SyncService<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            config: SyncConfig::default(),
        }
    }

    pub fn with_config(transport: T, config: SyncConfig) -> Result<Self, SyncError> {
        config.validate()?;
        Ok(Self { transport, config })
    }

    /// The injected transport. Cancellation and timeout policy live there,
    /// not in the adapter.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Executes one abstract operation against the model's resource.
    ///
    /// Fails with [`SyncError::InvalidResource`] before anything reaches the
    /// transport if no URL can be resolved. The composite container-update
    /// path issues two strictly sequential requests; a failure of the first
    /// leg aborts the second entirely, with no compensation for the first.
    pub async fn sync(
        &self,
        operation: Operation,
        model: &Model,
        options: SyncOptions,
    ) -> Result<SyncOutcome, SyncError> {
        let request_id = Uuid::new_v4();
        let url = options
            .url
            .clone()
            .or_else(|| model.resource.url.clone())
            .ok_or(SyncError::InvalidResource)?;
        let map = options.properties.as_ref().unwrap_or(&model.properties);
        let depth = options
            .depth
            .unwrap_or_else(|| default_read_depth(&model.resource));
        let headers = merge_headers(&self.config.baseline_headers(), &options.headers);

        debug!(%request_id, %operation, url = %url, "dispatching sync operation");

        match plan(operation, &model.resource) {
            RequestPlan::Single(verb) => {
                let request = self.compose_single(verb, &url, model, map, &headers, depth);
                let response = self.transport.execute(request).await?;
                self.interpret(request_id, operation, verb, model, map, depth, response)
            }
            RequestPlan::ContainerUpdate => {
                let mkcol = compose(
                    Verb::Mkcol,
                    &url,
                    &Attributes::new(),
                    map,
                    &self.config.namespaces,
                    &headers,
                    None,
                );
                let first = self.transport.execute(mkcol).await?;
                if !first.is_success() {
                    // Hard sequencing dependency: the patch leg is never
                    // issued when the container create failed.
                    warn!(
                        %request_id,
                        status = first.status,
                        "container create failed, property patch not issued"
                    );
                    return Err(transport_error(first));
                }
                let patch = compose(
                    Verb::Proppatch,
                    &url,
                    &model.changed,
                    map,
                    &self.config.namespaces,
                    &headers,
                    None,
                );
                let response = self.transport.execute(patch).await?;
                self.interpret(
                    request_id,
                    operation,
                    Verb::Proppatch,
                    model,
                    map,
                    depth,
                    response,
                )
            }
        }
    }

    fn compose_single(
        &self,
        verb: Verb,
        url: &str,
        model: &Model,
        map: &PropertyMap,
        headers: &[(String, String)],
        depth: Depth,
    ) -> RequestDescriptor {
        let namespaces = &self.config.namespaces;
        match verb {
            // A patch carries only what changed since the last sync.
            Verb::Proppatch => compose(verb, url, &model.changed, map, namespaces, headers, None),
            Verb::Post | Verb::Put => {
                compose(verb, url, &model.attributes, map, namespaces, headers, None)
            }
            Verb::Propfind => compose(
                verb,
                url,
                &Attributes::new(),
                map,
                namespaces,
                headers,
                Some(depth),
            ),
            Verb::Mkcol | Verb::Delete => {
                compose(verb, url, &Attributes::new(), map, namespaces, headers, None)
            }
        }
    }

    fn interpret(
        &self,
        request_id: Uuid,
        operation: Operation,
        verb: Verb,
        model: &Model,
        map: &PropertyMap,
        depth: Depth,
        response: TransportResponse,
    ) -> Result<SyncOutcome, SyncError> {
        if !response.is_success() {
            debug!(%request_id, status = response.status, "request failed");
            return Err(transport_error(response));
        }

        if verb == Verb::Propfind {
            let records =
                parse_multistatus(&response.body, map, &self.config.namespaces, depth)?;
            debug!(%request_id, records = records.len(), "parsed listing");
            return if model.resource.is_collection {
                Ok(SyncOutcome::Records(records))
            } else {
                records
                    .into_iter()
                    .next()
                    .map(SyncOutcome::Record)
                    .ok_or_else(|| {
                        SyncError::Multistatus(
                            "single-resource response contained no entries".to_string(),
                        )
                    })
            };
        }

        // A write that answers with a multi-status body gets parsed; the
        // common case is a bare success status, where the protocol does not
        // echo new state and the caller's own representation is returned.
        if response.is_multistatus() && !response.body.trim().is_empty() {
            let records =
                parse_multistatus(&response.body, map, &self.config.namespaces, Depth::Zero)?;
            return Ok(SyncOutcome::Records(records));
        }

        let mut echo = model.attributes.clone();
        if operation == Operation::Create {
            // The server communicates the new resource's location in a
            // header; an id derived from it overrides whatever the caller
            // sent. Deliberately not applied to the replace path.
            let location = response
                .header("Content-Location")
                .or_else(|| response.header("Location"));
            if let Some(id) = location.and_then(parse_id_from_href) {
                debug!(%request_id, id = %id, "derived id from location header");
                echo.insert("id".to_string(), Value::String(id));
            }
        }
        Ok(SyncOutcome::Echo(echo))
    }
}

fn transport_error(response: TransportResponse) -> SyncError {
    SyncError::Transport {
        status: response.status,
        body: response.body,
    }
}
