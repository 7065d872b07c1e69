//! # Plugin Request Adapter
//!
//! Translates orchestrator plugin requests into calls on the core and renders
//! the results as JSON. Requests are identified by name; names are parsed into
//! the closed [`RequestKind`] enum so dispatch is checked exhaustively.
//!
//! Response codes:
//! - `200` with a body (or a null body for "nothing to report")
//! - `400` when the request body cannot be understood
//! - `404` for an unknown request name
//! - `500` when reconciliation, history reading or checkout failed
//!
//! The adapter holds only configuration; each request builds the services it
//! needs, so requests for different mirrors never share state.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use log::{info, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::checkout::CheckoutExecutor;
use crate::config::MirrorConfig;
use crate::connection;
use crate::endpoint::Endpoint;
use crate::error::Result;
use crate::history::HistoryReader;
use crate::reconcile::Reconciler;
use crate::validation;

pub const EXTENSION_NAME: &str = "scm";
pub const SUPPORTED_VERSIONS: &[&str] = &["1.0"];

/// Display name shown for this material type.
pub const DISPLAY_VALUE: &str = "Git";

const SCM_TEMPLATE: &str = include_str!("../templates/scm.template.html");

/// Identifies the plugin to the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PluginIdentifier {
    pub extension: String,
    pub versions: Vec<String>,
}

pub fn identifier() -> PluginIdentifier {
    PluginIdentifier {
        extension: EXTENSION_NAME.to_string(),
        versions: SUPPORTED_VERSIONS.iter().map(|v| v.to_string()).collect(),
    }
}

/// Every request the plugin understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    ScmConfiguration,
    ScmView,
    ValidateScmConfiguration,
    CheckScmConnection,
    LatestRevision,
    LatestRevisionsSince,
    Checkout,
}

impl RequestKind {
    pub const ALL: [RequestKind; 7] = [
        RequestKind::ScmConfiguration,
        RequestKind::ScmView,
        RequestKind::ValidateScmConfiguration,
        RequestKind::CheckScmConnection,
        RequestKind::LatestRevision,
        RequestKind::LatestRevisionsSince,
        RequestKind::Checkout,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            RequestKind::ScmConfiguration => "scm-configuration",
            RequestKind::ScmView => "scm-view",
            RequestKind::ValidateScmConfiguration => "validate-scm-configuration",
            RequestKind::CheckScmConnection => "check-scm-connection",
            RequestKind::LatestRevision => "latest-revision",
            RequestKind::LatestRevisionsSince => "latest-revisions-since",
            RequestKind::Checkout => "checkout",
        }
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A request name that matches no [`RequestKind`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRequest(pub String);

impl fmt::Display for UnknownRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown request: {}", self.0)
    }
}

impl std::error::Error for UnknownRequest {}

impl FromStr for RequestKind {
    type Err = UnknownRequest;

    fn from_str(name: &str) -> std::result::Result<Self, Self::Err> {
        RequestKind::ALL
            .into_iter()
            .find(|kind| kind.name() == name)
            .ok_or_else(|| UnknownRequest(name.to_string()))
    }
}

/// Response code plus optional JSON body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PluginResponse {
    pub code: u16,
    pub body: Option<Value>,
}

impl PluginResponse {
    pub const SUCCESS: u16 = 200;
    pub const BAD_REQUEST: u16 = 400;
    pub const NOT_FOUND: u16 = 404;
    pub const INTERNAL_ERROR: u16 = 500;

    fn ok(body: Value) -> Self {
        Self {
            code: Self::SUCCESS,
            body: Some(body),
        }
    }

    fn ok_empty() -> Self {
        Self {
            code: Self::SUCCESS,
            body: None,
        }
    }

    fn bad_request(message: String) -> Self {
        Self {
            code: Self::BAD_REQUEST,
            body: Some(json!({ "message": message })),
        }
    }

    fn not_found() -> Self {
        Self {
            code: Self::NOT_FOUND,
            body: None,
        }
    }

    fn internal_error() -> Self {
        Self {
            code: Self::INTERNAL_ERROR,
            body: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FieldValue {
    value: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct ConfigurationRequest {
    #[serde(default)]
    scm_configuration: HashMap<String, FieldValue>,
}

impl ConfigurationRequest {
    fn url(&self) -> Option<&str> {
        self.scm_configuration
            .get(validation::URL_FIELD)
            .and_then(|field| field.value.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct RevisionRef {
    revision: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct LatestRevisionRequest {
    #[serde(flatten)]
    configuration: ConfigurationRequest,
    flyweight_folder: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct RevisionsSinceRequest {
    #[serde(flatten)]
    configuration: ConfigurationRequest,
    flyweight_folder: String,
    previous_revision: RevisionRef,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct CheckoutRequest {
    #[serde(flatten)]
    configuration: ConfigurationRequest,
    destination_folder: String,
    revision: RevisionRef,
}

/// Outcome of a handler: a response, or a core failure to be logged.
type HandlerResult = std::result::Result<PluginResponse, HandlerError>;

enum HandlerError {
    BadRequest(String),
    Core(crate::error::Error),
}

impl From<crate::error::Error> for HandlerError {
    fn from(e: crate::error::Error) -> Self {
        HandlerError::Core(e)
    }
}

/// The plugin entry point.
#[derive(Debug, Clone, Default)]
pub struct ScmPlugin {
    config: MirrorConfig,
}

impl ScmPlugin {
    pub fn new(config: MirrorConfig) -> Self {
        Self { config }
    }

    /// Handle a request by name with a JSON `body`.
    pub fn handle(&self, request_name: &str, body: &str) -> PluginResponse {
        let kind = match request_name.parse::<RequestKind>() {
            Ok(kind) => kind,
            Err(e) => {
                warn!("{}", e);
                return PluginResponse::not_found();
            }
        };
        info!("handling {} request", kind);

        match self.dispatch(kind, body) {
            Ok(response) => response,
            Err(HandlerError::BadRequest(message)) => {
                warn!("{}: malformed request: {}", kind, message);
                PluginResponse::bad_request(message)
            }
            Err(HandlerError::Core(e)) => {
                warn!("{}: {}", kind, e);
                PluginResponse::internal_error()
            }
        }
    }

    fn dispatch(&self, kind: RequestKind, body: &str) -> HandlerResult {
        match kind {
            RequestKind::ScmConfiguration => Ok(self.scm_configuration()),
            RequestKind::ScmView => Ok(self.scm_view()),
            RequestKind::ValidateScmConfiguration => self.validate(parse(body)?),
            RequestKind::CheckScmConnection => self.check_connection(parse(body)?),
            RequestKind::LatestRevision => self.latest_revision(parse(body)?),
            RequestKind::LatestRevisionsSince => self.latest_revisions_since(parse(body)?),
            RequestKind::Checkout => self.checkout(parse(body)?),
        }
    }

    fn scm_configuration(&self) -> PluginResponse {
        PluginResponse::ok(json!({
            "url": {
                "display-name": "URL",
                "default-value": null,
                "part-of-identity": true,
                "required": true,
                "secure": false,
                "display-order": "0",
            }
        }))
    }

    fn scm_view(&self) -> PluginResponse {
        PluginResponse::ok(json!({
            "displayValue": DISPLAY_VALUE,
            "template": SCM_TEMPLATE,
        }))
    }

    fn validate(&self, request: ConfigurationRequest) -> HandlerResult {
        let errors = validation::validate_url(request.url());
        Ok(PluginResponse::ok(to_json(&errors)?))
    }

    fn check_connection(&self, request: ConfigurationRequest) -> HandlerResult {
        let report = connection::check_connection(
            request.url().unwrap_or_default(),
            self.config.connect_timeout(),
        );
        Ok(PluginResponse::ok(to_json(&report)?))
    }

    fn latest_revision(&self, request: LatestRevisionRequest) -> HandlerResult {
        let mirror = Path::new(&request.flyweight_folder);
        self.sync(&request.configuration, mirror)?;

        match HistoryReader::new(&self.config).latest_revision(mirror)? {
            Some(revision) => Ok(PluginResponse::ok(to_json(&revision.to_record())?)),
            None => Ok(PluginResponse::ok_empty()),
        }
    }

    fn latest_revisions_since(&self, request: RevisionsSinceRequest) -> HandlerResult {
        let mirror = Path::new(&request.flyweight_folder);
        self.sync(&request.configuration, mirror)?;

        let window = HistoryReader::new(&self.config)
            .window_since(mirror, &request.previous_revision.revision)?;
        match window.into_revisions() {
            Some(revisions) => {
                info!("{} new revision(s)", revisions.len());
                let records: Vec<_> = revisions.iter().map(|r| r.to_record()).collect();
                Ok(PluginResponse::ok(json!({ "revisions": to_json(&records)? })))
            }
            None => Ok(PluginResponse::ok_empty()),
        }
    }

    fn checkout(&self, request: CheckoutRequest) -> HandlerResult {
        let mirror = Path::new(&request.destination_folder);
        let revision = &request.revision.revision;
        self.sync(&request.configuration, mirror)?;

        CheckoutExecutor::new(&self.config).checkout_to(mirror, revision)?;
        Ok(PluginResponse::ok(json!({
            "status": "success",
            "messages": [format!("Checked out to revision {}", revision)],
        })))
    }

    fn sync(&self, configuration: &ConfigurationRequest, mirror: &Path) -> Result<()> {
        let url = configuration.url().unwrap_or_default();
        Reconciler::new(self.config.clone()).reconcile(&Endpoint::parse(url), mirror)
    }
}

fn parse<T: DeserializeOwned>(body: &str) -> std::result::Result<T, HandlerError> {
    serde_json::from_str(body).map_err(|e| HandlerError::BadRequest(e.to_string()))
}

fn to_json<T: Serialize>(value: &T) -> std::result::Result<Value, HandlerError> {
    serde_json::to_value(value).map_err(|e| HandlerError::Core(e.into()))
}
