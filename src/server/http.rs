//! HTTP server implementation
//!
//! Uses hyper http1 with TokioIo, one task per connection.

use bytes::Bytes;
use http_body_util::{BodyExt, Full, Limited};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::chain::{Address, ContractClient, JsonRpcConfig, JsonRpcContractClient, LocalLedger};
use crate::config::Args;
use crate::registry::EnumRegistry;
use crate::routes::{self, response::error_response, Backends};
use crate::services::{RegistrationService, UserDirectory};
use crate::storage::{ContentStore, InMemoryContentStore, PinataConfig, PinataStore};
use crate::types::{AvasaraError, Result};
use crate::waitlist::{InMemoryWaitlist, NotionConfig, NotionWaitlist, WaitlistSink};

type BoxBody = http_body_util::combinators::BoxBody<Bytes, hyper::Error>;

/// Largest request body accepted
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Shared application state
pub struct AppState {
    pub args: Args,
    /// Off-chain content store (Pinata or in-memory)
    pub store: Arc<dyn ContentStore>,
    /// Waitlist sink (Notion or in-memory)
    pub waitlist: Arc<dyn WaitlistSink>,
    /// Read side: records joined with payloads
    pub directory: UserDirectory,
    /// Write side: validate, pin, transact
    pub registration: RegistrationService,
    pub backends: Backends,
    pub started_at: Instant,
}

impl AppState {
    /// Assemble state from already-constructed collaborators
    pub fn with_collaborators(
        args: Args,
        registry: Arc<EnumRegistry>,
        contract: Arc<dyn ContractClient>,
        store: Arc<dyn ContentStore>,
        waitlist: Arc<dyn WaitlistSink>,
        backends: Backends,
    ) -> Self {
        let sender = args.sender().ok().flatten();
        let directory = UserDirectory::new(contract.clone(), store.clone(), registry.clone());
        let registration = RegistrationService::new(
            contract,
            store.clone(),
            registry,
            args.registration_fee(),
            sender,
        );

        Self {
            args,
            store,
            waitlist,
            directory,
            registration,
            backends,
            started_at: Instant::now(),
        }
    }

    /// Build collaborators from configuration
    ///
    /// In dev mode every collaborator that is not configured is replaced by
    /// its in-process implementation.
    pub fn from_args(args: Args) -> Result<Self> {
        let registry = Arc::new(EnumRegistry::new()?);
        let timeout = args.request_timeout();

        let (contract, contract_backend): (Arc<dyn ContractClient>, &'static str) =
            if args.local_ledger {
                if !args.dev_mode {
                    return Err(AvasaraError::Config(
                        "LOCAL_LEDGER is only allowed in development mode".to_string(),
                    ));
                }
                let owner = args
                    .sender()
                    .map_err(AvasaraError::Config)?
                    .unwrap_or(Address::ZERO);
                warn!("LOCAL_LEDGER set - using in-process ledger");
                (
                    Arc::new(LocalLedger::new(owner, args.registration_fee())),
                    "local-ledger",
                )
            } else {
                let client = JsonRpcContractClient::new(JsonRpcConfig {
                    rpc_url: args.rpc_url.clone(),
                    contract: args.contract().map_err(AvasaraError::Config)?,
                    timeout,
                })?;
                (Arc::new(client), "json-rpc")
            };

        let (store, store_backend): (Arc<dyn ContentStore>, &'static str) =
            match (&args.pinata_jwt, &args.pinata_gateway) {
                (Some(jwt), Some(gateway)) => {
                    let store = PinataStore::new(PinataConfig {
                        api_url: args.pinata_api_url.clone(),
                        jwt: jwt.clone(),
                        gateway: gateway.clone(),
                        timeout,
                    })?;
                    (Arc::new(store), "pinata")
                }
                _ if args.dev_mode => {
                    warn!("Pinata not configured - using in-memory content store");
                    (Arc::new(InMemoryContentStore::new()), "in-memory")
                }
                _ => {
                    return Err(AvasaraError::Config(
                        "PINATA_JWT and PINATA_GATEWAY are required in production mode"
                            .to_string(),
                    ))
                }
            };

        let (waitlist, waitlist_backend): (Arc<dyn WaitlistSink>, &'static str) =
            match (&args.notion_token, &args.notion_database_id) {
                (Some(token), Some(database_id)) => {
                    let mut config = NotionConfig::new(database_id.clone(), token.clone());
                    config.api_version = args.notion_api_version.clone();
                    config.timeout = timeout;
                    (Arc::new(NotionWaitlist::new(config)?), "notion")
                }
                _ if args.dev_mode => {
                    warn!("Notion not configured - using in-memory waitlist");
                    (Arc::new(InMemoryWaitlist::new()), "in-memory")
                }
                _ => {
                    return Err(AvasaraError::Config(
                        "NOTION_TOKEN and NOTION_DATABASE_ID are required in production mode"
                            .to_string(),
                    ))
                }
            };

        let backends = Backends {
            contract: contract_backend,
            store: store_backend,
            waitlist: waitlist_backend,
        };

        Ok(Self::with_collaborators(
            args, registry, contract, store, waitlist, backends,
        ))
    }
}

/// Run the HTTP server
pub async fn run(state: Arc<AppState>) -> Result<()> {
    let listener = TcpListener::bind(state.args.listen).await?;

    info!("Avasara listening on {}", state.args.listen);

    if state.args.dev_mode {
        warn!("Development mode enabled - unconfigured collaborators run in-process");
    }

    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let state = Arc::clone(&state);
                tokio::spawn(async move {
                    let io = TokioIo::new(stream);

                    let service = service_fn(move |req| {
                        let state = Arc::clone(&state);
                        async move { handle_request(state, addr, req).await }
                    });

                    if let Err(err) = http1::Builder::new()
                        .preserve_header_case(true)
                        .title_case_headers(true)
                        .serve_connection(io, service)
                        .await
                    {
                        error!("Error serving connection from {}: {:?}", addr, err);
                    }
                });
            }
            Err(e) => {
                error!("Error accepting connection: {:?}", e);
            }
        }
    }
}

/// Route an HTTP request
///
/// Generic over the body so tests can drive it with `Full<Bytes>`.
pub async fn handle_request<B>(
    state: Arc<AppState>,
    addr: SocketAddr,
    req: Request<B>,
) -> std::result::Result<Response<BoxBody>, hyper::Error>
where
    B: hyper::body::Body<Data = Bytes>,
    B::Error: std::error::Error + Send + Sync + 'static,
{
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let query = req.uri().query().map(str::to_string);
    let query = query.as_deref();

    info!("[{}] {} {}", addr, method, path);

    if method == Method::OPTIONS {
        return Ok(to_boxed(preflight_response()));
    }

    let body = match Limited::new(req.into_body(), MAX_BODY_BYTES).collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            warn!("[{}] Rejected request body: {}", addr, e);
            let err = AvasaraError::BadRequest(format!("Failed to read request body: {}", e));
            return Ok(to_boxed(error_response(&err)));
        }
    };

    let response = match (method, path.as_str()) {
        // Liveness check
        (Method::GET, "/health") | (Method::GET, "/healthz") => {
            routes::health_check(Arc::clone(&state))
        }

        // Version info for deployment verification
        (Method::GET, "/version") => routes::version_info(),

        // Public client configuration
        (Method::GET, "/api/config") => routes::client_config(Arc::clone(&state)),

        // ====================================================================
        // Registry reads
        // ====================================================================
        (Method::GET, "/api/contract/info") => {
            routes::handle_contract_info(Arc::clone(&state)).await
        }
        (Method::GET, "/api/contract/total-users") => {
            routes::handle_total_users(Arc::clone(&state), query).await
        }
        (Method::GET, "/api/contract/registered-users") => {
            routes::handle_registered_users(Arc::clone(&state), query).await
        }
        (Method::GET, "/api/contract/user-profile") => {
            routes::handle_user_profile(Arc::clone(&state), query).await
        }
        (Method::GET, "/api/contract/users-by-location") => {
            routes::handle_users_by_location(Arc::clone(&state), query).await
        }
        (Method::GET, "/api/contract/users-by-skill") => {
            routes::handle_users_by_skill(Arc::clone(&state), query).await
        }

        // ====================================================================
        // Writes
        // ====================================================================
        (Method::POST, "/api/register") => {
            routes::handle_register(Arc::clone(&state), body).await
        }
        (Method::POST, "/api/profile") => {
            routes::handle_update_profile(Arc::clone(&state), body).await
        }
        (Method::POST, "/api/contract/withdraw-fees") => {
            routes::handle_withdraw_fees(Arc::clone(&state), body).await
        }

        // Content store passthrough
        (Method::POST, "/api/ipfs") => routes::handle_upload(Arc::clone(&state), body).await,
        (Method::GET, "/api/ipfs") => {
            routes::handle_gateway_url(Arc::clone(&state), query, body).await
        }

        // Waitlist
        (Method::POST, "/api/waitlist-user") => {
            routes::handle_waitlist_user(Arc::clone(&state), body).await
        }

        _ => not_found_response(&path),
    };

    Ok(to_boxed(response))
}

fn to_boxed(response: Response<Full<Bytes>>) -> Response<BoxBody> {
    response.map(|body| body.map_err(|never| match never {}).boxed())
}

/// CORS preflight response
fn preflight_response() -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::new()));
    let headers = response.headers_mut();
    headers.insert(
        "Access-Control-Allow-Origin",
        hyper::header::HeaderValue::from_static("*"),
    );
    headers.insert(
        "Access-Control-Allow-Headers",
        hyper::header::HeaderValue::from_static("*"),
    );
    headers.insert(
        "Access-Control-Allow-Methods",
        hyper::header::HeaderValue::from_static("GET, POST, OPTIONS"),
    );
    response
}

/// Not found response
fn not_found_response(path: &str) -> Response<Full<Bytes>> {
    routes::response::json_response(
        StatusCode::NOT_FOUND,
        &json!({
            "success": false,
            "error": format!("Not Found: {}", path),
        }),
    )
}
