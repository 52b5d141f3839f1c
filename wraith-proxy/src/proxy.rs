use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;
use std::time::{Duration, Instant};

use openssl::ssl::{Ssl, SslConnector, SslMethod, SslVerifyMode};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{Mutex, mpsc};
use tokio_openssl::SslStream;
use uuid::Uuid;

use wraith_net::{
    CaCertificate, CertCache, ParseStatus, Request, RequestParser, Response, ResponseParser,
    build_acceptor, export_ca_cert, generate_ca, issue_leaf,
};
use wraith_storage::{Entry, EntryStore};

use crate::config::ProxyConfig;
use crate::error::ProxyError;
use crate::event::{ProxyEvent, ProxyRequest, SyntheticResponse, TrafficEvent};
use crate::events::{ProxyCommand, ProxyControl, ProxyEvents, control_channel, event_channel};
use crate::intercept::{InterceptDecision, InterceptGate, InterceptOutcome};
use crate::scope::{Scope, ScopeRules};

const UPSTREAM_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const CONNECT_ESTABLISHED: &[u8] = b"HTTP/1.1 200 Connection Established\r\n\r\n";
const BAD_GATEWAY: &[u8] = b"HTTP/1.1 502 Bad Gateway\r\nContent-Length: 0\r\n\r\n";
const BAD_REQUEST: &[u8] = b"HTTP/1.1 400 Bad Request\r\nContent-Length: 0\r\n\r\n";

pub struct Proxy {
    state: Arc<ProxyState>,
}

struct ProxyState {
    config: ProxyConfig,
    scope: Scope,
    rules: ScopeRules,
    ca: CaCertificate,
    cache: Mutex<CertCache>,
    store: Arc<dyn EntryStore>,
    sender: mpsc::Sender<ProxyEvent>,
    control_rx: Mutex<mpsc::Receiver<ProxyCommand>>,
    intercepts: Mutex<InterceptGate>,
    /// Serializes intercept announcements so the operator sees pauses in a
    /// consistent order even when connections pause concurrently.
    announce: Mutex<()>,
}

impl Proxy {
    pub fn new(
        config: ProxyConfig,
        store: Arc<dyn EntryStore>,
    ) -> Result<(Self, ProxyEvents, ProxyControl), ProxyError> {
        let ca = generate_ca(&config.tls.ca_common_name, &config.tls.ca_organization)
            .map_err(|err| ProxyError::Config(err.message))?;
        let scope = Scope::new(&config.scope.domains, &config.scope.hosts);
        let rules = ScopeRules::from_config(&config.scope)?;
        let cache = Mutex::new(CertCache::new(config.tls.leaf_cache_entries));
        let (sender, events) = event_channel();
        let (control, control_rx) = control_channel();

        Ok((
            Self {
                state: Arc::new(ProxyState {
                    config,
                    scope,
                    rules,
                    ca,
                    cache,
                    store,
                    sender,
                    control_rx: Mutex::new(control_rx),
                    intercepts: Mutex::new(InterceptGate::default()),
                    announce: Mutex::new(()),
                }),
            },
            events,
            control,
        ))
    }

    pub fn ca_cert_pem(&self) -> &[u8] {
        &self.state.ca.cert_pem
    }

    /// Writes the root certificate for client trust; the key stays in memory.
    pub fn export_ca_cert(&self, dir: impl AsRef<Path>) -> Result<PathBuf, ProxyError> {
        export_ca_cert(dir, &self.state.ca).map_err(|err| ProxyError::Runtime(err.message))
    }

    pub async fn run(&self) -> Result<(), ProxyError> {
        let addr = format!(
            "{}:{}",
            self.state.config.listen.host, self.state.config.listen.port
        );
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|err| ProxyError::Runtime(err.to_string()))?;
        self.serve(listener).await
    }

    /// Accept loop over an already-bound listener (tests bind port 0).
    pub async fn serve(&self, listener: TcpListener) -> Result<(), ProxyError> {
        let control_state = Arc::clone(&self.state);
        tokio::spawn(async move {
            control_loop(control_state).await;
        });

        loop {
            let (stream, _) = listener
                .accept()
                .await
                .map_err(|err| ProxyError::Runtime(err.to_string()))?;
            let state = Arc::clone(&self.state);
            tokio::spawn(async move {
                if let Err(err) = handle_connection(state, stream).await {
                    let _ = err;
                }
            });
        }
    }
}

async fn control_loop(state: Arc<ProxyState>) {
    loop {
        let command = {
            let mut receiver = state.control_rx.lock().await;
            receiver.recv().await
        };
        let Some(command) = command else {
            break;
        };

        let mut gate = state.intercepts.lock().await;
        match command {
            ProxyCommand::SetInterceptEnabled(enabled) => gate.set_enabled(enabled),
            ProxyCommand::ResolveIntercept { id, decision } => {
                gate.resolve(id, decision);
            }
        }
        let pending = gate.pending_len();
        drop(gate);

        emit(&state, ProxyEvent::InterceptQueueChanged { pending });
    }
}

async fn handle_connection(state: Arc<ProxyState>, mut stream: TcpStream) -> Result<(), ProxyError> {
    let mut parser = RequestParser::new();

    loop {
        let Some(request) = read_request(&mut stream, &mut parser).await? else {
            return Ok(());
        };

        if request.line.method.eq_ignore_ascii_case("CONNECT") {
            return handle_connect(state, stream, request.line.target.clone()).await;
        }

        handle_plain_request(Arc::clone(&state), &mut stream, request).await?;
    }
}

/// Explicit-proxy mode: the request arrived unencrypted in absolute form,
/// so there is nothing to terminate. Scope still decides recording.
async fn handle_plain_request(
    state: Arc<ProxyState>,
    client: &mut TcpStream,
    request: Request,
) -> Result<(), ProxyError> {
    let Some((host, port, path, query)) = resolve_absolute_target(&request.line.target) else {
        client.write_all(BAD_REQUEST).await?;
        return Ok(());
    };

    let in_scope = state.scope.in_scope(&host);
    let proxy_request = package_request(&request, "http", &host, port, path, query);

    // The upstream dial waits until the gate resolves: a request paused for
    // minutes must not hold an idle origin connection, and a synthetic or
    // dropped resolution needs no origin at all.
    match pass_gate(&state, proxy_request, in_scope).await {
        GateResult::Forward(request) => {
            let mut upstream = match connect_upstream(&request.host, request.port).await {
                Ok(upstream) => upstream,
                Err(_) => {
                    client.write_all(BAD_GATEWAY).await?;
                    client.flush().await?;
                    return Ok(());
                }
            };
            exchange(state, client, &mut upstream, request, in_scope).await
        }
        GateResult::Synthetic(request, response) => {
            write_synthetic(&state, client, &request, &response).await
        }
        GateResult::Dropped(request) => write_dropped(&state, client, &request).await,
    }
}

async fn handle_connect(
    state: Arc<ProxyState>,
    mut stream: TcpStream,
    target: String,
) -> Result<(), ProxyError> {
    let (host, port) = split_host_port(&target, 443);

    // The client expects the plaintext acknowledgment before it starts its
    // own TLS handshake through the tunnel.
    stream.write_all(CONNECT_ESTABLISHED).await?;
    stream.flush().await?;

    if !state.scope.in_scope(&host) {
        emit(
            &state,
            ProxyEvent::Traffic(TrafficEvent {
                method: "CONNECT".to_string(),
                scheme: "https".to_string(),
                host: host.clone(),
                path: String::new(),
                status_code: 0,
                duration_ms: 0,
                intercepted: false,
            }),
        );
        return blind_relay(stream, &host, port).await;
    }

    mitm_tunnel(state, stream, host, port).await
}

/// Unexamined bidirectional byte copy for out-of-scope tunnels. Both ends
/// close as soon as either direction finishes.
async fn blind_relay(mut client: TcpStream, host: &str, port: u16) -> Result<(), ProxyError> {
    let Ok(mut upstream) = connect_upstream(host, port).await else {
        return Ok(());
    };

    let (mut client_read, mut client_write) = client.split();
    let (mut upstream_read, mut upstream_write) = upstream.split();

    tokio::select! {
        _ = tokio::io::copy(&mut client_read, &mut upstream_write) => {}
        _ = tokio::io::copy(&mut upstream_read, &mut client_write) => {}
    }

    Ok(())
}

async fn mitm_tunnel(
    state: Arc<ProxyState>,
    stream: TcpStream,
    host: String,
    port: u16,
) -> Result<(), ProxyError> {
    let leaf = {
        let mut cache = state.cache.lock().await;
        match cache.get(&host) {
            Some(cert) => cert,
            None => {
                let cert = issue_leaf(&host, &state.ca)
                    .map_err(|err| ProxyError::Runtime(err.message))?;
                cache.insert(host.clone(), cert.clone());
                cert
            }
        }
    };

    let acceptor = build_acceptor(&leaf).map_err(|err| ProxyError::Runtime(err.message))?;
    let ssl = Ssl::new(acceptor.context()).map_err(|err| ProxyError::Runtime(err.to_string()))?;
    let mut tls_client =
        SslStream::new(ssl, stream).map_err(|err| ProxyError::Runtime(err.to_string()))?;
    Pin::new(&mut tls_client)
        .accept()
        .await
        .map_err(|err| ProxyError::Runtime(err.to_string()))?;

    let upstream = connect_upstream(&host, port).await?;
    let connector = SslConnector::builder(SslMethod::tls())
        .map_err(|err| ProxyError::Runtime(err.to_string()))?
        .build();
    let mut configuration = connector
        .configure()
        .map_err(|err| ProxyError::Runtime(err.to_string()))?;
    if !state.config.tls.verify_upstream {
        configuration.set_verify(SslVerifyMode::NONE);
        configuration.set_verify_hostname(false);
    }
    let ssl = configuration
        .into_ssl(&host)
        .map_err(|err| ProxyError::Runtime(err.to_string()))?;
    let mut tls_upstream =
        SslStream::new(ssl, upstream).map_err(|err| ProxyError::Runtime(err.to_string()))?;
    Pin::new(&mut tls_upstream)
        .connect()
        .await
        .map_err(|err| ProxyError::Runtime(err.to_string()))?;

    // The client may pipeline several requests through one tunnel; handle
    // them strictly in the order read. EOF is clean termination.
    let mut parser = RequestParser::new();
    loop {
        let Some(request) = read_request(&mut tls_client, &mut parser).await? else {
            return Ok(());
        };

        let (path, query) = split_target(&request.line.target);
        let proxy_request = package_request(&request, "https", &host, port, path, query);
        match pass_gate(&state, proxy_request, true).await {
            GateResult::Forward(request) => {
                exchange(
                    Arc::clone(&state),
                    &mut tls_client,
                    &mut tls_upstream,
                    request,
                    true,
                )
                .await?;
            }
            GateResult::Synthetic(request, response) => {
                write_synthetic(&state, &mut tls_client, &request, &response).await?;
            }
            GateResult::Dropped(request) => {
                write_dropped(&state, &mut tls_client, &request).await?;
            }
        }
    }
}

enum GateResult {
    Forward(ProxyRequest),
    Synthetic(ProxyRequest, SyntheticResponse),
    Dropped(ProxyRequest),
}

/// Runs one request through the interception gate. Only requests that are
/// in scope and permitted by the rules can pause.
async fn pass_gate(
    state: &Arc<ProxyState>,
    proxy_request: ProxyRequest,
    in_scope: bool,
) -> GateResult {
    let gated = in_scope
        && state.rules.permits(
            &proxy_request.scheme,
            &proxy_request.host,
            &proxy_request.path,
            proxy_request.port,
        );
    if !gated {
        return GateResult::Forward(proxy_request);
    }

    let announced = proxy_request.clone();
    let outcome = {
        let mut gate = state.intercepts.lock().await;
        gate.intercept(proxy_request)
    };
    match outcome {
        InterceptOutcome::Forward(request) => GateResult::Forward(request),
        InterceptOutcome::Paused { receiver } => {
            announce_pause(state, &announced).await;
            match receiver.await {
                Ok(InterceptDecision::Allow {
                    request,
                    response: Some(response),
                }) => GateResult::Synthetic(request, response),
                Ok(InterceptDecision::Allow {
                    request,
                    response: None,
                }) => GateResult::Forward(request),
                Ok(InterceptDecision::Drop) => GateResult::Dropped(announced),
                // Gate dropped without resolving; release the original.
                Err(_) => GateResult::Forward(announced),
            }
        }
    }
}

/// Answers an operator-supplied response without touching the origin.
async fn write_synthetic<C>(
    state: &ProxyState,
    client: &mut C,
    request: &ProxyRequest,
    response: &SyntheticResponse,
) -> Result<(), ProxyError>
where
    C: AsyncRead + AsyncWrite + Unpin,
{
    emit(
        state,
        ProxyEvent::Traffic(TrafficEvent {
            method: request.method.clone(),
            scheme: request.scheme.clone(),
            host: request.host.clone(),
            path: request.path.clone(),
            status_code: response.status_code,
            duration_ms: 0,
            intercepted: true,
        }),
    );
    write_response(
        client,
        response.status_code,
        &response.reason,
        &response.headers,
        &response.body,
    )
    .await
}

/// A dropped request still gets an answer: the connection is keep-alive
/// and the client would otherwise wait forever on an open stream.
async fn write_dropped<C>(
    state: &ProxyState,
    client: &mut C,
    request: &ProxyRequest,
) -> Result<(), ProxyError>
where
    C: AsyncRead + AsyncWrite + Unpin,
{
    emit(
        state,
        ProxyEvent::Traffic(TrafficEvent {
            method: request.method.clone(),
            scheme: request.scheme.clone(),
            host: request.host.clone(),
            path: request.path.clone(),
            status_code: 200,
            duration_ms: 0,
            intercepted: true,
        }),
    );
    write_response(
        client,
        200,
        "OK",
        &[("Content-Type".to_string(), "text/plain".to_string())],
        b"Request dropped.",
    )
    .await
}

/// Forwards a released request upstream and writes the framed response
/// back to the client.
async fn exchange<C, U>(
    state: Arc<ProxyState>,
    client: &mut C,
    upstream: &mut U,
    request: ProxyRequest,
    in_scope: bool,
) -> Result<(), ProxyError>
where
    C: AsyncRead + AsyncWrite + Unpin,
    U: AsyncRead + AsyncWrite + Unpin,
{
    let wire = serialize_request(&request);
    let start = Instant::now();
    let response = match send_upstream(upstream, &wire, &request.method).await {
        Ok(response) => response,
        Err(_) => {
            client.write_all(BAD_GATEWAY).await?;
            client.flush().await?;
            return Ok(());
        }
    };
    let duration_ms = start.elapsed().as_millis() as i64;

    let response_headers: Vec<(String, String)> = response
        .headers
        .iter()
        .map(|header| (header.raw_name.clone(), header.value.clone()))
        .collect();

    if in_scope {
        let entry = Entry {
            id: 0,
            method: request.method.clone(),
            scheme: request.scheme.clone(),
            host: request.host.clone(),
            path: request.path.clone(),
            query: request.query.clone(),
            request_headers: request.headers.clone(),
            request_body: request.body.clone(),
            status_code: response.line.status_code,
            response_headers: response_headers.clone(),
            response_body: response.body.clone(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            duration_ms,
        };
        let _ = state.store.save(entry);
    }

    emit(
        &state,
        ProxyEvent::Traffic(TrafficEvent {
            method: request.method.clone(),
            scheme: request.scheme.clone(),
            host: request.host.clone(),
            path: request.path.clone(),
            status_code: response.line.status_code,
            duration_ms,
            intercepted: in_scope,
        }),
    );

    write_response(
        client,
        response.line.status_code,
        &response.line.reason,
        &response_headers,
        &response.body,
    )
    .await
}

/// Announces one paused request to the operator, serialized so at most one
/// announcement is in flight. If interception was disabled in the window
/// between queueing and announcing, the flush has already released the
/// waiter and no announcement is sent. A saturated or disconnected sink
/// auto-releases the request instead of blocking the connection task.
async fn announce_pause(state: &Arc<ProxyState>, request: &ProxyRequest) {
    let _guard = state.announce.lock().await;

    let pending = {
        let gate = state.intercepts.lock().await;
        if !gate.is_enabled() {
            return;
        }
        gate.pending_len()
    };

    let announced = state
        .sender
        .try_send(ProxyEvent::InterceptStarted {
            request: request.clone(),
        })
        .is_ok();
    if !announced {
        let mut gate = state.intercepts.lock().await;
        gate.release(request.id);
        return;
    }

    let _ = state
        .sender
        .try_send(ProxyEvent::InterceptQueueChanged { pending });
}

async fn read_request<C>(
    stream: &mut C,
    parser: &mut RequestParser,
) -> Result<Option<Request>, ProxyError>
where
    C: AsyncRead + AsyncWrite + Unpin,
{
    let mut buffer = vec![0u8; 8192];
    loop {
        match parser.poll() {
            ParseStatus::Complete { message } => return Ok(Some(message)),
            ParseStatus::Error { error } => {
                return Err(ProxyError::Runtime(format!("request parse error: {error}")));
            }
            ParseStatus::NeedMore => {}
        }

        let n = stream.read(&mut buffer).await?;
        if n == 0 {
            return Ok(None);
        }
        let _ = parser.push(&buffer[..n]);
    }
}

async fn send_upstream<U>(
    upstream: &mut U,
    wire: &[u8],
    method: &str,
) -> Result<Response, ProxyError>
where
    U: AsyncRead + AsyncWrite + Unpin,
{
    upstream.write_all(wire).await?;
    upstream.flush().await?;

    // HEAD responses advertise a body they never carry; the parser has to
    // know the method to frame them correctly.
    let mut parser = ResponseParser::for_method(method);
    let mut buffer = vec![0u8; 8192];
    loop {
        match parser.poll() {
            ParseStatus::Complete { message } => return Ok(message),
            ParseStatus::Error { error } => {
                return Err(ProxyError::Runtime(format!(
                    "response parse error: {error}"
                )));
            }
            ParseStatus::NeedMore => {}
        }

        let n = upstream.read(&mut buffer).await?;
        if n == 0 {
            return Err(ProxyError::Runtime(
                "upstream closed before full response".to_string(),
            ));
        }
        let _ = parser.push(&buffer[..n]);
    }
}

async fn connect_upstream(host: &str, port: u16) -> Result<TcpStream, ProxyError> {
    tokio::time::timeout(UPSTREAM_CONNECT_TIMEOUT, TcpStream::connect((host, port)))
        .await
        .map_err(|_| ProxyError::Runtime(format!("connect timeout to {host}:{port}")))?
        .map_err(ProxyError::Io)
}

fn package_request(
    request: &Request,
    scheme: &str,
    host: &str,
    port: u16,
    path: String,
    query: Option<String>,
) -> ProxyRequest {
    ProxyRequest {
        id: Uuid::new_v4(),
        scheme: scheme.to_string(),
        host: host.to_string(),
        port,
        method: request.line.method.clone(),
        path,
        query,
        headers: request
            .headers
            .iter()
            .map(|header| (header.raw_name.clone(), header.value.clone()))
            .collect(),
        body: request.body.clone(),
    }
}

/// Serializes a request in origin-form for the upstream connection.
/// Accept-Encoding is stripped so the buffered body is never compressed;
/// framing headers are recomputed from the actual body.
fn serialize_request(request: &ProxyRequest) -> Vec<u8> {
    let target = match &request.query {
        Some(query) => format!("{}?{}", request.path, query),
        None => request.path.clone(),
    };

    let mut bytes = Vec::new();
    bytes.extend_from_slice(format!("{} {} HTTP/1.1\r\n", request.method, target).as_bytes());

    let mut has_host = false;
    for (name, value) in &request.headers {
        if name.eq_ignore_ascii_case("accept-encoding")
            || name.eq_ignore_ascii_case("proxy-connection")
            || name.eq_ignore_ascii_case("content-length")
            || name.eq_ignore_ascii_case("transfer-encoding")
        {
            continue;
        }
        if name.eq_ignore_ascii_case("host") {
            has_host = true;
        }
        bytes.extend_from_slice(name.as_bytes());
        bytes.extend_from_slice(b": ");
        bytes.extend_from_slice(value.as_bytes());
        bytes.extend_from_slice(b"\r\n");
    }

    if !has_host {
        bytes.extend_from_slice(format!("Host: {}\r\n", request.host).as_bytes());
    }
    if !request.body.is_empty() {
        bytes.extend_from_slice(format!("Content-Length: {}\r\n", request.body.len()).as_bytes());
    }

    bytes.extend_from_slice(b"\r\n");
    bytes.extend_from_slice(&request.body);
    bytes
}

/// Manual framing onto the (possibly TLS-terminated) client stream. The
/// body was fully buffered for recording, so chunked and compressed
/// encodings are replaced with an explicit Content-Length.
async fn write_response<C>(
    client: &mut C,
    status_code: u16,
    reason: &str,
    headers: &[(String, String)],
    body: &[u8],
) -> Result<(), ProxyError>
where
    C: AsyncRead + AsyncWrite + Unpin,
{
    let mut bytes = Vec::new();
    bytes.extend_from_slice(format!("HTTP/1.1 {status_code} {reason}\r\n").as_bytes());

    for (name, value) in headers {
        if name.eq_ignore_ascii_case("transfer-encoding")
            || name.eq_ignore_ascii_case("content-encoding")
            || name.eq_ignore_ascii_case("content-length")
        {
            continue;
        }
        bytes.extend_from_slice(name.as_bytes());
        bytes.extend_from_slice(b": ");
        bytes.extend_from_slice(value.as_bytes());
        bytes.extend_from_slice(b"\r\n");
    }

    bytes.extend_from_slice(format!("Content-Length: {}\r\n\r\n", body.len()).as_bytes());
    bytes.extend_from_slice(body);

    client.write_all(&bytes).await?;
    client.flush().await?;
    Ok(())
}

fn emit(state: &ProxyState, event: ProxyEvent) {
    let _ = state.sender.try_send(event);
}

fn resolve_absolute_target(target: &str) -> Option<(String, u16, String, Option<String>)> {
    if !target.starts_with("http://") {
        return None;
    }
    let url = url::Url::parse(target).ok()?;
    let host = url.host_str()?.to_string();
    let port = url.port_or_known_default().unwrap_or(80);
    let path = if url.path().is_empty() {
        "/".to_string()
    } else {
        url.path().to_string()
    };
    let query = url.query().map(|query| query.to_string());
    Some((host, port, path, query))
}

fn split_target(target: &str) -> (String, Option<String>) {
    match target.split_once('?') {
        Some((path, query)) => (path.to_string(), Some(query.to_string())),
        None => (target.to_string(), None),
    }
}

fn split_host_port(target: &str, default_port: u16) -> (String, u16) {
    if let Some((host, port)) = target.rsplit_once(':') {
        if let Ok(port) = port.parse::<u16>() {
            return (host.to_string(), port);
        }
    }
    (target.to_string(), default_port)
}

#[cfg(test)]
mod tests {
    use super::{resolve_absolute_target, serialize_request, split_host_port, split_target};
    use crate::event::ProxyRequest;
    use uuid::Uuid;

    fn request_with_headers(headers: Vec<(String, String)>) -> ProxyRequest {
        ProxyRequest {
            id: Uuid::new_v4(),
            scheme: "https".to_string(),
            host: "api.acme.com".to_string(),
            port: 443,
            method: "POST".to_string(),
            path: "/v1/items".to_string(),
            query: Some("page=2".to_string()),
            headers,
            body: b"{\"name\":\"x\"}".to_vec(),
        }
    }

    #[test]
    fn serializes_origin_form_with_recomputed_framing() {
        let request = request_with_headers(vec![
            ("Host".to_string(), "api.acme.com".to_string()),
            ("Accept-Encoding".to_string(), "gzip".to_string()),
            ("Proxy-Connection".to_string(), "keep-alive".to_string()),
            ("Content-Length".to_string(), "999".to_string()),
            ("X-Custom".to_string(), "kept".to_string()),
        ]);

        let wire = String::from_utf8(serialize_request(&request)).unwrap();
        assert!(wire.starts_with("POST /v1/items?page=2 HTTP/1.1\r\n"));
        assert!(wire.contains("X-Custom: kept\r\n"));
        assert!(wire.contains("Content-Length: 12\r\n"));
        assert!(!wire.to_lowercase().contains("accept-encoding"));
        assert!(!wire.to_lowercase().contains("proxy-connection"));
        assert!(!wire.contains("999"));
    }

    #[test]
    fn adds_host_header_when_missing() {
        let request = request_with_headers(Vec::new());
        let wire = String::from_utf8(serialize_request(&request)).unwrap();
        assert!(wire.contains("Host: api.acme.com\r\n"));
    }

    #[test]
    fn splits_connect_target() {
        assert_eq!(
            split_host_port("api.acme.com:8443", 443),
            ("api.acme.com".to_string(), 8443)
        );
        assert_eq!(
            split_host_port("api.acme.com", 443),
            ("api.acme.com".to_string(), 443)
        );
    }

    #[test]
    fn resolves_absolute_targets_only() {
        let (host, port, path, query) =
            resolve_absolute_target("http://acme.com/search?q=1").unwrap();
        assert_eq!(host, "acme.com");
        assert_eq!(port, 80);
        assert_eq!(path, "/search");
        assert_eq!(query.as_deref(), Some("q=1"));

        assert!(resolve_absolute_target("/relative/path").is_none());
    }

    #[test]
    fn splits_origin_form_target() {
        assert_eq!(
            split_target("/a/b?x=1"),
            ("/a/b".to_string(), Some("x=1".to_string()))
        );
        assert_eq!(split_target("/a/b"), ("/a/b".to_string(), None));
    }
}
