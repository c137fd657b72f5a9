// Allow dead code: Fetch interception and message surface exercised by the in-module tests
#![allow(dead_code)]

//! Offline cache worker.
//!
//! Maintains three named cache partitions on disk and serves intercepted
//! GET requests with a per-resource strategy, mirroring the lifecycle of
//! an installable app's caching worker: install prefetches the static
//! shell, activate evicts partitions left over from earlier versions, and
//! every fetch is answered by exactly one of cache-first,
//! stale-while-revalidate, or network-first.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::notifications::{
    on_notification_click, ClickAction, ClientWindow, Notification, WindowAction,
};
use super::request::FetchRequest;
use super::WorkerError;

/// Worker version, reported through the message channel.
pub const VERSION: &str = "2.0.0";

/// Versioned partition names. Bumping the suffix makes activation evict
/// every partition written by a previous deployment.
const STATIC_CACHE: &str = "glasgow-static-v2";
const DYNAMIC_CACHE: &str = "glasgow-dynamic-v2";
const RUNTIME_CACHE: &str = "glasgow-runtime-v2";

/// Pathnames that must be cached for the app to work offline. Install
/// fails unless every one of them is fetched and stored.
pub const STATIC_FILES: [&str; 7] = [
    "/",
    "/index.html",
    "/manifest.json",
    "/icon-192x192.png",
    "/icon-512x512.png",
    "/icon-72x72.png",
    "/favicon.ico",
];

/// External resources prefetched best-effort at install time. Failures
/// here never fail the install.
pub const EXTERNAL_RESOURCES: [&str; 2] = [
    "https://fonts.googleapis.com/css2?family=Inter:wght@300;400;500;600;700&display=swap",
    "https://fonts.gstatic.com/s/inter/v12/UcCO3FwrK3iLTeHuS_fvQtMwCp50KnMw2boKoduKmMEVuLyfAZ9hiJ-Ek-_EeA.woff2",
];

/// Fallback document served when a page request fails with nothing cached.
const SHELL_PATH: &str = "/index.html";

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Dynamic-partition entries older than this are removed by periodic
/// cleanup. Ageing is based on each entry's own insertion time.
const DYNAMIC_TTL_DAYS: i64 = 7;

// ============================================================================
// Partitions and entries
// ============================================================================

/// The three cache partitions. Every entry lives in exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Partition {
    Static,
    Dynamic,
    Runtime,
}

impl Partition {
    pub fn dir_name(&self) -> &'static str {
        match self {
            Partition::Static => STATIC_CACHE,
            Partition::Dynamic => DYNAMIC_CACHE,
            Partition::Runtime => RUNTIME_CACHE,
        }
    }

    /// The partition names belonging to the current version. Anything
    /// else found on disk is evicted during activation.
    pub fn current_names() -> [&'static str; 3] {
        [STATIC_CACHE, DYNAMIC_CACHE, RUNTIME_CACHE]
    }
}

/// A cached response on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub method: String,
    pub url: String,
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
    /// Insertion time; the basis for TTL cleanup.
    pub stored_at: DateTime<Utc>,
}

/// Where a fetch outcome was served from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServedFrom {
    Network,
    Cache,
    /// The cached application shell document, used as a last resort for
    /// page requests.
    Shell,
}

/// The response handed back for an intercepted request.
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
    pub served_from: ServedFrom,
}

// ============================================================================
// Lifecycle
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Uninstalled,
    Installing,
    /// Installed and waiting to activate.
    Installed,
    Activating,
    Active,
}

// ============================================================================
// Message channel
// ============================================================================

/// Commands accepted on the worker message channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(tag = "type")]
pub enum WorkerCommand {
    #[serde(rename = "SKIP_WAITING")]
    SkipWaiting,
    #[serde(rename = "GET_VERSION")]
    GetVersion,
}

/// Reply to `GET_VERSION`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionReply {
    pub version: String,
}

// ============================================================================
// Worker
// ============================================================================

struct Inner {
    cache_root: PathBuf,
    origin: Url,
    client: Client,
    /// Pathnames served cache-first and prefetched at install.
    static_files: Vec<String>,
    /// Optional external URLs prefetched best-effort at install.
    external_resources: Vec<String>,
    state: RwLock<WorkerState>,
    /// Set when SKIP_WAITING arrives before install completes.
    skip_waiting: AtomicBool,
    /// Whether activation has claimed the open clients.
    controlling: AtomicBool,
    clients: RwLock<Vec<ClientWindow>>,
    next_client_id: AtomicU64,
}

/// Offline cache worker.
/// Clone is cheap - the worker state lives behind one `Arc`, so spawned
/// revalidation tasks share partitions and the connection pool.
#[derive(Clone)]
pub struct OfflineWorker {
    inner: Arc<Inner>,
}

impl OfflineWorker {
    /// Create a worker rooted at `cache_root`, serving the app at `origin`,
    /// with the default static manifest and external resource list.
    pub fn new(cache_root: PathBuf, origin: &str) -> Result<Self, WorkerError> {
        Self::with_manifest(
            cache_root,
            origin,
            STATIC_FILES.iter().map(|s| s.to_string()).collect(),
            EXTERNAL_RESOURCES.iter().map(|s| s.to_string()).collect(),
        )
    }

    /// Create a worker with an explicit manifest.
    pub fn with_manifest(
        cache_root: PathBuf,
        origin: &str,
        static_files: Vec<String>,
        external_resources: Vec<String>,
    ) -> Result<Self, WorkerError> {
        let origin =
            Url::parse(origin).map_err(|_| WorkerError::InvalidUrl(origin.to_string()))?;
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        std::fs::create_dir_all(&cache_root)?;

        Ok(Self {
            inner: Arc::new(Inner {
                cache_root,
                origin,
                client,
                static_files,
                external_resources,
                state: RwLock::new(WorkerState::Uninstalled),
                skip_waiting: AtomicBool::new(false),
                controlling: AtomicBool::new(false),
                clients: RwLock::new(Vec::new()),
                next_client_id: AtomicU64::new(1),
            }),
        })
    }

    pub fn state(&self) -> WorkerState {
        *self.inner.state.read().expect("worker state lock poisoned")
    }

    fn set_state(&self, state: WorkerState) {
        *self.inner.state.write().expect("worker state lock poisoned") = state;
    }

    /// Whether activation has claimed the open clients.
    pub fn is_controlling(&self) -> bool {
        self.inner.controlling.load(Ordering::SeqCst)
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Install: fetch and store every static manifest entry, and prefetch
    /// the optional external resources best-effort. All static fetches
    /// must succeed (2xx) or the install fails and the state stays
    /// `Uninstalled`.
    pub async fn install(&self) -> Result<(), WorkerError> {
        info!(version = VERSION, "Worker installing");
        self.set_state(WorkerState::Installing);

        let static_files = self.inner.static_files.clone();
        let static_fetches = static_files.iter().map(|path| {
            let worker = self.clone();
            async move {
                let url = worker
                    .inner
                    .origin
                    .join(path)
                    .map_err(|_| WorkerError::InvalidUrl(path.to_string()))?;
                let (status, content_type, body) = worker.fetch_network(url.clone()).await?;
                if !(200..300).contains(&status) {
                    return Err(WorkerError::InstallFailed(format!(
                        "static asset {} returned status {}",
                        path, status
                    )));
                }
                worker.store_entry(
                    Partition::Static,
                    "GET",
                    url.as_str(),
                    status,
                    content_type,
                    body,
                )?;
                debug!(%path, "Static asset cached");
                Ok::<(), WorkerError>(())
            }
        });

        // Optional externals: each failure is logged and swallowed.
        let external_resources = self.inner.external_resources.clone();
        let external_fetches = external_resources.iter().map(|url| {
            let worker = self.clone();
            async move {
                match worker.prefetch_external(url).await {
                    Ok(()) => debug!(%url, "External resource cached"),
                    Err(e) => debug!(%url, error = %e, "Could not cache external resource"),
                }
            }
        });

        let (static_results, _) =
            futures::join!(join_all(static_fetches), join_all(external_fetches));

        for result in static_results {
            if let Err(e) = result {
                warn!(error = %e, "Install failed");
                self.set_state(WorkerState::Uninstalled);
                return Err(e);
            }
        }

        self.set_state(WorkerState::Installed);
        info!("Worker installed");

        if self.inner.skip_waiting.swap(false, Ordering::SeqCst) {
            self.activate().await?;
        }
        Ok(())
    }

    async fn prefetch_external(&self, url: &str) -> Result<(), WorkerError> {
        let parsed = Url::parse(url).map_err(|_| WorkerError::InvalidUrl(url.to_string()))?;
        let (status, content_type, body) = self.fetch_network(parsed).await?;
        if (200..300).contains(&status) {
            self.store_entry(Partition::Runtime, "GET", url, status, content_type, body)?;
        }
        Ok(())
    }

    /// Activate: evict every partition directory that does not belong to
    /// the current version, then claim the open clients.
    pub async fn activate(&self) -> Result<(), WorkerError> {
        info!("Worker activating");
        self.set_state(WorkerState::Activating);

        let current = Partition::current_names();
        for dir_entry in std::fs::read_dir(&self.inner.cache_root)? {
            let dir_entry = dir_entry?;
            if !dir_entry.file_type()?.is_dir() {
                continue;
            }
            let name = dir_entry.file_name();
            let name = name.to_string_lossy();
            if !current.contains(&name.as_ref()) {
                info!(partition = %name, "Evicting stale cache partition");
                std::fs::remove_dir_all(dir_entry.path())?;
            }
        }

        self.inner.controlling.store(true, Ordering::SeqCst);
        self.set_state(WorkerState::Active);
        info!("Worker active");
        Ok(())
    }

    /// Request immediate activation. A waiting worker activates right
    /// away; one still installing activates as soon as install completes.
    pub async fn skip_waiting(&self) -> Result<(), WorkerError> {
        match self.state() {
            WorkerState::Installed => self.activate().await,
            WorkerState::Active | WorkerState::Activating => Ok(()),
            _ => {
                self.inner.skip_waiting.store(true, Ordering::SeqCst);
                Ok(())
            }
        }
    }

    // =========================================================================
    // Message channel
    // =========================================================================

    /// Handle a raw message from a client. `SKIP_WAITING` triggers
    /// immediate activation and has no reply; `GET_VERSION` replies with
    /// the version string.
    pub async fn handle_message(&self, raw: &str) -> Result<Option<VersionReply>, WorkerError> {
        let command: WorkerCommand =
            serde_json::from_str(raw).map_err(WorkerError::InvalidMessage)?;
        self.handle_command(command).await
    }

    pub async fn handle_command(
        &self,
        command: WorkerCommand,
    ) -> Result<Option<VersionReply>, WorkerError> {
        match command {
            WorkerCommand::SkipWaiting => {
                self.skip_waiting().await?;
                Ok(None)
            }
            WorkerCommand::GetVersion => Ok(Some(VersionReply {
                version: VERSION.to_string(),
            })),
        }
    }

    // =========================================================================
    // Clients and notifications
    // =========================================================================

    /// Register an open application window. Returns its client id.
    pub fn connect_client(&self, url: &str) -> u64 {
        let id = self.inner.next_client_id.fetch_add(1, Ordering::SeqCst);
        let mut clients = self.inner.clients.write().expect("clients lock poisoned");
        clients.push(ClientWindow {
            id,
            url: url.to_string(),
        });
        id
    }

    pub fn disconnect_client(&self, id: u64) {
        let mut clients = self.inner.clients.write().expect("clients lock poisoned");
        clients.retain(|c| c.id != id);
    }

    /// Build a notification from a raw push payload, tolerating missing
    /// fields.
    pub fn handle_push(&self, data: &[u8]) -> Result<Notification, WorkerError> {
        Notification::from_json(data).map_err(WorkerError::InvalidMessage)
    }

    /// Decide what a notification click does with the app window.
    pub fn handle_notification_click(&self, action: ClickAction) -> Option<WindowAction> {
        let clients = self.inner.clients.read().expect("clients lock poisoned");
        on_notification_click(action, &clients)
    }

    // =========================================================================
    // Fetch interception
    // =========================================================================

    /// Handle an intercepted request. Non-GET requests bypass the worker
    /// entirely (`Ok(None)`). Exactly one strategy applies per request:
    /// static-manifest membership first, then origin comparison, then the
    /// same-origin dynamic default.
    pub async fn handle_fetch(
        &self,
        request: &FetchRequest,
    ) -> Result<Option<FetchOutcome>, WorkerError> {
        if !request.is_get() {
            return Ok(None);
        }

        // The manifest check wins even for a cross-origin static URL;
        // pinned externals are handled by the install-time prefetch.
        let is_static = self
            .inner
            .static_files
            .iter()
            .any(|f| f == request.url.path());
        let outcome = if is_static {
            self.cache_first(request).await
        } else if request.url.origin() != self.inner.origin.origin() {
            self.stale_while_revalidate(request).await
        } else {
            self.network_first(request).await
        };
        outcome.map(Some)
    }

    /// Cache-first for static assets: cached copy wins; a miss goes to the
    /// network and the response is stored for next time. When both fail, a
    /// page request falls back to the cached application shell.
    async fn cache_first(&self, request: &FetchRequest) -> Result<FetchOutcome, WorkerError> {
        if let Some(entry) = self.load_entry(Partition::Static, &request.cache_key())? {
            return Ok(Self::outcome_from(entry, ServedFrom::Cache));
        }

        match self.fetch_network(request.url.clone()).await {
            Ok((status, content_type, body)) => {
                self.store_entry(
                    Partition::Static,
                    &request.method,
                    request.url.as_str(),
                    status,
                    content_type.clone(),
                    body.clone(),
                )?;
                Ok(FetchOutcome {
                    status,
                    content_type,
                    body,
                    served_from: ServedFrom::Network,
                })
            }
            Err(e) => {
                debug!(url = %request.url, error = %e, "Static fetch failed");
                if request.expects_document() {
                    if let Some(shell) = self.load_shell()? {
                        return Ok(shell);
                    }
                }
                Err(WorkerError::Offline {
                    url: request.url.to_string(),
                })
            }
        }
    }

    /// Stale-while-revalidate for cross-origin resources: a cached copy is
    /// returned immediately while a background task refreshes it; with no
    /// cached copy the request waits on the network.
    async fn stale_while_revalidate(
        &self,
        request: &FetchRequest,
    ) -> Result<FetchOutcome, WorkerError> {
        if let Some(entry) = self.load_entry(Partition::Runtime, &request.cache_key())? {
            let worker = self.clone();
            let request = request.clone();
            // Fire-and-forget; a failed or abandoned revalidation only
            // means the cached copy stays until the next request.
            tokio::spawn(async move {
                if let Err(e) = worker.revalidate(&request).await {
                    debug!(url = %request.url, error = %e, "Revalidation failed");
                }
            });
            return Ok(Self::outcome_from(entry, ServedFrom::Cache));
        }

        let (status, content_type, body) = self
            .fetch_network(request.url.clone())
            .await
            .map_err(|e| {
                debug!(url = %request.url, error = %e, "Cross-origin fetch failed with empty cache");
                WorkerError::Offline {
                    url: request.url.to_string(),
                }
            })?;
        if (200..300).contains(&status) {
            self.store_entry(
                Partition::Runtime,
                &request.method,
                request.url.as_str(),
                status,
                content_type.clone(),
                body.clone(),
            )?;
        }
        Ok(FetchOutcome {
            status,
            content_type,
            body,
            served_from: ServedFrom::Network,
        })
    }

    async fn revalidate(&self, request: &FetchRequest) -> Result<(), WorkerError> {
        let (status, content_type, body) = self.fetch_network(request.url.clone()).await?;
        if (200..300).contains(&status) {
            self.store_entry(
                Partition::Runtime,
                &request.method,
                request.url.as_str(),
                status,
                content_type,
                body,
            )?;
            debug!(url = %request.url, "Runtime cache refreshed");
        }
        Ok(())
    }

    /// Network-first for same-origin dynamic content: a successful (2xx)
    /// response is stored and returned; a network failure falls back to
    /// the exact cached request, then to the application shell.
    async fn network_first(&self, request: &FetchRequest) -> Result<FetchOutcome, WorkerError> {
        match self.fetch_network(request.url.clone()).await {
            Ok((status, content_type, body)) => {
                if (200..300).contains(&status) {
                    self.store_entry(
                        Partition::Dynamic,
                        &request.method,
                        request.url.as_str(),
                        status,
                        content_type.clone(),
                        body.clone(),
                    )?;
                }
                Ok(FetchOutcome {
                    status,
                    content_type,
                    body,
                    served_from: ServedFrom::Network,
                })
            }
            Err(e) => {
                debug!(url = %request.url, error = %e, "Dynamic fetch failed, trying cache");
                if let Some(entry) = self.load_entry(Partition::Dynamic, &request.cache_key())? {
                    return Ok(Self::outcome_from(entry, ServedFrom::Cache));
                }
                if let Some(shell) = self.load_shell()? {
                    return Ok(shell);
                }
                Err(WorkerError::Offline {
                    url: request.url.to_string(),
                })
            }
        }
    }

    // =========================================================================
    // Periodic cleanup
    // =========================================================================

    /// Remove dynamic-partition entries older than the TTL, judged by each
    /// entry's own insertion time. Returns the number of entries removed.
    pub fn cleanup_expired(&self) -> Result<usize, WorkerError> {
        let dir = self.partition_dir(Partition::Dynamic);
        if !dir.exists() {
            return Ok(0);
        }

        let cutoff = Utc::now() - chrono::Duration::days(DYNAMIC_TTL_DAYS);
        let mut removed = 0;
        for dir_entry in std::fs::read_dir(&dir)? {
            let path = dir_entry?.path();
            let expired = match Self::read_entry(&path) {
                Ok(entry) => entry.stored_at < cutoff,
                Err(e) => {
                    // An unreadable entry can never be served; drop it.
                    warn!(path = %path.display(), error = %e, "Removing unreadable cache entry");
                    true
                }
            };
            if expired {
                std::fs::remove_file(&path)?;
                removed += 1;
            }
        }

        if removed > 0 {
            info!(removed, "Expired dynamic cache entries removed");
        }
        Ok(removed)
    }

    // =========================================================================
    // Partition storage
    // =========================================================================

    fn partition_dir(&self, partition: Partition) -> PathBuf {
        self.inner.cache_root.join(partition.dir_name())
    }

    fn entry_path(&self, partition: Partition, key: &str) -> PathBuf {
        self.partition_dir(partition).join(format!("{}.json", key))
    }

    fn store_entry(
        &self,
        partition: Partition,
        method: &str,
        url: &str,
        status: u16,
        content_type: Option<String>,
        body: Vec<u8>,
    ) -> Result<(), WorkerError> {
        let entry = CacheEntry {
            method: method.to_string(),
            url: url.to_string(),
            status,
            content_type,
            body,
            stored_at: Utc::now(),
        };

        let key = super::request::cache_key(method, url);
        let path = self.entry_path(partition, &key);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string(&entry).map_err(WorkerError::Encode)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn load_entry(
        &self,
        partition: Partition,
        key: &str,
    ) -> Result<Option<CacheEntry>, WorkerError> {
        let path = self.entry_path(partition, key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(Self::read_entry(&path)?))
    }

    fn read_entry(path: &Path) -> Result<CacheEntry, WorkerError> {
        let contents = std::fs::read_to_string(path)?;
        serde_json::from_str(&contents).map_err(|e| WorkerError::Corrupt {
            path: path.to_path_buf(),
            source: e,
        })
    }

    fn load_shell(&self) -> Result<Option<FetchOutcome>, WorkerError> {
        let shell_url = self
            .inner
            .origin
            .join(SHELL_PATH)
            .map_err(|_| WorkerError::InvalidUrl(SHELL_PATH.to_string()))?;
        let key = super::request::cache_key("GET", shell_url.as_str());
        Ok(self
            .load_entry(Partition::Static, &key)?
            .map(|entry| Self::outcome_from(entry, ServedFrom::Shell)))
    }

    fn outcome_from(entry: CacheEntry, served_from: ServedFrom) -> FetchOutcome {
        FetchOutcome {
            status: entry.status,
            content_type: entry.content_type,
            body: entry.body,
            served_from,
        }
    }

    async fn fetch_network(
        &self,
        url: Url,
    ) -> Result<(u16, Option<String>, Vec<u8>), WorkerError> {
        let response = self.inner.client.get(url).send().await?;
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string());
        let body = response.bytes().await?.to_vec();
        Ok((status, content_type, body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::worker::request::{cache_key, Destination};

    const SHELL_BODY: &[u8] = b"<html>app shell</html>";

    /// Worker with a two-entry static manifest and no external resources,
    /// pointed at a mock server.
    fn test_worker(server: &mockito::ServerGuard, dir: &tempfile::TempDir) -> OfflineWorker {
        OfflineWorker::with_manifest(
            dir.path().to_path_buf(),
            &server.url(),
            vec!["/".to_string(), "/index.html".to_string()],
            Vec::new(),
        )
        .unwrap()
    }

    /// Mount the static manifest on the mock server.
    async fn mount_static(server: &mut mockito::ServerGuard) -> Vec<mockito::Mock> {
        let root = server
            .mock("GET", "/")
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body(SHELL_BODY)
            .expect(1)
            .create_async()
            .await;
        let shell = server
            .mock("GET", "/index.html")
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body(SHELL_BODY)
            .expect(1)
            .create_async()
            .await;
        vec![root, shell]
    }

    #[test]
    fn test_partition_names_are_versioned() {
        for name in Partition::current_names() {
            assert!(name.contains("-v"));
        }
    }

    #[test]
    fn test_command_wire_format() {
        let cmd: WorkerCommand = serde_json::from_str(r#"{"type":"SKIP_WAITING"}"#).unwrap();
        assert_eq!(cmd, WorkerCommand::SkipWaiting);

        let cmd: WorkerCommand = serde_json::from_str(r#"{"type":"GET_VERSION"}"#).unwrap();
        assert_eq!(cmd, WorkerCommand::GetVersion);

        let reply = VersionReply {
            version: VERSION.to_string(),
        };
        assert_eq!(
            serde_json::to_string(&reply).unwrap(),
            format!("{{\"version\":\"{}\"}}", VERSION)
        );
    }

    #[tokio::test]
    async fn test_unknown_message_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let worker =
            OfflineWorker::new(dir.path().to_path_buf(), "http://localhost:1").unwrap();
        assert!(worker.handle_message(r#"{"type":"NOPE"}"#).await.is_err());
    }

    #[tokio::test]
    async fn test_install_caches_static_assets_once_and_serves_offline() {
        let mut server = mockito::Server::new_async().await;
        let dir = tempfile::tempdir().unwrap();
        let mocks = mount_static(&mut server).await;
        let origin = server.url();

        let worker = test_worker(&server, &dir);
        worker.install().await.unwrap();
        assert_eq!(worker.state(), WorkerState::Installed);
        for mock in &mocks {
            mock.assert_async().await;
        }

        // Network gone: every static asset must come back byte-identical
        // from the static partition.
        drop(server);
        for path in ["/", "/index.html"] {
            let request =
                FetchRequest::document(&format!("{}{}", origin, path)).unwrap();
            let outcome = worker.handle_fetch(&request).await.unwrap().unwrap();
            assert_eq!(outcome.served_from, ServedFrom::Cache);
            assert_eq!(outcome.body, SHELL_BODY);
        }
    }

    #[tokio::test]
    async fn test_install_fails_when_a_static_asset_is_missing() {
        let mut server = mockito::Server::new_async().await;
        let dir = tempfile::tempdir().unwrap();
        server
            .mock("GET", "/")
            .with_status(200)
            .with_body(SHELL_BODY)
            .create_async()
            .await;
        // No mock for /index.html -> mockito answers 501

        let worker = test_worker(&server, &dir);
        assert!(worker.install().await.is_err());
        assert_eq!(worker.state(), WorkerState::Uninstalled);
    }

    #[tokio::test]
    async fn test_network_first_caches_then_falls_back_offline() {
        let mut server = mockito::Server::new_async().await;
        let dir = tempfile::tempdir().unwrap();
        server
            .mock("GET", "/api/protocols")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"ok":true}"#)
            .create_async()
            .await;

        let worker = test_worker(&server, &dir);
        let request =
            FetchRequest::get(&format!("{}/api/protocols", server.url())).unwrap();

        let online = worker.handle_fetch(&request).await.unwrap().unwrap();
        assert_eq!(online.served_from, ServedFrom::Network);

        drop(server);
        let offline = worker.handle_fetch(&request).await.unwrap().unwrap();
        assert_eq!(offline.served_from, ServedFrom::Cache);
        assert_eq!(offline.body, br#"{"ok":true}"#);
    }

    #[tokio::test]
    async fn test_network_first_falls_back_to_shell() {
        let mut server = mockito::Server::new_async().await;
        let dir = tempfile::tempdir().unwrap();
        mount_static(&mut server).await;
        let origin = server.url();

        let worker = test_worker(&server, &dir);
        worker.install().await.unwrap();

        drop(server);
        // Never fetched while online, so only the shell can answer.
        let request = FetchRequest::document(&format!("{}/history", origin)).unwrap();
        let outcome = worker.handle_fetch(&request).await.unwrap().unwrap();
        assert_eq!(outcome.served_from, ServedFrom::Shell);
        assert_eq!(outcome.body, SHELL_BODY);
    }

    #[tokio::test]
    async fn test_stale_while_revalidate_serves_cache_and_refreshes() {
        let server = mockito::Server::new_async().await;
        let mut external = mockito::Server::new_async().await;
        let dir = tempfile::tempdir().unwrap();

        let v1 = external
            .mock("GET", "/font.css")
            .with_status(200)
            .with_body("v1")
            .create_async()
            .await;

        let worker = test_worker(&server, &dir);
        let request = FetchRequest::get(&format!("{}/font.css", external.url())).unwrap();

        // Empty cache: waits on the network.
        let first = worker.handle_fetch(&request).await.unwrap().unwrap();
        assert_eq!(first.served_from, ServedFrom::Network);
        assert_eq!(first.body, b"v1");
        v1.assert_async().await;

        // Newer mock takes precedence for the revalidation fetch.
        external
            .mock("GET", "/font.css")
            .with_status(200)
            .with_body("v2")
            .create_async()
            .await;

        // Cached copy is returned immediately, refresh happens behind it.
        let second = worker.handle_fetch(&request).await.unwrap().unwrap();
        assert_eq!(second.served_from, ServedFrom::Cache);
        assert_eq!(second.body, b"v1");

        let key = request.cache_key();
        let mut refreshed = false;
        for _ in 0..40 {
            tokio::time::sleep(Duration::from_millis(50)).await;
            let entry = worker.load_entry(Partition::Runtime, &key).unwrap().unwrap();
            if entry.body == b"v2" {
                refreshed = true;
                break;
            }
        }
        assert!(refreshed, "revalidation never refreshed the cached copy");
    }

    #[tokio::test]
    async fn test_static_manifest_wins_over_cross_origin() {
        let server = mockito::Server::new_async().await;
        let mut pinned = mockito::Server::new_async().await;
        let dir = tempfile::tempdir().unwrap();

        pinned
            .mock("GET", "/index.html")
            .with_status(200)
            .with_body("pinned shell")
            .create_async()
            .await;

        let worker = test_worker(&server, &dir);
        // Cross-origin URL whose pathname is in the static manifest:
        // must take the cache-first path and land in the static partition.
        let request =
            FetchRequest::get(&format!("{}/index.html", pinned.url())).unwrap();
        let outcome = worker.handle_fetch(&request).await.unwrap().unwrap();
        assert_eq!(outcome.served_from, ServedFrom::Network);

        let key = request.cache_key();
        assert!(worker.load_entry(Partition::Static, &key).unwrap().is_some());
        assert!(worker.load_entry(Partition::Runtime, &key).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_non_get_bypasses_the_worker() {
        let server = mockito::Server::new_async().await;
        let dir = tempfile::tempdir().unwrap();
        let worker = test_worker(&server, &dir);

        let request = FetchRequest::new(
            "POST",
            &format!("{}/api/save", server.url()),
            Destination::Resource,
        )
        .unwrap();
        assert!(worker.handle_fetch(&request).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_activation_evicts_only_stale_partitions() {
        let mut server = mockito::Server::new_async().await;
        let dir = tempfile::tempdir().unwrap();
        mount_static(&mut server).await;

        // Partitions left behind by a previous deployment
        for stale in ["glasgow-static-v1", "glasgow-dynamic-v1", "glasgow-runtime-v1"] {
            std::fs::create_dir_all(dir.path().join(stale)).unwrap();
        }

        let worker = test_worker(&server, &dir);
        worker.install().await.unwrap();
        worker.activate().await.unwrap();
        assert_eq!(worker.state(), WorkerState::Active);
        assert!(worker.is_controlling());

        for stale in ["glasgow-static-v1", "glasgow-dynamic-v1", "glasgow-runtime-v1"] {
            assert!(!dir.path().join(stale).exists(), "{} survived", stale);
        }
        assert!(dir.path().join(STATIC_CACHE).exists());
    }

    #[tokio::test]
    async fn test_skip_waiting_message_activates_waiting_worker() {
        let mut server = mockito::Server::new_async().await;
        let dir = tempfile::tempdir().unwrap();
        mount_static(&mut server).await;

        let worker = test_worker(&server, &dir);
        worker.install().await.unwrap();
        assert_eq!(worker.state(), WorkerState::Installed);

        let reply = worker
            .handle_message(r#"{"type":"SKIP_WAITING"}"#)
            .await
            .unwrap();
        assert!(reply.is_none());
        assert_eq!(worker.state(), WorkerState::Active);

        let reply = worker
            .handle_message(r#"{"type":"GET_VERSION"}"#)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(reply.version, VERSION);
    }

    #[tokio::test]
    async fn test_cleanup_removes_only_expired_dynamic_entries() {
        let server = mockito::Server::new_async().await;
        let dir = tempfile::tempdir().unwrap();
        let worker = test_worker(&server, &dir);

        let fresh_url = format!("{}/fresh", server.url());
        let old_url = format!("{}/old", server.url());
        worker
            .store_entry(Partition::Dynamic, "GET", &fresh_url, 200, None, b"fresh".to_vec())
            .unwrap();
        worker
            .store_entry(Partition::Dynamic, "GET", &old_url, 200, None, b"old".to_vec())
            .unwrap();

        // Age the second entry past the TTL
        let old_key = cache_key("GET", &old_url);
        let path = worker.entry_path(Partition::Dynamic, &old_key);
        let mut entry = OfflineWorker::read_entry(&path).unwrap();
        entry.stored_at = Utc::now() - chrono::Duration::days(DYNAMIC_TTL_DAYS + 1);
        std::fs::write(&path, serde_json::to_string(&entry).unwrap()).unwrap();

        assert_eq!(worker.cleanup_expired().unwrap(), 1);

        let fresh_key = cache_key("GET", &fresh_url);
        assert!(worker.load_entry(Partition::Dynamic, &fresh_key).unwrap().is_some());
        assert!(worker.load_entry(Partition::Dynamic, &old_key).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_push_and_notification_click() {
        let server = mockito::Server::new_async().await;
        let dir = tempfile::tempdir().unwrap();
        let worker = test_worker(&server, &dir);

        let notification = worker.handle_push(b"{}").unwrap();
        assert_eq!(notification.title, "Glasgow Scale");

        // No open clients: the open-app action opens a new window
        assert_eq!(
            worker.handle_notification_click(ClickAction::Explore),
            Some(WindowAction::Open("/".to_string()))
        );

        let id = worker.connect_client("/");
        assert_eq!(
            worker.handle_notification_click(ClickAction::Explore),
            Some(WindowAction::Focus(id))
        );

        worker.disconnect_client(id);
        assert_eq!(worker.handle_notification_click(ClickAction::Close), None);
    }
}
