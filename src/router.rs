//! SPA content loader.
//!
//! The router turns link clicks, `popstate` events and the initial page load
//! into navigations. Each navigation fetches the target document, extracts its
//! main-content fragment and swaps it into the page, then mounts the incoming
//! view so the fresh markup gets its behavior back.
//!
//! A navigation runs in two synchronous halves around the fetch:
//! [`Router::begin`] issues a [`NavigationToken`] and updates history, and
//! [`Router::complete`] applies the response. Only the completion carrying the
//! latest token is rendered; older ones are dropped as superseded.
//! [`navigate`] glues the halves to a [`PageFetcher`].

use crate::config::{ConfigError, SiteConfig};
use crate::fragment::{FetchError, FragmentSelector, LoadError, PageFragment};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use tracing::{debug, info, warn};
use url::Url;

/// Views that can occupy the main-content area.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum View {
    Home,
    Projects,
    Registration,
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            View::Home => write!(f, "home"),
            View::Projects => write!(f, "projects"),
            View::Registration => write!(f, "registration"),
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Route {
    pub path: &'static str,
    /// Document fetched for this route.
    pub document: &'static str,
    pub view: View,
}

#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    /// The site's fixed routes. The first entry is the home route.
    pub fn standard() -> Self {
        Self {
            routes: vec![
                Route {
                    path: "/",
                    document: "/index.html",
                    view: View::Home,
                },
                Route {
                    path: "/index.html",
                    document: "/index.html",
                    view: View::Home,
                },
                Route {
                    path: "/projetos.html",
                    document: "/projetos.html",
                    view: View::Projects,
                },
                Route {
                    path: "/cadastro.html",
                    document: "/cadastro.html",
                    view: View::Registration,
                },
            ],
        }
    }

    pub fn resolve(&self, path: &str) -> Option<&Route> {
        self.routes.iter().find(|route| route.path == path)
    }

    pub fn home(&self) -> &Route {
        &self.routes[0]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Route> {
        self.routes.iter()
    }
}

/// State object stored with every pushed or replaced history entry.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub path: String,
}

impl HistoryEntry {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| format!("{{\"path\":{:?}}}", self.path))
    }

    /// `None` for anything that is not a state this router wrote.
    pub fn from_json(raw: &str) -> Option<Self> {
        serde_json::from_str(raw).ok()
    }
}

/// Where an `href` points, relative to the current location.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum LinkTarget {
    /// Same origin. `location` is the path with its query and fragment.
    Internal { path: String, location: String },
    External,
    Mailto,
    Tel,
    /// In-page anchor on the current document.
    Fragment,
    Unresolvable,
}

pub fn resolve_link(base: &Url, href: &str) -> LinkTarget {
    let href = href.trim();
    if href.is_empty() {
        return LinkTarget::Unresolvable;
    }
    if href.starts_with('#') {
        return LinkTarget::Fragment;
    }
    let lower = href.to_ascii_lowercase();
    if lower.starts_with("mailto:") {
        return LinkTarget::Mailto;
    }
    if lower.starts_with("tel:") {
        return LinkTarget::Tel;
    }
    let Ok(url) = base.join(href) else {
        return LinkTarget::Unresolvable;
    };
    if !matches!(url.scheme(), "http" | "https") || url.origin() != base.origin() {
        return LinkTarget::External;
    }
    if url.fragment().is_some() && url.path() == base.path() && url.query() == base.query() {
        return LinkTarget::Fragment;
    }
    LinkTarget::Internal {
        path: url.path().to_string(),
        location: location_of(&url),
    }
}

/// Path, query and fragment of `url`, as written to the address bar.
fn location_of(url: &Url) -> String {
    let mut location = url.path().to_string();
    if let Some(query) = url.query() {
        location.push('?');
        location.push_str(query);
    }
    if let Some(fragment) = url.fragment() {
        location.push('#');
        location.push_str(fragment);
    }
    location
}

/// What the page knows about a click when it reaches the router.
#[derive(Debug, Clone, Default)]
pub struct LinkClick {
    /// `href` of the closest anchor, if the click landed inside one.
    pub href: Option<String>,
    pub target: Option<String>,
    pub download: bool,
    /// Ctrl, Meta, Shift or Alt held.
    pub modified: bool,
    pub button: i16,
    /// The click started on the theme toggle control.
    pub from_theme_toggle: bool,
    /// The click started on the hamburger button, which toggles the menu itself.
    pub from_menu_toggle: bool,
}

#[derive(Debug, Clone, Eq, PartialEq, Default)]
pub struct ClickDecision {
    /// Set when the default navigation must be prevented.
    pub navigate: Option<NavigationRequest>,
    pub close_menu: bool,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum NavigationOrigin {
    Initial,
    Click,
    PopState,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct NavigationRequest {
    pub path: String,
    /// Address-bar URL recorded in history; `path` plus any query and fragment.
    pub location: String,
    pub origin: NavigationOrigin,
}

impl NavigationRequest {
    pub fn new(path: impl Into<String>, origin: NavigationOrigin) -> Self {
        let path = path.into();
        Self {
            location: path.clone(),
            path,
            origin,
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }
}

/// Monotonic id of a navigation; only the latest one may render.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct NavigationToken(u64);

impl NavigationToken {
    pub fn get(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct PendingNavigation {
    token: NavigationToken,
    route: Route,
    origin: NavigationOrigin,
}

impl PendingNavigation {
    pub fn token(&self) -> NavigationToken {
        self.token
    }

    pub fn path(&self) -> &'static str {
        self.route.path
    }

    pub fn document(&self) -> &'static str {
        self.route.document
    }

    pub fn origin(&self) -> NavigationOrigin {
        self.origin
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Default)]
pub enum NavState {
    #[default]
    Idle,
    Loading {
        path: String,
        token: NavigationToken,
    },
    Rendered(String),
    Error(String),
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum NavOutcome {
    Rendered { path: String, title: String },
    Failed { path: String, error: LoadError },
    /// A newer navigation was issued before this one completed.
    Superseded { path: String },
}

/// Live page the router renders into.
pub trait ContentHost {
    /// Replaces the main-content area with the fragment's children.
    fn replace_main(&mut self, fragment: &PageFragment);
    /// Replaces the main-content area with an inline error notice.
    fn show_error(&mut self, notice: &str);
    fn set_title(&mut self, title: &str);
    fn scroll_to_top(&mut self);
    /// Attaches the view's behavior to freshly inserted markup.
    fn mount(&mut self, view: View);
    /// Detaches behavior from markup that is about to be replaced.
    fn unmount(&mut self, view: View);
}

/// Browser session history. `url` is what the address bar shows.
pub trait BrowserHistory {
    fn push(&mut self, entry: &HistoryEntry, url: &str);
    fn replace(&mut self, entry: &HistoryEntry, url: &str);
}

/// Retrieves a routable document by path.
pub trait PageFetcher {
    fn fetch(&self, document: &str) -> impl Future<Output = Result<String, FetchError>>;
}

pub struct Router<H> {
    config: SiteConfig,
    routes: RouteTable,
    selector: FragmentSelector,
    host: H,
    state: NavState,
    latest: u64,
    mounted: Option<View>,
}

impl<H: ContentHost + BrowserHistory> Router<H> {
    pub fn new(config: SiteConfig, routes: RouteTable, host: H) -> Result<Self, ConfigError> {
        let selector = FragmentSelector::parse(&config.main_selector)?;
        Ok(Self {
            config,
            routes,
            selector,
            host,
            state: NavState::Idle,
            latest: 0,
            mounted: None,
        })
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub fn state(&self) -> &NavState {
        &self.state
    }

    pub fn latest_token(&self) -> Option<NavigationToken> {
        (self.latest > 0).then_some(NavigationToken(self.latest))
    }

    pub fn mounted_view(&self) -> Option<View> {
        self.mounted
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Resolves the location the page was loaded at (path, optionally
    /// followed by a query and fragment). Unknown paths are rewritten to the
    /// home route with a history replace, never a push.
    pub fn initial(&mut self, current: &str) -> NavigationRequest {
        let split = current.find(['?', '#']).unwrap_or(current.len());
        let (current_path, suffix) = current.split_at(split);
        let request = match self.routes.resolve(current_path) {
            Some(route) => NavigationRequest::new(route.path, NavigationOrigin::Initial)
                .with_location(format!("{}{suffix}", route.path)),
            None => {
                let home = self.routes.home().path;
                info!(from = current, to = home, "unknown initial path, normalizing to home");
                NavigationRequest::new(home, NavigationOrigin::Initial)
            }
        };
        self.host
            .replace(&HistoryEntry::new(request.path.as_str()), &request.location);
        request
    }

    /// Decides whether a click becomes an SPA navigation and whether the
    /// menu should close.
    pub fn handle_click(&self, base: &Url, click: &LinkClick, menu_open: bool) -> ClickDecision {
        let close_menu = menu_open && !click.from_theme_toggle && !click.from_menu_toggle;
        let Some(href) = click.href.as_deref() else {
            return ClickDecision {
                navigate: None,
                close_menu,
            };
        };

        let same_tab = click
            .target
            .as_deref()
            .map(|target| target.is_empty() || target.eq_ignore_ascii_case("_self"))
            .unwrap_or(true);
        let plain = click.button == 0 && !click.modified && !click.download && same_tab;

        let navigate = match resolve_link(base, href) {
            LinkTarget::Internal { path, location } if plain => {
                self.routes.resolve(&path).map(|route| {
                    NavigationRequest::new(route.path, NavigationOrigin::Click)
                        .with_location(location)
                })
            }
            _ => None,
        };
        ClickDecision {
            navigate,
            close_menu,
        }
    }

    /// Back/forward traversal. A missing or unknown state loads home.
    pub fn handle_popstate(&self, state: Option<HistoryEntry>) -> NavigationRequest {
        let path = state
            .and_then(|entry| self.routes.resolve(&entry.path).map(|route| route.path))
            .unwrap_or(self.routes.home().path);
        NavigationRequest::new(path, NavigationOrigin::PopState)
    }

    /// Enters `Loading`. Clicks push a history entry; popstate and the
    /// initial load leave history alone.
    pub fn begin(&mut self, request: NavigationRequest) -> PendingNavigation {
        let (route, location) = match self.routes.resolve(&request.path) {
            Some(route) => (*route, request.location.as_str()),
            None => (*self.routes.home(), self.routes.home().path),
        };
        self.latest += 1;
        let token = NavigationToken(self.latest);
        if request.origin == NavigationOrigin::Click {
            self.host.push(&HistoryEntry::new(route.path), location);
        }
        debug!(path = route.path, token = token.0, origin = ?request.origin, "navigation started");
        self.state = NavState::Loading {
            path: route.path.to_string(),
            token,
        };
        PendingNavigation {
            token,
            route,
            origin: request.origin,
        }
    }

    /// Applies a fetch result. Stale tokens are discarded untouched.
    pub fn complete(
        &mut self,
        pending: PendingNavigation,
        body: Result<String, FetchError>,
    ) -> NavOutcome {
        let path = pending.route.path.to_string();
        if pending.token.0 != self.latest {
            debug!(
                path = %path,
                token = pending.token.0,
                latest = self.latest,
                "discarding superseded navigation"
            );
            return NavOutcome::Superseded { path };
        }

        let loaded = body
            .map_err(LoadError::from)
            .and_then(|html| self.selector.extract(&html, &self.config.default_title));

        if let Some(previous) = self.mounted.take() {
            self.host.unmount(previous);
        }

        match loaded {
            Ok(fragment) => {
                self.host.replace_main(&fragment);
                self.host.set_title(&fragment.title);
                self.host.mount(pending.route.view);
                self.mounted = Some(pending.route.view);
                self.host.scroll_to_top();
                info!(path = %path, view = %pending.route.view, title = %fragment.title, "view rendered");
                self.state = NavState::Rendered(path.clone());
                NavOutcome::Rendered {
                    path,
                    title: fragment.title,
                }
            }
            Err(error) => {
                warn!(path = %path, %error, "failed to load view");
                self.host.show_error(&self.config.error_notice);
                self.state = NavState::Error(path.clone());
                NavOutcome::Failed { path, error }
            }
        }
    }
}

/// Runs one navigation: begin, fetch, complete.
///
/// The lock is released while the fetch is pending, so a later navigation can
/// start and supersede this one.
pub async fn navigate<H, F>(
    router: &Mutex<Router<H>>,
    fetcher: &F,
    request: NavigationRequest,
) -> NavOutcome
where
    H: ContentHost + BrowserHistory,
    F: PageFetcher,
{
    let pending = router.lock().begin(request);
    let body = fetcher.fetch(pending.document()).await;
    router.lock().complete(pending, body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::{HeadlessDocument, HistoryOp};
    use std::collections::HashMap;

    const HOME: &str = r#"<html><head><title>Início</title></head><body>
        <main><section class="hero"><a id="hero-cta" href="/cadastro.html">Quero participar</a></section></main>
        </body></html>"#;
    const PROJECTS: &str = r#"<html><head><title>Projetos</title></head><body>
        <main><h1>Nossos projetos</h1></main></body></html>"#;
    const REGISTRATION: &str = r#"<html><head><title>Cadastro</title></head><body><main>
        <form id="formCadastro"><input id="cpf" required><span id="cpf-error"></span></form>
        </main></body></html>"#;

    struct StaticFetcher {
        pages: HashMap<&'static str, Result<String, FetchError>>,
    }

    impl StaticFetcher {
        fn site() -> Self {
            let pages = HashMap::from([
                ("/index.html", Ok(HOME.to_string())),
                ("/projetos.html", Ok(PROJECTS.to_string())),
                ("/cadastro.html", Ok(REGISTRATION.to_string())),
            ]);
            Self { pages }
        }

        fn with(mut self, document: &'static str, body: Result<String, FetchError>) -> Self {
            self.pages.insert(document, body);
            self
        }
    }

    impl PageFetcher for StaticFetcher {
        async fn fetch(&self, document: &str) -> Result<String, FetchError> {
            self.pages
                .get(document)
                .cloned()
                .unwrap_or(Err(FetchError::Status(404)))
        }
    }

    fn router() -> Mutex<Router<HeadlessDocument>> {
        let config = SiteConfig::default();
        let host = HeadlessDocument::new(config.clone(), "/");
        Mutex::new(Router::new(config, RouteTable::standard(), host).expect("router"))
    }

    fn base(path: &str) -> Url {
        Url::parse("http://localhost:8080")
            .unwrap()
            .join(path)
            .unwrap()
    }

    fn click(href: &str) -> LinkClick {
        LinkClick {
            href: Some(href.to_string()),
            ..LinkClick::default()
        }
    }

    #[test]
    fn route_table_matches_exact_paths() {
        let routes = RouteTable::standard();
        assert_eq!(routes.resolve("/").unwrap().document, "/index.html");
        assert_eq!(routes.resolve("/index.html").unwrap().view, View::Home);
        assert_eq!(routes.resolve("/projetos.html").unwrap().view, View::Projects);
        assert_eq!(routes.resolve("/cadastro.html").unwrap().view, View::Registration);
        assert!(routes.resolve("/sobre.html").is_none());
        assert_eq!(routes.home().path, "/");
    }

    #[test]
    fn link_resolution() {
        let here = base("/projetos.html");
        assert_eq!(
            resolve_link(&here, "cadastro.html"),
            LinkTarget::Internal {
                path: "/cadastro.html".into(),
                location: "/cadastro.html".into()
            }
        );
        assert_eq!(
            resolve_link(&here, "http://localhost:8080/index.html?x=1"),
            LinkTarget::Internal {
                path: "/index.html".into(),
                location: "/index.html?x=1".into()
            }
        );
        assert_eq!(resolve_link(&here, "https://github.com/portal"), LinkTarget::External);
        assert_eq!(resolve_link(&here, "http://localhost:9090/"), LinkTarget::External);
        assert_eq!(resolve_link(&here, "MAILTO:contato@portal.org"), LinkTarget::Mailto);
        assert_eq!(resolve_link(&here, "tel:+5511987654321"), LinkTarget::Tel);
        assert_eq!(resolve_link(&here, "#contato"), LinkTarget::Fragment);
        assert_eq!(resolve_link(&here, "/projetos.html#lista"), LinkTarget::Fragment);
        assert_eq!(resolve_link(&here, "javascript:void(0)"), LinkTarget::External);
        assert_eq!(resolve_link(&here, "  "), LinkTarget::Unresolvable);
    }

    #[test]
    fn click_policy() {
        let router = router();
        let router = router.lock();
        let here = base("/");

        let decision = router.handle_click(&here, &click("/projetos.html"), false);
        assert_eq!(
            decision.navigate,
            Some(NavigationRequest::new("/projetos.html", NavigationOrigin::Click))
        );
        assert!(!decision.close_menu);

        for href in ["https://example.com/", "mailto:a@b.com", "tel:11999999999", "/sobre.html"] {
            let decision = router.handle_click(&here, &click(href), true);
            assert_eq!(decision.navigate, None, "{href} must not be intercepted");
            assert!(decision.close_menu, "{href} still closes an open menu");
        }

        let new_tab = LinkClick {
            target: Some("_blank".into()),
            ..click("/cadastro.html")
        };
        assert_eq!(router.handle_click(&here, &new_tab, false).navigate, None);
        let ctrl = LinkClick {
            modified: true,
            ..click("/cadastro.html")
        };
        assert_eq!(router.handle_click(&here, &ctrl, false).navigate, None);
    }

    #[test]
    fn theme_toggle_clicks_keep_the_menu_open() {
        let router = router();
        let router = router.lock();
        let toggle = LinkClick {
            from_theme_toggle: true,
            ..LinkClick::default()
        };
        let decision = router.handle_click(&base("/"), &toggle, true);
        assert!(!decision.close_menu);
        assert_eq!(decision.navigate, None);
        let plain = router.handle_click(&base("/"), &LinkClick::default(), true);
        assert!(plain.close_menu);
    }

    #[tokio::test]
    async fn click_renders_fragment_title_and_pushes_history() {
        let router = router();
        let fetcher = StaticFetcher::site();
        let request = router.lock().initial("/");
        navigate(&router, &fetcher, request).await;
        router.lock().host_mut().scroll_to(480);

        let request = NavigationRequest::new("/projetos.html", NavigationOrigin::Click);
        let outcome = navigate(&router, &fetcher, request).await;
        assert_eq!(
            outcome,
            NavOutcome::Rendered {
                path: "/projetos.html".into(),
                title: "Projetos".into()
            }
        );

        let guard = router.lock();
        assert_eq!(guard.state(), &NavState::Rendered("/projetos.html".into()));
        assert_eq!(guard.mounted_view(), Some(View::Projects));
        let page = guard.host();
        assert_eq!(page.main_html(), "<h1>Nossos projetos</h1>");
        assert_eq!(page.title(), "Projetos");
        assert_eq!(page.location(), "/projetos.html");
        assert_eq!(
            page.history_log(),
            &[
                HistoryOp::Replace("/".into()),
                HistoryOp::Push("/projetos.html".into())
            ]
        );
        assert_eq!(page.scroll_y(), 0);
    }

    #[tokio::test]
    async fn unknown_initial_path_is_replaced_with_home() {
        let router = router();
        let fetcher = StaticFetcher::site();
        let request = router.lock().initial("/sobre.html");
        assert_eq!(request, NavigationRequest::new("/", NavigationOrigin::Initial));
        navigate(&router, &fetcher, request).await;

        let guard = router.lock();
        assert_eq!(guard.host().history_log(), &[HistoryOp::Replace("/".into())]);
        assert_eq!(guard.host().history_len(), 1);
        assert_eq!(guard.host().title(), "Início");
        assert_eq!(guard.mounted_view(), Some(View::Home));
    }

    #[tokio::test]
    async fn history_keeps_query_and_fragment() {
        let router = router();
        let fetcher = StaticFetcher::site();
        let request = router.lock().initial("/index.html?utm=folheto#sobre");
        assert_eq!(request.path, "/index.html");
        assert_eq!(request.location, "/index.html?utm=folheto#sobre");
        navigate(&router, &fetcher, request).await;

        let decision = router
            .lock()
            .handle_click(&base("/index.html"), &click("/projetos.html#lista"), false);
        let request = decision.navigate.unwrap();
        assert_eq!(request.path, "/projetos.html");
        navigate(&router, &fetcher, request).await;

        let guard = router.lock();
        assert_eq!(guard.host().title(), "Projetos");
        assert_eq!(
            guard.host().history_log(),
            &[
                HistoryOp::Replace("/index.html?utm=folheto#sobre".into()),
                HistoryOp::Push("/projetos.html#lista".into())
            ]
        );
        assert_eq!(guard.host().location(), "/projetos.html");
    }

    #[test]
    fn unknown_initial_path_drops_its_query() {
        let router = router();
        let request = router.lock().initial("/sobre.html?x=1");
        assert_eq!(request, NavigationRequest::new("/", NavigationOrigin::Initial));
        assert_eq!(
            router.lock().host().history_log(),
            &[HistoryOp::Replace("/".into())]
        );
    }

    #[tokio::test]
    async fn back_restores_previous_content() {
        let router = router();
        let fetcher = StaticFetcher::site();
        let request = router.lock().initial("/projetos.html");
        navigate(&router, &fetcher, request).await;
        let request = NavigationRequest::new("/cadastro.html", NavigationOrigin::Click);
        navigate(&router, &fetcher, request).await;
        assert_eq!(router.lock().host().title(), "Cadastro");

        let popped = router.lock().host_mut().back();
        let request = router.lock().handle_popstate(popped);
        assert_eq!(request.origin, NavigationOrigin::PopState);
        navigate(&router, &fetcher, request).await;

        let guard = router.lock();
        assert_eq!(guard.host().title(), "Projetos");
        assert_eq!(guard.host().main_html(), "<h1>Nossos projetos</h1>");
        assert_eq!(guard.host().history_len(), 2, "popstate must not push");
        assert_eq!(guard.mounted_view(), Some(View::Projects));
    }

    #[test]
    fn popstate_without_state_loads_home() {
        let router = router();
        let router = router.lock();
        assert_eq!(router.handle_popstate(None).path, "/");
        assert_eq!(
            router.handle_popstate(Some(HistoryEntry::new("/removida.html"))).path,
            "/"
        );
    }

    #[test]
    fn stale_completion_is_discarded() {
        let router = router();
        let mut router = router.lock();
        let slow = router.begin(NavigationRequest::new("/projetos.html", NavigationOrigin::Click));
        let fast = router.begin(NavigationRequest::new("/cadastro.html", NavigationOrigin::Click));
        assert!(fast.token() > slow.token());

        let outcome = router.complete(fast, Ok(REGISTRATION.to_string()));
        assert!(matches!(outcome, NavOutcome::Rendered { .. }));
        let outcome = router.complete(slow, Ok(PROJECTS.to_string()));
        assert_eq!(
            outcome,
            NavOutcome::Superseded {
                path: "/projetos.html".into()
            }
        );
        assert_eq!(router.host().title(), "Cadastro");
        assert_eq!(router.state(), &NavState::Rendered("/cadastro.html".into()));
        assert_eq!(router.mounted_view(), Some(View::Registration));
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(std::sync::Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for CapturedLogs {
        type Writer = CapturedLogs;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[test]
    fn load_failures_are_logged_as_warnings() {
        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_ansi(false)
            .finish();
        tracing::subscriber::with_default(subscriber, || {
            let router = router();
            let mut router = router.lock();
            let pending =
                router.begin(NavigationRequest::new("/projetos.html", NavigationOrigin::Click));
            router.complete(pending, Err(FetchError::Network("offline".into())));
        });

        let output = String::from_utf8(logs.0.lock().clone()).unwrap();
        let line = output
            .lines()
            .find(|line| line.contains("failed to load view"))
            .expect("failure logged");
        assert!(line.contains("WARN"));
        assert!(line.contains("/projetos.html"));
    }

    #[tokio::test]
    async fn fetch_failure_shows_notice_and_keeps_title() {
        let router = router();
        let fetcher = StaticFetcher::site()
            .with("/projetos.html", Err(FetchError::Network("offline".into())))
            .with("/cadastro.html", Ok("<html><body><p>sem main</p></body></html>".into()));
        let request = router.lock().initial("/");
        navigate(&router, &fetcher, request).await;

        let request = NavigationRequest::new("/projetos.html", NavigationOrigin::Click);
        let outcome = navigate(&router, &fetcher, request).await;
        assert!(matches!(
            outcome,
            NavOutcome::Failed {
                error: LoadError::Fetch(FetchError::Network(_)),
                ..
            }
        ));
        {
            let guard = router.lock();
            assert_eq!(guard.state(), &NavState::Error("/projetos.html".into()));
            assert_eq!(guard.host().title(), "Início");
            assert_eq!(guard.host().error_notice(), Some(SiteConfig::default().error_notice.as_str()));
            assert_eq!(guard.mounted_view(), None);
        }

        let request = NavigationRequest::new("/cadastro.html", NavigationOrigin::Click);
        let outcome = navigate(&router, &fetcher, request).await;
        assert!(matches!(
            outcome,
            NavOutcome::Failed {
                error: LoadError::MissingMain,
                ..
            }
        ));

        // The router stays usable.
        let request = NavigationRequest::new("/index.html", NavigationOrigin::Click);
        let outcome = navigate(&router, &fetcher, request).await;
        assert!(matches!(outcome, NavOutcome::Rendered { .. }));
        assert_eq!(router.lock().host().error_notice(), None);
    }

    #[tokio::test]
    async fn swaps_remount_view_behavior() {
        let router = router();
        let fetcher = StaticFetcher::site();
        let request = router.lock().initial("/");
        navigate(&router, &fetcher, request).await;
        assert!(router.lock().host().cta_bound());

        let request = NavigationRequest::new("/cadastro.html", NavigationOrigin::Click);
        navigate(&router, &fetcher, request).await;
        {
            let guard = router.lock();
            assert!(!guard.host().cta_bound());
            assert!(guard.host().form().is_some());
        }

        let request = NavigationRequest::new("/", NavigationOrigin::Click);
        navigate(&router, &fetcher, request).await;
        let guard = router.lock();
        assert!(guard.host().form().is_none());
        assert!(guard.host().cta_bound());
        assert_eq!(guard.host().cta_href(), Some("/cadastro.html"));
    }

    #[test]
    fn history_entry_json() {
        let entry = HistoryEntry::new("/cadastro.html");
        assert_eq!(entry.to_json(), r#"{"path":"/cadastro.html"}"#);
        assert_eq!(HistoryEntry::from_json(&entry.to_json()), Some(entry));
        assert_eq!(HistoryEntry::from_json("null"), None);
    }
}
