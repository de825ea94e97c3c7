//! DOM bindings compiled to WebAssembly.
//!
//! [`start`] runs once the document is parsed. It wires the hamburger menu,
//! the theme switcher and the SPA router to the live page. [`DomHost`] is the
//! browser implementation of the router's host seams.

use std::cell::RefCell;
use std::rc::Rc;

use gloo::events::{EventListener, EventListenerOptions};
use gloo::net::http::Request;
use parking_lot::Mutex;
use url::Url;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{
    Document, Element, Event, HtmlElement, HtmlFormElement, HtmlInputElement, HtmlSelectElement,
    HtmlTextAreaElement, MouseEvent, PopStateEvent, Storage, Window,
};

use crate::config::SiteConfig;
use crate::form::{FieldStatus, FormController, FormHost, SubmitOutcome};
use crate::fragment::{FetchError, PageFragment};
use crate::nav::NavMenu;
use crate::router::{
    self, BrowserHistory, ContentHost, HistoryEntry, LinkClick, NavigationRequest, PageFetcher,
    RouteTable, Router, View,
};
use crate::theme::{Theme, ThemeStore, ThemeSwitcher};
use crate::validation::FieldId;
use tracing::warn;

/// Marks a form whose listeners are already attached.
const BOUND_ATTR: &str = "data-validation-bound";

thread_local! {
    static APP: RefCell<Option<Rc<App>>> = const { RefCell::new(None) };
}

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    tracing_wasm::set_as_global_default();
    let Some(document) = web_sys::window().and_then(|window| window.document()) else {
        return;
    };
    if document.ready_state() == "loading" {
        EventListener::once(&document, "DOMContentLoaded", |_| boot()).forget();
    } else {
        boot();
    }
}

fn boot() {
    if let Err(err) = App::install(SiteConfig::default()) {
        warn!(error = ?err, "startup failed");
    }
}

fn current_app() -> Option<Rc<App>> {
    APP.with(|app| app.borrow().clone())
}

struct App {
    config: SiteConfig,
    window: Window,
    document: Document,
    router: Mutex<Router<DomHost>>,
    menu: RefCell<NavMenu>,
    theme: RefCell<ThemeSwitcher<LocalStore>>,
    fetcher: WindowFetcher,
    listeners: RefCell<Vec<EventListener>>,
}

impl App {
    fn install(config: SiteConfig) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;
        let main = document
            .query_selector(&config.main_selector)?
            .ok_or("main content area missing")?;

        let host = DomHost {
            config: config.clone(),
            window: window.clone(),
            document: document.clone(),
            main,
            view_listeners: Vec::new(),
        };
        let router = Router::new(config.clone(), RouteTable::standard(), host)
            .map_err(|err| JsValue::from_str(&err.to_string()))?;
        let store = LocalStore(window.local_storage().ok().flatten());
        let app = Rc::new(App {
            menu: RefCell::new(NavMenu::new(config.nav_breakpoint)),
            theme: RefCell::new(ThemeSwitcher::new(store, config.theme_key.clone())),
            router: Mutex::new(router),
            fetcher: WindowFetcher,
            listeners: RefCell::new(Vec::new()),
            config,
            window,
            document,
        });
        APP.with(|slot| *slot.borrow_mut() = Some(app.clone()));

        app.init_theme();
        app.bind_menu();
        app.bind_theme_toggle();
        app.bind_navigation();

        let location = app.window.location();
        let current = format!(
            "{}{}{}",
            location.pathname()?,
            location.search()?,
            location.hash()?
        );
        let request = app.router.lock().initial(&current);
        app.clone().navigate(request);
        Ok(())
    }

    fn navigate(self: Rc<Self>, request: NavigationRequest) {
        spawn_local(async move {
            router::navigate(&self.router, &self.fetcher, request).await;
        });
    }

    fn keep(&self, listener: EventListener) {
        self.listeners.borrow_mut().push(listener);
    }

    fn by_id(&self, id: &str) -> Option<Element> {
        self.document.get_element_by_id(id)
    }

    fn init_theme(&self) {
        let theme = self.theme.borrow_mut().init();
        self.render_theme(theme);
    }

    fn render_theme(&self, theme: Theme) {
        if let Some(root) = self.document.document_element() {
            let _ = root.set_attribute("data-theme", theme.as_str());
        }
        if let Some(icon) = self.by_id(&self.config.theme_icon_id) {
            icon.set_text_content(Some(theme.icon()));
        }
    }

    fn bind_theme_toggle(self: &Rc<Self>) {
        let Some(toggle) = self.by_id(&self.config.theme_toggle_id) else {
            return;
        };
        let app = Rc::clone(self);
        self.keep(EventListener::new(&toggle, "click", move |_| {
            let theme = app.theme.borrow_mut().toggle();
            app.render_theme(theme);
        }));
    }

    fn render_menu(&self) {
        let menu = *self.menu.borrow();
        if let Some(nav) = self.by_id(&self.config.nav_menu_id) {
            let _ = nav.class_list().toggle_with_force("active", menu.is_open());
        }
        if let Some(toggle) = self.by_id(&self.config.menu_toggle_id) {
            let _ = toggle.class_list().toggle_with_force("active", menu.is_open());
            let _ = toggle.set_attribute("aria-expanded", menu.aria_expanded());
        }
    }

    fn bind_menu(self: &Rc<Self>) {
        if let Some(toggle) = self.by_id(&self.config.menu_toggle_id) {
            let app = Rc::clone(self);
            self.keep(EventListener::new(&toggle, "click", move |_| {
                app.menu.borrow_mut().toggle();
                app.render_menu();
            }));
        }

        let app = Rc::clone(self);
        self.keep(EventListener::new(&self.window, "resize", move |_| {
            let width = app
                .window
                .inner_width()
                .ok()
                .and_then(|width| width.as_f64())
                .unwrap_or_default();
            if app.menu.borrow_mut().on_resize(width as u32) {
                app.render_menu();
            }
        }));
    }

    fn bind_navigation(self: &Rc<Self>) {
        let app = Rc::clone(self);
        self.keep(EventListener::new_with_options(
            &self.document,
            "click",
            EventListenerOptions::enable_prevent_default(),
            move |event| app.on_document_click(event),
        ));

        let app = Rc::clone(self);
        self.keep(EventListener::new(&self.window, "popstate", move |event| {
            let state = event
                .dyn_ref::<PopStateEvent>()
                .and_then(|event| event.state().as_string())
                .and_then(|raw| HistoryEntry::from_json(&raw));
            let request = app.router.lock().handle_popstate(state);
            Rc::clone(&app).navigate(request);
        }));
    }

    fn on_document_click(self: &Rc<Self>, event: &Event) {
        let Some(origin) = event.target().and_then(|t| t.dyn_into::<Element>().ok()) else {
            return;
        };
        let click = self.describe_click(&origin, event);
        let Some(base) = self.base_url() else {
            return;
        };

        let menu_open = self.menu.borrow().is_open();
        let decision = self.router.lock().handle_click(&base, &click, menu_open);
        if decision.close_menu {
            self.menu.borrow_mut().close();
            self.render_menu();
        }
        if event.default_prevented() {
            return;
        }
        if let Some(request) = decision.navigate {
            event.prevent_default();
            Rc::clone(self).navigate(request);
        }
    }

    fn base_url(&self) -> Option<Url> {
        let href = self.window.location().href().ok()?;
        Url::parse(&href).ok()
    }

    fn describe_click(&self, origin: &Element, event: &Event) -> LinkClick {
        let within = |id: &str| {
            origin
                .closest(&format!("[id=\"{id}\"]"))
                .ok()
                .flatten()
                .is_some()
        };
        let mut click = LinkClick {
            from_theme_toggle: within(&self.config.theme_toggle_id),
            from_menu_toggle: within(&self.config.menu_toggle_id),
            ..LinkClick::default()
        };
        if let Some(mouse) = event.dyn_ref::<MouseEvent>() {
            click.button = mouse.button();
            click.modified =
                mouse.ctrl_key() || mouse.meta_key() || mouse.shift_key() || mouse.alt_key();
        }
        if let Some(anchor) = origin.closest("a[href]").ok().flatten() {
            click.href = anchor.get_attribute("href");
            click.target = anchor.get_attribute("target");
            click.download = anchor.has_attribute("download");
        }
        click
    }
}

/// The live page as the router sees it.
pub struct DomHost {
    config: SiteConfig,
    window: Window,
    document: Document,
    main: Element,
    view_listeners: Vec<EventListener>,
}

impl DomHost {
    fn history_state(&self, entry: &HistoryEntry, url: &str, push: bool) {
        let Ok(history) = self.window.history() else {
            return;
        };
        let state = JsValue::from_str(&entry.to_json());
        let result = if push {
            history.push_state_with_url(&state, "", Some(url))
        } else {
            history.replace_state_with_url(&state, "", Some(url))
        };
        if let Err(err) = result {
            warn!(url, error = ?err, "history update failed");
        }
    }

    fn bind_cta(&mut self) {
        let Some(cta) = self.document.get_element_by_id(&self.config.cta_id) else {
            return;
        };
        let options = EventListenerOptions::enable_prevent_default();
        self.view_listeners.push(EventListener::new_with_options(
            &cta,
            "click",
            options,
            move |event| {
                let Some(app) = current_app() else {
                    return;
                };
                let Some(anchor) = event.current_target().and_then(|t| t.dyn_into::<Element>().ok())
                else {
                    return;
                };
                let click = app.describe_click(&anchor, event);
                let Some(base) = app.base_url() else {
                    return;
                };
                let decision = app.router.lock().handle_click(&base, &click, false);
                if let Some(request) = decision.navigate {
                    event.prevent_default();
                    app.navigate(request);
                }
            },
        ));
    }
}

impl FormHost for DomHost {
    // The bound marker lives on the form element, so it disappears with the
    // markup on the next swap. `HeadlessDocument` models the same guard by
    // counting submit listeners on the form id.
    fn setup_form(&mut self, form_id: &str) -> bool {
        let Some(form) = self.document.get_element_by_id(form_id) else {
            return false;
        };
        if form.has_attribute(BOUND_ATTR) {
            return false;
        }
        let Some(controller) = FormController::from_markup(&form.outer_html(), form_id) else {
            return false;
        };
        let _ = form.set_attribute(BOUND_ATTR, "");

        let fields: Vec<FieldId> = controller.fields().iter().map(|field| field.id()).collect();
        let controller = Rc::new(RefCell::new(controller));

        for id in fields {
            let Some(control) = self.document.get_element_by_id(id.as_str()) else {
                continue;
            };

            let state = Rc::clone(&controller);
            let document = self.document.clone();
            self.view_listeners.push(EventListener::new(&control, "input", move |event| {
                let Some(control) = event.target().and_then(|t| t.dyn_into::<Element>().ok())
                else {
                    return;
                };
                let raw = control_value(&control);
                let mut form = state.borrow_mut();
                if let Some(field) = form.input(id, &raw) {
                    if field.value() != raw {
                        set_control_value(&control, field.value());
                    }
                    render_field(&document, id, field.status());
                }
            }));

            let state = Rc::clone(&controller);
            let document = self.document.clone();
            self.view_listeners.push(EventListener::new(&control, "blur", move |_| {
                let mut form = state.borrow_mut();
                if let Some(status) = form.blur(id) {
                    render_field(&document, id, status);
                }
            }));
        }

        let state = Rc::clone(&controller);
        let document = self.document.clone();
        let options = EventListenerOptions::enable_prevent_default();
        self.view_listeners.push(EventListener::new_with_options(
            &form,
            "submit",
            options,
            move |event| {
                event.prevent_default();
                let outcome = {
                    let mut form = state.borrow_mut();
                    let outcome = form.submit();
                    if let SubmitOutcome::Rejected { .. } = outcome {
                        for field in form.fields() {
                            render_field(&document, field.id(), field.status());
                        }
                    }
                    outcome
                };
                match &outcome {
                    SubmitOutcome::Rejected { first_invalid, .. } => {
                        gloo::dialogs::alert(outcome.acknowledgment());
                        if let Some(control) = document
                            .get_element_by_id(first_invalid.as_str())
                            .and_then(|el| el.dyn_into::<HtmlElement>().ok())
                        {
                            let _ = control.focus();
                        }
                    }
                    SubmitOutcome::Accepted => {
                        gloo::dialogs::alert(outcome.acknowledgment());
                        if let Some(form) = event
                            .target()
                            .and_then(|t| t.dyn_into::<HtmlFormElement>().ok())
                        {
                            form.reset();
                        }
                        for field in state.borrow().fields() {
                            render_field(&document, field.id(), &FieldStatus::Pristine);
                        }
                    }
                }
            },
        ));
        true
    }
}

impl ContentHost for DomHost {
    fn replace_main(&mut self, fragment: &PageFragment) {
        self.main.set_inner_html(&fragment.main_html);
    }

    fn show_error(&mut self, notice: &str) {
        self.main.set_inner_html("");
        let Ok(wrapper) = self.document.create_element("div") else {
            return;
        };
        wrapper.set_class_name("load-error");
        let _ = wrapper.set_attribute("role", "alert");
        if let Ok(paragraph) = self.document.create_element("p") {
            paragraph.set_text_content(Some(notice));
            let _ = wrapper.append_child(&paragraph);
        }
        let _ = self.main.append_child(&wrapper);
    }

    fn set_title(&mut self, title: &str) {
        self.document.set_title(title);
    }

    fn scroll_to_top(&mut self) {
        self.window.scroll_to_with_x_and_y(0.0, 0.0);
    }

    fn mount(&mut self, view: View) {
        match view {
            View::Registration => {
                let form_id = self.config.form_id.clone();
                self.setup_form(&form_id);
            }
            View::Home => self.bind_cta(),
            View::Projects => {}
        }
    }

    fn unmount(&mut self, _view: View) {
        self.view_listeners.clear();
    }
}

impl BrowserHistory for DomHost {
    fn push(&mut self, entry: &HistoryEntry, url: &str) {
        self.history_state(entry, url, true);
    }

    fn replace(&mut self, entry: &HistoryEntry, url: &str) {
        self.history_state(entry, url, false);
    }
}

fn control_value(control: &Element) -> String {
    if let Some(input) = control.dyn_ref::<HtmlInputElement>() {
        input.value()
    } else if let Some(select) = control.dyn_ref::<HtmlSelectElement>() {
        select.value()
    } else if let Some(area) = control.dyn_ref::<HtmlTextAreaElement>() {
        area.value()
    } else {
        String::new()
    }
}

fn set_control_value(control: &Element, value: &str) {
    if let Some(input) = control.dyn_ref::<HtmlInputElement>() {
        input.set_value(value);
    } else if let Some(area) = control.dyn_ref::<HtmlTextAreaElement>() {
        area.set_value(value);
    }
}

fn render_field(document: &Document, id: FieldId, status: &FieldStatus) {
    if let Some(control) = document.get_element_by_id(id.as_str()) {
        let classes = control.class_list();
        let _ = classes.remove_2("success", "error");
        if let Some(class) = status.css_class() {
            let _ = classes.add_1(class);
        }
        let _ = control.set_attribute("aria-invalid", if status.is_invalid() { "true" } else { "false" });
    }
    if let Some(error) = document.get_element_by_id(&id.error_element_id()) {
        error.set_text_content(Some(status.message()));
    }
}

/// `localStorage`, when the browser grants it.
pub struct LocalStore(Option<Storage>);

impl ThemeStore for LocalStore {
    fn load(&self, key: &str) -> Option<String> {
        self.0.as_ref()?.get_item(key).ok().flatten()
    }

    fn save(&mut self, key: &str, value: &str) {
        if let Some(storage) = &self.0 {
            if let Err(err) = storage.set_item(key, value) {
                warn!(key, error = ?err, "could not persist theme");
            }
        }
    }
}

/// Same-origin `fetch` through the window.
pub struct WindowFetcher;

impl PageFetcher for WindowFetcher {
    async fn fetch(&self, document: &str) -> Result<String, FetchError> {
        let response = Request::get(document).send().await.map_err(|err| {
            warn!(document, %err, "fetch rejected");
            FetchError::Network(err.to_string())
        })?;
        if !response.ok() {
            warn!(document, status = response.status(), "fetch answered with an error status");
            return Err(FetchError::Status(response.status()));
        }
        response
            .text()
            .await
            .map_err(|err| FetchError::Network(err.to_string()))
    }
}
