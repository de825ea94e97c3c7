//! In-memory page used to drive the router and form bindings without a browser.
//!
//! It keeps the main-content markup, title, scroll offset and session history,
//! and records listeners the way the DOM would, so a duplicated binding shows
//! up as a duplicated reaction.

use crate::config::SiteConfig;
use crate::form::{FieldStatus, FormController, FormHost, SubmitOutcome};
use crate::fragment::PageFragment;
use crate::router::{BrowserHistory, ContentHost, HistoryEntry, View};
use crate::validation::FieldId;
use scraper::{Html, Selector};

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum DomEvent {
    Input,
    Blur,
    Submit,
    Click,
}

#[derive(Debug, Clone, Eq, PartialEq)]
struct Listener {
    target: String,
    event: DomEvent,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum HistoryOp {
    Push(String),
    Replace(String),
}

#[derive(Debug)]
pub struct HeadlessDocument {
    config: SiteConfig,
    main_html: String,
    title: String,
    error_notice: Option<String>,
    scroll_y: u32,
    entries: Vec<HistoryEntry>,
    cursor: usize,
    log: Vec<HistoryOp>,
    listeners: Vec<Listener>,
    form: Option<FormController>,
    cta_href: Option<String>,
    alerts: Vec<String>,
    focused: Option<FieldId>,
}

impl HeadlessDocument {
    pub fn new(config: SiteConfig, location: &str) -> Self {
        let title = config.default_title.clone();
        Self {
            config,
            main_html: String::new(),
            title,
            error_notice: None,
            scroll_y: 0,
            entries: vec![HistoryEntry::new(location)],
            cursor: 0,
            log: Vec::new(),
            listeners: Vec::new(),
            form: None,
            cta_href: None,
            alerts: Vec::new(),
            focused: None,
        }
    }

    pub fn main_html(&self) -> &str {
        &self.main_html
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn error_notice(&self) -> Option<&str> {
        self.error_notice.as_deref()
    }

    pub fn scroll_y(&self) -> u32 {
        self.scroll_y
    }

    pub fn scroll_to(&mut self, y: u32) {
        self.scroll_y = y;
    }

    pub fn location(&self) -> &str {
        &self.entries[self.cursor].path
    }

    pub fn history_len(&self) -> usize {
        self.entries.len()
    }

    pub fn history_log(&self) -> &[HistoryOp] {
        &self.log
    }

    /// Moves one entry back and returns the state the `popstate` carries.
    pub fn back(&mut self) -> Option<HistoryEntry> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        Some(self.entries[self.cursor].clone())
    }

    pub fn forward(&mut self) -> Option<HistoryEntry> {
        if self.cursor + 1 >= self.entries.len() {
            return None;
        }
        self.cursor += 1;
        Some(self.entries[self.cursor].clone())
    }

    pub fn form(&self) -> Option<&FormController> {
        self.form.as_ref()
    }

    pub fn cta_bound(&self) -> bool {
        self.cta_href.is_some()
    }

    pub fn cta_href(&self) -> Option<&str> {
        self.cta_href.as_deref()
    }

    pub fn alerts(&self) -> &[String] {
        &self.alerts
    }

    pub fn focused(&self) -> Option<FieldId> {
        self.focused
    }

    /// Text currently shown in the field's `<field>-error` element.
    pub fn error_text(&self, field: FieldId) -> Option<&str> {
        self.form
            .as_ref()
            .and_then(|form| form.field(field))
            .map(|field| field.status().message())
    }

    pub fn listener_count(&self, target: &str, event: DomEvent) -> usize {
        self.listeners
            .iter()
            .filter(|l| l.target == target && l.event == event)
            .count()
    }

    pub fn type_into(&mut self, field: FieldId, raw: &str) {
        for _ in 0..self.listener_count(field.as_str(), DomEvent::Input) {
            if let Some(form) = self.form.as_mut() {
                form.input(field, raw);
            }
        }
    }

    pub fn blur(&mut self, field: FieldId) {
        for _ in 0..self.listener_count(field.as_str(), DomEvent::Blur) {
            if let Some(form) = self.form.as_mut() {
                form.blur(field);
            }
        }
    }

    /// Submits the bound form, once per registered submit listener.
    pub fn submit(&mut self) -> Option<SubmitOutcome> {
        let form_id = self.form.as_ref()?.form_id().to_string();
        let mut last = None;
        for _ in 0..self.listener_count(&form_id, DomEvent::Submit) {
            let Some(form) = self.form.as_mut() else {
                break;
            };
            let outcome = form.submit();
            if let SubmitOutcome::Rejected { first_invalid, .. } = &outcome {
                self.focused = Some(*first_invalid);
            }
            self.alerts.push(outcome.acknowledgment().to_string());
            last = Some(outcome);
        }
        last
    }

    /// Every field's indicator is back to neutral.
    pub fn indicators_cleared(&self) -> bool {
        self.form.as_ref().is_some_and(|form| {
            form.fields()
                .iter()
                .all(|field| *field.status() == FieldStatus::Pristine)
        })
    }

    fn listen(&mut self, target: &str, event: DomEvent) {
        self.listeners.push(Listener {
            target: target.to_string(),
            event,
        });
    }

    fn unlisten(&mut self, target: &str) {
        self.listeners.retain(|l| l.target != target);
    }

    fn find_cta(&self) -> Option<String> {
        let selector = Selector::parse(&format!("a[id=\"{}\"]", self.config.cta_id)).ok()?;
        let content = Html::parse_fragment(&self.main_html);
        let cta = content.select(&selector).next()?;
        Some(cta.value().attr("href").unwrap_or_default().to_string())
    }
}

impl FormHost for HeadlessDocument {
    fn setup_form(&mut self, form_id: &str) -> bool {
        if self.listener_count(form_id, DomEvent::Submit) > 0 {
            return false;
        }
        let Some(form) = FormController::from_markup(&self.main_html, form_id) else {
            return false;
        };
        for field in form.fields() {
            for event in [DomEvent::Input, DomEvent::Blur] {
                self.listen(field.id().as_str(), event);
            }
        }
        self.listen(form_id, DomEvent::Submit);
        self.form = Some(form);
        true
    }
}

impl ContentHost for HeadlessDocument {
    fn replace_main(&mut self, fragment: &PageFragment) {
        self.main_html = fragment.main_html.clone();
        self.error_notice = None;
    }

    fn show_error(&mut self, notice: &str) {
        self.main_html = format!(r#"<div class="load-error" role="alert"><p>{notice}</p></div>"#);
        self.error_notice = Some(notice.to_string());
    }

    fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
    }

    fn scroll_to_top(&mut self) {
        self.scroll_y = 0;
    }

    fn mount(&mut self, view: View) {
        match view {
            View::Registration => {
                let form_id = self.config.form_id.clone();
                self.setup_form(&form_id);
            }
            View::Home => {
                self.cta_href = self.find_cta();
                if self.cta_href.is_some() {
                    let cta_id = self.config.cta_id.clone();
                    self.listen(&cta_id, DomEvent::Click);
                }
            }
            View::Projects => {}
        }
    }

    fn unmount(&mut self, view: View) {
        match view {
            View::Registration => {
                if let Some(form) = self.form.take() {
                    for field in form.fields() {
                        self.unlisten(field.id().as_str());
                    }
                    self.unlisten(form.form_id());
                }
                self.focused = None;
            }
            View::Home => {
                let cta_id = self.config.cta_id.clone();
                self.unlisten(&cta_id);
                self.cta_href = None;
            }
            View::Projects => {}
        }
    }
}

impl BrowserHistory for HeadlessDocument {
    fn push(&mut self, entry: &HistoryEntry, url: &str) {
        self.entries.truncate(self.cursor + 1);
        self.entries.push(entry.clone());
        self.cursor = self.entries.len() - 1;
        self.log.push(HistoryOp::Push(url.to_string()));
    }

    fn replace(&mut self, entry: &HistoryEntry, url: &str) {
        self.entries[self.cursor] = entry.clone();
        self.log.push(HistoryOp::Replace(url.to_string()));
    }
}
