//! Extraction of the swappable main-content fragment from a fetched page.

use crate::config::ConfigError;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use std::fmt;

static TITLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("title").expect("valid title selector"));

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct PageFragment {
    pub title: String,
    /// Inner HTML of the main-content element.
    pub main_html: String,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum FetchError {
    Network(String),
    Status(u16),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Network(reason) => write!(f, "network error: {reason}"),
            FetchError::Status(code) => write!(f, "unexpected HTTP status {code}"),
        }
    }
}

impl std::error::Error for FetchError {}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum LoadError {
    Fetch(FetchError),
    MissingMain,
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Fetch(err) => write!(f, "{err}"),
            LoadError::MissingMain => write!(f, "page has no main-content element"),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Fetch(err) => Some(err),
            LoadError::MissingMain => None,
        }
    }
}

impl From<FetchError> for LoadError {
    fn from(value: FetchError) -> Self {
        LoadError::Fetch(value)
    }
}

/// Compiled main-content selector.
#[derive(Debug, Clone)]
pub struct FragmentSelector {
    main: Selector,
}

impl FragmentSelector {
    pub fn parse(selector: &str) -> Result<Self, ConfigError> {
        let main =
            Selector::parse(selector).map_err(|_| ConfigError::Selector(selector.to_string()))?;
        Ok(Self { main })
    }

    /// Pulls the first main-content element and the title out of `html`.
    ///
    /// A missing or blank `<title>` yields `default_title`.
    pub fn extract(&self, html: &str, default_title: &str) -> Result<PageFragment, LoadError> {
        let document = Html::parse_document(html);
        let main = document
            .select(&self.main)
            .next()
            .ok_or(LoadError::MissingMain)?;
        let title = document
            .select(&TITLE_SELECTOR)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .filter(|title| !title.is_empty())
            .unwrap_or_else(|| default_title.to_string());
        Ok(PageFragment {
            title,
            main_html: main.inner_html(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selector() -> FragmentSelector {
        FragmentSelector::parse("main").expect("selector")
    }

    #[test]
    fn extracts_main_children_and_title() {
        let html = r#"<!DOCTYPE html><html><head><title> Projetos </title></head>
            <body><header>menu</header><main><h1>Projetos</h1><p>Horta</p></main></body></html>"#;
        let fragment = selector().extract(html, "Padrão").expect("fragment");
        assert_eq!(fragment.title, "Projetos");
        assert_eq!(fragment.main_html, "<h1>Projetos</h1><p>Horta</p>");
    }

    #[test]
    fn missing_main_is_an_error() {
        let html = "<html><head><title>x</title></head><body><div>sem main</div></body></html>";
        assert_eq!(selector().extract(html, "Padrão"), Err(LoadError::MissingMain));
    }

    #[test]
    fn missing_or_blank_title_falls_back() {
        let untitled = "<html><body><main><p>oi</p></main></body></html>";
        assert_eq!(selector().extract(untitled, "Padrão").unwrap().title, "Padrão");
        let blank = "<html><head><title>  </title></head><body><main></main></body></html>";
        assert_eq!(selector().extract(blank, "Padrão").unwrap().title, "Padrão");
    }

    #[test]
    fn custom_selector() {
        let sel = FragmentSelector::parse("#conteudo").expect("selector");
        let html = r#"<html><body><main>fora</main><section id="conteudo"><b>dentro</b></section></body></html>"#;
        assert_eq!(sel.extract(html, "t").unwrap().main_html, "<b>dentro</b>");
    }

    #[test]
    fn bad_selector_is_a_config_error() {
        assert!(matches!(
            FragmentSelector::parse("main[["),
            Err(ConfigError::Selector(_))
        ));
    }
}
