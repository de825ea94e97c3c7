//! The site's documents: home, projects and registration.
//!
//! Every page shares the same header (menu and theme controls) and footer;
//! only the `<main>` content differs, which is what the SPA loader swaps.

use crate::config::SiteConfig;
use crate::router::View;
use askama::Template;
use chrono::{Local, NaiveDate};

const SITE_NAME: &str = "Portal Solidário";

#[derive(Debug, Clone, Copy)]
struct NavLink {
    href: &'static str,
    label: &'static str,
}

const NAV_LINKS: [NavLink; 3] = [
    NavLink {
        href: "/",
        label: "Início",
    },
    NavLink {
        href: "/projetos.html",
        label: "Projetos",
    },
    NavLink {
        href: "/cadastro.html",
        label: "Cadastro",
    },
];

#[derive(Debug, Clone, Copy)]
struct Project {
    title: &'static str,
    area: &'static str,
    summary: &'static str,
}

const PROJECTS: [Project; 4] = [
    Project {
        title: "Horta Comunitária",
        area: "Meio ambiente",
        summary: "Canteiros coletivos em terrenos cedidos pela prefeitura, com oficinas semanais de cultivo orgânico.",
    },
    Project {
        title: "Reforço Escolar",
        area: "Educação",
        summary: "Aulas de apoio em português e matemática para estudantes do ensino fundamental da rede pública.",
    },
    Project {
        title: "Cozinha Solidária",
        area: "Segurança alimentar",
        summary: "Preparo e distribuição de refeições com alimentos doados por feiras e produtores locais.",
    },
    Project {
        title: "Inclusão Digital",
        area: "Tecnologia",
        summary: "Computadores recondicionados e cursos básicos de informática para adultos e idosos.",
    },
];

const ESTADOS: [(&str, &str); 27] = [
    ("AC", "Acre"),
    ("AL", "Alagoas"),
    ("AP", "Amapá"),
    ("AM", "Amazonas"),
    ("BA", "Bahia"),
    ("CE", "Ceará"),
    ("DF", "Distrito Federal"),
    ("ES", "Espírito Santo"),
    ("GO", "Goiás"),
    ("MA", "Maranhão"),
    ("MT", "Mato Grosso"),
    ("MS", "Mato Grosso do Sul"),
    ("MG", "Minas Gerais"),
    ("PA", "Pará"),
    ("PB", "Paraíba"),
    ("PR", "Paraná"),
    ("PE", "Pernambuco"),
    ("PI", "Piauí"),
    ("RJ", "Rio de Janeiro"),
    ("RN", "Rio Grande do Norte"),
    ("RS", "Rio Grande do Sul"),
    ("RO", "Rondônia"),
    ("RR", "Roraima"),
    ("SC", "Santa Catarina"),
    ("SP", "São Paulo"),
    ("SE", "Sergipe"),
    ("TO", "Tocantins"),
];

const PERFIS: [(&str, &str); 3] = [
    ("voluntario", "Voluntário"),
    ("doador", "Doador"),
    ("parceiro", "Empresa parceira"),
];

#[derive(Template)]
#[template(
    source = r#"<!DOCTYPE html>
<html lang="pt-BR" data-theme="light">
  <head>
    <meta charset="utf-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1" />
    <title>{{ title }}</title>
    <link rel="stylesheet" href="/assets/css/style.css" />
  </head>
  <body>
    <header class="site-header">
      <a class="brand" href="/">{{ site_name }}</a>
      <button id="{{ config.menu_toggle_id }}" class="menu-toggle" type="button" aria-controls="{{ config.nav_menu_id }}" aria-expanded="false" aria-label="Abrir menu">☰</button>
      <nav id="{{ config.nav_menu_id }}" class="nav-menu">
        <ul>
          {% for link in nav %}
          <li><a href="{{ link.href|safe }}">{{ link.label }}</a></li>
          {% endfor %}
        </ul>
      </nav>
      <button id="{{ config.theme_toggle_id }}" class="theme-toggle" type="button" aria-label="Alternar tema"><span id="{{ config.theme_icon_id }}">🌙</span></button>
    </header>
    <main id="conteudo">
{{ content|safe }}
    </main>
    <footer class="site-footer">
      <p>{{ site_name }} • <a href="mailto:contato@portalsolidario.org.br">contato@portalsolidario.org.br</a> • <a href="tel:+551130000000">(11) 3000-0000</a></p>
      <p><a href="https://www.instagram.com/portalsolidario" rel="noopener">Instagram</a></p>
    </footer>
    <script type="module">
      import init from "/pkg/portal_spa.js";
      init();
    </script>
  </body>
</html>"#,
    ext = "html"
)]
struct LayoutTemplate<'a> {
    title: &'a str,
    site_name: &'a str,
    config: &'a SiteConfig,
    nav: &'a [NavLink],
    content: String,
}

#[derive(Template)]
#[template(
    source = r#"<section class="hero">
  <p class="eyebrow">Transformando comunidades desde 2012</p>
  <h1>Juntos fazemos mais</h1>
  <p class="lede">Conectamos voluntários, doadores e parceiros a projetos sociais que mudam a realidade de bairros inteiros.</p>
  <a id="{{ cta_id }}" class="button" href="/cadastro.html">Quero participar</a>
</section>
<section class="highlights">
  <article><h2>+1.200</h2><p>voluntários cadastrados</p></article>
  <article><h2>{{ project_count }}</h2><p>projetos ativos</p></article>
  <article><h2>35</h2><p>bairros atendidos</p></article>
</section>
<section class="about">
  <h2>Como funciona</h2>
  <p>Escolha um projeto, faça seu cadastro e nossa equipe entra em contato para combinar os próximos passos. Veja a lista completa em <a href="/projetos.html">nossos projetos</a>.</p>
</section>"#,
    ext = "html"
)]
struct HomeContent<'a> {
    cta_id: &'a str,
    project_count: usize,
}

#[derive(Template)]
#[template(
    source = r#"<section class="page-intro">
  <h1>Nossos projetos</h1>
  <p class="lede">Conheça as frentes de atuação abertas a novos voluntários.</p>
</section>
<section class="project-grid">
  {% for project in projects %}
  <article class="card">
    <p class="tag">{{ project.area }}</p>
    <h2>{{ project.title }}</h2>
    <p>{{ project.summary }}</p>
  </article>
  {% endfor %}
</section>
<p class="cta-line">Gostou de algum? <a href="/cadastro.html">Cadastre-se</a>.</p>"#,
    ext = "html"
)]
struct ProjectsContent<'a> {
    projects: &'a [Project],
}

#[derive(Template)]
#[template(
    source = r#"<section class="page-intro">
  <h1>Cadastro de voluntários</h1>
  <p class="lede">Preencha seus dados. Campos com * são obrigatórios.</p>
</section>
<form id="{{ form_id }}" class="form-cadastro" novalidate>
  <div class="form-group">
    <label for="nome">Nome completo *</label>
    <input id="nome" name="nome" type="text" required minlength="3" autocomplete="name" />
    <span id="nome-error" class="error-message" aria-live="polite"></span>
  </div>
  <div class="form-group">
    <label for="email">E-mail *</label>
    <input id="email" name="email" type="email" required autocomplete="email" />
    <span id="email-error" class="error-message" aria-live="polite"></span>
  </div>
  <div class="form-group">
    <label for="telefone">Telefone *</label>
    <input id="telefone" name="telefone" type="tel" required maxlength="15" placeholder="(00) 00000-0000" inputmode="numeric" />
    <span id="telefone-error" class="error-message" aria-live="polite"></span>
  </div>
  <div class="form-group">
    <label for="nascimento">Data de nascimento *</label>
    <input id="nascimento" name="nascimento" type="date" required max="{{ max_birth_date }}" />
    <span id="nascimento-error" class="error-message" aria-live="polite"></span>
  </div>
  <div class="form-group">
    <label for="cpf">CPF *</label>
    <input id="cpf" name="cpf" type="text" required maxlength="14" placeholder="000.000.000-00" inputmode="numeric" />
    <span id="cpf-error" class="error-message" aria-live="polite"></span>
  </div>
  <div class="form-group">
    <label for="cep">CEP</label>
    <input id="cep" name="cep" type="text" maxlength="9" placeholder="00000-000" inputmode="numeric" />
    <span id="cep-error" class="error-message" aria-live="polite"></span>
  </div>
  <div class="form-group">
    <label for="endereco">Endereço *</label>
    <input id="endereco" name="endereco" type="text" required autocomplete="street-address" />
    <span id="endereco-error" class="error-message" aria-live="polite"></span>
  </div>
  <div class="form-group">
    <label for="cidade">Cidade *</label>
    <input id="cidade" name="cidade" type="text" required />
    <span id="cidade-error" class="error-message" aria-live="polite"></span>
  </div>
  <div class="form-group">
    <label for="estado">Estado *</label>
    <select id="estado" name="estado" required>
      <option value="" selected>Selecione</option>
      {% for (sigla, nome) in estados %}
      <option value="{{ sigla }}">{{ nome }}</option>
      {% endfor %}
    </select>
    <span id="estado-error" class="error-message" aria-live="polite"></span>
  </div>
  <div class="form-group">
    <label for="perfil">Como quer participar? *</label>
    <select id="perfil" name="perfil" required>
      <option value="" selected>Selecione</option>
      {% for (valor, rotulo) in perfis %}
      <option value="{{ valor }}">{{ rotulo }}</option>
      {% endfor %}
    </select>
    <span id="perfil-error" class="error-message" aria-live="polite"></span>
  </div>
  <button type="submit" class="button">Enviar cadastro</button>
</form>"#,
    ext = "html"
)]
struct RegistrationContent<'a> {
    form_id: &'a str,
    /// `YYYY-MM-DD`; birth dates after it are rejected.
    max_birth_date: String,
    estados: &'a [(&'a str, &'a str)],
    perfis: &'a [(&'a str, &'a str)],
}

#[derive(Template)]
#[template(
    source = r#"<section class="page-intro">
  <h1>Página não encontrada</h1>
  <p class="lede">O endereço acessado não existe. <a href="/">Voltar ao início</a>.</p>
</section>"#,
    ext = "html"
)]
struct NotFoundContent;

pub fn page_title(view: View) -> String {
    let section = match view {
        View::Home => "Início",
        View::Projects => "Projetos",
        View::Registration => "Cadastro",
    };
    format!("{section} | {SITE_NAME}")
}

/// Full HTML document for a view, dated today in local time.
pub fn render_view(view: View, config: &SiteConfig) -> Result<String, askama::Error> {
    render_view_on(view, config, Local::now().date_naive())
}

/// Full HTML document for a view as rendered on `today`.
pub fn render_view_on(
    view: View,
    config: &SiteConfig,
    today: NaiveDate,
) -> Result<String, askama::Error> {
    let content = match view {
        View::Home => HomeContent {
            cta_id: &config.cta_id,
            project_count: PROJECTS.len(),
        }
        .render()?,
        View::Projects => ProjectsContent {
            projects: &PROJECTS,
        }
        .render()?,
        View::Registration => RegistrationContent {
            form_id: &config.form_id,
            max_birth_date: today.format("%Y-%m-%d").to_string(),
            estados: &ESTADOS,
            perfis: &PERFIS,
        }
        .render()?,
    };
    render_layout(&page_title(view), config, content)
}

pub fn render_not_found(config: &SiteConfig) -> Result<String, askama::Error> {
    let title = format!("Página não encontrada | {SITE_NAME}");
    render_layout(&title, config, NotFoundContent.render()?)
}

fn render_layout(title: &str, config: &SiteConfig, content: String) -> Result<String, askama::Error> {
    LayoutTemplate {
        title,
        site_name: SITE_NAME,
        config,
        nav: &NAV_LINKS,
        content,
    }
    .render()
}

pub const STYLESHEET: &str = r#":root {
  --bg: #f8fafc;
  --fg: #0f172a;
  --muted: #475569;
  --card: #ffffff;
  --accent: #0f766e;
  --error: #b91c1c;
  --success: #15803d;
}
[data-theme="dark"] {
  --bg: #0f172a;
  --fg: #e2e8f0;
  --muted: #94a3b8;
  --card: #1e293b;
  --accent: #2dd4bf;
  --error: #f87171;
  --success: #4ade80;
}
* { box-sizing: border-box; }
body { margin: 0; font-family: system-ui, sans-serif; background: var(--bg); color: var(--fg); }
a { color: var(--accent); }
.site-header { display: flex; align-items: center; gap: 1rem; padding: 1rem 2rem; background: var(--card); }
.brand { font-weight: 700; text-decoration: none; margin-right: auto; }
.nav-menu ul { display: flex; gap: 1.5rem; list-style: none; margin: 0; padding: 0; }
.menu-toggle, .theme-toggle { background: none; border: 0; font-size: 1.5rem; cursor: pointer; color: var(--fg); }
.menu-toggle { display: none; }
main { max-width: 64rem; margin: 0 auto; padding: 2rem; }
.hero { padding: 3rem 0; }
.lede { color: var(--muted); font-size: 1.125rem; }
.button { display: inline-block; padding: .75rem 1.5rem; border-radius: .5rem; border: 0; background: var(--accent); color: #fff; text-decoration: none; font-weight: 600; cursor: pointer; }
.highlights, .project-grid { display: grid; gap: 1rem; grid-template-columns: repeat(auto-fit, minmax(14rem, 1fr)); }
.card, .highlights article { background: var(--card); border-radius: .75rem; padding: 1.25rem; }
.tag { text-transform: uppercase; font-size: .75rem; color: var(--muted); }
.form-cadastro { display: grid; gap: 1rem; max-width: 36rem; }
.form-group { display: flex; flex-direction: column; gap: .25rem; }
.form-group input, .form-group select { padding: .6rem; border-radius: .375rem; border: 1px solid var(--muted); background: var(--card); color: var(--fg); }
.form-group input.error, .form-group select.error { border-color: var(--error); }
.form-group input.success, .form-group select.success { border-color: var(--success); }
.error-message { color: var(--error); font-size: .875rem; min-height: 1.25rem; }
.load-error { border-left: 4px solid var(--error); background: var(--card); padding: 1rem 1.5rem; }
.site-footer { text-align: center; color: var(--muted); padding: 2rem; }
@media (max-width: 768px) {
  .menu-toggle { display: block; }
  .nav-menu { display: none; position: absolute; top: 4rem; left: 0; right: 0; background: var(--card); padding: 1rem 2rem; }
  .nav-menu.active { display: block; }
  .nav-menu ul { flex-direction: column; gap: 1rem; }
}
"#;
