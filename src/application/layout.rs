//! HTML layout of the shell: header, sidebar and the routed content area.

use minijinja::{context, Environment};
use serde::Serialize;

use crate::domain::errors::DomainResult;
use crate::domain::models::{is_active_path, Account, NavItem};

use super::shell::Navigation;

const APP_TITLE: &str = "Web Analytics Platform";

const BASE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{% block title %}{{ app_title }}{% endblock %}</title>
{% block head %}{% endblock %}
<style>
body { margin: 0; font-family: system-ui, sans-serif; background: #f8fafc; color: #1e293b; }
header { display: flex; justify-content: space-between; align-items: center; padding: 0 1.5rem; height: 4rem; background: #fff; border-bottom: 1px solid #e2e8f0; }
.brand { display: flex; gap: .75rem; align-items: center; font-weight: 700; }
.logo, .avatar { display: inline-flex; align-items: center; justify-content: center; border-radius: .5rem; background: #0284c7; color: #fff; width: 2.25rem; height: 2.25rem; }
.avatar { border-radius: 999px; width: 2rem; height: 2rem; }
.frame { display: flex; min-height: calc(100vh - 4rem); }
aside { width: 16rem; background: #0f172a; color: #cbd5e1; padding: 1rem; }
aside a { display: block; padding: .75rem 1rem; border-radius: .5rem; color: inherit; text-decoration: none; }
aside a.active { background: #0284c7; color: #fff; }
main { flex: 1; padding: 2rem; }
.skeleton { background: #e2e8f0; border-radius: .5rem; min-height: 4rem; animation: pulse 1.5s infinite; }
@keyframes pulse { 50% { opacity: .5; } }
.banner { background: #fef2f2; border: 1px solid #fecaca; color: #b91c1c; padding: 1rem; border-radius: .5rem; margin-bottom: 1rem; }
.cards { display: grid; grid-template-columns: repeat(auto-fit, minmax(12rem, 1fr)); gap: 1rem; }
.card { background: #fff; border-radius: .75rem; padding: 1rem; box-shadow: 0 1px 2px rgba(0,0,0,.06); }
.badge { font-size: .75rem; background: #e0f2fe; color: #0369a1; padding: .1rem .5rem; border-radius: 999px; }
table { width: 100%; border-collapse: collapse; background: #fff; }
th, td { text-align: left; padding: .5rem .75rem; border-bottom: 1px solid #e2e8f0; }
.placeholder { text-align: center; padding: 4rem 1rem; color: #64748b; }
</style>
</head>
<body>
{% block body %}{% endblock %}
</body>
</html>
"#;

const LAYOUT_TEMPLATE: &str = r#"{% extends "base.html" %}
{% block title %}{% if outcome.kind == "page" %}{{ outcome.view.title }} · {% endif %}{{ app_title }}{% endblock %}
{% block body %}
<header>
  <div class="brand"><span class="logo">MF</span><span>{{ app_title }}</span></div>
  <div class="account">
    {% if account %}<span class="avatar">{{ account.initial }}</span> <span>{{ account.name }}</span>
    {% else %}<span class="avatar">?</span> <span>Guest</span>{% endif %}
  </div>
</header>
<div class="frame">
  <aside>
    <nav>
      <p>Navigation</p>
      <a href="/" class="{% if path == "/" %}active{% endif %}">Home</a>
      {% for item in nav %}
      <a href="{{ item.path }}" class="{% if item.active %}active{% endif %}">{{ item.label }}</a>
      {% endfor %}
    </nav>
  </aside>
  <main>
  {% if outcome.kind == "home" %}
    <h1>Welcome{% if account %}, {{ account.name }}{% endif %}!</h1>
    <p>Welcome to {{ app_title }}. Access modules from the left menu.</p>
    <div class="cards">
      {% for item in nav %}<a class="card" href="{{ item.path }}"><h3>{{ item.label }}</h3></a>{% endfor %}
    </div>
  {% elif outcome.kind == "page" %}
    {% set view = outcome.view %}
    <div class="page-header">
      <h1>{{ view.title }}</h1>
      {% if view.greeting.state == "welcome" %}<p class="greeting">Welcome, {{ view.greeting.name }}</p>
      {% elif view.greeting.state == "loading" %}<div class="skeleton greeting"></div>{% endif %}
      {% if view.subtitle %}<p>{{ view.subtitle }}</p>{% endif %}
      {% if view.refreshable %}
      <form method="post" action="/api/refresh?path={{ path|urlencode }}"><button type="submit">Refresh Data</button></form>
      {% endif %}
    </div>
    {% if view.error_banner %}
    <div class="banner" role="alert">{{ view.error_banner }} <button type="button" onclick="this.parentElement.remove()">Dismiss</button></div>
    {% endif %}
    {% for section in view.sections %}
    <section>
      <h2>{{ section.heading }}</h2>
      {% set body = section.body %}
      {% if body.kind == "loading" %}
        <div class="cards">{% for i in range(body.placeholders) %}<div class="skeleton"></div>{% endfor %}</div>
      {% elif body.kind == "stats" %}
        <div class="cards">{% for card in body.cards %}<div class="card"><p>{{ card.label }}</p><strong>{{ card.value }}</strong>{% if card.hint %}<small>{{ card.hint }}</small>{% endif %}</div>{% endfor %}</div>
      {% elif body.kind == "table" %}
        <table><thead><tr>{% for column in body.columns %}<th>{{ column }}</th>{% endfor %}</tr></thead>
        <tbody>{% for row in body.rows %}<tr>{% for cell in row %}<td>{{ cell }}</td>{% endfor %}</tr>{% endfor %}</tbody></table>
      {% elif body.kind == "list" %}
        <ul>{% for item in body.items %}<li>{% if item.link %}<a href="{{ item.link }}">{{ item.title }}</a>{% else %}{{ item.title }}{% endif %}{% if item.badge %} <span class="badge">{{ item.badge }}</span>{% endif %}{% if item.detail %}<br><small>{{ item.detail }}</small>{% endif %}</li>{% endfor %}</ul>
      {% endif %}
    </section>
    {% endfor %}
  {% elif outcome.kind == "loading" %}
    <div class="placeholder"><div class="skeleton"></div><p>Loading...</p></div>
  {% elif outcome.kind == "failed_to_load" %}
    <div class="placeholder failed"><h2>Failed to load</h2><p>The {{ outcome.remote }} module is unavailable.</p><p><small>{{ outcome.reason }}</small></p></div>
  {% elif outcome.kind == "route_missing" %}
    <div class="placeholder"><h2>Not Found</h2><p>Route {{ outcome.route_id }} is not provided by its module.</p></div>
  {% else %}
    <div class="placeholder"><h2>Not Found</h2><p>No page at {{ path }}.</p></div>
  {% endif %}
  </main>
</div>
{% endblock %}
"#;

const BOOTSTRAP_TEMPLATE: &str = r#"{% extends "base.html" %}
{% block head %}<meta http-equiv="refresh" content="1">{% endblock %}
{% block body %}
<div class="placeholder"><div class="skeleton"></div><p>Starting application...</p></div>
{% endblock %}
"#;

#[derive(Debug, Serialize)]
struct NavLink<'a> {
    path: &'a str,
    label: &'a str,
    active: bool,
}

#[derive(Debug, Serialize)]
struct AccountBadge<'a> {
    name: &'a str,
    initial: String,
}

/// Compiled shell templates.
#[derive(Debug)]
pub struct Layout {
    env: Environment<'static>,
}

impl Layout {
    /// Environment with the built-in templates registered.
    pub fn new() -> DomainResult<Self> {
        let mut env = Environment::new();
        env.add_template("base.html", BASE_TEMPLATE)?;
        env.add_template("layout.html", LAYOUT_TEMPLATE)?;
        env.add_template("bootstrap.html", BOOTSTRAP_TEMPLATE)?;
        Ok(Self { env })
    }

    /// Full document for a navigation result.
    pub fn render(
        &self,
        navigation: &Navigation,
        nav_items: &[NavItem],
        account: Option<&Account>,
    ) -> DomainResult<String> {
        let nav: Vec<NavLink<'_>> = nav_items
            .iter()
            .map(|item| NavLink {
                path: &item.path,
                label: &item.label,
                active: is_active_path(&navigation.path, &item.path),
            })
            .collect();
        let account = account.map(|a| AccountBadge {
            name: &a.name,
            initial: a.initial(),
        });

        let template = self.env.get_template("layout.html")?;
        Ok(template.render(context! {
            app_title => APP_TITLE,
            path => &navigation.path,
            outcome => &navigation.outcome,
            nav => nav,
            account => account,
        })?)
    }

    /// Document served while the shell is bootstrapping.
    pub fn render_bootstrapping(&self) -> DomainResult<String> {
        let template = self.env.get_template("bootstrap.html")?;
        Ok(template.render(context! { app_title => APP_TITLE })?)
    }
}
