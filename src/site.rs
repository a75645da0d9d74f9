//! Portfolio site renderer
//!
//! Turns a successful PortfolioBuilder outcome into the files of a small
//! React site. Section data is embedded as JSON literals so profile text is
//! never spliced into JSX markup.

use crate::agent::portfolio::{ColorPalette, Typography};
use crate::error::AgentError;
use crate::models::Outcome;
use crate::Result;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const DEFAULT_SECTION_ORDER: &[&str] = &["about", "skills", "projects", "experience", "metrics", "contact"];

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SiteLayout {
    pub layout_style: String,
    pub colors: Option<ColorPalette>,
    pub typography: Option<Typography>,
}

/// Everything the renderer needs, pulled out of an outcome's results
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PortfolioBundle {
    pub hero: Map<String, Value>,
    pub sections: Map<String, Value>,
    pub layout: SiteLayout,
    /// Section order chosen by the builder, hero excluded
    pub order: Vec<String>,
}

impl PortfolioBundle {
    pub fn from_outcome(outcome: &Outcome) -> Result<Self> {
        if !outcome.is_success() {
            return Err(AgentError::Execution(format!(
                "cannot render a failed {} outcome: {}",
                outcome.agent(),
                outcome.error_message().unwrap_or("unknown error")
            )));
        }

        let mut bundle = PortfolioBundle::default();
        for result in outcome.results() {
            if result.get("section").and_then(Value::as_str) == Some("hero") {
                if let Some(content) = result.get("content").and_then(Value::as_object) {
                    bundle.hero = content.clone();
                }
            } else if let Some(sections) = result.get("sections").and_then(Value::as_object) {
                bundle.sections = sections.clone();
            } else if result.get("layout_style").is_some() {
                bundle.layout = serde_json::from_value(result.clone())?;
            }
        }

        if bundle.hero.is_empty() && bundle.sections.is_empty() {
            return Err(AgentError::Execution(format!(
                "{} outcome has no portfolio content",
                outcome.agent()
            )));
        }

        let planned: Vec<String> = outcome
            .thought()
            .and_then(|t| t.pointer("/layout/primary_sections"))
            .and_then(|s| serde_json::from_value(s.clone()).ok())
            .unwrap_or_default();

        bundle.order = planned
            .into_iter()
            .filter(|s| s != "hero" && bundle.sections.contains_key(s))
            .collect();

        // sections the plan did not mention keep a stable order after the planned ones
        for name in DEFAULT_SECTION_ORDER {
            if bundle.sections.contains_key(*name) && !bundle.order.iter().any(|s| s == name) {
                bundle.order.push(name.to_string());
            }
        }

        Ok(bundle)
    }

    /// Pull the portfolio step out of an orchestrator outcome and read it
    pub fn from_workflow_outcome(workflow: &Outcome) -> Result<Self> {
        let step = workflow
            .results()
            .iter()
            .find(|r| r.get("step").and_then(Value::as_str) == Some("portfolio_building"))
            .ok_or_else(|| AgentError::NotFound("portfolio_building step".to_string()))?;
        let nested = step
            .get("result")
            .cloned()
            .ok_or_else(|| AgentError::NotFound("portfolio_building result".to_string()))?;

        Self::from_outcome(&serde_json::from_value(nested)?)
    }

    fn hero_name(&self) -> &str {
        self.hero
            .get("name")
            .and_then(Value::as_str)
            .filter(|n| !n.trim().is_empty())
            .unwrap_or("Portfolio")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneratedSite {
    /// Relative path → file contents
    pub files: BTreeMap<String, String>,
    pub entry_point: String,
    pub build_instructions: String,
}

impl GeneratedSite {
    /// Write every file under `dir`, creating folders as needed
    pub async fn write_to(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let mut written = Vec::with_capacity(self.files.len());
        for (relative, contents) in &self.files {
            let path = dir.join(relative);
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(&path, contents).await?;
            written.push(path);
        }

        info!(dir = %dir.display(), files = written.len(), "Wrote portfolio site");
        Ok(written)
    }
}

fn component_name(section: &str) -> String {
    let mut chars = section.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "null".to_string())
}

#[derive(Debug, Clone, Default)]
pub struct ReactSiteGenerator;

impl ReactSiteGenerator {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, bundle: &PortfolioBundle) -> GeneratedSite {
        let mut files = BTreeMap::new();
        let mut rendered = vec!["hero".to_string()];

        files.insert("components/Hero.jsx".to_string(), self.hero_component(bundle));
        for section in &bundle.order {
            let Some(data) = bundle.sections.get(section) else {
                continue;
            };
            match self.section_component(section, data) {
                Some(source) => {
                    files.insert(format!("components/{}.jsx", component_name(section)), source);
                    rendered.push(section.clone());
                }
                None => debug!(section = %section, "No component for section"),
            }
        }

        files.insert("App.jsx".to_string(), self.app_component(&rendered));
        files.insert("styles/globals.css".to_string(), self.global_styles(&bundle.layout));
        files.insert("package.json".to_string(), self.package_json(bundle));
        files.insert("index.html".to_string(), self.index_html(bundle));

        GeneratedSite {
            files,
            entry_point: "App.jsx".to_string(),
            build_instructions: BUILD_INSTRUCTIONS.to_string(),
        }
    }

    fn app_component(&self, sections: &[String]) -> String {
        let mut imports = vec![
            "import React from 'react';".to_string(),
            "import './styles/globals.css';".to_string(),
        ];
        let mut body = Vec::new();
        for section in sections {
            let name = component_name(section);
            imports.push(format!("import {name} from './components/{name}';"));
            body.push(format!("      <{name} />"));
        }

        format!(
            "{}\n\nfunction App() {{\n  return (\n    <div className=\"portfolio\">\n{}\n    </div>\n  );\n}}\n\nexport default App;\n",
            imports.join("\n"),
            body.join("\n")
        )
    }

    fn hero_component(&self, bundle: &PortfolioBundle) -> String {
        let hero = Value::Object(bundle.hero.clone());
        format!(
            r##"import React from 'react';

const hero = {data};

const Hero = () => (
  <section className="hero" id="home">
    <div className="hero-content">
      <h1 className="hero-name">{{hero.name}}</h1>
      <h2 className="hero-title">{{hero.title}}</h2>
      <p className="hero-tagline">{{hero.tagline}}</p>
      <div className="hero-cta">
        <a href="#projects" className="btn btn-primary">{{hero.cta_primary}}</a>
        <a href="#contact" className="btn btn-secondary">{{hero.cta_secondary}}</a>
      </div>
    </div>
  </section>
);

export default Hero;
"##,
            data = pretty(&hero)
        )
    }

    fn section_component(&self, section: &str, data: &Value) -> Option<String> {
        let markup = match section {
            "about" => {
                r#"<p className="about-summary">{data.summary}</p>
        <ul className="about-interests">
          {(data.interests || []).map((item, i) => <li key={i}>{item}</li>)}
        </ul>"#
            }
            "skills" => {
                r#"<div className="skills-highlighted">
          {(data.highlighted || []).map((skill, i) => (
            <span key={i} className="skill-tag">{skill}</span>
          ))}
        </div>"#
            }
            "projects" => {
                r#"<div className="projects-grid">
          {data.map((project, idx) => (
            <div key={idx} className="project-card">
              <h3>{project.title}</h3>
              <p>{project.description}</p>
              <div className="project-tech">
                {(project.technologies || []).map((tech, i) => (
                  <span key={i} className="tech-tag">{tech}</span>
                ))}
              </div>
              {project.link && <a href={project.link} target="_blank" rel="noreferrer">View</a>}
            </div>
          ))}
        </div>"#
            }
            "experience" => {
                r#"<div className="timeline">
          {data.map((job, idx) => (
            <div key={idx} className="timeline-item">
              <h3>{job.title}</h3>
              <p className="timeline-company">{job.company} {job.period}</p>
              <ul>
                {(job.highlights || []).map((line, i) => <li key={i}>{line}</li>)}
              </ul>
            </div>
          ))}
        </div>"#
            }
            "metrics" => {
                r#"<div className="metrics-grid">
          {data.map((metric, idx) => (
            <div key={idx} className="metric-card">
              <span className="metric-value">{metric.value}</span>
              <span className="metric-label">{metric.label}</span>
            </div>
          ))}
        </div>"#
            }
            "contact" => {
                r#"<div className="contact-links">
          {data.email && <a href={`mailto:${data.email}`}>Email</a>}
          {data.linkedin && <a href={data.linkedin}>LinkedIn</a>}
          {data.github && <a href={data.github}>GitHub</a>}
          {data.website && <a href={data.website}>Website</a>}
        </div>"#
            }
            _ => return None,
        };

        let name = component_name(section);
        Some(format!(
            r#"import React from 'react';

const data = {data};

const {name} = () => (
  <section className="{section}" id="{section}">
    <div className="container">
      <h2 className="section-title">{name}</h2>
      {markup}
    </div>
  </section>
);

export default {name};
"#,
            data = pretty(data),
        ))
    }

    fn global_styles(&self, layout: &SiteLayout) -> String {
        let colors = layout
            .colors
            .clone()
            .unwrap_or_else(|| ColorPalette::for_scheme("professional"));
        let typography = layout.typography.clone().unwrap_or_default();

        format!(
            r#"/* Portfolio Global Styles ({style}) */
:root {{
  --primary: {primary};
  --secondary: {secondary};
  --background: {background};
  --text-primary: {text};
  --font-heading: '{heading}', sans-serif;
  --font-body: '{body}', sans-serif;
  --font-code: '{code}', monospace;
}}

* {{
  margin: 0;
  padding: 0;
  box-sizing: border-box;
}}

body {{
  font-family: var(--font-body);
  background: var(--background);
  color: var(--text-primary);
  line-height: 1.6;
}}

h1, h2, h3 {{
  font-family: var(--font-heading);
}}

.container {{
  max-width: 1200px;
  margin: 0 auto;
  padding: 0 2rem;
}}

section {{
  padding: 5rem 0;
}}

.section-title {{
  font-size: 2.5rem;
  margin-bottom: 2rem;
  text-align: center;
}}

.hero {{
  min-height: 100vh;
  display: flex;
  align-items: center;
  justify-content: center;
  text-align: center;
}}

.btn {{
  display: inline-block;
  padding: 0.75rem 1.5rem;
  margin: 0.5rem;
  border-radius: 0.5rem;
  text-decoration: none;
  font-weight: 500;
}}

.btn-primary {{
  background: var(--primary);
  color: #ffffff;
}}

.btn-secondary {{
  border: 2px solid var(--secondary);
  color: var(--secondary);
}}

.projects-grid, .metrics-grid {{
  display: grid;
  grid-template-columns: repeat(auto-fit, minmax(280px, 1fr));
  gap: 2rem;
}}

.skill-tag, .tech-tag {{
  display: inline-block;
  padding: 0.25rem 0.75rem;
  margin: 0.25rem;
  border-radius: 999px;
  background: var(--primary);
  color: #ffffff;
}}
"#,
            style = if layout.layout_style.is_empty() { "balanced" } else { layout.layout_style.as_str() },
            primary = colors.primary,
            secondary = colors.secondary,
            background = colors.background,
            text = colors.text,
            heading = typography.heading_font,
            body = typography.body_font,
            code = typography.code_font,
        )
    }

    fn package_json(&self, bundle: &PortfolioBundle) -> String {
        let slug = bundle
            .hero_name()
            .to_lowercase()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("-");
        let package = json!({
            "name": format!("{}-portfolio", slug),
            "version": "1.0.0",
            "private": true,
            "dependencies": {
                "react": "^18.2.0",
                "react-dom": "^18.2.0"
            },
            "scripts": {
                "start": "react-scripts start",
                "build": "react-scripts build"
            }
        });
        pretty(&package)
    }

    fn index_html(&self, bundle: &PortfolioBundle) -> String {
        let title = html_escape(bundle.hero_name());
        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>{title} | Portfolio</title>
  <link href="https://fonts.googleapis.com/css2?family=Inter:wght@400;500;600;700&display=swap" rel="stylesheet">
</head>
<body>
  <div id="root"></div>
</body>
</html>
"#
        )
    }
}

fn html_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

const BUILD_INSTRUCTIONS: &str = "# Portfolio Build Instructions

1. Install dependencies:
   npm install

2. Start development server:
   npm start

3. Build for production:
   npm run build

4. Deploy the 'build' folder to your hosting provider.
";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{Agent, PortfolioBuilderAgent};

    async fn developer_outcome() -> Outcome {
        let mut agent = PortfolioBuilderAgent::new();
        agent
            .run(&json!({
                "user_data": {
                    "name": "Ada Lovelace",
                    "target_role": "Software Engineer",
                    "top_skills": ["Rust"],
                    "skills": ["Rust", "SQL"],
                    "projects": [{ "name": "Analytical Engine", "description": "<b>first</b> program" }]
                },
                "career_dna": { "strengths": ["Rust"] }
            }))
            .await
    }

    #[tokio::test]
    async fn test_bundle_from_outcome() {
        let bundle = PortfolioBundle::from_outcome(&developer_outcome().await).unwrap();

        assert_eq!(bundle.hero["name"], "Ada Lovelace");
        assert_eq!(bundle.order, vec!["projects", "skills"]);
        assert_eq!(bundle.layout.layout_style, "project-first");
        assert_eq!(bundle.layout.colors.as_ref().unwrap().primary, "#8b5cf6");
    }

    #[tokio::test]
    async fn test_render_developer_site() {
        let bundle = PortfolioBundle::from_outcome(&developer_outcome().await).unwrap();
        let site = ReactSiteGenerator::new().render(&bundle);

        let names: Vec<_> = site.files.keys().map(String::as_str).collect();
        assert_eq!(
            names,
            vec![
                "App.jsx",
                "components/Hero.jsx",
                "components/Projects.jsx",
                "components/Skills.jsx",
                "index.html",
                "package.json",
                "styles/globals.css",
            ]
        );
        assert_eq!(site.entry_point, "App.jsx");

        let app = &site.files["App.jsx"];
        let hero_at = app.find("<Hero />").unwrap();
        let projects_at = app.find("<Projects />").unwrap();
        assert!(hero_at < projects_at);

        // profile text stays inside the JSON literal
        assert!(site.files["components/Projects.jsx"].contains(r#""description": "<b>first</b> program""#));
        assert!(site.files["styles/globals.css"].contains("--primary: #8b5cf6;"));
        assert!(site.files["package.json"].contains(r#""name": "ada-lovelace-portfolio""#));
        assert!(site.files["index.html"].contains("<title>Ada Lovelace | Portfolio</title>"));
    }

    #[tokio::test]
    async fn test_hero_links_to_sections() {
        let bundle = PortfolioBundle::from_outcome(&developer_outcome().await).unwrap();
        let site = ReactSiteGenerator::new().render(&bundle);

        let hero = &site.files["components/Hero.jsx"];
        assert!(hero.contains(r##"<a href="#projects" className="btn btn-primary">"##));
        assert!(hero.contains(r##"<a href="#contact" className="btn btn-secondary">"##));
        assert!(hero.contains(r#""name": "Ada Lovelace""#));
        assert!(hero.contains("{hero.tagline}"));
        assert!(hero.trim_end().ends_with("export default Hero;"));
    }

    #[tokio::test]
    async fn test_failed_outcome_is_rejected() {
        let outcome = Outcome::error("PortfolioBuilder", "Execution error: boom");
        let err = PortfolioBundle::from_outcome(&outcome).unwrap_err();
        assert!(err.to_string().contains("boom"));
    }

    #[tokio::test]
    async fn test_write_to_directory() {
        let bundle = PortfolioBundle::from_outcome(&developer_outcome().await).unwrap();
        let site = ReactSiteGenerator::new().render(&bundle);

        let dir = tempfile::tempdir().unwrap();
        let written = site.write_to(dir.path()).await.unwrap();

        assert_eq!(written.len(), site.files.len());
        let hero = std::fs::read_to_string(dir.path().join("components/Hero.jsx")).unwrap();
        assert_eq!(hero, site.files["components/Hero.jsx"]);
    }

    #[tokio::test]
    async fn test_bundle_from_workflow_outcome() {
        let mut orchestrator = crate::agent::OrchestratorAgent::new(None);
        let outcome = orchestrator
            .run(&json!({
                "request_type": "portfolio_only",
                "user_data": { "name": "Ada", "target_role": "Backend Developer" }
            }))
            .await;
        let bundle = PortfolioBundle::from_workflow_outcome(&outcome).unwrap();
        assert_eq!(bundle.hero["name"], "Ada");

        let profile_only = orchestrator
            .run(&json!({ "request_type": "profile_only" }))
            .await;
        assert!(PortfolioBundle::from_workflow_outcome(&profile_only).is_err());
    }

    #[test]
    fn test_component_name() {
        assert_eq!(component_name("projects"), "Projects");
        assert_eq!(component_name(""), "");
    }
}
